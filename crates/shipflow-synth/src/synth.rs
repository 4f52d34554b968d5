//! 合成出力の書き出し
//!
//! プラン (pipeline.json) とステージごとのデプロイドキュメントを
//! 出力ディレクトリに書き出します。I/Oエラーは一律で即座に失敗します。

use crate::assembler::{PipelinePlan, assemble};
use crate::error::{Result, SynthError};
use crate::render::DocumentRenderer;
use shipflow_core::model::Pipeline;
use std::path::{Path, PathBuf};
use tracing::info;

/// 合成結果
#[derive(Debug)]
pub struct SynthOutput {
    pub plan: PipelinePlan,
    pub out_dir: PathBuf,
    /// 書き出されたファイル（書き出し順）
    pub files: Vec<PathBuf>,
}

/// パイプラインを合成して出力ディレクトリに書き出す
///
/// - `pipeline.json`: プラン全体
/// - `appspec-<tag>.yaml` / `taskdef-<tag>.json`: デプロイステージごと
///   （ブートストラップ合成時は出力されない）
pub fn synthesize(
    pipeline: &Pipeline,
    build_number: Option<u64>,
    out_dir: &Path,
) -> Result<SynthOutput> {
    let (plan, resolved) = assemble(pipeline, build_number)?;

    std::fs::create_dir_all(out_dir).map_err(|e| SynthError::WriteError {
        path: out_dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();

    let plan_path = out_dir.join("pipeline.json");
    let plan_json = serde_json::to_string_pretty(&plan)
        .map_err(|e| SynthError::Render(e.to_string()))?;
    write_file(&plan_path, &plan_json)?;
    files.push(plan_path);

    if !plan.bootstrap {
        let renderer = DocumentRenderer::new(&pipeline.app_name, &pipeline.variables);

        for resolved_stage in &resolved {
            let stage = resolved_stage.stage();

            let appspec_path = out_dir.join(format!("appspec-{}.yaml", stage.name));
            write_file(&appspec_path, &renderer.render_appspec(stage)?)?;
            files.push(appspec_path);

            let taskdef_path = out_dir.join(format!("taskdef-{}.json", stage.name));
            write_file(&taskdef_path, &renderer.render_taskdef(stage)?)?;
            files.push(taskdef_path);
        }
    }

    info!(
        out_dir = %out_dir.display(),
        file_count = files.len(),
        "Synthesis complete"
    );

    Ok(SynthOutput {
        plan,
        out_dir: out_dir.to_path_buf(),
        files,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| SynthError::WriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

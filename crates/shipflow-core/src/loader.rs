//! プロジェクトローダー
//!
//! ファイル発見 → 変数収集 → テンプレート展開 → KDLパース の
//! パイプラインでプロジェクト全体を読み込みます。

use crate::discovery::{DiscoveredFiles, discover_files, find_project_root};
use crate::error::{PipelineError, Result};
use crate::model::Pipeline;
use crate::parser::parse_kdl_string;
use crate::template::{TemplateProcessor, Variables, extract_variables};
use std::path::Path;
use tracing::{debug, info, instrument};

/// カレントディレクトリからプロジェクトを読み込む
///
/// プロジェクトルートを自動検出し、発見された全ファイルを
/// テンプレート展開してからパースします。
pub fn load_project() -> Result<Pipeline> {
    let root = find_project_root()?;
    load_project_from_root(&root)
}

/// 指定されたプロジェクトルートからプロジェクトを読み込む
#[instrument(skip(project_root), fields(project_root = %project_root.display()))]
pub fn load_project_from_root(project_root: &Path) -> Result<Pipeline> {
    let discovered = discover_files(project_root)?;

    let root_file = discovered
        .root
        .clone()
        .ok_or_else(|| PipelineError::ProjectRootNotFound(project_root.to_path_buf()))?;

    let mut processor = build_processor(project_root, &discovered)?;

    // 展開順: ルート → ステージ群（辞書順）→ ローカルオーバーライド
    // ローカルオーバーライドを最後に置くことで pipeline ノードの値と
    // variables の上書きを許可します（ステージの再定義はエラー）。
    let mut combined = String::new();

    debug!(file = %root_file.display(), "Expanding root file");
    combined.push_str(&processor.render_file(&root_file)?);
    combined.push('\n');

    for stage_file in &discovered.stages {
        debug!(file = %stage_file.display(), "Expanding stage file");
        combined.push_str(&processor.render_file(stage_file)?);
        combined.push('\n');
    }

    if let Some(local_override) = &discovered.local_override {
        debug!(file = %local_override.display(), "Expanding local override");
        combined.push_str(&processor.render_file(local_override)?);
        combined.push('\n');
    }

    let default_name = project_root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let pipeline = parse_kdl_string(&combined, default_name)?;

    info!(
        app_name = %pipeline.app_name,
        stage_count = pipeline.stages.len(),
        "Project loaded"
    );

    Ok(pipeline)
}

/// デバッグ出力付きでプロジェクトを読み込む
///
/// 発見されたファイルと収集された変数を標準出力に表示します。
/// `ship validate` の詳細モードで使用されます。
pub fn load_project_with_debug(project_root: &Path, debug: bool) -> Result<Pipeline> {
    if !debug {
        return load_project_from_root(project_root);
    }

    let discovered = discover_files(project_root)?;

    println!("📂 プロジェクトルート: {}", project_root.display());
    if let Some(root) = &discovered.root {
        println!("  ルートファイル: {}", root.display());
    }
    for stage_file in &discovered.stages {
        println!("  ステージファイル: {}", stage_file.display());
    }
    for var_file in &discovered.variables {
        println!("  変数ファイル: {}", var_file.display());
    }
    if let Some(local) = &discovered.local_override {
        println!("  ローカルオーバーライド: {}", local.display());
    }
    if let Some(env_file) = &discovered.env_file {
        println!("  環境変数ファイル: {}", env_file.display());
    }

    let collected = collect_variables(&discovered)?;
    if !collected.is_empty() {
        println!("📝 収集された変数:");
        let mut keys: Vec<&String> = collected.keys().collect();
        keys.sort();
        for key in keys {
            println!("  {} = {}", key, collected[key]);
        }
    }

    load_project_from_root(project_root)
}

/// テンプレートプロセッサを構築
///
/// 変数の優先順位（後のものが勝つ）:
/// 1. 組み込み変数 (PROJECT_ROOT)
/// 2. variables/**/*.kdl の変数定義
/// 3. ルートファイル・ローカルオーバーライドの variables ブロック
/// 4. .env ファイル
/// 5. 環境変数 (SHIP_* / CI_* / APP_*)
fn build_processor(project_root: &Path, discovered: &DiscoveredFiles) -> Result<TemplateProcessor> {
    let mut processor = TemplateProcessor::new();

    processor.add_variable(
        "PROJECT_ROOT",
        serde_json::Value::String(project_root.display().to_string()),
    );

    processor.add_variables(collect_variables(discovered)?);

    if let Some(env_file) = &discovered.env_file {
        processor.add_env_file_variables(env_file)?;
    }

    processor.add_env_variables();

    Ok(processor)
}

/// KDLファイル群から変数定義を収集
///
/// variables/**/*.kdl は辞書順に、その後ルートファイルと
/// ローカルオーバーライドの variables ブロックを読み込みます（後勝ち）。
fn collect_variables(discovered: &DiscoveredFiles) -> Result<Variables> {
    let mut all_vars = Variables::new();

    let mut sources: Vec<&Path> = discovered.variables.iter().map(|p| p.as_path()).collect();
    if let Some(root) = &discovered.root {
        sources.push(root.as_path());
    }
    if let Some(local) = &discovered.local_override {
        sources.push(local.as_path());
    }

    for path in sources {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let vars = extract_variables(&content)?;
        if !vars.is_empty() {
            debug!(file = %path.display(), count = vars.len(), "Collected variables");
        }
        all_vars.extend(vars);
    }

    Ok(all_vars)
}

use colored::Colorize;
use shipflow_synth::ResolvedStage;
use std::path::Path;

pub fn handle(project_root: &Path, debug: bool) -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());
    println!(
        "プロジェクトルート: {}",
        project_root.display().to_string().cyan()
    );

    let pipeline = match shipflow_core::load_project_with_debug(project_root, debug) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    // 検証のため解決まで行う（出力ファイルは書かない）
    let (resolved, trusts) =
        match shipflow_synth::StageResolver::new(&pipeline.app_name, pipeline.home.clone())
            .resolve_all(pipeline.stages.clone())
        {
            Ok(result) => result,
            Err(e) => {
                eprintln!();
                eprintln!("{}", "✗ 設定エラー".red().bold());
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        };

    println!("{}", "✓ 設定ファイルは正常です！".green().bold());
    println!();
    println!("サマリー:");
    println!("  アプリ: {}", pipeline.app_name.cyan());
    println!(
        "  ホーム: {}/{}",
        pipeline.home.account, pipeline.home.region
    );
    println!("  ステージ: {}個", resolved.len());
    for r in &resolved {
        let stage = r.stage();
        let kind = match r {
            ResolvedStage::Local { .. } => "同一アカウント",
            ResolvedStage::CrossAccount { .. } => "クロスアカウント",
        };
        println!(
            "    - {} ({}/{}, {}, {})",
            stage.name.cyan(),
            stage.environment.account,
            stage.environment.region,
            stage.strategy,
            kind
        );
    }
    if !trusts.is_empty() {
        println!("  クロスアカウント信頼: {}個", trusts.len());
        for trust in &trusts {
            println!(
                "    - {} → {}",
                trust.pipeline_account,
                trust.target_account.cyan()
            );
        }
    }

    Ok(())
}

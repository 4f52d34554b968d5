use colored::Colorize;
use std::path::Path;

pub fn handle(project_root: &Path, out: &Path, build_number: Option<u64>) -> anyhow::Result<()> {
    println!("{}", "パイプラインを合成中...".blue());

    let pipeline = match shipflow_core::load_project_from_root(project_root) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    if build_number.is_none() {
        println!(
            "{}",
            "ビルド番号が未指定のためブートストラップ合成を行います".yellow()
        );
    }

    let output = match shipflow_synth::synthesize(&pipeline, build_number, out) {
        Ok(output) => output,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 合成エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", "✓ 合成が完了しました！".green().bold());
    println!();
    println!("アプリ: {}", output.plan.app_name.cyan());
    println!(
        "ホーム: {}",
        format!(
            "{}/{}",
            output.plan.home.account, output.plan.home.region
        )
        .cyan()
    );
    println!("デプロイステージ: {}個", output.plan.deploy_stages.len());
    for action in &output.plan.deploy_stages {
        println!(
            "  {}. {} ({})",
            action.run_order,
            action.stage_tag.cyan(),
            action.deployment_config
        );
    }
    if !output.plan.trust_statements.is_empty() {
        println!(
            "クロスアカウント信頼: {}個",
            output.plan.trust_statements.len()
        );
    }
    println!();
    println!("出力ファイル:");
    for file in &output.files {
        println!("  {}", file.display().to_string().cyan());
    }

    Ok(())
}

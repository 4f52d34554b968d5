use colored::Colorize;
use std::path::Path;

pub fn handle(project_root: &Path) -> anyhow::Result<()> {
    let pipeline = match shipflow_core::load_project_from_root(project_root) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    if pipeline.stages.is_empty() {
        println!(
            "{}",
            "デプロイステージはありません（ソース/ビルドのみのパイプライン）".yellow()
        );
        return Ok(());
    }

    // ステージ列はロード時点でタグの辞書順 = デプロイ順
    println!("デプロイ順:");
    for (index, stage) in pipeline.stages.iter().enumerate() {
        println!(
            "  {}. {} ({}/{}, {})",
            index + 1,
            stage.name.cyan(),
            stage.environment.account,
            stage.environment.region,
            stage.strategy
        );
    }

    Ok(())
}

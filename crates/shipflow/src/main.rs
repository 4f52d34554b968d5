mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ship")]
#[command(about = "書く。合成する。パイプラインは、設定になった。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// パイプラインプランとデプロイドキュメントを合成
    Synth {
        /// 出力ディレクトリ
        #[arg(short, long, default_value = "ship.out")]
        out: PathBuf,
        /// ビルド番号 (未指定ならブートストラップ合成)
        #[arg(short, long, env = "SHIP_BUILD_NUMBER")]
        build_number: Option<u64>,
    },
    /// 設定を検証してステージ構成のサマリーを表示
    Validate {
        /// ファイル発見と変数収集の詳細を表示
        #[arg(short, long)]
        debug: bool,
    },
    /// 解決済みステージをデプロイ順に表示
    Stages,
    /// バージョンを表示
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrに出力（stdoutはユーザー向け出力）
    tracing_subscriber::fmt::init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("shipflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // プロジェクトルートを検索
    // 見つからない場合はグローバル設定 (~/.config/shipflow/ など) にフォールバック
    let project_root = match shipflow_core::find_project_root() {
        Ok(root) => root,
        Err(e) => match shipflow_config::find_pipeline_file()
            .ok()
            .and_then(|file| file.parent().map(Path::to_path_buf))
        {
            Some(root) => root,
            None => {
                eprintln!();
                eprintln!("{}", "✗ プロジェクトルートが見つかりません".red().bold());
                eprintln!("  {}", e);
                eprintln!();
                eprintln!("pipeline.kdl が存在するディレクトリで実行してください");
                std::process::exit(1);
            }
        },
    };

    match cli.command {
        Commands::Synth { out, build_number } => {
            commands::synth::handle(&project_root, &out, build_number)
        }
        Commands::Validate { debug } => commands::validate::handle(&project_root, debug),
        Commands::Stages => commands::stages::handle(&project_root),
        Commands::Version => unreachable!(),
    }
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("テンプレートエラー: {file}\n理由: {message}")]
    TemplateError {
        file: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("テンプレート展開エラー: {0}")]
    TemplateRenderError(String),

    #[error("ファイル発見エラー: {path}\n理由: {message}")]
    DiscoveryError { path: PathBuf, message: String },

    #[error(
        "プロジェクトルートが見つかりません\n探索開始位置: {0}\nヒント: pipeline.kdl ファイルを含むディレクトリで実行してください"
    )]
    ProjectRootNotFound(PathBuf),

    #[error(
        "不明なデプロイ戦略: {0}\nヒント: AllAtOnce / Linear10PercentEvery1Min / Linear10PercentEvery3Min / Canary10PercentEvery5Min / Canary10PercentEvery15Min のいずれかを指定してください"
    )]
    UnknownStrategy(String),

    #[error(
        "ステージ '{stage}' のアカウントを解決できません\nヒント: stage ノードに account を指定するか、SHIP_DEFAULT_ACCOUNT 環境変数を設定してください"
    )]
    UnresolvedAccount { stage: String },

    #[error(
        "ステージ '{stage}' のリージョンを解決できません\nヒント: stage ノードに region を指定するか、SHIP_DEFAULT_REGION 環境変数を設定してください"
    )]
    UnresolvedRegion { stage: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: pipeline.kdl, pipeline.local.kdl, .pipeline.kdl, .pipeline.local.kdl\n\
        - ./.shipflow/ ディレクトリ\n\
        - ~/.config/shipflow/pipeline.kdl\n\
        または SHIP_CONFIG_PATH 環境変数で直接指定できます"
    )]
    PipelineFileNotFound,

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

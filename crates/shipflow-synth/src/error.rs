//! 合成エラー定義

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthError {
    #[error(
        "ステージ '{stage}' に deployment-group が設定されていません\n\
        ヒント: クロスアカウントステージにはターゲットアカウント側で作成した\n\
        deployment-group application=\"...\" group=\"...\" の指定が必要です"
    )]
    MissingDeploymentGroup { stage: String },

    #[error(
        "ステージ '{stage}' に deploy-role が設定されていません\n\
        ヒント: クロスアカウントステージには deploy-role \"arn:aws:iam::...\" の指定が必要です"
    )]
    MissingDeployRole { stage: String },

    #[error("出力ファイルの書き込みに失敗しました: {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    #[error("デプロイドキュメントのレンダリングに失敗しました: {0}")]
    Render(String),

    #[error(transparent)]
    Core(#[from] shipflow_core::PipelineError),
}

pub type Result<T> = std::result::Result<T, SynthError>;

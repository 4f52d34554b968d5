//! デプロイ戦略の定義

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Blue/Greenデプロイのトラフィックシフト戦略
///
/// 実際のトラフィックシフトは外部のデプロイサービスが実行します。
/// ここでは deployment config 名の選択のみを担います。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployStrategy {
    /// 一括切り替え
    AllAtOnce,
    /// 1分ごとに10%ずつシフト
    Linear10PercentEvery1Min,
    /// 3分ごとに10%ずつシフト
    Linear10PercentEvery3Min,
    /// 10%を先行投入し、5分後に残りをシフト
    Canary10PercentEvery5Min,
    /// 10%を先行投入し、15分後に残りをシフト
    Canary10PercentEvery15Min,
}

impl DeployStrategy {
    /// 全戦略のリスト（エラーメッセージやバリデーション用）
    pub const ALL: [DeployStrategy; 5] = [
        DeployStrategy::AllAtOnce,
        DeployStrategy::Linear10PercentEvery1Min,
        DeployStrategy::Linear10PercentEvery3Min,
        DeployStrategy::Canary10PercentEvery5Min,
        DeployStrategy::Canary10PercentEvery15Min,
    ];

    /// 外部デプロイサービスの deployment config 名
    pub fn deployment_config(&self) -> &'static str {
        match self {
            DeployStrategy::AllAtOnce => "CodeDeployDefault.ECSAllAtOnce",
            DeployStrategy::Linear10PercentEvery1Min => {
                "CodeDeployDefault.ECSLinear10PercentEvery1Minutes"
            }
            DeployStrategy::Linear10PercentEvery3Min => {
                "CodeDeployDefault.ECSLinear10PercentEvery3Minutes"
            }
            DeployStrategy::Canary10PercentEvery5Min => {
                "CodeDeployDefault.ECSCanary10Percent5Minutes"
            }
            DeployStrategy::Canary10PercentEvery15Min => {
                "CodeDeployDefault.ECSCanary10Percent15Minutes"
            }
        }
    }
}

impl Default for DeployStrategy {
    fn default() -> Self {
        DeployStrategy::AllAtOnce
    }
}

impl fmt::Display for DeployStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStrategy::AllAtOnce => "AllAtOnce",
            DeployStrategy::Linear10PercentEvery1Min => "Linear10PercentEvery1Min",
            DeployStrategy::Linear10PercentEvery3Min => "Linear10PercentEvery3Min",
            DeployStrategy::Canary10PercentEvery5Min => "Canary10PercentEvery5Min",
            DeployStrategy::Canary10PercentEvery15Min => "Canary10PercentEvery15Min",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for DeployStrategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AllAtOnce" => Ok(DeployStrategy::AllAtOnce),
            "Linear10PercentEvery1Min" => Ok(DeployStrategy::Linear10PercentEvery1Min),
            "Linear10PercentEvery3Min" => Ok(DeployStrategy::Linear10PercentEvery3Min),
            "Canary10PercentEvery5Min" => Ok(DeployStrategy::Canary10PercentEvery5Min),
            "Canary10PercentEvery15Min" => Ok(DeployStrategy::Canary10PercentEvery15Min),
            other => Err(PipelineError::UnknownStrategy(other.to_string())),
        }
    }
}

//! デプロイアクション生成
//!
//! アーティファクトと解決済みステージ設定を1つのデプロイアクションに束ねます。

use crate::error::{Result, SynthError};
use serde::{Deserialize, Serialize};
use shipflow_core::model::StageConfig;

/// パイプラインアーティファクト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// ブルー/グリーンデプロイアクション
///
/// run_order スロットを1つ消費します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployAction {
    /// アクション名
    pub name: String,
    /// 対象ステージのタグ
    pub stage_tag: String,
    /// デプロイサービス上のアプリケーション名
    pub application: String,
    /// デプロイメントグループ名
    pub deployment_group: String,
    /// トラフィックシフト戦略のデプロイ設定名
    pub deployment_config: String,
    /// デプロイに使用するロールのARN
    pub role_arn: String,
    /// 入力アーティファクト名
    pub input_artifact: String,
    /// 実行順序スロット
    pub run_order: u32,
}

impl DeployAction {
    /// 解決済みステージからデプロイアクションを生成
    ///
    /// ロールまたはデプロイメントグループの参照が欠けている場合は
    /// 設定エラーとして即座に失敗します。
    pub fn new(stage: &StageConfig, input: &Artifact, run_order: u32) -> Result<Self> {
        let group = stage
            .deployment_group
            .as_ref()
            .ok_or_else(|| SynthError::MissingDeploymentGroup {
                stage: stage.name.clone(),
            })?;
        let role = stage
            .deploy_role
            .as_ref()
            .ok_or_else(|| SynthError::MissingDeployRole {
                stage: stage.name.clone(),
            })?;

        Ok(Self {
            name: format!("Deploy-{}", stage.name),
            stage_tag: stage.name.clone(),
            application: group.application.clone(),
            deployment_group: group.group.clone(),
            deployment_config: stage.strategy.deployment_config().to_string(),
            role_arn: role.arn.clone(),
            input_artifact: input.name.clone(),
            run_order,
        })
    }
}

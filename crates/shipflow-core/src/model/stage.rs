//! ステージ定義

use super::environment::Environment;
use super::strategy::DeployStrategy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// IAMロールへの参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    /// ロールのARN
    pub arn: String,
}

impl RoleRef {
    pub fn new(arn: impl Into<String>) -> Self {
        Self { arn: arn.into() }
    }
}

/// デプロイメントグループへの参照
///
/// 外部デプロイサービス上の「アプリケーション + デプロイメントグループ」の
/// 組を指します。同一アカウント内のステージ間で共有されることがあります。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentGroupRef {
    /// アプリケーション名
    pub application: String,
    /// デプロイメントグループ名
    pub group: String,
}

impl DeploymentGroupRef {
    pub fn new(application: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            group: group.into(),
        }
    }
}

/// ステージ設定
///
/// パイプラインの1つのデプロイ対象環境を表します。
/// `deploy_role` / `deployment_group` はリゾルバーによって一度だけ設定され、
/// 同一アカウントのステージ間では同じ `Arc` が共有されます。
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// ステージ名（正規化済み。空白は除去される）
    pub name: String,
    /// トラフィックシフト戦略
    pub strategy: DeployStrategy,
    /// デプロイ先環境
    pub environment: Environment,
    /// デプロイに使用するロール（リゾルバーが設定、または外部スタックから供給）
    pub deploy_role: Option<Arc<RoleRef>>,
    /// デプロイメントグループ参照（デプロイアクション生成時に必須）
    pub deployment_group: Option<Arc<DeploymentGroupRef>>,
}

impl StageConfig {
    /// 新しいステージ設定を作成
    ///
    /// ステージ名は正規化されます（空白除去）。
    pub fn new(
        name: impl AsRef<str>,
        strategy: DeployStrategy,
        environment: Environment,
    ) -> Self {
        Self {
            name: normalize_stage_name(name.as_ref()),
            strategy,
            environment,
            deploy_role: None,
            deployment_group: None,
        }
    }

    /// 外部スタックから供給されたロール・デプロイメントグループ参照を持たせる
    /// （クロスアカウントステージ用）
    pub fn with_external_refs(mut self, role: RoleRef, group: DeploymentGroupRef) -> Self {
        self.deploy_role = Some(Arc::new(role));
        self.deployment_group = Some(Arc::new(group));
        self
    }
}

/// ステージ名を正規化
///
/// 空白文字を全て除去し、残った文字の順序は維持します。
/// 正規化によって名前が変化した場合は警告を記録します。
pub fn normalize_stage_name(raw: &str) -> String {
    let normalized: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if normalized != raw {
        warn!(
            raw = %raw,
            normalized = %normalized,
            "ステージ名に空白が含まれていたため正規化しました"
        );
    }

    normalized
}

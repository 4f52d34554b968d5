//! クロスアカウント信頼の定義

use super::stage::RoleRef;
use serde::{Deserialize, Serialize};

/// クロスアカウントデプロイの信頼関係
///
/// パイプラインのホームアカウントとステージのターゲットアカウントが
/// 異なる場合にのみ作成されます。
/// (パイプライン, ターゲットアカウント) の組につき必ず1つだけです。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossAccountTrust {
    /// パイプラインのホームアカウント
    pub pipeline_account: String,
    /// デプロイ先アカウント
    pub target_account: String,
    /// ターゲットアカウント側で用意された信頼ロール
    pub trust_role: RoleRef,
}

impl CrossAccountTrust {
    pub fn new(
        pipeline_account: impl Into<String>,
        target_account: impl Into<String>,
        trust_role: RoleRef,
    ) -> Self {
        Self {
            pipeline_account: pipeline_account.into(),
            target_account: target_account.into(),
            trust_role,
        }
    }

    /// パイプライン実行ロールに付与する AssumeRole ステートメント
    ///
    /// リソースは対象ステージのロールARNに限定されます。
    pub fn assume_role_statement(&self) -> TrustStatement {
        TrustStatement {
            effect: "Allow".to_string(),
            action: "sts:AssumeRole".to_string(),
            resource: self.trust_role.arn.clone(),
        }
    }
}

/// IAMポリシーステートメント（AssumeRole用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustStatement {
    #[serde(rename = "Effect")]
    pub effect: String,
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Resource")]
    pub resource: String,
}

//! デプロイ先環境の定義

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// デプロイ先環境（アカウント + リージョン）
///
/// ステージの設定構築時に一度だけ生成され、以降は不変です。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// AWSアカウントID（12桁）
    pub account: String,
    /// リージョン（us-east-1 など）
    pub region: String,
}

impl Environment {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }

    /// アカウントとリージョンを解決して環境を生成
    ///
    /// 解決の優先順位:
    /// 1. 設定ファイルでの明示的な指定
    /// 2. SHIP_DEFAULT_ACCOUNT / SHIP_DEFAULT_REGION 環境変数
    /// 3. プロセスデフォルト (AWS_ACCOUNT_ID / AWS_DEFAULT_REGION)
    ///
    /// デプロイ対象のステージでは両フィールドとも空であってはなりません。
    pub fn resolve(
        stage_name: &str,
        account: Option<String>,
        region: Option<String>,
    ) -> Result<Self> {
        let account = account
            .filter(|a| !a.is_empty())
            .or_else(|| non_empty_env("SHIP_DEFAULT_ACCOUNT"))
            .or_else(|| non_empty_env("AWS_ACCOUNT_ID"))
            .ok_or_else(|| PipelineError::UnresolvedAccount {
                stage: stage_name.to_string(),
            })?;

        let region = region
            .filter(|r| !r.is_empty())
            .or_else(|| non_empty_env("SHIP_DEFAULT_REGION"))
            .or_else(|| non_empty_env("AWS_DEFAULT_REGION"))
            .ok_or_else(|| PipelineError::UnresolvedRegion {
                stage: stage_name.to_string(),
            })?;

        Ok(Self { account, region })
    }

    /// "account/region" 形式のタグ
    pub fn tag(&self) -> String {
        format!("{}/{}", self.account, self.region)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

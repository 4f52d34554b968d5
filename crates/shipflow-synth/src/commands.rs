//! デプロイステップのシェルコマンド生成
//!
//! 純粋な文字列生成です。失敗時のリトライは含めません（実行環境側の責務）。

use crate::error::{Result, SynthError};
use shipflow_core::model::StageConfig;

/// ステージのタスクファミリー名
pub fn task_family(app_name: &str, stage: &StageConfig) -> String {
    format!("{}-{}", app_name, stage.name)
}

/// ステージ用のデプロイ準備コマンド列を生成
///
/// 生成されるコマンドは順に:
/// 1. アセットマニフェストからイメージタグを抽出
///    （マニフェストは単一イメージ前提。複数あっても先頭を決定的に選ぶ）
/// 2. `imageDetail-<tag>.json` を書き出す
/// 3. レンダリング済み taskdef / appspec にロールARNとタスクファミリーを埋め込む
pub fn deploy_commands(app_name: &str, stage: &StageConfig) -> Result<Vec<String>> {
    let role = stage
        .deploy_role
        .as_ref()
        .ok_or_else(|| SynthError::MissingDeployRole {
            stage: stage.name.clone(),
        })?;

    let tag = &stage.name;
    let account = &stage.environment.account;
    let region = &stage.environment.region;
    let family = task_family(app_name, stage);

    Ok(vec![
        format!(
            "IMAGE_TAG=$(jq -r '[.dockerImages | keys[]][0]' assets-{tag}.json)",
            tag = tag
        ),
        format!(
            "printf '{{\"ImageURI\":\"%s\"}}' \"{account}.dkr.ecr.{region}.amazonaws.com/{app}:${{IMAGE_TAG}}\" > imageDetail-{tag}.json",
            account = account,
            region = region,
            app = app_name,
            tag = tag
        ),
        format!(
            "sed -i \"s|<TASK_ROLE_ARN>|{arn}|g\" taskdef-{tag}.json",
            arn = role.arn,
            tag = tag
        ),
        format!(
            "sed -i \"s|<TASK_FAMILY>|{family}|g\" taskdef-{tag}.json appspec-{tag}.yaml",
            family = family,
            tag = tag
        ),
    ])
}

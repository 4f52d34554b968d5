//! ステージノードのパース

use crate::error::{PipelineError, Result};
use crate::model::{DeploymentGroupRef, Environment, RoleRef, StageConfig, normalize_stage_name};
use kdl::KdlNode;
use std::sync::Arc;

/// stage ノードをパース
///
/// ```kdl
/// stage "Alpha" {
///     strategy "Canary10PercentEvery5Min"
///     account "222222222222"
///     region "us-west-2"
///     // クロスアカウントステージのみ（ターゲットアカウント側のスタックが供給）
///     deploy-role "arn:aws:iam::222222222222:role/myapp-Alpha-deploy"
///     deployment-group application="myapp" group="myapp-Alpha"
/// }
/// ```
pub fn parse_stage(node: &KdlNode) -> Result<StageConfig> {
    let raw_name = node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| PipelineError::InvalidConfig("stage requires a name".to_string()))?;

    let name = normalize_stage_name(raw_name);
    if name.is_empty() {
        return Err(PipelineError::InvalidConfig(
            "stage name must not be empty".to_string(),
        ));
    }

    let mut strategy = None;
    let mut account = None;
    let mut region = None;
    let mut deploy_role: Option<RoleRef> = None;
    let mut deployment_group: Option<DeploymentGroupRef> = None;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "strategy" => {
                    if let Some(s) = child.entries().first().and_then(|e| e.value().as_string()) {
                        strategy = Some(s.parse()?);
                    }
                }
                "account" => {
                    account = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "region" => {
                    region = child
                        .entries()
                        .first()
                        .and_then(|e| e.value().as_string())
                        .map(|s| s.to_string());
                }
                "deploy-role" => {
                    if let Some(arn) = child.entries().first().and_then(|e| e.value().as_string())
                    {
                        deploy_role = Some(RoleRef::new(arn));
                    }
                }
                "deployment-group" => {
                    deployment_group = Some(parse_deployment_group(&name, child)?);
                }
                _ => {}
            }
        }
    }

    let environment = Environment::resolve(&name, account, region)?;

    let mut stage = StageConfig::new(&name, strategy.unwrap_or_default(), environment);
    stage.deploy_role = deploy_role.map(Arc::new);
    stage.deployment_group = deployment_group.map(Arc::new);

    Ok(stage)
}

/// deployment-group ノードをパース
///
/// application= と group= の両プロパティが必須です。
fn parse_deployment_group(stage_name: &str, node: &KdlNode) -> Result<DeploymentGroupRef> {
    let mut application = None;
    let mut group = None;

    for entry in node.entries() {
        let Some(key) = entry.name() else { continue };
        let value = entry.value().as_string().map(|s| s.to_string());
        match key.value() {
            "application" => application = value,
            "group" => group = value,
            _ => {}
        }
    }

    match (application, group) {
        (Some(application), Some(group)) => Ok(DeploymentGroupRef { application, group }),
        _ => Err(PipelineError::InvalidConfig(format!(
            "ステージ '{}' の deployment-group には application= と group= の両方が必要です",
            stage_name
        ))),
    }
}

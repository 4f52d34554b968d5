//! パイプラインアセンブラー
//!
//! 解決済みステージを順に消費してパイプラインプランを組み立てます。

use crate::action::{Artifact, DeployAction};
use crate::commands::deploy_commands;
use crate::error::Result;
use crate::resolver::{ResolvedStage, StageResolver};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shipflow_core::model::{Environment, Pipeline, TrustStatement};
use tracing::info;

/// ソースステージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStagePlan {
    pub repository: String,
    pub branch: String,
    pub output_artifact: String,
}

/// ビルドステージ
///
/// コンテナイメージのビルドに加えて、各デプロイステージ向けの
/// imageDetail / taskdef / appspec 準備コマンドを含みます。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStagePlan {
    pub input_artifact: String,
    pub output_artifact: String,
    pub commands: Vec<String>,
}

/// パイプラインプラン
///
/// `ship synth` の出力。ソース → ビルド → デプロイステージ群（タグの辞書順）の
/// 構成と、クロスアカウント用の信頼ステートメントを持ちます。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinePlan {
    pub app_name: String,
    pub home: Environment,
    /// 初回ブートストラップ合成かどうか
    ///
    /// ブートストラップ時はサービススタックがまだ存在しないため、
    /// デプロイステージと信頼ステートメントは出力されません。
    pub bootstrap: bool,
    pub build_number: Option<u64>,
    pub synthesized_at: DateTime<Utc>,
    pub source: SourceStagePlan,
    pub build: BuildStagePlan,
    pub deploy_stages: Vec<DeployAction>,
    pub trust_statements: Vec<TrustStatement>,
}

/// パイプラインを解決してプランを組み立てる
///
/// デプロイステージの順序は入力のステージ順（タグの辞書順）と一致します。
pub fn assemble(
    pipeline: &Pipeline,
    build_number: Option<u64>,
) -> Result<(PipelinePlan, Vec<ResolvedStage>)> {
    let resolver = StageResolver::new(&pipeline.app_name, pipeline.home.clone());
    let (resolved, trusts) = resolver.resolve_all(pipeline.stages.clone())?;

    let bootstrap = build_number.is_none();

    let source = SourceStagePlan {
        repository: pipeline
            .variables
            .get("repository")
            .cloned()
            .unwrap_or_else(|| pipeline.app_name.clone()),
        branch: pipeline
            .variables
            .get("branch")
            .cloned()
            .unwrap_or_else(|| "main".to_string()),
        output_artifact: "SourceOutput".to_string(),
    };

    let build_artifact = Artifact::new("BuildOutput");
    let mut build_commands = vec![format!(
        "docker build -t {}:${{CODEBUILD_RESOLVED_SOURCE_VERSION}} .",
        pipeline.app_name
    )];

    let mut deploy_stages = Vec::new();
    let mut trust_statements = Vec::new();

    if bootstrap {
        info!(
            app_name = %pipeline.app_name,
            "Bootstrap synthesis: deploy stages omitted"
        );
    } else {
        for (index, resolved_stage) in resolved.iter().enumerate() {
            let stage = resolved_stage.stage();
            build_commands.extend(deploy_commands(&pipeline.app_name, stage)?);

            let run_order = (index + 1) as u32;
            deploy_stages.push(DeployAction::new(stage, &build_artifact, run_order)?);
        }

        trust_statements = trusts.iter().map(|t| t.assume_role_statement()).collect();
    }

    let plan = PipelinePlan {
        app_name: pipeline.app_name.clone(),
        home: pipeline.home.clone(),
        bootstrap,
        build_number,
        synthesized_at: Utc::now(),
        source,
        build: BuildStagePlan {
            input_artifact: "SourceOutput".to_string(),
            output_artifact: build_artifact.name,
            commands: build_commands,
        },
        deploy_stages,
        trust_statements,
    };

    info!(
        app_name = %plan.app_name,
        deploy_stage_count = plan.deploy_stages.len(),
        trust_count = plan.trust_statements.len(),
        bootstrap = plan.bootstrap,
        "Pipeline plan assembled"
    );

    Ok((plan, resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipflow_core::model::{
        DeployStrategy, DeploymentGroupRef, RoleRef, StageConfig,
    };

    fn home() -> Environment {
        Environment::new("111111111111", "us-east-1")
    }

    fn pipeline_with(stages: Vec<StageConfig>) -> Pipeline {
        let mut pipeline = Pipeline::new("myapp".to_string(), home(), stages);
        pipeline.sort_stages();
        pipeline
    }

    #[test]
    fn test_deploy_order_matches_lexicographic_tags() {
        let stages = vec![
            StageConfig::new("Gamma", DeployStrategy::AllAtOnce, home()),
            StageConfig::new("Alpha", DeployStrategy::AllAtOnce, home()),
            StageConfig::new("Beta", DeployStrategy::AllAtOnce, home()),
        ];

        let (plan, _) = assemble(&pipeline_with(stages), Some(42)).unwrap();

        let tags: Vec<&str> = plan
            .deploy_stages
            .iter()
            .map(|a| a.stage_tag.as_str())
            .collect();
        assert_eq!(tags, vec!["Alpha", "Beta", "Gamma"]);

        // run_order は順に割り当てられる
        let orders: Vec<u32> = plan.deploy_stages.iter().map(|a| a.run_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_bootstrap_omits_deploy_stages() {
        let stages = vec![StageConfig::new(
            "PreProd",
            DeployStrategy::AllAtOnce,
            home(),
        )];

        let (plan, resolved) = assemble(&pipeline_with(stages), None).unwrap();

        assert!(plan.bootstrap);
        assert!(plan.deploy_stages.is_empty());
        assert!(plan.trust_statements.is_empty());
        // 解決自体は行われる（設定エラーは早期に検出される）
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_empty_stage_list_yields_source_and_build_only() {
        let (plan, resolved) = assemble(&pipeline_with(Vec::new()), Some(1)).unwrap();

        assert!(resolved.is_empty());
        assert!(plan.deploy_stages.is_empty());
        assert!(plan.trust_statements.is_empty());
        assert_eq!(plan.source.output_artifact, "SourceOutput");
        assert_eq!(plan.build.commands.len(), 1);
    }

    #[test]
    fn test_cross_account_trust_statements_emitted() {
        let cross = StageConfig::new(
            "Alpha",
            DeployStrategy::Canary10PercentEvery5Min,
            Environment::new("222222222222", "us-west-2"),
        )
        .with_external_refs(
            RoleRef::new("arn:aws:iam::222222222222:role/myapp-Alpha-deploy"),
            DeploymentGroupRef::new("myapp", "myapp-Alpha"),
        );

        let (plan, _) = assemble(&pipeline_with(vec![cross]), Some(7)).unwrap();

        assert_eq!(plan.trust_statements.len(), 1);
        assert_eq!(plan.trust_statements[0].action, "sts:AssumeRole");
        assert_eq!(
            plan.trust_statements[0].resource,
            "arn:aws:iam::222222222222:role/myapp-Alpha-deploy"
        );
    }

    #[test]
    fn test_missing_deployment_group_fails_at_assembly() {
        let mut cross = StageConfig::new(
            "Alpha",
            DeployStrategy::AllAtOnce,
            Environment::new("222222222222", "us-west-2"),
        );
        cross.deploy_role = Some(std::sync::Arc::new(RoleRef::new(
            "arn:aws:iam::222222222222:role/myapp-Alpha-deploy",
        )));

        let result = assemble(&pipeline_with(vec![cross]), Some(1));
        assert!(matches!(
            result,
            Err(crate::error::SynthError::MissingDeploymentGroup { .. })
        ));
    }

    #[test]
    fn test_plan_serializes_to_json() {
        let stages = vec![StageConfig::new(
            "PreProd",
            DeployStrategy::AllAtOnce,
            home(),
        )];

        let (plan, _) = assemble(&pipeline_with(stages), Some(3)).unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["app_name"], "myapp");
        assert_eq!(json["bootstrap"], false);
        assert_eq!(json["deploy_stages"][0]["stage_tag"], "PreProd");
        assert_eq!(
            json["deploy_stages"][0]["deployment_config"],
            "CodeDeployDefault.ECSAllAtOnce"
        );
    }
}

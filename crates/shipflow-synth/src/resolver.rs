//! ステージリゾルバー
//!
//! 各ステージを同一アカウント / クロスアカウントに振り分け、
//! ロールとデプロイメントグループの参照を確定させます。

use crate::error::{Result, SynthError};
use shipflow_core::model::{
    CrossAccountTrust, DeploymentGroupRef, Environment, RoleRef, StageConfig,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// 解決済みステージ
///
/// 同一アカウントステージはプールされた共有ペアを、
/// クロスアカウントステージは外部供給された参照と信頼関係を持ちます。
#[derive(Debug, Clone)]
pub enum ResolvedStage {
    /// パイプラインのホームアカウント内のステージ
    Local { stage: StageConfig },
    /// 別アカウントのステージ
    CrossAccount {
        stage: StageConfig,
        trust: CrossAccountTrust,
    },
}

impl ResolvedStage {
    pub fn stage(&self) -> &StageConfig {
        match self {
            ResolvedStage::Local { stage } => stage,
            ResolvedStage::CrossAccount { stage, .. } => stage,
        }
    }

    pub fn is_cross_account(&self) -> bool {
        matches!(self, ResolvedStage::CrossAccount { .. })
    }
}

/// 同一アカウント用にプールされたロール・デプロイメントグループのペア
#[derive(Debug, Clone)]
struct PooledTarget {
    role: Arc<RoleRef>,
    group: Arc<DeploymentGroupRef>,
}

/// ステージリゾルバー
///
/// 同一アカウントのターゲットはアカウントごとに一度だけ遅延作成され、
/// そのアカウントの全ステージで同じ `Arc` が共有されます。
/// クロスアカウントの信頼関係はターゲットアカウントごとに1つだけ作られます。
pub struct StageResolver {
    app_name: String,
    home: Environment,
    pool: HashMap<String, PooledTarget>,
    trusts: BTreeMap<String, CrossAccountTrust>,
}

impl StageResolver {
    pub fn new(app_name: impl Into<String>, home: Environment) -> Self {
        Self {
            app_name: app_name.into(),
            home,
            pool: HashMap::new(),
            trusts: BTreeMap::new(),
        }
    }

    /// ステージ列を順に解決
    ///
    /// 入力順（= タグの辞書順 = デプロイ順）を維持して返します。
    pub fn resolve_all(
        mut self,
        stages: Vec<StageConfig>,
    ) -> Result<(Vec<ResolvedStage>, Vec<CrossAccountTrust>)> {
        let mut resolved = Vec::with_capacity(stages.len());

        for stage in stages {
            resolved.push(self.resolve(stage)?);
        }

        // BTreeMapなのでアカウント順で安定
        let trusts: Vec<CrossAccountTrust> = self.trusts.into_values().collect();

        info!(
            stage_count = resolved.len(),
            trust_count = trusts.len(),
            "Stage resolution complete"
        );

        Ok((resolved, trusts))
    }

    /// 1ステージを解決
    fn resolve(&mut self, mut stage: StageConfig) -> Result<ResolvedStage> {
        if stage.environment.account == self.home.account {
            // 同一アカウント: プールされた共有ペアを割り当てる
            let pooled = self.pooled_target(&stage);
            stage.deploy_role = Some(Arc::clone(&pooled.role));
            stage.deployment_group = Some(Arc::clone(&pooled.group));

            debug!(stage = %stage.name, "Resolved as same-account stage");
            Ok(ResolvedStage::Local { stage })
        } else {
            // クロスアカウント: ローカルでは作成しない。
            // 外部スタックから供給された参照が揃っていることを検証する。
            let role = stage
                .deploy_role
                .as_ref()
                .ok_or_else(|| SynthError::MissingDeployRole {
                    stage: stage.name.clone(),
                })?;
            stage
                .deployment_group
                .as_ref()
                .ok_or_else(|| SynthError::MissingDeploymentGroup {
                    stage: stage.name.clone(),
                })?;

            let target_account = stage.environment.account.clone();
            let trust = self
                .trusts
                .entry(target_account.clone())
                .or_insert_with(|| {
                    debug!(
                        target_account = %target_account,
                        "Creating cross-account trust"
                    );
                    CrossAccountTrust::new(
                        self.home.account.clone(),
                        target_account.clone(),
                        RoleRef::new(role.arn.clone()),
                    )
                })
                .clone();

            debug!(stage = %stage.name, target_account = %stage.environment.account, "Resolved as cross-account stage");
            Ok(ResolvedStage::CrossAccount { stage, trust })
        }
    }

    /// アカウントのプールされたターゲットを取得（なければ作成）
    ///
    /// ペアの名前はアプリ名と、そのアカウントで最初に解決された
    /// ステージのタグから決定されます（ステージ列はソート済みなので決定的）。
    fn pooled_target(&mut self, stage: &StageConfig) -> PooledTarget {
        let account = stage.environment.account.clone();
        let app = self.app_name.clone();

        self.pool
            .entry(account.clone())
            .or_insert_with(|| {
                let base = format!("{}-{}", app, stage.name);
                debug!(account = %account, base = %base, "Creating pooled deploy target");
                PooledTarget {
                    role: Arc::new(RoleRef::new(format!(
                        "arn:aws:iam::{}:role/{}-deploy",
                        account, base
                    ))),
                    group: Arc::new(DeploymentGroupRef::new(app, base)),
                }
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipflow_core::model::DeployStrategy;

    fn home() -> Environment {
        Environment::new("111111111111", "us-east-1")
    }

    fn local_stage(name: &str) -> StageConfig {
        StageConfig::new(name, DeployStrategy::AllAtOnce, home())
    }

    fn cross_stage(name: &str, account: &str) -> StageConfig {
        StageConfig::new(
            name,
            DeployStrategy::Canary10PercentEvery5Min,
            Environment::new(account, "us-west-2"),
        )
        .with_external_refs(
            RoleRef::new(format!("arn:aws:iam::{}:role/myapp-{}-deploy", account, name)),
            DeploymentGroupRef::new("myapp", format!("myapp-{}", name)),
        )
    }

    #[test]
    fn test_same_account_stages_share_one_pair() {
        let resolver = StageResolver::new("myapp", home());
        let stages = vec![local_stage("Alpha"), local_stage("Beta"), local_stage("Gamma")];

        let (resolved, trusts) = resolver.resolve_all(stages).unwrap();
        assert!(trusts.is_empty());

        // 全ステージが同一の Arc を共有していること
        let first_role = resolved[0].stage().deploy_role.as_ref().unwrap();
        let first_group = resolved[0].stage().deployment_group.as_ref().unwrap();
        for r in &resolved {
            assert!(Arc::ptr_eq(
                first_role,
                r.stage().deploy_role.as_ref().unwrap()
            ));
            assert!(Arc::ptr_eq(
                first_group,
                r.stage().deployment_group.as_ref().unwrap()
            ));
        }
    }

    #[test]
    fn test_pooled_pair_named_from_first_stage_in_order() {
        let resolver = StageResolver::new("myapp", home());
        let stages = vec![local_stage("Alpha"), local_stage("Beta")];

        let (resolved, _) = resolver.resolve_all(stages).unwrap();

        let role = resolved[0].stage().deploy_role.as_ref().unwrap();
        assert_eq!(role.arn, "arn:aws:iam::111111111111:role/myapp-Alpha-deploy");

        let group = resolved[1].stage().deployment_group.as_ref().unwrap();
        assert_eq!(group.application, "myapp");
        assert_eq!(group.group, "myapp-Alpha");
    }

    #[test]
    fn test_cross_account_stage_keeps_supplied_refs() {
        let resolver = StageResolver::new("myapp", home());
        let stages = vec![cross_stage("Alpha", "222222222222")];

        let (resolved, trusts) = resolver.resolve_all(stages).unwrap();

        assert!(resolved[0].is_cross_account());
        assert_eq!(
            resolved[0].stage().deploy_role.as_ref().unwrap().arn,
            "arn:aws:iam::222222222222:role/myapp-Alpha-deploy"
        );
        assert_eq!(trusts.len(), 1);
        assert_eq!(trusts[0].target_account, "222222222222");
    }

    #[test]
    fn test_one_trust_per_target_account() {
        let resolver = StageResolver::new("myapp", home());
        let stages = vec![
            cross_stage("Alpha", "222222222222"),
            cross_stage("Beta", "222222222222"),
            cross_stage("Gamma", "333333333333"),
        ];

        let (resolved, trusts) = resolver.resolve_all(stages).unwrap();
        assert_eq!(resolved.len(), 3);

        // ターゲットアカウントごとに1つだけ
        assert_eq!(trusts.len(), 2);
        let statements: Vec<_> = trusts.iter().map(|t| t.assume_role_statement()).collect();
        assert!(statements.iter().all(|s| s.action == "sts:AssumeRole"));
        assert_eq!(
            statements[0].resource,
            "arn:aws:iam::222222222222:role/myapp-Alpha-deploy"
        );
        assert_eq!(
            statements[1].resource,
            "arn:aws:iam::333333333333:role/myapp-Gamma-deploy"
        );
    }

    #[test]
    fn test_cross_account_without_role_fails() {
        let resolver = StageResolver::new("myapp", home());
        let stage = StageConfig::new(
            "Alpha",
            DeployStrategy::AllAtOnce,
            Environment::new("222222222222", "us-west-2"),
        );

        let result = resolver.resolve_all(vec![stage]);
        assert!(matches!(
            result,
            Err(SynthError::MissingDeployRole { .. })
        ));
    }

    #[test]
    fn test_cross_account_without_deployment_group_fails() {
        let resolver = StageResolver::new("myapp", home());
        let mut stage = StageConfig::new(
            "Alpha",
            DeployStrategy::AllAtOnce,
            Environment::new("222222222222", "us-west-2"),
        );
        stage.deploy_role = Some(Arc::new(RoleRef::new(
            "arn:aws:iam::222222222222:role/myapp-Alpha-deploy",
        )));

        let result = resolver.resolve_all(vec![stage]);
        assert!(matches!(
            result,
            Err(SynthError::MissingDeploymentGroup { .. })
        ));
    }

    #[test]
    fn test_empty_stage_list_is_legal() {
        let resolver = StageResolver::new("myapp", home());
        let (resolved, trusts) = resolver.resolve_all(Vec::new()).unwrap();
        assert!(resolved.is_empty());
        assert!(trusts.is_empty());
    }

    #[test]
    fn test_cross_account_stage_gets_no_pooled_pair() {
        let resolver = StageResolver::new("myapp", home());
        let stages = vec![local_stage("Alpha"), cross_stage("Beta", "222222222222")];

        let (resolved, _) = resolver.resolve_all(stages).unwrap();

        let local_role = resolved[0].stage().deploy_role.as_ref().unwrap();
        let cross_role = resolved[1].stage().deploy_role.as_ref().unwrap();

        // プールされたペアとは別のインスタンスであること
        assert!(!Arc::ptr_eq(local_role, cross_role));
        assert_ne!(local_role.arn, cross_role.arn);
    }
}

//! モデル定義
//!
//! ShipFlowで使用されるデータモデルを定義します。
//! 各モデルは機能ごとにモジュールに分離されています。

mod environment;
mod pipeline;
mod stage;
mod strategy;
mod trust;

// Re-exports
pub use environment::*;
pub use pipeline::*;
pub use stage::*;
pub use strategy::*;
pub use trust::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_creation() {
        let home = Environment::new("111111111111", "us-east-1");
        let stages = vec![
            StageConfig::new(
                "PreProd",
                DeployStrategy::AllAtOnce,
                Environment::new("111111111111", "us-east-1"),
            ),
            StageConfig::new(
                "Alpha",
                DeployStrategy::Canary10PercentEvery5Min,
                Environment::new("222222222222", "us-west-2"),
            ),
        ];

        let mut pipeline = Pipeline::new("myapp", home, stages);
        pipeline.sort_stages();

        assert_eq!(pipeline.app_name, "myapp");
        assert_eq!(pipeline.stages.len(), 2);
        // ステージタグの辞書順
        assert_eq!(pipeline.stages[0].name, "Alpha");
        assert_eq!(pipeline.stages[1].name, "PreProd");
    }

    #[test]
    fn test_pipeline_stage_lookup() {
        let home = Environment::new("111111111111", "us-east-1");
        let pipeline = Pipeline::new(
            "myapp",
            home.clone(),
            vec![StageConfig::new(
                "Beta",
                DeployStrategy::AllAtOnce,
                home.clone(),
            )],
        );

        assert!(pipeline.stage("Beta").is_some());
        assert!(pipeline.stage("Gamma").is_none());
    }

    #[test]
    fn test_empty_stage_list_is_legal() {
        // ステージなしのパイプラインも合法（ソースステージのみのパイプラインになる）
        let home = Environment::new("111111111111", "us-east-1");
        let pipeline = Pipeline::new("myapp", home, vec![]);
        assert!(pipeline.stages.is_empty());
    }

    #[test]
    fn test_role_ref_serialization() {
        let role = RoleRef {
            arn: "arn:aws:iam::111111111111:role/myapp-deploy".to_string(),
        };

        let json = serde_json::to_string(&role).unwrap();
        assert!(json.contains("myapp-deploy"));

        let deserialized: RoleRef = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, role);
    }
}

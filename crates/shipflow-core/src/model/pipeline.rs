//! パイプライン定義

use super::environment::Environment;
use super::stage::StageConfig;
use std::collections::HashMap;

/// Pipeline - デプロイトポロジーの設計図
///
/// Pipelineはアプリケーション名、パイプラインのホーム環境、
/// デプロイ順に並んだステージのリストを保持します。
/// ステージ順はパイプラインのステージ列をそのまま決定するため、
/// 順序は意味を持ちます（ステージタグの辞書順）。
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// アプリケーション名
    pub app_name: String,
    /// パイプライン自身が動くホーム環境
    pub home: Environment,
    /// デプロイ順に並んだステージ
    pub stages: Vec<StageConfig>,
    /// プロジェクト共通の変数（テンプレート展開で使用可能）
    pub variables: HashMap<String, String>,
}

impl Pipeline {
    pub fn new(
        app_name: impl Into<String>,
        home: Environment,
        stages: Vec<StageConfig>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            home,
            stages,
            variables: HashMap::new(),
        }
    }

    /// ステージをタグの辞書順にソート
    ///
    /// この順序がそのままデプロイ順になります。
    pub fn sort_stages(&mut self) {
        self.stages.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// 名前でステージを検索
    pub fn stage(&self, name: &str) -> Option<&StageConfig> {
        self.stages.iter().find(|s| s.name == name)
    }
}

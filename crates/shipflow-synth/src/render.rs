//! デプロイドキュメントのレンダリング
//!
//! appspec.yaml / taskdef.json を組み込みTeraテンプレートから生成します。
//! `<TASK_ROLE_ARN>` / `<TASK_FAMILY>` / `<IMAGE1_NAME>` の各プレースホルダは
//! デプロイ時にコマンド列が埋めるため、レンダリング後も残ります。

use crate::error::{Result, SynthError};
use shipflow_core::model::StageConfig;
use std::collections::HashMap;
use tera::{Context, Tera};

const APPSPEC_TEMPLATE: &str = include_str!("../templates/appspec.yaml.tera");
const TASKDEF_TEMPLATE: &str = include_str!("../templates/taskdef.json.tera");

/// デプロイドキュメントレンダラー
///
/// コンテナ名・ポート・CPU・メモリは variables ブロックで上書きできます
/// (`container_name`, `container_port`, `task_cpu`, `task_memory`)。
pub struct DocumentRenderer {
    app_name: String,
    container_name: String,
    container_port: String,
    task_cpu: String,
    task_memory: String,
}

impl DocumentRenderer {
    pub fn new(app_name: impl Into<String>, variables: &HashMap<String, String>) -> Self {
        let app_name = app_name.into();
        let get = |key: &str, default: &str| {
            variables
                .get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            container_name: get("container_name", &app_name),
            container_port: get("container_port", "8080"),
            task_cpu: get("task_cpu", "256"),
            task_memory: get("task_memory", "512"),
            app_name,
        }
    }

    /// appspec.yaml をレンダリング
    pub fn render_appspec(&self, stage: &StageConfig) -> Result<String> {
        self.render(APPSPEC_TEMPLATE, stage)
    }

    /// taskdef.json をレンダリング
    pub fn render_taskdef(&self, stage: &StageConfig) -> Result<String> {
        self.render(TASKDEF_TEMPLATE, stage)
    }

    fn render(&self, template: &str, stage: &StageConfig) -> Result<String> {
        let mut context = Context::new();
        context.insert("app_name", &self.app_name);
        context.insert("stage_tag", &stage.name);
        context.insert("account", &stage.environment.account);
        context.insert("region", &stage.environment.region);
        context.insert("container_name", &self.container_name);
        context.insert("container_port", &self.container_port);
        context.insert("task_cpu", &self.task_cpu);
        context.insert("task_memory", &self.task_memory);

        Tera::one_off(template, &context, false).map_err(|e| SynthError::Render(e.to_string()))
    }
}

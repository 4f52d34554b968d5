//! テンプレート展開機能
//!
//! Teraを使用してKDL設定ファイルのテンプレート展開を行います。

use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera};
use tracing::{debug, info};

/// 変数コンテキスト
pub type Variables = HashMap<String, serde_json::Value>;

/// テンプレートプロセッサ
pub struct TemplateProcessor {
    tera: Tera,
    context: Context,
}

impl TemplateProcessor {
    /// 新しいテンプレートプロセッサを作成
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
            context: Context::new(),
        }
    }

    /// 変数を追加
    pub fn add_variable(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.context.insert(key.into(), &value);
    }

    /// 複数の変数を追加
    pub fn add_variables(&mut self, variables: Variables) {
        for (key, value) in variables {
            self.context.insert(key, &value);
        }
    }

    /// 環境変数を追加（安全なもののみ）
    ///
    /// セキュリティ上の理由から、以下のプレフィックスを持つ環境変数のみを許可:
    /// - SHIP_*: ShipFlow専用の環境変数
    /// - CI_*: CI/CD環境の変数
    /// - APP_*: アプリケーション設定
    #[tracing::instrument(skip(self))]
    pub fn add_env_variables(&mut self) {
        const ALLOWED_PREFIXES: &[&str] = &["SHIP_", "CI_", "APP_"];
        let mut count = 0;

        for (key, value) in std::env::vars() {
            if ALLOWED_PREFIXES
                .iter()
                .any(|prefix| key.starts_with(prefix))
            {
                debug!(key = %key, "Adding environment variable");
                self.context.insert(key, &serde_json::Value::String(value));
                count += 1;
            }
        }

        info!(env_var_count = count, "Added filtered environment variables");
    }

    /// .env ファイルから変数を読み込んで追加
    ///
    /// .env ファイルの変数はプレフィックス制限なしで全て読み込まれます。
    /// これは .env が明示的に配置されたファイルであるためです。
    #[tracing::instrument(skip(self))]
    pub fn add_env_file_variables(&mut self, env_file_path: &Path) -> Result<()> {
        let content =
            std::fs::read_to_string(env_file_path).map_err(|e| PipelineError::IoError {
                path: env_file_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut count = 0;
        for line in content.lines() {
            let line = line.trim();

            // 空行とコメント行をスキップ
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = strip_quotes(value.trim());

                debug!(key = %key, "Adding variable from .env file");
                self.context
                    .insert(key, &serde_json::Value::String(value.to_string()));
                count += 1;
            }
        }

        info!(
            env_file = %env_file_path.display(),
            variable_count = count,
            "Loaded variables from .env file"
        );

        Ok(())
    }

    /// 文字列をテンプレートとして展開
    pub fn render_str(&mut self, template: &str) -> Result<String> {
        self.tera.render_str(template, &self.context).map_err(|e| {
            let error_detail = extract_tera_error_detail(&e);
            PipelineError::TemplateRenderError(error_detail)
        })
    }

    /// ファイルを読み込んでテンプレート展開
    pub fn render_file(&mut self, path: &Path) -> Result<String> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        self.render_str(&content).map_err(|e| {
            // TemplateRenderErrorをファイル情報付きのTemplateErrorに変換
            if let PipelineError::TemplateRenderError(msg) = e {
                PipelineError::TemplateError {
                    file: path.to_path_buf(),
                    line: None,
                    message: msg,
                }
            } else {
                e
            }
        })
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// KDLファイルから変数定義を抽出
///
/// variables { ... } ブロックを探してHashMapに変換。
/// 正規表現でブロックを抽出することで、ドキュメント内の他の場所にある
/// テンプレート変数 {{ ... }} によるパースエラーを回避します。
pub fn extract_variables(kdl_content: &str) -> Result<Variables> {
    use regex::Regex;

    let re = Regex::new(r"(?s)variables\s*\{(?P<content>.*?)\}")
        .map_err(|e| PipelineError::InvalidConfig(format!("正規表現のコンパイルエラー: {}", e)))?;

    let mut all_vars = HashMap::new();

    for cap in re.captures_iter(kdl_content) {
        if let Some(var_content) = cap.name("content") {
            // ブロックの中身だけをダミーのKDLとしてパース
            let dummy_kdl = format!("extracted {{\n{}\n}}", var_content.as_str());
            let doc: kdl::KdlDocument = dummy_kdl.parse().map_err(|e| {
                PipelineError::InvalidConfig(format!("KDL パースエラー (変数抽出ブロック): {}", e))
            })?;

            if let Some(node) = doc.nodes().first()
                && let Some(children) = node.children()
            {
                for var_node in children.nodes() {
                    let key = var_node.name().value().to_string();
                    if let Some(entry) = var_node.entries().first() {
                        let value = kdl_value_to_json(entry.value());
                        all_vars.insert(key, value);
                    }
                }
            }
        }
    }

    Ok(all_vars)
}

/// クォートを除去するヘルパー関数
///
/// "value" → value
/// 'value' → value
/// value → value
fn strip_quotes(s: &str) -> &str {
    // 1文字だけのクォート（例: KEY="）は開始と終了が同じバイトになるため除外
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"'))
            || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Teraエラーから詳細情報を抽出
///
/// Teraのエラーメッセージを解析して、未定義変数などの具体的な情報を取得します。
fn extract_tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = Vec::new();
    details.push(e.to_string());

    // sourceチェーンをたどる
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }

    let full_error = details.join(" | ");

    // 未定義変数のパターンを検出: "Variable `xxx` not found in context"
    if full_error.contains("not found in context")
        && let Some(start) = full_error.find("Variable `")
        && let Some(end) = full_error[start..].find("` not found")
    {
        let var_name = &full_error[start + 10..start + end];
        return format!(
            "未定義の変数: `{}`\nヒント: variables ブロックで定義するか、.env ファイルに追加してください",
            var_name
        );
    }

    full_error
}

/// KDL値をJSON値に変換
fn kdl_value_to_json(value: &kdl::KdlValue) -> serde_json::Value {
    if let Some(s) = value.as_string() {
        serde_json::Value::String(s.to_string())
    } else if let Some(i) = value.as_integer() {
        // i128をi64に変換してからJSONに変換
        serde_json::Value::Number((i as i64).into())
    } else if let Some(f) = value.as_float() {
        serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    } else if let Some(b) = value.as_bool() {
        serde_json::Value::Bool(b)
    } else {
        serde_json::Value::Null
    }
}

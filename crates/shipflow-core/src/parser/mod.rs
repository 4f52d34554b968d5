//! KDLパーサー
//!
//! ShipFlowのKDL設定ファイルをパースします。
//! 各ノードタイプのパース処理はモジュールに分離されています。

mod stage;

use stage::parse_stage;

use crate::error::{PipelineError, Result};
use crate::model::{Environment, Pipeline, StageConfig};
use kdl::KdlDocument;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// KDLファイルをパースしてPipelineを生成
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Pipeline> {
    let content = fs::read_to_string(path.as_ref())?;
    let name = path
        .as_ref()
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_kdl_string(&content, name)
}

/// KDL文字列をパース
///
/// ステージはタグの辞書順にソートされて返されます。
/// この順序がそのままパイプラインのデプロイ順になります。
pub fn parse_kdl_string(content: &str, default_name: String) -> Result<Pipeline> {
    let doc: KdlDocument = content.parse()?;

    let mut app_name = default_name;
    let mut home_account: Option<String> = None;
    let mut home_region: Option<String> = None;
    let mut stages: Vec<StageConfig> = Vec::new();
    let mut variables: HashMap<String, String> = HashMap::new();

    for node in doc.nodes() {
        match node.name().value() {
            "pipeline" => {
                // pipeline "name" { account "..."; region "..." }
                if let Some(name) = node.entries().first().and_then(|e| e.value().as_string()) {
                    app_name = name.to_string();
                }
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        let value = child
                            .entries()
                            .first()
                            .and_then(|e| e.value().as_string())
                            .map(|s| s.to_string());
                        match child.name().value() {
                            "account" => home_account = value,
                            "region" => home_region = value,
                            _ => {}
                        }
                    }
                }
            }
            "stage" => {
                let stage = parse_stage(node)?;
                // 同名ステージの重複は設定ミスとして即座に弾く
                if stages.iter().any(|s| s.name == stage.name) {
                    return Err(PipelineError::InvalidConfig(format!(
                        "ステージ '{}' が重複して定義されています",
                        stage.name
                    )));
                }
                stages.push(stage);
            }
            "variables" => {
                if let Some(vars) = node.children() {
                    for var in vars.nodes() {
                        let key = var.name().value().to_string();
                        let value = var
                            .entries()
                            .first()
                            .and_then(|e| e.value().as_string())
                            .unwrap_or("")
                            .to_string();
                        variables.insert(key, value);
                    }
                }
            }
            _ => {
                // 不明なノードはスキップ（将来の拡張ノードも許可）
            }
        }
    }

    let home = Environment::resolve(&app_name, home_account, home_region)?;

    let mut pipeline = Pipeline::new(app_name, home, stages);
    pipeline.variables = variables;
    // ステージタグの辞書順 = デプロイ順
    pipeline.sort_stages();

    Ok(pipeline)
}

//! ファイル自動発見機能
//!
//! 規約ベースのディレクトリ構造からKDLファイルを自動的に発見します。

use crate::error::{PipelineError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 発見されたファイル群
#[derive(Debug, Clone, Default)]
pub struct DiscoveredFiles {
    /// ルートファイル (pipeline.kdl)
    pub root: Option<PathBuf>,
    /// ステージ定義ファイル (stages/**/*.kdl)
    pub stages: Vec<PathBuf>,
    /// 変数定義ファイル (variables/**/*.kdl)
    pub variables: Vec<PathBuf>,
    /// ローカルオーバーライドファイル (pipeline.local.kdl)
    pub local_override: Option<PathBuf>,
    /// 環境変数ファイル (.env)
    pub env_file: Option<PathBuf>,
}

/// プロジェクトルートを検出
///
/// 以下の優先順位で検索:
/// 1. 環境変数 SHIPFLOW_PROJECT_ROOT
/// 2. カレントディレクトリから上に向かって以下を探す:
///    - pipeline.kdl
///    - .shipflow/pipeline.kdl
#[tracing::instrument]
pub fn find_project_root() -> Result<PathBuf> {
    // 1. 環境変数
    if let Ok(root) = std::env::var("SHIPFLOW_PROJECT_ROOT") {
        let path = PathBuf::from(&root);
        debug!(env_root = %root, "Checking SHIPFLOW_PROJECT_ROOT");
        if path.join("pipeline.kdl").exists() || path.join(".shipflow/pipeline.kdl").exists() {
            info!(project_root = %path.display(), "Found project root from environment variable");
            return Ok(path);
        }
    }

    // 2. カレントディレクトリから上に向かって探す
    let start_dir = std::env::current_dir()?;
    let mut current = start_dir.clone();
    debug!(start_dir = %start_dir.display(), "Searching for project root");

    loop {
        let pipeline_file = current.join("pipeline.kdl");
        if pipeline_file.exists() {
            info!(project_root = %current.display(), "Found project root (pipeline.kdl)");
            return Ok(current);
        }

        let shipflow_dir_file = current.join(".shipflow/pipeline.kdl");
        if shipflow_dir_file.exists() {
            info!(project_root = %current.display(), "Found project root (.shipflow/pipeline.kdl)");
            return Ok(current);
        }

        // 親ディレクトリへ
        if !current.pop() {
            break;
        }
    }

    warn!(start_dir = %start_dir.display(), "Project root not found");
    Err(PipelineError::ProjectRootNotFound(start_dir))
}

/// プロジェクトルートからファイルを自動発見
#[tracing::instrument(skip(project_root), fields(project_root = %project_root.display()))]
pub fn discover_files(project_root: &Path) -> Result<DiscoveredFiles> {
    debug!("Starting file discovery");
    let mut discovered = DiscoveredFiles::default();

    // pipeline.kdl または .shipflow/pipeline.kdl
    let root_file = project_root.join("pipeline.kdl");
    let shipflow_root_file = project_root.join(".shipflow/pipeline.kdl");
    if root_file.exists() {
        debug!(file = %root_file.display(), "Found root file");
        discovered.root = Some(root_file);
    } else if shipflow_root_file.exists() {
        debug!(file = %shipflow_root_file.display(), "Found root file in .shipflow/");
        discovered.root = Some(shipflow_root_file);
    }

    // stages/**/*.kdl
    let stages_dir = project_root.join("stages");
    if stages_dir.is_dir() {
        discovered.stages = discover_kdl_files(&stages_dir)?;
        info!(
            stage_count = discovered.stages.len(),
            "Discovered stage files"
        );
    }

    // variables/**/*.kdl
    let variables_dir = project_root.join("variables");
    if variables_dir.is_dir() {
        discovered.variables = discover_kdl_files(&variables_dir)?;
        info!(
            variable_count = discovered.variables.len(),
            "Discovered variable files"
        );
    }

    // pipeline.local.kdl または .shipflow/pipeline.local.kdl
    let local_override = project_root.join("pipeline.local.kdl");
    let shipflow_local_override = project_root.join(".shipflow/pipeline.local.kdl");
    if local_override.exists() {
        discovered.local_override = Some(local_override);
    } else if shipflow_local_override.exists() {
        discovered.local_override = Some(shipflow_local_override);
    }

    // .env または .shipflow/.env
    let env_file = project_root.join(".env");
    let shipflow_env_file = project_root.join(".shipflow/.env");
    if env_file.exists() {
        debug!(file = %env_file.display(), "Found .env file");
        discovered.env_file = Some(env_file);
    } else if shipflow_env_file.exists() {
        debug!(file = %shipflow_env_file.display(), "Found .env file in .shipflow/");
        discovered.env_file = Some(shipflow_env_file);
    }

    Ok(discovered)
}

/// ディレクトリ配下の .kdl ファイルを再帰的に発見
///
/// アルファベット順にソートして返す
fn discover_kdl_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();

    visit_dir(dir, &mut files, &mut visited)?;

    // アルファベット順にソート
    files.sort();

    Ok(files)
}

/// ディレクトリを再帰的に走査
fn visit_dir(dir: &Path, files: &mut Vec<PathBuf>, visited: &mut HashSet<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    // 正規化されたパスを取得してループを検出
    let canonical_dir = dir
        .canonicalize()
        .map_err(|e| PipelineError::DiscoveryError {
            path: dir.to_path_buf(),
            message: format!("パスの正規化に失敗: {}", e),
        })?;

    // ループ検出: 既に訪問済みなら終了
    if visited.contains(&canonical_dir) {
        warn!(dir = %canonical_dir.display(), "Symlink loop detected, skipping");
        return Ok(());
    }

    visited.insert(canonical_dir);

    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::DiscoveryError {
        path: dir.to_path_buf(),
        message: format!("ディレクトリの読み込みに失敗: {}", e),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::DiscoveryError {
            path: dir.to_path_buf(),
            message: format!("ディレクトリエントリの読み込みに失敗: {}", e),
        })?;
        let path = entry.path();

        if path.is_dir() {
            visit_dir(&path, files, visited)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some("kdl") {
            files.push(path);
        }
    }

    Ok(())
}

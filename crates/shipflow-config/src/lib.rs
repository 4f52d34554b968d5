pub mod error;

pub use error::*;

use std::path::PathBuf;

/// ShipFlowの設定ディレクトリパスを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("shipflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// プロジェクトのpipeline.kdlファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 SHIP_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: pipeline.local.kdl, .pipeline.local.kdl, pipeline.kdl, .pipeline.kdl
/// 3. ./.shipflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/shipflow/pipeline.kdl (グローバル設定)
pub fn find_pipeline_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var("SHIP_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    let candidates = [
        "pipeline.local.kdl",
        ".pipeline.local.kdl",
        "pipeline.kdl",
        ".pipeline.kdl",
    ];

    // 2. カレントディレクトリで検索
    for filename in &candidates {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. ./.shipflow/ ディレクトリで検索
    let shipflow_dir = current_dir.join(".shipflow");
    if shipflow_dir.is_dir() {
        for filename in &candidates {
            let path = shipflow_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    // 4. グローバル設定ファイル (~/.config/shipflow/pipeline.kdl)
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("shipflow").join("pipeline.kdl");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    // どの設定ファイルも見つからなかった
    Err(ConfigError::PipelineFileNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        let result = get_config_dir();
        assert!(result.is_ok());

        let config_dir = result.unwrap();
        assert!(config_dir.ends_with("shipflow"));
        assert!(config_dir.exists());
    }

    #[test]
    #[serial]
    fn test_find_pipeline_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("pipeline.kdl"), "// test").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_pipeline_file();
        assert!(result.is_ok());

        let pipeline_file = result.unwrap();
        assert!(pipeline_file.ends_with("pipeline.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_pipeline_file_local_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        // pipeline.kdl と pipeline.local.kdl の両方を作成
        fs::write(temp_dir.path().join("pipeline.kdl"), "// shared").unwrap();
        fs::write(temp_dir.path().join("pipeline.local.kdl"), "// local").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_pipeline_file().unwrap();
        // ローカルオーバーライドが優先される
        assert!(result.ends_with("pipeline.local.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_pipeline_file_in_shipflow_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::create_dir_all(temp_dir.path().join(".shipflow")).unwrap();
        fs::write(temp_dir.path().join(".shipflow/pipeline.kdl"), "// test").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_pipeline_file().unwrap();
        assert!(result.ends_with(".shipflow/pipeline.kdl"));

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_find_pipeline_file_env_override() {
        let temp_dir = tempfile::tempdir().unwrap();
        let custom_path = temp_dir.path().join("custom.kdl");
        fs::write(&custom_path, "// custom").unwrap();

        // SAFETY: #[serial] により他のテストと環境変数の競合は起きない
        unsafe {
            std::env::set_var("SHIP_CONFIG_PATH", &custom_path);
        }

        let result = find_pipeline_file().unwrap();
        assert_eq!(result, custom_path);

        unsafe {
            std::env::remove_var("SHIP_CONFIG_PATH");
        }
    }
}

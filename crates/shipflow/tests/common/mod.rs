use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_pipeline_kdl(&self, content: &str) {
        let path = self.root.path().join("pipeline.kdl");
        fs::write(path, content).unwrap();
    }

    #[allow(dead_code)]
    pub fn write_stage(&self, name: &str, content: &str) {
        let dir = self.root.path().join("stages");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.kdl", name)), content).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }
}

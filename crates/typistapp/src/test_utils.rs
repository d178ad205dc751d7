use crate::config::StoreConfig;
use crate::init::{initialize, TypistContext};
use crate::paths::StorePaths;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub ctx: TypistContext,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    /// A freshly seeded store in a temporary directory.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let ctx = initialize(Some(root.clone())).expect("failed to initialize store");
        Self {
            _temp_dir: temp_dir,
            ctx,
            root,
        }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.ctx.paths
    }

    pub fn config(&self) -> &StoreConfig {
        &self.ctx.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_is_seeded() {
        let env = TestEnv::new();
        assert!(env.paths().index_file().exists());
        assert_eq!(env.config().session_limit(), 500);
        assert_eq!(env.ctx.library.library().unwrap().texts.len(), 2);
    }
}

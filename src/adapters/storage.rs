use crate::domain::ports::OutputStorage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// 直接覆寫原始檔
#[derive(Debug, Clone, Default)]
pub struct InPlaceStorage;

impl OutputStorage for InPlaceStorage {
    fn prepare_output(&self, input: &Path) -> Result<PathBuf> {
        Ok(input.to_path_buf())
    }
}

/// 把輸出寫到另一個目錄，保留相對於來源目錄的路徑
#[derive(Debug, Clone)]
pub struct LocalStorage {
    source_root: PathBuf,
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(source_root: impl Into<PathBuf>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            base_path: base_path.into(),
        }
    }
}

impl OutputStorage for LocalStorage {
    fn prepare_output(&self, input: &Path) -> Result<PathBuf> {
        let relative = match input.strip_prefix(&self.source_root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => input
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| input.to_path_buf()),
        };
        let full_path = self.base_path.join(relative);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(full_path)
    }
}

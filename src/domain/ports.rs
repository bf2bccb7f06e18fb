use crate::domain::model::{ArchiveEntry, ArchiveFile};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 決定燒字後的檔案要寫到哪裡
pub trait OutputStorage: Send + Sync {
    /// 回傳輸入檔對應的輸出路徑，必要時建立上層目錄
    fn prepare_output(&self, input: &Path) -> Result<PathBuf>;
}

/// 影像封存系統 (XNAT) 的唯讀列表介面
#[async_trait]
pub trait ArchiveApi: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<ArchiveEntry>>;
    async fn list_experiments(&self, project_id: &str) -> Result<Vec<ArchiveEntry>>;
    async fn list_scans(&self, experiment_id: &str) -> Result<Vec<ArchiveEntry>>;
    async fn list_scan_files(
        &self,
        experiment_id: &str,
        scan_id: &str,
        resource: &str,
    ) -> Result<Vec<ArchiveFile>>;
}

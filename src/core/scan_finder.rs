use crate::domain::model::ScanSummary;
use crate::domain::ports::ArchiveApi;
use crate::utils::error::Result;

/// 走訪封存系統時的上限
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_projects: usize,
    pub max_experiments_per_project: usize,
    pub resource: String,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_projects: 15,
            max_experiments_per_project: 3,
            resource: "DICOM".to_string(),
        }
    }
}

/// 專案 → 實驗 → 掃描 → 檔案，逐層列出並計算每個掃描的 DICOM 檔案數
pub struct ScanFinder<A: ArchiveApi> {
    api: A,
    limits: SearchLimits,
}

impl<A: ArchiveApi> ScanFinder<A> {
    pub fn new(api: A, limits: SearchLimits) -> Self {
        Self { api, limits }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// 回傳依檔案數遞增排序的掃描；列專案失敗才會回傳錯誤
    pub async fn find(&self) -> Result<Vec<ScanSummary>> {
        let projects = self.api.list_projects().await?;
        tracing::info!(
            "Searching {} projects for small scans (first {})",
            projects.len(),
            self.limits.max_projects
        );

        let mut found = Vec::new();

        for project in projects
            .iter()
            .filter(|p| !p.id.is_empty())
            .take(self.limits.max_projects)
        {
            let experiments = match self.api.list_experiments(&project.id).await {
                Ok(experiments) => experiments,
                Err(e) => {
                    tracing::warn!("Skipping project {}: {}", project.id, e);
                    continue;
                }
            };

            for experiment in experiments
                .iter()
                .filter(|e| !e.id.is_empty())
                .take(self.limits.max_experiments_per_project)
            {
                let scans = match self.api.list_scans(&experiment.id).await {
                    Ok(scans) => scans,
                    Err(e) => {
                        tracing::warn!("Skipping experiment {}: {}", experiment.id, e);
                        continue;
                    }
                };

                for scan in scans.iter().filter(|s| !s.id.is_empty()) {
                    let files = match self
                        .api
                        .list_scan_files(&experiment.id, &scan.id, &self.limits.resource)
                        .await
                    {
                        Ok(files) => files,
                        Err(e) => {
                            tracing::debug!(
                                "No {} files for {}/{}: {}",
                                self.limits.resource,
                                experiment.id,
                                scan.id,
                                e
                            );
                            continue;
                        }
                    };

                    let dicom_files = files.iter().filter(|f| f.is_dicom()).count();
                    if dicom_files > 0 {
                        tracing::debug!(
                            "{}/{}/{}: {} DICOM files",
                            project.id,
                            experiment.id,
                            scan.id,
                            dicom_files
                        );
                        found.push(ScanSummary {
                            project: project.id.clone(),
                            experiment: experiment.id.clone(),
                            scan: scan.id.clone(),
                            files: dicom_files,
                        });
                    }
                }
            }
        }

        // 穩定排序，檔案數相同時保留走訪順序
        found.sort_by_key(|s| s.files);
        tracing::info!("Found {} scans with DICOM files", found.len());
        Ok(found)
    }
}

/// 依檔案數列出前 `top` 個掃描，最後附上最小掃描的建議
pub fn render_summary(scans: &[ScanSummary], viewer_base: &str, top: usize) -> String {
    let rule = "=".repeat(70);
    let mut out = String::new();

    out.push_str(&format!("{}\nFOUND SCANS (sorted by size)\n{}\n", rule, rule));
    for (i, scan) in scans.iter().take(top).enumerate() {
        out.push_str(&format!(
            "{}. {} files - Project: {}\n   Experiment: {}, Scan: {}\n   URL: {}\n\n",
            i + 1,
            scan.files,
            scan.project,
            scan.experiment,
            scan.scan,
            scan.viewer_url(viewer_base)
        ));
    }

    if let Some(smallest) = scans.first() {
        out.push_str(&format!(
            "{}\nRECOMMENDED: Use scan with {} files\nURL: {}\n{}\n",
            rule,
            smallest.files,
            smallest.viewer_url(viewer_base),
            rule
        ));
    }

    out
}

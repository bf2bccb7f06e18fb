use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 單一檔案燒字的結果
#[derive(Debug, Clone, PartialEq)]
pub enum BurnOutcome {
    Burned { output: PathBuf, rescaled: bool },
    Skipped { reason: SkipReason },
}

/// 略過檔案的原因，略過的檔案不會被寫入
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    NoPixelData,
    UnsupportedShape(Vec<usize>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoPixelData => write!(f, "No pixel data"),
            SkipReason::UnsupportedShape(shape) => {
                write!(f, "Unsupported pixel array shape {:?}", shape)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// 目錄批次處理的彙總
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub directory: PathBuf,
    pub text: String,
    pub found: usize,
    pub burned: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub failed: Vec<FailedFile>,
    pub started_at: DateTime<Utc>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn new(directory: PathBuf, text: String) -> Self {
        Self {
            directory,
            text,
            found: 0,
            burned: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn success_count(&self) -> usize {
        self.burned.len()
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

/// XNAT 列表回應的外層：`{"ResultSet": {"Result": [...]}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ResultSetEnvelope<T> {
    #[serde(rename = "ResultSet", default = "ResultSet::empty")]
    pub result_set: ResultSet<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet<T> {
    #[serde(rename = "Result", default = "Vec::new")]
    pub result: Vec<T>,
}

impl<T> ResultSet<T> {
    fn empty() -> Self {
        Self { result: Vec::new() }
    }
}

/// 專案、實驗、掃描列表的共同欄位
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArchiveEntry {
    #[serde(rename = "ID", default)]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArchiveFile {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "URI", default)]
    pub uri: Option<String>,
    #[serde(rename = "Size", default)]
    pub size: Option<String>,
}

impl ArchiveFile {
    pub fn is_dicom(&self) -> bool {
        self.name.to_lowercase().ends_with(".dcm")
    }
}

/// 找到的掃描與其 DICOM 檔案數
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub project: String,
    pub experiment: String,
    pub scan: String,
    pub files: usize,
}

impl ScanSummary {
    /// 本機 viewer 開啟此掃描的網址
    pub fn viewer_url(&self, viewer_base: &str) -> String {
        format!(
            "{}/experiments/{}/scans/{}/cornerstone",
            viewer_base.trim_end_matches('/'),
            self.experiment,
            self.scan
        )
    }
}

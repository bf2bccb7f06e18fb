use crate::core::burn::TextBurner;
use crate::domain::model::{BatchReport, BurnOutcome, FailedFile, SkippedFile};
use crate::domain::ports::OutputStorage;
use crate::utils::error::{Result, TestkitError};
use crate::utils::monitor::RunMonitor;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

fn is_dicom_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("dcm"))
            .unwrap_or(false)
}

/// 找出目錄中所有 `.dcm` 檔，依路徑排序
pub fn discover_dicom_files(directory: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(TestkitError::DirectoryNotFound {
            path: directory.to_path_buf(),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(directory).min_depth(1).max_depth(max_depth) {
        let entry = entry.map_err(|e| {
            TestkitError::IoError(std::io::Error::other(format!(
                "Cannot walk {}: {}",
                directory.display(),
                e
            )))
        })?;
        if is_dicom_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// 開始處理前印出的標題
pub fn run_banner(directory: &Path, text: &str) -> String {
    let rule = "=".repeat(50);
    format!(
        "{}\nDICOM Text Burning Script\n{}\nDirectory: {}\nText: '{}'\n{}",
        rule,
        rule,
        directory.display(),
        text,
        rule
    )
}

/// 逐檔燒字，單一檔案失敗不會中斷整個批次
pub struct BatchBurner<S: OutputStorage> {
    burner: TextBurner,
    storage: S,
    recursive: bool,
    monitor: RunMonitor,
}

impl<S: OutputStorage> BatchBurner<S> {
    pub fn new(burner: TextBurner, storage: S) -> Self {
        Self {
            burner,
            storage,
            recursive: false,
            monitor: RunMonitor::default(),
        }
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_monitor(mut self, monitor: RunMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn process_directory(&mut self, directory: &Path) -> Result<BatchReport> {
        let started = Instant::now();
        let text = self.burner.options().text.clone();
        let mut report = BatchReport::new(directory.to_path_buf(), text.clone());

        let files = discover_dicom_files(directory, self.recursive)?;
        report.found = files.len();
        self.monitor.log_phase("Discovery");

        if files.is_empty() {
            println!("No .dcm files found in {}", directory.display());
            tracing::warn!("No .dcm files found in {}", directory.display());
            report.elapsed = started.elapsed();
            return Ok(report);
        }

        println!("Found {} DICOM files", files.len());
        println!("Burning text: '{}'", text);
        println!("{}", "-".repeat(50));

        for file in &files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());

            match self.burn_one(file) {
                Ok(BurnOutcome::Burned { output, .. }) => {
                    println!("✓ Burned text into {}", name);
                    tracing::debug!("{} -> {}", file.display(), output.display());
                    report.burned.push(file.clone());
                }
                Ok(BurnOutcome::Skipped { reason }) => {
                    println!("Skipping {}: {}", name, reason);
                    tracing::info!("Skipping {}: {}", file.display(), reason);
                    report.skipped.push(SkippedFile {
                        path: file.clone(),
                        reason,
                    });
                }
                Err(e) => {
                    println!("✗ Error processing {}: {}", name, e);
                    tracing::warn!(
                        "Error processing {} ({:?}): {}",
                        file.display(),
                        e.category(),
                        e
                    );
                    report.failed.push(FailedFile {
                        path: file.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.monitor.log_phase("Burning");

        println!("{}", "-".repeat(50));
        println!(
            "Successfully processed {}/{} files",
            report.success_count(),
            report.found
        );

        report.elapsed = started.elapsed();
        Ok(report)
    }

    fn burn_one(&self, file: &Path) -> Result<BurnOutcome> {
        let output = self.storage.prepare_output(file)?;
        self.burner.burn_file(file, Some(&output))
    }
}

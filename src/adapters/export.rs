use crate::domain::model::ScanSummary;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// 欄位：project,experiment,scan,files，外加 viewer 網址
pub fn write_scans_csv(scans: &[ScanSummary], viewer_base: &str, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["project", "experiment", "scan", "files", "viewer_url"])?;
    for scan in scans {
        writer.write_record([
            scan.project.as_str(),
            scan.experiment.as_str(),
            scan.scan.as_str(),
            scan.files.to_string().as_str(),
            scan.viewer_url(viewer_base).as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_scans_json(scans: &[ScanSummary], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(scans)?;
    fs::write(path, json)?;
    Ok(())
}

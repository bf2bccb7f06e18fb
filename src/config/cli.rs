use crate::config::TomlConfig;
use clap::Parser;
use std::path::Path;

/// 燒字工具的命令列參數，只覆寫有給的值
#[derive(Debug, Clone, Parser)]
#[command(name = "dicom-testkit")]
#[command(about = "Burn a text string into the pixels of every DICOM file in a directory")]
pub struct BurnArgs {
    /// Directory containing .dcm files (default: current directory)
    pub directory: Option<String>,

    /// Text to burn into each image
    pub text: Option<String>,

    #[arg(long, help = "Write burned files here instead of overwriting the originals")]
    pub output_dir: Option<String>,

    #[arg(long, help = "TrueType/OpenType font to draw with")]
    pub font: Option<String>,

    #[arg(long, help = "Also process subdirectories")]
    pub recursive: bool,

    #[arg(long, help = "Save a PNG preview of every burned image")]
    pub preview_dir: Option<String>,

    #[arg(long, help = "Write a JSON summary of the run")]
    pub report: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "compact or json")]
    pub log_format: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl BurnArgs {
    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref().map(Path::new)
    }

    pub fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(directory) = &self.directory {
            config.burn.directory = directory.clone();
        }
        if let Some(text) = &self.text {
            config.burn.text = text.clone();
        }
        if self.output_dir.is_some() {
            config.burn.output_dir = self.output_dir.clone();
        }
        if self.font.is_some() {
            config.burn.font_path = self.font.clone();
        }
        if self.preview_dir.is_some() {
            config.burn.preview_dir = self.preview_dir.clone();
        }
        if self.recursive {
            config.burn.recursive = true;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }
        if let Some(format) = &self.log_format {
            config.monitoring.log_format = format.clone();
        }
    }
}

/// 找小掃描工具的命令列參數
#[derive(Debug, Clone, Parser)]
#[command(name = "find_small_scan")]
#[command(about = "List the archive scans with the fewest DICOM files")]
pub struct ScanArgs {
    #[arg(long, help = "XNAT server (default: http://demo02.xnatworks.io)")]
    pub server: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    #[arg(long, help = "Viewer base URL (default: http://localhost:5173)")]
    pub viewer_url: Option<String>,

    #[arg(long)]
    pub max_projects: Option<usize>,

    #[arg(long, help = "Experiments to inspect per project")]
    pub max_experiments: Option<usize>,

    #[arg(long, help = "Number of scans to print")]
    pub top: Option<usize>,

    #[arg(long, help = "Export all found scans as CSV")]
    pub csv: Option<String>,

    #[arg(long, help = "Export all found scans as JSON")]
    pub json: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ScanArgs {
    pub fn config_path(&self) -> Option<&Path> {
        self.config.as_deref().map(Path::new)
    }

    pub fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(server) = &self.server {
            config.archive.server = server.clone();
        }
        if let Some(username) = &self.username {
            config.archive.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.archive.password = password.clone();
        }
        if let Some(viewer_url) = &self.viewer_url {
            config.viewer.base_url = viewer_url.clone();
        }
        if let Some(max_projects) = self.max_projects {
            config.archive.max_projects = max_projects;
        }
        if let Some(max_experiments) = self.max_experiments {
            config.archive.max_experiments_per_project = max_experiments;
        }
        if let Some(top) = self.top {
            config.archive.top = top;
        }
    }
}

use crate::adapters::xnat::Credentials;
use crate::core::burn::{BurnOptions, DEFAULT_TEXT};
use crate::core::scan_finder::SearchLimits;
use crate::utils::error::{Result, TestkitError};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 未指定 `--config` 時，工作目錄下有這個檔案就會載入
pub const DEFAULT_CONFIG_FILE: &str = "testkit.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub burn: BurnSection,
    pub archive: ArchiveSection,
    pub viewer: ViewerSection,
    pub monitoring: MonitoringSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnSection {
    pub directory: String,
    pub text: String,
    pub font_path: Option<String>,
    pub output_dir: Option<String>,
    pub preview_dir: Option<String>,
    pub recursive: bool,
    pub min_font_size: u32,
    pub font_size_divisor: u32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for BurnSection {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            text: DEFAULT_TEXT.to_string(),
            font_path: None,
            output_dir: None,
            preview_dir: None,
            recursive: false,
            min_font_size: 20,
            font_size_divisor: 20,
            offset_x: 10,
            offset_y: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSection {
    pub server: String,
    pub username: String,
    pub password: String,
    pub max_projects: usize,
    pub max_experiments_per_project: usize,
    pub resource: String,
    pub timeout_seconds: u64,
    /// 輸出時列出的掃描數
    pub top: usize,
}

impl Default for ArchiveSection {
    fn default() -> Self {
        Self {
            server: "http://demo02.xnatworks.io".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            max_projects: 15,
            max_experiments_per_project: 3,
            resource: "DICOM".to_string(),
            timeout_seconds: 30,
            top: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    pub base_url: String,
}

impl Default for ViewerSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSection {
    pub enabled: bool,
    pub log_format: String,
}

impl Default for MonitoringSection {
    fn default() -> Self {
        Self {
            enabled: false,
            log_format: "compact".to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| TestkitError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TestkitError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 指定路徑時必須存在；否則嘗試預設檔名，都沒有就用內建預設值
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::debug!("Loading {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${XNAT_PASSWORD})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TestkitError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn burn_options(&self) -> BurnOptions {
        BurnOptions {
            text: self.burn.text.clone(),
            origin: (self.burn.offset_x, self.burn.offset_y),
            min_font_size: self.burn.min_font_size,
            font_size_divisor: self.burn.font_size_divisor,
            preview_dir: self.burn.preview_dir.as_ref().map(PathBuf::from),
        }
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_projects: self.archive.max_projects,
            max_experiments_per_project: self.archive.max_experiments_per_project,
            resource: self.archive.resource.clone(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.archive.username.clone(),
            password: self.archive.password.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.archive.timeout_seconds)
    }

    pub fn log_format(&self) -> Result<LogFormat> {
        self.monitoring
            .log_format
            .parse()
            .map_err(|reason| TestkitError::InvalidConfigValueError {
                field: "monitoring.log_format".to_string(),
                value: self.monitoring.log_format.clone(),
                reason,
            })
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("burn.directory", &self.burn.directory)?;
        validate_non_empty_string("burn.text", &self.burn.text)?;
        validate_positive_number("burn.min_font_size", self.burn.min_font_size as usize, 1)?;
        validate_positive_number(
            "burn.font_size_divisor",
            self.burn.font_size_divisor as usize,
            1,
        )?;
        for (field, value) in [
            ("burn.font_path", &self.burn.font_path),
            ("burn.output_dir", &self.burn.output_dir),
            ("burn.preview_dir", &self.burn.preview_dir),
        ] {
            if let Some(path) = value {
                validate_path(field, path)?;
            }
        }

        validate_url("archive.server", &self.archive.server)?;
        validate_non_empty_string("archive.username", &self.archive.username)?;
        validate_positive_number("archive.max_projects", self.archive.max_projects, 1)?;
        validate_positive_number(
            "archive.max_experiments_per_project",
            self.archive.max_experiments_per_project,
            1,
        )?;
        validate_non_empty_string("archive.resource", &self.archive.resource)?;
        validate_positive_number(
            "archive.timeout_seconds",
            self.archive.timeout_seconds as usize,
            1,
        )?;

        validate_url("viewer.base_url", &self.viewer.base_url)?;
        self.log_format()?;

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

use std::env;
use std::path::PathBuf;

const DEFAULT_API_BASE: &str = "http://localhost:3000";
const DEFAULT_CLOUD_NAME: &str = "papers";
const DEFAULT_UPLOAD_PRESET: &str = "papers-unsigned";
const DEFAULT_MAX_FILES: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },

    #[error("Could not determine a config directory for the token file")]
    NoConfigDir,
}

/// Runtime settings for the uploader, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub cloud_name: String,
    pub upload_preset: String,
    pub max_files: usize,
    pub token_file: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base = env::var("PAPERS_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let cloud_name =
            env::var("PAPERS_CLOUD_NAME").unwrap_or_else(|_| DEFAULT_CLOUD_NAME.to_string());

        let upload_preset =
            env::var("PAPERS_UPLOAD_PRESET").unwrap_or_else(|_| DEFAULT_UPLOAD_PRESET.to_string());

        let max_files = match env::var("PAPERS_MAX_FILES") {
            Ok(raw) => parse_max_files(&raw)?,
            Err(_) => DEFAULT_MAX_FILES,
        };

        let token_file = match env::var("PAPERS_TOKEN_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_token_file()?,
        };

        Ok(Self {
            api_base,
            cloud_name,
            upload_preset,
            max_files,
            token_file,
        })
    }

    pub fn admin_url(&self) -> String {
        format!("{}/api/admin", self.api_base)
    }

    pub fn watermark_url(&self) -> String {
        format!("{}/api/admin/watermark", self.api_base)
    }

    pub fn watermarked_pdf_url(&self) -> String {
        format!("{}/watermarked.pdf", self.api_base)
    }

    pub fn asset_host_upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.cloud_name
        )
    }
}

fn parse_max_files(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            key: "PAPERS_MAX_FILES".to_string(),
            value: raw.to_string(),
        }),
    }
}

fn default_token_file() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("papers-uploader").join("token"))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests(api_base: &str) -> Self {
        Self {
            api_base: api_base.to_string(),
            cloud_name: DEFAULT_CLOUD_NAME.to_string(),
            upload_preset: DEFAULT_UPLOAD_PRESET.to_string(),
            max_files: DEFAULT_MAX_FILES,
            token_file: PathBuf::from("token"),
        }
    }
}

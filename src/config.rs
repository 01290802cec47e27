use anyhow::Context;
use camino::{
    Utf8Path,
    Utf8PathBuf,
};
use deviantart::SitePolicy;
use serde::Deserialize;
use std::collections::HashMap;

fn default_download_dir() -> Utf8PathBuf {
    "downloads".into()
}

fn default_cookie_file() -> Utf8PathBuf {
    "cookies.json".into()
}

fn default_log_dir() -> Utf8PathBuf {
    "logs".into()
}

fn default_gallery_page_size() -> u64 {
    deviantart::MAX_GALLERY_ITEMS
}

fn default_max_cookie_retries() -> u8 {
    1
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_download_dir")]
    download_dir: Utf8PathBuf,

    #[serde(default = "default_cookie_file")]
    cookie_file: Utf8PathBuf,

    #[serde(default = "default_log_dir")]
    log_dir: Utf8PathBuf,

    user_agent: Option<String>,

    #[serde(default = "default_gallery_page_size")]
    gallery_page_size: u64,

    #[serde(default = "default_max_cookie_retries")]
    max_cookie_retries: u8,

    #[serde(flatten)]
    extra: HashMap<String, toml::Value>,
}

impl Config {
    /// The folder artist folders are created in
    pub fn download_dir(&self) -> &Utf8Path {
        &self.download_dir
    }

    /// The json cookie file
    pub fn cookie_file(&self) -> &Utf8Path {
        &self.cookie_file
    }

    /// The folder daily log files are written to
    pub fn log_dir(&self) -> &Utf8Path {
        &self.log_dir
    }

    /// The user agent sent with every request
    pub fn user_agent(&self) -> &str {
        self.user_agent
            .as_deref()
            .unwrap_or(deviantart::USER_AGENT_STR)
    }

    /// Make the site policy this config describes
    pub fn site_policy(&self) -> SitePolicy {
        SitePolicy {
            max_cookie_retries: self.max_cookie_retries,
            gallery_page_size: self.gallery_page_size,
            ..SitePolicy::deviantart()
        }
    }

    /// Load a config from a path.
    ///
    /// A missing file is the default config.
    pub fn load_from_path(path: &Utf8Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::load_from_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read config from '{path}'")),
        }
    }

    /// Load a config from a string
    pub fn load_from_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("failed to parse config")
    }

    /// Validate a config
    pub fn validate(&self) -> Vec<ValidationMessage> {
        let mut errors = Vec::new();

        if self.gallery_page_size == 0 {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::ZeroGalleryPageSize,
            });
        }

        if self.user_agent.as_deref().map_or(false, |s| s.trim().is_empty()) {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::EmptyUserAgent,
            });
        }

        if self.download_dir.as_str().is_empty() {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::EmptyDownloadDir,
            });
        }

        let mut unknown_keys: Vec<_> = self.extra.keys().cloned().collect();
        unknown_keys.sort();
        for key in unknown_keys {
            errors.push(ValidationMessage {
                severity: Severity::Warn,
                error: ValidationError::UnknownKey(key),
            });
        }

        errors
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            cookie_file: default_cookie_file(),
            log_dir: default_log_dir(),
            user_agent: None,
            gallery_page_size: default_gallery_page_size(),
            max_cookie_retries: default_max_cookie_retries(),
            extra: HashMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct ValidationMessage {
    severity: Severity,
    error: ValidationError,
}

impl ValidationMessage {
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn error(&self) -> &ValidationError {
        &self.error
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("gallery_page_size must be at least 1")]
    ZeroGalleryPageSize,

    #[error("user_agent is empty")]
    EmptyUserAgent,

    #[error("download_dir is empty")]
    EmptyDownloadDir,

    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

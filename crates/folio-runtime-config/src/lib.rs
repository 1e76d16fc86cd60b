use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use folio_content::{LinkPolicy, LinkTarget};
use serde::{Deserialize, Serialize};

pub const SITE_RUNTIME_CONFIG_SCHEMA_VERSION: u32 = 1;
pub const CONFIG_PATH_ENV: &str = "FOLIO_CONFIG";
pub const REVALIDATE_SECRET_ENV: &str = "FOLIO_REVALIDATE_SECRET";
pub const PREVIEW_SECRET_ENV: &str = "FOLIO_PREVIEW_SECRET";

fn default_schema_version() -> u32 {
    SITE_RUNTIME_CONFIG_SCHEMA_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SiteRuntimeConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteRuntimeConfig {
    fn default() -> Self {
        Self {
            schema_version: SITE_RUNTIME_CONFIG_SCHEMA_VERSION,
            site: SiteConfig::default(),
            links: LinksConfig::default(),
            cache: CacheConfig::default(),
            telemetry: TelemetryConfig::default(),
            content: ContentConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteRuntimeConfig {
    pub fn validate(&self) -> Result<(), SiteRuntimeConfigError> {
        if self.schema_version != SITE_RUNTIME_CONFIG_SCHEMA_VERSION {
            return Err(SiteRuntimeConfigError::UnsupportedSchemaVersion {
                expected: SITE_RUNTIME_CONFIG_SCHEMA_VERSION,
                got: self.schema_version,
            });
        }
        if self.site.title.trim().is_empty() {
            return Err(SiteRuntimeConfigError::Invalid {
                field: "site.title",
                reason: "must not be empty",
            });
        }
        if self.server.port == 0 {
            return Err(SiteRuntimeConfigError::Invalid {
                field: "server.port",
                reason: "must be a non-zero port",
            });
        }
        for (field, secret) in [
            ("server.revalidate_secret", &self.server.revalidate_secret),
            ("server.preview_secret", &self.server.preview_secret),
        ] {
            if secret.as_deref().is_some_and(|value| value.trim().is_empty()) {
                return Err(SiteRuntimeConfigError::Invalid {
                    field,
                    reason: "must be omitted or non-empty",
                });
            }
        }
        Ok(())
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SiteRuntimeConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| SiteRuntimeConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, SiteRuntimeConfigError> {
        let raw = fs::read_to_string(path).map_err(|err| SiteRuntimeConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_json(&raw)
    }

    /// Secrets may be supplied through the environment instead of the file.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(secret) = lookup(REVALIDATE_SECRET_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.revalidate_secret = Some(secret);
        }
        if let Some(secret) = lookup(PREVIEW_SECRET_ENV).filter(|v| !v.trim().is_empty()) {
            self.server.preview_secret = Some(secret);
        }
        self
    }

    pub fn link_policy(&self) -> LinkPolicy {
        LinkPolicy {
            custom_target: self.links.custom_target,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,
    #[serde(default = "default_icon")]
    pub default_icon: String,
}

fn default_site_title() -> String {
    "Folio".to_string()
}

fn default_icon() -> String {
    "/default-icon.png".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            default_icon: default_icon(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LinksConfig {
    /// Where custom URLs open. One setting for every place links render.
    #[serde(default = "default_custom_target")]
    pub custom_target: LinkTarget,
}

fn default_custom_target() -> LinkTarget {
    LinkTarget::Blank
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            custom_target: default_custom_target(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    /// Directory holding exported CMS JSON.
    #[serde(default = "default_content_root")]
    pub root: PathBuf,
}

fn default_content_root() -> PathBuf {
    PathBuf::from("content")
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: default_content_root(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub revalidate_secret: Option<String>,
    #[serde(default)]
    pub preview_secret: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            revalidate_secret: None,
            preview_secret: None,
        }
    }
}

impl ServerConfig {
    /// True when anyone who can reach the server may call the revalidation
    /// webhook.
    pub fn revalidation_is_open(&self) -> bool {
        self.revalidate_secret.is_none()
    }

    /// True when the bind host only accepts local connections.
    pub fn is_loopback(&self) -> bool {
        let host = self.host.trim();
        host.eq_ignore_ascii_case("localhost")
            || host
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
                .is_ok_and(|addr| addr.is_loopback())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SiteRuntimeConfigError {
    UnsupportedSchemaVersion { expected: u32, got: u32 },
    Invalid { field: &'static str, reason: &'static str },
    Parse(String),
    Io { path: PathBuf, message: String },
}

impl std::fmt::Display for SiteRuntimeConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteRuntimeConfigError::UnsupportedSchemaVersion { expected, got } => write!(
                f,
                "unsupported schema version: expected {expected}, got {got}"
            ),
            SiteRuntimeConfigError::Invalid { field, reason } => {
                write!(f, "invalid {field}: {reason}")
            }
            SiteRuntimeConfigError::Parse(message) => write!(f, "invalid config json: {message}"),
            SiteRuntimeConfigError::Io { path, message } => {
                write!(f, "failed to read {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for SiteRuntimeConfigError {}

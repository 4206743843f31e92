use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::error::TimestampError;
use crate::util::time::{ExplicitOffset, NormalizeOptions, Zone};

pub const CONFIG_ENV: &str = "CLINICQ_CONFIG";
pub const BASE_URL_ENV: &str = "CLINICQ_BASE_URL";
pub const UTC_OFFSET_ENV: &str = "CLINICQ_UTC_OFFSET";
pub const XH_BIN_ENV: &str = "CLINICQ_XH_BIN";

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid utc_offset `{value}`: {source}")]
    InvalidOffset {
        value: String,
        #[source]
        source: TimestampError,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    utc_offset: Option<String>,
    explicit_offset: Option<ExplicitOffset>,
    xh_bin: Option<String>,
}

/// Resolved client settings: defaults, then file, then environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub zone: Zone,
    pub explicit_offset: ExplicitOffset,
    pub xh_bin: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            zone: Zone::System,
            explicit_offset: ExplicitOffset::Honor,
            xh_bin: "xh".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from `path` (or `$CLINICQ_CONFIG`) and apply env overrides.
    /// Without either, defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|error| match error {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        let defaults = Self::default();
        Ok(Self {
            base_url: file.base_url.unwrap_or(defaults.base_url),
            zone: match file.utc_offset {
                Some(value) => parse_zone(&value)?,
                None => defaults.zone,
            },
            explicit_offset: file.explicit_offset.unwrap_or(defaults.explicit_offset),
            xh_bin: file.xh_bin.unwrap_or(defaults.xh_bin),
        })
    }

    /// Apply `CLINICQ_BASE_URL`, `CLINICQ_UTC_OFFSET` and `CLINICQ_XH_BIN`
    /// as returned by `lookup`. Empty values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.base_url = base_url;
        }
        if let Some(offset) = lookup(UTC_OFFSET_ENV) {
            self.zone = parse_zone(&offset)?;
        }
        if let Some(xh_bin) = lookup(XH_BIN_ENV) {
            self.xh_bin = xh_bin;
        }
        Ok(self)
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            zone: self.zone,
            explicit_offset: self.explicit_offset,
        }
    }
}

pub fn parse_zone(value: &str) -> Result<Zone, ConfigError> {
    value
        .parse::<Zone>()
        .map_err(|source| ConfigError::InvalidOffset {
            value: value.to_string(),
            source,
        })
}

use std::{fs, io, path::Path, str::FromStr, time::Duration};

use claimdesk_core::claim::Address;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE_PATH: &str = "claimdesk.toml";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    IOError(#[from] io::Error),
    #[error("toml error: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("url {0} is not valid (is it missing http/https?)")]
    UrlNotValid(String),
}

#[derive(Deserialize, Clone, Debug)]
struct ConfigFile {
    identity: String,
    base_url: String,
    messaging_url: Option<String>,
    contacts_url: Option<String>,
    ctype_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub identity: Address,
    pub messaging_url: Url,
    pub contacts_url: Url,
    pub ctype_url: Url,
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(toml_str)?;
        let base_url = file.base_url.trim_end_matches('/');

        let service_url = |custom: Option<String>, path: &str| {
            let url_str = custom.unwrap_or_else(|| format!("{base_url}/{path}"));
            Url::from_str(url_str.trim_end_matches('/'))
                .map_err(|_| ConfigError::UrlNotValid(url_str))
        };

        Ok(Self {
            identity: Address::new(file.identity),
            messaging_url: service_url(file.messaging_url, "messaging")?,
            contacts_url: service_url(file.contacts_url, "contacts")?,
            ctype_url: service_url(file.ctype_url, "ctype")?,
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

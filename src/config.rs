/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, APP_ENV, JwtIssuerOptions:*)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::services::auth::signing_key::{SECRET_KEY, Secret};

pub const ISSUER_KEY: &str = "JwtIssuerOptions:Issuer";
pub const AUDIENCE_KEY: &str = "JwtIssuerOptions:Audience";
pub const VALIDATE_ISSUER_KEY: &str = "JwtIssuerOptions:ValidateIssuer";
pub const VALIDATE_AUDIENCE_KEY: &str = "JwtIssuerOptions:ValidateAudience";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Blank(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Blank(key) => write!(f, "blank configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Opaque key-value provider. Keys are hierarchical, `Section:Name`.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment. `:` is spelled `__` in variable names
/// (`JwtIssuerOptions__SecretKey`).
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSource;

impl EnvSource {
    pub fn env_name(key: &str) -> String {
        key.replace(':', "__")
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(Self::env_name(key)).ok()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MapSource(HashMap<String, String>);

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct JwtIssuerOptions {
    pub secret_key: Secret,
    pub issuer: String,
    pub audience: String,
    pub validate_issuer: bool,
    pub validate_audience: bool,
}

impl JwtIssuerOptions {
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let secret_key = source
            .get(SECRET_KEY)
            .map(Secret::new)
            .ok_or(ConfigError::Missing(SECRET_KEY))?;

        if secret_key.is_blank() {
            return Err(ConfigError::Blank(SECRET_KEY));
        }

        Ok(Self {
            secret_key,
            issuer: source.get(ISSUER_KEY).unwrap_or_default(),
            audience: source.get(AUDIENCE_KEY).unwrap_or_default(),
            validate_issuer: parse_flag(source, VALIDATE_ISSUER_KEY)?,
            validate_audience: parse_flag(source, VALIDATE_AUDIENCE_KEY)?,
        })
    }
}

fn parse_flag(source: &impl ConfigSource, key: &'static str) -> Result<bool, ConfigError> {
    match source.get(key) {
        None => Ok(false),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "0" => Ok(false),
            "true" | "1" => Ok(true),
            _ => Err(ConfigError::Invalid(key)),
        },
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub jwt: JwtIssuerOptions,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(&EnvSource)
    }

    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let port: u16 = match source.get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(source.get("APP_ENV").as_deref());

        let jwt = JwtIssuerOptions::from_source(source)?;

        Ok(Self { addr, app_env, jwt })
    }
}

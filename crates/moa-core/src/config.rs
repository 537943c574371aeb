//! Application configuration.
//!
//! [`MoaConfig`] is read from a TOML file and then overlaid with environment
//! variables. Lookup order for the file is: explicit `--config` path,
//! `MOA_CONFIG`, then `<config dir>/moa/config.toml`. A missing file yields
//! the defaults.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::validation::Validate;
use crate::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "MOA_CONFIG";

/// Loading, locating, and exporting a project's configuration.
///
/// The `config` CLI subcommands are written against this trait.
pub trait ConfigManager: Default + Serialize + DeserializeOwned + Sized {
    /// Short name used for the config directory and CLI hints.
    fn project_name() -> &'static str;

    /// `<platform config dir>/<project>/config.toml`, when the platform has one.
    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::project_name()).join("config.toml"))
    }

    /// Explicit path, then the `MOA_CONFIG` variable, then the default path.
    fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Load from the resolved path (defaults when absent) and apply env overrides.
    fn load(explicit: Option<&str>) -> Result<Self>;

    fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// The configuration as `KEY=value` pairs suitable for a process environment.
    fn to_env_vars(&self) -> Result<Vec<(String, String)>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/moa".to_string(),
            max_connections: 10,
        }
    }
}

/// Signing settings for access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Must be set before serving.
    pub secret_key: String,
    /// One of HS256, HS384, HS512.
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 120,
            refresh_token_expire_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Comma separated list of origins; `*` allows any.
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "http://localhost:3000".to_string(),
        }
    }
}

impl CorsConfig {
    /// Trimmed, non-empty origins.
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Prefix for the public URL handed out with each share token.
    pub base_url: String,
    pub token_length: usize,
    pub default_expiry_days: i64,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/share".to_string(),
            token_length: 16,
            default_expiry_days: 7,
        }
    }
}

impl ShareConfig {
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/{token}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub bcrypt_cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self { bcrypt_cost: 12 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub kakao_userinfo_url: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            kakao_userinfo_url: "https://kapi.kakao.com/v2/user/me".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Top-level configuration for the API server and the admin CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoaConfig {
    pub project_name: String,
    pub environment: String,
    pub debug: bool,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub share: ShareConfig,
    pub password: PasswordConfig,
    pub social: SocialConfig,
    pub logging: LoggingConfig,
}

impl Default for MoaConfig {
    fn default() -> Self {
        Self {
            project_name: "moa-api".to_string(),
            environment: "development".to_string(),
            debug: true,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            jwt: JwtConfig::default(),
            cors: CorsConfig::default(),
            share: ShareConfig::default(),
            password: PasswordConfig::default(),
            social: SocialConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MoaConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Invalid config: {e}")))
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Overlay values from environment-style variables.
    ///
    /// `lookup` returns the value for a variable name; pass `std::env::var`
    /// (via [`MoaConfig::apply_process_env`]) in production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PROJECT_NAME") {
            self.project_name = v;
        }
        if let Some(v) = lookup("ENVIRONMENT") {
            self.environment = v;
        }
        if let Some(v) = lookup("DEBUG") {
            self.debug = parse_env("DEBUG", &v)?;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("JWT_SECRET_KEY") {
            self.jwt.secret_key = v;
        }
        if let Some(v) = lookup("JWT_ALGORITHM") {
            self.jwt.algorithm = v;
        }
        if let Some(v) = lookup("JWT_ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.jwt.access_token_expire_minutes = parse_env("JWT_ACCESS_TOKEN_EXPIRE_MINUTES", &v)?;
        }
        if let Some(v) = lookup("JWT_REFRESH_TOKEN_EXPIRE_DAYS") {
            self.jwt.refresh_token_expire_days = parse_env("JWT_REFRESH_TOKEN_EXPIRE_DAYS", &v)?;
        }
        if let Some(v) = lookup("ALLOWED_ORIGINS") {
            self.cors.allowed_origins = v;
        }
        if let Some(v) = lookup("MOA_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("MOA_PORT") {
            self.server.port = parse_env("MOA_PORT", &v)?;
        }
        Ok(())
    }

    /// [`MoaConfig::apply_env_overrides`] against the process environment.
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env_overrides(|name| std::env::var(name).ok())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{name} has an invalid value: '{value}'")))
}

impl ConfigManager for MoaConfig {
    fn project_name() -> &'static str {
        "moa"
    }

    fn load(explicit: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_process_env()?;
        Ok(config)
    }

    fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        Ok(vec![
            ("PROJECT_NAME".into(), self.project_name.clone()),
            ("ENVIRONMENT".into(), self.environment.clone()),
            ("DEBUG".into(), self.debug.to_string()),
            ("DATABASE_URL".into(), self.database.url.clone()),
            ("JWT_SECRET_KEY".into(), self.jwt.secret_key.clone()),
            ("JWT_ALGORITHM".into(), self.jwt.algorithm.clone()),
            (
                "JWT_ACCESS_TOKEN_EXPIRE_MINUTES".into(),
                self.jwt.access_token_expire_minutes.to_string(),
            ),
            (
                "JWT_REFRESH_TOKEN_EXPIRE_DAYS".into(),
                self.jwt.refresh_token_expire_days.to_string(),
            ),
            ("ALLOWED_ORIGINS".into(), self.cors.allowed_origins.clone()),
            ("MOA_HOST".into(), self.server.host.clone()),
            ("MOA_PORT".into(), self.server.port.to_string()),
        ])
    }
}

/// Checks required before the server may start.
impl Validate for MoaConfig {
    fn validate(&self) -> Result<()> {
        if self.jwt.secret_key.trim().is_empty() {
            return Err(Error::config(
                "jwt.secret_key is empty; set it in the config file or JWT_SECRET_KEY",
            ));
        }
        if !matches!(self.jwt.algorithm.as_str(), "HS256" | "HS384" | "HS512") {
            return Err(Error::config(format!(
                "jwt.algorithm '{}' is not supported (use HS256, HS384 or HS512)",
                self.jwt.algorithm
            )));
        }
        setting_range(
            "jwt.access_token_expire_minutes",
            self.jwt.access_token_expire_minutes,
            1,
            60 * 24 * 30,
        )?;
        setting_range(
            "jwt.refresh_token_expire_days",
            self.jwt.refresh_token_expire_days,
            1,
            365,
        )?;
        setting_range("share.token_length", self.share.token_length as i64, 8, 64)?;
        setting_range(
            "share.default_expiry_days",
            self.share.default_expiry_days,
            1,
            365,
        )?;
        setting_range("password.bcrypt_cost", i64::from(self.password.bcrypt_cost), 4, 31)?;
        if self.database.max_connections == 0 {
            return Err(Error::config("database.max_connections must be at least 1"));
        }
        Ok(())
    }
}

fn setting_range(key: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(Error::config(format!(
            "{key} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn configured() -> MoaConfig {
        let mut config = MoaConfig::default();
        config.jwt.secret_key = "test-secret".to_string();
        config
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = MoaConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.jwt.access_token_expire_minutes, 120);
        assert_eq!(config.jwt.refresh_token_expire_days, 7);
        assert_eq!(config.share.token_length, 16);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MoaConfig::from_toml_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.jwt.refresh_token_expire_days, 7);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = MoaConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = MoaConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, MoaConfig::default());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = configured();
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(MoaConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgres://db/moa"),
            ("JWT_SECRET_KEY", "s3cret"),
            ("JWT_ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("DEBUG", "false"),
            ("MOA_PORT", "9100"),
        ]
        .into_iter()
        .collect();
        let mut config = MoaConfig::default();
        config
            .apply_env_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.database.url, "postgres://db/moa");
        assert_eq!(config.jwt.secret_key, "s3cret");
        assert_eq!(config.jwt.access_token_expire_minutes, 30);
        assert!(!config.debug);
        assert_eq!(config.server.port, 9100);
        assert_eq!(
            config.cors.origins(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_bad_env_number_is_rejected() {
        let mut config = MoaConfig::default();
        let err = config
            .apply_env_overrides(|k| (k == "MOA_PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("MOA_PORT"));
    }

    #[test]
    fn test_validate_requires_secret() {
        assert!(MoaConfig::default().validate().is_err());
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_settings() {
        let mut config = configured();
        config.jwt.refresh_token_expire_days = 100_000_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jwt.refresh_token_expire_days"));

        let mut config = configured();
        config.password.bcrypt_cost = 40;
        assert!(config.validate().is_err());

        let mut config = configured();
        config.share.token_length = 0;
        assert!(matches!(config.validate().unwrap_err(), Error::Config { .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_algorithm() {
        let mut config = configured();
        config.jwt.algorithm = "RS256".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_vars_use_deployment_names() {
        let vars = configured().to_env_vars().unwrap();
        let keys: Vec<&str> = vars.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"JWT_SECRET_KEY"));
        assert!(keys.contains(&"ALLOWED_ORIGINS"));
        assert!(vars.contains(&("MOA_PORT".to_string(), "8000".to_string())));
    }

    #[test]
    fn test_share_url_joins_cleanly() {
        let mut share = ShareConfig::default();
        share.base_url = "https://moa.example/share/".to_string();
        assert_eq!(share.share_url("abc"), "https://moa.example/share/abc");
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = MoaConfig::resolve_config_path(Some("/etc/moa.toml")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/moa.toml"));
    }
}

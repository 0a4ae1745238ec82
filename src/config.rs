use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

pub const DEFAULT_AVATAR_BUCKET: &str = "avatars";
pub const DEFAULT_MAX_AVATAR_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub storage_url: String,
    pub storage_service_key: String,
    pub avatar_bucket: String,
    pub max_avatar_bytes: usize,
    pub shuffle_seed: Option<u64>,
    pub log_format: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            storage_url: get_env("STORAGE_URL")?,
            storage_service_key: get_env("STORAGE_SERVICE_KEY")?,
            avatar_bucket: env::var("AVATAR_BUCKET")
                .ok()
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AVATAR_BUCKET.to_string()),
            max_avatar_bytes: get_env_parse_or("MAX_AVATAR_BYTES", DEFAULT_MAX_AVATAR_BYTES)?,
            shuffle_seed: get_env_parse_opt("SHUFFLE_SEED")?,
            log_format: env::var("LOG_FORMAT").ok(),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_opt<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(None),
    }
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    Ok(get_env_parse_opt(name)?.unwrap_or(default))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_values_parse_or_fall_back() {
        env::set_var("TESTPREP_CFG_SEED", "42");
        env::set_var("TESTPREP_CFG_BLANK", "  ");
        env::set_var("TESTPREP_CFG_BAD", "abc");

        let seed: Option<u64> = get_env_parse_opt("TESTPREP_CFG_SEED").unwrap();
        assert_eq!(seed, Some(42));

        let blank: Option<u64> = get_env_parse_opt("TESTPREP_CFG_BLANK").unwrap();
        assert_eq!(blank, None);

        let fallback: usize = get_env_parse_or("TESTPREP_CFG_MISSING", 7).unwrap();
        assert_eq!(fallback, 7);

        let bad: Result<Option<u64>> = get_env_parse_opt("TESTPREP_CFG_BAD");
        assert!(matches!(bad, Err(Error::Config(_))));
    }
}

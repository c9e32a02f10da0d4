use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Environment configuration, read once at startup. Startup fails
/// immediately when a required value is missing.
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let db_path: PathBuf = env::var("TALLY_DB_PATH")
            .context("TALLY_DB_PATH is not set")?
            .into();
        let host = env::var("TALLY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env::var("TALLY_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("TALLY_PORT is not a valid port number")?;
        let jwt_secret =
            env::var("TALLY_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());

        Ok(Self {
            db_path,
            host,
            port,
            jwt_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // one test owns the process environment to keep it race-free
    #[test]
    fn db_path_is_required_and_defaults_fill_the_rest() {
        unsafe {
            env::remove_var("TALLY_DB_PATH");
            env::remove_var("TALLY_HOST");
            env::remove_var("TALLY_PORT");
            env::remove_var("TALLY_JWT_SECRET");
        }
        assert!(Config::from_env().is_err());

        unsafe {
            env::set_var("TALLY_DB_PATH", "/tmp/tally.db");
        }
        let config = Config::from_env().expect("config");
        assert_eq!(config.db_path, PathBuf::from("/tmp/tally.db"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);

        unsafe {
            env::set_var("TALLY_PORT", "not-a-port");
        }
        assert!(Config::from_env().is_err());

        unsafe {
            env::remove_var("TALLY_DB_PATH");
            env::remove_var("TALLY_PORT");
        }
    }
}

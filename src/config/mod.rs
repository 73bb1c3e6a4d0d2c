use anyhow::{bail, Result};
use std::{env, fs, io::ErrorKind, path::Path};

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "annodb.toml";

const ENV_NAME_DB_URL: &str = "DATABASE_URL";

pub struct Config {
    pub db: Db,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let file_path: &Path = file_path.as_ref().map(|p| p.as_ref()).unwrap_or_else(|| {
            log::debug!("No configuration file specified, trying {DEFAULT_CONFIG_FILE_NAME}");
            Path::new(DEFAULT_CONFIG_FILE_NAME)
        });

        let raw_config = match fs::read_to_string(file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)?,
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    log::info!(
                        "{} not found => load default configuration",
                        file_path.display()
                    );
                    Ok(raw::Config::default())
                }
                _ => Err(err),
            }?,
        };
        let mut cfg = Self::try_from(raw_config)?;
        if let Ok(db_url) = env::var(ENV_NAME_DB_URL) {
            cfg.db.conn_sqlite = db_url;
        }
        Ok(cfg)
    }
}

pub struct Db {
    /// SQLite connection
    pub conn_sqlite: String,
    pub conn_pool_size: u8,
    /// Create the schema when opening the database
    pub install: bool,
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config { db } = from;

        let raw::Db {
            connection_sqlite,
            connection_pool_size,
            install,
        } = db.unwrap_or_default();

        if connection_pool_size == 0 {
            bail!("The connection pool size must not be 0");
        }

        let db = Db {
            conn_sqlite: connection_sqlite,
            conn_pool_size: connection_pool_size,
            install: install.unwrap_or(true),
        };
        Ok(Self { db })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = Config::try_from(raw::Config::default()).unwrap();
        assert_eq!("annodb.sqlite", cfg.db.conn_sqlite);
        assert_eq!(10, cfg.db.conn_pool_size);
        assert!(cfg.db.install);
    }

    #[test]
    fn parse_config_file() {
        let raw: raw::Config = toml::from_str(
            r#"
[db]
connection-sqlite = "/var/lib/annodb/comments.sqlite"
connection-pool-size = 4
install = false
"#,
        )
        .unwrap();
        let cfg = Config::try_from(raw).unwrap();
        assert_eq!("/var/lib/annodb/comments.sqlite", cfg.db.conn_sqlite);
        assert_eq!(4, cfg.db.conn_pool_size);
        assert!(!cfg.db.install);
    }

    #[test]
    fn missing_db_section_falls_back_to_defaults() {
        let raw: raw::Config = toml::from_str("").unwrap();
        let cfg = Config::try_from(raw).unwrap();
        assert_eq!(10, cfg.db.conn_pool_size);
    }

    #[test]
    fn reject_empty_connection_pool() {
        let raw: raw::Config = toml::from_str(
            r#"
[db]
connection-sqlite = ":memory:"
connection-pool-size = 0
"#,
        )
        .unwrap();
        assert!(Config::try_from(raw).is_err());
    }
}

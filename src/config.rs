use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_source: DataSourceConfig,
    pub page_size: u64,
}

/// Where settled positions are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceConfig {
    /// Hosted PostgREST/Supabase table.
    Postgrest {
        url: String,
        api_key: String,
        table: String,
    },
    /// Local SQLite file, optionally seeded from CSV at startup.
    Sqlite {
        database_path: String,
        seed_csv_path: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

const DEFAULT_TABLE: &str = "settled_positions";
const DEFAULT_PAGE_SIZE: u64 = 5;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let page_size = match env_map.get("PAGE_SIZE") {
            None => DEFAULT_PAGE_SIZE,
            Some(s) => match s.parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "PAGE_SIZE".to_string(),
                        "must be a positive integer".to_string(),
                    ))
                }
            },
        };

        let data_source = match env_map
            .get("DATA_SOURCE")
            .map(|s| s.as_str())
            .unwrap_or("postgrest")
        {
            "postgrest" | "supabase" => DataSourceConfig::Postgrest {
                url: required(&env_map, "SUPABASE_URL")?,
                api_key: required(&env_map, "SUPABASE_ANON_KEY")?,
                table: env_map
                    .get("POSITIONS_TABLE")
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            },
            "sqlite" => DataSourceConfig::Sqlite {
                database_path: required(&env_map, "DATABASE_PATH")?,
                seed_csv_path: env_map
                    .get("SEED_CSV_PATH")
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            },
            other => {
                return Err(ConfigError::InvalidValue(
                    "DATA_SOURCE".to_string(),
                    format!("must be postgrest or sqlite, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            data_source,
            page_size,
        })
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postgrest_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "SUPABASE_URL".to_string(),
            "https://project.supabase.co".to_string(),
        );
        map.insert("SUPABASE_ANON_KEY".to_string(), "anon-key".to_string());
        map
    }

    fn sqlite_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATA_SOURCE".to_string(), "sqlite".to_string());
        map.insert("DATABASE_PATH".to_string(), "/tmp/positions.db".to_string());
        map
    }

    #[test]
    fn test_postgrest_defaults() {
        let config = Config::from_env_map(postgrest_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.page_size, 5);
        assert_eq!(
            config.data_source,
            DataSourceConfig::Postgrest {
                url: "https://project.supabase.co".to_string(),
                api_key: "anon-key".to_string(),
                table: "settled_positions".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_supabase_url() {
        let mut env_map = postgrest_env();
        env_map.remove("SUPABASE_URL");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "SUPABASE_URL"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_blank_anon_key_is_missing() {
        let mut env_map = postgrest_env();
        env_map.insert("SUPABASE_ANON_KEY".to_string(), "  ".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "SUPABASE_ANON_KEY"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_sqlite_with_seed() {
        let mut env_map = sqlite_env();
        env_map.insert("SEED_CSV_PATH".to_string(), "seed.csv".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(
            config.data_source,
            DataSourceConfig::Sqlite {
                database_path: "/tmp/positions.db".to_string(),
                seed_csv_path: Some("seed.csv".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_database_path() {
        let mut env_map = sqlite_env();
        env_map.remove("DATABASE_PATH");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_data_source() {
        let mut env_map = postgrest_env();
        env_map.insert("DATA_SOURCE".to_string(), "mysql".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "DATA_SOURCE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = postgrest_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut env_map = postgrest_env();
        env_map.insert("PAGE_SIZE".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PAGE_SIZE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}

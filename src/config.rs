use anyhow::Context;

const DEFAULT_DATABASE_URL: &str = "sqlite:database.sqlite";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Read the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT").or_else(|| lookup("port")) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {raw}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url,
            host,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(
            config,
            Config {
                database_url: "sqlite:database.sqlite".to_string(),
                host: "127.0.0.1".to_string(),
                port: 3000,
            }
        );
    }

    #[test]
    fn lowercase_port_is_a_fallback() {
        let config = Config::from_lookup(lookup(&[("port", "8081")])).unwrap();
        assert_eq!(config.port, 8081);

        let config = Config::from_lookup(lookup(&[("port", "8081"), ("PORT", "9000")])).unwrap();
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn overrides_and_bad_port() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite:/srv/food.db"),
            ("HOST", "0.0.0.0"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "sqlite:/srv/food.db");
        assert_eq!(config.host, "0.0.0.0");

        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
    }
}

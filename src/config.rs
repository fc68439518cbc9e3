//! Configuration handling.
//!
//! The configuration consists of the expense service credentials, the name lookup and the service
//! URL. Values are taken from the process environment and, for anything not set there, from an
//! optional dotenv-style file (by default `.env` in the working directory).

use crate::error::{ErrorType, IntoResult, Res};
use crate::model::NameLookup;
use anyhow::{bail, Context};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

pub const CONSUMER_KEY: &str = "CONSUMER_KEY";
pub const CONSUMER_SECRET: &str = "CONSUMER_SECRET";
pub const API_KEY: &str = "API_KEY";
pub const LOOKUP: &str = "LOOKUP";
pub const API_URL: &str = "SPLITWISE_API_URL";

const DEFAULT_API_URL: &str = "https://secure.splitwise.com/api/v3.0/";

/// The `Config` object is constructed once at startup and passed to the code that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    credentials: Credentials,
    lookup: NameLookup,
    api_url: Url,
}

impl Config {
    /// Loads the configuration from the process environment, falling back to the values found in
    /// `env_file`. A missing `env_file` is not an error.
    pub async fn load(env_file: &Path) -> crate::Result<Self> {
        Self::load_inner(env_file, |key| std::env::var(key).ok())
            .await
            .pub_result(ErrorType::Config)
    }

    /// Values returned by `get` take precedence over the values in `env_file`.
    async fn load_inner<F>(env_file: &Path, get: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = if env_file.is_file() {
            debug!("Reading configuration from {}", env_file.display());
            read_env_file(env_file)?
        } else {
            debug!("No env file found at {}", env_file.display());
            BTreeMap::new()
        };
        Self::from_vars(|key| get(key).or_else(|| file_vars.get(key).cloned()))
    }

    /// Builds the configuration from a function that returns the value of a variable, if set.
    pub fn from_vars<F>(get: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Res<String> {
            match get(key) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => bail!("The required configuration value {key} is missing or empty"),
            }
        };

        let credentials = Credentials {
            consumer_key: required(CONSUMER_KEY)?,
            consumer_secret: required(CONSUMER_SECRET)?,
            api_key: required(API_KEY)?,
        };

        let lookup = NameLookup::parse(&required(LOOKUP)?)
            .with_context(|| format!("Unable to parse {LOOKUP}"))?;

        let raw_url = get(API_URL)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = parse_api_url(&raw_url)?;

        Ok(Self {
            credentials,
            lookup,
            api_url,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn lookup(&self) -> &NameLookup {
        &self.lookup
    }

    /// The base URL of the expense service API. Always ends with a `/`.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }
}

/// The credentials that are handed to the expense service client. `Debug` does not print secrets.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: String,
    api_key: String,
}

impl Credentials {
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Parses the API base URL and makes sure it ends with a slash so that joining endpoint names
/// appends to the path instead of replacing its last segment.
fn parse_api_url(raw: &str) -> Res<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash).with_context(|| format!("Invalid {API_URL} '{raw}'"))?;
    if url.cannot_be_a_base() {
        bail!("Invalid {API_URL} '{raw}', it cannot be used as a base URL");
    }
    Ok(url)
}

/// Reads a dotenv file into a map without touching the process environment. Lines that cannot be
/// parsed are skipped with a warning.
fn read_env_file(path: &Path) -> Res<BTreeMap<String, String>> {
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Unable to read {}", path.display()))?;
    let mut vars = BTreeMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                vars.insert(key, value.trim().to_string());
            }
            Err(e) => warn!("Skipping a line in {}: {e}", path.display()),
        }
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const FULL: &[(&str, &str)] = &[
        (CONSUMER_KEY, "ck"),
        (CONSUMER_SECRET, "cs"),
        (API_KEY, "ak"),
        (LOOKUP, "1,Alice,2,Bob"),
    ];

    #[test]
    fn test_from_vars() {
        let config = Config::from_vars(vars(FULL)).unwrap();
        assert_eq!(config.credentials().consumer_key(), "ck");
        assert_eq!(config.credentials().consumer_secret(), "cs");
        assert_eq!(config.credentials().api_key(), "ak");
        assert_eq!(config.lookup().label(UserId::new(2)), "Bob");
        assert_eq!(config.api_url().as_str(), DEFAULT_API_URL);
    }

    #[test]
    fn test_missing_value_is_error() {
        for missing in [CONSUMER_KEY, CONSUMER_SECRET, API_KEY, LOOKUP] {
            let pairs: Vec<(&str, &str)> = FULL
                .iter()
                .copied()
                .filter(|(k, _)| *k != missing)
                .collect();
            let err = Config::from_vars(vars(&pairs)).unwrap_err();
            assert!(err.to_string().contains(missing), "{err}");
        }
    }

    #[test]
    fn test_empty_value_is_error() {
        let mut pairs = FULL.to_vec();
        pairs[2] = (API_KEY, "");
        assert!(Config::from_vars(vars(&pairs)).is_err());
    }

    #[test]
    fn test_malformed_lookup_is_error() {
        let mut pairs = FULL.to_vec();
        pairs[3] = (LOOKUP, "1,Alice,2");
        let err = Config::from_vars(vars(&pairs)).unwrap_err();
        assert!(format!("{err:#}").contains("odd number"));
    }

    #[test]
    fn test_api_url_override_gets_trailing_slash() {
        let mut pairs = FULL.to_vec();
        pairs.push((API_URL, "http://localhost:8080/api"));
        let config = Config::from_vars(vars(&pairs)).unwrap();
        assert_eq!(config.api_url().as_str(), "http://localhost:8080/api/");
        assert_eq!(
            config.api_url().join("get_expenses").unwrap().as_str(),
            "http://localhost:8080/api/get_expenses"
        );
    }

    #[test]
    fn test_api_url_invalid() {
        let mut pairs = FULL.to_vec();
        pairs.push((API_URL, "not a url"));
        assert!(Config::from_vars(vars(&pairs)).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_vars(vars(FULL)).unwrap();
        let debug = format!("{:?}", config.credentials());
        assert!(debug.contains("ck"));
        assert!(!debug.contains("\"cs\""));
        assert!(!debug.contains("\"ak\""));
    }

    fn env_file(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(".env");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_env_file() {
        let dir = TempDir::new().unwrap();
        let content = r#"
# credentials
CONSUMER_KEY=abc
export CONSUMER_SECRET="def"
API_KEY='ghi'
LOOKUP=1,Alice,2,Bob
"#;
        let vars = read_env_file(&env_file(&dir, content)).unwrap();
        assert_eq!(vars.get("CONSUMER_KEY").unwrap(), "abc");
        assert_eq!(vars.get("CONSUMER_SECRET").unwrap(), "def");
        assert_eq!(vars.get("API_KEY").unwrap(), "ghi");
        assert_eq!(vars.get("LOOKUP").unwrap(), "1,Alice,2,Bob");
    }

    #[test]
    fn test_read_env_file_strips_inline_comment() {
        let dir = TempDir::new().unwrap();
        let vars = read_env_file(&env_file(&dir, "LOOKUP=1,Alice,2,Bob # roommates\n")).unwrap();
        let lookup = NameLookup::parse(vars.get("LOOKUP").unwrap()).unwrap();
        assert_eq!(lookup.label(UserId::new(2)), "Bob");
    }

    #[test]
    fn test_read_env_file_skips_bad_line() {
        let dir = TempDir::new().unwrap();
        let path = env_file(&dir, "API_KEY=abc\nsome stray text\nLOOKUP=1,A\n");
        let vars = read_env_file(&path).unwrap();
        assert_eq!(vars.get("API_KEY").unwrap(), "abc");
        assert_eq!(vars.get("LOOKUP").unwrap(), "1,A");
    }

    #[tokio::test]
    async fn test_load_missing_env_file_uses_getter_only() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_inner(&dir.path().join("does-not-exist.env"), vars(FULL))
            .await
            .unwrap();
        assert_eq!(config.credentials().api_key(), "ak");
        assert_eq!(config.lookup().label(UserId::new(1)), "Alice");
    }

    #[tokio::test]
    async fn test_load_from_env_file() {
        let dir = TempDir::new().unwrap();
        let path = env_file(
            &dir,
            "CONSUMER_KEY=from-file\nCONSUMER_SECRET=s\nAPI_KEY=k\nLOOKUP=5,Eve\n",
        );
        let config = Config::load_inner(&path, |_| None).await.unwrap();
        assert_eq!(config.credentials().consumer_key(), "from-file");
        assert_eq!(config.lookup().label(UserId::new(5)), "Eve");
    }

    #[tokio::test]
    async fn test_environment_wins_over_env_file() {
        let dir = TempDir::new().unwrap();
        let path = env_file(
            &dir,
            "CONSUMER_KEY=from-file\nCONSUMER_SECRET=s\nAPI_KEY=k\nLOOKUP=5,Eve\n",
        );
        let config = Config::load_inner(&path, vars(&[(LOOKUP, "5,Ann")]))
            .await
            .unwrap();
        assert_eq!(config.lookup().label(UserId::new(5)), "Ann");
        assert_eq!(config.credentials().consumer_key(), "from-file");
    }

    #[tokio::test]
    async fn test_load_reports_missing_key() {
        let dir = TempDir::new().unwrap();
        let path = env_file(&dir, "CONSUMER_KEY=ck\n");
        let err = Config::load_inner(&path, |_| None).await.unwrap_err();
        assert!(err.to_string().contains(CONSUMER_SECRET), "{err:#}");
    }
}

//! Configuration loader
//!
//! Loads the login configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. A `.env` file in the working directory is applied (if present)
//! 2. Environment variables are tried first
//! 3. If a required variable is missing, config files are probed
//! 4. JSON and TOML are supported, detected by extension
//!
//! ## Environment Variables
//! - `GANGWAY_ISSUER`: Issuer URL (required)
//! - `GANGWAY_CLIENT_ID`: Client identifier (required)
//! - `GANGWAY_REDIRECT_URI`: Redirect URI registered with the provider (required)
//! - `GANGWAY_SCOPES`: Space-separated scopes (default `openid profile email`)
//! - `GANGWAY_DISCOVERY_URL`: Discovery endpoint (default derived from issuer)
//! - `GANGWAY_POST_LOGOUT_REDIRECT_URI`: Where end-session returns to
//! - `GANGWAY_REFRESH_THRESHOLD_SECS`: Refresh lead time in seconds (default 300)
//!
//! ## File Locations
//! The loader probes, in order:
//! 1. `gangway.{toml,json}` then `config.{toml,json}` in the working directory
//! 2. The same names one and two directories up
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};

use gangway_domain::{AuthConfig, AuthConfigRecord, GangwayError, Result};

pub const ENV_ISSUER: &str = "GANGWAY_ISSUER";
pub const ENV_CLIENT_ID: &str = "GANGWAY_CLIENT_ID";
pub const ENV_REDIRECT_URI: &str = "GANGWAY_REDIRECT_URI";
pub const ENV_SCOPES: &str = "GANGWAY_SCOPES";
pub const ENV_DISCOVERY_URL: &str = "GANGWAY_DISCOVERY_URL";
pub const ENV_POST_LOGOUT_REDIRECT_URI: &str = "GANGWAY_POST_LOGOUT_REDIRECT_URI";
pub const ENV_REFRESH_THRESHOLD_SECS: &str = "GANGWAY_REFRESH_THRESHOLD_SECS";

const CONFIG_FILE_NAMES: [&str; 4] = ["gangway.toml", "gangway.json", "config.toml", "config.json"];

/// Load configuration, environment first, then files.
///
/// # Errors
/// Returns `GangwayError::Config` when neither source yields a valid
/// configuration. An invalid value in a complete environment is reported
/// as-is rather than masked by the file fallback.
pub fn load() -> Result<AuthConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Applied .env file"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "Ignoring unreadable .env file"),
    }

    match read_env_record() {
        Ok(Some(record)) => {
            let config = AuthConfig::try_from(record)?;
            tracing::info!(issuer = %config.issuer(), "Configuration loaded from environment variables");
            Ok(config)
        }
        Ok(None) => {
            tracing::debug!("Required environment variables missing, trying file");
            load_from_file(None)
        }
        Err(err) => Err(err),
    }
}

/// Load configuration from `GANGWAY_*` environment variables.
///
/// # Errors
/// Returns `GangwayError::Config` if a required variable is missing or a
/// value is invalid.
pub fn load_from_env() -> Result<AuthConfig> {
    let record = read_env_record()?.ok_or_else(|| {
        GangwayError::Config(format!(
            "Missing required environment variable: one of {ENV_ISSUER}, {ENV_CLIENT_ID}, {ENV_REDIRECT_URI}"
        ))
    })?;
    AuthConfig::try_from(record)
}

/// `Ok(None)` when a required variable is absent.
fn read_env_record() -> Result<Option<AuthConfigRecord>> {
    let (Some(issuer), Some(client_id), Some(redirect_uri)) =
        (env_opt(ENV_ISSUER), env_opt(ENV_CLIENT_ID), env_opt(ENV_REDIRECT_URI))
    else {
        return Ok(None);
    };

    let scopes = env_opt(ENV_SCOPES)
        .map(|s| s.split_whitespace().map(ToString::to_string).collect())
        .unwrap_or_default();

    let refresh_threshold_seconds = env_opt(ENV_REFRESH_THRESHOLD_SECS)
        .map(|s| {
            s.parse::<i64>().map_err(|e| {
                GangwayError::Config(format!("Invalid {ENV_REFRESH_THRESHOLD_SECS}: {e}"))
            })
        })
        .transpose()?;

    Ok(Some(AuthConfigRecord {
        issuer,
        client_id,
        redirect_uri,
        scopes,
        discovery_url: env_opt(ENV_DISCOVERY_URL),
        post_logout_redirect_uri: env_opt(ENV_POST_LOGOUT_REDIRECT_URI),
        refresh_threshold_seconds,
    }))
}

/// Load configuration from a file.
///
/// If `path` is `None`, [`probe_config_paths`] picks the file.
///
/// # Errors
/// Returns `GangwayError::Config` if the file is missing, unreadable,
/// malformed, or holds invalid values.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AuthConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GangwayError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GangwayError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GangwayError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Format is detected by extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<AuthConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let record: AuthConfigRecord = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GangwayError::Config(format!("Invalid TOML format: {e}")))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| GangwayError::Config(format!("Invalid JSON format: {e}")))?,
        _ => return Err(GangwayError::Config(format!("Unsupported config format: {extension}"))),
    };

    AuthConfig::try_from(record)
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    candidates_in(&roots).into_iter().find(|path| path.exists())
}

fn candidates_in(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .collect()
}

/// Set and non-blank.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 7] = [
        ENV_ISSUER,
        ENV_CLIENT_ID,
        ENV_REDIRECT_URI,
        ENV_SCOPES,
        ENV_DISCOVERY_URL,
        ENV_POST_LOGOUT_REDIRECT_URI,
        ENV_REFRESH_THRESHOLD_SECS,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_env_required_only() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_ISSUER, "https://idp.example.com/realms/main");
        std::env::set_var(ENV_CLIENT_ID, "spa");
        std::env::set_var(ENV_REDIRECT_URI, "http://localhost:4200/");

        let config = load_from_env().unwrap();
        assert_eq!(config.client_id(), "spa");
        assert_eq!(config.scope_string(), "openid profile email");
        assert_eq!(
            config.discovery_url().as_str(),
            "https://idp.example.com/realms/main/.well-known/openid-configuration"
        );
        assert_eq!(config.refresh_threshold_seconds(), 300);

        clear_env();
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_ISSUER, "https://idp.example.com");
        std::env::set_var(ENV_CLIENT_ID, "spa");
        std::env::set_var(ENV_REDIRECT_URI, "http://localhost:4200/");
        std::env::set_var(ENV_SCOPES, "openid  offline_access");
        std::env::set_var(ENV_DISCOVERY_URL, "https://meta.example.com/oidc.json");
        std::env::set_var(ENV_POST_LOGOUT_REDIRECT_URI, "http://localhost:4200/bye");
        std::env::set_var(ENV_REFRESH_THRESHOLD_SECS, "60");

        let config = load_from_env().unwrap();
        assert_eq!(config.scopes(), ["openid", "offline_access"]);
        assert_eq!(config.discovery_url().as_str(), "https://meta.example.com/oidc.json");
        assert_eq!(
            config.post_logout_redirect_uri().map(url::Url::as_str),
            Some("http://localhost:4200/bye")
        );
        assert_eq!(config.refresh_threshold_seconds(), 60);

        clear_env();
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_ISSUER, "https://idp.example.com");

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, GangwayError::Config(_)), "got {err:?}");

        clear_env();
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_ISSUER, "https://idp.example.com");
        std::env::set_var(ENV_CLIENT_ID, "spa");
        std::env::set_var(ENV_REDIRECT_URI, "http://localhost:4200/");
        std::env::set_var(ENV_REFRESH_THRESHOLD_SECS, "soon");
        assert!(matches!(load_from_env(), Err(GangwayError::Config(_))));

        std::env::remove_var(ENV_REFRESH_THRESHOLD_SECS);
        std::env::set_var(ENV_REDIRECT_URI, "not a url");
        assert!(matches!(load_from_env(), Err(GangwayError::Config(_))));

        clear_env();
    }

    #[test]
    fn test_load_prefers_complete_environment() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_ISSUER, "https://env.example.com");
        std::env::set_var(ENV_CLIENT_ID, "from-env");
        std::env::set_var(ENV_REDIRECT_URI, "http://localhost/");

        let config = load().unwrap();
        assert_eq!(config.client_id(), "from-env");

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "gangway.toml",
            r#"
issuer = "https://idp.example.com"
client_id = "desktop"
redirect_uri = "http://127.0.0.1:8400/callback"
scopes = ["openid", "email"]
refresh_threshold_seconds = 120
"#,
        );

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.client_id(), "desktop");
        assert_eq!(config.scope_string(), "openid email");
        assert_eq!(config.refresh_threshold_seconds(), 120);
        assert!(config.post_logout_redirect_uri().is_none());
    }

    #[test]
    fn test_load_from_file_json() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "config.json",
            r#"{
                "issuer": "https://idp.example.com",
                "client_id": "spa",
                "redirect_uri": "http://localhost:4200/",
                "post_logout_redirect_uri": "http://localhost:4200/signed-out"
            }"#,
        );

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.issuer().as_str(), "https://idp.example.com/");
        assert_eq!(config.scopes().len(), 3);
        assert!(config.post_logout_redirect_uri().is_some());
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/gangway.toml"))).unwrap_err();
        assert!(matches!(err, GangwayError::Config(_)));
    }

    #[test]
    fn test_load_from_file_invalid_contents() {
        let dir = TempDir::new().unwrap();

        let broken = write_file(&dir, "broken.json", r#"{ "issuer": "#);
        assert!(matches!(load_from_file(Some(broken)), Err(GangwayError::Config(_))));

        let bad_url = write_file(
            &dir,
            "bad.toml",
            "issuer = \"::\"\nclient_id = \"spa\"\nredirect_uri = \"http://localhost/\"\n",
        );
        assert!(matches!(load_from_file(Some(bad_url)), Err(GangwayError::Config(_))));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let err = parse_config("issuer: x", Path::new("gangway.yaml")).unwrap_err();
        assert!(matches!(err, GangwayError::Config(msg) if msg.contains("yaml")));
    }

    #[test]
    fn test_candidates_order() {
        let roots = [PathBuf::from("/a"), PathBuf::from("/b")];
        let candidates = candidates_in(&roots);

        assert_eq!(candidates.len(), 8);
        assert_eq!(candidates[0], PathBuf::from("/a/gangway.toml"));
        assert_eq!(candidates[3], PathBuf::from("/a/config.json"));
        assert_eq!(candidates[4], PathBuf::from("/b/gangway.toml"));
    }
}

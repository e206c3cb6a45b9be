// Configuration module: everything the CLI needs from the environment is
// collected here once, so the rest of the crate never calls `std::env`.

use std::path::PathBuf;

/// Base URL of the public Cloud Vision REST API.
pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com";

/// Host of the compute metadata server when running on the platform.
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

const ADC_FILE_NAME: &str = "application_default_credentials.json";

/// Runtime configuration. Fields are public so tests (and embedders) can
/// build one by hand instead of going through the environment.
#[derive(Clone, Debug)]
pub struct Config {
    /// Service base URL, without the `/v1/...` path.
    pub endpoint: String,
    /// `GOOGLE_VISION_API_KEY`, sent as a `key` query parameter.
    pub api_key: Option<String>,
    /// `GOOGLE_OAUTH_ACCESS_TOKEN`, a pre-minted bearer token.
    pub access_token: Option<String>,
    /// `GOOGLE_APPLICATION_CREDENTIALS`, an explicit credentials file.
    pub credentials_file: Option<PathBuf>,
    /// Location of gcloud's application default credentials file.
    pub well_known_file: Option<PathBuf>,
    /// `GCE_METADATA_HOST`
    pub metadata_host: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.into(),
            api_key: None,
            access_token: None,
            credentials_file: None,
            well_known_file: None,
            metadata_host: DEFAULT_METADATA_HOST.into(),
        }
    }
}

impl Config {
    /// Build a Config from the process environment. A `.env` file in the
    /// working directory is loaded first when present.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a Config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let well_known_file = get("CLOUDSDK_CONFIG")
            .map(PathBuf::from)
            .or_else(default_gcloud_dir)
            .map(|dir| dir.join(ADC_FILE_NAME));

        Config {
            endpoint: get("VISION_API_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.into()),
            api_key: get("GOOGLE_VISION_API_KEY"),
            access_token: get("GOOGLE_OAUTH_ACCESS_TOKEN"),
            credentials_file: get("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            well_known_file,
            metadata_host: get("GCE_METADATA_HOST").unwrap_or_else(|| DEFAULT_METADATA_HOST.into()),
        }
    }

    /// Full URL of the batch annotate endpoint.
    pub fn annotate_url(&self) -> String {
        format!("{}/v1/images:annotate", self.endpoint.trim_end_matches('/'))
    }
}

// gcloud keeps its config under %APPDATA% on Windows and ~/.config elsewhere
// (macOS included, so `dirs::config_dir` is not used there).
#[cfg(windows)]
fn default_gcloud_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gcloud"))
}

#[cfg(not(windows))]
fn default_gcloud_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|d| d.join(".config").join("gcloud"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = Config::from_lookup(lookup(&[]));
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.metadata_host, DEFAULT_METADATA_HOST);
        assert!(cfg.api_key.is_none());
        assert!(cfg.access_token.is_none());
        assert!(cfg.credentials_file.is_none());
    }

    #[test]
    fn reads_overrides_and_ignores_blank_values() {
        let cfg = Config::from_lookup(lookup(&[
            ("VISION_API_ENDPOINT", "http://127.0.0.1:9000/"),
            ("GOOGLE_VISION_API_KEY", "  "),
            ("GOOGLE_OAUTH_ACCESS_TOKEN", "ya29.token"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/tmp/creds.json"),
            ("GCE_METADATA_HOST", "127.0.0.1:8080"),
        ]));
        assert_eq!(cfg.annotate_url(), "http://127.0.0.1:9000/v1/images:annotate");
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.access_token.as_deref(), Some("ya29.token"));
        assert_eq!(cfg.credentials_file, Some(PathBuf::from("/tmp/creds.json")));
        assert_eq!(cfg.metadata_host, "127.0.0.1:8080");
    }

    #[test]
    fn cloudsdk_config_moves_the_well_known_file() {
        let cfg = Config::from_lookup(lookup(&[("CLOUDSDK_CONFIG", "/opt/gcloud")]));
        assert_eq!(
            cfg.well_known_file,
            Some(PathBuf::from("/opt/gcloud").join(ADC_FILE_NAME))
        );
    }
}

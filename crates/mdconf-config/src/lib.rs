//! Configuration management for mdconf.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. Environment variables ([`EnvSettings`])
//! 3. `mdconf.toml`, either passed explicitly or discovered in the current
//!    directory or one of its parents
//! 4. Command-line flags ([`CliSettings`])
//!
//! ## Environment Variable Expansion
//!
//! String values in the config file support `${VAR}` and `${VAR:-default}`.
//! This lets the file reference secrets without storing them:
//!
//! ```toml
//! [confluence]
//! domain = "mycompany.atlassian.net"
//! space = "DOCS"
//! email = "${CONFLUENCE_EMAIL}"
//! api_token = "${CONFLUENCE_API_TOKEN}"
//! ```

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdconf.toml";

/// Default Kroki server used for diagram rendering.
const DEFAULT_KROKI_URL: &str = "https://kroki.io";

/// Default timeout for diagram rendering requests.
const DEFAULT_DIAGRAM_TIMEOUT_SECS: u64 = 30;

/// Command-line settings that override every other layer.
///
/// Only `Some` values take effect.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Confluence domain (e.g. `mycompany.atlassian.net`).
    pub domain: Option<String>,
    /// Space key new pages are created in.
    pub space: Option<String>,
    /// Parent page ID for new pages.
    pub parent_page_id: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// API token.
    pub api_token: Option<String>,
    /// Kroki server URL.
    pub kroki_url: Option<String>,
    /// Render mermaid diagrams.
    pub mermaid: Option<bool>,
    /// Predict actions without changing anything.
    pub dry_run: Option<bool>,
    /// Verbose diagnostics.
    pub verbose: Option<bool>,
}

/// Settings read from `CONFLUENCE_*` environment variables.
#[derive(Debug, Default)]
pub struct EnvSettings {
    /// `CONFLUENCE_DOMAIN`.
    pub domain: Option<String>,
    /// `CONFLUENCE_SPACE`.
    pub space: Option<String>,
    /// `CONFLUENCE_EMAIL`.
    pub email: Option<String>,
    /// `CONFLUENCE_API_TOKEN`.
    pub api_token: Option<String>,
}

impl EnvSettings {
    /// Read settings from the process environment. Empty values count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            domain: var("CONFLUENCE_DOMAIN"),
            space: var("CONFLUENCE_SPACE"),
            email: var("CONFLUENCE_EMAIL"),
            api_token: var("CONFLUENCE_API_TOKEN"),
        }
    }
}

/// Raw configuration layer as parsed from TOML.
///
/// Every field is optional so layers can be merged before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    confluence: ConfluenceLayer,
    diagrams: DiagramsLayer,
    dry_run: Option<bool>,
    verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfluenceLayer {
    domain: Option<String>,
    space: Option<String>,
    email: Option<String>,
    api_token: Option<String>,
    parent_page_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DiagramsLayer {
    mermaid: Option<bool>,
    kroki_url: Option<String>,
    timeout_secs: Option<u64>,
}

/// Replace `target` with `value` when the higher layer sets it.
fn overlay<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

impl ConfigLayer {
    fn from_env(env: &EnvSettings) -> Self {
        Self {
            confluence: ConfluenceLayer {
                domain: env.domain.clone(),
                space: env.space.clone(),
                email: env.email.clone(),
                api_token: env.api_token.clone(),
                parent_page_id: None,
            },
            ..Self::default()
        }
    }

    fn from_cli(cli: &CliSettings) -> Self {
        Self {
            confluence: ConfluenceLayer {
                domain: cli.domain.clone(),
                space: cli.space.clone(),
                email: cli.email.clone(),
                api_token: cli.api_token.clone(),
                parent_page_id: cli.parent_page_id.clone(),
            },
            diagrams: DiagramsLayer {
                mermaid: cli.mermaid,
                kroki_url: cli.kroki_url.clone(),
                timeout_secs: None,
            },
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        }
    }

    /// Merge a higher-precedence layer on top of this one.
    fn merge(&mut self, upper: Self) {
        let conf = &mut self.confluence;
        overlay(&mut conf.domain, upper.confluence.domain);
        overlay(&mut conf.space, upper.confluence.space);
        overlay(&mut conf.email, upper.confluence.email);
        overlay(&mut conf.api_token, upper.confluence.api_token);
        overlay(&mut conf.parent_page_id, upper.confluence.parent_page_id);

        let diagrams = &mut self.diagrams;
        overlay(&mut diagrams.mermaid, upper.diagrams.mermaid);
        overlay(&mut diagrams.kroki_url, upper.diagrams.kroki_url);
        overlay(&mut diagrams.timeout_secs, upper.diagrams.timeout_secs);

        overlay(&mut self.dry_run, upper.dry_run);
        overlay(&mut self.verbose, upper.verbose);
    }

    /// Expand `${VAR}` references in string values.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let conf = &mut self.confluence;
        expand::expand_opt(&mut conf.domain, "confluence.domain")?;
        expand::expand_opt(&mut conf.space, "confluence.space")?;
        expand::expand_opt(&mut conf.email, "confluence.email")?;
        expand::expand_opt(&mut conf.api_token, "confluence.api_token")?;
        expand::expand_opt(&mut conf.parent_page_id, "confluence.parent_page_id")?;
        expand::expand_opt(&mut self.diagrams.kroki_url, "diagrams.kroki_url")?;
        Ok(())
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote store settings.
    pub confluence: ConfluenceConfig,
    /// Diagram rendering settings.
    pub diagrams: DiagramsConfig,
    /// Predict actions without issuing mutating calls.
    pub dry_run: bool,
    /// Verbose diagnostics.
    pub verbose: bool,
    /// Path of the config file that was loaded, if any.
    pub config_path: Option<PathBuf>,
}

/// Confluence connection and placement settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfluenceConfig {
    /// Confluence Cloud domain (e.g. `mycompany.atlassian.net`).
    pub domain: String,
    /// Space key documents are looked up and created in.
    pub space: String,
    /// Account email used for basic authentication.
    pub email: String,
    /// API token used for basic authentication.
    pub api_token: String,
    /// Parent page for newly created documents.
    pub parent_page_id: Option<String>,
}

impl ConfluenceConfig {
    /// Site URL that `webui` links are relative to.
    #[must_use]
    pub fn site_url(&self) -> String {
        format!("https://{}/wiki", self.domain.trim_end_matches('/'))
    }

    /// REST API base URL.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}/rest/api", self.site_url())
    }
}

/// Diagram rendering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramsConfig {
    /// Whether mermaid blocks are rendered to images.
    pub mermaid: bool,
    /// Kroki server URL.
    pub kroki_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            mermaid: true,
            kroki_url: DEFAULT_KROKI_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_DIAGRAM_TIMEOUT_SECS),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error. Multiple problems are reported one per line.
    #[error("{0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g. `confluence.api_token`).
        field: String,
        /// Error message (e.g. `${CONFLUENCE_API_TOKEN} not set`).
        message: String,
    },
}

/// Require a URL to use the http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration by layering environment, config file and CLI settings.
    ///
    /// If `config_path` is provided it must exist. Otherwise `mdconf.toml` is
    /// searched for in the current directory and its parents; a missing file
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a referenced
    /// environment variable is unset, or the merged settings are invalid.
    pub fn load(
        config_path: Option<&Path>,
        env: &EnvSettings,
        cli: &CliSettings,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover_config(),
        };

        let mut layers = ConfigLayer::from_env(env);
        if let Some(path) = &path {
            layers.merge(Self::read_layer(path)?);
        }
        layers.merge(ConfigLayer::from_cli(cli));

        let mut config = Self::resolve(layers)?;
        config.config_path = path;
        Ok(config)
    }

    /// Parse a config file into a layer, expanding environment variables.
    fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut layer: ConfigLayer = toml::from_str(&content)?;
        layer.expand_env_vars()?;
        Ok(layer)
    }

    /// Search for the config file in the current directory and its parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Validate merged layers and fill in defaults.
    fn resolve(layers: ConfigLayer) -> Result<Self, ConfigError> {
        let ConfigLayer {
            confluence,
            diagrams,
            dry_run,
            verbose,
        } = layers;

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let domain = non_empty(confluence.domain);
        let space = non_empty(confluence.space);
        let email = non_empty(confluence.email);
        let api_token = non_empty(confluence.api_token);

        let mut missing = Vec::new();
        if domain.is_none() {
            missing.push("Missing Confluence domain. Set --domain or CONFLUENCE_DOMAIN");
        }
        if space.is_none() {
            missing.push("Missing Confluence space. Set --space or CONFLUENCE_SPACE");
        }
        if email.is_none() {
            missing.push("Missing Confluence email. Set --user or CONFLUENCE_EMAIL");
        }
        if api_token.is_none() {
            missing.push("Missing Confluence API token. Set --token or CONFLUENCE_API_TOKEN");
        }

        let (Some(domain), Some(space), Some(email), Some(api_token)) =
            (domain, space, email, api_token)
        else {
            return Err(ConfigError::Validation(missing.join("\n")));
        };

        let defaults = DiagramsConfig::default();
        let kroki_url = diagrams.kroki_url.unwrap_or(defaults.kroki_url);
        require_http_url(&kroki_url, "diagrams.kroki_url")?;

        let timeout_secs = diagrams
            .timeout_secs
            .unwrap_or(DEFAULT_DIAGRAM_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(Self {
            confluence: ConfluenceConfig {
                domain,
                space,
                email,
                api_token,
                parent_page_id: non_empty(confluence.parent_page_id),
            },
            diagrams: DiagramsConfig {
                mermaid: diagrams.mermaid.unwrap_or(defaults.mermaid),
                kroki_url: kroki_url.trim_end_matches('/').to_owned(),
                timeout: Duration::from_secs(timeout_secs),
            },
            dry_run: dry_run.unwrap_or(false),
            verbose: verbose.unwrap_or(false),
            config_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_env() -> EnvSettings {
        EnvSettings {
            domain: Some("env.atlassian.net".to_owned()),
            space: Some("ENV".to_owned()),
            email: Some("env@example.com".to_owned()),
            api_token: Some("env-token".to_owned()),
        }
    }

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_parse_empty_layer() {
        let layer: ConfigLayer = toml::from_str("").unwrap();
        assert!(layer.confluence.domain.is_none());
        assert!(layer.diagrams.mermaid.is_none());
        assert!(layer.dry_run.is_none());
    }

    #[test]
    fn test_parse_full_layer() {
        let toml = r#"
dry_run = true
verbose = true

[confluence]
domain = "acme.atlassian.net"
space = "DOCS"
email = "me@acme.com"
api_token = "secret"
parent_page_id = "4242"

[diagrams]
mermaid = false
kroki_url = "http://localhost:8000"
timeout_secs = 5
"#;
        let layer: ConfigLayer = toml::from_str(toml).unwrap();
        assert_eq!(layer.confluence.domain.as_deref(), Some("acme.atlassian.net"));
        assert_eq!(layer.confluence.parent_page_id.as_deref(), Some("4242"));
        assert_eq!(layer.diagrams.mermaid, Some(false));
        assert_eq!(layer.diagrams.timeout_secs, Some(5));
        assert_eq!(layer.dry_run, Some(true));
    }

    #[test]
    fn test_env_only_resolves_with_defaults() {
        let config = Config::resolve(ConfigLayer::from_env(&full_env())).unwrap();
        assert_eq!(config.confluence.domain, "env.atlassian.net");
        assert_eq!(config.confluence.parent_page_id, None);
        assert_eq!(config.diagrams, DiagramsConfig::default());
        assert!(!config.dry_run);
        assert!(!config.verbose);
    }

    #[test]
    fn test_file_overrides_env_and_cli_overrides_file() {
        let (_dir, path) = write_config(
            r#"
[confluence]
space = "FILE"
parent_page_id = "100"
"#,
        );
        let cli = CliSettings {
            parent_page_id: Some("200".to_owned()),
            dry_run: Some(true),
            ..CliSettings::default()
        };

        let config = Config::load(Some(&path), &full_env(), &cli).unwrap();

        assert_eq!(config.confluence.domain, "env.atlassian.net");
        assert_eq!(config.confluence.space, "FILE");
        assert_eq!(config.confluence.parent_page_id.as_deref(), Some("200"));
        assert!(config.dry_run);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_cli_can_disable_mermaid() {
        let cli = CliSettings {
            mermaid: Some(false),
            ..CliSettings::default()
        };
        let mut layers = ConfigLayer::from_env(&full_env());
        layers.merge(ConfigLayer::from_cli(&cli));
        let config = Config::resolve(layers).unwrap();
        assert!(!config.diagrams.mermaid);
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let err = Config::resolve(ConfigLayer::default()).unwrap_err();
        let message = err.to_string();
        assert_eq!(message.lines().count(), 4);
        assert!(message.contains("CONFLUENCE_DOMAIN"));
        assert!(message.contains("CONFLUENCE_SPACE"));
        assert!(message.contains("CONFLUENCE_EMAIL"));
        assert!(message.contains("CONFLUENCE_API_TOKEN"));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let env = EnvSettings {
            api_token: Some("   ".to_owned()),
            ..full_env()
        };
        let err = Config::resolve(ConfigLayer::from_env(&env)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing Confluence API token. Set --token or CONFLUENCE_API_TOKEN"
        );
    }

    #[test]
    fn test_invalid_kroki_url_rejected() {
        let mut layers = ConfigLayer::from_env(&full_env());
        layers.diagrams.kroki_url = Some("kroki.io".to_owned());
        let err = Config::resolve(layers).unwrap_err();
        assert!(err.to_string().contains("diagrams.kroki_url"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut layers = ConfigLayer::from_env(&full_env());
        layers.diagrams.timeout_secs = Some(0);
        assert!(matches!(
            Config::resolve(layers),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_kroki_url_trailing_slash_trimmed() {
        let mut layers = ConfigLayer::from_env(&full_env());
        layers.diagrams.kroki_url = Some("https://kroki.example.com/".to_owned());
        let config = Config::resolve(layers).unwrap();
        assert_eq!(config.diagrams.kroki_url, "https://kroki.example.com");
    }

    #[test]
    fn test_explicit_missing_config_file() {
        let result = Config::load(
            Some(Path::new("/nonexistent/mdconf.toml")),
            &full_env(),
            &CliSettings::default(),
        );
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_file_expands_env_vars() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("MDCONF_TEST_CONFIG_TOKEN", "from-env");
        }
        let (_dir, path) = write_config(
            r#"
[confluence]
api_token = "${MDCONF_TEST_CONFIG_TOKEN}"
"#,
        );
        let config = Config::load(Some(&path), &full_env(), &CliSettings::default()).unwrap();
        assert_eq!(config.confluence.api_token, "from-env");
        unsafe {
            std::env::remove_var("MDCONF_TEST_CONFIG_TOKEN");
        }
    }

    #[test]
    fn test_config_file_parse_error() {
        let (_dir, path) = write_config("[confluence\n");
        let result = Config::load(Some(&path), &full_env(), &CliSettings::default());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_urls() {
        let config = Config::resolve(ConfigLayer::from_env(&full_env())).unwrap();
        assert_eq!(config.confluence.site_url(), "https://env.atlassian.net/wiki");
        assert_eq!(
            config.confluence.api_url(),
            "https://env.atlassian.net/wiki/rest/api"
        );
    }
}

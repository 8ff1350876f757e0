//! Server configuration
//!
//! Environment variables provide defaults; command-line flags override them.
//!
//! | Variable | Flag | Meaning |
//! |---|---|---|
//! | `MG_MCP_TOKEN` / `MASTERGO_API_TOKEN` | `--token` | user access token |
//! | `API_BASE_URL` | `--url` | MasterGo API base URL |
//! | `RULES` (JSON array) | `--rule` (repeatable) | extra rules returned with DSL |
//! | `DEBUG` | `--debug` | verbose logging |
//! | `MG_MCP_TIMEOUT_SECS` | `--timeout-secs` | HTTP timeout |

use clap::Parser;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// MasterGo user access token (overrides MG_MCP_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// MasterGo API base URL (overrides API_BASE_URL)
    #[arg(long)]
    pub url: Option<String>,

    /// Rule the agent must follow when generating code; repeat for several
    #[arg(long = "rule")]
    pub rules: Vec<String>,

    /// Enable debug logging on stderr
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// HTTP request timeout in seconds (overrides MG_MCP_TIMEOUT_SECS)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

/// Resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub token: Option<String>,
    pub base_url: String,
    pub rules: Vec<String>,
    pub debug: bool,
    pub timeout: Duration,
    /// Problems found while reading the environment. Logged by the caller
    /// once a subscriber is installed.
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            rules: Vec::new(),
            debug: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.token = non_empty("MG_MCP_TOKEN").or_else(|| non_empty("MASTERGO_API_TOKEN"));
        if let Some(url) = non_empty("API_BASE_URL") {
            config.base_url = url;
        }
        if let Some(raw) = non_empty("RULES") {
            match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(rules) => config.rules = rules,
                Err(e) => config
                    .warnings
                    .push(format!("Ignoring RULES, expected a JSON array of strings: {e}")),
            }
        }
        if let Some(val) = non_empty("DEBUG") {
            config.debug = val.to_lowercase() == "true" || val == "1";
        }
        if let Some(secs) = non_empty("MG_MCP_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(n) => config.timeout = Duration::from_secs(n),
                Err(_) => config
                    .warnings
                    .push(format!("Ignoring MG_MCP_TIMEOUT_SECS={secs}, not a number")),
            }
        }

        config
    }

    /// Apply command-line overrides
    pub fn with_args(mut self, args: Args) -> Self {
        if let Some(token) = args.token.filter(|t| !t.is_empty()) {
            self.token = Some(token);
        }
        if let Some(url) = args.url.filter(|u| !u.is_empty()) {
            self.base_url = url;
        }
        if !args.rules.is_empty() {
            self.rules = args.rules;
        }
        self.debug |= args.debug;
        if let Some(secs) = args.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Default log filter directive for this configuration
    pub fn log_directive(&self) -> &'static str {
        if self.debug {
            "mastergo_mcp=debug,dsl=debug"
        } else {
            "mastergo_mcp=info,dsl=info"
        }
    }
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
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_values() {
        let config = Config::from_lookup(lookup(&[
            ("MASTERGO_API_TOKEN", "secondary"),
            ("API_BASE_URL", "https://mastergo.com"),
            ("RULES", r#"["use tailwind", "vue3"]"#),
            ("DEBUG", "TRUE"),
            ("MG_MCP_TIMEOUT_SECS", "5"),
        ]));
        assert_eq!(config.token.as_deref(), Some("secondary"));
        assert_eq!(config.base_url, "https://mastergo.com");
        assert_eq!(config.rules, vec!["use tailwind", "vue3"]);
        assert!(config.debug);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_primary_token_wins() {
        let config = Config::from_lookup(lookup(&[
            ("MG_MCP_TOKEN", "primary"),
            ("MASTERGO_API_TOKEN", "secondary"),
        ]));
        assert_eq!(config.token.as_deref(), Some("primary"));
    }

    #[test]
    fn test_bad_env_values_ignored() {
        let config = Config::from_lookup(lookup(&[
            ("RULES", "not json"),
            ("MG_MCP_TIMEOUT_SECS", "soon"),
            ("MG_MCP_TOKEN", "  "),
        ]));
        assert!(config.rules.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.token.is_none());

        assert_eq!(config.warnings.len(), 2);
        assert!(config.warnings[0].starts_with("Ignoring RULES"));
        assert_eq!(
            config.warnings[1],
            "Ignoring MG_MCP_TIMEOUT_SECS=soon, not a number"
        );
    }

    #[test]
    fn test_valid_env_has_no_warnings() {
        let config = Config::from_lookup(lookup(&[
            ("RULES", r#"["a"]"#),
            ("MG_MCP_TIMEOUT_SECS", "12"),
        ]));
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_args_override_env() {
        let args = Args::try_parse_from([
            "mastergo-mcp",
            "--token=cli-token",
            "--url",
            "https://example.test",
            "--rule",
            "a",
            "--rule=b",
            "--debug",
            "--timeout-secs",
            "9",
        ])
        .unwrap();
        let config = Config::from_lookup(lookup(&[
            ("MG_MCP_TOKEN", "env-token"),
            ("RULES", r#"["env rule"]"#),
        ]))
        .with_args(args);

        assert_eq!(config.token.as_deref(), Some("cli-token"));
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.rules, vec!["a", "b"]);
        assert!(config.debug);
        assert_eq!(config.timeout, Duration::from_secs(9));
        assert_eq!(config.log_directive(), "mastergo_mcp=debug,dsl=debug");
    }

    #[test]
    fn test_empty_args_keep_env() {
        let config = Config::from_lookup(lookup(&[("RULES", r#"["env rule"]"#)]))
            .with_args(Args::try_parse_from(["mastergo-mcp"]).unwrap());
        assert_eq!(config.rules, vec!["env rule"]);
        assert!(!config.debug);
    }
}

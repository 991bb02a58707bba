// config.rs - Configuration Module
// Builds the immutable bot configuration from command line flags, falling back to a
// botconfig.txt KEY=VALUE file and then to built-in defaults.

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;

pub const DEFAULT_PREFIX: &str = "?";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_GIPHY_API_URL: &str = "https://api.giphy.com";
pub const DEFAULT_TENOR_API_URL: &str = "https://api.tenor.com";

const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";

const CONFIG_PATHS: [&str; 4] = [
    "botconfig.txt",
    "../botconfig.txt",
    "../../botconfig.txt",
    "src/botconfig.txt",
];

/// Command line flags
#[derive(Debug, Default, Parser)]
#[command(name = "gif_bot")]
#[command(about = "Discord bot answering ?giphy and ?tenor commands with a GIF link")]
#[command(version)]
pub struct Cli {
    /// Bot Token
    #[arg(short = 'd', long = "discord-token")]
    pub discord_token: Option<String>,

    /// Giphy Token
    #[arg(short = 'g', long = "giphy-token")]
    pub giphy_token: Option<String>,

    /// Tenor Token
    #[arg(short = 't', long = "tenor-token")]
    pub tenor_token: Option<String>,

    /// Command prefix (default "?")
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// Timeout in seconds for each request to a GIF provider
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Read KEY=VALUE settings from this file instead of searching for botconfig.txt
    #[arg(short = 'c', long)]
    pub config: Option<String>,
}

/// Immutable configuration shared by the dispatcher and the provider adapters
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub giphy_token: String,
    pub tenor_token: String,
    pub prefix: String,
    pub request_timeout: Duration,
    pub giphy_api_url: String,
    pub tenor_api_url: String,
}

impl BotConfig {
    /// Configuration with the given prefix and empty credentials, used by tests
    #[cfg(test)]
    pub fn for_prefix(prefix: &str) -> Self {
        Self {
            discord_token: "test".to_string(),
            giphy_token: String::new(),
            tenor_token: String::new(),
            prefix: prefix.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            giphy_api_url: DEFAULT_GIPHY_API_URL.to_string(),
            tenor_api_url: DEFAULT_TENOR_API_URL.to_string(),
        }
    }
}

/// Load configuration: flags first, then the config file, then defaults
pub fn load(cli: Cli) -> Result<BotConfig, ConfigError> {
    let file = match &cli.config {
        Some(path) => parse_config(&read_config(path)?),
        None => find_config_file().unwrap_or_default(),
    };
    resolve(cli, &file)
}

fn read_config(path: &str) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_string(),
        source,
    })
}

/// Search the usual locations for botconfig.txt; None when no file exists
fn find_config_file() -> Option<HashMap<String, String>> {
    for config_path in &CONFIG_PATHS {
        if let Ok(content) = fs::read_to_string(config_path) {
            log::info!("Configuration loaded from {}", config_path);
            return Some(parse_config(&content));
        }
    }
    log::debug!("No botconfig.txt found, using command line flags only");
    None
}

/// Parse KEY=VALUE lines, skipping blanks and # comments
pub fn parse_config(content: &str) -> HashMap<String, String> {
    // Remove BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(equals_pos) = line.find('=') {
            let key = line[..equals_pos].trim().to_string();
            let value = line[equals_pos + 1..].trim().to_string();
            config.insert(key, value);
        }
    }

    config
}

fn resolve(cli: Cli, file: &HashMap<String, String>) -> Result<BotConfig, ConfigError> {
    let from_file = |key: &str| file.get(key).cloned();

    let discord_token = cli
        .discord_token
        .or_else(|| from_file("DISCORD_TOKEN"))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && t != PLACEHOLDER_TOKEN)
        .ok_or(ConfigError::MissingDiscordToken)?;

    let prefix = cli
        .prefix
        .or_else(|| from_file("PREFIX"))
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
    if prefix.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "PREFIX",
            reason: "prefix must not be empty".to_string(),
        });
    }

    let timeout_secs = match cli.timeout {
        Some(secs) => secs,
        None => match from_file("REQUEST_TIMEOUT") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT",
                reason: format!("'{}' is not a number of seconds", raw),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        },
    };
    if timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "REQUEST_TIMEOUT",
            reason: "timeout must be at least one second".to_string(),
        });
    }

    Ok(BotConfig {
        discord_token,
        giphy_token: cli.giphy_token.or_else(|| from_file("GIPHY_TOKEN")).unwrap_or_default(),
        tenor_token: cli.tenor_token.or_else(|| from_file("TENOR_TOKEN")).unwrap_or_default(),
        prefix,
        request_timeout: Duration::from_secs(timeout_secs),
        giphy_api_url: from_file("GIPHY_API_URL").unwrap_or_else(|| DEFAULT_GIPHY_API_URL.to_string()),
        tenor_api_url: from_file("TENOR_API_URL").unwrap_or_else(|| DEFAULT_TENOR_API_URL.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_token(token: &str) -> Cli {
        Cli {
            discord_token: Some(token.to_string()),
            ..Cli::default()
        }
    }

    #[test]
    fn test_parse_config_skips_comments_and_bom() {
        let content = "\u{feff}# tokens\nDISCORD_TOKEN = abc\n\nPREFIX=!\nnot a pair\n";
        let config = parse_config(content);
        assert_eq!(config.get("DISCORD_TOKEN").map(String::as_str), Some("abc"));
        assert_eq!(config.get("PREFIX").map(String::as_str), Some("!"));
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_defaults_apply_when_only_token_given() {
        let config = resolve(cli_with_token("abc"), &HashMap::new()).unwrap();
        assert_eq!(config.prefix, "?");
        assert_eq!(config.giphy_token, "");
        assert_eq!(config.tenor_token, "");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.giphy_api_url, DEFAULT_GIPHY_API_URL);
    }

    #[test]
    fn test_flags_take_precedence_over_file() {
        let file = parse_config("DISCORD_TOKEN=file\nPREFIX=^\nGIPHY_TOKEN=g\nREQUEST_TIMEOUT=3");
        let cli = Cli {
            prefix: Some("!".to_string()),
            ..cli_with_token("flag")
        };
        let config = resolve(cli, &file).unwrap();
        assert_eq!(config.discord_token, "flag");
        assert_eq!(config.prefix, "!");
        assert_eq!(config.giphy_token, "g");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_missing_discord_token_is_fatal() {
        let err = resolve(Cli::default(), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDiscordToken));

        let err = resolve(cli_with_token(PLACEHOLDER_TOKEN), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDiscordToken));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let file = parse_config("REQUEST_TIMEOUT=soon");
        let err = resolve(cli_with_token("abc"), &file).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "REQUEST_TIMEOUT", .. }));
    }

    #[test]
    fn test_explicit_missing_config_file_is_error() {
        let cli = Cli {
            config: Some("definitely/not/here/botconfig.txt".to_string()),
            ..cli_with_token("abc")
        };
        assert!(matches!(load(cli), Err(ConfigError::Unreadable { .. })));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["gif_bot", "-d", "abc", "-g", "gk", "-t", "tk"]);
        assert_eq!(cli.discord_token.as_deref(), Some("abc"));
        assert_eq!(cli.giphy_token.as_deref(), Some("gk"));
        assert_eq!(cli.tenor_token.as_deref(), Some("tk"));
    }
}

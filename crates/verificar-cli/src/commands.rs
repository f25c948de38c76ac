//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Verificador: CLI for Verificar - browser/API test automation journeys
#[derive(Parser, Debug)]
#[command(name = "verificador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Configuration directory holding <env>.properties files
    #[arg(long, default_value = "config", global = true)]
    pub config_dir: PathBuf,

    /// Environment to resolve configuration for (falls back to the `env`
    /// variable, then `dev`)
    #[arg(long, global = true)]
    pub env: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the login journey and report the outcome
    Login(LoginArgs),

    /// Fetch a bearer token from the auth broker
    Token(TokenArgs),

    /// Show resolved configuration values
    Config(ConfigArgs),
}

/// Arguments for the login command
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Login form URL (defaults to the `LOGIN_URL` configuration key)
    #[arg(long)]
    pub url: Option<String>,

    /// Username (defaults to the `USERNAME` configuration key)
    #[arg(long)]
    pub username: Option<String>,

    /// Password (defaults to the `PASSWORD` configuration key)
    #[arg(long)]
    pub password: Option<String>,

    /// Browser to run against
    #[arg(long, default_value = "Chrome")]
    pub browser: String,

    /// Browser version to request
    #[arg(long, default_value = "latest")]
    pub browser_version: String,

    /// Platform name for the session capabilities
    #[arg(long, default_value = "Windows")]
    pub platform: String,

    /// Platform version for the session capabilities
    #[arg(long, default_value = "10")]
    pub platform_version: String,

    /// Where the session runs (local or a remote grid name)
    #[arg(long, default_value = "local")]
    pub run_location: String,

    /// Window resolution, width x height
    #[arg(long, default_value = "1280x1024")]
    pub resolution: String,

    /// Run the browser headless
    #[arg(long)]
    pub headless: bool,

    /// Run the browser in incognito mode
    #[arg(long)]
    pub incognito: bool,

    /// Milliseconds to wait for the identity provider's redirects
    #[arg(long, default_value = "8000")]
    pub redirect_pause_ms: u64,

    /// Capture and print the authorization code from the landing URL
    #[arg(long)]
    pub capture_code: bool,
}

/// Arguments for the token command
#[derive(Parser, Debug)]
pub struct TokenArgs {
    /// Auth broker base URL (defaults to the `ID_BROKER_URL` configuration
    /// key)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the configured client id
    #[arg(long)]
    pub client_id: Option<String>,

    /// Override the configured client secret
    #[arg(long)]
    pub client_secret: Option<String>,

    /// Print only the bearer header value, for piping
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Keys to resolve; with none given, prints the active environment
    pub keys: Vec<String>,
}

/// Color argument for clap
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ColorArg {
    /// Detect terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_defaults() {
        let cli = Cli::try_parse_from(["verificador", "login"]).unwrap();
        match cli.command {
            Commands::Login(args) => {
                assert_eq!(args.browser, "Chrome");
                assert_eq!(args.redirect_pause_ms, 8000);
                assert!(!args.headless);
                assert!(args.url.is_none());
            }
            _ => panic!("expected login command"),
        }
    }

    #[test]
    fn test_global_flags_apply_anywhere() {
        let cli = Cli::try_parse_from([
            "verificador",
            "token",
            "-vv",
            "--env",
            "qa",
            "--config-dir",
            "conf",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.env.as_deref(), Some("qa"));
        assert_eq!(cli.config_dir, PathBuf::from("conf"));
    }

    #[test]
    fn test_config_accepts_key_list() {
        let cli = Cli::try_parse_from(["verificador", "config", "baseUrl", "CLIENT_ID"]).unwrap();
        match cli.command {
            Commands::Config(args) => assert_eq!(args.keys.len(), 2),
            _ => panic!("expected config command"),
        }
    }
}

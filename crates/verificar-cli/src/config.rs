//! CLI configuration derived from global flags

use crate::commands::{Cli, ColorArg};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Tracing filter directives for this level
    #[must_use]
    pub const fn directives(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Debug => "trace",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// Resolved CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Configuration directory
    pub config_dir: PathBuf,
    /// Explicit environment selection, if any
    pub environment: Option<String>,
}

impl CliConfig {
    /// Derive the configuration from parsed arguments
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let verbosity = if cli.quiet {
            Verbosity::Quiet
        } else {
            match cli.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Debug,
            }
        };
        let color = match cli.color {
            ColorArg::Auto => ColorChoice::Auto,
            ColorArg::Always => ColorChoice::Always,
            ColorArg::Never => ColorChoice::Never,
        };
        Self {
            verbosity,
            color,
            config_dir: cli.config_dir.clone(),
            environment: cli.env.clone(),
        }
    }

    /// Load the configuration resolver selected by the flags
    #[must_use]
    pub fn resolver(&self) -> verificar::ConfigResolver {
        match &self.environment {
            Some(environment) => {
                verificar::ConfigResolver::load_env(&self.config_dir, environment)
            }
            None => verificar::ConfigResolver::load(&self.config_dir),
        }
    }
}

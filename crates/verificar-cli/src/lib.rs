//! Verificador: command-line driver for Verificar journeys
//!
//! ## Usage
//!
//! ```bash
//! verificador login --env qa            # Run the login journey
//! verificador token --raw               # Print a bearer header value
//! verificador config baseUrl CLIENT_ID  # Show resolved configuration
//! ```

#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, LoginArgs, TokenArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::Reporter;

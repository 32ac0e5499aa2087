//! Command line interface of the `eir` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "eir", version, about = "Host health aggregation and self-healing daemon")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Watch the probe results and react to status changes
    Run {
        /// Configuration file; searched in ., $HOME and /etc/eir when omitted
        #[arg(short, long, env = "EIR_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the version
    Version,
    /// Print a sample configuration file
    Confsample,
}

/// Line printed by `eir version`.
pub fn version_line() -> String {
    format!("Eir, version {}", eir_core::host::VERSION)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_config_path() {
        let cli = Cli::try_parse_from(["eir", "run", "--config", "/tmp/eir.yml"]).unwrap();
        assert_matches!(cli.command, Commands::Run { config: Some(ref p) } if p == &PathBuf::from("/tmp/eir.yml"));
    }

    #[test]
    fn other_subcommands() {
        assert_matches!(
            Cli::try_parse_from(["eir", "version"]).unwrap().command,
            Commands::Version
        );
        assert_matches!(
            Cli::try_parse_from(["eir", "confsample"]).unwrap().command,
            Commands::Confsample
        );
        assert!(Cli::try_parse_from(["eir", "explode"]).is_err());
    }

    #[test]
    fn version_line_names_the_package_version() {
        assert_eq!(version_line(), format!("Eir, version {}", env!("CARGO_PKG_VERSION")));
    }
}

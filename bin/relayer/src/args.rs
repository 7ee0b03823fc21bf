//! Parses command-line arguments for the relayer.

use std::{fmt::Display, path::PathBuf, str::FromStr};

use clap::{crate_version, Parser, ValueEnum};

#[derive(Debug, Parser)]
#[clap(
    name = "bridge-relayer",
    about = "Relays source-chain headers and proven events to a Tendermint chain",
    version = crate_version!()
)]
pub(crate) struct Cli {
    #[arg(
        value_enum,
        help = "What to relay into: `relay` (alias: r) for a remote node or `standalone` (alias: s) for an embedded chain",
        default_value_t = OperationMode::Relay
    )]
    pub mode: OperationMode,

    #[clap(
        long,
        short = 'c',
        help = "The file containing the configuration for the relayer",
        default_value = "config.toml"
    )]
    pub config: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum OperationMode {
    /// Submit to a remote Tendermint node.
    #[clap(alias = "r")]
    Relay,

    /// Run the bridge state machine in-process over a local store.
    #[clap(alias = "s")]
    Standalone,
}

impl Display for OperationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationMode::Relay => write!(f, "relay"),
            OperationMode::Standalone => write!(f, "standalone"),
        }
    }
}

impl FromStr for OperationMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relay" => Ok(Self::Relay),
            "standalone" => Ok(Self::Standalone),
            _ => Err("Invalid mode".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_names_round_trip() {
        for mode in [OperationMode::Relay, OperationMode::Standalone] {
            assert_eq!(mode.to_string().parse::<OperationMode>(), Ok(mode));
        }
        assert!("validator".parse::<OperationMode>().is_err());
    }

    #[test]
    fn parses_mode_and_config() {
        let cli = Cli::try_parse_from(["bridge-relayer", "s", "--config", "relayer.toml"]).unwrap();
        assert_eq!(cli.mode, OperationMode::Standalone);
        assert_eq!(cli.config, PathBuf::from("relayer.toml"));

        let cli = Cli::try_parse_from(["bridge-relayer"]).unwrap();
        assert_eq!(cli.mode, OperationMode::Relay);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }
}

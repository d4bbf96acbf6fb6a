use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for evtx-sweep.
///
/// Options that also exist in the YAML config are optional here so that a
/// flag only overrides the file when it is actually given.
#[derive(Parser, Debug)]
#[clap(
    name = "evtx-sweep",
    about = "Find Windows hosts on a network and fetch their event logs over admin shares"
)]
pub struct Args {
    /// Target network in CIDR notation, e.g. 192.168.1.0/24
    pub network: Option<String>,

    /// Remote directory holding the logs (default: C:/Windows/System32/winevt/Logs)
    #[clap(short, long)]
    pub input: Option<String>,

    /// Local output directory
    #[clap(short, long)]
    pub output: Option<String>,

    /// Log types to fetch (default: Security System Application)
    #[clap(short, long, num_args = 1..)]
    pub log_types: Option<Vec<String>>,

    /// Zip the output directory when the sweep is done
    #[clap(long)]
    pub compress: bool,

    /// Number of worker threads per phase (default: 4)
    #[clap(short, long)]
    pub threads: Option<usize>,

    /// Timeout for each echo probe, in milliseconds (default: 1000)
    #[clap(long)]
    pub probe_timeout: Option<u64>,

    /// Timeout for each log copy, in seconds (default: 300)
    #[clap(long)]
    pub copy_timeout: Option<u64>,

    /// Carry on with no hosts when the network does not parse
    #[clap(long)]
    pub allow_empty_scan: bool,

    /// Path to configuration YAML file
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Also write the log to this file
    #[clap(long)]
    pub log_file: Option<PathBuf>,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file and exit
    InitConfig {
        /// Where to write the YAML file
        #[clap(default_value = "evtx_sweep.yaml")]
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_args() {
        let args = Args::parse_from(["evtx-sweep", "10.0.0.0/24", "-o", "out"]);
        assert_eq!(args.network.as_deref(), Some("10.0.0.0/24"));
        assert_eq!(args.output.as_deref(), Some("out"));
        assert!(args.log_types.is_none());
        assert!(args.threads.is_none());
        assert!(!args.compress);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_init_config_subcommand() {
        let args = Args::parse_from(["evtx-sweep", "init-config", "my.yaml"]);
        match args.command {
            Some(Commands::InitConfig { path }) => assert_eq!(path, PathBuf::from("my.yaml")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_thread_count_rejected() {
        let result = Args::try_parse_from(["evtx-sweep", "10.0.0.0/24", "-t", "many"]);
        assert!(result.is_err());
    }
}

//! CLI argument parsing for adiftools

use crate::policy::ErrorPolicy;
use crate::stats::StatQuery;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// Output format for `stat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "adiftools")]
#[command(version)]
#[command(about = "Single-pass tools for ADIF amateur radio contact logs", long_about = None)]
pub struct Cli {
    /// Input ADI file (stdin if none)
    #[arg(short = 'f', long = "input", global = true, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output file (stdout if none)
    #[arg(short = 'o', long = "output", global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it already exists
    #[arg(long, global = true)]
    pub force: bool,

    /// TOML configuration file for error policies and lookup databases
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy records unchanged and report the record count
    Dump,

    /// Drop records whose full field set was already seen
    Dedupe,

    /// Delete the named fields from every record
    Delf {
        /// Field names (case-insensitive)
        #[arg(required = true, value_name = "FIELD")]
        fields: Vec<String>,
    },

    /// Write the named fields as CSV
    Csv {
        /// Field names (case-insensitive)
        #[arg(required = true, value_name = "FIELD")]
        fields: Vec<String>,
    },

    /// Keep records whose field matches a regular expression
    Grep {
        /// Invert the match
        #[arg(short = 'v', long = "invert-match")]
        invert: bool,

        /// FIELD REGEX; use the (?i) prefix for case-insensitive matching
        #[arg(num_args = 0.., value_name = "ARG")]
        args: Vec<String>,
    },

    /// Write Cabrillo QSO: lines for an HF contest
    Cab(PolicyArgs),

    /// Fill entity fields from a cty.csv prefix database
    Dxcc {
        /// AD1C cty.csv file
        #[arg(long, value_name = "FILE")]
        cty: Option<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Fill entity fields from a dated prefix table
    Dxcccl {
        /// Dated prefix table (TOML)
        #[arg(long, value_name = "FILE")]
        clublog: Option<PathBuf>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Print statistics over the whole log
    Stat {
        /// Statistic to print
        #[arg(short = 'q', long = "query", value_parser = StatQuery::from_str)]
        query: StatQuery,

        /// Output format (text or json)
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Select records in a time window and sort them by time
    Time {
        /// Earliest contact time kept, RFC 3339 (e.g. 2022-10-01T00:00:00Z)
        #[arg(long = "starttime", value_name = "TIME")]
        start: Option<String>,

        /// Latest contact time kept, RFC 3339
        #[arg(long = "endtime", value_name = "TIME")]
        end: Option<String>,

        /// Sort newest first
        #[arg(short = 'r', long = "reverse")]
        reverse: bool,

        /// Keep input order (wins over -r)
        #[arg(short = 'n', long = "no-sort")]
        no_sort: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Replace each byte of non-ASCII characters with '*'
    Noasciitostar,
}

/// `--on-error` for tools with required fields
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PolicyArgs {
    /// What a record with a missing or malformed required field does
    #[arg(long = "on-error", value_enum, value_name = "POLICY")]
    pub on_error: Option<ErrorPolicy>,
}

impl Command {
    /// Subcommand name, used as the ADI header comment
    pub fn name(&self) -> &'static str {
        match self {
            Command::Dump => "dump",
            Command::Dedupe => "dedupe",
            Command::Delf { .. } => "delf",
            Command::Csv { .. } => "csv",
            Command::Grep { .. } => "grep",
            Command::Cab(_) => "cab",
            Command::Dxcc { .. } => "dxcc",
            Command::Dxcccl { .. } => "dxcccl",
            Command::Stat { .. } => "stat",
            Command::Time { .. } => "time",
            Command::Noasciitostar => "noasciitostar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_io_flags() {
        let cli = Cli::parse_from(["adiftools", "dump", "-f", "in.adi", "-o", "out.adi"]);
        assert_eq!(cli.input, Some(PathBuf::from("in.adi")));
        assert_eq!(cli.output, Some(PathBuf::from("out.adi")));
        assert!(!cli.force);
        assert!(matches!(cli.command, Command::Dump));
    }

    #[test]
    fn test_cli_global_flags_before_subcommand() {
        let cli = Cli::parse_from(["adiftools", "--force", "--debug", "-f", "in.adi", "dedupe"]);
        assert!(cli.force);
        assert!(cli.debug);
        assert_eq!(cli.command.name(), "dedupe");
    }

    #[test]
    fn test_cli_grep_invert_and_args() {
        let cli = Cli::parse_from(["adiftools", "grep", "-v", "call", "^JA"]);
        match cli.command {
            Command::Grep { invert, args } => {
                assert!(invert);
                assert_eq!(args, vec!["call", "^JA"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_stat_query_and_format() {
        let cli = Cli::parse_from(["adiftools", "stat", "-q", "bands", "--format", "json"]);
        match cli.command {
            Command::Stat { query, format } => {
                assert_eq!(query, StatQuery::Bands);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_stat_rejects_unknown_query() {
        let err = Cli::try_parse_from(["adiftools", "stat", "-q", "callsigns"]).unwrap_err();
        assert!(err.to_string().contains("invalid query type: callsigns"));
    }

    #[test]
    fn test_cli_stat_requires_query() {
        assert!(Cli::try_parse_from(["adiftools", "stat"]).is_err());
    }

    #[test]
    fn test_cli_time_flags() {
        let cli = Cli::parse_from([
            "adiftools",
            "time",
            "--starttime",
            "2022-10-01T00:00:00Z",
            "-r",
            "--on-error",
            "skip",
        ]);
        match cli.command {
            Command::Time {
                start,
                end,
                reverse,
                no_sort,
                policy,
            } => {
                assert_eq!(start.as_deref(), Some("2022-10-01T00:00:00Z"));
                assert!(end.is_none());
                assert!(reverse);
                assert!(!no_sort);
                assert_eq!(policy.on_error, Some(ErrorPolicy::Skip));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_time_accepts_reverse_with_no_sort() {
        let cli = Cli::parse_from(["adiftools", "time", "-r", "-n"]);
        assert!(matches!(
            cli.command,
            Command::Time {
                reverse: true,
                no_sort: true,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_delf_requires_fields() {
        assert!(Cli::try_parse_from(["adiftools", "delf"]).is_err());
    }

    #[test]
    fn test_cli_on_error_default_is_unset() {
        let cli = Cli::parse_from(["adiftools", "cab"]);
        match cli.command {
            Command::Cab(policy) => assert!(policy.on_error.is_none()),
            other => panic!("unexpected command {:?}", other),
        }
    }
}

mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::{Command, NodeArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "lnpeermsg",
    version,
    about = "Exchange custom messages with Lightning peers"
)]
struct Cli {
    #[command(flatten)]
    node: NodeArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.node, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER: &str = "02aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    #[test]
    fn parses_sendcustom_subcommand() {
        let cli = Cli::try_parse_from([
            "lnpeermsg",
            "--rpcsocket",
            "/tmp/node.sock",
            "sendcustom",
            "--peer",
            PEER,
            "--type",
            "32769",
            "--data",
            "beef",
        ])
        .expect("sendcustom args should parse");

        let Command::SendCustom(args) = cli.command else {
            panic!("expected sendcustom");
        };
        assert_eq!(args.msg_type, 32_769);
        assert_eq!(args.data, "beef");
        assert_eq!(
            cli.node.rpcsocket.as_deref(),
            Some(std::path::Path::new("/tmp/node.sock"))
        );
    }

    #[test]
    fn type_above_u16_still_parses() {
        // Range checking belongs to the wire layer, which reports it as a usage error.
        let cli = Cli::try_parse_from([
            "lnpeermsg",
            "sendcustom",
            "--peer",
            PEER,
            "--type",
            "65536",
        ])
        .expect("wide type should parse");
        assert!(matches!(cli.command, Command::SendCustom(ref a) if a.msg_type == 65_536));
    }

    #[test]
    fn parses_sendchannelerror_with_underscore_flag() {
        let cli = Cli::try_parse_from([
            "lnpeermsg",
            "sendchannelerror",
            "--peer",
            PEER,
            "--chan_point",
            "abcd:1",
        ])
        .expect("sendchannelerror args should parse");
        assert!(matches!(cli.command, Command::SendChannelError(_)));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "lnpeermsg",
            "subscribecustom",
            "--count",
            "3",
            "--timeout",
            "250ms",
            "--format",
            "pretty",
        ])
        .expect("subscribecustom args should parse");
        assert_eq!(cli.node.timeout, "250ms");
        assert!(matches!(cli.command, Command::SubscribeCustom(ref a) if a.count == Some(3)));
    }

    #[test]
    fn sendcustom_requires_peer() {
        let err = Cli::try_parse_from(["lnpeermsg", "sendcustom", "--type", "32768"])
            .expect_err("missing --peer should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}

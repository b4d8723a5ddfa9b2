use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use lnpeermsg_peer::{RpcClient, RpcConfig};
use tracing::debug;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod sendchannelerror;
pub mod sendcustom;
pub mod subscribecustom;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a custom message to a connected peer.
    #[command(name = "sendcustom")]
    SendCustom(SendCustomArgs),
    /// Send an error to the remote peer on a specific channel to initiate a
    /// remote force close.
    #[command(name = "sendchannelerror")]
    SendChannelError(SendChannelErrorArgs),
    /// Print custom messages received from any peer.
    #[command(name = "subscribecustom")]
    SubscribeCustom(SubscribeCustomArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, node: &NodeArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::SendCustom(args) => sendcustom::run(args, node),
        Command::SendChannelError(args) => sendchannelerror::run(args, node),
        Command::SubscribeCustom(args) => subscribecustom::run(args, node, format),
        Command::Version(args) => version::run(args),
    }
}

/// Where and how to reach the node.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// Path to the node's RPC socket.
    #[arg(long, value_name = "PATH", env = "LNPEERMSG_RPCSOCKET", global = true)]
    pub rpcsocket: Option<PathBuf>,
    /// Time allowed for each node request (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub timeout: String,
}

impl NodeArgs {
    /// Validate the connection settings without touching the socket.
    pub fn resolve(&self) -> CliResult<(&Path, RpcConfig)> {
        let path = self.rpcsocket.as_deref().ok_or_else(|| {
            CliError::new(
                USAGE,
                "no node socket given (use --rpcsocket or LNPEERMSG_RPCSOCKET)",
            )
        })?;
        let config = RpcConfig {
            timeout: parse_duration(&self.timeout)?,
            ..RpcConfig::default()
        };
        Ok((path, config))
    }
}

/// Client for the node socket; the socket is opened by the first request.
pub fn node_client(path: &Path, config: RpcConfig) -> RpcClient {
    debug!(?path, timeout = ?config.timeout, "using node socket");
    RpcClient::with_config(path, config)
}

#[derive(Args, Debug)]
pub struct SendCustomArgs {
    /// Public key of the destination peer (hex).
    #[arg(long, value_name = "HEX")]
    pub peer: String,
    /// Message type; must fit in 16 bits.
    #[arg(long = "type", value_name = "TYPE")]
    pub msg_type: u64,
    /// Message payload (hex). Empty when omitted.
    #[arg(long, value_name = "HEX", default_value = "")]
    pub data: String,
}

#[derive(Args, Debug)]
pub struct SendChannelErrorArgs {
    /// Public key of the channel counterparty (hex).
    #[arg(long, value_name = "HEX")]
    pub peer: String,
    /// Funding outpoint of the channel.
    #[arg(long = "chan_point", value_name = "TXID:INDEX")]
    pub chan_point: String,
}

#[derive(Args, Debug)]
pub struct SubscribeCustomArgs {
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

/// Decode a hex argument, reporting the flag name on failure.
pub fn decode_hex(flag: &str, input: &str) -> CliResult<Vec<u8>> {
    hex::decode(input.trim())
        .map_err(|err| CliError::new(USAGE, format!("--{flag} is not valid hex: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: Option<&str>, timeout: &str) -> NodeArgs {
        NodeArgs {
            rpcsocket: path.map(PathBuf::from),
            timeout: timeout.to_string(),
        }
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn resolve_requires_a_socket() {
        let err = node(None, "5s").resolve().unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn resolve_applies_timeout() {
        let args = node(Some("/tmp/node.sock"), "750ms");
        let (path, config) = args.resolve().unwrap();
        assert_eq!(path, Path::new("/tmp/node.sock"));
        assert_eq!(config.timeout, Duration::from_millis(750));
    }

    #[test]
    fn decode_hex_names_the_flag() {
        assert_eq!(decode_hex("data", "00ff").unwrap(), vec![0x00, 0xff]);
        assert!(decode_hex("data", "").unwrap().is_empty());
        let err = decode_hex("data", "xyz").unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("--data"));
    }
}

use lnpeermsg_peer::MessageDispatcher;
use lnpeermsg_wire::{wire_type, CustomMessage, PeerId};
use tracing::info;

use crate::cmd::{node_client, decode_hex, NodeArgs, SendCustomArgs};
use crate::exit::{peer_error, wire_error, CliResult, SUCCESS};

pub fn run(args: SendCustomArgs, node: &NodeArgs) -> CliResult<i32> {
    let (peer, message) = build_message(&args)?;
    let (path, config) = node.resolve()?;

    let client = node_client(path, config);
    MessageDispatcher::new(&client)
        .send_message(&peer, &message)
        .map_err(|err| peer_error("send failed", err))?;

    info!(
        %peer,
        msg_type = message.msg_type,
        size = message.payload.len(),
        "custom message sent"
    );
    Ok(SUCCESS)
}

fn build_message(args: &SendCustomArgs) -> CliResult<(PeerId, CustomMessage)> {
    let peer: PeerId = args
        .peer
        .parse()
        .map_err(|err| wire_error("invalid --peer", err))?;
    let msg_type = wire_type(args.msg_type).map_err(|err| wire_error("invalid --type", err))?;
    let data = decode_hex("data", &args.data)?;
    Ok((peer, CustomMessage::new(u32::from(msg_type), data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::USAGE;

    fn args(msg_type: u64, data: &str) -> SendCustomArgs {
        SendCustomArgs {
            peer: format!("03{}", "42".repeat(32)),
            msg_type,
            data: data.to_string(),
        }
    }

    #[test]
    fn builds_message_from_hex_arguments() {
        let (peer, message) = build_message(&args(32_800, "c0ffee")).unwrap();
        assert_eq!(peer.as_bytes()[0], 0x03);
        assert_eq!(message.msg_type, 32_800);
        assert_eq!(message.payload.as_ref(), &[0xc0, 0xff, 0xee]);
    }

    #[test]
    fn wide_type_is_a_usage_error() {
        let err = build_message(&args(65_536, "")).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("65536"));
    }

    #[test]
    fn short_peer_is_a_usage_error() {
        let mut bad = args(32_768, "");
        bad.peer = "02abcd".to_string();
        assert_eq!(build_message(&bad).unwrap_err().code, USAGE);
    }

    #[test]
    fn validation_precedes_socket_lookup() {
        let node = NodeArgs {
            rpcsocket: None,
            timeout: "5s".to_string(),
        };
        let err = run(args(70_000, ""), &node).unwrap_err();
        assert!(err.message.contains("--type"));
    }
}

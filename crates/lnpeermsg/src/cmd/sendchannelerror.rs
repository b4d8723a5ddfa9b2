use lnpeermsg_peer::MessageDispatcher;
use lnpeermsg_wire::{ChannelId, OutPoint, PeerId};
use tracing::info;

use crate::cmd::{node_client, NodeArgs, SendChannelErrorArgs};
use crate::exit::{peer_error, wire_error, CliResult, SUCCESS};

pub fn run(args: SendChannelErrorArgs, node: &NodeArgs) -> CliResult<i32> {
    let peer: PeerId = args
        .peer
        .parse()
        .map_err(|err| wire_error("invalid --peer", err))?;
    let outpoint =
        OutPoint::parse(&args.chan_point).map_err(|err| wire_error("invalid --chan_point", err))?;
    let channel_id = ChannelId::from_outpoint(&outpoint);
    let (path, config) = node.resolve()?;

    let client = node_client(path, config);
    MessageDispatcher::new(&client)
        .send_channel_error(peer.as_bytes(), &channel_id)
        .map_err(|err| peer_error("send failed", err))?;

    info!(%peer, %outpoint, %channel_id, "channel error sent");
    Ok(SUCCESS)
}

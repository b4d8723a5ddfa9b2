use lnpeermsg_peer::{CancelHandle, MessageSubscriber};
use tracing::info;

use crate::cmd::{node_client, NodeArgs, SubscribeCustomArgs};
use crate::exit::{peer_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_event, OutputFormat};

pub fn run(args: SubscribeCustomArgs, node: &NodeArgs, format: OutputFormat) -> CliResult<i32> {
    let (path, config) = node.resolve()?;
    if args.count == Some(0) {
        return Ok(SUCCESS);
    }

    let client = node_client(path, config);
    let mut events = MessageSubscriber::new(&client)
        .subscribe()
        .map_err(|err| peer_error("subscribe failed", err))?;
    install_ctrlc_handler(events.cancel_handle())?;

    let mut printed = 0usize;
    for event in events.by_ref() {
        let event = event.map_err(|err| peer_error("subscription failed", err))?;
        print_event(&event, format);
        printed = printed.saturating_add(1);

        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
    }

    info!(received = printed, "subscription finished");
    Ok(SUCCESS)
}

fn install_ctrlc_handler(handle: CancelHandle) -> CliResult<()> {
    ctrlc::set_handler(move || handle.cancel()).map_err(|err| {
        CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
    })
}

use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::BytesMut;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lnpeermsg_peer::InboundEvent;
use lnpeermsg_wire::type_name;
use serde::Serialize;
use tracing::warn;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct EventOutput {
    peer: String,
    #[serde(rename = "type")]
    msg_type: u32,
    type_name: &'static str,
    size: usize,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_id: Option<String>,
    timestamp: String,
}

impl EventOutput {
    fn new(event: &InboundEvent) -> Self {
        let message = &event.message;
        Self {
            peer: event.sender.to_string(),
            msg_type: message.msg_type,
            type_name: type_name(message.msg_type),
            size: message.payload.len(),
            data: hex::encode(&message.payload),
            channel_id: event
                .error_message()
                .and_then(|decoded| decoded.ok())
                .map(|error| error.channel_id.to_string()),
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_event(event: &InboundEvent, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&EventOutput::new(event)).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let out = EventOutput::new(event);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PEER", "TYPE", "SIZE", "DATA"])
                .add_row(vec![
                    out.peer,
                    format!("{} ({})", out.msg_type, out.type_name),
                    out.size.to_string(),
                    out.data,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", pretty_line(event)),
        OutputFormat::Raw => {
            let mut buf = BytesMut::new();
            match event.message.encode(&mut buf) {
                Ok(()) => print_raw(&buf),
                Err(err) => warn!(error = %err, "message cannot be written in wire form"),
            }
        }
    }
}

pub fn pretty_line(event: &InboundEvent) -> String {
    format!(
        "Received from peer {}: type={}, data={}",
        event.sender,
        event.message.msg_type,
        hex::encode(&event.message.payload)
    )
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

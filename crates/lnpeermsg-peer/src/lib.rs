//! Peer custom-message exchange through a Lightning node.
//!
//! This is the layer applications use. Send arbitrary typed messages to a
//! connected peer, ask a peer to force close a channel with a BOLT #1
//! `error`, and consume the node's stream of inbound custom messages.
//!
//! The node itself sits behind [`NodeTransport`]: [`RpcClient`] talks to a
//! real node over its RPC socket, [`MemoryTransport`] fakes one in process.

#[cfg(all(unix, feature = "async"))]
pub mod async_client;
#[cfg(unix)]
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod memory;
pub mod rpc;
pub mod subscriber;
pub mod transport;

#[cfg(all(unix, feature = "async"))]
pub use async_client::{AsyncRpcClient, AsyncSubscription};
#[cfg(unix)]
pub use client::{RpcClient, RpcConfig};
pub use dispatcher::MessageDispatcher;
pub use error::{PeerError, Result};
pub use memory::{MemoryTransport, SentMessage};
pub use rpc::RawCustomMessage;
pub use subscriber::{InboundEvent, InboundEvents, MessageSubscriber};
pub use transport::{CancelHandle, EventSource, NodeTransport, Subscription};

//! Connection layer to a Lightning node's local RPC socket.
//!
//! The node exposes its custom-message RPCs on a Unix domain socket. This
//! crate owns connecting to (and, for tests and stub nodes, binding) that
//! socket and hands out [`RpcStream`]s for the framing layer to use.

pub mod error;

#[cfg(unix)]
pub mod stream;
#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};

#[cfg(unix)]
pub use stream::RpcStream;
#[cfg(unix)]
pub use uds::UnixDomainSocket;

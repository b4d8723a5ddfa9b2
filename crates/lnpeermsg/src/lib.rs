//! Lightning peer custom messages over a node's RPC socket.
//!
//! # Crate Structure
//!
//! - [`wire`]: channel points, channel ids and message framing
//! - [`transport`]: Unix socket connection to the node
//! - [`frame`]: envelopes exchanged with the node RPC
//! - [`peer`]: sending, force-close requests and inbound subscriptions

/// Re-export wire types.
pub mod wire {
    pub use lnpeermsg_wire::*;
}

/// Re-export transport types.
pub mod transport {
    pub use lnpeermsg_transport::*;
}

/// Re-export envelope types.
pub mod frame {
    pub use lnpeermsg_frame::*;
}

/// Re-export peer messaging types.
pub mod peer {
    pub use lnpeermsg_peer::*;
}

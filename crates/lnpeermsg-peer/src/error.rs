/// Errors that can occur while exchanging custom messages with the node.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Local validation failed (bad peer id, channel point or type).
    #[error(transparent)]
    Wire(#[from] lnpeermsg_wire::WireError),

    /// The node RPC socket could not be reached.
    #[error("transport error: {0}")]
    Transport(#[from] lnpeermsg_transport::TransportError),

    /// Envelope-level error on the RPC connection.
    #[error("frame error: {0}")]
    Frame(#[from] lnpeermsg_frame::FrameError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The node refused or failed a send or subscribe request.
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// The node answered with an envelope that does not fit the exchange.
    #[error("unexpected frame kind {0} from node")]
    UnexpectedFrame(u16),

    /// A request got no answer in time.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The inbound stream ended with a failure reason.
    #[error("custom message stream closed: {0}")]
    StreamClosed(String),
}

pub type Result<T> = std::result::Result<T, PeerError>;

//! Live WAAPI backend: WAMP framing, transport, session lifecycle and
//! typed replies.

pub mod protocol;
pub mod records;
pub mod session;
pub mod transport;

pub use records::{ServerInfo, WaapiObject};
pub use session::{CallError, CallReply, Endpoint, Session, SessionClient, SessionState};
pub use transport::{classify_close, CloseReason, Connector, Transport, WsConnector};

//! Message-oriented transport under the WAAPI session.
//!
//! [`Connector`] and [`Transport`] keep the session state machine
//! independent of the socket. [`WsConnector`] is the production
//! implementation over `tokio-tungstenite`; tests substitute scripted
//! transports.

use std::future::Future;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::error::SearchError;

use super::protocol::SUBPROTOCOL;

/// Why a transport stopped delivering frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// We closed it ourselves.
    Closed,
    /// The endpoint could not be reached (refused, DNS, bad address).
    Unreachable(String),
    /// Anything else: peer close, protocol failure, dropped socket.
    Lost(String),
}

impl CloseReason {
    /// The reason token as the transport reports it.
    pub fn token(&self) -> &str {
        match self {
            Self::Closed => "closed",
            Self::Unreachable(_) => "unreachable",
            Self::Lost(reason) => reason,
        }
    }

    /// Interpret a reason token.
    pub fn from_token(token: &str) -> Self {
        match token {
            "closed" => Self::Closed,
            "unreachable" => Self::Unreachable("unreachable".into()),
            other => Self::Lost(other.to_owned()),
        }
    }
}

/// Map a transport close onto the error taxonomy.
///
/// Our own close is the normal teardown path and yields no error.
pub fn classify_close(reason: CloseReason) -> Option<SearchError> {
    match reason {
        CloseReason::Closed => None,
        CloseReason::Unreachable(detail) => Some(SearchError::Unreachable(detail)),
        CloseReason::Lost(reason) => Some(SearchError::ConnectionClosed(reason)),
    }
}

/// An open, text-frame transport.
pub trait Transport: Send {
    /// Send one text frame.
    fn send(&mut self, frame: String) -> impl Future<Output = Result<(), CloseReason>> + Send;

    /// Wait for the next text frame.
    fn recv(&mut self) -> impl Future<Output = Result<String, CloseReason>> + Send;

    /// Close the transport. Called at most once per transport.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Opens transports to a WAAPI endpoint.
pub trait Connector: Send + Sync {
    type Transport: Transport;

    fn connect(
        &self,
        url: &Url,
    ) -> impl Future<Output = Result<Self::Transport, CloseReason>> + Send;
}

/// WebSocket connector negotiating the `wamp.2.json` sub-protocol.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

/// WebSocket transport returned by [`WsConnector`].
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, url: &Url) -> Result<WsTransport, CloseReason> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| CloseReason::Unreachable(e.to_string()))?;
        request
            .headers_mut()
            .insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));

        let (stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(connect_failure)?;
        tracing::debug!(%url, "WebSocket connected");
        Ok(WsTransport { stream })
    }
}

fn connect_failure(err: WsError) -> CloseReason {
    match err {
        WsError::Io(e) => CloseReason::Unreachable(e.to_string()),
        WsError::Url(e) => CloseReason::Unreachable(e.to_string()),
        other => CloseReason::Lost(other.to_string()),
    }
}

impl Transport for WsTransport {
    async fn send(&mut self, frame: String) -> Result<(), CloseReason> {
        self.stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| CloseReason::Lost(format!("send error: {e}")))
    }

    async fn recv(&mut self) -> Result<String, CloseReason> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => return Ok(text),
                    Err(_) => tracing::debug!("ignoring non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.into_owned())
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| "connection closed by peer".to_owned());
                    return Err(CloseReason::Lost(reason));
                }
                Some(Ok(_)) => {} // Ping/Pong handled by tungstenite.
                Some(Err(e)) => return Err(CloseReason::Lost(format!("read error: {e}"))),
                None => return Err(CloseReason::Lost("connection dropped".into())),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            tracing::debug!(error = %e, "WebSocket close did not complete cleanly");
        }
    }
}

//! One bounded WAAPI session per search or probe.
//!
//! ```text
//! Connecting ──WELCOME──▶ Open ──close()──▶ Closed
//!     │                     │
//!     └─deadline / ABORT / transport loss──▶ Failed
//! ```
//!
//! The handshake and every remote call race a deadline. A session is never
//! reused: callers open one, issue calls strictly one after another, and
//! close it. [`Session::close`] is idempotent and reaches the transport at
//! most once.

use std::time::Duration;

use serde_json::{Map, Value};
use tokio::time::{timeout_at, Instant};
use url::Url;

use crate::config::{WaapiConfig, DEFAULT_TIMEOUT};
use crate::error::SearchError;

use super::protocol::{ProtocolError, WampMessage, REALM, SUBPROTOCOL};
use super::records::ServerInfo;
use super::transport::{classify_close, CloseReason, Connector, Transport};

/// Procedure returning application, version and platform information.
pub const GET_INFO: &str = "ak.wwise.core.getInfo";
/// Procedure evaluating a WAQL object query.
pub const OBJECT_GET: &str = "ak.wwise.core.object.get";

/// Where to reach WAAPI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `ws://{host}:{port}/waapi`; bare IPv6 hosts are bracketed.
    pub fn url(&self) -> Result<Url, SearchError> {
        let host = self.host.trim();
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_owned()
        };
        Url::parse(&format!("ws://{host}:{}/waapi", self.port))
            .map_err(|e| SearchError::InvalidInput(format!("invalid WAAPI address: {e}")))
    }
}

impl From<&WaapiConfig> for Endpoint {
    fn from(config: &WaapiConfig) -> Self {
        Self::new(config.host.clone(), config.port)
    }
}

/// Lifecycle of a [`Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
    Failed(SearchError),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed(_))
    }
}

/// Positional and keyword results of a successful call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallReply {
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

/// Why a call produced no reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// WAAPI answered with an ERROR. The session is still usable.
    Remote(String),
    /// The session itself failed (deadline, transport loss). It is unusable.
    Session(SearchError),
}

impl CallError {
    /// Collapse into the crate error, treating remote errors as call failures.
    pub fn into_search_error(self) -> SearchError {
        match self {
            Self::Remote(detail) => SearchError::BackendCallFailed(detail),
            Self::Session(err) => err,
        }
    }
}

/// Opens sessions against a WAAPI endpoint.
pub struct SessionClient<C> {
    connector: C,
    timeout: Duration,
}

impl<C: Connector> SessionClient<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the handshake / response deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connect and complete the WAMP handshake before the deadline.
    ///
    /// # Errors
    ///
    /// [`SearchError::Timeout`] if the deadline fires first (the transport,
    /// if any, is closed), [`SearchError::Unreachable`] if the endpoint
    /// cannot be reached, [`SearchError::ConnectionClosed`] for a router
    /// ABORT or any other transport loss.
    pub async fn open(&self, endpoint: &Endpoint) -> Result<Session<C::Transport>, SearchError> {
        let url = endpoint.url()?;
        let deadline = Instant::now() + self.timeout;
        tracing::debug!(%url, realm = REALM, protocol = SUBPROTOCOL, "WAAPI session connecting");

        let transport = match timeout_at(deadline, self.connector.connect(&url)).await {
            Ok(Ok(transport)) => transport,
            Ok(Err(reason)) => return Err(close_error(reason)),
            Err(_) => return Err(timeout_error(self.timeout)),
        };

        let mut session = Session {
            url,
            transport: Some(transport),
            state: SessionState::Connecting,
            deadline,
            timeout: self.timeout,
            session_id: None,
            next_request: 1,
        };

        let result = match timeout_at(deadline, session.handshake()).await {
            Ok(result) => result,
            Err(_) => Err(timeout_error(self.timeout)),
        };

        match result {
            Ok(()) => {
                session.state = SessionState::Open;
                tracing::debug!(session = ?session.session_id, "WAAPI session open");
                Ok(session)
            }
            Err(err) => {
                session.fail(err.clone());
                session.close().await;
                Err(err)
            }
        }
    }

    /// Connectivity test: one `ak.wwise.core.getInfo` call.
    pub async fn probe(&self, endpoint: &Endpoint) -> Result<ServerInfo, SearchError> {
        let mut session = self.open(endpoint).await?;
        let outcome = session
            .call(GET_INFO, Vec::new(), Map::new(), Map::new())
            .await;
        session.close().await;

        let reply = outcome.map_err(CallError::into_search_error)?;
        Ok(ServerInfo::from_kwargs(&reply.kwargs))
    }
}

impl<C: Connector + Default> Default for SessionClient<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

/// An open WAAPI session. See the module docs for the lifecycle.
pub struct Session<T: Transport> {
    url: Url,
    transport: Option<T>,
    state: SessionState,
    deadline: Instant,
    timeout: Duration,
    session_id: Option<u64>,
    next_request: u64,
}

impl<T: Transport> Session<T> {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// When the handshake deadline expired (or would have).
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Issue one call and wait for its reply, bounded by the deadline.
    ///
    /// Calls must not overlap; `&mut self` enforces that.
    pub async fn call(
        &mut self,
        procedure: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
        options: Map<String, Value>,
    ) -> Result<CallReply, CallError> {
        if self.state != SessionState::Open {
            return Err(CallError::Session(SearchError::ConnectionClosed(
                "session is not open".into(),
            )));
        }

        let request = self.next_request;
        self.next_request += 1;
        let message = WampMessage::Call {
            request,
            options,
            procedure: procedure.to_owned(),
            args,
            kwargs,
        };

        let deadline = Instant::now() + self.timeout;
        let outcome = match timeout_at(deadline, self.exchange(request, message)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CallError::Session(timeout_error(self.timeout))),
        };

        if let Err(CallError::Session(err)) = &outcome {
            self.fail(err.clone());
        }
        outcome
    }

    /// Close the session. Safe to call repeatedly; only the first call
    /// touches the transport.
    pub async fn close(&mut self) {
        let Some(mut transport) = self.transport.take() else {
            return;
        };
        if self.state == SessionState::Open {
            // Best effort: routers drop the session with the socket anyway.
            if let Err(reason) = transport.send(WampMessage::goodbye().to_frame()).await {
                tracing::debug!(reason = reason.token(), "GOODBYE not sent");
            }
        }
        transport.close().await;
        if !matches!(self.state, SessionState::Failed(_)) {
            self.state = SessionState::Closed;
        }
        tracing::debug!(state = ?self.state, "WAAPI session closed");
    }

    fn fail(&mut self, err: SearchError) {
        tracing::debug!(error = %err, "WAAPI session failed");
        self.state = SessionState::Failed(err);
    }

    async fn handshake(&mut self) -> Result<(), SearchError> {
        self.send(WampMessage::hello(REALM)).await?;
        loop {
            match self.next_message().await? {
                WampMessage::Welcome { session, .. } => {
                    self.session_id = Some(session);
                    return Ok(());
                }
                WampMessage::Abort { reason, .. } => {
                    return Err(SearchError::ConnectionClosed(reason));
                }
                WampMessage::Goodbye { reason, .. } => {
                    return Err(SearchError::ConnectionClosed(reason));
                }
                other => tracing::trace!(message = ?other, "ignoring message during handshake"),
            }
        }
    }

    async fn exchange(&mut self, request: u64, message: WampMessage) -> Result<CallReply, CallError> {
        self.send(message).await.map_err(CallError::Session)?;
        loop {
            let message = self.next_message().await.map_err(CallError::Session)?;
            let is_call_error = message.is_call_error();
            match message {
                WampMessage::Result {
                    request: id,
                    args,
                    kwargs,
                    ..
                } if id == request => return Ok(CallReply { args, kwargs }),
                WampMessage::Error {
                    request: id,
                    error,
                    args,
                    kwargs,
                    ..
                } if id == request && is_call_error => {
                    return Err(CallError::Remote(error_detail(&error, &args, &kwargs)));
                }
                WampMessage::Goodbye { reason, .. } | WampMessage::Abort { reason, .. } => {
                    return Err(CallError::Session(SearchError::ConnectionClosed(reason)));
                }
                other => tracing::trace!(message = ?other, request, "ignoring unrelated message"),
            }
        }
    }

    async fn send(&mut self, message: WampMessage) -> Result<(), SearchError> {
        let transport = self.transport_mut()?;
        transport.send(message.to_frame()).await.map_err(close_error)
    }

    /// Next decodable message; unsupported or garbled frames are skipped.
    async fn next_message(&mut self) -> Result<WampMessage, SearchError> {
        loop {
            let frame = self.transport_mut()?.recv().await.map_err(close_error)?;
            match WampMessage::from_frame(&frame) {
                Ok(message) => return Ok(message),
                Err(ProtocolError::Unsupported(code)) => {
                    tracing::trace!(code, "skipping unsupported WAMP message");
                }
                Err(e) => tracing::debug!(error = %e, "skipping undecodable frame"),
            }
        }
    }

    fn transport_mut(&mut self) -> Result<&mut T, SearchError> {
        self.transport
            .as_mut()
            .ok_or_else(|| SearchError::ConnectionClosed("session already closed".into()))
    }
}

/// Whole seconds, rounded up so a sub-second deadline never reports zero.
fn timeout_error(timeout: Duration) -> SearchError {
    let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
    SearchError::Timeout(secs.max(1))
}

/// A close observed while an operation was still pending.
fn close_error(reason: CloseReason) -> SearchError {
    classify_close(reason)
        .unwrap_or_else(|| SearchError::ConnectionClosed("closed".to_owned()))
}

fn error_detail(error: &str, args: &[Value], kwargs: &Map<String, Value>) -> String {
    let message = kwargs
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| args.first().and_then(Value::as_str));
    match message {
        Some(message) => format!("{error}: {message}"),
        None => error.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replies queued per inbound frame; `None` means "never answer".
    #[derive(Clone, Default)]
    struct Script {
        replies: Arc<Mutex<VecDeque<Option<Vec<String>>>>>,
        sent: Arc<Mutex<Vec<String>>>,
        closes: Arc<AtomicUsize>,
    }

    impl Script {
        fn answer(self, frames: &[&str]) -> Self {
            if let Ok(mut replies) = self.replies.lock() {
                replies.push_back(Some(frames.iter().map(|f| (*f).to_owned()).collect()));
            }
            self
        }

        fn silence(self) -> Self {
            if let Ok(mut replies) = self.replies.lock() {
                replies.push_back(None);
            }
            self
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().map(|s| s.clone()).unwrap_or_default()
        }

        fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }
    }

    struct ScriptedTransport {
        script: Script,
        inbox: VecDeque<String>,
    }

    impl Transport for ScriptedTransport {
        async fn send(&mut self, frame: String) -> Result<(), CloseReason> {
            let is_goodbye = frame.starts_with("[6,");
            if let Ok(mut sent) = self.script.sent.lock() {
                sent.push(frame);
            }
            if is_goodbye {
                return Ok(());
            }
            let next = self.script.replies.lock().ok().and_then(|mut r| r.pop_front());
            if let Some(Some(frames)) = next {
                self.inbox.extend(frames);
            }
            Ok(())
        }

        async fn recv(&mut self) -> Result<String, CloseReason> {
            match self.inbox.pop_front() {
                Some(frame) => Ok(frame),
                None => std::future::pending().await,
            }
        }

        async fn close(&mut self) {
            self.script.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct ScriptedConnector {
        script: Script,
        refuse: Option<CloseReason>,
    }

    impl Connector for ScriptedConnector {
        type Transport = ScriptedTransport;

        async fn connect(&self, _url: &Url) -> Result<ScriptedTransport, CloseReason> {
            if let Some(reason) = &self.refuse {
                return Err(reason.clone());
            }
            Ok(ScriptedTransport {
                script: self.script.clone(),
                inbox: VecDeque::new(),
            })
        }
    }

    fn client(script: &Script) -> SessionClient<ScriptedConnector> {
        SessionClient::new(ScriptedConnector {
            script: script.clone(),
            refuse: None,
        })
    }

    fn endpoint() -> Endpoint {
        Endpoint::new("127.0.0.1", 8080)
    }

    const WELCOME: &str = r#"[2, 1, {}]"#;

    #[test]
    fn endpoint_url_format() {
        let url = endpoint().url().expect("url");
        assert_eq!(url.as_str(), "ws://127.0.0.1:8080/waapi");
    }

    #[test]
    fn endpoint_brackets_ipv6_hosts() {
        let url = Endpoint::new("::1", 8080).url().expect("url");
        assert_eq!(url.as_str(), "ws://[::1]:8080/waapi");
        let url = Endpoint::new("[fe80::1]", 8095).url().expect("url");
        assert_eq!(url.as_str(), "ws://[fe80::1]:8095/waapi");
    }

    #[test]
    fn timeout_seconds_round_up() {
        assert_eq!(timeout_error(Duration::from_millis(250)), SearchError::Timeout(1));
        assert_eq!(timeout_error(Duration::from_millis(1500)), SearchError::Timeout(2));
        assert_eq!(timeout_error(Duration::from_secs(10)), SearchError::Timeout(10));
    }

    #[tokio::test(start_paused = true)]
    async fn sub_second_deadline_reports_one_second() {
        let script = Script::default().silence();
        let result = client(&script)
            .with_timeout(Duration::from_millis(200))
            .open(&endpoint())
            .await;
        assert!(matches!(result, Err(SearchError::Timeout(1))));
    }

    #[test]
    fn endpoint_rejects_garbage_host() {
        assert!(Endpoint::new("bad host", 1).url().is_err());
    }

    #[tokio::test]
    async fn open_sends_hello_and_reaches_open() {
        let script = Script::default().answer(&[WELCOME]);
        let mut session = client(&script).open(&endpoint()).await.expect("open");
        assert_eq!(session.state(), &SessionState::Open);
        assert!(script.sent()[0].starts_with(r#"[1,"realm1""#));

        session.close().await;
        assert_eq!(session.state(), &SessionState::Closed);
        assert!(session.state().is_terminal());
        assert!(script.sent().iter().any(|f| f.starts_with("[6,")));
        assert_eq!(script.closes(), 1);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let script = Script::default().answer(&[WELCOME]);
        let mut session = client(&script).open(&endpoint()).await.expect("open");
        session.close().await;
        session.close().await;
        assert_eq!(script.closes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_handshake_times_out_and_closes_once() {
        let script = Script::default().silence();
        let result = client(&script).open(&endpoint()).await;
        assert!(matches!(result, Err(SearchError::Timeout(10))));
        assert_eq!(script.closes(), 1);
    }

    #[tokio::test]
    async fn unreachable_connect_is_classified() {
        let client = SessionClient::new(ScriptedConnector {
            script: Script::default(),
            refuse: Some(CloseReason::Unreachable("connection refused".into())),
        });
        let result = client.open(&endpoint()).await;
        assert!(matches!(result, Err(SearchError::Unreachable(_))));
    }

    #[tokio::test]
    async fn abort_during_handshake_is_connection_closed() {
        let script = Script::default().answer(&[r#"[3, {}, "wamp.error.no_such_realm"]"#]);
        let result = client(&script).open(&endpoint()).await;
        assert_eq!(
            result.err(),
            Some(SearchError::ConnectionClosed("wamp.error.no_such_realm".into()))
        );
        assert_eq!(script.closes(), 1);
    }

    #[tokio::test]
    async fn call_matches_reply_by_request_id() {
        let script = Script::default().answer(&[WELCOME]).answer(&[
            r#"[50, 99, {}, [], {"stale": true}]"#,
            r#"[50, 1, {}, [], {"displayName": "Wwise"}]"#,
        ]);
        let mut session = client(&script).open(&endpoint()).await.expect("open");
        let reply = session
            .call(GET_INFO, vec![], Map::new(), Map::new())
            .await
            .expect("reply");
        assert_eq!(reply.kwargs.get("displayName"), Some(&json!("Wwise")));
        session.close().await;
    }

    #[tokio::test]
    async fn remote_error_keeps_session_open() {
        let script = Script::default()
            .answer(&[WELCOME])
            .answer(&[r#"[8, 48, 1, {}, "ak.wwise.query.invalid", [], {"message": "bad"}]"#])
            .answer(&[r#"[50, 2, {}]"#]);
        let mut session = client(&script).open(&endpoint()).await.expect("open");

        let first = session.call(OBJECT_GET, vec![], Map::new(), Map::new()).await;
        assert_eq!(first, Err(CallError::Remote("ak.wwise.query.invalid: bad".into())));
        assert_eq!(session.state(), &SessionState::Open);

        let second = session.call(OBJECT_GET, vec![], Map::new(), Map::new()).await;
        assert!(second.is_ok());
        session.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn silent_call_times_out_and_fails_session() {
        let script = Script::default().answer(&[WELCOME]).silence();
        let mut session = client(&script).open(&endpoint()).await.expect("open");
        let result = session.call(GET_INFO, vec![], Map::new(), Map::new()).await;
        assert_eq!(result, Err(CallError::Session(SearchError::Timeout(10))));
        assert!(matches!(session.state(), SessionState::Failed(_)));

        let after = session.call(GET_INFO, vec![], Map::new(), Map::new()).await;
        assert!(matches!(after, Err(CallError::Session(_))));

        session.close().await;
        assert!(matches!(session.state(), SessionState::Failed(_)));
        assert_eq!(script.closes(), 1);
        // No GOODBYE on a failed session.
        assert!(!script.sent().iter().any(|f| f.starts_with("[6,")));
    }

    #[tokio::test]
    async fn probe_reports_server_info_and_closes() {
        let script = Script::default().answer(&[WELCOME]).answer(&[
            r#"[50, 1, {}, [], {"displayName": "Wwise", "version": {"displayName": "v2024.1.0"}, "platform": {"basePlatform": "Windows"}}]"#,
        ]);
        let info = client(&script).probe(&endpoint()).await.expect("probe");
        assert_eq!(info.version, "v2024.1.0");
        assert_eq!(info.platform, "Windows");
        assert_eq!(script.closes(), 1);
    }

    #[tokio::test]
    async fn probe_remote_error_is_call_failure() {
        let script = Script::default()
            .answer(&[WELCOME])
            .answer(&[r#"[8, 48, 1, {}, "wamp.error.no_such_procedure"]"#]);
        let result = client(&script).probe(&endpoint()).await;
        assert_eq!(
            result,
            Err(SearchError::BackendCallFailed("wamp.error.no_such_procedure".into()))
        );
        assert_eq!(script.closes(), 1);
    }

    #[test]
    fn error_detail_prefers_kwargs_message() {
        let mut kwargs = Map::new();
        kwargs.insert("message".into(), json!("no object"));
        assert_eq!(error_detail("uri", &[json!("arg")], &kwargs), "uri: no object");
        assert_eq!(error_detail("uri", &[json!("arg")], &Map::new()), "uri: arg");
        assert_eq!(error_detail("uri", &[], &Map::new()), "uri");
    }
}

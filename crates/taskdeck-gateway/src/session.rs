//! Session bookkeeping for the streaming transport
//!
//! The session store is the only shared mutable structure in the gateway:
//! inserts at stream-open, removals at stream-close, lookups per follow-up
//! message. It is owned by the server and passed through axum state, never
//! reachable as a global.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::protocol::{ProtocolServer, RpcResponse};

/// Buffered responses per open stream before message POSTs start awaiting.
const SESSION_CHANNEL_CAPACITY: usize = 32;

/// One open streaming connection.
///
/// Holds the outbound half of the stream and the protocol server that
/// answers this session's follow-up messages. Components that look a
/// session up keep the handle only for the duration of a single message.
pub struct Session {
    id: String,
    outbound: mpsc::Sender<RpcResponse>,
    server: ProtocolServer,
    opened_at: DateTime<Utc>,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn server(&self) -> &ProtocolServer {
        &self.server
    }

    /// Deliver a response envelope onto the open stream.
    ///
    /// If the stream closed while the dispatch was in flight, the result is
    /// discarded; the caller has nowhere left to hear it.
    pub async fn send(&self, response: RpcResponse) {
        if self.outbound.send(response).await.is_err() {
            debug!(
                session_id = %self.id,
                "[Session] Stream closed, discarding in-flight response"
            );
        }
    }
}

/// In-memory registry of open sessions, keyed by session id.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session around a fresh protocol server.
    ///
    /// Returns the registered session and the receiving half of its stream
    /// channel; the caller owns the receiver for the life of the stream.
    pub fn open(&self, server: ProtocolServer) -> (Arc<Session>, mpsc::Receiver<RpcResponse>) {
        let (outbound, rx) = mpsc::channel(SESSION_CHANNEL_CAPACITY);
        let session = Arc::new(Session {
            id: Uuid::new_v4().to_string(),
            outbound,
            server,
            opened_at: Utc::now(),
        });

        info!(session_id = %session.id, "[Session] Opened");
        self.sessions.insert(session.id.clone(), session.clone());
        (session, rx)
    }

    /// Look up a session for one follow-up message.
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Remove a session; called from the stream's drop guard on every exit
    /// path.
    pub fn remove(&self, id: &str) {
        if let Some((_, session)) = self.sessions.remove(id) {
            let duration = (Utc::now() - session.opened_at).num_seconds();
            info!(
                session_id = %id,
                duration_s = duration,
                "[Session] Closed"
            );
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Removes its session from the store when dropped.
///
/// Held inside the SSE stream body so that client disconnects, server
/// shutdown, and stream errors all release the session entry.
pub struct SessionGuard {
    store: Arc<SessionStore>,
    id: String,
}

impl SessionGuard {
    pub fn new(store: Arc<SessionStore>, id: String) -> Self {
        Self { store, id }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.store.remove(&self.id);
    }
}

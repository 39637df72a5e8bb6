//! Session-level request/response correlation, shared by client and server roles.
//!
//! Both ends of an MCP connection can originate requests: a client calls
//! `tools/call`, but a server handling that call may in turn need to issue its
//! own `sampling/createMessage` or `elicitation/create` request back to the
//! client and await a correlated reply on the very same transport. `SessionCore`
//! is the role-agnostic bookkeeping for that: it tracks requests this endpoint
//! has sent and is waiting on, and the cancellation scopes for requests this
//! endpoint is currently servicing on behalf of the peer.

pub mod dispatch;

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, RwLock};
use tokio_util::sync::CancellationToken;

use crate::error::{MCPError, MCPResult};
use crate::protocol::jsonrpc::RequestId;

/// An outbound request this session sent and is waiting to hear back about.
struct Outstanding {
    reply: oneshot::Sender<MCPResult<serde_json::Value>>,
    cancel: CancellationToken,
}

/// Handed back to the caller that registered an outbound request. Resolves once
/// a correlated response arrives, the request times out, or it is cancelled.
pub struct PendingReply {
    id: RequestId,
    receiver: oneshot::Receiver<MCPResult<serde_json::Value>>,
    cancel: CancellationToken,
}

impl PendingReply {
    /// The request id this reply is correlated to.
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Wait for the correlated reply, a cancellation, or the given timeout,
    /// whichever comes first.
    pub async fn wait(self, timeout: Duration) -> MCPResult<serde_json::Value> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(MCPError::Protocol(
                crate::error::ProtocolError::RequestCancelled(self.id.to_string()),
            )),
            outcome = tokio::time::timeout(timeout, self.receiver) => match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => Err(MCPError::internal_error(
                    "request sender dropped before a reply arrived".to_string(),
                )),
                Err(_) => Err(MCPError::request_timeout()),
            },
        }
    }
}

/// Role-agnostic request table: shared between `UltraFastClient` and
/// `UltraFastServer` so both can originate requests and correlate replies on
/// the same session abstraction.
#[derive(Clone)]
pub struct SessionCore {
    next_id: Arc<AtomicI64>,
    outstanding: Arc<RwLock<HashMap<RequestId, Outstanding>>>,
    inbound_scopes: Arc<RwLock<HashMap<RequestId, CancellationToken>>>,
    progress_tokens: Arc<RwLock<HashMap<RequestId, serde_json::Value>>>,
    default_timeout: Duration,
}

impl SessionCore {
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            next_id: Arc::new(AtomicI64::new(1)),
            outstanding: Arc::new(RwLock::new(HashMap::new())),
            inbound_scopes: Arc::new(RwLock::new(HashMap::new())),
            progress_tokens: Arc::new(RwLock::new(HashMap::new())),
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Allocate a request id unique within this session.
    pub fn next_request_id(&self) -> RequestId {
        RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register an outbound request before sending it on the transport. The
    /// returned `PendingReply` must be awaited to receive the correlated
    /// response (or have `cancel_outbound`/`complete` invoked against `id`).
    pub async fn register_outbound(&self, id: RequestId) -> PendingReply {
        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        self.outstanding.write().await.insert(
            id.clone(),
            Outstanding {
                reply: tx,
                cancel: cancel.clone(),
            },
        );
        PendingReply {
            id,
            receiver: rx,
            cancel,
        }
    }

    /// Complete an outstanding outbound request with a result or protocol
    /// error, waking whichever caller is waiting in `PendingReply::wait`.
    /// Returns `false` if no request with this id is outstanding (a late or
    /// duplicate reply, which callers should log and ignore).
    pub async fn complete(&self, id: &RequestId, result: MCPResult<serde_json::Value>) -> bool {
        if let Some(outstanding) = self.outstanding.write().await.remove(id) {
            let _ = outstanding.reply.send(result);
            true
        } else {
            false
        }
    }

    /// Cancel an outbound request this session is waiting on, e.g. because the
    /// peer closed the connection before replying.
    pub async fn cancel_outbound(&self, id: &RequestId) {
        if let Some(outstanding) = self.outstanding.write().await.remove(id) {
            outstanding.cancel.cancel();
        }
    }

    /// Number of outbound requests still awaiting a reply.
    pub async fn outstanding_count(&self) -> usize {
        self.outstanding.read().await.len()
    }

    /// Begin servicing an inbound request, returning a token the handler can
    /// poll/select on to notice a `notifications/cancelled` for this id.
    pub async fn begin_inbound(&self, id: RequestId) -> CancellationToken {
        let token = CancellationToken::new();
        self.inbound_scopes.write().await.insert(id, token.clone());
        token
    }

    /// Signal cancellation of an in-flight inbound request. No-op if the
    /// request has already completed or was never tracked.
    pub async fn cancel_inbound(&self, id: &RequestId) -> bool {
        if let Some(token) = self.inbound_scopes.read().await.get(id) {
            token.cancel();
            true
        } else {
            false
        }
    }

    /// Stop tracking an inbound request's cancellation scope once its handler
    /// has returned a reply. Also drops any bound progress token, so progress
    /// notifications for this request cannot outlive it.
    pub async fn end_inbound(&self, id: &RequestId) {
        self.inbound_scopes.write().await.remove(id);
        self.progress_tokens.write().await.remove(id);
    }

    /// Record the `_meta.progressToken` of an inbound request, for the
    /// lifetime of its cancellation scope. `notifications/progress` raised by
    /// the handler servicing this request should carry this token.
    pub async fn bind_progress_token(&self, id: RequestId, token: serde_json::Value) {
        self.progress_tokens.write().await.insert(id, token);
    }

    /// The progress token bound to an inbound request, if any. Returns `None`
    /// once the request's scope has ended via `end_inbound`.
    pub async fn progress_token(&self, id: &RequestId) -> Option<serde_json::Value> {
        self.progress_tokens.read().await.get(id).cloned()
    }

    /// Whether the inbound request's cancellation scope is still open, i.e.
    /// whether `begin_inbound` was called and `end_inbound`/cancellation has
    /// not yet ended it.
    pub async fn is_inbound_cancelled(&self, id: &RequestId) -> bool {
        match self.inbound_scopes.read().await.get(id) {
            Some(token) => token.is_cancelled(),
            None => false,
        }
    }
}

impl Default for SessionCore {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

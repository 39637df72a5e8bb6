//! Cross-crate harness pairing a [`MockTransport`] with `ultrafast-mcp-core`'s
//! [`SessionCore`]/[`HandlerRegistry`], for integration tests that exercise
//! request/response correlation and dispatch without a real transport.

use std::time::Duration;

use ultrafast_mcp_core::error::MCPResult;
use ultrafast_mcp_core::protocol::jsonrpc::{JsonRpcMessage, JsonRpcRequest, RequestId};
use ultrafast_mcp_core::session::dispatch::{DispatchOutcome, HandlerRegistry};
use ultrafast_mcp_core::{PendingReply, SessionCore};

use crate::mocks::MockTransport;

/// Drives one `SessionCore` against a `MockTransport`'s receive queue,
/// routing inbound requests through a `HandlerRegistry` and inbound
/// responses through the session's outstanding-request table. Intended for
/// tests that want real correlation/dispatch behavior without a live
/// transport.
pub struct SessionHarness {
    pub session: SessionCore,
    pub registry: HandlerRegistry,
    pub transport: MockTransport,
}

impl SessionHarness {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            session: SessionCore::new(Duration::from_secs(5)),
            registry,
            transport: MockTransport::new(),
        }
    }

    /// Send a request through the session, recording it on the mock
    /// transport, then await the reply once the test feeds a matching
    /// response into `complete_from_queue`.
    pub async fn send_request(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> (RequestId, PendingReply) {
        let id = self.session.next_request_id();
        let pending = self.session.register_outbound(id.clone()).await;
        let request = JsonRpcRequest::new(method.to_string(), params, Some(id.clone()));
        self.transport
            .sent_messages
            .lock()
            .unwrap()
            .push(JsonRpcMessage::Request(request));
        (id, pending)
    }

    /// Pop every message queued on the mock transport's receive side and run
    /// it through dispatch (requests/notifications) or session completion
    /// (responses/errors), as the real inbound loop would.
    pub async fn drain_inbound(&self) {
        loop {
            let next = self.transport.receive_queue.lock().unwrap().pop_front();
            let Some(message) = next else { break };
            match message {
                JsonRpcMessage::Request(request) => {
                    let cancellation = if let Some(id) = request.id.clone() {
                        Some(self.session.begin_inbound(id).await)
                    } else {
                        None
                    };
                    let id = request.id.clone();
                    let outcome = self.registry.dispatch(request, cancellation).await;
                    if let Some(id) = id {
                        self.session.end_inbound(&id).await;
                    }
                    if let DispatchOutcome::Reply(response) = outcome {
                        self.transport
                            .sent_messages
                            .lock()
                            .unwrap()
                            .push(JsonRpcMessage::from_response(response));
                    }
                }
                JsonRpcMessage::Notification(notification) => {
                    let _ = self.registry.dispatch(notification, None).await;
                }
                JsonRpcMessage::Response(response) => {
                    if let Some(id) = response.id.clone() {
                        let result: MCPResult<serde_json::Value> = match response.error {
                            Some(error) => Err(error.into()),
                            None => Ok(response.result.unwrap_or(serde_json::Value::Null)),
                        };
                        self.session.complete(&id, result).await;
                    }
                }
                JsonRpcMessage::Error(error_message) => {
                    if let Some(id) = error_message.id.clone() {
                        self.session
                            .complete(&id, Err(error_message.error.into()))
                            .await;
                    }
                }
            }
        }
    }
}

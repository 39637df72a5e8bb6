//! Request dispatch: maps JSON-RPC method names to typed handlers, decodes
//! params, invokes the handler, and maps the outcome back to a JSON-RPC
//! response per the protocol's rules — a declared protocol error becomes a
//! `JsonRpcError` with its own code, an uncaught handler panic is never let
//! through (callers wrap handlers so this never happens), a notification
//! never produces a reply, and a cancelled request's reply is suppressed
//! rather than sent late.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::MCPError;
use crate::protocol::jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Outcome of dispatching a single request to its handler.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A reply to send back to the caller.
    Reply(JsonRpcResponse),
    /// The incoming message was a notification; nothing is sent back.
    NoReply,
    /// The request was cancelled before its handler finished; per the
    /// protocol no reply is sent at all (the cancellation itself was already
    /// acknowledged out of band).
    Suppressed,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type-erased handler: takes the raw params and returns a raw JSON result or
/// an `MCPError` describing why it couldn't.
type ErasedHandler =
    Arc<dyn for<'a> Fn(Option<Value>) -> BoxFuture<'a, Result<Value, MCPError>> + Send + Sync>;

/// A table of method name -> typed handler, used to dispatch incoming
/// JSON-RPC requests without a hand-written match arm per method.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    entries: HashMap<String, ErasedHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed handler for `method`. `Req`/`Resp` are decoded and
    /// encoded via `serde`; the handler itself never touches raw
    /// `serde_json::Value`.
    pub fn register<Req, Resp, F, Fut>(&mut self, method: impl Into<String>, handler: F)
    where
        Req: DeserializeOwned + Send + 'static,
        Resp: Serialize + Send + 'static,
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, MCPError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |params| {
            let handler = handler.clone();
            Box::pin(async move {
                let value = params.unwrap_or(Value::Null);
                let req: Req = serde_json::from_value(value)
                    .map_err(|e| MCPError::invalid_params(format!("invalid params: {e}")))?;
                let resp = handler(req).await?;
                serde_json::to_value(resp)
                    .map_err(|e| MCPError::serialization_error(e.to_string()))
            })
        });
        self.entries.insert(method.into(), erased);
    }

    pub fn contains(&self, method: &str) -> bool {
        self.entries.contains_key(method)
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Dispatch a single incoming request or notification through the
    /// registry. `cancellation`, when given, is raced against the handler so
    /// an in-flight `notifications/cancelled` can suppress the reply.
    pub async fn dispatch(
        &self,
        request: JsonRpcRequest,
        cancellation: Option<CancellationToken>,
    ) -> DispatchOutcome {
        let is_notification = request.id.is_none();

        let Some(handler) = self.entries.get(&request.method).cloned() else {
            if is_notification {
                return DispatchOutcome::NoReply;
            }
            let err = JsonRpcError::method_not_found(request.method.clone());
            return DispatchOutcome::Reply(JsonRpcResponse::error(err, request.id));
        };

        let outcome_fut = handler(request.params.clone());
        let outcome = match cancellation {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return DispatchOutcome::Suppressed,
                    result = outcome_fut => result,
                }
            }
            None => outcome_fut.await,
        };

        if is_notification {
            return DispatchOutcome::NoReply;
        }

        match outcome {
            Ok(value) => DispatchOutcome::Reply(JsonRpcResponse::success(value, request.id)),
            Err(err) => {
                let json_err: JsonRpcError = err.into();
                DispatchOutcome::Reply(JsonRpcResponse::error(json_err, request.id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::jsonrpc::RequestId;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct EchoParams {
        value: String,
    }

    #[derive(Serialize)]
    struct EchoResult {
        value: String,
    }

    fn echo_registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", |params: EchoParams| async move {
            Ok(EchoResult {
                value: params.value,
            })
        });
        registry
    }

    #[tokio::test]
    async fn dispatches_to_registered_handler() {
        let registry = echo_registry();
        let request = JsonRpcRequest::new(
            "echo".to_string(),
            Some(json!({ "value": "hi" })),
            Some(RequestId::string("1")),
        );

        match registry.dispatch(request, None).await {
            DispatchOutcome::Reply(response) => {
                assert_eq!(response.result, Some(json!({ "value": "hi" })));
            }
            other => panic!("expected a reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_method_returns_method_not_found() {
        let registry = echo_registry();
        let request = JsonRpcRequest::new(
            "does/not-exist".to_string(),
            None,
            Some(RequestId::string("1")),
        );

        match registry.dispatch(request, None).await {
            DispatchOutcome::Reply(response) => {
                let err = response.error.expect("expected an error response");
                assert_eq!(
                    err.code,
                    crate::error::error_codes::METHOD_NOT_FOUND
                );
            }
            other => panic!("expected a reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_params_maps_to_invalid_params_code() {
        let registry = echo_registry();
        let request = JsonRpcRequest::new(
            "echo".to_string(),
            Some(json!({ "wrong_field": 1 })),
            Some(RequestId::string("1")),
        );

        match registry.dispatch(request, None).await {
            DispatchOutcome::Reply(response) => {
                let err = response.error.expect("expected an error response");
                assert_eq!(err.code, crate::error::error_codes::INVALID_PARAMS);
            }
            other => panic!("expected a reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn notification_never_replies() {
        let registry = echo_registry();
        let request = JsonRpcRequest::notification(
            "echo".to_string(),
            Some(json!({ "value": "hi" })),
        );

        assert!(matches!(
            registry.dispatch(request, None).await,
            DispatchOutcome::NoReply
        ));
    }

    #[tokio::test]
    async fn cancellation_suppresses_the_reply() {
        let mut registry = HandlerRegistry::new();
        registry.register("slow", |_params: EchoParams| async move {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(EchoResult {
                value: "too late".to_string(),
            })
        });

        let request = JsonRpcRequest::new(
            "slow".to_string(),
            Some(json!({ "value": "hi" })),
            Some(RequestId::string("1")),
        );
        let token = CancellationToken::new();
        token.cancel();

        assert!(matches!(
            registry.dispatch(request, Some(token)).await,
            DispatchOutcome::Suppressed
        ));
    }
}

//! Minimal DevTools protocol client.
//!
//! JSON-RPC over a WebSocket: one in-flight command at a time, responses
//! correlated by id, protocol events discarded. That is all the login flow
//! needs; this is not a general CDP driver.

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::trace;

use crate::error::LoginError;

pub struct CdpClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl CdpClient {
    /// Connect to a page target's WebSocket debugger URL.
    pub async fn connect(url: &str) -> Result<Self, LoginError> {
        let (ws, _) = connect_async(url)
            .await
            .map_err(|e| LoginError::DevToolsUnreachable(e.to_string()))?;
        Ok(Self { ws, next_id: 0 })
    }

    /// Issue one CDP command and wait for its response.
    pub async fn call(&mut self, method: &str, params: Value) -> Result<Value, LoginError> {
        self.next_id += 1;
        let id = self.next_id;
        let request = json!({ "id": id, "method": method, "params": params });
        trace!("cdp -> {}", method);
        self.ws
            .send(Message::Text(request.to_string().into()))
            .await
            .map_err(|e| LoginError::Protocol(e.to_string()))?;

        while let Some(frame) = self.ws.next().await {
            let frame = frame.map_err(|e| LoginError::Protocol(e.to_string()))?;
            let Message::Text(text) = frame else { continue };
            let message: Value = serde_json::from_str(&text)
                .map_err(|e| LoginError::Protocol(e.to_string()))?;
            // Events carry a method and no id; skip them.
            if message.get("id").and_then(Value::as_u64) != Some(id) {
                continue;
            }
            if let Some(error) = message.get("error") {
                return Err(LoginError::Protocol(format!("{}: {}", method, error)));
            }
            return Ok(message.get("result").cloned().unwrap_or(Value::Null));
        }
        Err(LoginError::Protocol(format!(
            "connection closed while waiting for {} response",
            method
        )))
    }

    /// Evaluate a JavaScript expression in the page and return its value.
    pub async fn evaluate(&mut self, expression: &str) -> Result<Value, LoginError> {
        let result = self
            .call(
                "Runtime.evaluate",
                json!({ "expression": expression, "returnByValue": true }),
            )
            .await?;
        if let Some(exception) = result.get("exceptionDetails") {
            return Err(LoginError::FormInteraction(exception.to_string()));
        }
        Ok(result
            .pointer("/result/value")
            .cloned()
            .unwrap_or(Value::Null))
    }
}

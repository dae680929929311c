//! Low-level CDP client over a page's debugger WebSocket.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{SinkExt as _, StreamExt as _};
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::AutomationError;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>;

/// Sends CDP commands and routes responses back by request id.
pub struct CdpClient {
    ws_tx: mpsc::Sender<String>,
    pending: PendingMap,
    next_id: AtomicU64,
    closed: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl std::fmt::Debug for CdpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CdpClient").field("closed", &self.is_closed()).finish_non_exhaustive()
    }
}

impl CdpClient {
    /// Connects to a page's `webSocketDebuggerUrl`.
    ///
    /// # Errors
    /// Returns `AutomationError::Connection` if the handshake fails.
    pub async fn connect(ws_url: &str) -> Result<Self, AutomationError> {
        let (ws_stream, _) = connect_async(ws_url).await.map_err(|e| {
            AutomationError::Connection(format!("failed to connect to {ws_url}: {e}"))
        })?;
        let (mut ws_sink, mut ws_read) = ws_stream.split();

        let (ws_tx, mut ws_rx) = mpsc::channel::<String>(256);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let writer_closed = Arc::clone(&closed);
        let writer = tokio::spawn(async move {
            while let Some(msg) = ws_rx.recv().await {
                if let Err(e) = ws_sink.send(Message::Text(msg)).await {
                    tracing::error!("CDP WebSocket write error: {e}");
                    break;
                }
            }
            writer_closed.store(true, Ordering::SeqCst);
        });

        let reader_pending = Arc::clone(&pending);
        let reader_closed = Arc::clone(&closed);
        let reader = tokio::spawn(async move {
            while let Some(msg) = ws_read.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        let Ok(value) = serde_json::from_str::<Value>(&text) else {
                            continue;
                        };
                        // Events carry no id and are ignored.
                        if let Some(id) = value.get("id").and_then(Value::as_u64) {
                            if let Some(tx) = reader_pending.lock().await.remove(&id) {
                                let _ = tx.send(value);
                            }
                        }
                    },
                    Ok(Message::Close(_)) => {
                        tracing::debug!("CDP WebSocket closed by peer");
                        break;
                    },
                    Err(e) => {
                        tracing::warn!("CDP WebSocket read error: {e}");
                        break;
                    },
                    Ok(_) => {},
                }
            }
            reader_closed.store(true, Ordering::SeqCst);
            // Dropping the senders wakes every waiter with a closed-channel error.
            reader_pending.lock().await.clear();
        });

        Ok(Self { ws_tx, pending, next_id: AtomicU64::new(1), closed, reader, writer })
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.ws_tx.is_closed()
    }

    /// Sends one command and waits up to 30s for its result.
    ///
    /// # Errors
    /// `Connection` when the socket is gone or the command times out,
    /// `Protocol` when the browser answers with an error object.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value, AutomationError> {
        if self.is_closed() {
            return Err(AutomationError::Connection("CDP connection closed".to_owned()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let msg = json!({ "id": id, "method": method, "params": params });

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            // The reader flags `closed` before clearing the map; under the lock
            // this either sees the flag or gets cleared afterwards.
            if self.closed.load(Ordering::SeqCst) {
                return Err(AutomationError::Connection("CDP connection closed".to_owned()));
            }
            pending.insert(id, tx);
        }

        if let Err(e) = self.ws_tx.send(msg.to_string()).await {
            self.pending.lock().await.remove(&id);
            return Err(AutomationError::Connection(format!("failed to send {method}: {e}")));
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(response)) => match response.get("error") {
                Some(error) => Err(AutomationError::Protocol(format!("{method}: {error}"))),
                None => Ok(response.get("result").cloned().unwrap_or(Value::Null)),
            },
            Ok(Err(_)) => Err(AutomationError::Connection(format!(
                "connection closed while waiting for {method}"
            ))),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(AutomationError::Connection(format!(
                    "{method} timed out after {}s",
                    COMMAND_TIMEOUT.as_secs()
                )))
            },
        }
    }

    /// Evaluates `expression` in the page and returns its JSON value.
    ///
    /// # Errors
    /// `Protocol` if the script throws, plus any [`Self::send_command`] error.
    pub async fn evaluate_js(&self, expression: &str) -> Result<Value, AutomationError> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        if let Some(details) = result.get("exceptionDetails") {
            let text = details
                .pointer("/exception/description")
                .or_else(|| details.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("script threw");
            return Err(AutomationError::Protocol(format!("script error: {text}")));
        }
        Ok(result.pointer("/result/value").cloned().unwrap_or(Value::Null))
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

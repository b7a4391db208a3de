use crate::channel::{ChannelError, RemoteChannel};
use crate::properties::{DecodeError, SceneItemProperties, SceneItemUpdate};
use async_trait::async_trait;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Websocket-backed [`RemoteChannel`] speaking the remote control envelope.
///
/// Every request carries a `request-type` and a unique `message-id`; the
/// remote echoes the `message-id` on its response together with a
/// `status` of `"ok"` or `"error"`. A reader task routes each response to
/// the waiting request by id, so requests may be issued concurrently over
/// the one session.
///
/// Reconnection and authentication are out of scope: when the session
/// drops, requests fail with [`ChannelError::Transport`] and the owner is
/// expected to build a fresh channel.
pub struct ObsChannel {
    outgoing: mpsc::UnboundedSender<Message>,
    pending: Arc<DashMap<String, oneshot::Sender<Value>>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl ObsChannel {
    /// Opens a websocket session to the remote application.
    ///
    /// Fails with [`ChannelError::Connect`] if the handshake does not
    /// complete; there is no retry.
    pub async fn connect(url: &str) -> Result<Self, ChannelError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;

        info!(url = %url, "Connected to remote control channel");

        let (mut write, mut read) = stream.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let pending: Arc<DashMap<String, oneshot::Sender<Value>>> = Arc::new(DashMap::new());

        let writer = tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                if let Err(e) = write.send(message).await {
                    error!(error = %e, "Failed to send request over websocket");
                    break;
                }
            }
        });

        let reader = {
            let pending = Arc::clone(&pending);
            tokio::spawn(async move {
                while let Some(message) = read.next().await {
                    let message = match message {
                        Ok(m) => m,
                        Err(e) => {
                            warn!(error = %e, "Websocket read failed, closing channel");
                            break;
                        }
                    };
                    if !message.is_text() {
                        continue;
                    }
                    let text = match message.into_text() {
                        Ok(t) => t,
                        Err(_) => continue,
                    };
                    let value: Value = match serde_json::from_str(&text) {
                        Ok(v) => v,
                        Err(e) => {
                            warn!(error = %e, "Ignoring malformed message from remote");
                            continue;
                        }
                    };
                    // Unsolicited event payloads carry no message-id
                    let id = match value.get("message-id").and_then(Value::as_str) {
                        Some(id) => id.to_string(),
                        None => continue,
                    };
                    match pending.remove(&id) {
                        Some((_, tx)) => {
                            let _ = tx.send(value);
                        }
                        None => {
                            debug!(message_id = %id, "Response for unknown request");
                        }
                    }
                }
                // Wake every waiter with a transport error
                pending.clear();
            })
        };

        Ok(Self {
            outgoing,
            pending,
            reader,
            writer,
        })
    }

    /// One request/response round trip.
    async fn request(&self, request_type: &str, fields: Value) -> Result<Value, ChannelError> {
        let message_id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(message_id.clone(), tx);

        let envelope = request_envelope(request_type, &message_id, fields);
        if self
            .outgoing
            .send(Message::Text(envelope.to_string()))
            .is_err()
        {
            self.pending.remove(&message_id);
            return Err(ChannelError::Transport("channel closed".to_string()));
        }

        let response = rx.await.map_err(|_| {
            ChannelError::Transport("session closed before response arrived".to_string())
        })?;
        check_status(response)
    }

    /// Tears the session down.
    ///
    /// Pending requests resolve with [`ChannelError::Transport`].
    pub fn close(&self) {
        self.reader.abort();
        self.writer.abort();
        self.pending.clear();
    }
}

impl Drop for ObsChannel {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl RemoteChannel for ObsChannel {
    async fn fetch_properties(
        &self,
        item: &str,
        scene: Option<&str>,
    ) -> Result<SceneItemProperties, ChannelError> {
        let mut fields = json!({ "item": item });
        if let Some(scene) = scene {
            fields["scene-name"] = json!(scene);
        }
        let response = self.request("GetSceneItemProperties", fields).await?;
        Ok(SceneItemProperties::decode(response)?)
    }

    async fn apply_properties(
        &self,
        item: &str,
        update: &SceneItemUpdate,
    ) -> Result<(), ChannelError> {
        let mut fields = serde_json::to_value(update)
            .map_err(|e| ChannelError::Decode(DecodeError::new(e.to_string())))?;
        fields["item"] = json!(item);
        self.request("SetSceneItemProperties", fields).await?;
        Ok(())
    }
}

/// Builds the request envelope: the caller's fields plus addressing keys.
fn request_envelope(request_type: &str, message_id: &str, fields: Value) -> Value {
    let mut envelope = match fields {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    envelope.insert("request-type".to_string(), json!(request_type));
    envelope.insert("message-id".to_string(), json!(message_id));
    Value::Object(envelope)
}

/// Maps the remote `status` field onto a result.
fn check_status(response: Value) -> Result<Value, ChannelError> {
    match response.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(response),
        Some(_) => {
            let reason = response
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unspecified remote error");
            Err(ChannelError::Remote(reason.to_string()))
        }
        None => Err(ChannelError::Decode(DecodeError::new(
            "response missing status field",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_envelope_merges_addressing_keys() {
        let envelope = request_envelope(
            "GetSceneItemProperties",
            "42",
            json!({"item": "overlay", "scene-name": "main"}),
        );

        assert_eq!(envelope["request-type"], json!("GetSceneItemProperties"));
        assert_eq!(envelope["message-id"], json!("42"));
        assert_eq!(envelope["item"], json!("overlay"));
        assert_eq!(envelope["scene-name"], json!("main"));
    }

    #[test]
    fn test_request_envelope_without_fields() {
        let envelope = request_envelope("GetVersion", "1", json!({}));

        let object = envelope.as_object().unwrap();
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn test_check_status_ok_passes_payload_through() {
        let response = json!({"message-id": "1", "status": "ok", "name": "overlay"});
        let value = check_status(response).unwrap();
        assert_eq!(value["name"], json!("overlay"));
    }

    #[test]
    fn test_check_status_error_carries_remote_reason() {
        let response = json!({"message-id": "1", "status": "error", "error": "no such item"});
        let result = check_status(response);
        assert_eq!(
            result,
            Err(ChannelError::Remote("no such item".to_string()))
        );
    }

    #[test]
    fn test_check_status_missing_is_decode_error() {
        let result = check_status(json!({"message-id": "1"}));
        assert!(matches!(result, Err(ChannelError::Decode(_))));
    }
}

//! # WebSocket Module
//!
//! This module pushes live donation activity to connected browsers.
//!
//! ## Channels
//!
//! | Channel | Receives |
//! |---------|----------|
//! | `all` | every `donation_received`, periodic `total_collected` |
//! | `<project id>` | `donation_received` for that project only |
//!
//! ## Connection Flow
//!
//! ```text
//! 1. Client connects to /ws/:channel
//!              ↓
//! 2. Server registers a broadcast receiver for the channel
//!              ↓
//! 3. Server sends a `connected` message
//!              ↓
//! 4. Events are pushed as they occur:
//!    - donation_received
//!    - total_collected
//! ```
//!
//! ## Message Format
//!
//! All messages are JSON:
//!
//! ```json
//! {
//!     "event": "total_collected",
//!     "data": {
//!         "totalCollected": 2908323356,
//!         "formattedTotal": "$2,908,323,356",
//!         "donationCount": 1200
//!     },
//!     "timestamp": "2024-01-15T12:00:00Z"
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::Message;
use chrono::Utc;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::db::{DonationRecord, PaymentMethod};
use crate::models::StatsResponse;
use crate::utils::Money;
use crate::AppState;

/// Channel every connection can subscribe to for site-wide events.
pub const ALL_CHANNEL: &str = "all";

/// WebSocket event types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsEventType {
    /// A donation was recorded.
    DonationReceived,
    /// Site-wide total collected.
    TotalCollected,
    /// Sent once after the handshake.
    Connected,
    /// Reply to client text messages.
    Ping,
    Error,
}

/// WebSocket message wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsMessage<T> {
    pub event: WsEventType,
    pub data: T,
    pub timestamp: chrono::DateTime<Utc>,
}

impl<T: Serialize> WsMessage<T> {
    pub fn new(event: WsEventType, data: T) -> Self {
        Self {
            event,
            data,
            timestamp: Utc::now(),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `donation_received` payload. Donor contact details are not published.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceivedData {
    pub donation_id: Uuid,
    pub project_id: Option<Uuid>,
    pub donor_name: String,
    pub amount: Money,
    pub payment_method: PaymentMethod,
}

impl From<&DonationRecord> for DonationReceivedData {
    fn from(donation: &DonationRecord) -> Self {
        Self {
            donation_id: donation.id,
            project_id: donation.project_id,
            donor_name: donation.name.clone(),
            amount: donation.amount,
            payment_method: donation.payment_method,
        }
    }
}

/// `total_collected` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TotalCollectedData {
    pub total_collected: Money,
    pub formatted_total: String,
    pub donation_count: i64,
}

impl From<&StatsResponse> for TotalCollectedData {
    fn from(stats: &StatsResponse) -> Self {
        Self {
            total_collected: stats.total_collected,
            formatted_total: stats.formatted_total.clone(),
            donation_count: stats.donation_count,
        }
    }
}

/// WebSocket connection registry.
///
/// Tracks active sessions per channel. Each connection owns one
/// broadcast sender; several connections may share a channel.
#[derive(Clone)]
pub struct WsRegistry {
    sessions: Arc<Mutex<HashMap<String, Vec<broadcast::Sender<String>>>>>,
}

impl WsRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a new connection on a channel.
    /// Returns the receiver that will get the channel's messages.
    pub async fn register(&self, channel: String) -> broadcast::Receiver<String> {
        let mut sessions = self.sessions.lock().await;
        let (tx, rx) = broadcast::channel(100);

        let senders = sessions.entry(channel.clone()).or_insert_with(Vec::new);
        senders.push(tx);

        info!(
            "Registered WebSocket on channel: {} (connections: {})",
            channel,
            senders.len()
        );

        rx
    }

    /// Drop senders whose receivers are gone.
    pub async fn unregister(&self, channel: &str) {
        let mut sessions = self.sessions.lock().await;
        if let Some(senders) = sessions.get_mut(channel) {
            senders.retain(|tx| tx.receiver_count() > 0);

            if senders.is_empty() {
                sessions.remove(channel);
                info!("Unregistered all WebSocket connections on channel: {}", channel);
            } else {
                info!(
                    "Unregistered one WebSocket connection on channel: {} (remaining: {})",
                    channel,
                    senders.len()
                );
            }
        }
    }

    /// Send a message to every connection on a channel.
    ///
    /// A channel without connections is not an error. Returns the number
    /// of connections reached.
    pub async fn send_to_channel<T: Serialize>(
        &self,
        channel: &str,
        event: WsEventType,
        data: T,
    ) -> Result<usize, String> {
        let json = WsMessage::new(event, data)
            .to_json()
            .map_err(|e| format!("Failed to serialize message: {}", e))?;

        let mut sessions = self.sessions.lock().await;

        let Some(senders) = sessions.get_mut(channel) else {
            debug!("No active WebSocket connections on channel: {}", channel);
            return Ok(0);
        };

        senders.retain(|tx| tx.receiver_count() > 0);
        let sent_count = senders
            .iter()
            .filter(|tx| tx.send(json.clone()).is_ok())
            .count();

        if senders.is_empty() {
            sessions.remove(channel);
        }

        if sent_count > 0 {
            debug!("Sent {:?} to channel {} ({} connections)", event, channel, sent_count);
        }

        Ok(sent_count)
    }

    /// Publish a recorded donation to `all` and to its project channel.
    pub async fn publish_donation(&self, donation: &DonationRecord) -> Result<usize, String> {
        let data = DonationReceivedData::from(donation);
        let mut sent = self
            .send_to_channel(ALL_CHANNEL, WsEventType::DonationReceived, &data)
            .await?;
        if let Some(project_id) = donation.project_id {
            sent += self
                .send_to_channel(&project_id.to_string(), WsEventType::DonationReceived, &data)
                .await?;
        }
        Ok(sent)
    }

    /// Publish the site-wide total to `all`.
    pub async fn publish_total(&self, stats: &StatsResponse) -> Result<usize, String> {
        self.send_to_channel(
            ALL_CHANNEL,
            WsEventType::TotalCollected,
            TotalCollectedData::from(stats),
        )
        .await
    }

    /// Number of connections on a channel.
    pub async fn connection_count(&self, channel: &str) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.get(channel).map(|v| v.len()).unwrap_or(0)
    }

    /// Total number of connections across all channels.
    pub async fn total_connections(&self) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.values().map(|v| v.len()).sum()
    }
}

impl Default for WsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `all` or a project UUID (normalized to lowercase hyphenated form).
pub fn parse_channel(raw: &str) -> Option<String> {
    if raw.eq_ignore_ascii_case(ALL_CHANNEL) {
        return Some(ALL_CHANNEL.to_string());
    }
    Uuid::parse_str(raw).ok().map(|id| id.to_string())
}

/// Configure WebSocket routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws/{channel}", web::get().to(websocket_handler));
}

/// WebSocket connection handler.
///
/// ## Endpoint
///
/// `GET /ws/:channel`
///
/// ## Example (JavaScript)
///
/// ```javascript
/// const ws = new WebSocket('ws://localhost:8080/ws/all');
///
/// ws.onmessage = (event) => {
///     const message = JSON.parse(event.data);
///     if (message.event === 'total_collected') {
///         counter.textContent = message.data.formattedTotal;
///     }
/// };
/// ```
pub async fn websocket_handler(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Payload,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, actix_web::Error> {
    let raw = path.into_inner();
    let Some(channel) = parse_channel(&raw) else {
        warn!("Rejected WebSocket for unknown channel: {}", raw);
        return Ok(HttpResponse::BadRequest().json(crate::models::ApiResponse::<()>::error(
            "INVALID_CHANNEL",
            "Channel must be 'all' or a project id",
        )));
    };
    info!("WebSocket connection request for channel: {}", channel);

    let (response, mut session, mut msg_stream) = actix_ws::handle(&req, body)?;

    let ws_registry = state.ws_registry.clone();
    let mut rx = ws_registry.register(channel.clone()).await;

    actix_rt::spawn(async move {
        let welcome = WsMessage::new(
            WsEventType::Connected,
            serde_json::json!({
                "status": "connected",
                "channel": channel,
            }),
        );
        if let Ok(json) = welcome.to_json() {
            if let Err(e) = session.text(json).await {
                error!("Failed to send welcome message: {}", e);
            }
        }

        // Forward registry messages to the socket
        let mut session_clone = session.clone();
        let channel_for_task = channel.clone();
        let registry_for_task = ws_registry.clone();
        actix_rt::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(msg) => {
                        if let Err(e) = session_clone.text(msg).await {
                            debug!("WebSocket session on {} closed: {}", channel_for_task, e);
                            registry_for_task.unregister(&channel_for_task).await;
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("WebSocket on {} lagged, skipped {} messages", channel_for_task, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        while let Some(Ok(msg)) = msg_stream.next().await {
            match msg {
                Message::Ping(bytes) => {
                    let _ = session.pong(&bytes).await;
                }
                Message::Pong(_) => {}
                Message::Text(text) => {
                    debug!("Received text on {}: {}", channel, text);
                    let reply = WsMessage::new(
                        WsEventType::Ping,
                        serde_json::json!({ "received": text.to_string() }),
                    );
                    if let Ok(json) = reply.to_json() {
                        let _ = session.text(json).await;
                    }
                }
                Message::Binary(_) => {
                    warn!("Received unexpected binary message on {}", channel);
                }
                Message::Close(reason) => {
                    info!("WebSocket closed on {}: {:?}", channel, reason);
                    break;
                }
                _ => {}
            }
        }

        let _ = session.close(None).await;
        ws_registry.unregister(&channel).await;
        info!("WebSocket disconnected from channel: {}", channel);
    });

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation(project_id: Option<Uuid>) -> DonationRecord {
        DonationRecord {
            id: Uuid::new_v4(),
            project_id,
            name: "Jane".to_string(),
            email: "jane@example.org".to_string(),
            phone: String::new(),
            amount: Money::from_units(50),
            payment_method: PaymentMethod::Card,
            message: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel("ALL").as_deref(), Some("all"));
        let id = Uuid::new_v4();
        assert_eq!(parse_channel(&id.to_string().to_uppercase()), Some(id.to_string()));
        assert_eq!(parse_channel("donors"), None);
    }

    #[tokio::test]
    async fn test_donation_reaches_all_and_project_channel() {
        let registry = WsRegistry::new();
        let project_id = Uuid::new_v4();
        let mut all_rx = registry.register(ALL_CHANNEL.to_string()).await;
        let mut project_rx = registry.register(project_id.to_string()).await;
        let mut other_rx = registry.register(Uuid::new_v4().to_string()).await;

        let sent = registry.publish_donation(&donation(Some(project_id))).await.unwrap();
        assert_eq!(sent, 2);

        let msg: serde_json::Value = serde_json::from_str(&all_rx.recv().await.unwrap()).unwrap();
        assert_eq!(msg["event"], "donation_received");
        assert_eq!(msg["data"]["amount"], 50);
        assert!(msg["data"].get("email").is_none());
        assert!(project_rx.try_recv().is_ok());
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropped_receivers_are_cleaned_up() {
        let registry = WsRegistry::new();
        let rx = registry.register(ALL_CHANNEL.to_string()).await;
        assert_eq!(registry.total_connections().await, 1);

        drop(rx);
        let sent = registry
            .send_to_channel(ALL_CHANNEL, WsEventType::Ping, "hello")
            .await
            .unwrap();
        assert_eq!(sent, 0);
        assert_eq!(registry.connection_count(ALL_CHANNEL).await, 0);
    }
}

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use appointment_cell::AppointmentError;
use shared_database::AppState;
use shared_models::error::AppError;

use crate::services::ChatRooms;

/// A chat frame. On the wire: `{"event": "send_message", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Client to server.
    SendMessage(ChatMessage),
    /// Server to every connection in the room.
    ReceiveMessage(ChatMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    /// Replaced by the server with the sender's verified email.
    #[serde(default)]
    pub sender: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatQuery {
    pub token: Option<String>,
}

#[derive(Clone)]
pub struct ChatState {
    pub app: Arc<AppState>,
    pub rooms: ChatRooms,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Appointment(#[from] AppointmentError),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Unauthorized(msg) => AppError::Auth(msg),
            ChatError::Appointment(e) => e.into(),
        }
    }
}

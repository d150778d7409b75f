use std::sync::Arc;

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocketUpgrade},
        Path, Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tracing::debug;

use appointment_cell::ListingService;
use shared_models::auth::Identity;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;

use crate::models::{ChatError, ChatQuery, ChatState};
use crate::services::run_session;

/// Browsers cannot set headers on a WebSocket handshake, so the token may
/// also come as `?token=`.
fn bearer_token(query: &ChatQuery, headers: &HeaderMap) -> Option<String> {
    query.token.clone().or_else(|| {
        headers
            .typed_get::<Authorization<Bearer>>()
            .map(|bearer| bearer.token().to_string())
    })
}

async fn authorize(state: &ChatState, appointment_id: &str, token: Option<String>) -> Result<Identity, ChatError> {
    let token = token.ok_or_else(|| ChatError::Unauthorized("Missing token".to_string()))?;
    let identity = validate_token(&token, &state.app.config.supabase_jwt_secret).map_err(ChatError::Unauthorized)?;

    ListingService::new(&state.app)
        .doctor_appointment(&identity, appointment_id)
        .await?;

    Ok(identity)
}

/// `GET /chat/{appointment_id}`: joins the appointment's chat room.
pub async fn chat_socket(
    State(state): State<Arc<ChatState>>,
    Path(appointment_id): Path<String>,
    Query(query): Query<ChatQuery>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let token = bearer_token(&query, &headers);
    let identity = match authorize(&state, &appointment_id, token).await {
        Ok(identity) => identity,
        Err(e) => return AppError::from(e).into_response(),
    };

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            debug!("Chat request without a WebSocket handshake: {}", rejection);
            return rejection.into_response();
        }
    };

    let rooms = state.rooms.clone();
    upgrade.on_upgrade(move |socket| {
        let (outgoing, incoming) = socket.split();
        run_session(rooms, appointment_id, identity.email, outgoing, incoming)
    })
}

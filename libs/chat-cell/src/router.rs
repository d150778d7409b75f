use std::sync::Arc;

use axum::{routing::get, Router};

use shared_database::AppState;

use crate::handlers;
use crate::models::ChatState;
use crate::services::ChatRooms;

/// The socket route authenticates from its own token, not the bearer
/// middleware, since the token usually arrives in the query string.
pub fn chat_routes(state: Arc<AppState>, rooms: ChatRooms) -> Router {
    let chat_state = Arc::new(ChatState { app: state, rooms });

    Router::new()
        .route("/chat/{appointment_id}", get(handlers::chat_socket))
        .with_state(chat_state)
}

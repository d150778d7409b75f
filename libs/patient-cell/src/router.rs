use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

/// Every patient route needs a verified caller.
pub fn patient_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/patient/signup", post(register_patient))
        .route("/patient/{email}", get(get_patient))
        .route("/show/patient/picture/{email}", get(get_patient_picture))
        .route("/patient/updateProfilePic/{email}", put(update_profile_pic))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

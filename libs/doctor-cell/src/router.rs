use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppState>) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/doctor/{email}", get(handlers::get_doctor))
        .route("/api/doctors", get(handlers::list_doctors));

    // Protected routes: the caller must be the doctor named in the path or body
    let protected_routes = Router::new()
        .route("/doctor/signup", post(handlers::register_doctor))
        .route("/doctor/updateProfilePic/{email}", put(handlers::update_profile_pic))
        .route("/doctor/updateDescription/{email}", put(handlers::update_description))
        .route("/doctor/addDegree/{email}", put(handlers::add_degree))
        .route("/doctor/removeDegree/{email}", put(handlers::remove_degree))
        .route("/doctor/updateAvailability/{email}", put(handlers::update_availability))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

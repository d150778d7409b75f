use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    // Stored prescriptions are public files, like the rest of /uploads
    let public_routes = Router::new()
        .route("/uploads/prescriptions/{id}", get(handlers::serve_prescription));

    let protected_routes = Router::new()
        // Booking lifecycle
        .route("/api/schedule-appointment", post(handlers::schedule_appointment))
        .route("/cancel/appointment/{id}", delete(handlers::cancel_appointment))
        .route("/uploads/prescriptions/{id}", put(handlers::upload_prescription))

        // Active appointments
        .route("/show/patient/appointments/{email}", get(handlers::get_patient_appointments))
        .route("/show/doctor/appointments/{email}", get(handlers::get_doctor_appointments))
        .route("/doctor/appointments/{id}", get(handlers::get_doctor_appointment))

        // History
        .route("/patient/history/appointments/{email}", get(handlers::get_patient_history))
        .route("/doctor/history/appointments/{email}", get(handlers::get_doctor_history))
        .route("/doctor/history/{email}", get(handlers::get_doctor_history_records))

        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/track/visitor", post(handlers::track_visitor))
        .route("/api/track/click", post(handlers::track_click))
        .route("/api/submit/loan", post(handlers::submit_loan))
        .route("/api/submit/debt", post(handlers::submit_debt))
        .route("/api/submit/contact", post(handlers::submit_contact))
        .route("/api/dashboard/stats", get(handlers::dashboard_stats))
        .route("/api/dashboard/visitors", get(handlers::dashboard_visitors))
        .route("/api/dashboard/leads/loan", get(handlers::dashboard_loan_leads))
        .route("/api/dashboard/leads/debt", get(handlers::dashboard_debt_leads))
        .route("/api/dashboard/leads/contact", get(handlers::dashboard_contact_leads))
        .route("/api/dashboard/events", get(handlers::dashboard_events))
        .route("/api/export/:type/csv", get(handlers::export_csv))
        .route("/api/export/:type/txt", get(handlers::export_txt))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

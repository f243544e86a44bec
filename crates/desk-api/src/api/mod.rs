//! REST boundary for case assignment
//!
//! | Method | Path                 | Success | Failure                  |
//! |--------|----------------------|---------|--------------------------|
//! | POST   | `/cases`             | 201     | 400, 503 (no capacity)   |
//! | GET    | `/cases/:id`         | 200     | 404                      |
//! | PUT    | `/cases/:id/status`  | 200     | 400, 404                 |
//! | GET    | `/agents`            | 200     |                          |
//! | POST   | `/agents`            | 201     | 400                      |
//! | GET    | `/agents/load`       | 200     |                          |
//! | PUT    | `/agents/:id/online` | 200     | 404                      |
//!
//! Store failures surface as 500 with the details only in the logs.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use assignment_core::CaseAssigner;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorBody};

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    pub assigner: Arc<CaseAssigner>,
}

/// Create the REST API router
pub fn create_router(assigner: Arc<CaseAssigner>) -> Router {
    Router::new()
        .route("/cases", post(handlers::create_case))
        .route("/cases/:id", get(handlers::get_case))
        .route("/cases/:id/status", put(handlers::update_case_status))
        .route("/agents", get(handlers::list_agents).post(handlers::register_agent))
        .route("/agents/load", get(handlers::agent_loads))
        .route("/agents/:id/online", put(handlers::set_agent_online))
        .layer(TraceLayer::new_for_http())
        .with_state(ApiState { assigner })
}

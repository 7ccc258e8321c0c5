use axum::{Router, routing::get};

pub mod hr;
pub mod inventory;
pub mod legal;
pub mod observability;
pub mod plugins;
pub mod sync;
pub mod system;
pub mod tasks;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/stream", get(system::stream))
        .merge(plugins::router())
        .merge(sync::router())
        .merge(tasks::router())
        .merge(observability::router())
        .nest("/inventory", inventory::router())
        .nest("/hr", hr::router())
        .nest("/legal", legal::router())
}

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use moneta_core::config::MonetaConfig;
use moneta_scheduler::Dispatcher;
use moneta_store::{SqlitePlanStore, SqliteSubscriptionDirectory};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: MonetaConfig,
    pub dispatcher: Dispatcher,
    /// Kept alongside the dispatcher's trait-object handles so the health
    /// endpoint and the subscribe flow can use store methods the repository
    /// traits do not expose (counts, upsert).
    pub plans: Arc<SqlitePlanStore>,
    pub subscriptions: Arc<SqliteSubscriptionDirectory>,
}

impl AppState {
    pub fn new(
        config: MonetaConfig,
        dispatcher: Dispatcher,
        plans: Arc<SqlitePlanStore>,
        subscriptions: Arc<SqliteSubscriptionDirectory>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            plans,
            subscriptions,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/cron/reminders",
            post(crate::http::cron::cron_reminders_handler),
        )
        .route(
            "/subscriptions",
            post(crate::http::subscriptions::subscribe_handler),
        )
        .route(
            "/subscriptions/{id}",
            delete(crate::http::subscriptions::unsubscribe_handler),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

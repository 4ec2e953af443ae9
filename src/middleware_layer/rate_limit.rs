use std::sync::Arc;

use axum::routing::MethodRouter;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};

use crate::{config::LoginRateLimit, state::AppState};

/// Wraps the login submission route in a per-peer-IP governor.
///
/// Requires the server to be started with connect info so the peer address
/// is available. Throttled requests get 429 before reaching the handler.
///
/// # Arguments
///
/// * `route` - The method router handling `POST /auth/login`.
/// * `limit` - The configured limit, or `None` to leave the route as is.
///
/// # Returns
///
/// The (possibly) wrapped route.
pub fn throttle_login(route: MethodRouter<AppState>, limit: Option<LoginRateLimit>) -> MethodRouter<AppState> {
    let Some(limit) = limit else {
        return route;
    };

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(limit.refill_seconds)
        .burst_size(limit.burst)
        .use_headers()
        .finish();

    match governor_conf {
        Some(conf) => {
            tracing::info!(
                "✅ Login throttle: burst {} / one attempt every {}s per IP",
                limit.burst,
                limit.refill_seconds
            );
            route.layer(GovernorLayer::new(Arc::new(conf)))
        }
        None => {
            tracing::warn!("⚠️ Invalid login throttle settings, throttle disabled");
            route
        }
    }
}

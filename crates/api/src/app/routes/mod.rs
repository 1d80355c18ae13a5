use axum::{Router, routing::get};

pub mod adoptions;
pub mod donations;
pub mod pets;
pub mod system;
pub mod users;

/// Routes reachable without a credential.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(users::public_router())
        .merge(pets::public_router())
}

/// Routes behind the bearer check. Role gates are applied per module.
pub fn protected_router() -> Router {
    Router::new()
        .merge(users::router())
        .merge(pets::router())
        .merge(adoptions::router())
        .merge(donations::router())
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use chrono::Utc;

use petparadise_core::{DonationId, UserId};
use petparadise_donations::{Donation, DonationStatus};
use petparadise_infra::DonationRepository;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;
use crate::middleware::{RoleGate, require_roles};

pub fn router() -> Router {
    let admin = Router::new()
        .route("/donations", get(list_donations))
        .route("/donations/", get(list_donations))
        .route("/donations/:id/status", patch(update_donation_status))
        .route("/donations/:id", delete(delete_donation))
        .route_layer(axum::middleware::from_fn_with_state(RoleGate::admin_only(), require_roles));

    Router::new()
        .route("/donations", post(create_donation))
        .route("/donations/", post(create_donation))
        .route("/donations/:id", get(get_donation))
        .route("/donations/user/:user_id", get(donations_by_user))
        .merge(admin)
}

async fn load_donation(services: &AppServices, id: DonationId) -> Result<Donation, Response> {
    match services.repos.donations.find_by_id(id).await {
        Ok(Some(donation)) => Ok(donation),
        Ok(None) => Err(errors::not_found("Donation")),
        Err(e) => Err(errors::repository_error_to_response(e, "Donation")),
    }
}

/// The donor is always the caller.
pub async fn create_donation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<dto::CreateDonationRequest>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let donation = match Donation::create(principal.user_id(), body.amount, body.comment, body.anonymous, Utc::now()) {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.repos.donations.save(&donation).await {
        Ok(()) => (StatusCode::CREATED, Json(donation)).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Donation"),
    }
}

pub async fn get_donation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let donation_id: DonationId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let donation = match load_donation(&services, donation_id).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    if !principal.is_self_or_admin(donation.user_id) {
        return errors::forbidden();
    }

    Json(donation).into_response()
}

pub async fn donations_by_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
) -> Response {
    let user_id: UserId = match dto::path_id(&user_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if !principal.is_self_or_admin(user_id) {
        return errors::forbidden();
    }

    match services.repos.donations.find_by_user(user_id).await {
        Ok(donations) => Json(donations).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Donation"),
    }
}

pub async fn list_donations(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.repos.donations.find_all().await {
        Ok(donations) => Json(donations).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Donation"),
    }
}

pub async fn update_donation_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::StatusRequest>, JsonRejection>,
) -> Response {
    let donation_id: DonationId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if body.status.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Status is required");
    }
    let Ok(status) = body.status.parse::<DonationStatus>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Invalid status");
    };

    let mut donation = match load_donation(&services, donation_id).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    donation.set_status(status, Utc::now());

    match services.repos.donations.update(&donation).await {
        Ok(()) => Json(donation).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Donation"),
    }
}

pub async fn delete_donation(Extension(services): Extension<Arc<AppServices>>, Path(id): Path<String>) -> Response {
    let donation_id: DonationId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.repos.donations.delete(donation_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::repository_error_to_response(e, "Donation"),
    }
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use petparadise_adoptions::{Adoption, AdoptionStatus};
use petparadise_core::{AdoptionId, PetId, UserId};
use petparadise_infra::{AdoptionRepository, PetRepository};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;
use crate::middleware::{RoleGate, require_roles};

pub fn router() -> Router {
    let staff = Router::new()
        .route("/adoptions", get(list_adoptions))
        .route("/adoptions/", get(list_adoptions))
        .route("/adoptions/:id", axum::routing::put(update_adoption).delete(delete_adoption))
        .route_layer(axum::middleware::from_fn_with_state(RoleGate::staff(), require_roles));

    Router::new()
        .route("/adoptions", post(create_adoption))
        .route("/adoptions/", post(create_adoption))
        .route("/adoptions/:id", get(get_adoption))
        .route("/adoptions/user/:user_id", get(adoptions_by_user))
        .merge(staff)
}

async fn load_adoption(services: &AppServices, id: AdoptionId) -> Result<Adoption, Response> {
    match services.repos.adoptions.find_by_id(id).await {
        Ok(Some(adoption)) => Ok(adoption),
        Ok(None) => Err(errors::not_found("Adoption")),
        Err(e) => Err(errors::repository_error_to_response(e, "Adoption")),
    }
}

/// The applicant is always the caller.
pub async fn create_adoption(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    payload: Result<Json<dto::CreateAdoptionRequest>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if body.pet_id.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "Pet ID is required");
    }
    let Ok(pet_id) = body.pet_id.parse::<PetId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Invalid pet ID");
    };

    match services.repos.pets.find_by_id(pet_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::not_found("Pet"),
        Err(e) => return errors::repository_error_to_response(e, "Pet"),
    }

    let adoption = Adoption::request(pet_id, principal.user_id(), body.documents, Utc::now());
    match services.repos.adoptions.save(&adoption).await {
        Ok(()) => (StatusCode::CREATED, Json(adoption)).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Adoption"),
    }
}

pub async fn get_adoption(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let adoption_id: AdoptionId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let adoption = match load_adoption(&services, adoption_id).await {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    if !adoption.is_owned_by(principal.user_id()) && !principal.is_staff() {
        return errors::forbidden();
    }

    Json(adoption).into_response()
}

pub async fn adoptions_by_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
) -> Response {
    let user_id: UserId = match dto::path_id(&user_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if principal.user_id() != user_id && !principal.is_staff() {
        return errors::forbidden();
    }

    match services.repos.adoptions.find_by_user(user_id).await {
        Ok(adoptions) => Json(adoptions).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Adoption"),
    }
}

pub async fn list_adoptions(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.repos.adoptions.find_all().await {
        Ok(adoptions) => Json(adoptions).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Adoption"),
    }
}

pub async fn update_adoption(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateAdoptionRequest>, JsonRejection>,
) -> Response {
    let adoption_id: AdoptionId = match dto::path_id(&id) {
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
    let Ok(status) = body.status.parse::<AdoptionStatus>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Invalid status");
    };

    let mut adoption = match load_adoption(&services, adoption_id).await {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    adoption.update(status, body.documents, Utc::now());

    match services.repos.adoptions.update(&adoption).await {
        Ok(()) => Json(adoption).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Adoption"),
    }
}

pub async fn delete_adoption(Extension(services): Extension<Arc<AppServices>>, Path(id): Path<String>) -> Response {
    let adoption_id: AdoptionId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.repos.adoptions.delete(adoption_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::repository_error_to_response(e, "Adoption"),
    }
}

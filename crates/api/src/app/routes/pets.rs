use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};
use chrono::Utc;

use petparadise_core::PetId;
use petparadise_infra::PetRepository;
use petparadise_pets::{NewPet, Pet, PetChanges, PetStatus};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::{RoleGate, require_roles};

pub fn public_router() -> Router {
    Router::new()
        .route("/pets", get(list_pets))
        .route("/pets/", get(list_pets))
        .route("/pets/status", get(pets_by_status))
        .route("/pets/:id", get(get_pet))
}

/// Staff-only mutations.
pub fn router() -> Router {
    Router::new()
        .route("/pets", post(create_pet))
        .route("/pets/", post(create_pet))
        .route("/pets/:id", put(update_pet).delete(delete_pet))
        .route("/pets/:id/status", patch(update_pet_status))
        .route_layer(axum::middleware::from_fn_with_state(RoleGate::staff(), require_roles))
}

fn parse_status(raw: &str) -> Result<PetStatus, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "Invalid status"))
}

async fn load_pet(services: &AppServices, id: PetId) -> Result<Pet, Response> {
    match services.repos.pets.find_by_id(id).await {
        Ok(Some(pet)) => Ok(pet),
        Ok(None) => Err(errors::not_found("Pet")),
        Err(e) => Err(errors::repository_error_to_response(e, "Pet")),
    }
}

pub async fn list_pets(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.repos.pets.find_all().await {
        Ok(pets) => Json(pets).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Pet"),
    }
}

pub async fn pets_by_status(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::StatusQuery>,
) -> Response {
    let Some(raw) = query.status.filter(|s| !s.is_empty()) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "Status query parameter is required");
    };
    let status = match parse_status(&raw) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.repos.pets.find_by_status(status).await {
        Ok(pets) => Json(pets).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Pet"),
    }
}

pub async fn get_pet(Extension(services): Extension<Arc<AppServices>>, Path(id): Path<String>) -> Response {
    let pet_id: PetId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match load_pet(&services, pet_id).await {
        Ok(pet) => Json(pet).into_response(),
        Err(resp) => resp,
    }
}

pub async fn create_pet(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreatePetRequest>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let input = NewPet {
        name: body.name,
        species: body.species,
        breed: body.breed,
        age: body.age,
        description: body.description,
        images: body.images,
    };
    let pet = match Pet::create(input, Utc::now()) {
        Ok(pet) => pet,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.repos.pets.save(&pet).await {
        Ok(()) => (StatusCode::CREATED, Json(pet)).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Pet"),
    }
}

pub async fn update_pet(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdatePetRequest>, JsonRejection>,
) -> Response {
    let pet_id: PetId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let status = match body.status.as_deref().map(parse_status).transpose() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let changes = PetChanges {
        name: body.name,
        species: body.species,
        breed: body.breed,
        age: body.age,
        description: body.description,
        status,
        images: body.images,
    };

    let mut pet = match load_pet(&services, pet_id).await {
        Ok(pet) => pet,
        Err(resp) => return resp,
    };
    if let Err(e) = pet.apply(changes, Utc::now()) {
        return errors::domain_error_to_response(e);
    }

    match services.repos.pets.update(&pet).await {
        Ok(()) => Json(pet).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Pet"),
    }
}

pub async fn update_pet_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::StatusRequest>, JsonRejection>,
) -> Response {
    let pet_id: PetId = match dto::path_id(&id) {
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
    let status = match parse_status(&body.status) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let mut pet = match load_pet(&services, pet_id).await {
        Ok(pet) => pet,
        Err(resp) => return resp,
    };
    pet.set_status(status, Utc::now());

    match services.repos.pets.update(&pet).await {
        Ok(()) => Json(pet).into_response(),
        Err(e) => errors::repository_error_to_response(e, "Pet"),
    }
}

pub async fn delete_pet(Extension(services): Extension<Arc<AppServices>>, Path(id): Path<String>) -> Response {
    let pet_id: PetId = match dto::path_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.repos.pets.delete(pet_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::repository_error_to_response(e, "Pet"),
    }
}

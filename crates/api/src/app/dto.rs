use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::Response;
use serde::{Deserialize, Serialize};

use petparadise_auth::{TokenPair, User};

use crate::app::errors;

/// Unwrap a JSON body, answering 400 `Invalid request body` on any rejection.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(body)| body).map_err(|_| errors::invalid_body())
}

/// Parse a path identifier, answering 400 `Invalid ID` on failure.
pub fn path_id<T: core::str::FromStr>(raw: &str) -> Result<T, Response> {
    raw.parse().map_err(|_| errors::invalid_id())
}

// -------------------------
// Users
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub documents: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    #[serde(default)]
    pub role: String,
}

/// Body for every `PATCH .../status` route.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub tokens: TokenPair,
}

// -------------------------
// Pets
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreatePetRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePetRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub images: Option<Vec<String>>,
}

// -------------------------
// Adoptions
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateAdoptionRequest {
    #[serde(default)]
    pub pet_id: String,
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAdoptionRequest {
    #[serde(default)]
    pub status: String,
    pub documents: Option<Vec<String>>,
}

// -------------------------
// Donations
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateDonationRequest {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub anonymous: bool,
}

//! Request/response models for login, registration and logout.

use super::accounts::{AccountResponse, Role};
use crate::errors::Error;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Organisor signup
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
    /// Legacy role flags. Optional, but when sent they must describe an organisor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_organisor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_agent: Option<bool>,
}

impl RegisterRequest {
    /// The role the flags ask for. An absent flag takes the signup default:
    /// organisor set, agent unset.
    pub fn requested_role(&self) -> Result<Role, Error> {
        Role::from_flags(self.is_organisor.unwrap_or(true), self.is_agent.unwrap_or(false))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub account: AccountResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// An auth payload plus the `Set-Cookie` value that goes with it
#[derive(Debug)]
pub struct SessionResponse<T> {
    pub status: StatusCode,
    pub body: T,
    pub cookie: String,
}

impl<T: Serialize> IntoResponse for SessionResponse<T> {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        match HeaderValue::from_str(&self.cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Session cookie is not a valid header value: {e}"),
        }
        response
    }
}

pub type RegisterResponse = SessionResponse<AuthResponse>;
pub type LoginResponse = SessionResponse<AuthResponse>;
pub type LogoutResponse = SessionResponse<AuthSuccessResponse>;

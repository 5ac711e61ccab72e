//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): signup, login, logout
//! - **Me** (`/api/v1/me`): the authenticated actor
//! - **Leads** (`/api/v1/leads/*`): leads, assignment and categorisation
//! - **Categories** (`/api/v1/categories/*`): categories and lead counts
//! - **Agents** (`/api/v1/agents/*`): agent accounts of an organisation
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa`. The document is served at
//! `/api-docs/openapi.json` and rendered at `/docs`.

pub mod handlers;
pub mod models;

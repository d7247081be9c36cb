//! Contacts service routes
//!
//! Each handler validates its input, runs exactly one owner-scoped
//! repository call and maps the outcome to a response. Store failures are
//! logged here and leave as a generic per-operation message.

use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use common::error::DatabaseError;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{ContactPatch, ContactQuery, MessageResponse, NewContact},
    state::AppState,
    store::NamePattern,
};

/// Create the router for the contacts service
pub fn create_router(state: AppState) -> Router {
    let contact_routes = Router::new()
        .route(
            "/contacts",
            get(list_contacts)
                .post(create_contact)
                .delete(delete_all_contacts),
        )
        .route("/contacts/favorite", get(list_favorite_contacts))
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(contact_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Log a store failure and replace it with a client-safe message
fn store_failure(message: String) -> impl FnOnce(DatabaseError) -> ApiError {
    move |e| {
        error!("{}: {}", message, e);
        ApiError::Internal(message)
    }
}

/// Parse a JSON request body; an empty body reads as an empty object
fn parse_body(body: &Bytes) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }

    serde_json::from_slice(body).map_err(|_| ApiError::BadRequest("Invalid JSON body".to_string()))
}

/// Path ids that are not UUIDs can never name a stored contact
fn parse_contact_id(id: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| ApiError::contact_not_found())
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.contacts.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "contacts"
            })),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "service": "contacts"
                })),
            )
        }
    }
}

/// Create and save a new contact
pub async fn create_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let contact = NewContact::from_json(&parse_body(&body)?)?;

    let contact = state
        .contacts
        .for_owner(user.id)
        .create(contact)
        .await
        .map_err(store_failure(
            "An error occurred while creating the contact".to_string(),
        ))?;

    info!("Created contact {} for user {}", contact.id, user.id);

    Ok(Json(contact))
}

/// Retrieve all contacts of the current user, optionally filtered by name
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ContactQuery>,
) -> ApiResult<impl IntoResponse> {
    let pattern = query
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .map(|name| NamePattern::new(name, state.config.contacts.name_filter))
        .transpose()
        .map_err(|_| ApiError::BadRequest("Invalid name filter".to_string()))?;

    let contacts = state
        .contacts
        .for_owner(user.id)
        .find_all(pattern)
        .await
        .map_err(store_failure(
            "An error occurred while retrieving contacts".to_string(),
        ))?;

    Ok(Json(contacts))
}

/// Find a single contact by id
pub async fn get_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let contact_id = parse_contact_id(&id)?;

    let contact = state
        .contacts
        .for_owner(user.id)
        .find_one(contact_id)
        .await
        .map_err(store_failure(format!(
            "Error retrieving contact with id={}",
            id
        )))?
        .ok_or_else(ApiError::contact_not_found)?;

    Ok(Json(contact))
}

/// Update a contact by id
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let patch = ContactPatch::from_json(&parse_body(&body)?)?;
    let contact_id = parse_contact_id(&id)?;

    state
        .contacts
        .for_owner(user.id)
        .update(contact_id, &patch)
        .await
        .map_err(store_failure(format!("Error updating contact with id={}", id)))?
        .ok_or_else(ApiError::contact_not_found)?;

    Ok(Json(MessageResponse::new("Contact was updated successfully")))
}

/// Delete a contact by id
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let contact_id = parse_contact_id(&id)?;

    state
        .contacts
        .for_owner(user.id)
        .delete_one(contact_id)
        .await
        .map_err(store_failure(format!(
            "Could not delete contact with id={}",
            id
        )))?
        .ok_or_else(ApiError::contact_not_found)?;

    Ok(Json(MessageResponse::new("Contact was deleted successfully")))
}

/// Delete all contacts of the current user
pub async fn delete_all_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state
        .contacts
        .for_owner(user.id)
        .delete_all()
        .await
        .map_err(store_failure(
            "An error occurred while removing all contacts".to_string(),
        ))?;

    info!("Deleted {} contacts for user {}", deleted, user.id);

    Ok(Json(MessageResponse::new(format!(
        "{} contacts were deleted successfully",
        deleted
    ))))
}

/// Find all favorite contacts of the current user
pub async fn list_favorite_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let contacts = state
        .contacts
        .for_owner(user.id)
        .find_favorites()
        .await
        .map_err(store_failure(
            "An error occurred while retrieving favorite contacts".to_string(),
        ))?;

    Ok(Json(contacts))
}

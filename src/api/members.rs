use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_email, validate_password, validate_record_id, validate_required_text};
use super::{ApiError, ApiResponse, AppState, MemberDto};
use crate::db::{Role, UserInput};

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: String,
    pub email: String,
    pub role: String,
    /// When present, rotates the password.
    pub password: Option<String>,
}

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    Role::parse(raw.trim())
        .ok_or_else(|| ApiError::validation(format!("Invalid role: {}", raw.trim())))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MemberDto>>>, ApiError> {
    let users = state.store().list_users().await?;

    let dtos = users.into_iter().map(MemberDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

pub async fn get_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MemberDto>>, ApiError> {
    let id = validate_record_id(id)?;

    let user = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::member_not_found(id))?;

    Ok(Json(ApiResponse::success(MemberDto::from(user))))
}

pub async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberDto>>), ApiError> {
    let name = validate_required_text(&payload.name, "Name")?.to_string();
    let email = validate_email(&payload.email)?.to_string();
    let password = validate_password(&payload.password)?;
    let role = parse_role(&payload.role)?;

    if state.store().get_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict(format!(
            "Email {} is already registered",
            email
        )));
    }

    let user = state
        .store()
        .create_user(
            UserInput { name, email, role },
            password,
            &state.config().security,
        )
        .await?;

    tracing::info!("Created member {} ({})", user.id, user.email);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MemberDto::from(user))),
    ))
}

pub async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<Json<ApiResponse<MemberDto>>, ApiError> {
    let id = validate_record_id(id)?;

    let name = validate_required_text(&payload.name, "Name")?.to_string();
    let email = validate_email(&payload.email)?.to_string();
    let role = parse_role(&payload.role)?;

    let password = match payload.password.as_deref() {
        Some(password) => Some(validate_password(password)?),
        None => None,
    };

    // The unique index would also catch this; checking first turns a 500
    // into a 409.
    if let Some(existing) = state.store().get_user_by_email(&email).await?
        && existing.id != id
    {
        return Err(ApiError::conflict(format!(
            "Email {} is already registered",
            email
        )));
    }

    let user = state
        .store()
        .update_user(
            id,
            UserInput { name, email, role },
            password,
            &state.config().security,
        )
        .await?
        .ok_or_else(|| ApiError::member_not_found(id))?;

    Ok(Json(ApiResponse::success(MemberDto::from(user))))
}

pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let id = validate_record_id(id)?;

    if !state.store().remove_user(id).await? {
        return Err(ApiError::member_not_found(id));
    }

    tracing::info!("Deleted member {}", id);
    Ok(Json(ApiResponse::success(true)))
}

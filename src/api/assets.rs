use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Local;
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;

use super::validation::{validate_record_id, validate_required_text};
use super::{ApiError, ApiResponse, AppState, AssetDto, AssetFilter};
use crate::db::AssetInput;
use crate::warranty;

#[derive(Debug, Deserialize)]
pub struct AssetRequest {
    pub sc_code: String,
    pub project_name: String,
    pub start_date: String,
    pub duration_years: Option<i32>,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub status: Option<warranty::WarrantyStatus>,
    pub search: Option<String>,
    #[serde(default)]
    pub format: ExportFormat,
}

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Validate a write payload and compute the warranty snapshot persisted
/// alongside it. An unparseable start date blocks the save; this is the
/// only gate between the form and the row.
fn validate_payload(payload: AssetRequest) -> Result<AssetInput, ApiError> {
    let sc_code = validate_required_text(&payload.sc_code, "SC code")?.to_string();
    let project_name = validate_required_text(&payload.project_name, "Project name")?.to_string();

    let start_date =
        warranty::parse_start_date(&payload.start_date).map_err(|e| ApiError::validation(e.to_string()))?;
    let duration_years = warranty::normalize_duration(payload.duration_years);

    let term = warranty::evaluate_now(start_date, duration_years);

    let remark = payload
        .remark
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(AssetInput {
        sc_code,
        project_name,
        start_date: start_date.format("%Y-%m-%d").to_string(),
        duration_years,
        end_date: term.end_date.format("%Y-%m-%d").to_string(),
        status: term.status.as_str().to_string(),
        remark,
    })
}

/// Load, project against today's date, and filter.
async fn load_filtered(state: &AppState, filter: &AssetFilter) -> Result<Vec<AssetDto>, ApiError> {
    let today = Local::now().date_naive();

    let rows = state.store().list_assets().await?;

    Ok(rows
        .into_iter()
        .map(|model| AssetDto::project(model, today))
        .filter(|asset| filter.matches(asset))
        .collect())
}

pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AssetFilter>,
) -> Result<Json<ApiResponse<Vec<AssetDto>>>, ApiError> {
    let assets = load_filtered(&state, &filter).await?;
    Ok(Json(ApiResponse::success(assets)))
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AssetDto>>, ApiError> {
    let id = validate_record_id(id)?;

    let model = state
        .store()
        .get_asset(id)
        .await?
        .ok_or_else(|| ApiError::asset_not_found(id))?;

    let dto = AssetDto::project(model, Local::now().date_naive());
    Ok(Json(ApiResponse::success(dto)))
}

pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AssetDto>>), ApiError> {
    let input = validate_payload(payload)?;

    let model = state.store().add_asset(input).await?;
    tracing::info!("Created asset {} ({})", model.id, model.sc_code);

    let dto = AssetDto::project(model, Local::now().date_naive());
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dto))))
}

pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<AssetRequest>,
) -> Result<Json<ApiResponse<AssetDto>>, ApiError> {
    let id = validate_record_id(id)?;
    let input = validate_payload(payload)?;

    let model = state
        .store()
        .update_asset(id, input)
        .await?
        .ok_or_else(|| ApiError::asset_not_found(id))?;

    let dto = AssetDto::project(model, Local::now().date_naive());
    Ok(Json(ApiResponse::success(dto)))
}

pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let id = validate_record_id(id)?;

    if !state.store().remove_asset(id).await? {
        return Err(ApiError::asset_not_found(id));
    }

    tracing::info!("Deleted asset {}", id);
    Ok(Json(ApiResponse::success(true)))
}

/// GET /api/assets/export
/// Same filter semantics as the list endpoint, rendered as a download.
pub async fn export_assets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<axum::response::Response, ApiError> {
    let filter = AssetFilter {
        status: query.status,
        search: query.search,
    };
    let assets = load_filtered(&state, &filter).await?;

    if query.format == ExportFormat::Json {
        let json =
            serde_json::to_string_pretty(&assets).map_err(|e| ApiError::internal(e.to_string()))?;

        return Ok((
            [
                (header::CONTENT_TYPE, "application/json"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"assets.json\"",
                ),
            ],
            json,
        )
            .into_response());
    }

    let mut csv =
        String::from("sc_code,project_name,start_date,duration_years,end_date,status,remark\n");
    for asset in assets {
        let _ = writeln!(
            csv,
            "\"{}\",\"{}\",{},{},{},{},\"{}\"",
            asset.sc_code.replace('"', "\"\""),
            asset.project_name.replace('"', "\"\""),
            asset.start_date,
            asset.duration_years,
            asset.end_date,
            asset.status,
            asset.remark.unwrap_or_default().replace('"', "\"\"")
        );
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"assets.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

use axum::{Json, extract::State};
use chrono::Local;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};
use crate::warranty::{self, WarrantyStatus};

/// GET /api/system/status
///
/// Version, uptime, and live asset/member counts. The warranty split is
/// recomputed from start dates, never read from the stored snapshots.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let today = Local::now().date_naive();

    let assets = state.store().list_assets().await?;
    let members = state.store().list_users().await?;

    let total_assets = assets.len() as u64;
    let in_warranty = assets
        .iter()
        .filter(|asset| {
            warranty::parse_start_date(&asset.start_date)
                .map(|start| warranty::evaluate(start, asset.duration_years, today).status)
                .is_ok_and(|status| status == WarrantyStatus::InWarranty)
        })
        .count() as u64;

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        total_assets,
        in_warranty,
        expired: total_assets - in_warranty,
        members: members.len() as u64,
    })))
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::Role;
use crate::entities::assets;
use crate::warranty::{self, WarrantyStatus};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssetDto {
    pub id: i32,
    pub sc_code: String,
    pub project_name: String,
    pub start_date: String,
    pub duration_years: i32,
    pub end_date: String,
    pub status: WarrantyStatus,
    pub remark: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl AssetDto {
    /// Project a stored row, recomputing the warranty term against `today`.
    ///
    /// The persisted `end_date`/`status` columns are write-time snapshots
    /// only; every read goes through this live evaluation so a record
    /// written months ago still reports the correct status.
    #[must_use]
    pub fn project(model: assets::Model, today: NaiveDate) -> Self {
        let term = warranty::parse_start_date(&model.start_date)
            .map(|start| warranty::evaluate(start, model.duration_years, today))
            .ok();

        let (end_date, status) = match term {
            Some(term) => (term.end_date.format("%Y-%m-%d").to_string(), term.status),
            // Rows predating the validation gate: trust the stored snapshot.
            None => (
                model.end_date.clone(),
                if model.status == WarrantyStatus::Expired.as_str() {
                    WarrantyStatus::Expired
                } else {
                    WarrantyStatus::InWarranty
                },
            ),
        };

        Self {
            id: model.id,
            sc_code: model.sc_code,
            project_name: model.project_name,
            start_date: model.start_date,
            duration_years: model.duration_years,
            end_date,
            status,
            remark: model.remark,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

impl From<crate::db::User> for MemberDto {
    fn from(user: crate::db::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub total_assets: u64,
    pub in_warranty: u64,
    pub expired: u64,
    pub members: u64,
}

/// Filter shared by the asset list and export endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct AssetFilter {
    pub status: Option<WarrantyStatus>,
    pub search: Option<String>,
}

impl AssetFilter {
    /// Whether a projected asset passes the status and search filters.
    /// Search is a case-insensitive substring match on the SC code and
    /// the project name.
    #[must_use]
    pub fn matches(&self, asset: &AssetDto) -> bool {
        if let Some(status) = self.status
            && asset.status != status
        {
            return false;
        }

        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !asset.sc_code.to_lowercase().contains(&needle)
                && !asset.project_name.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }
}

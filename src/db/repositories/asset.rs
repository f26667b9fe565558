use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set,
};

use crate::entities::assets;

/// Validated fields for an asset write. `end_date`/`status` are the
/// write-time snapshot computed by the caller from the warranty evaluator.
#[derive(Debug, Clone)]
pub struct AssetInput {
    pub sc_code: String,
    pub project_name: String,
    pub start_date: String,
    pub duration_years: i32,
    pub end_date: String,
    pub status: String,
    pub remark: Option<String>,
}

pub struct AssetRepository {
    conn: DatabaseConnection,
}

impl AssetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All assets, newest first.
    pub async fn list(&self) -> Result<Vec<assets::Model>> {
        let rows = assets::Entity::find()
            .order_by_desc(assets::Column::CreatedAt)
            .order_by_desc(assets::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list assets")?;

        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> Result<Option<assets::Model>> {
        let asset = assets::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query asset by ID")?;

        Ok(asset)
    }

    pub async fn add(&self, input: AssetInput) -> Result<assets::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = assets::ActiveModel {
            sc_code: Set(input.sc_code),
            project_name: Set(input.project_name),
            start_date: Set(input.start_date),
            duration_years: Set(input.duration_years),
            end_date: Set(input.end_date),
            status: Set(input.status),
            remark: Set(input.remark),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert asset")?;

        Ok(model)
    }

    /// Replace all mutable fields. Returns `None` when the id is unknown.
    pub async fn update(&self, id: i32, input: AssetInput) -> Result<Option<assets::Model>> {
        let Some(asset) = assets::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query asset for update")?
        else {
            return Ok(None);
        };

        let mut active: assets::ActiveModel = asset.into();
        active.sc_code = Set(input.sc_code);
        active.project_name = Set(input.project_name);
        active.start_date = Set(input.start_date);
        active.duration_years = Set(input.duration_years);
        active.end_date = Set(input.end_date);
        active.status = Set(input.status);
        active.remark = Set(input.remark);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update asset")?;

        Ok(Some(model))
    }

    /// Delete by id. Returns whether a row existed.
    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = assets::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete asset")?;

        Ok(result.rows_affected > 0)
    }
}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Procurement line identifier (free-form, e.g. "SC-2024-0113")
    pub sc_code: String,

    pub project_name: String,

    /// ISO-8601 calendar date (YYYY-MM-DD)
    pub start_date: String,

    pub duration_years: i32,

    /// Write-time snapshot; read paths recompute from start_date + duration_years
    pub end_date: String,

    /// Write-time snapshot ("in_warranty" | "expired"); see end_date
    pub status: String,

    pub remark: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

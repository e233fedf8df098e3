use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A delivery customer and their standing daily order
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    /// Liters delivered each morning unless a variation says otherwise
    pub default_milk_morning: f64,
    /// Liters delivered each evening unless a variation says otherwise
    pub default_milk_evening: f64,
    pub price_per_liter: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daily_variation::Entity")]
    DailyVariations,
}

impl Related<super::daily_variation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyVariations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use base_entity_derive::base_entity;
use sea_orm::entity::prelude::*;

pub const DEFAULT_COLOR: &str = "#007bff";
pub const NAME_MAX_LEN: usize = 100;

#[base_entity(updated_at = "")]
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub color: String,
    #[sea_orm(has_many)]
    pub activities: HasMany<super::activity::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

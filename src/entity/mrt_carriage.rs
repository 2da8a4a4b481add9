use sea_orm::entity::prelude::*;

/// One station row of a congestion snapshot. `to_terminal` and `to_start`
/// keep the raw per-car digit string; `None` means the crawler had no data.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "t_mrt_carriage")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub line_code: String,
    pub line_name: String,
    pub station_code: String,
    pub station_name: String,
    pub to_terminal: Option<String>,
    pub to_start: Option<String>,
    pub timestamp: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

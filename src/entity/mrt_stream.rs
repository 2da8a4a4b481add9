use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "t_mrt_stream")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub count: i64,
    pub timestamp: DateTime,
    pub date: String,
    pub time: String,
    pub weekday: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! Cat entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub tag: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub pfp: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::adoption::Entity")]
    Adoption,
}

impl Related<super::adoption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adoption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for cattery_core::domain::Cat {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            tag: model.tag,
            pfp: model.pfp,
        }
    }
}

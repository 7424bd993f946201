//! Adoption entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "adoptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub cat_id: i32,
    pub adopted_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::cat::Entity",
        from = "Column::CatId",
        to = "super::cat::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Cat,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::cat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for cattery_core::domain::Adoption {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            cat_id: model.cat_id,
            adopted_at: model.adopted_at.into(),
        }
    }
}

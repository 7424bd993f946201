//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use cattery_core::domain::{
    AdoptedCat, Adoption, Cat, CatField, CatPatch, NewCat, NewUser, Session, User,
};
use cattery_core::error::RepoError;
use cattery_core::ports::{AdoptionRepository, CatRepository, SessionRepository, UserRepository};

use super::entity::adoption::{self, Entity as AdoptionEntity};
use super::entity::cat::{self, Entity as CatEntity};
use super::entity::session::{self, Entity as SessionEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL cat repository.
pub type PostgresCatRepository = PostgresBaseRepository<CatEntity>;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL session repository.
pub type PostgresSessionRepository = PostgresBaseRepository<SessionEntity>;

/// PostgreSQL adoption repository.
pub type PostgresAdoptionRepository = PostgresBaseRepository<AdoptionEntity>;

fn cat_column(field: CatField) -> cat::Column {
    match field {
        CatField::Name => cat::Column::Name,
        CatField::Tag => cat::Column::Tag,
        CatField::Pfp => cat::Column::Pfp,
    }
}

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{}***", first),
                _ => "***".to_string(),
            };
            format!("{}@{}", masked_local, domain)
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl CatRepository for PostgresCatRepository {
    async fn list(&self) -> Result<Vec<Cat>, RepoError> {
        let result = CatEntity::find()
            .order_by_asc(cat::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_page(&self, limit: u64, offset: u64) -> Result<Vec<Cat>, RepoError> {
        let result = CatEntity::find()
            .order_by_asc(cat::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        CatEntity::find().count(&self.db).await.map_err(map_db_err)
    }

    async fn insert(&self, new_cat: NewCat) -> Result<Cat, RepoError> {
        let model = cat::ActiveModel {
            name: Set(new_cat.name),
            tag: Set(new_cat.tag),
            pfp: Set(new_cat.pfp),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, patch: &CatPatch) -> Result<(), RepoError> {
        // Columns come from the closed CatField set, values are bound parameters.
        let mut query = CatEntity::update_many();
        for (field, value) in patch.iter() {
            query = query.col_expr(cat_column(field), Expr::value(value.map(str::to_string)));
        }

        let result = query
            .filter(cat::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, RepoError> {
        if let Some(email) = &new_user.email {
            tracing::debug!(user_email = %mask_email(email), "Inserting user");
        }

        let model = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn insert(&self, new_session: Session) -> Result<(), RepoError> {
        SessionEntity::insert(session::ActiveModel::from(new_session))
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn find_with_user(&self, id: &str) -> Result<Option<(Session, User)>, RepoError> {
        let result = SessionEntity::find_by_id(id.to_string())
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(match result {
            Some((session, Some(user))) => Some((session.into(), user.into())),
            _ => None,
        })
    }

    async fn remove(&self, id: &str) -> Result<(), RepoError> {
        SessionEntity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let result = SessionEntity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl AdoptionRepository for PostgresAdoptionRepository {
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<AdoptedCat>, RepoError> {
        let rows = AdoptionEntity::find()
            .filter(adoption::Column::UserId.eq(user_id))
            .find_also_related(CatEntity)
            .order_by_desc(adoption::Column::AdoptedAt)
            .order_by_desc(adoption::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(adoption, cat)| {
                cat.map(|cat| AdoptedCat {
                    adoption: adoption.into(),
                    cat: cat.into(),
                })
            })
            .collect())
    }

    async fn exists(&self, user_id: i32, cat_id: i32) -> Result<bool, RepoError> {
        let count = AdoptionEntity::find()
            .filter(adoption::Column::UserId.eq(user_id))
            .filter(adoption::Column::CatId.eq(cat_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    async fn insert(&self, user_id: i32, cat_id: i32) -> Result<Adoption, RepoError> {
        let model = adoption::ActiveModel {
            user_id: Set(user_id),
            cat_id: Set(cat_id),
            adopted_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn remove(&self, user_id: i32, cat_id: i32) -> Result<(), RepoError> {
        let result = AdoptionEntity::delete_many()
            .filter(adoption::Column::UserId.eq(user_id))
            .filter(adoption::Column::CatId.eq(cat_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

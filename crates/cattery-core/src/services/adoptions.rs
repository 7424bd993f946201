use std::sync::Arc;

use crate::domain::AdoptedCat;
use crate::error::{DomainError, RepoError};
use crate::ports::{AdoptionRepository, CatRepository};

pub struct AdoptionService {
    adoptions: Arc<dyn AdoptionRepository>,
    cats: Arc<dyn CatRepository>,
}

impl AdoptionService {
    pub fn new(adoptions: Arc<dyn AdoptionRepository>, cats: Arc<dyn CatRepository>) -> Self {
        Self { adoptions, cats }
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<AdoptedCat>, DomainError> {
        Ok(self.adoptions.list_for_user(user_id).await?)
    }

    /// Adopt a cat. At most one adoption exists per (user, cat) pair.
    ///
    /// The existence check and the insert are separate statements; the
    /// unique index on the pair turns a lost race into the same conflict.
    pub async fn adopt(&self, user_id: i32, cat_id: i32) -> Result<AdoptedCat, DomainError> {
        if cat_id <= 0 {
            return Err(DomainError::validation("cat_id must be a positive integer"));
        }

        let cat = self
            .cats
            .find_by_id(cat_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Cat",
                id: cat_id,
            })?;

        if self.adoptions.exists(user_id, cat_id).await? {
            return Err(DomainError::Duplicate("Cat already adopted".to_string()));
        }

        let adoption = self
            .adoptions
            .insert(user_id, cat_id)
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => DomainError::Duplicate("Cat already adopted".to_string()),
                other => other.into(),
            })?;

        tracing::info!(user_id, cat_id, adoption_id = adoption.id, "Cat adopted");
        Ok(AdoptedCat { adoption, cat })
    }

    pub async fn release(&self, user_id: i32, cat_id: i32) -> Result<(), DomainError> {
        self.adoptions
            .remove(user_id, cat_id)
            .await
            .map_err(|e| e.or_not_found("Adoption for cat", cat_id))?;
        tracing::info!(user_id, cat_id, "Adoption removed");
        Ok(())
    }
}

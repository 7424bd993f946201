use std::sync::Arc;

use crate::domain::{Cat, CatDraft, CatPatch, PageRequest, Pagination};
use crate::error::DomainError;
use crate::ports::CatRepository;

/// Result of a list call: the whole table, or one page of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatListing {
    All(Vec<Cat>),
    Page {
        cats: Vec<Cat>,
        pagination: Pagination,
    },
}

pub struct CatService {
    repo: Arc<dyn CatRepository>,
    require_tag: bool,
}

impl CatService {
    pub fn new(repo: Arc<dyn CatRepository>, require_tag: bool) -> Self {
        Self { repo, require_tag }
    }

    /// List cats. `None` returns every row; `Some` returns one page plus totals.
    pub async fn list(&self, page: Option<PageRequest>) -> Result<CatListing, DomainError> {
        let Some(page) = page else {
            return Ok(CatListing::All(self.repo.list().await?));
        };

        let total = self.repo.count().await?;
        let cats = if page.offset() >= total {
            Vec::new()
        } else {
            self.repo.list_page(page.limit(), page.offset()).await?
        };

        Ok(CatListing::Page {
            cats,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn get(&self, id: i32) -> Result<Cat, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Cat",
                id,
            })
    }

    pub async fn create(&self, draft: CatDraft) -> Result<Cat, DomainError> {
        let new_cat = draft.validate(self.require_tag)?;
        let cat = self.repo.insert(new_cat).await?;
        tracing::info!(cat_id = cat.id, "Cat created");
        Ok(cat)
    }

    pub async fn update(&self, id: i32, patch: &CatPatch) -> Result<(), DomainError> {
        if patch.is_empty() {
            return Err(DomainError::validation("No valid fields provided for update."));
        }

        self.repo
            .update(id, patch)
            .await
            .map_err(|e| e.or_not_found("Cat", id))?;
        tracing::info!(cat_id = id, fields = patch.len(), "Cat updated");
        Ok(())
    }

    /// Delete a cat. A missing id is reported as `NotFound`.
    pub async fn delete(&self, id: i32) -> Result<(), DomainError> {
        self.repo
            .delete(id)
            .await
            .map_err(|e| e.or_not_found("Cat", id))?;
        tracing::info!(cat_id = id, "Cat deleted");
        Ok(())
    }
}

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use cattery_core::RepoError;
use cattery_core::domain::{AdoptedCat, Adoption, Cat, CatPatch, NewCat, NewUser, Session, User};
use cattery_core::ports::{
    AdoptionRepository, BaseRepository, CatRepository, SessionRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    cats: BTreeMap<i32, Cat>,
    users: BTreeMap<i32, User>,
    sessions: HashMap<String, Session>,
    adoptions: BTreeMap<i32, Adoption>,
    last_cat_id: i32,
    last_user_id: i32,
    last_adoption_id: i32,
}

impl Tables {
    fn cascade_cat(&mut self, cat_id: i32) {
        self.adoptions.retain(|_, a| a.cat_id != cat_id);
    }

    fn cascade_user(&mut self, user_id: i32) {
        self.sessions.retain(|_, s| s.user_id != user_id);
        self.adoptions.retain(|_, a| a.user_id != user_id);
    }
}

/// Shared tables behind one async lock.
///
/// Each accessor hands out a cheap handle implementing one repository port.
/// All handles from the same store see the same data, and deletes cascade the
/// way the database foreign keys do.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cats(&self) -> InMemoryCats {
        InMemoryCats(self.tables.clone())
    }

    pub fn users(&self) -> InMemoryUsers {
        InMemoryUsers(self.tables.clone())
    }

    pub fn sessions(&self) -> InMemorySessions {
        InMemorySessions(self.tables.clone())
    }

    pub fn adoptions(&self) -> InMemoryAdoptions {
        InMemoryAdoptions(self.tables.clone())
    }
}

#[derive(Clone)]
pub struct InMemoryCats(Arc<RwLock<Tables>>);

#[derive(Clone)]
pub struct InMemoryUsers(Arc<RwLock<Tables>>);

#[derive(Clone)]
pub struct InMemorySessions(Arc<RwLock<Tables>>);

#[derive(Clone)]
pub struct InMemoryAdoptions(Arc<RwLock<Tables>>);

#[async_trait]
impl BaseRepository<Cat, i32> for InMemoryCats {
    async fn find_by_id(&self, id: i32) -> Result<Option<Cat>, RepoError> {
        Ok(self.0.read().await.cats.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        tables.cats.remove(&id).ok_or(RepoError::NotFound)?;
        tables.cascade_cat(id);
        Ok(())
    }
}

#[async_trait]
impl CatRepository for InMemoryCats {
    async fn list(&self) -> Result<Vec<Cat>, RepoError> {
        Ok(self.0.read().await.cats.values().cloned().collect())
    }

    async fn list_page(&self, limit: u64, offset: u64) -> Result<Vec<Cat>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables
            .cats
            .values()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.0.read().await.cats.len() as u64)
    }

    async fn insert(&self, cat: NewCat) -> Result<Cat, RepoError> {
        let mut tables = self.0.write().await;
        tables.last_cat_id += 1;
        let cat = Cat {
            id: tables.last_cat_id,
            name: cat.name,
            tag: cat.tag,
            pfp: cat.pfp,
        };
        tables.cats.insert(cat.id, cat.clone());
        Ok(cat)
    }

    async fn update(&self, id: i32, patch: &CatPatch) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        let cat = tables.cats.get_mut(&id).ok_or(RepoError::NotFound)?;
        patch.apply(cat);
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<User, i32> for InMemoryUsers {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.0.read().await.users.get(&id).cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;
        tables.cascade_user(id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.0.write().await;

        let taken = tables.users.values().any(|u| {
            u.username == user.username
                || (user.email.is_some() && u.email.as_deref() == user.email.as_deref())
        });
        if taken {
            return Err(RepoError::Constraint("users: duplicate username or email".into()));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessions {
    async fn insert(&self, session: Session) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        if !tables.users.contains_key(&session.user_id) {
            return Err(RepoError::Query("sessions: user does not exist".into()));
        }
        if tables.sessions.contains_key(&session.id) {
            return Err(RepoError::Constraint("sessions: duplicate id".into()));
        }
        tables.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn find_with_user(&self, id: &str) -> Result<Option<(Session, User)>, RepoError> {
        let tables = self.0.read().await;
        Ok(tables.sessions.get(id).and_then(|session| {
            tables
                .users
                .get(&session.user_id)
                .map(|user| (session.clone(), user.clone()))
        }))
    }

    async fn remove(&self, id: &str) -> Result<(), RepoError> {
        self.0.write().await.sessions.remove(id);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut tables = self.0.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[async_trait]
impl AdoptionRepository for InMemoryAdoptions {
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<AdoptedCat>, RepoError> {
        let tables = self.0.read().await;
        let mut adopted: Vec<AdoptedCat> = tables
            .adoptions
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                tables.cats.get(&a.cat_id).map(|cat| AdoptedCat {
                    adoption: a.clone(),
                    cat: cat.clone(),
                })
            })
            .collect();

        adopted.sort_by(|a, b| {
            b.adoption
                .adopted_at
                .cmp(&a.adoption.adopted_at)
                .then(b.adoption.id.cmp(&a.adoption.id))
        });
        Ok(adopted)
    }

    async fn exists(&self, user_id: i32, cat_id: i32) -> Result<bool, RepoError> {
        let tables = self.0.read().await;
        Ok(tables
            .adoptions
            .values()
            .any(|a| a.user_id == user_id && a.cat_id == cat_id))
    }

    async fn insert(&self, user_id: i32, cat_id: i32) -> Result<Adoption, RepoError> {
        let mut tables = self.0.write().await;

        if !tables.cats.contains_key(&cat_id) || !tables.users.contains_key(&user_id) {
            return Err(RepoError::Query("adoptions: user or cat does not exist".into()));
        }
        if tables
            .adoptions
            .values()
            .any(|a| a.user_id == user_id && a.cat_id == cat_id)
        {
            return Err(RepoError::Constraint("adoptions: duplicate (user_id, cat_id)".into()));
        }

        tables.last_adoption_id += 1;
        let adoption = Adoption {
            id: tables.last_adoption_id,
            user_id,
            cat_id,
            adopted_at: Utc::now(),
        };
        tables.adoptions.insert(adoption.id, adoption.clone());
        Ok(adoption)
    }

    async fn remove(&self, user_id: i32, cat_id: i32) -> Result<(), RepoError> {
        let mut tables = self.0.write().await;
        let id = tables
            .adoptions
            .values()
            .find(|a| a.user_id == user_id && a.cat_id == cat_id)
            .map(|a| a.id)
            .ok_or(RepoError::NotFound)?;
        tables.adoptions.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cattery_core::domain::CatField;
    use chrono::Duration;

    fn new_cat(name: &str) -> NewCat {
        NewCat {
            name: name.to_string(),
            tag: None,
            pfp: None,
        }
    }

    fn new_user(username: &str, email: Option<&str>) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.map(str::to_string),
            password_hash: "$argon2id$test".to_string(),
        }
    }

    #[tokio::test]
    async fn cats_get_sequential_ids_and_keep_order() {
        let store = InMemoryStore::new();
        let cats = store.cats();

        for name in ["Miso", "Tofu", "Nori"] {
            cats.insert(new_cat(name)).await.unwrap();
        }

        let all = cats.list().await.unwrap();
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let page = cats.list_page(2, 1).await.unwrap();
        assert_eq!(page.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["Tofu", "Nori"]);
        assert!(cats.list_page(10, 5).await.unwrap().is_empty());
        assert_eq!(cats.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn cat_ids_are_not_reused_after_delete() {
        let store = InMemoryStore::new();
        let cats = store.cats();

        let first = cats.insert(new_cat("Miso")).await.unwrap();
        cats.delete(first.id).await.unwrap();
        let second = cats.insert(new_cat("Tofu")).await.unwrap();

        assert_eq!(second.id, first.id + 1);
        assert!(matches!(cats.delete(first.id).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn cat_update_applies_patch_or_reports_missing() {
        let store = InMemoryStore::new();
        let cats = store.cats();
        let cat = cats.insert(new_cat("Miso")).await.unwrap();

        let patch = CatPatch::new().set(CatField::Tag, Some("orange".into())).unwrap();
        cats.update(cat.id, &patch).await.unwrap();

        let stored = cats.find_by_id(cat.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Miso");
        assert_eq!(stored.tag.as_deref(), Some("orange"));

        assert!(matches!(cats.update(999, &patch).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn users_enforce_unique_username_and_email() {
        let store = InMemoryStore::new();
        let users = store.users();

        users.insert(new_user("alice", Some("alice@example.com"))).await.unwrap();
        users.insert(new_user("bob", None)).await.unwrap();
        users.insert(new_user("carol", None)).await.unwrap();

        assert!(matches!(
            users.insert(new_user("alice", None)).await,
            Err(RepoError::Constraint(_))
        ));
        assert!(matches!(
            users.insert(new_user("dave", Some("alice@example.com"))).await,
            Err(RepoError::Constraint(_))
        ));

        let found = users.find_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(users.find_by_username("carol").await.unwrap().is_some());
        assert!(users.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_join_user_and_purge_expired() {
        let store = InMemoryStore::new();
        let user = store.users().insert(new_user("alice", None)).await.unwrap();
        let sessions = store.sessions();

        sessions
            .insert(Session::new("live".into(), user.id, Duration::days(7)))
            .await
            .unwrap();
        sessions
            .insert(Session::new("stale".into(), user.id, Duration::seconds(-1)))
            .await
            .unwrap();

        let (session, owner) = sessions.find_with_user("live").await.unwrap().unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(owner.username, "alice");

        assert_eq!(sessions.purge_expired(Utc::now()).await.unwrap(), 1);
        assert!(sessions.find_with_user("stale").await.unwrap().is_none());

        sessions.remove("live").await.unwrap();
        sessions.remove("live").await.unwrap();
        assert!(sessions.find_with_user("live").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn adoptions_are_unique_per_user_and_cascade_with_cat() {
        let store = InMemoryStore::new();
        let user = store.users().insert(new_user("alice", None)).await.unwrap();
        let cats = store.cats();
        let miso = cats.insert(new_cat("Miso")).await.unwrap();
        let tofu = cats.insert(new_cat("Tofu")).await.unwrap();
        let adoptions = store.adoptions();

        adoptions.insert(user.id, miso.id).await.unwrap();
        adoptions.insert(user.id, tofu.id).await.unwrap();
        assert!(matches!(
            adoptions.insert(user.id, miso.id).await,
            Err(RepoError::Constraint(_))
        ));

        let listed = adoptions.list_for_user(user.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].cat.name, "Tofu");

        cats.delete(miso.id).await.unwrap();
        assert!(!adoptions.exists(user.id, miso.id).await.unwrap());
        assert_eq!(adoptions.list_for_user(user.id).await.unwrap().len(), 1);

        adoptions.remove(user.id, tofu.id).await.unwrap();
        assert!(matches!(
            adoptions.remove(user.id, tofu.id).await,
            Err(RepoError::NotFound)
        ));
    }
}

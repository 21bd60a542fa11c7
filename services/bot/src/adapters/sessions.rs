//! services/bot/src/adapters/sessions.rs
//!
//! In-memory implementation of the `SessionStore` port. Sessions live until
//! an explicit logout or process restart; there is no TTL.

use async_trait::async_trait;
use std::collections::HashMap;
use studygate_core::domain::{StudentProfile, UserId};
use studygate_core::ports::SessionStore;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemorySessions {
    inner: RwLock<HashMap<UserId, StudentProfile>>,
}

impl InMemorySessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessions {
    async fn put(&self, user: UserId, profile: StudentProfile) {
        self.inner.write().await.insert(user, profile);
    }

    async fn get(&self, user: UserId) -> Option<StudentProfile> {
        self.inner.read().await.get(&user).cloned()
    }

    async fn remove(&self, user: UserId) {
        self.inner.write().await.remove(&user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> StudentProfile {
        StudentProfile {
            name: name.to_string(),
            email: "a@b.c".to_string(),
            study_group: "1".to_string(),
            national_id: None,
            mobile: None,
            platform_username: None,
        }
    }

    #[tokio::test]
    async fn put_get_remove_lifecycle() {
        let store = InMemorySessions::new();
        let user = UserId(7);
        assert!(store.get(user).await.is_none());

        store.put(user, profile("Ahmed")).await;
        assert_eq!(store.get(user).await.unwrap().name, "Ahmed");

        // Re-login overwrites.
        store.put(user, profile("Ahmed Ali")).await;
        assert_eq!(store.get(user).await.unwrap().name, "Ahmed Ali");

        store.remove(user).await;
        assert!(store.get(user).await.is_none());
    }
}

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::repo::OnboardingStore;
use super::repo_types::OnboardingProfile;

/// Process-local store behind `AppState::fake()`.
#[derive(Default)]
pub struct InMemoryOnboardingStore {
    profiles: RwLock<HashMap<Uuid, OnboardingProfile>>,
}

impl InMemoryOnboardingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, profile: OnboardingProfile) {
        if let Ok(mut map) = self.profiles.write() {
            map.insert(profile.user_id, profile);
        }
    }
}

#[async_trait]
impl OnboardingStore for InMemoryOnboardingStore {
    async fn get_user_onboarding_profile(
        &self,
        user_id: Uuid,
    ) -> anyhow::Result<Option<OnboardingProfile>> {
        let map = self
            .profiles
            .read()
            .map_err(|_| anyhow::anyhow!("onboarding store lock poisoned"))?;
        Ok(map.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod memory_store_tests {
    use super::*;

    #[tokio::test]
    async fn absent_profile_is_none() {
        let store = InMemoryOnboardingStore::new();
        let got = store.get_user_onboarding_profile(Uuid::new_v4()).await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_previous_profile() {
        let store = InMemoryOnboardingStore::new();
        let user_id = Uuid::new_v4();
        store.upsert(OnboardingProfile {
            user_id,
            allergies: vec!["soy".into()],
            ..Default::default()
        });
        store.upsert(OnboardingProfile {
            user_id,
            allergies: vec!["egg".into()],
            ..Default::default()
        });
        let got = store.get_user_onboarding_profile(user_id).await.unwrap().unwrap();
        assert_eq!(got.allergies, vec!["egg".to_string()]);
    }
}

#[cfg(test)]
mod memory;
pub mod repo;
pub mod repo_types;

#[cfg(test)]
pub use memory::InMemoryOnboardingStore;
pub use repo::{OnboardingStore, PgOnboardingStore};
pub use repo_types::OnboardingProfile;

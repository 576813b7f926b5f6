use thiserror::Error;
use uuid::Uuid;

/// Failure classes of a gated generation request. None are retried here.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("missing profile: user {user_id} has no onboarding profile")]
    ProfileMissing { user_id: Uuid },

    #[error("profile lookup failed for user {user_id}: {source}")]
    ProfileLookup {
        user_id: Uuid,
        #[source]
        source: anyhow::Error,
    },

    #[error("generator failure for user {user_id}: {source}")]
    GeneratorFailure {
        user_id: Uuid,
        #[source]
        source: anyhow::Error,
    },

    #[error(
        "compliance breach: ingredient {ingredient:?} matches excluded {excluded:?} for user {user_id}"
    )]
    ComplianceBreach {
        user_id: Uuid,
        ingredient: String,
        excluded: String,
    },
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProfileMissing { .. } => "profile_missing",
            Self::ProfileLookup { .. } => "profile_lookup",
            Self::GeneratorFailure { .. } => "generator_failure",
            Self::ComplianceBreach { .. } => "compliance_breach",
        }
    }
}

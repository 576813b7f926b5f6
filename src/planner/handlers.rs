use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, instrument, warn};

use crate::{auth::services::AuthUser, state::AppState};

use super::constraints::{resolve_constraints, GeneratorOverrides, ResolvedConstraints};
use super::dto::GenerateMealsResponse;
use super::errors::GenerationError;
use super::gate::generate_with_constraints;

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans/constraints", get(get_constraints))
        .route("/meal-plans/generate", post(generate_meals))
}

#[instrument(skip(state))]
pub async fn get_constraints(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ResolvedConstraints>, (StatusCode, String)> {
    let constraints = resolve_constraints(state.onboarding.as_ref(), user_id, None)
        .await
        .map_err(into_http)?;
    Ok(Json(constraints))
}

/// POST /meal-plans/generate { diet?, include?, exclude?, servings?, calories_target? }
#[instrument(skip(state, overrides))]
pub async fn generate_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(overrides): Json<GeneratorOverrides>,
) -> Result<Json<GenerateMealsResponse>, (StatusCode, String)> {
    let gated = generate_with_constraints(
        state.onboarding.as_ref(),
        user_id,
        Some(&overrides),
        state.generator.as_ref(),
    )
    .await
    .map_err(into_http)?;

    Ok(Json(GenerateMealsResponse {
        constraints: gated.constraints,
        meals: gated.meals,
        generated_at: OffsetDateTime::now_utc(),
    }))
}

fn into_http(e: GenerationError) -> (StatusCode, String) {
    let kind = e.kind();
    match &e {
        GenerationError::ProfileMissing { user_id } => {
            warn!(%user_id, kind, "onboarding profile missing");
            (StatusCode::NOT_FOUND, "onboarding profile required".into())
        }
        GenerationError::ProfileLookup { user_id, .. } => {
            error!(error = %e, %user_id, kind, "profile lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "profile lookup failed".into())
        }
        GenerationError::GeneratorFailure { user_id, .. } => {
            error!(error = %e, %user_id, kind, "meal generation failed");
            (StatusCode::BAD_GATEWAY, "meal generation failed, try again".into())
        }
        GenerationError::ComplianceBreach { user_id, ingredient, .. } => {
            error!(
                error = %e,
                %user_id,
                %ingredient,
                kind,
                "generated meal violated exclusions"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "meal generation rejected".into())
        }
    }
}

#[cfg(test)]
mod plan_handler_tests {
    use super::*;
    use crate::onboarding::OnboardingProfile;
    use uuid::Uuid;

    #[tokio::test]
    async fn generate_for_onboarded_user() {
        let (state, store) = AppState::fake();
        let user_id = Uuid::new_v4();
        store.upsert(OnboardingProfile {
            user_id,
            preferred_diets: vec!["Vegan".into()],
            allergies: vec!["sesame".into()],
            ..Default::default()
        });
        let overrides = GeneratorOverrides {
            servings: Some(2),
            ..Default::default()
        };
        let Json(resp) = generate_meals(State(state), AuthUser(user_id), Json(overrides))
            .await
            .expect("generation should succeed");
        assert_eq!(resp.constraints.diet, "vegan");
        assert_eq!(resp.constraints.servings, 2);
        assert!(!resp.meals.is_empty());
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["generated_at"].is_string());
        assert!(json["meals"][0]["badges"].is_array());
    }

    #[tokio::test]
    async fn missing_profile_maps_to_not_found() {
        let (state, _store) = AppState::fake();
        let err = generate_meals(
            State(state),
            AuthUser(Uuid::new_v4()),
            Json(GeneratorOverrides::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn constraints_endpoint_returns_resolved_profile() {
        let (state, store) = AppState::fake();
        let user_id = Uuid::new_v4();
        store.upsert(OnboardingProfile {
            user_id,
            calories_target: Some(2200),
            ..Default::default()
        });
        let Json(c) = get_constraints(State(state), AuthUser(user_id)).await.unwrap();
        assert_eq!(c.diet, "balanced");
        assert_eq!(c.macro_targets.unwrap().calories, Some(2200));
    }

    #[test]
    fn profile_lookup_is_internal_error() {
        let (status, body) = into_http(GenerationError::ProfileLookup {
            user_id: Uuid::new_v4(),
            source: anyhow::anyhow!("pool timed out"),
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "profile lookup failed");
    }

    #[test]
    fn generator_failure_is_bad_gateway() {
        let (status, _) = into_http(GenerationError::GeneratorFailure {
            user_id: Uuid::new_v4(),
            source: anyhow::anyhow!("model timed out"),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn compliance_breach_is_internal_error() {
        let (status, body) = into_http(GenerationError::ComplianceBreach {
            user_id: Uuid::new_v4(),
            ingredient: "peanut butter".into(),
            excluded: "peanut".into(),
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("peanut"));
    }
}

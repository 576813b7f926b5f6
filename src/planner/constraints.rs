use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::errors::GenerationError;
use super::strings::{merge_arrays_unique, merge_names, normalize_name};
use crate::onboarding::{OnboardingProfile, OnboardingStore};

pub const DEFAULT_DIET: &str = "balanced";

/// Per-call adjustments. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOverrides {
    pub diet: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub servings: Option<u32>,
    pub calories_target: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub calories: Option<i32>,
    pub protein_g: Option<i32>,
    pub carbs_g: Option<i32>,
    pub fat_g: Option<i32>,
}

/// The single value every generator consumes. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConstraints {
    pub user_id: Uuid,
    pub diet: String,
    pub include: Vec<String>,
    /// Always a superset of `allergies`.
    pub exclude: Vec<String>,
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    pub low_glycemic: bool,
    pub sweetener_preference: Option<String>,
    pub macro_targets: Option<MacroTargets>,
    pub servings: u32,
}

impl ResolvedConstraints {
    pub fn has_condition(&self, condition: &str) -> bool {
        let wanted = normalize_name(condition);
        self.conditions.iter().any(|c| *c == wanted)
    }
}

/// Loads the user's onboarding profile and folds `overrides` into it.
pub async fn resolve_constraints(
    store: &dyn OnboardingStore,
    user_id: Uuid,
    overrides: Option<&GeneratorOverrides>,
) -> Result<ResolvedConstraints, GenerationError> {
    let profile = store
        .get_user_onboarding_profile(user_id)
        .await
        .map_err(|source| GenerationError::ProfileLookup { user_id, source })?
        .ok_or(GenerationError::ProfileMissing { user_id })?;

    let resolved = merge_constraints(user_id, &profile, overrides);
    debug!(
        user_id = %user_id,
        diet = %resolved.diet,
        excludes = resolved.exclude.len(),
        includes = resolved.include.len(),
        "constraints resolved"
    );
    Ok(resolved)
}

/// Pure merge of a stored profile with optional overrides.
pub fn merge_constraints(
    user_id: Uuid,
    profile: &OnboardingProfile,
    overrides: Option<&GeneratorOverrides>,
) -> ResolvedConstraints {
    let empty = GeneratorOverrides::default();
    let ov = overrides.unwrap_or(&empty);

    let diet = ov
        .diet
        .as_deref()
        .map(normalize_name)
        .filter(|d| !d.is_empty())
        .or_else(|| {
            profile
                .preferred_diets
                .first()
                .map(|d| normalize_name(d))
                .filter(|d| !d.is_empty())
        })
        .unwrap_or_else(|| DEFAULT_DIET.to_string());

    let include: Vec<String> = merge_arrays_unique([ov
        .include
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()]);

    let allergies = merge_names([&profile.allergies]);
    let exclude = merge_names([
        &profile.disallowed_ingredients,
        &profile.allergies,
        &ov.exclude,
    ]);
    let conditions = merge_names([&profile.health_conditions]);

    let calories = ov.calories_target.or(profile.calories_target);
    let macro_targets = if calories.is_some()
        || profile.protein_target_g.is_some()
        || profile.carbs_target_g.is_some()
        || profile.fat_target_g.is_some()
    {
        Some(MacroTargets {
            calories,
            protein_g: profile.protein_target_g,
            carbs_g: profile.carbs_target_g,
            fat_g: profile.fat_target_g,
        })
    } else {
        None
    };

    ResolvedConstraints {
        user_id,
        diet,
        include,
        exclude,
        allergies,
        conditions,
        low_glycemic: profile.low_glycemic,
        sweetener_preference: profile.sweetener_preference.clone(),
        macro_targets,
        servings: ov.servings.filter(|s| *s > 0).unwrap_or(1),
    }
}

#[cfg(test)]
mod constraints_tests {
    use super::*;
    use crate::onboarding::InMemoryOnboardingStore;
    use async_trait::async_trait;

    struct UnreachableStore;

    #[async_trait]
    impl OnboardingStore for UnreachableStore {
        async fn get_user_onboarding_profile(
            &self,
            _user_id: Uuid,
        ) -> anyhow::Result<Option<OnboardingProfile>> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn profile(user_id: Uuid) -> OnboardingProfile {
        OnboardingProfile {
            user_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_profile_is_fatal() {
        let store = InMemoryOnboardingStore::new();
        let err = resolve_constraints(&store, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::ProfileMissing { .. }));
        assert!(err.to_string().contains("missing profile"));
    }

    #[tokio::test]
    async fn store_failure_is_a_lookup_error_not_missing() {
        let id = Uuid::new_v4();
        let err = resolve_constraints(&UnreachableStore, id, None)
            .await
            .unwrap_err();
        match &err {
            GenerationError::ProfileLookup { user_id, source } => {
                assert_eq!(*user_id, id);
                assert!(source.to_string().contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), "profile_lookup");
    }

    #[test]
    fn diet_defaults_to_balanced() {
        let id = Uuid::new_v4();
        let c = merge_constraints(id, &profile(id), None);
        assert_eq!(c.diet, "balanced");
        assert_eq!(c.servings, 1);
        assert!(c.macro_targets.is_none());
    }

    #[test]
    fn diet_override_beats_profile_preference() {
        let id = Uuid::new_v4();
        let p = OnboardingProfile {
            preferred_diets: vec!["Keto".into(), "paleo".into()],
            ..profile(id)
        };
        assert_eq!(merge_constraints(id, &p, None).diet, "keto");

        let ov = GeneratorOverrides {
            diet: Some(" Vegan ".into()),
            ..Default::default()
        };
        assert_eq!(merge_constraints(id, &p, Some(&ov)).diet, "vegan");
    }

    #[test]
    fn includes_come_only_from_overrides() {
        let id = Uuid::new_v4();
        let p = OnboardingProfile {
            preferred_diets: vec!["vegan".into()],
            disallowed_ingredients: vec!["beef".into()],
            ..profile(id)
        };
        let ov = GeneratorOverrides {
            include: vec!["Lentils".into(), "lentils ".into(), "Kale".into()],
            ..Default::default()
        };
        let c = merge_constraints(id, &p, Some(&ov));
        assert_eq!(c.include, vec!["Lentils".to_string(), "Kale".to_string()]);
        assert!(merge_constraints(id, &p, None).include.is_empty());
    }

    #[test]
    fn exclude_is_normalized_union() {
        let id = Uuid::new_v4();
        let p = OnboardingProfile {
            disallowed_ingredients: vec!["Pork".into(), "peanut".into()],
            allergies: vec!["PEANUT".into(), "Sesame".into()],
            ..profile(id)
        };
        let ov = GeneratorOverrides {
            exclude: vec!["shellfish".into(), "pork ".into()],
            ..Default::default()
        };
        let c = merge_constraints(id, &p, Some(&ov));
        assert_eq!(c.exclude, vec!["pork", "peanut", "sesame", "shellfish"]);
        assert_eq!(c.allergies, vec!["peanut", "sesame"]);
    }

    #[test]
    fn allergies_survive_any_override() {
        let id = Uuid::new_v4();
        let p = OnboardingProfile {
            allergies: vec!["Soy".into(), " Egg".into()],
            ..profile(id)
        };
        let overrides = [
            GeneratorOverrides::default(),
            GeneratorOverrides {
                exclude: vec![],
                include: vec!["soy".into(), "egg".into()],
                ..Default::default()
            },
            GeneratorOverrides {
                diet: Some("vegan".into()),
                exclude: vec!["SOY".into(), "milk".into()],
                ..Default::default()
            },
        ];
        for ov in &overrides {
            let c = merge_constraints(id, &p, Some(ov));
            for allergy in &c.allergies {
                assert!(c.exclude.contains(allergy), "{allergy} missing from {:?}", c.exclude);
            }
            assert!(c.exclude.contains(&"soy".to_string()));
            assert!(c.exclude.contains(&"egg".to_string()));
        }
    }

    #[test]
    fn override_calories_win_and_macros_come_from_profile() {
        let id = Uuid::new_v4();
        let p = OnboardingProfile {
            calories_target: Some(2000),
            protein_target_g: Some(140),
            ..profile(id)
        };
        let ov = GeneratorOverrides {
            calories_target: Some(1600),
            ..Default::default()
        };
        let c = merge_constraints(id, &p, Some(&ov));
        let macros = c.macro_targets.unwrap();
        assert_eq!(macros.calories, Some(1600));
        assert_eq!(macros.protein_g, Some(140));
        assert_eq!(macros.carbs_g, None);
    }

    #[test]
    fn override_calories_alone_creates_targets() {
        let id = Uuid::new_v4();
        let ov = GeneratorOverrides {
            calories_target: Some(1800),
            servings: Some(4),
            ..Default::default()
        };
        let c = merge_constraints(id, &profile(id), Some(&ov));
        assert_eq!(c.macro_targets.unwrap().calories, Some(1800));
        assert_eq!(c.servings, 4);
    }

    #[tokio::test]
    async fn resolving_twice_is_idempotent() {
        let store = InMemoryOnboardingStore::new();
        let id = Uuid::new_v4();
        store.upsert(OnboardingProfile {
            preferred_diets: vec!["mediterranean".into()],
            allergies: vec!["Shellfish".into()],
            health_conditions: vec!["type2_diabetes".into()],
            calories_target: Some(2100),
            ..profile(id)
        });
        let ov = GeneratorOverrides {
            include: vec!["salmon".into()],
            exclude: vec!["lamb".into()],
            ..Default::default()
        };
        let first = resolve_constraints(&store, id, Some(&ov)).await.unwrap();
        let second = resolve_constraints(&store, id, Some(&ov)).await.unwrap();
        assert_eq!(first, second);
        assert!(first.has_condition("Type2_Diabetes"));
    }

    #[tokio::test]
    async fn profile_edits_apply_on_next_call() {
        let store = InMemoryOnboardingStore::new();
        let id = Uuid::new_v4();
        store.upsert(profile(id));
        let before = resolve_constraints(&store, id, None).await.unwrap();
        store.upsert(OnboardingProfile {
            allergies: vec!["milk".into()],
            ..profile(id)
        });
        let after = resolve_constraints(&store, id, None).await.unwrap();
        assert!(before.exclude.is_empty());
        assert_eq!(after.exclude, vec!["milk"]);
    }
}

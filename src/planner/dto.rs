use serde::Serialize;
use time::OffsetDateTime;

use super::constraints::ResolvedConstraints;
use super::meal::Meal;

#[derive(Debug, Serialize)]
pub struct GenerateMealsResponse {
    pub constraints: ResolvedConstraints,
    pub meals: Vec<Meal>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

//! Adapters from loosely-typed meal routines to [`MealGenerator`].
//!
//! Field coalescing precedence (first present key wins):
//!
//! | canonical     | accepted keys                                         |
//! |---------------|-------------------------------------------------------|
//! | meal list     | root array, `meals`, `plan.meals`, single meal object |
//! | title         | `title`, `name`, `meal_name`, `mealName`              |
//! | ingredients   | `ingredients`, `items`, `components`                  |
//! | ingr. name    | `name`, `ingredient`, `item`, `food`                  |
//! | ingr. qty     | `quantity`, `qty`, `amount`                           |
//! | ingr. unit    | `unit`, `units`, `measure`                            |
//! | instructions  | `instructions`, `steps`, `directions`, `method`       |
//! | nutrition     | `nutrition`, `macros`, `nutrients`, else the meal     |
//!
//! A string root is treated as model output and the first JSON document in it
//! (fenced or bare) is parsed.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use super::constraints::ResolvedConstraints;
use super::gate::{find_excluded, MealGenerator};
use super::meal::{Ingredient, Meal, NutritionSummary};
use super::staples::staple_meals;

const TITLE_KEYS: &[&str] = &["title", "name", "meal_name", "mealName"];
const INGREDIENTS_KEYS: &[&str] = &["ingredients", "items", "components"];
const INGREDIENT_NAME_KEYS: &[&str] = &["name", "ingredient", "item", "food"];
const QUANTITY_KEYS: &[&str] = &["quantity", "qty", "amount"];
const UNIT_KEYS: &[&str] = &["unit", "units", "measure"];
const STEPS_KEYS: &[&str] = &["instructions", "steps", "directions", "method"];
const NUTRITION_KEYS: &[&str] = &["nutrition", "macros", "nutrients"];
const CALORIES_KEYS: &[&str] = &["calories", "kcal", "energy"];
const PROTEIN_KEYS: &[&str] = &["protein", "protein_g"];
const CARBS_KEYS: &[&str] = &["carbs", "carbohydrates", "carbs_g"];
const FAT_KEYS: &[&str] = &["fat", "fat_g"];

const UNTITLED: &str = "Untitled meal";

lazy_static! {
    static ref FENCED_JSON: Regex = Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap();
    static ref QUANTITY: Regex =
        Regex::new(r"^\s*(\d+\s+\d+/\d+|\d+/\d+|\d+(?:\.\d+)?)\s*([A-Za-z]+)?\.?\s*$").unwrap();
    static ref INGREDIENT_LINE: Regex = Regex::new(
        r"(?i)^\s*(\d+\s+\d+/\d+|\d+/\d+|\d+(?:\.\d+)?)\s*(?:(kg|kilograms?|mg|g|grams?|ml|l|liters?|litres?|cups?|tbsps?|tablespoons?|tsps?|teaspoons?|oz|ounces?|lbs?|pounds?|cloves?|slices?|pieces?|cans?|pinch(?:es)?|handfuls?)\b\.?\s+)?(?:of\s+)?(.+?)\s*$"
    )
    .unwrap();
    static ref STEP_NUMBER: Regex = Regex::new(r"(?i)^\s*(?:step\s*)?\d+\s*[.):-]\s*").unwrap();
}

/// A pre-existing routine that speaks JSON in and JSON (or model text) out.
#[async_trait]
pub trait JsonMealSource: Send + Sync {
    fn name(&self) -> &str;
    async fn produce(&self, request: &Value) -> anyhow::Result<Value>;
}

/// Wraps a [`JsonMealSource`]. Never fails: unusable output degrades to a
/// fallback meal built from the include list or a diet staple plate.
pub struct JsonMealAdapter<S> {
    source: S,
}

impl<S: JsonMealSource> JsonMealAdapter<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: JsonMealSource> MealGenerator for JsonMealAdapter<S> {
    async fn generate(&self, constraints: &ResolvedConstraints) -> anyhow::Result<Vec<Meal>> {
        let request = source_request(constraints);
        let meals = match self.source.produce(&request).await {
            Ok(raw) => coerce_meals(&raw),
            Err(e) => {
                warn!(
                    source = self.source.name(),
                    user_id = %constraints.user_id,
                    error = %e,
                    "meal source failed"
                );
                Vec::new()
            }
        };

        let meals = drop_excluded(meals, &constraints.exclude, constraints.user_id);
        if meals.is_empty() {
            warn!(
                source = self.source.name(),
                user_id = %constraints.user_id,
                "no usable meals; serving fallback"
            );
            return Ok(vec![fallback_meal(constraints)]);
        }
        debug!(source = self.source.name(), meals = meals.len(), "source meals adapted");
        Ok(meals)
    }
}

/// Request document handed to legacy sources.
pub fn source_request(c: &ResolvedConstraints) -> Value {
    let macros = c.macro_targets.as_ref();
    json!({
        "diet": c.diet,
        "include": c.include,
        "exclude": c.exclude,
        "allergies": c.allergies,
        "conditions": c.conditions,
        "low_glycemic": c.low_glycemic,
        "sweetener": c.sweetener_preference,
        "servings": c.servings,
        "calories": macros.and_then(|m| m.calories),
        "protein": macros.and_then(|m| m.protein_g),
        "carbs": macros.and_then(|m| m.carbs_g),
        "fat": macros.and_then(|m| m.fat_g),
    })
}

/// Single degraded meal made of the compliant include list. Without usable
/// includes it is the first diet staple plate that still has ingredients once
/// excluded items are removed.
pub fn fallback_meal(c: &ResolvedConstraints) -> Meal {
    let compliant = |name: &str| find_excluded(name, &c.exclude).is_none();
    let ingredients: Vec<Ingredient> = c
        .include
        .iter()
        .filter(|name| compliant(name.as_str()))
        .map(|name| Ingredient::new(name.clone(), c.servings as f64, Some("serving")))
        .collect();

    if ingredients.is_empty() {
        let staple = staple_meals(&c.diet, c.servings as f64)
            .into_iter()
            .find_map(|mut meal| {
                meal.ingredients.retain(|i| compliant(i.name.as_str()));
                (!meal.ingredients.is_empty()).then_some(meal)
            });
        if let Some(meal) = staple {
            return meal;
        }
    }

    let mut meal = Meal::new(format!("{} plate", capitalize(&c.diet)), ingredients);
    meal.instructions = vec!["Prepare each ingredient simply and serve together.".to_string()];
    meal
}

fn drop_excluded(meals: Vec<Meal>, exclude: &[String], user_id: Uuid) -> Vec<Meal> {
    meals
        .into_iter()
        .filter_map(|mut meal| {
            meal.ingredients.retain(|i| match find_excluded(&i.name, exclude) {
                Some(term) => {
                    warn!(user_id = %user_id, ingredient = %i.name, excluded = %term, meal = %meal.title, "dropping excluded ingredient");
                    false
                }
                None => true,
            });
            (!meal.ingredients.is_empty()).then_some(meal)
        })
        .collect()
}

/// Best-effort conversion of any supported shape into canonical meals.
pub fn coerce_meals(raw: &Value) -> Vec<Meal> {
    meal_values(raw).iter().filter_map(coerce_meal).collect()
}

fn meal_values(raw: &Value) -> Vec<Value> {
    match raw {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get("meals") {
                return items.clone();
            }
            if let Some(Value::Array(items)) = map.get("plan").and_then(|p| p.get("meals")) {
                return items.clone();
            }
            if first_present(map, TITLE_KEYS).is_some()
                || first_present(map, INGREDIENTS_KEYS).is_some()
            {
                return vec![raw.clone()];
            }
            Vec::new()
        }
        Value::String(text) => extract_json(text)
            .map(|v| meal_values(&v))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// First JSON document in free text: fenced block, whole text, or outermost braces.
pub fn extract_json(text: &str) -> Option<Value> {
    if let Some(caps) = FENCED_JSON.captures(text) {
        if let Ok(v) = serde_json::from_str(caps[1].trim()) {
            return Some(v);
        }
    }
    let trimmed = text.trim();
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        if !v.is_string() {
            return Some(v);
        }
    }
    let start = trimmed.find(['{', '['])?;
    let end = trimmed.rfind(['}', ']'])?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

fn coerce_meal(v: &Value) -> Option<Meal> {
    let map = v.as_object()?;
    let title = first_present(map, TITLE_KEYS)
        .and_then(scalar_text)
        .unwrap_or_else(|| UNTITLED.to_string());

    let ingredients = match first_present(map, INGREDIENTS_KEYS) {
        Some(Value::Array(items)) => items.iter().filter_map(coerce_ingredient).collect(),
        Some(Value::String(text)) => text
            .split(['\n', ','])
            .filter_map(parse_ingredient_line)
            .collect(),
        _ => Vec::new(),
    };

    let instructions = match first_present(map, STEPS_KEYS) {
        Some(Value::Array(steps)) => steps.iter().filter_map(step_text).collect(),
        Some(Value::String(text)) => text.lines().filter_map(clean_step).collect(),
        _ => Vec::new(),
    };

    let nutrition = match first_present(map, NUTRITION_KEYS) {
        Some(Value::Object(n)) => coerce_nutrition(n),
        _ => coerce_nutrition(map),
    };

    Some(Meal {
        title,
        ingredients,
        instructions,
        nutrition,
        badges: Vec::new(),
    })
}

fn coerce_ingredient(v: &Value) -> Option<Ingredient> {
    let map = match v {
        Value::Object(map) => map,
        other => return scalar_text(other).as_deref().and_then(parse_ingredient_line),
    };
    let name = first_present(map, INGREDIENT_NAME_KEYS).and_then(scalar_text)?;

    let (quantity, qty_unit) = match first_present(map, QUANTITY_KEYS) {
        Some(Value::Number(n)) => (n.as_f64(), None),
        Some(Value::String(s)) => parse_quantity(s).map_or((None, None), |(q, u)| (Some(q), u)),
        _ => (None, None),
    };
    let unit = first_present(map, UNIT_KEYS)
        .and_then(scalar_text)
        .or(qty_unit);

    Some(Ingredient {
        name,
        quantity: sane_quantity(quantity),
        unit,
    })
}

/// Parses "1 1/2 cups rolled oats" style lines. Lines without a leading
/// number become a single unit of the whole text.
pub fn parse_ingredient_line(line: &str) -> Option<Ingredient> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match INGREDIENT_LINE.captures(line) {
        Some(caps) => Some(Ingredient {
            name: caps[3].to_string(),
            quantity: sane_quantity(parse_number(&caps[1])),
            unit: caps.get(2).map(|u| u.as_str().to_lowercase()),
        }),
        None => Some(Ingredient::new(line, 1.0, None)),
    }
}

fn parse_quantity(text: &str) -> Option<(f64, Option<String>)> {
    let caps = QUANTITY.captures(text)?;
    let qty = parse_number(&caps[1])?;
    Some((qty, caps.get(2).map(|u| u.as_str().to_lowercase())))
}

fn parse_number(s: &str) -> Option<f64> {
    let mut total = 0.0;
    for part in s.split_whitespace() {
        total += match part.split_once('/') {
            Some((num, den)) => {
                let den: f64 = den.parse().ok()?;
                if den == 0.0 {
                    return None;
                }
                num.parse::<f64>().ok()? / den
            }
            None => part.parse::<f64>().ok()?,
        };
    }
    Some(total)
}

fn sane_quantity(q: Option<f64>) -> f64 {
    q.filter(|q| q.is_finite() && *q > 0.0).unwrap_or(1.0)
}

fn step_text(v: &Value) -> Option<String> {
    let text = match v {
        Value::Object(map) => first_present(map, &["text", "step", "instruction"]).and_then(scalar_text)?,
        other => scalar_text(other)?,
    };
    clean_step(&text)
}

pub(super) fn clean_step(line: &str) -> Option<String> {
    let step = STEP_NUMBER.replace(line, "");
    let step = step.trim();
    (!step.is_empty()).then(|| step.to_string())
}

fn coerce_nutrition(map: &Map<String, Value>) -> Option<NutritionSummary> {
    let n = NutritionSummary {
        calories: first_number(map, CALORIES_KEYS),
        protein_g: first_number(map, PROTEIN_KEYS),
        carbs_g: first_number(map, CARBS_KEYS),
        fat_g: first_number(map, FAT_KEYS),
    };
    (n != NutritionSummary::default()).then_some(n)
}

fn first_number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    match first_present(map, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_quantity(s).map(|(q, _)| q),
        _ => None,
    }
}

fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

/// Text of a scalar; numbers and booleans are stringified, blanks dropped.
fn scalar_text(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

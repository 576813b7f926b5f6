use async_trait::async_trait;
use serde_json::{json, Value};

use super::adapters::{clean_step, JsonMealSource};
use super::constraints::DEFAULT_DIET;
use super::meal::{Ingredient, Meal};

struct Plate {
    name: &'static str,
    items: &'static [(&'static str, f64, &'static str)],
    steps: &'static str,
}

const BALANCED: &[Plate] = &[
    Plate {
        name: "Chicken, rice and greens",
        items: &[("chicken breast", 150.0, "g"), ("brown rice", 75.0, "g"), ("broccoli", 120.0, "g"), ("olive oil", 1.0, "tbsp")],
        steps: "1. Cook the rice.\n2. Season and pan-sear the chicken in olive oil.\n3. Steam the broccoli and plate everything together.",
    },
    Plate {
        name: "Salmon and sweet potato",
        items: &[("salmon fillet", 140.0, "g"), ("sweet potato", 200.0, "g"), ("spinach", 60.0, "g"), ("lemon", 0.5, "piece")],
        steps: "1. Roast the sweet potato.\n2. Bake the salmon with lemon.\n3. Wilt the spinach and serve.",
    },
    Plate {
        name: "Turkey and bean bowl",
        items: &[("lean ground turkey", 120.0, "g"), ("black beans", 100.0, "g"), ("bell pepper", 1.0, "piece"), ("tomato", 1.0, "piece")],
        steps: "1. Brown the turkey.\n2. Add peppers, tomato and beans.\n3. Simmer until thick.",
    },
];

const VEGETARIAN: &[Plate] = &[
    Plate {
        name: "Veggie omelette",
        items: &[("eggs", 3.0, "piece"), ("spinach", 40.0, "g"), ("mushrooms", 60.0, "g"), ("olive oil", 1.0, "tsp")],
        steps: "1. Saute the mushrooms and spinach.\n2. Pour in beaten eggs.\n3. Fold and serve.",
    },
    Plate {
        name: "Lentil and vegetable stew",
        items: &[("green lentils", 80.0, "g"), ("carrot", 1.0, "piece"), ("celery", 1.0, "piece"), ("onion", 0.5, "piece")],
        steps: "1. Soften the vegetables.\n2. Add lentils and water.\n3. Simmer for 30 minutes.",
    },
    Plate {
        name: "Halloumi quinoa salad",
        items: &[("halloumi", 80.0, "g"), ("quinoa", 70.0, "g"), ("cucumber", 0.5, "piece"), ("cherry tomatoes", 100.0, "g")],
        steps: "1. Cook the quinoa.\n2. Grill the halloumi.\n3. Toss with the vegetables.",
    },
];

const VEGAN: &[Plate] = &[
    Plate {
        name: "Chickpea quinoa bowl",
        items: &[("chickpeas", 120.0, "g"), ("quinoa", 70.0, "g"), ("kale", 50.0, "g"), ("tahini", 1.0, "tbsp")],
        steps: "1. Cook the quinoa.\n2. Roast the chickpeas.\n3. Massage the kale and top with tahini.",
    },
    Plate {
        name: "Black bean tacos",
        items: &[("black beans", 120.0, "g"), ("corn tortillas", 2.0, "piece"), ("avocado", 0.5, "piece"), ("salsa", 3.0, "tbsp")],
        steps: "1. Warm the beans and tortillas.\n2. Fill with beans, avocado and salsa.",
    },
    Plate {
        name: "Red lentil dal",
        items: &[("red lentils", 80.0, "g"), ("coconut milk", 100.0, "ml"), ("spinach", 50.0, "g"), ("basmati rice", 60.0, "g")],
        steps: "1. Simmer lentils with coconut milk.\n2. Stir in spinach.\n3. Serve over rice.",
    },
];

const KETO: &[Plate] = &[
    Plate {
        name: "Steak and greens",
        items: &[("sirloin steak", 170.0, "g"), ("asparagus", 120.0, "g"), ("olive oil", 1.0, "tbsp")],
        steps: "1. Sear the steak.\n2. Roast asparagus in olive oil.\n3. Rest the steak and slice.",
    },
    Plate {
        name: "Avocado salmon plate",
        items: &[("salmon fillet", 150.0, "g"), ("avocado", 1.0, "piece"), ("zucchini", 150.0, "g")],
        steps: "1. Bake the salmon.\n2. Saute the zucchini.\n3. Serve with sliced avocado.",
    },
    Plate {
        name: "Egg and mushroom skillet",
        items: &[("eggs", 3.0, "piece"), ("mushrooms", 100.0, "g"), ("spinach", 40.0, "g")],
        steps: "1. Brown the mushrooms.\n2. Add spinach, then crack in the eggs.\n3. Cover until set.",
    },
];

fn plates_for(diet: &str) -> &'static [Plate] {
    match diet {
        "vegetarian" => VEGETARIAN,
        "vegan" | "plant_based" | "plant-based" => VEGAN,
        "keto" | "ketogenic" | "low_carb" | "low-carb" => KETO,
        _ => BALANCED,
    }
}

/// The diet's staple plates as canonical meals, quantities scaled by `servings`.
pub fn staple_meals(diet: &str, servings: f64) -> Vec<Meal> {
    plates_for(diet)
        .iter()
        .map(|plate| {
            let ingredients = plate
                .items
                .iter()
                .map(|(item, amount, unit)| Ingredient::new(*item, amount * servings, Some(*unit)))
                .collect();
            let mut meal = Meal::new(plate.name, ingredients);
            meal.instructions = plate.steps.lines().filter_map(clean_step).collect();
            meal
        })
        .collect()
}

/// Rule-based source: rotates through a per-diet staple table and prepends
/// the requested includes. Answers in the legacy `name`/`items`/`steps` shape
/// and leaves exclusion filtering to the adapter.
pub struct StaplePlateSource {
    meals_per_day: usize,
}

impl StaplePlateSource {
    pub fn new(meals_per_day: usize) -> Self {
        Self {
            meals_per_day: meals_per_day.max(1),
        }
    }
}

#[async_trait]
impl JsonMealSource for StaplePlateSource {
    fn name(&self) -> &str {
        "staples"
    }

    async fn produce(&self, request: &Value) -> anyhow::Result<Value> {
        let diet = request["diet"].as_str().unwrap_or(DEFAULT_DIET);
        let servings = request["servings"].as_f64().unwrap_or(1.0).max(1.0);
        let includes: Vec<&str> = request["include"]
            .as_array()
            .map(|a| a.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let plates = plates_for(diet);
        let meals: Vec<Value> = plates
            .iter()
            .cycle()
            .take(self.meals_per_day)
            .map(|plate| {
                let mut items: Vec<Value> = includes
                    .iter()
                    .map(|name| json!({ "item": name, "qty": format!("{} serving", servings) }))
                    .collect();
                items.extend(plate.items.iter().map(|(item, amount, unit)| {
                    json!({ "item": item, "qty": format!("{} {}", amount * servings, unit) })
                }));
                json!({ "name": plate.name, "items": items, "steps": plate.steps })
            })
            .collect();

        Ok(json!({ "meals": meals }))
    }
}

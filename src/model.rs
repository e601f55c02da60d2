use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recipe identifier, unique within the provider's namespace
pub type RecipeId = u64;

/// A recipe as returned by the provider
///
/// Every field except `id` is optional on the wire: the similar-recipes
/// endpoint only returns a handful of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub image: String,
    /// HTML fragment
    pub summary: String,
    pub ready_in_minutes: u32,
    pub servings: u32,
    pub dish_types: Vec<String>,
    pub diets: Vec<String>,
    pub cuisines: Vec<String>,
    pub extended_ingredients: Vec<Ingredient>,
    pub analyzed_instructions: Vec<InstructionSet>,
    pub nutrition: Option<Nutrition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ingredient {
    pub id: u64,
    pub name: String,
    /// The ingredient line as written in the recipe
    pub original: String,
    pub measures: Measures,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Measures {
    pub metric: Measure,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Measure {
    pub amount: f64,
    pub unit_short: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstructionSet {
    pub name: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    pub number: u32,
    pub step: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    pub nutrients: Vec<Nutrient>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

/// Result ordering requested from a filtered search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Popularity,
    Time,
    Healthiness,
    Price,
}

impl SortOrder {
    /// The value sent to the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Popularity => "popularity",
            SortOrder::Time => "time",
            SortOrder::Healthiness => "healthiness",
            SortOrder::Price => "price",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "popularity" => Ok(SortOrder::Popularity),
            "time" => Ok(SortOrder::Time),
            "healthiness" => Ok(SortOrder::Healthiness),
            "price" => Ok(SortOrder::Price),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// The filter state edited by the user
///
/// An empty `query`, `diet` or `cuisine` leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchFilters {
    pub query: String,
    pub diet: String,
    pub cuisine: String,
    pub sort: SortOrder,
}

impl SearchFilters {
    pub fn new(
        query: impl Into<String>,
        diet: impl Into<String>,
        cuisine: impl Into<String>,
        sort: SortOrder,
    ) -> Self {
        Self {
            query: query.into(),
            diet: diet.into(),
            cuisine: cuisine.into(),
            sort,
        }
    }

    /// Filters that only carry a query string
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// True when any textual constraint is set, which routes to a search
    /// instead of a random listing
    pub fn has_constraints(&self) -> bool {
        !self.query.is_empty() || !self.diet.is_empty() || !self.cuisine.is_empty()
    }
}

/// A mock-authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub favorites: Vec<RecipeId>,
}

/// Selectable cuisine filter values as `(value, label)`
pub const CUISINE_OPTIONS: &[(&str, &str)] = &[
    ("", "All Cuisines"),
    ("italian", "Italian"),
    ("mexican", "Mexican"),
    ("chinese", "Chinese"),
    ("indian", "Indian"),
    ("mediterranean", "Mediterranean"),
    ("american", "American"),
    ("french", "French"),
    ("thai", "Thai"),
    ("japanese", "Japanese"),
];

/// Selectable diet filter values as `(value, label)`
pub const DIET_OPTIONS: &[(&str, &str)] = &[
    ("", "All Diets"),
    ("vegetarian", "Vegetarian"),
    ("vegan", "Vegan"),
    ("glutenFree", "Gluten Free"),
    ("dairyFree", "Dairy Free"),
    ("ketogenic", "Ketogenic"),
    ("paleo", "Paleo"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_constraints() {
        assert!(!SearchFilters::default().has_constraints());
        assert!(SearchFilters::with_query("pasta").has_constraints());
        assert!(SearchFilters::new("", "vegan", "", SortOrder::Time).has_constraints());
        assert!(SearchFilters::new("", "", "thai", SortOrder::Price).has_constraints());
        // Sort alone never constrains the result set
        assert!(!SearchFilters::new("", "", "", SortOrder::Healthiness).has_constraints());
    }

    #[test]
    fn test_filters_structural_equality() {
        let a = SearchFilters::new("pasta", "", "italian", SortOrder::Popularity);
        let b = SearchFilters::new("pasta", "", "italian", SortOrder::Popularity);
        assert_eq!(a, b);
        assert_ne!(a, SearchFilters::new("pasta", "", "italian", SortOrder::Time));
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("time".parse::<SortOrder>().unwrap(), SortOrder::Time);
        assert_eq!("Price".parse::<SortOrder>().unwrap(), SortOrder::Price);
        assert!("newest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_recipe_deserializes_partial_payload() {
        let json = r#"{"id": 715538, "title": "Bruschetta", "imageType": "jpg", "readyInMinutes": 35, "servings": 6}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.id, 715538);
        assert_eq!(recipe.title, "Bruschetta");
        assert_eq!(recipe.ready_in_minutes, 35);
        assert!(recipe.image.is_empty());
        assert!(recipe.extended_ingredients.is_empty());
        assert!(recipe.nutrition.is_none());
    }

    #[test]
    fn test_recipe_deserializes_nested_collections() {
        let json = r#"{
            "id": 1,
            "title": "Soup",
            "extendedIngredients": [
                {"id": 11, "name": "carrot", "original": "2 carrots",
                 "measures": {"metric": {"amount": 2.0, "unitShort": ""}}}
            ],
            "analyzedInstructions": [
                {"name": "", "steps": [{"number": 1, "step": "Chop."}]}
            ],
            "nutrition": {"nutrients": [{"name": "Calories", "amount": 120.5, "unit": "kcal"}]}
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.extended_ingredients[0].original, "2 carrots");
        assert_eq!(recipe.analyzed_instructions[0].steps[0].step, "Chop.");
        assert_eq!(recipe.nutrition.unwrap().nutrients[0].unit, "kcal");
    }
}

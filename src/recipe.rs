//! Recipe data model
//!
//! Recipes are supplied by an external data layer and are read-only for
//! the session core. Step and ingredient indices are 0-based internally
//! and 1-based whenever spoken or displayed.

use serde::{Deserialize, Serialize};

/// A single ingredient line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Ingredient name (e.g. "flour")
    pub name: String,
    /// Quantity as provided by the data layer (e.g. "2", "1/2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    /// Unit of measure (e.g. "cups")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Ingredient {
    /// Spoken form of the ingredient line: "flour, 2 cups".
    ///
    /// Quantity and unit are appended only when present, so a bare
    /// ingredient speaks as just its name.
    pub fn spoken(&self) -> String {
        match (self.quantity.as_deref(), self.unit.as_deref()) {
            (Some(quantity), Some(unit)) => format!("{}, {} {}", self.name, quantity, unit),
            (Some(quantity), None) => format!("{}, {}", self.name, quantity),
            (None, _) => self.name.clone(),
        }
    }
}

/// An immutable recipe: ordered step texts and ordered ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Recipe title for display and logging
    pub title: String,
    /// Ordered instruction steps
    pub steps: Vec<String>,
    /// Ordered ingredient list
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Number of steps in the recipe.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Number of ingredients in the recipe.
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    /// Text of the step at `index`, if in range.
    pub fn step_text(&self, index: usize) -> Option<&str> {
        self.steps.get(index).map(String::as_str)
    }

    /// Spoken form of one ingredient, 1-based in speech:
    /// "Ingredient 2: flour, 2 cups".
    pub fn spoken_ingredient(&self, index: usize) -> Option<String> {
        self.ingredients
            .get(index)
            .map(|ingredient| format!("Ingredient {}: {}", index + 1, ingredient.spoken()))
    }

    /// Spoken listing of every ingredient, one sentence each.
    pub fn spoken_ingredient_list(&self) -> String {
        self.ingredients
            .iter()
            .enumerate()
            .map(|(index, ingredient)| format!("Ingredient {}: {}.", index + 1, ingredient.spoken()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

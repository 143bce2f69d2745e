//! Recipe definitions as configured by the user

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name given to every recipe produced by the edit toggle
pub const EDITED_RECIPE_NAME: &str = "Receta Editada";

/// Duration forced onto the first step of an edited recipe
pub const EDITED_FIRST_STEP_TIME: u32 = 15;

/// Recipe identifier as the vendor cloud reports it
///
/// The cloud uses both numeric and string ids. The variant is kept so ids
/// round-trip unchanged; `Number(5)` and `Text("5")` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeId::Number(n) => write!(f, "{}", n),
            RecipeId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecipeId {
    fn from(n: i64) -> Self {
        RecipeId::Number(n)
    }
}

impl From<&str> for RecipeId {
    fn from(s: &str) -> Self {
        RecipeId::Text(s.to_string())
    }
}

/// One step of a recipe
///
/// Only `time` is interpreted; every other vendor field is carried through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub time: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RecipeStep {
    pub fn new(time: u32) -> Self {
        Self {
            time,
            extra: serde_json::Map::new(),
        }
    }

    /// Attach a vendor field to the step
    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A configured recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Cloud id; inline-step recipes get theirs when created remotely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecipeId>,
    pub name: String,
    /// Inline steps; when present the recipe is created remotely before it
    /// is started, even if the list is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<RecipeStep>>,
}

/// Update payload sent by the edit toggle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeEdit {
    pub name: String,
    pub steps: Vec<RecipeStep>,
}

impl Recipe {
    pub fn new(id: impl Into<RecipeId>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            steps: None,
        }
    }

    pub fn with_steps(mut self, steps: Vec<RecipeStep>) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn has_inline_steps(&self) -> bool {
        self.steps.is_some()
    }

    /// Build the edited copy of this recipe
    ///
    /// The copy carries a single step: the first configured step (or an
    /// empty one) with its duration forced to [`EDITED_FIRST_STEP_TIME`].
    pub fn edited(&self) -> RecipeEdit {
        let mut first = self
            .steps
            .as_ref()
            .and_then(|steps| steps.first().cloned())
            .unwrap_or_else(|| RecipeStep::new(EDITED_FIRST_STEP_TIME));
        first.time = EDITED_FIRST_STEP_TIME;

        RecipeEdit {
            name: EDITED_RECIPE_NAME.to_string(),
            steps: vec![first],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recipe_id_keeps_wire_type() {
        let numeric: RecipeId = serde_json::from_value(json!(42)).unwrap();
        let text: RecipeId = serde_json::from_value(json!("42")).unwrap();
        assert_eq!(numeric, RecipeId::Number(42));
        assert_eq!(text, RecipeId::Text("42".to_string()));
        assert_ne!(numeric, text);
        assert_eq!(serde_json::to_value(&numeric).unwrap(), json!(42));
    }

    #[test]
    fn test_step_preserves_vendor_fields() {
        let step: RecipeStep =
            serde_json::from_value(json!({"time": 10, "temp": 100, "speed": 3})).unwrap();
        assert_eq!(step.time, 10);
        assert_eq!(step.extra.get("temp"), Some(&json!(100)));

        let back = serde_json::to_value(&step).unwrap();
        assert_eq!(back, json!({"time": 10, "temp": 100, "speed": 3}));
    }

    #[test]
    fn test_edited_forces_first_step_time() {
        let recipe = Recipe::new(7, "Risotto").with_steps(vec![
            RecipeStep::new(30).with_field("temp", json!(120)),
            RecipeStep::new(5),
        ]);

        let edit = recipe.edited();
        assert_eq!(edit.name, EDITED_RECIPE_NAME);
        assert_eq!(edit.steps.len(), 1);
        assert_eq!(edit.steps[0].time, EDITED_FIRST_STEP_TIME);
        assert_eq!(edit.steps[0].extra.get("temp"), Some(&json!(120)));
    }

    #[test]
    fn test_edited_without_steps() {
        let edit = Recipe::new("soup", "Soup").edited();
        assert_eq!(edit.steps, vec![RecipeStep::new(EDITED_FIRST_STEP_TIME)]);
    }

    #[test]
    fn test_inline_steps_detection() {
        let plain: Recipe = serde_json::from_value(json!({"id": 1, "name": "Rice"})).unwrap();
        assert!(!plain.has_inline_steps());

        let empty: Recipe =
            serde_json::from_value(json!({"name": "Custom", "steps": []})).unwrap();
        assert!(empty.has_inline_steps());
        assert!(empty.id.is_none());
    }
}

//! Wire types for the Mambo cloud API

use mambo_core::{Device, DeviceId, RecipeEdit, RecipeId, RecipeStep};
use serde::{Deserialize, Serialize};

/// Temperature mirrored when the status has none
pub const DEFAULT_TEMPERATURE: f64 = 0.0;

/// Humidity mirrored when the status has none
pub const DEFAULT_HUMIDITY: f64 = 0.0;

/// Pressure mirrored when the status has none (standard atmosphere, hPa)
pub const DEFAULT_PRESSURE: f64 = 1013.0;

/// Weight mirrored when the status has none
pub const DEFAULT_WEIGHT: f64 = 0.0;

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceList {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceRequest<'a> {
    pub device_id: &'a DeviceId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateRecipeRequest<'a> {
    pub device_id: &'a DeviceId,
    pub name: &'a str,
    pub steps: &'a [RecipeStep],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateRecipeResponse {
    pub recipe_id: Option<RecipeId>,
}

/// Edit payload: the updates are flattened next to the ids
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditRecipeRequest<'a> {
    pub device_id: &'a DeviceId,
    pub recipe_id: &'a RecipeId,
    #[serde(flatten)]
    pub updates: &'a RecipeEdit,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartRecipeRequest<'a> {
    pub device_id: &'a DeviceId,
    pub recipe_id: &'a RecipeId,
}

/// One status reading of a device
///
/// Every field is optional; the default value is the "empty snapshot" a
/// failed fetch degrades to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub finished: Option<bool>,
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub current_recipe_id: Option<RecipeId>,
}

impl StatusSnapshot {
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.unwrap_or(false)
    }

    /// Label of the upcoming step; an empty label counts as none
    pub fn next_step(&self) -> Option<&str> {
        self.next_step.as_deref().filter(|s| !s.is_empty())
    }

    pub fn temperature(&self) -> f64 {
        self.temp.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn humidity(&self) -> f64 {
        self.humidity.unwrap_or(DEFAULT_HUMIDITY)
    }

    pub fn pressure(&self) -> f64 {
        self.pressure.unwrap_or(DEFAULT_PRESSURE)
    }

    pub fn weight(&self) -> f64 {
        self.weight.unwrap_or(DEFAULT_WEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_snapshot_defaults() {
        let snapshot = StatusSnapshot::default();
        assert!(!snapshot.is_active());
        assert!(!snapshot.is_finished());
        assert_eq!(snapshot.next_step(), None);
        assert_eq!(snapshot.temperature(), 0.0);
        assert_eq!(snapshot.humidity(), 0.0);
        assert_eq!(snapshot.pressure(), 1013.0);
        assert_eq!(snapshot.weight(), 0.0);
    }

    #[test]
    fn test_parse_full_snapshot() {
        let snapshot: StatusSnapshot = serde_json::from_value(json!({
            "active": true,
            "finished": false,
            "nextStep": "Add salt",
            "temp": 98.5,
            "humidity": 40,
            "pressure": 1100,
            "weight": 350,
            "currentRecipeId": 12,
            "firmware": "1.2.3"
        }))
        .unwrap();

        assert!(snapshot.is_active());
        assert_eq!(snapshot.next_step(), Some("Add salt"));
        assert_eq!(snapshot.temperature(), 98.5);
        assert_eq!(snapshot.humidity(), 40.0);
        assert_eq!(snapshot.pressure(), 1100.0);
        assert_eq!(snapshot.current_recipe_id, Some(RecipeId::Number(12)));
    }

    #[test]
    fn test_device_list_accepts_numeric_ids() {
        let list: DeviceList = serde_json::from_value(json!({
            "devices": [{"id": 12345, "name": "Mambo"}]
        }))
        .unwrap();
        assert_eq!(list.devices, vec![Device::new("12345", "Mambo")]);
    }

    #[test]
    fn test_null_and_empty_fields() {
        let snapshot: StatusSnapshot =
            serde_json::from_value(json!({"nextStep": "", "temp": null})).unwrap();
        assert_eq!(snapshot.next_step(), None);
        assert_eq!(snapshot.temperature(), 0.0);
    }

    #[test]
    fn test_edit_request_is_flat() {
        let device_id = DeviceId::new("d1");
        let recipe_id = RecipeId::Number(5);
        let updates = RecipeEdit {
            name: "Receta Editada".to_string(),
            steps: vec![RecipeStep::new(15)],
        };
        let body = serde_json::to_value(EditRecipeRequest {
            device_id: &device_id,
            recipe_id: &recipe_id,
            updates: &updates,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "deviceId": "d1",
                "recipeId": 5,
                "name": "Receta Editada",
                "steps": [{"time": 15}]
            })
        );
    }
}

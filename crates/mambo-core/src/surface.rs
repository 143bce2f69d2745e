//! Surface identifiers: a device id paired with the role a surface plays
//!
//! Every accessory exposes the same fixed set of surfaces, so a surface is
//! addressed as `<device_id>/<role>` (e.g. `mambo-1/cook_finished`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::DeviceId;

/// Error type for invalid surface IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceIdError {
    #[error("surface_id must have the form <device_id>/<role>")]
    InvalidFormat,

    #[error("device_id cannot be empty")]
    EmptyDeviceId,

    #[error("unknown surface role '{0}'")]
    UnknownRole(String),
}

/// Typed capability a surface presents to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Thermostat,
    Fan,
    Switch,
    ContactSensor,
    TemperatureSensor,
    HumiditySensor,
}

/// The role a surface plays within a Mambo accessory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceRole {
    /// Current temperature plus the keep-warm target temperature control
    Thermostat,
    /// Recipe selector (rotation speed) and recipe-active indicator
    Recipes,
    EditRecipe,
    CookFinished,
    CookStarted,
    NextStep,
    Temperature,
    Humidity,
    /// Temperature-typed: the host has no pressure surface
    Pressure,
    /// Temperature-typed: the host has no weight surface
    Weight,
    RefreshToken,
}

impl SurfaceRole {
    /// Every role, in the order surfaces are added to an accessory
    pub const ALL: [SurfaceRole; 11] = [
        SurfaceRole::Thermostat,
        SurfaceRole::Recipes,
        SurfaceRole::EditRecipe,
        SurfaceRole::CookFinished,
        SurfaceRole::CookStarted,
        SurfaceRole::NextStep,
        SurfaceRole::Temperature,
        SurfaceRole::Humidity,
        SurfaceRole::Pressure,
        SurfaceRole::Weight,
        SurfaceRole::RefreshToken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceRole::Thermostat => "thermostat",
            SurfaceRole::Recipes => "recipes",
            SurfaceRole::EditRecipe => "edit_recipe",
            SurfaceRole::CookFinished => "cook_finished",
            SurfaceRole::CookStarted => "cook_started",
            SurfaceRole::NextStep => "next_step",
            SurfaceRole::Temperature => "temperature",
            SurfaceRole::Humidity => "humidity",
            SurfaceRole::Pressure => "pressure",
            SurfaceRole::Weight => "weight",
            SurfaceRole::RefreshToken => "refresh_token",
        }
    }

    pub fn kind(&self) -> ServiceKind {
        match self {
            SurfaceRole::Thermostat => ServiceKind::Thermostat,
            SurfaceRole::Recipes => ServiceKind::Fan,
            SurfaceRole::EditRecipe | SurfaceRole::RefreshToken => ServiceKind::Switch,
            SurfaceRole::CookFinished | SurfaceRole::CookStarted | SurfaceRole::NextStep => {
                ServiceKind::ContactSensor
            }
            SurfaceRole::Temperature | SurfaceRole::Pressure | SurfaceRole::Weight => {
                ServiceKind::TemperatureSensor
            }
            SurfaceRole::Humidity => ServiceKind::HumiditySensor,
        }
    }

    /// Display name shown by the host; `None` means "use the accessory name"
    pub fn display_name(&self) -> Option<&'static str> {
        match self {
            SurfaceRole::Thermostat => None,
            SurfaceRole::Recipes => Some("Mambo Recipes"),
            SurfaceRole::EditRecipe => Some("Edit Recipe"),
            SurfaceRole::CookFinished => Some("Cooking Finished"),
            SurfaceRole::CookStarted => Some("Cooking Started"),
            SurfaceRole::NextStep => Some("Next Step"),
            SurfaceRole::Temperature => Some("Current Temperature"),
            SurfaceRole::Humidity => Some("Current Humidity"),
            SurfaceRole::Pressure => Some("Current Pressure"),
            SurfaceRole::Weight => Some("Current Weight"),
            SurfaceRole::RefreshToken => Some("Refresh Token"),
        }
    }
}

impl fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurfaceRole {
    type Err = SurfaceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SurfaceRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| SurfaceIdError::UnknownRole(s.to_string()))
    }
}

/// Address of one surface of one accessory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SurfaceId {
    device_id: DeviceId,
    role: SurfaceRole,
}

impl SurfaceId {
    pub fn new(device_id: DeviceId, role: SurfaceRole) -> Self {
        Self { device_id, role }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    pub fn kind(&self) -> ServiceKind {
        self.role.kind()
    }
}

impl FromStr for SurfaceId {
    type Err = SurfaceIdError;

    /// Device ids may themselves contain `/`, so the role is taken from
    /// the last segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (device, role) = s.rsplit_once('/').ok_or(SurfaceIdError::InvalidFormat)?;
        if device.is_empty() {
            return Err(SurfaceIdError::EmptyDeviceId);
        }
        Ok(Self::new(DeviceId::new(device), role.parse()?))
    }
}

impl TryFrom<String> for SurfaceId {
    type Error = SurfaceIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SurfaceId> for String {
    fn from(id: SurfaceId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_id, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: SurfaceId = "mambo-1/cook_finished".parse().unwrap();
        assert_eq!(id.device_id().as_str(), "mambo-1");
        assert_eq!(id.role(), SurfaceRole::CookFinished);
        assert_eq!(id.to_string(), "mambo-1/cook_finished");
    }

    #[test]
    fn test_device_id_with_slash() {
        let id: SurfaceId = "tenant/abc/weight".parse().unwrap();
        assert_eq!(id.device_id().as_str(), "tenant/abc");
        assert_eq!(id.role(), SurfaceRole::Weight);
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!(
            "no-separator".parse::<SurfaceId>(),
            Err(SurfaceIdError::InvalidFormat)
        );
        assert_eq!(
            "/humidity".parse::<SurfaceId>(),
            Err(SurfaceIdError::EmptyDeviceId)
        );
        assert!(matches!(
            "dev/oven_light".parse::<SurfaceId>(),
            Err(SurfaceIdError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_pressure_and_weight_are_temperature_typed() {
        assert_eq!(SurfaceRole::Pressure.kind(), ServiceKind::TemperatureSensor);
        assert_eq!(SurfaceRole::Weight.kind(), ServiceKind::TemperatureSensor);
    }

    #[test]
    fn test_serde_as_string() {
        let id = SurfaceId::new(DeviceId::new("d1"), SurfaceRole::Recipes);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"d1/recipes\"");
        let back: SurfaceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

//! Characteristics exposed by accessory surfaces and their values

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single readable or writable property of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Characteristic {
    ContactSensorState,
    CurrentTemperature,
    TargetTemperature,
    CurrentRelativeHumidity,
    RotationSpeed,
    Active,
    On,
}

impl Characteristic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Characteristic::ContactSensorState => "contact_sensor_state",
            Characteristic::CurrentTemperature => "current_temperature",
            Characteristic::TargetTemperature => "target_temperature",
            Characteristic::CurrentRelativeHumidity => "current_relative_humidity",
            Characteristic::RotationSpeed => "rotation_speed",
            Characteristic::Active => "active",
            Characteristic::On => "on",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value carried by a characteristic
///
/// Deserializes from plain JSON scalars, so `60` arrives as `Int(60)` and
/// `60.5` as `Float(60.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl CharacteristicValue {
    /// Numeric view of the value; booleans map to 0/1
    pub fn as_f64(&self) -> f64 {
        match *self {
            CharacteristicValue::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            CharacteristicValue::Int(i) => i as f64,
            CharacteristicValue::Float(f) => f,
        }
    }

    /// Truthiness of the value; any non-zero number is true
    pub fn as_bool(&self) -> bool {
        match *self {
            CharacteristicValue::Bool(b) => b,
            CharacteristicValue::Int(i) => i != 0,
            CharacteristicValue::Float(f) => f != 0.0,
        }
    }

    /// Interpret the value as a list index
    ///
    /// Only non-negative integral numbers qualify.
    pub fn as_index(&self) -> Option<usize> {
        match *self {
            CharacteristicValue::Bool(_) => None,
            CharacteristicValue::Int(i) => usize::try_from(i).ok(),
            CharacteristicValue::Float(f) if f >= 0.0 && f.fract() == 0.0 && f.is_finite() => {
                Some(f as usize)
            }
            CharacteristicValue::Float(_) => None,
        }
    }
}

impl From<bool> for CharacteristicValue {
    fn from(value: bool) -> Self {
        CharacteristicValue::Bool(value)
    }
}

impl From<i64> for CharacteristicValue {
    fn from(value: i64) -> Self {
        CharacteristicValue::Int(value)
    }
}

impl From<f64> for CharacteristicValue {
    fn from(value: f64) -> Self {
        CharacteristicValue::Float(value)
    }
}

/// Contact sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    Detected,
    NotDetected,
}

impl From<ContactState> for CharacteristicValue {
    fn from(state: ContactState) -> Self {
        match state {
            ContactState::Detected => CharacteristicValue::Int(0),
            ContactState::NotDetected => CharacteristicValue::Int(1),
        }
    }
}

impl ContactState {
    pub fn from_value(value: &CharacteristicValue) -> Self {
        if value.as_f64() == 0.0 {
            ContactState::Detected
        } else {
            ContactState::NotDetected
        }
    }
}

/// Active/inactive flag of a fan-like surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveState {
    Inactive,
    Active,
}

impl From<ActiveState> for CharacteristicValue {
    fn from(state: ActiveState) -> Self {
        match state {
            ActiveState::Inactive => CharacteristicValue::Int(0),
            ActiveState::Active => CharacteristicValue::Int(1),
        }
    }
}

impl ActiveState {
    pub fn from_value(value: &CharacteristicValue) -> Self {
        if value.as_bool() {
            ActiveState::Active
        } else {
            ActiveState::Inactive
        }
    }
}

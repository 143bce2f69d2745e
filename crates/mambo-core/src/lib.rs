//! Core types for the Mambo bridge
//!
//! This crate provides the fundamental types shared by the bridge crates:
//! DeviceId, SurfaceId, Characteristic, Recipe and the events fired on the
//! host bus.

mod characteristic;
mod device;
mod event;
mod recipe;
mod surface;

pub use characteristic::{ActiveState, Characteristic, CharacteristicValue, ContactState};
pub use device::{Device, DeviceId};
pub use event::{Event, EventData, EventType};
pub use recipe::{Recipe, RecipeEdit, RecipeId, RecipeStep, EDITED_FIRST_STEP_TIME, EDITED_RECIPE_NAME};
pub use surface::{ServiceKind, SurfaceId, SurfaceIdError, SurfaceRole};

/// Standard event types fired on the host bus
pub mod events {
    use super::*;

    /// Fired once by the host after startup; triggers discovery
    pub const DID_FINISH_LAUNCHING: &str = "did_finish_launching";

    /// Fired whenever a characteristic value is written
    pub const CHARACTERISTIC_CHANGED: &str = "characteristic_changed";

    /// Fired when a platform registers a new accessory
    pub const ACCESSORY_REGISTERED: &str = "accessory_registered";

    /// Fired when a platform asks the host to persist its configuration
    pub const PLATFORM_CONFIG_UPDATED: &str = "platform_config_updated";

    /// Fired for user-facing cook notifications
    pub const COOK_NOTIFICATION: &str = "cook_notification";

    /// Data for DID_FINISH_LAUNCHING events
    #[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
    pub struct DidFinishLaunchingData {}

    impl EventData for DidFinishLaunchingData {
        fn event_type() -> &'static str {
            DID_FINISH_LAUNCHING
        }
    }

    /// Data for CHARACTERISTIC_CHANGED events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct CharacteristicChangedData {
        pub surface_id: SurfaceId,
        pub characteristic: Characteristic,
        pub old_value: Option<CharacteristicValue>,
        pub new_value: CharacteristicValue,
    }

    impl EventData for CharacteristicChangedData {
        fn event_type() -> &'static str {
            CHARACTERISTIC_CHANGED
        }
    }

    /// Data for ACCESSORY_REGISTERED events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct AccessoryRegisteredData {
        pub platform: String,
        pub device: Device,
    }

    impl EventData for AccessoryRegisteredData {
        fn event_type() -> &'static str {
            ACCESSORY_REGISTERED
        }
    }

    /// Data for PLATFORM_CONFIG_UPDATED events
    ///
    /// The config is carried as JSON so the host stays agnostic of the
    /// platform's config schema.
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct PlatformConfigUpdatedData {
        pub platform: String,
        pub config: serde_json::Value,
    }

    impl EventData for PlatformConfigUpdatedData {
        fn event_type() -> &'static str {
            PLATFORM_CONFIG_UPDATED
        }
    }

    /// Data for COOK_NOTIFICATION events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct CookNotificationData {
        pub device_id: DeviceId,
        pub message: String,
    }

    impl EventData for CookNotificationData {
        fn event_type() -> &'static str {
            COOK_NOTIFICATION
        }
    }
}

//! In-process accessory host for the Mambo bridge
//!
//! The host is the collaborator a platform plugs into. It provides:
//! - an event bus for lifecycle, characteristic and notification events
//! - a characteristic store holding each surface's current values
//! - a set-handler registry dispatching user-issued set events
//! - an accessory registry, including accessories restored from a cache
//!
//! It does not persist anything and does not speak an accessory protocol;
//! a front end drives it through [`Host::set`] and [`Host::finish_launching`].

mod accessory;
mod characteristics;
mod event_bus;
mod handlers;

pub use accessory::{Accessory, CharacteristicProps, ServiceDescriptor};
pub use characteristics::CharacteristicStore;
pub use event_bus::{EventBus, EventReceiver, TypedEventReceiver};
pub use handlers::{HandlerError, HandlerFuture, HandlerResult, SetHandler, SetHandlerRegistry};

use dashmap::DashMap;
use mambo_core::events::{
    AccessoryRegisteredData, DidFinishLaunchingData, PlatformConfigUpdatedData,
};
use mambo_core::{Characteristic, CharacteristicValue, DeviceId, SurfaceId};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// The accessory host
pub struct Host {
    /// Event bus for pub/sub communication
    pub bus: Arc<EventBus>,
    /// Current characteristic values
    pub characteristics: Arc<CharacteristicStore>,
    handlers: SetHandlerRegistry,
    accessories: DashMap<DeviceId, Accessory>,
    /// Last config each platform asked the host to persist
    platform_configs: DashMap<String, serde_json::Value>,
    /// Set once by [`Host::finish_launching`]
    launched: watch::Sender<bool>,
}

impl Host {
    pub fn new() -> Self {
        let bus = Arc::new(EventBus::new());
        let characteristics = Arc::new(CharacteristicStore::new(bus.clone()));

        Self {
            bus,
            characteristics,
            handlers: SetHandlerRegistry::new(),
            accessories: DashMap::new(),
            platform_configs: DashMap::new(),
            launched: watch::Sender::new(false),
        }
    }

    /// Register accessories on behalf of a platform
    #[instrument(skip(self, accessories), fields(count = accessories.len()))]
    pub fn register_platform_accessories(&self, platform: &str, accessories: Vec<Accessory>) {
        for accessory in accessories {
            info!(
                device_id = %accessory.device_id(),
                name = %accessory.display_name(),
                "Registering accessory"
            );
            let device = accessory.device.clone();
            self.accessories.insert(device.id.clone(), accessory);
            self.bus.fire_typed(AccessoryRegisteredData {
                platform: platform.to_string(),
                device,
            });
        }
    }

    pub fn accessory(&self, device_id: &DeviceId) -> Option<Accessory> {
        self.accessories.get(device_id).map(|a| a.clone())
    }

    pub fn accessory_count(&self) -> usize {
        self.accessories.len()
    }

    /// Write a characteristic value from the platform side
    ///
    /// Platform-side updates never invoke set handlers.
    pub fn update_characteristic(
        &self,
        surface_id: &SurfaceId,
        characteristic: Characteristic,
        value: impl Into<CharacteristicValue>,
    ) -> Option<CharacteristicValue> {
        self.characteristics
            .update(surface_id, characteristic, value.into())
    }

    pub fn characteristic(
        &self,
        surface_id: &SurfaceId,
        characteristic: Characteristic,
    ) -> Option<CharacteristicValue> {
        self.characteristics.get(surface_id, characteristic)
    }

    /// Register the handler invoked when a user sets a characteristic
    pub fn on_set<F, Fut>(&self, surface_id: SurfaceId, characteristic: Characteristic, handler: F)
    where
        F: Fn(CharacteristicValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handlers.register(surface_id, characteristic, handler);
    }

    /// Deliver a user-issued set event
    ///
    /// The value is stored first, then the platform's handler runs to
    /// completion. The stored value stays even if the handler fails.
    pub async fn set(
        &self,
        surface_id: &SurfaceId,
        characteristic: Characteristic,
        value: impl Into<CharacteristicValue>,
    ) -> HandlerResult {
        let value = value.into();
        if !self.handlers.contains(surface_id, characteristic) {
            return Err(HandlerError::NotFound {
                surface_id: surface_id.clone(),
                characteristic,
            });
        }
        self.characteristics.update(surface_id, characteristic, value);
        self.handlers.dispatch(surface_id, characteristic, value).await
    }

    /// Record a platform's updated configuration
    pub fn update_platform_config(&self, platform: &str, config: serde_json::Value) {
        debug!(platform = %platform, "Platform config updated");
        self.platform_configs
            .insert(platform.to_string(), config.clone());
        self.bus.fire_typed(PlatformConfigUpdatedData {
            platform: platform.to_string(),
            config,
        });
    }

    pub fn platform_config(&self, platform: &str) -> Option<serde_json::Value> {
        self.platform_configs.get(platform).map(|c| c.clone())
    }

    /// Signal that startup is complete
    pub fn finish_launching(&self) {
        info!("Host finished launching");
        self.launched.send_replace(true);
        self.bus.fire_typed(DidFinishLaunchingData {});
    }

    pub fn is_launched(&self) -> bool {
        *self.launched.borrow()
    }

    /// Wait until the host has finished launching
    ///
    /// Returns at once when launching already finished.
    pub async fn launched(&self) {
        let mut rx = self.launched.subscribe();
        // The sender lives as long as `self`, so waiting cannot fail
        let _ = rx.wait_for(|launched| *launched).await;
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for Host
pub type SharedHost = Arc<Host>;

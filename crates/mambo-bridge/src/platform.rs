//! The Mambo platform: session, discovery and per-device setup

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mambo_cloud::{CloudError, MamboApi, StatusSnapshot};
use mambo_config::PlatformConfig;
use mambo_core::events::CookNotificationData;
use mambo_core::{
    ActiveState, Characteristic, CharacteristicValue, ContactState, DeviceId, Recipe, SurfaceId,
    SurfaceRole,
};
use mambo_host::{Accessory, SharedHost};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::accessory::{build_accessory, DeviceRecord};
use crate::session::Session;
use crate::PULSE_DURATION;

/// Adapter between the accessory host and the Mambo cloud
///
/// Always held in an `Arc`: control handlers and polling tasks keep a weak
/// reference back to the platform and stop doing work once it is dropped.
pub struct MamboPlatform {
    config: RwLock<PlatformConfig>,
    recipes: Vec<Recipe>,
    session: Session,
    api: Arc<dyn MamboApi>,
    host: SharedHost,
    devices: DashMap<DeviceId, Arc<DeviceRecord>>,
}

impl MamboPlatform {
    pub fn new(config: PlatformConfig, api: Arc<dyn MamboApi>, host: SharedHost) -> Arc<Self> {
        let session = Session::new(
            config.email.clone(),
            config.password.clone(),
            config.token.clone(),
        );

        Arc::new(Self {
            recipes: config.recipes.clone(),
            config: RwLock::new(config),
            session,
            api,
            host,
            devices: DashMap::new(),
        })
    }

    /// Hook the platform into the host lifecycle
    ///
    /// Logs in first when no token is configured, then waits for the host
    /// to finish launching and runs discovery once. The host may finish
    /// launching before the startup login completes.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let platform = self.clone();

        tokio::spawn(async move {
            if !platform.session.is_authenticated().await && platform.login().await {
                platform.persist_config().await;
                info!("Token stored in config");
            }

            platform.host.launched().await;
            platform.discover_devices().await;
        })
    }

    /// Log in with the configured credentials
    ///
    /// Returns whether a token was obtained. On failure the previous token,
    /// if any, stays in place.
    pub async fn login(&self) -> bool {
        match self
            .api
            .login(self.session.email(), self.session.password())
            .await
        {
            Ok(token) => {
                self.session.set_token(token).await;
                info!("Login succeeded");
                true
            }
            Err(err) => {
                warn!(error = %err, status = ?err.status(), "Login failed");
                false
            }
        }
    }

    /// Ask the host to persist the config with the current token
    pub(crate) async fn persist_config(&self) {
        let token = self.session.token().await;
        let mut config = self.config.write().await;
        config.token = token;
        self.host
            .update_platform_config(&config.platform, config.to_json());
    }

    /// Fetch the device list and set up an accessory for each new device
    ///
    /// Silently does nothing without a token. Returns the number of
    /// accessories set up by this call.
    pub async fn discover_devices(self: &Arc<Self>) -> usize {
        let Some(token) = self.session.token().await else {
            debug!("No token, skipping discovery");
            return 0;
        };

        let devices = match self.api.list_devices(&token).await {
            Ok(devices) => devices,
            Err(err) => {
                warn!(error = %err, "Device discovery failed");
                return 0;
            }
        };

        let platform_name = self.config.read().await.platform.clone();
        let mut added = 0;

        for device in devices {
            if self.devices.contains_key(&device.id) {
                debug!(device_id = %device.id, "Accessory already set up");
                continue;
            }

            let accessory = build_accessory(&device, self.recipes.len());
            self.host
                .register_platform_accessories(&platform_name, vec![accessory.clone()]);
            if self.setup_accessory(accessory) {
                added += 1;
            }
        }

        info!(added, "Discovery finished");
        added
    }

    /// Set up an accessory the host restored from its cache
    ///
    /// The surfaces are rebuilt from the device; a later discovery of the
    /// same device will not set it up again.
    pub fn restore_accessory(self: &Arc<Self>, accessory: Accessory) -> bool {
        let accessory = build_accessory(&accessory.device, self.recipes.len());
        self.setup_accessory(accessory)
    }

    /// Create the device record, wire its controls and start its polling loop
    ///
    /// Returns false, doing nothing, when the device is already set up.
    fn setup_accessory(self: &Arc<Self>, accessory: Accessory) -> bool {
        let record = match self.devices.entry(accessory.device_id().clone()) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                let record = Arc::new(DeviceRecord::new(accessory));
                slot.insert(record.clone());
                record
            }
        };

        info!(
            device_id = %record.device_id(),
            name = %record.display_name(),
            "Setting up accessory"
        );

        self.init_surfaces(&record);
        self.wire_controls(&record);
        crate::polling::spawn_poller(self, record);
        true
    }

    /// Initial values so every surface reads as idle
    fn init_surfaces(&self, record: &DeviceRecord) {
        for role in [
            SurfaceRole::CookFinished,
            SurfaceRole::CookStarted,
            SurfaceRole::NextStep,
        ] {
            self.host.update_characteristic(
                &record.surface(role),
                Characteristic::ContactSensorState,
                ContactState::NotDetected,
            );
        }
        self.host.update_characteristic(
            &record.surface(SurfaceRole::Recipes),
            Characteristic::Active,
            ActiveState::Inactive,
        );
        for role in [SurfaceRole::EditRecipe, SurfaceRole::RefreshToken] {
            self.host
                .update_characteristic(&record.surface(role), Characteristic::On, false);
        }
    }

    /// Current token, or a logged "not authenticated" when there is none
    pub(crate) async fn authenticated_token(&self) -> Option<String> {
        let token = self.session.token().await;
        if token.is_none() {
            warn!(error = %CloudError::NotAuthenticated, "Command skipped");
        }
        token
    }

    /// Fetch a status snapshot, degrading every failure to the empty one
    pub(crate) async fn fetch_status(&self, record: &DeviceRecord) -> StatusSnapshot {
        let Some(token) = self.session.token().await else {
            return StatusSnapshot::default();
        };

        match self.api.get_status(&token, record.device_id()).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(device_id = %record.device_id(), error = %err, "Status fetch failed");
                StatusSnapshot::default()
            }
        }
    }

    /// Log a user-facing message and fire it on the host bus
    pub(crate) fn notify(&self, record: &DeviceRecord, message: String) {
        info!(device_id = %record.device_id(), "Notif: {}", message);
        self.host.bus.fire_typed(CookNotificationData {
            device_id: record.device_id().clone(),
            message,
        });
    }

    /// Set a contact sensor to detected, reverting after [`PULSE_DURATION`]
    pub(crate) fn pulse(&self, surface_id: SurfaceId) {
        self.host.update_characteristic(
            &surface_id,
            Characteristic::ContactSensorState,
            ContactState::Detected,
        );

        let host = self.host.clone();
        tokio::spawn(async move {
            tokio::time::sleep(PULSE_DURATION).await;
            host.update_characteristic(
                &surface_id,
                Characteristic::ContactSensorState,
                ContactState::NotDetected,
            );
        });
    }

    pub(crate) fn update(
        &self,
        surface_id: &SurfaceId,
        characteristic: Characteristic,
        value: impl Into<CharacteristicValue>,
    ) {
        self.host
            .update_characteristic(surface_id, characteristic, value);
    }

    pub(crate) fn api(&self) -> &dyn MamboApi {
        self.api.as_ref()
    }

    pub(crate) fn host(&self) -> &SharedHost {
        &self.host
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Index of the configured recipe with the given cloud id
    pub fn recipe_index(&self, id: &mambo_core::RecipeId) -> Option<usize> {
        self.recipes
            .iter()
            .position(|recipe| recipe.id.as_ref() == Some(id))
    }

    pub fn device(&self, device_id: &DeviceId) -> Option<Arc<DeviceRecord>> {
        self.devices.get(device_id).map(|r| r.clone())
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Snapshot of the config as last persisted through the host
    pub async fn config(&self) -> PlatformConfig {
        self.config.read().await.clone()
    }
}

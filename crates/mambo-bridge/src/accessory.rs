//! Per-device accessory record and the state the polling loop tracks

use mambo_cloud::StatusSnapshot;
use mambo_core::{Characteristic, Device, DeviceId, SurfaceId, SurfaceRole};
use mambo_host::{Accessory, CharacteristicProps};
use tokio::sync::Mutex;

/// Build the accessory descriptor for a device
///
/// The recipe selector accepts indices `0..recipe_count`.
pub fn build_accessory(device: &Device, recipe_count: usize) -> Accessory {
    let mut accessory = Accessory::new(device.clone());

    for role in SurfaceRole::ALL {
        let name = role
            .display_name()
            .map(String::from)
            .unwrap_or_else(|| device.name.clone());
        let service = accessory.add_service(role, name);

        if role == SurfaceRole::Recipes {
            service.set_props(
                Characteristic::RotationSpeed,
                CharacteristicProps {
                    min_value: 0.0,
                    max_value: recipe_count.saturating_sub(1) as f64,
                    min_step: 1.0,
                },
            );
        }
    }

    accessory
}

/// Cooking state carried from one poll to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessoryState {
    pub cooking_active: bool,
    pub last_next_step: Option<String>,
}

/// Transitions detected by one poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edges {
    /// Label of a step that differs from the last one seen
    pub new_step: Option<String>,
    pub finished: bool,
    pub started: bool,
}

impl Edges {
    pub fn is_empty(&self) -> bool {
        self.new_step.is_none() && !self.finished && !self.started
    }
}

impl AccessoryState {
    /// Fold a snapshot into the state, returning the edges it produced
    ///
    /// Every edge compares against the state from before this snapshot.
    pub fn apply(&mut self, snapshot: &StatusSnapshot) -> Edges {
        let was_active = self.cooking_active;
        self.cooking_active = snapshot.is_active();

        let next_step = snapshot.next_step();
        let new_step = next_step
            .filter(|step| self.last_next_step.as_deref() != Some(*step))
            .map(String::from);
        self.last_next_step = next_step.map(String::from);

        Edges {
            new_step,
            finished: snapshot.is_finished() && was_active,
            started: !was_active && self.cooking_active,
        }
    }
}

/// Everything the platform holds for one discovered device
pub struct DeviceRecord {
    accessory: Accessory,
    state: Mutex<AccessoryState>,
}

impl DeviceRecord {
    pub(crate) fn new(accessory: Accessory) -> Self {
        Self {
            accessory,
            state: Mutex::new(AccessoryState::default()),
        }
    }

    pub fn accessory(&self) -> &Accessory {
        &self.accessory
    }

    pub fn device_id(&self) -> &DeviceId {
        self.accessory.device_id()
    }

    pub fn display_name(&self) -> &str {
        self.accessory.display_name()
    }

    pub fn surface(&self, role: SurfaceRole) -> SurfaceId {
        self.accessory.surface_id(role)
    }

    /// Copy of the current cooking state
    pub async fn state(&self) -> AccessoryState {
        self.state.lock().await.clone()
    }

    pub(crate) async fn apply(&self, snapshot: &StatusSnapshot) -> Edges {
        self.state.lock().await.apply(snapshot)
    }
}

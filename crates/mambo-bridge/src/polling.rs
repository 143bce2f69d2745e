//! Per-device status polling

use mambo_core::{ActiveState, Characteristic, CharacteristicValue, SurfaceRole};
use std::sync::Arc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::accessory::DeviceRecord;
use crate::platform::MamboPlatform;
use crate::POLL_INTERVAL;

/// Start the polling loop of a device
///
/// The first tick fires one interval after setup. A slow tick delays the
/// following ones instead of overlapping them. The loop ends only when the
/// platform is dropped.
pub(crate) fn spawn_poller(platform: &Arc<MamboPlatform>, record: Arc<DeviceRecord>) {
    let weak = Arc::downgrade(platform);

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(platform) = weak.upgrade() else {
                debug!(device_id = %record.device_id(), "Platform dropped, polling stopped");
                break;
            };
            poll_device(&platform, &record).await;
        }
    });
}

/// Run one poll: fetch the status, emit edges and mirror the readings
pub async fn poll_device(platform: &MamboPlatform, record: &DeviceRecord) {
    if !platform.session().is_authenticated().await {
        trace!(device_id = %record.device_id(), "No token, skipping poll");
        return;
    }

    let snapshot = platform.fetch_status(record).await;
    let edges = record.apply(&snapshot).await;
    let name = record.display_name();

    if let Some(step) = &edges.new_step {
        platform.notify(record, format!("{}: Add step: {}", name, step));
        platform.pulse(record.surface(SurfaceRole::NextStep));
    }

    if edges.finished {
        platform.notify(record, format!("{}: Cooking finished", name));
        platform.update(
            &record.surface(SurfaceRole::Recipes),
            Characteristic::Active,
            ActiveState::Inactive,
        );
        platform.pulse(record.surface(SurfaceRole::CookFinished));
    }

    if edges.started {
        platform.notify(record, format!("{}: Cooking started", name));
        platform.pulse(record.surface(SurfaceRole::CookStarted));
    }

    let readings = [
        (SurfaceRole::Thermostat, Characteristic::CurrentTemperature, snapshot.temperature()),
        (SurfaceRole::Temperature, Characteristic::CurrentTemperature, snapshot.temperature()),
        (SurfaceRole::Humidity, Characteristic::CurrentRelativeHumidity, snapshot.humidity()),
        (SurfaceRole::Pressure, Characteristic::CurrentTemperature, snapshot.pressure()),
        (SurfaceRole::Weight, Characteristic::CurrentTemperature, snapshot.weight()),
    ];
    for (role, characteristic, value) in readings {
        platform.update(&record.surface(role), characteristic, value);
    }

    if let Some(index) = snapshot
        .current_recipe_id
        .as_ref()
        .and_then(|id| platform.recipe_index(id))
    {
        platform.update(
            &record.surface(SurfaceRole::Recipes),
            Characteristic::RotationSpeed,
            CharacteristicValue::Int(index as i64),
        );
    }

    debug!(
        device_id = %record.device_id(),
        active = snapshot.is_active(),
        temperature = snapshot.temperature(),
        "Poll complete"
    );
}

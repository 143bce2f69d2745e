//! Cecotec Mambo platform for the accessory host
//!
//! [`MamboPlatform`] logs in to the vendor cloud, discovers devices once the
//! host has finished launching and exposes each device as an accessory:
//!
//! - a thermostat carrying the current temperature and a keep-warm control
//! - a recipe selector, a recipe edit toggle and a token refresh switch
//! - contact sensors pulsed on cook start, cook end and step changes
//! - temperature, humidity, pressure and weight readings
//!
//! Each accessory is refreshed by its own polling task every
//! [`POLL_INTERVAL`].

mod accessory;
mod controls;
mod platform;
mod polling;
mod session;

pub use accessory::{build_accessory, AccessoryState, DeviceRecord, Edges};
pub use platform::MamboPlatform;
pub use polling::poll_device;
pub use session::Session;

use std::time::Duration;

/// Period of the per-device status poll
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// How long a pulsed contact sensor stays detected
pub const PULSE_DURATION: Duration = Duration::from_secs(5);

/// Target temperature that switches the device to keep-warm
pub const KEEP_WARM_TEMPERATURE: f64 = 60.0;

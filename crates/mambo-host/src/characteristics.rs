//! Current characteristic values of every registered surface

use dashmap::DashMap;
use mambo_core::events::CharacteristicChangedData;
use mambo_core::{Characteristic, CharacteristicValue, DeviceId, SurfaceId};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::event_bus::EventBus;

/// Holds the last value written to each (surface, characteristic) pair
///
/// Every write fires CHARACTERISTIC_CHANGED on the bus, including writes
/// that repeat the current value; pulse sensors rely on that.
pub struct CharacteristicStore {
    values: DashMap<(SurfaceId, Characteristic), CharacteristicValue>,
    event_bus: Arc<EventBus>,
}

impl CharacteristicStore {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            values: DashMap::new(),
            event_bus,
        }
    }

    /// Write a value, returning the previous one
    #[instrument(skip(self, value), fields(surface_id = %surface_id, characteristic = %characteristic))]
    pub fn update(
        &self,
        surface_id: &SurfaceId,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> Option<CharacteristicValue> {
        let old_value = self
            .values
            .insert((surface_id.clone(), characteristic), value);

        debug!(?old_value, new_value = ?value, "Updating characteristic");

        self.event_bus.fire_typed(CharacteristicChangedData {
            surface_id: surface_id.clone(),
            characteristic,
            old_value,
            new_value: value,
        });

        old_value
    }

    pub fn get(
        &self,
        surface_id: &SurfaceId,
        characteristic: Characteristic,
    ) -> Option<CharacteristicValue> {
        self.values
            .get(&(surface_id.clone(), characteristic))
            .map(|v| *v)
    }

    /// All values belonging to one device's surfaces
    pub fn device_values(
        &self,
        device_id: &DeviceId,
    ) -> Vec<(SurfaceId, Characteristic, CharacteristicValue)> {
        self.values
            .iter()
            .filter(|entry| entry.key().0.device_id() == device_id)
            .map(|entry| (entry.key().0.clone(), entry.key().1, *entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mambo_core::SurfaceRole;

    fn surface(device: &str, role: SurfaceRole) -> SurfaceId {
        SurfaceId::new(DeviceId::new(device), role)
    }

    #[test]
    fn test_update_returns_previous_value() {
        let store = CharacteristicStore::new(Arc::new(EventBus::new()));
        let id = surface("d1", SurfaceRole::Humidity);

        assert_eq!(
            store.update(&id, Characteristic::CurrentRelativeHumidity, CharacteristicValue::Int(40)),
            None
        );
        assert_eq!(
            store.update(&id, Characteristic::CurrentRelativeHumidity, CharacteristicValue::Int(55)),
            Some(CharacteristicValue::Int(40))
        );
        assert_eq!(
            store.get(&id, Characteristic::CurrentRelativeHumidity),
            Some(CharacteristicValue::Int(55))
        );
    }

    #[test]
    fn test_every_write_fires_event() {
        let bus = Arc::new(EventBus::new());
        let store = CharacteristicStore::new(bus.clone());
        let mut rx = bus.subscribe_typed::<CharacteristicChangedData>();
        let id = surface("d1", SurfaceRole::NextStep);

        store.update(&id, Characteristic::ContactSensorState, CharacteristicValue::Int(1));
        store.update(&id, Characteristic::ContactSensorState, CharacteristicValue::Int(1));

        let events = rx.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].data.old_value, Some(CharacteristicValue::Int(1)));
    }

    #[test]
    fn test_device_values() {
        let store = CharacteristicStore::new(Arc::new(EventBus::new()));
        store.update(
            &surface("d1", SurfaceRole::Weight),
            Characteristic::CurrentTemperature,
            CharacteristicValue::Int(250),
        );
        store.update(
            &surface("d2", SurfaceRole::Weight),
            Characteristic::CurrentTemperature,
            CharacteristicValue::Int(0),
        );

        let values = store.device_values(&DeviceId::new("d1"));
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].2, CharacteristicValue::Int(250));
        assert_eq!(store.len(), 2);
    }
}

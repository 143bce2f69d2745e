//! Events carried by the host bus

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Payload of a named host event
pub trait EventData: Clone + Send + Sync + 'static {
    /// Name the payload is fired under
    fn event_type() -> &'static str;
}

const WILDCARD: &str = "*";

/// Name of a host event
///
/// The wildcard `*` only has meaning when subscribing, where it selects
/// every event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(Cow<'static, str>);

impl EventType {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn wildcard() -> Self {
        Self(Cow::Borrowed(WILDCARD))
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EventType {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A host event stamped with the time it was fired
///
/// On the bus the payload travels as JSON; subscribers decode it back into
/// the typed payload they asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T = serde_json::Value> {
    pub event_type: EventType,
    pub data: T,
    pub time_fired: DateTime<Utc>,
}

impl<T> Event<T> {
    pub fn new(event_type: impl Into<EventType>, data: T) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            time_fired: Utc::now(),
        }
    }
}

impl<T: EventData> Event<T> {
    pub fn typed(data: T) -> Self {
        Self::new(T::event_type(), data)
    }
}

impl<T: Serialize> Event<T> {
    /// JSON form used on the bus
    pub fn to_json(&self) -> serde_json::Result<Event<serde_json::Value>> {
        let data = serde_json::to_value(&self.data)?;
        Ok(Event {
            event_type: self.event_type.clone(),
            data,
            time_fired: self.time_fired,
        })
    }
}

impl Event<serde_json::Value> {
    /// Decode the JSON payload into a typed one
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<Event<T>> {
        let data = serde_json::from_value(self.data.clone())?;
        Ok(Event {
            event_type: self.event_type.clone(),
            data,
            time_fired: self.time_fired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CookNotificationData;
    use crate::DeviceId;

    #[test]
    fn test_wildcard() {
        assert!(EventType::wildcard().is_wildcard());
        assert!(!EventType::from("cook_notification").is_wildcard());
        assert_eq!(EventType::from("a".to_string()), EventType::from("a"));
    }

    #[test]
    fn test_json_form_keeps_name_and_time() {
        let event = Event::typed(CookNotificationData {
            device_id: DeviceId::new("d1"),
            message: "Kitchen: Cooking started".to_string(),
        });

        let json = event.to_json().unwrap();
        assert_eq!(json.event_type.as_str(), "cook_notification");
        assert_eq!(json.data["device_id"], "d1");
        assert_eq!(json.time_fired, event.time_fired);

        let decoded = json.decode::<CookNotificationData>().unwrap();
        assert_eq!(decoded.data.message, "Kitchen: Cooking started");
    }

    #[test]
    fn test_decode_rejects_other_payloads() {
        let event = Event::new("cook_notification", serde_json::json!({"x": 1}));
        assert!(event.decode::<CookNotificationData>().is_err());
    }
}

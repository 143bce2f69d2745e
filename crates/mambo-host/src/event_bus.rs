//! Broadcast event bus shared by the host and its platforms

use mambo_core::{Event, EventData, EventType};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{trace, warn};

/// Default channel capacity for event subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Pub/sub bus carrying JSON-encoded events
///
/// Every subscriber shares one broadcast channel and filters by event name
/// on its side. Events fired while nobody listens are dropped.
pub struct EventBus {
    sender: broadcast::Sender<Event<Value>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to one event name, or to everything with the wildcard
    pub fn subscribe(&self, event_type: impl Into<EventType>) -> EventReceiver {
        let event_type = event_type.into();
        trace!(event_type = %event_type, "Subscribing");

        EventReceiver {
            rx: self.sender.subscribe(),
            filter: (!event_type.is_wildcard()).then_some(event_type),
        }
    }

    pub fn subscribe_all(&self) -> EventReceiver {
        self.subscribe(EventType::wildcard())
    }

    /// Subscribe to a typed event, receiving decoded payloads
    pub fn subscribe_typed<T: EventData + DeserializeOwned>(&self) -> TypedEventReceiver<T> {
        TypedEventReceiver {
            inner: self.subscribe(T::event_type()),
            _payload: PhantomData,
        }
    }

    pub fn fire(&self, event: Event<Value>) {
        trace!(event_type = %event.event_type, "Firing event");
        // A send error only means there are no live receivers
        let _ = self.sender.send(event);
    }

    pub fn fire_typed<T: EventData + Serialize>(&self, data: T) {
        match Event::typed(data).to_json() {
            Ok(event) => self.fire(event),
            Err(err) => warn!(event_type = T::event_type(), error = %err, "Event payload not serializable"),
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for one event name (or all of them)
///
/// A receiver that falls behind skips the events it missed and keeps going.
pub struct EventReceiver {
    rx: broadcast::Receiver<Event<Value>>,
    filter: Option<EventType>,
}

impl EventReceiver {
    fn accepts(&self, event: &Event<Value>) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |name| *name == event.event_type)
    }

    /// Wait for the next matching event
    ///
    /// Fails only once the bus is gone.
    pub async fn recv(&mut self) -> Result<Event<Value>, RecvError> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.accepts(&event) => return Ok(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event receiver lagged");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Next matching event that has already been delivered, if any
    pub fn try_recv(&mut self) -> Option<Event<Value>> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Every matching event already delivered
    pub fn drain(&mut self) -> Vec<Event<Value>> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

/// Receiver decoding one event's payload into `T`
pub struct TypedEventReceiver<T> {
    inner: EventReceiver,
    _payload: PhantomData<T>,
}

impl<T: EventData + DeserializeOwned> TypedEventReceiver<T> {
    fn decode(event: &Event<Value>) -> Option<Event<T>> {
        match event.decode() {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(event_type = %event.event_type, error = %err, "Undecodable event payload");
                None
            }
        }
    }

    pub async fn recv(&mut self) -> Result<Event<T>, RecvError> {
        loop {
            let event = self.inner.recv().await?;
            if let Some(event) = Self::decode(&event) {
                return Ok(event);
            }
        }
    }

    pub fn drain(&mut self) -> Vec<Event<T>> {
        self.inner.drain().iter().filter_map(Self::decode).collect()
    }
}

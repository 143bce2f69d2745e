//! Registry of async handlers for user-issued set events

use dashmap::DashMap;
use mambo_core::{Characteristic, CharacteristicValue, SurfaceId};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Result type for set handlers
pub type HandlerResult = Result<(), HandlerError>;

/// Future type for async set handlers
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Set handler function type
pub type SetHandler = Arc<dyn Fn(CharacteristicValue) -> HandlerFuture + Send + Sync>;

/// Errors that can occur when dispatching a set event
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    #[error("no set handler for {surface_id} {characteristic}")]
    NotFound {
        surface_id: SurfaceId,
        characteristic: Characteristic,
    },
}

/// Maps (surface, characteristic) to the handler the platform registered
///
/// At most one handler per pair; registering again replaces the previous
/// handler.
pub struct SetHandlerRegistry {
    handlers: DashMap<(SurfaceId, Characteristic), SetHandler>,
}

impl SetHandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    #[instrument(skip(self, handler), fields(surface_id = %surface_id))]
    pub fn register<F, Fut>(&self, surface_id: SurfaceId, characteristic: Characteristic, handler: F)
    where
        F: Fn(CharacteristicValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        debug!(%characteristic, "Registering set handler");

        let handler: SetHandler = Arc::new(move |value| Box::pin(handler(value)) as HandlerFuture);
        self.handlers.insert((surface_id, characteristic), handler);
    }

    /// Run the handler for a set event to completion
    #[instrument(skip(self), fields(surface_id = %surface_id))]
    pub async fn dispatch(
        &self,
        surface_id: &SurfaceId,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> HandlerResult {
        let handler = self
            .handlers
            .get(&(surface_id.clone(), characteristic))
            .map(|h| h.clone())
            .ok_or_else(|| {
                warn!(%characteristic, "No set handler registered");
                HandlerError::NotFound {
                    surface_id: surface_id.clone(),
                    characteristic,
                }
            })?;

        // The map guard is already released; handlers may register more handlers
        handler(value).await
    }

    pub fn contains(&self, surface_id: &SurfaceId, characteristic: Characteristic) -> bool {
        self.handlers
            .contains_key(&(surface_id.clone(), characteristic))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for SetHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

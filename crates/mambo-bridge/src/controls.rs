//! Set handlers for the accessory controls

use mambo_core::{ActiveState, Characteristic, CharacteristicValue, RecipeId, SurfaceRole};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::accessory::DeviceRecord;
use crate::platform::MamboPlatform;
use crate::KEEP_WARM_TEMPERATURE;

impl MamboPlatform {
    /// Register every control of a device with the host
    pub(crate) fn wire_controls(self: &Arc<Self>, record: &Arc<DeviceRecord>) {
        bind(
            self,
            record,
            SurfaceRole::Thermostat,
            Characteristic::TargetTemperature,
            set_target_temperature,
        );
        bind(
            self,
            record,
            SurfaceRole::Recipes,
            Characteristic::RotationSpeed,
            select_recipe,
        );
        bind(
            self,
            record,
            SurfaceRole::Recipes,
            Characteristic::Active,
            set_recipe_active,
        );
        bind(
            self,
            record,
            SurfaceRole::EditRecipe,
            Characteristic::On,
            edit_current_recipe,
        );
        bind(
            self,
            record,
            SurfaceRole::RefreshToken,
            Characteristic::On,
            refresh_token,
        );
    }
}

/// Route a host set event to a control
///
/// The handler only holds a weak reference to the platform; once the
/// platform is gone set events are accepted and ignored.
fn bind<F, Fut>(
    platform: &Arc<MamboPlatform>,
    record: &Arc<DeviceRecord>,
    role: SurfaceRole,
    characteristic: Characteristic,
    control: F,
) where
    F: Fn(Arc<MamboPlatform>, Arc<DeviceRecord>, CharacteristicValue) -> Fut
        + Send
        + Sync
        + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let weak = Arc::downgrade(platform);
    let handler_record = record.clone();

    platform
        .host()
        .on_set(record.surface(role), characteristic, move |value| {
            let pending = weak
                .upgrade()
                .map(|platform| control(platform, handler_record.clone(), value));
            async move {
                if let Some(pending) = pending {
                    pending.await;
                }
                Ok(())
            }
        });
}

#[instrument(skip(platform, record), fields(device_id = %record.device_id()))]
async fn set_target_temperature(
    platform: Arc<MamboPlatform>,
    record: Arc<DeviceRecord>,
    value: CharacteristicValue,
) {
    if value.as_f64() != KEEP_WARM_TEMPERATURE {
        debug!("Target temperature ignored");
        return;
    }

    let Some(token) = platform.authenticated_token().await else {
        return;
    };
    match platform.api().keep_warm(&token, record.device_id()).await {
        Ok(()) => info!("Keep warm enabled"),
        Err(err) => warn!(error = %err, "Keep warm failed"),
    }
}

#[instrument(skip(platform, record), fields(device_id = %record.device_id()))]
async fn select_recipe(
    platform: Arc<MamboPlatform>,
    record: Arc<DeviceRecord>,
    value: CharacteristicValue,
) {
    let Some(recipe) = value
        .as_index()
        .and_then(|index| platform.recipes().get(index))
    else {
        debug!("No recipe at selected index");
        return;
    };

    let Some(token) = platform.authenticated_token().await else {
        return;
    };

    let recipe_id: Option<RecipeId> = if recipe.has_inline_steps() {
        match platform
            .api()
            .create_recipe(&token, record.device_id(), recipe)
            .await
        {
            Ok(id) => {
                debug!(recipe_id = %id, "Recipe created");
                Some(id)
            }
            Err(err) => {
                warn!(recipe = %recipe.name, error = %err, "Recipe creation failed");
                None
            }
        }
    } else {
        recipe.id.clone()
    };

    let Some(recipe_id) = recipe_id else {
        warn!(recipe = %recipe.name, "Recipe has no id, not starting");
        return;
    };

    match platform
        .api()
        .start_recipe(&token, record.device_id(), &recipe_id)
        .await
    {
        Ok(()) => {
            info!(recipe = %recipe.name, recipe_id = %recipe_id, "Recipe started");
            platform.update(
                &record.surface(SurfaceRole::Recipes),
                Characteristic::Active,
                ActiveState::Active,
            );
        }
        Err(err) => warn!(recipe = %recipe.name, error = %err, "Recipe start failed"),
    }
}

#[instrument(skip(platform, record), fields(device_id = %record.device_id()))]
async fn set_recipe_active(
    platform: Arc<MamboPlatform>,
    record: Arc<DeviceRecord>,
    value: CharacteristicValue,
) {
    if ActiveState::from_value(&value) == ActiveState::Active {
        return;
    }

    let Some(token) = platform.authenticated_token().await else {
        return;
    };
    match platform.api().stop_recipe(&token, record.device_id()).await {
        Ok(()) => info!("Recipe stopped"),
        Err(err) => warn!(error = %err, "Recipe stop failed"),
    }
}

#[instrument(skip(platform, record), fields(device_id = %record.device_id()))]
async fn edit_current_recipe(
    platform: Arc<MamboPlatform>,
    record: Arc<DeviceRecord>,
    value: CharacteristicValue,
) {
    if !value.as_bool() {
        return;
    }

    let snapshot = platform.fetch_status(&record).await;
    let current = snapshot
        .current_recipe_id
        .as_ref()
        .and_then(|id| platform.recipe_index(id))
        .and_then(|index| platform.recipes().get(index));

    match current {
        Some(recipe) => {
            if let (Some(token), Some(recipe_id)) =
                (platform.authenticated_token().await, recipe.id.as_ref())
            {
                match platform
                    .api()
                    .edit_recipe(&token, record.device_id(), recipe_id, &recipe.edited())
                    .await
                {
                    Ok(()) => info!(recipe = %recipe.name, "Recipe edited"),
                    Err(err) => warn!(recipe = %recipe.name, error = %err, "Recipe edit failed"),
                }
            }
        }
        None => debug!("Current recipe is not a configured one"),
    }

    platform.update(
        &record.surface(SurfaceRole::EditRecipe),
        Characteristic::On,
        false,
    );
}

#[instrument(skip(platform, record), fields(device_id = %record.device_id()))]
async fn refresh_token(
    platform: Arc<MamboPlatform>,
    record: Arc<DeviceRecord>,
    value: CharacteristicValue,
) {
    if !value.as_bool() {
        return;
    }

    if platform.login().await {
        platform.persist_config().await;
        info!("Token refreshed and stored in config");
    }

    platform.update(
        &record.surface(SurfaceRole::RefreshToken),
        Characteristic::On,
        false,
    );
}

//! Shared fixtures for the platform tests

#![allow(dead_code)]

use async_trait::async_trait;
use mambo_bridge::MamboPlatform;
use mambo_cloud::{CloudError, CloudResult, MamboApi, StatusSnapshot};
use mambo_config::PlatformConfig;
use mambo_core::{Device, DeviceId, Recipe, RecipeEdit, RecipeId};
use mambo_host::{Host, SharedHost};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One call received by [`FakeApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login,
    ListDevices { token: String },
    GetStatus { token: String, device: DeviceId },
    CreateRecipe { device: DeviceId, name: String },
    EditRecipe { device: DeviceId, recipe_id: RecipeId, updates: RecipeEdit },
    StartRecipe { device: DeviceId, recipe_id: RecipeId },
    StopRecipe { device: DeviceId },
    KeepWarm { device: DeviceId },
}

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    /// Tokens handed out by successive logins; empty means login fails
    login_tokens: VecDeque<String>,
    devices: Option<Vec<Device>>,
    /// Statuses returned by successive polls; `None` entries fail
    statuses: VecDeque<Option<StatusSnapshot>>,
    /// Returned when the scripted statuses run out
    fallback_status: Option<StatusSnapshot>,
    created_id: Option<RecipeId>,
    /// Edit, start, stop and keep-warm all fail
    commands_fail: bool,
}

/// In-memory [`MamboApi`] recording every call
#[derive(Clone, Default)]
pub struct FakeApi {
    script: Arc<Mutex<Script>>,
}

fn unavailable(path: &str) -> CloudError {
    CloudError::Status {
        path: path.to_string(),
        status: 503,
        body: "unavailable".to_string(),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login_tokens(self, tokens: &[&str]) -> Self {
        self.script.lock().unwrap().login_tokens = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_devices(self, devices: Vec<Device>) -> Self {
        self.script.lock().unwrap().devices = Some(devices);
        self
    }

    pub fn with_statuses(self, statuses: Vec<Option<StatusSnapshot>>) -> Self {
        self.script.lock().unwrap().statuses = statuses.into();
        self
    }

    pub fn with_fallback_status(self, status: StatusSnapshot) -> Self {
        self.script.lock().unwrap().fallback_status = Some(status);
        self
    }

    pub fn with_created_id(self, id: RecipeId) -> Self {
        self.script.lock().unwrap().created_id = Some(id);
        self
    }

    pub fn with_failing_commands(self) -> Self {
        self.script.lock().unwrap().commands_fail = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.script.lock().unwrap().calls.clear();
    }

    /// Calls other than status polls
    pub fn commands(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::GetStatus { .. }))
            .collect()
    }

    pub fn status_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::GetStatus { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.script.lock().unwrap().calls.push(call);
    }

    fn command_result(&self, path: &str) -> CloudResult<()> {
        if self.script.lock().unwrap().commands_fail {
            Err(unavailable(path))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MamboApi for FakeApi {
    async fn login(&self, _email: &str, _password: &str) -> CloudResult<String> {
        self.record(Call::Login);
        self.script
            .lock()
            .unwrap()
            .login_tokens
            .pop_front()
            .ok_or_else(|| unavailable("/auth/login"))
    }

    async fn list_devices(&self, token: &str) -> CloudResult<Vec<Device>> {
        self.record(Call::ListDevices {
            token: token.to_string(),
        });
        self.script
            .lock()
            .unwrap()
            .devices
            .clone()
            .ok_or_else(|| unavailable("/devices"))
    }

    async fn get_status(&self, token: &str, device_id: &DeviceId) -> CloudResult<StatusSnapshot> {
        self.record(Call::GetStatus {
            token: token.to_string(),
            device: device_id.clone(),
        });
        let mut script = self.script.lock().unwrap();
        match script.statuses.pop_front() {
            Some(Some(status)) => Ok(status),
            Some(None) => Err(unavailable("/mambo/status")),
            None => script
                .fallback_status
                .clone()
                .ok_or_else(|| unavailable("/mambo/status")),
        }
    }

    async fn create_recipe(
        &self,
        _token: &str,
        device_id: &DeviceId,
        recipe: &Recipe,
    ) -> CloudResult<RecipeId> {
        self.record(Call::CreateRecipe {
            device: device_id.clone(),
            name: recipe.name.clone(),
        });
        self.script
            .lock()
            .unwrap()
            .created_id
            .clone()
            .ok_or_else(|| unavailable("/mambo/createRecipe"))
    }

    async fn edit_recipe(
        &self,
        _token: &str,
        device_id: &DeviceId,
        recipe_id: &RecipeId,
        updates: &RecipeEdit,
    ) -> CloudResult<()> {
        self.record(Call::EditRecipe {
            device: device_id.clone(),
            recipe_id: recipe_id.clone(),
            updates: updates.clone(),
        });
        self.command_result("/mambo/editRecipe")
    }

    async fn start_recipe(
        &self,
        _token: &str,
        device_id: &DeviceId,
        recipe_id: &RecipeId,
    ) -> CloudResult<()> {
        self.record(Call::StartRecipe {
            device: device_id.clone(),
            recipe_id: recipe_id.clone(),
        });
        self.command_result("/mambo/startRecipe")
    }

    async fn stop_recipe(&self, _token: &str, device_id: &DeviceId) -> CloudResult<()> {
        self.record(Call::StopRecipe {
            device: device_id.clone(),
        });
        self.command_result("/mambo/stopRecipe")
    }

    async fn keep_warm(&self, _token: &str, device_id: &DeviceId) -> CloudResult<()> {
        self.record(Call::KeepWarm {
            device: device_id.clone(),
        });
        self.command_result("/mambo/keepwarm")
    }
}

pub fn status(active: bool, finished: bool, step: Option<&str>) -> StatusSnapshot {
    StatusSnapshot {
        active: Some(active),
        finished: Some(finished),
        next_step: step.map(String::from),
        ..Default::default()
    }
}

pub fn kitchen() -> Device {
    Device::new("d1", "Kitchen")
}

pub fn config_with_token(recipes: Vec<Recipe>) -> PlatformConfig {
    let mut config = PlatformConfig::new("cook@example.com", "secret");
    config.token = Some("tok-1".to_string());
    config.recipes = recipes;
    config
}

pub fn platform(config: PlatformConfig, api: &FakeApi) -> (Arc<MamboPlatform>, SharedHost) {
    let host: SharedHost = Arc::new(Host::new());
    let platform = MamboPlatform::new(config, Arc::new(api.clone()), host.clone());
    (platform, host)
}

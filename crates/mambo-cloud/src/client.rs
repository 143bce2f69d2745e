//! HTTP client for the Mambo cloud

use async_trait::async_trait;
use mambo_core::{Device, DeviceId, Recipe, RecipeEdit, RecipeId};
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{CloudError, CloudResult};
use crate::types::{
    CreateRecipeRequest, CreateRecipeResponse, DeviceList, DeviceRequest, EditRecipeRequest,
    LoginRequest, LoginResponse, StartRecipeRequest, StatusSnapshot,
};

/// Paths of the vendor endpoints, relative to the base URL
pub mod endpoints {
    pub const LOGIN: &str = "/auth/login";
    pub const DEVICES: &str = "/devices";
    pub const STATUS: &str = "/mambo/status";
    pub const CREATE_RECIPE: &str = "/mambo/createRecipe";
    pub const EDIT_RECIPE: &str = "/mambo/editRecipe";
    pub const START_RECIPE: &str = "/mambo/startRecipe";
    pub const STOP_RECIPE: &str = "/mambo/stopRecipe";
    pub const KEEP_WARM: &str = "/mambo/keepwarm";
}

/// Operations the bridge needs from the vendor cloud
#[async_trait]
pub trait MamboApi: Send + Sync {
    /// Exchange credentials for a bearer token
    async fn login(&self, email: &str, password: &str) -> CloudResult<String>;

    async fn list_devices(&self, token: &str) -> CloudResult<Vec<Device>>;

    async fn get_status(&self, token: &str, device_id: &DeviceId) -> CloudResult<StatusSnapshot>;

    /// Create a custom recipe from inline steps, returning its cloud id
    async fn create_recipe(
        &self,
        token: &str,
        device_id: &DeviceId,
        recipe: &Recipe,
    ) -> CloudResult<RecipeId>;

    async fn edit_recipe(
        &self,
        token: &str,
        device_id: &DeviceId,
        recipe_id: &RecipeId,
        updates: &RecipeEdit,
    ) -> CloudResult<()>;

    async fn start_recipe(
        &self,
        token: &str,
        device_id: &DeviceId,
        recipe_id: &RecipeId,
    ) -> CloudResult<()>;

    async fn stop_recipe(&self, token: &str, device_id: &DeviceId) -> CloudResult<()>;

    async fn keep_warm(&self, token: &str, device_id: &DeviceId) -> CloudResult<()>;
}

/// reqwest-backed [`MamboApi`]
///
/// No request timeout is configured; a hanging call stalls only its caller.
#[derive(Clone)]
pub struct HttpMamboClient {
    client: Client,
    base_url: String,
}

impl HttpMamboClient {
    pub fn new(base_url: &str) -> CloudResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("mambo-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| CloudError::Http {
                path: String::new(),
                source,
            })?;

        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> CloudResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let request = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));

        let response = request.send().await.map_err(|source| CloudError::Http {
            path: path.to_string(),
            source,
        })?;
        Self::parse_json(path, response).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> CloudResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|source| CloudError::Http {
            path: path.to_string(),
            source,
        })?;
        Self::check_status(path, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> CloudResult<T> {
        let response = self.post(path, token, body).await?;
        Self::parse_json(path, response).await
    }

    async fn check_status(path: &str, response: Response) -> CloudResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(CloudError::Status {
            path: path.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    async fn parse_json<T: DeserializeOwned>(path: &str, response: Response) -> CloudResult<T> {
        let response = Self::check_status(path, response).await?;
        let raw_body = response.text().await.map_err(|source| CloudError::Http {
            path: path.to_string(),
            source,
        })?;

        serde_json::from_str(&raw_body).map_err(|source| CloudError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl MamboApi for HttpMamboClient {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> CloudResult<String> {
        let response: LoginResponse = self
            .post_json(endpoints::LOGIN, None, &LoginRequest { email, password })
            .await?;

        response.token.ok_or(CloudError::MissingField {
            path: endpoints::LOGIN.to_string(),
            field: "token",
        })
    }

    #[instrument(skip(self, token))]
    async fn list_devices(&self, token: &str) -> CloudResult<Vec<Device>> {
        let list: DeviceList = self.get(endpoints::DEVICES, token).await?;
        debug!(count = list.devices.len(), "Listed devices");
        Ok(list.devices)
    }

    #[instrument(skip(self, token), fields(device_id = %device_id))]
    async fn get_status(&self, token: &str, device_id: &DeviceId) -> CloudResult<StatusSnapshot> {
        self.post_json(endpoints::STATUS, Some(token), &DeviceRequest { device_id })
            .await
    }

    #[instrument(skip(self, token, recipe), fields(device_id = %device_id, recipe = %recipe.name))]
    async fn create_recipe(
        &self,
        token: &str,
        device_id: &DeviceId,
        recipe: &Recipe,
    ) -> CloudResult<RecipeId> {
        let steps = recipe.steps.as_deref().unwrap_or_default();
        let response: CreateRecipeResponse = self
            .post_json(
                endpoints::CREATE_RECIPE,
                Some(token),
                &CreateRecipeRequest {
                    device_id,
                    name: &recipe.name,
                    steps,
                },
            )
            .await?;

        response.recipe_id.ok_or(CloudError::MissingField {
            path: endpoints::CREATE_RECIPE.to_string(),
            field: "recipeId",
        })
    }

    #[instrument(skip(self, token, updates), fields(device_id = %device_id, recipe_id = %recipe_id))]
    async fn edit_recipe(
        &self,
        token: &str,
        device_id: &DeviceId,
        recipe_id: &RecipeId,
        updates: &RecipeEdit,
    ) -> CloudResult<()> {
        self.post(
            endpoints::EDIT_RECIPE,
            Some(token),
            &EditRecipeRequest {
                device_id,
                recipe_id,
                updates,
            },
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, token), fields(device_id = %device_id, recipe_id = %recipe_id))]
    async fn start_recipe(
        &self,
        token: &str,
        device_id: &DeviceId,
        recipe_id: &RecipeId,
    ) -> CloudResult<()> {
        self.post(
            endpoints::START_RECIPE,
            Some(token),
            &StartRecipeRequest {
                device_id,
                recipe_id,
            },
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, token), fields(device_id = %device_id))]
    async fn stop_recipe(&self, token: &str, device_id: &DeviceId) -> CloudResult<()> {
        self.post(endpoints::STOP_RECIPE, Some(token), &DeviceRequest { device_id })
            .await?;
        Ok(())
    }

    #[instrument(skip(self, token), fields(device_id = %device_id))]
    async fn keep_warm(&self, token: &str, device_id: &DeviceId) -> CloudResult<()> {
        self.post(endpoints::KEEP_WARM, Some(token), &DeviceRequest { device_id })
            .await?;
        Ok(())
    }
}

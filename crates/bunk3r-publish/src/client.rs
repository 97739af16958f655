// HTTP client for the BUNK3R publications API

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bunk3r_core::config::{ApiConfig, INIT_DATA_HEADER};

use crate::assembler::UploadForm;
use crate::error::PublishError;

/// Body of the publication create response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub publication_id: Option<serde_json::Value>,
}

pub struct ApiClient {
    client: Client,
    api: ApiConfig,
    init_data: Option<SecretString>,
}

impl ApiClient {
    /// Build a client. `init_data` is the Telegram WebApp init data string
    /// the backend authenticates requests with.
    pub fn new(api: ApiConfig, init_data: Option<SecretString>) -> Result<Self, PublishError> {
        api.check_transport()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api,
            init_data,
        })
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.init_data {
            Some(data) => builder.header(INIT_DATA_HEADER, data.expose_secret()),
            None => builder,
        }
    }

    /// Resolve a server-relative path (`/media/..`) against the base URL.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.api.url(url)
        }
    }

    /// Submit an assembled post as one multipart request.
    ///
    /// Succeeds only if the server answers `{"success": true}`.
    pub async fn submit(&self, form: UploadForm) -> Result<PublishResponse, PublishError> {
        let url = self.api.url(&self.api.publish_path);
        let files = form.parts.len();
        let multipart = form.into_multipart()?;

        debug!(url = %url, files, "submitting publication");

        let response = self
            .authorize(self.client.post(&url))
            .multipart(multipart)
            .send()
            .await?;

        let body: PublishResponse = handle_response(response).await?;
        if !body.success {
            return Err(PublishError::Rejected(
                body.error.unwrap_or_else(|| "server did not confirm the post".into()),
            ));
        }
        Ok(body)
    }

    /// Download raw bytes (encrypted media) from `url`.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, PublishError> {
        let url = self.resolve(url);
        let response = self.authorize(self.client.get(&url)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Status {
                status: status.as_u16(),
                message: format!("fetching {url}"),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, PublishError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PublishResponse>(&text)
            .ok()
            .and_then(|r| r.error)
            .unwrap_or(text);
        return Err(PublishError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

//! Where SMS status comes from: the trait the poller drives, plus its HTTP impl

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use bunk3r_core::config::{ApiConfig, SmsConfig, INIT_DATA_HEADER};

use crate::error::SmsError;
use crate::status::SmsStatus;

pub trait SmsStatusSource {
    /// Fetch the current status of a virtual-number order.
    fn check(&self, order_id: &str) -> impl Future<Output = Result<SmsStatus, SmsError>> + Send;
}

pub struct HttpSmsSource {
    client: Client,
    api: ApiConfig,
    status_path: String,
    init_data: Option<SecretString>,
}

impl HttpSmsSource {
    pub fn new(
        api: ApiConfig,
        sms: &SmsConfig,
        init_data: Option<SecretString>,
    ) -> Result<Self, SmsError> {
        api.check_transport()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api,
            status_path: sms.status_path.clone(),
            init_data,
        })
    }

    pub fn status_url(&self, order_id: &str) -> String {
        self.api
            .url(&self.status_path.replace("{order_id}", order_id))
    }
}

impl SmsStatusSource for HttpSmsSource {
    async fn check(&self, order_id: &str) -> Result<SmsStatus, SmsError> {
        let url = self.status_url(order_id);
        let mut request = self.client.get(&url);
        if let Some(data) = &self.init_data {
            request = request.header(INIT_DATA_HEADER, data.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SmsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: SmsStatus = response.json().await?;
        if !body.success {
            return Err(SmsError::Api(
                body.error.unwrap_or_else(|| "unsuccessful status response".into()),
            ));
        }
        debug!(order_id, status = ?body.status, "sms status checked");
        Ok(body)
    }
}

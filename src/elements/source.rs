use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::error::ElementError;

/// Transport for raw element text.
#[async_trait]
pub trait ElementSource: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, ElementError>;
}

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ElementError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ElementSource for HttpSource {
    async fn get(&self, url: &str) -> Result<String, ElementError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ElementError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

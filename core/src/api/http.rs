/// Shared HTTP transport
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::session::Session;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Wraps one reqwest client with the configured base URL and the session's
/// bearer token. Cheap to clone; every namespace client holds one.
#[derive(Clone)]
pub struct Http {
    client: reqwest::Client,
    base: String,
    token: String,
}

impl Http {
    pub fn new(config: &Config, session: &Session) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base: config.api_base.trim_end_matches('/').to_string(),
            token: session.token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.token))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let endpoint = self.endpoint(path);
        let resp = self.authorized(self.client.get(&endpoint)).send().await?;
        Self::decode(endpoint, resp).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(path);
        let resp = self
            .authorized(self.client.post(&endpoint))
            .json(body)
            .send()
            .await?;
        Self::decode(endpoint, resp).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(path);
        let resp = self
            .authorized(self.client.put(&endpoint))
            .json(body)
            .send()
            .await?;
        Self::decode(endpoint, resp).await
    }

    /// POST where only the acknowledgement matters.
    pub async fn post_ack(&self, path: &str) -> Result<()> {
        let endpoint = self.endpoint(path);
        let resp = self.authorized(self.client.post(&endpoint)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(endpoint: String, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

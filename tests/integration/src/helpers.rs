//! Test servers and request helpers

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use hearth_common::AppConfig;
use hearth_core::{RoleName, RoleRepository, Snowflake, UserRole};
use hearth_db::{create_pool, PgRoleRepository, PoolSettings};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// API and gateway bound to ephemeral ports.
pub struct TestServer {
    pub api_addr: SocketAddr,
    pub gateway_addr: SocketAddr,
    pub client: Client,
    pub config: Arc<AppConfig>,
    _api: JoinHandle<()>,
    _gateway: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let mut config = test_config()?;
        // Tests hammer the API from one address.
        config.rate_limit.requests_per_second = 1_000;
        config.rate_limit.burst = 1_000;
        Self::start_with_config(config).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let api_state = hearth_api::create_app_state(config.clone()).await?;
        let api_app = hearth_api::create_app(api_state)?;
        let api_listener = TcpListener::bind("127.0.0.1:0").await?;
        let api_addr = api_listener.local_addr()?;
        let api = tokio::spawn(async move {
            axum::serve(api_listener, api_app).await.ok();
        });

        let gateway_state = hearth_gateway::create_gateway_state(&config);
        let gateway_app = hearth_gateway::create_app(gateway_state);
        let gateway_listener = TcpListener::bind("127.0.0.1:0").await?;
        let gateway_addr = gateway_listener.local_addr()?;
        let gateway = tokio::spawn(async move {
            axum::serve(gateway_listener, gateway_app).await.ok();
        });

        tokio::time::sleep(Duration::from_millis(100)).await;

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            api_addr,
            gateway_addr,
            client,
            config: Arc::new(config),
            _api: api,
            _gateway: gateway,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.api_addr)
    }

    /// REST prefix, e.g. `http://127.0.0.1:1234/api/v1`.
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.base_url())
    }

    pub fn realtime_url(&self) -> String {
        format!("ws://{}/realtime", self.gateway_addr)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn put_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.put(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Grant a role straight through the repository. The first administrator
    /// has nobody to grant it.
    pub async fn grant_role(&self, user_id: Snowflake, role: RoleName) -> Result<()> {
        let pool = create_pool(&PoolSettings::from(&self.config.database)).await?;
        PgRoleRepository::new(pool)
            .assign(&UserRole::new(user_id, role, None))
            .await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("/health") {
            format!("{}{path}", self.base_url())
        } else {
            format!("{}{path}", self.api_url())
        }
    }
}

pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {e}"))
}

pub async fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }
    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }
    true
}

pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

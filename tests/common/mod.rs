#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

use vidly_api::auth::{generate_jwt, Claims};
use vidly_api::config::AppConfig;
use vidly_api::database::memory::MemoryStore;
use vidly_api::database::models::User;
use vidly_api::database::{Repository, Store};
use vidly_api::state::AppState;

/// The real router served on a free port, backed by a fresh memory store.
pub struct TestServer {
    pub base_url: String,
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::for_tests()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let app = vidly_api::app(AppState::new(config.clone(), Store::from_memory(store.clone())));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            base_url,
            config,
            store,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Insert a user straight into the store and sign a token for it.
    pub async fn token(&self, is_admin: bool) -> Result<String> {
        let user = User {
            id: Uuid::new_v4(),
            name: if is_admin { "Admin User" } else { "Regular User" }.to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: String::new(),
            is_admin,
        };
        self.store.users.insert(&user).await?;
        let claims = Claims::for_user(&user, &self.config.security);
        Ok(generate_jwt(&claims, &self.config.security)?)
    }

    pub async fn user_token(&self) -> Result<String> {
        self.token(false).await
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.token(true).await
    }

    /// POST with a token and return the `data` of a successful response.
    pub async fn create(&self, path: &str, token: &str, body: &Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url(path))
            .header("x-auth-token", token)
            .json(body)
            .send()
            .await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        anyhow::ensure!(status == StatusCode::OK, "POST {} failed with {}: {}", path, status, body);
        Ok(body["data"].clone())
    }
}

/// Status and parsed JSON body.
pub async fn read(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await?;
    Ok((status, body))
}

use crate::domain::model::{ArchiveEntry, ArchiveFile, ResultSetEnvelope};
use crate::domain::ports::ArchiveApi;
use crate::utils::error::{Result, TestkitError};
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// 登入用的帳號密碼
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// 已登入的 XNAT REST client，所有請求都帶 JSESSIONID cookie
pub struct XnatClient {
    server: String,
    client: Client,
    session_id: String,
}

impl XnatClient {
    /// `POST /data/JSESSION` 取得 session，非 200 視為登入失敗
    pub async fn login(server: &str, credentials: &Credentials, timeout: Duration) -> Result<Self> {
        let server = server.trim_end_matches('/').to_string();
        let client = Client::builder().timeout(timeout).build()?;

        let login_url = format!("{}/data/JSESSION", server);
        tracing::debug!("Logging in to {} as {}", login_url, credentials.username);

        let response = client
            .post(&login_url)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(TestkitError::AuthenticationError {
                status: response.status().as_u16(),
            });
        }

        let session_id = response.text().await?.trim().to_string();
        if session_id.is_empty() {
            return Err(TestkitError::AuthenticationError { status: 200 });
        }

        tracing::info!("🔑 Logged in (JSESSIONID: {}...)", mask_session(&session_id));

        Ok(Self {
            server,
            client,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// `DELETE /data/JSESSION` 結束 session
    pub async fn logout(&self) -> Result<()> {
        let url = format!("{}/data/JSESSION", self.server);
        let response = self
            .client
            .delete(&url)
            .header(COOKIE, self.session_cookie())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TestkitError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        tracing::debug!("Session closed");
        Ok(())
    }

    fn session_cookie(&self) -> String {
        format!("JSESSIONID={}", self.session_id)
    }

    async fn get_result_set<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.server, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json")])
            .header(COOKIE, self.session_cookie())
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(TestkitError::UnexpectedStatus {
                status: response.status().as_u16(),
                url,
            });
        }

        let envelope: ResultSetEnvelope<T> = response.json().await?;
        Ok(envelope.result_set.result)
    }
}

#[async_trait]
impl ArchiveApi for XnatClient {
    async fn list_projects(&self) -> Result<Vec<ArchiveEntry>> {
        self.get_result_set("/data/archive/projects").await
    }

    async fn list_experiments(&self, project_id: &str) -> Result<Vec<ArchiveEntry>> {
        self.get_result_set(&format!("/data/archive/projects/{}/experiments", project_id))
            .await
    }

    async fn list_scans(&self, experiment_id: &str) -> Result<Vec<ArchiveEntry>> {
        self.get_result_set(&format!("/data/archive/experiments/{}/scans", experiment_id))
            .await
    }

    async fn list_scan_files(
        &self,
        experiment_id: &str,
        scan_id: &str,
        resource: &str,
    ) -> Result<Vec<ArchiveFile>> {
        self.get_result_set(&format!(
            "/data/archive/experiments/{}/scans/{}/resources/{}/files",
            experiment_id, scan_id, resource
        ))
        .await
    }
}

/// 只顯示 session id 的前 20 個字元
pub fn mask_session(session_id: &str) -> String {
    session_id.chars().take(20).collect()
}

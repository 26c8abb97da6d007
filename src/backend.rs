use crate::analytics::{CareerAnalytics, DashboardOverview, HealthStatus, SkillAnalytics};
use crate::config::BackendConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

/// The external AI-backed service. All intelligence lives behind this trait;
/// the workflow only forwards inputs and interprets payloads.
#[async_trait]
pub trait BackendClient: Send + Sync + Debug {
    /// Uploads a single PDF and returns the extracted plain text.
    async fn extract_text(&self, filename: &str, content: Vec<u8>) -> Result<String>;

    /// Instruction-driven completion; returns free model text.
    async fn chat(&self, instruction: &str) -> Result<String>;

    /// Career-path recommendation from raw CV text.
    async fn career_recommendation(&self, cv_text: &str) -> Result<String>;

    async fn dashboard_overview(&self, days: u32) -> Result<DashboardOverview>;
    async fn skills_analytics(&self) -> Result<SkillAnalytics>;
    async fn career_analytics(&self) -> Result<CareerAnalytics>;
    async fn health(&self) -> Result<HealthStatus>;
}

pub fn create_backend(config: &BackendConfig) -> Box<dyn BackendClient> {
    Box::new(HttpBackendClient::new(config))
}

#[derive(Debug)]
pub struct HttpBackendClient {
    base_url: String,
    user_id: Option<String>,
    retry_count: usize,
    retry_delay_seconds: u64,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct AgentRequest<'a> {
    instruction: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    text: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct CareerResponse {
    recommendation: Option<String>,
    error: Option<String>,
}

/// The dashboard routes wrap their payload.
#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl HttpBackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            retry_count: config.retry_count,
            retry_delay_seconds: config.retry_delay_seconds,
            client: reqwest::Client::new(),
        }
    }

    /// Transport-level retry. The failed-step retry the user sees is handled
    /// by the workflow; this only smooths over transient transport errors.
    async fn with_retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_err = anyhow!("no attempts made");
        for attempt in 0..=self.retry_count {
            if attempt > 0 {
                log::warn!(
                    "retrying {} ({}/{}): {}",
                    what,
                    attempt,
                    self.retry_count,
                    last_err
                );
                tokio::time::sleep(Duration::from_secs(self.retry_delay_seconds)).await;
            }
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => last_err = e,
            }
        }
        Err(last_err)
    }

    async fn extract_text_once(&self, filename: &str, content: Vec<u8>) -> Result<String> {
        let url = format!("{}/api/v1/agent/upload", self.base_url);
        let part = reqwest::multipart::Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self.client.post(&url).multipart(form).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("upload failed with {}: {}", status, body));
        }

        let result: UploadResponse = resp.json().await?;
        Ok(result.text)
    }

    async fn chat_once(&self, instruction: &str) -> Result<String> {
        let url = format!("{}/api/v1/agent/chat", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&AgentRequest { instruction })
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("chat failed with {}: {}", status, body));
        }

        let result: ChatResponse = resp.json().await?;
        // The agent route reports failures in-band with a 200 status.
        if let Some(error) = result.error {
            return Err(anyhow!("agent error: {}", error));
        }
        result
            .response
            .ok_or_else(|| anyhow!("chat response missing 'response' field"))
    }

    async fn career_once(&self, cv_text: &str) -> Result<String> {
        let url = format!("{}/api/v1/agent/career", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&AgentRequest { instruction: cv_text })
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("career request failed with {}: {}", status, body));
        }

        let result: CareerResponse = resp.json().await?;
        if let Some(error) = result.error {
            return Err(anyhow!("agent error: {}", error));
        }
        result
            .recommendation
            .ok_or_else(|| anyhow!("career response missing 'recommendation' field"))
    }

    async fn get_enveloped<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).query(query).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("GET {} failed with {}: {}", path, status, body));
        }

        let envelope: Envelope<T> = resp.json().await?;
        if !envelope.success {
            return Err(anyhow!(
                "GET {} rejected: {}",
                path,
                envelope.message.unwrap_or_else(|| "no message".to_string())
            ));
        }
        envelope
            .data
            .ok_or_else(|| anyhow!("GET {} returned success without data", path))
    }

    fn scope_query(&self) -> Vec<(&'static str, String)> {
        match &self.user_id {
            Some(user_id) => vec![("user_id", user_id.clone())],
            None => vec![],
        }
    }
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn extract_text(&self, filename: &str, content: Vec<u8>) -> Result<String> {
        self.with_retry("upload", || self.extract_text_once(filename, content.clone()))
            .await
    }

    async fn chat(&self, instruction: &str) -> Result<String> {
        self.with_retry("chat", || self.chat_once(instruction)).await
    }

    async fn career_recommendation(&self, cv_text: &str) -> Result<String> {
        self.with_retry("career", || self.career_once(cv_text)).await
    }

    async fn dashboard_overview(&self, days: u32) -> Result<DashboardOverview> {
        let mut query = vec![("days", days.to_string())];
        query.extend(self.scope_query());
        self.get_enveloped("/api/v1/dashboard/overview", &query).await
    }

    async fn skills_analytics(&self) -> Result<SkillAnalytics> {
        self.get_enveloped("/api/v1/dashboard/skills-analytics", &self.scope_query())
            .await
    }

    async fn career_analytics(&self) -> Result<CareerAnalytics> {
        self.get_enveloped("/api/v1/dashboard/career-analytics", &self.scope_query())
            .await
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("health check failed with {}", resp.status()));
        }
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_response_with_error_body() {
        // The route returns 200 with an error field when the agent fails.
        let json = r#"{"error": "model overloaded"}"#;
        let result: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(result.response.is_none());
        assert_eq!(result.error.as_deref(), Some("model overloaded"));
    }

    #[test]
    fn test_chat_response_success() {
        let json = r#"{"response": "1. Question one"}"#;
        let result: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(result.response.as_deref(), Some("1. Question one"));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_career_response_parsing() {
        let json = r#"{"recommendation": "Recommended Role: Backend Engineer (Confidence: 0.87)"}"#;
        let result: CareerResponse = serde_json::from_str(json).unwrap();
        assert!(result.recommendation.unwrap().contains("Backend Engineer"));
    }

    #[test]
    fn test_upload_response_parsing() {
        let json = r#"{"text": "John Doe, 5 years Python"}"#;
        let result: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(result.text, "John Doe, 5 years Python");
    }

    #[test]
    fn test_envelope_unwraps_data() {
        let json = r#"{"success": true, "data": {"status": "healthy"}, "message": "ok"}"#;
        let envelope: Envelope<HealthStatus> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert!(envelope.data.unwrap().is_healthy());
    }

    #[test]
    fn test_envelope_failure_keeps_message() {
        let json = r#"{"success": false, "message": "Failed to retrieve dashboard data"}"#;
        let envelope: Envelope<DashboardOverview> = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert!(envelope.message.unwrap().contains("dashboard"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = BackendConfig {
            base_url: "http://api.example/".to_string(),
            ..BackendConfig::default()
        };
        let client = HttpBackendClient::new(&config);
        assert_eq!(client.base_url, "http://api.example");
    }
}

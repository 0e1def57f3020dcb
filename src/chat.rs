use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// One turn of the conversation as the endpoint expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user<T: Into<String>>(text: T) -> Self {
        Self::turn(Role::User, text)
    }

    pub fn model<T: Into<String>>(text: T) -> Self {
        Self::turn(Role::Model, text)
    }

    fn turn<T: Into<String>>(role: Role, text: T) -> Self {
        Content {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: &'a [Content],
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed chat response: {0}")]
    Malformed(&'static str),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: format!("kabar-tui/{}", crate::VERSION),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Blocking client for the generative-language endpoint. One POST per send,
/// carrying the full accumulated conversation; no retry, no backoff, no
/// cancellation beyond the request timeout.
pub struct Client {
    http: HttpClient,
    user_agent: String,
    url: Url,
    api_key: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            bail!("chat client api key required");
        }
        if config.model.trim().is_empty() {
            bail!("chat client model name required");
        }

        let url = request_url(&config.endpoint, &config.model)?;
        let http = HttpClient::builder().timeout(config.timeout).build()?;

        Ok(Client {
            http,
            user_agent: config.user_agent,
            url,
            api_key: config.api_key,
        })
    }

    /// Sends the whole history and returns the reply text of the first
    /// candidate. Every deviation from the expected response shape is a
    /// `ChatError::Malformed`.
    pub fn generate(&self, contents: &[Content]) -> Result<String, ChatError> {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let response = self
            .http
            .post(url)
            .header(USER_AGENT, &self.user_agent)
            .json(&GenerateRequest { contents })
            .send()?;

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status()));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|_| ChatError::Malformed("response body is not valid JSON"))?;
        extract_reply(body)
    }
}

fn request_url(endpoint: &str, model: &str) -> Result<Url> {
    let raw = format!(
        "{}/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model
    );
    Url::parse(&raw).with_context(|| format!("parse chat endpoint url {raw:?}"))
}

/// Pure half of the response handling, kept separate so the malformed-shape
/// cases are unit testable without a server.
pub fn extract_reply(response: GenerateResponse) -> Result<String, ChatError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ChatError::Malformed("response has no candidates"))?;
    let content = candidate
        .content
        .ok_or(ChatError::Malformed("candidate has no content"))?;
    let part = content
        .parts
        .into_iter()
        .next()
        .ok_or(ChatError::Malformed("candidate content has no parts"))?;
    if part.text.is_empty() {
        return Err(ChatError::Malformed("candidate reply text is empty"));
    }
    Ok(part.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_from(value: serde_json::Value) -> GenerateResponse {
        serde_json::from_value(value).expect("test response decodes")
    }

    #[test]
    fn request_serializes_roles_lowercase() {
        let contents = vec![Content::user("halo"), Content::model("Halo juga!")];
        let body = serde_json::to_value(GenerateRequest {
            contents: &contents,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "halo"}]},
                    {"role": "model", "parts": [{"text": "Halo juga!"}]},
                ]
            })
        );
    }

    #[test]
    fn extract_reply_reads_first_candidate() {
        let response = response_from(json!({
            "candidates": [
                {"content": {"parts": [{"text": "Selamat pagi!"}]}},
                {"content": {"parts": [{"text": "ignored"}]}},
            ]
        }));
        assert_eq!(extract_reply(response).unwrap(), "Selamat pagi!");
    }

    #[test]
    fn missing_candidates_is_malformed() {
        let response = response_from(json!({}));
        assert!(matches!(
            extract_reply(response),
            Err(ChatError::Malformed("response has no candidates"))
        ));
    }

    #[test]
    fn candidate_without_parts_is_malformed() {
        let response = response_from(json!({
            "candidates": [{"content": {"parts": []}}]
        }));
        assert!(matches!(
            extract_reply(response),
            Err(ChatError::Malformed(_))
        ));
    }

    #[test]
    fn request_url_keeps_endpoint_path() {
        let url = request_url(DEFAULT_ENDPOINT, DEFAULT_MODEL).unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        let trailing = request_url("https://example.test/v1beta/", "m").unwrap();
        assert_eq!(
            trailing.as_str(),
            "https://example.test/v1beta/models/m:generateContent"
        );
    }
}

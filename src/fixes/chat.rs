//! Chat-completions rewrite collaborator
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. Groq is
//! preferred when `GROQ_API_KEY` is set, OpenAI otherwise.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use super::collaborator::{RewriteBudget, RewriteCollaborator};
use crate::config::CollaboratorConfig;
use crate::error::CollaboratorError;
use crate::rules::results::Issue;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are a senior software architect. \
Refactor code to improve quality while preserving functionality.";

/// Error bodies are cut to this many characters in messages
const MAX_ERROR_BODY: usize = 200;

/// Extra time the HTTP client gets over the engine's own timeout, so an
/// overrunning request is reported as an engine timeout
const CLIENT_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

fn client_timeout(config: &CollaboratorConfig) -> Duration {
    Duration::from_secs(config.timeout_secs) + CLIENT_TIMEOUT_GRACE
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Collaborator backed by a chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatCollaborator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl ChatCollaborator {
    /// Build a collaborator from configuration and the environment
    ///
    /// Returns `Ok(None)` when the collaborator is disabled or no API key is
    /// available for the selected provider.
    pub fn from_config(config: &CollaboratorConfig) -> Result<Option<Self>, CollaboratorError> {
        if !config.enabled {
            return Ok(None);
        }

        let groq = env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());
        let openai = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());

        let (api_key, base_url, model) = match (config.provider.as_str(), groq, openai) {
            ("groq" | "auto", Some(key), _) => (key, GROQ_BASE_URL, GROQ_MODEL),
            ("openai" | "auto", _, Some(key)) => (key, OPENAI_BASE_URL, OPENAI_MODEL),
            (provider, _, _) => {
                tracing::debug!(provider, "No API key for rewrite collaborator");
                return Ok(None);
            }
        };

        let client = reqwest::Client::builder()
            .timeout(client_timeout(config))
            .build()?;

        Ok(Some(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| base_url.to_string()),
            model: config.model.clone().unwrap_or_else(|| model.to_string()),
            api_key,
        }))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RewriteCollaborator for ChatCollaborator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn rewrite(
        &self,
        content: &str,
        issues: &[Issue],
        budget: &RewriteBudget,
    ) -> Result<String, CollaboratorError> {
        budget.check(content)?;
        let prompt = build_prompt(content, &issues[..issues.len().min(budget.max_issues)]);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.2,
            max_tokens: 4000,
        };

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body: String = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(MAX_ERROR_BODY)
                .collect();
            return Err(CollaboratorError::Status { status, body });
        }

        let parsed: ChatResponse = resp.json().await?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CollaboratorError::EmptyResponse)?;

        let code = strip_code_fences(&reply);
        if code.trim().is_empty() {
            return Err(CollaboratorError::EmptyResponse);
        }
        Ok(code)
    }
}

fn build_prompt(content: &str, issues: &[Issue]) -> String {
    let listing: Vec<String> = issues
        .iter()
        .map(|i| format!("- {}: {} (line {})", i.kind, i.message, i.line))
        .collect();

    format!(
        "Refactor this Python code to fix these issues:\n\n{}\n\nRules:\n\
1. Split long functions (>50 lines) into smaller helper functions\n\
2. Add logging statements (import logging, use logger)\n\
3. Add try-except error handling\n\
4. Keep all functionality identical\n\
5. Return ONLY the refactored code, no explanations\n\n\
Code:\n```python\n{}\n```\n\nRefactored code:",
        listing.join("\n"),
        content
    )
}

/// Keep only the body of the first fenced block, if the reply has one
fn strip_code_fences(reply: &str) -> String {
    if !reply.contains("```") {
        return reply.trim().to_string();
    }

    let lines: Vec<&str> = reply.lines().collect();
    let start = lines
        .iter()
        .position(|l| l.trim_start().starts_with("```"))
        .unwrap_or(0);
    let end = lines[start + 1..]
        .iter()
        .position(|l| l.trim_start().starts_with("```"))
        .map(|p| p + start + 1)
        .unwrap_or(lines.len());

    lines[start + 1..end].join("\n").trim().to_string()
}

//! Text generation for CraftConnect.
//!
//! All model traffic goes through `TextGenerator`. Feature modules never talk to
//! the API directly and always carry their own fallback content, so a missing key
//! or an outage degrades output instead of failing requests.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Used when `LLM_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const BASE_BACKOFF: Duration = Duration::from_millis(500);
/// Server-requested waits longer than this are clamped.
const MAX_RETRY_WAIT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Text generation is disabled (no API key configured)")]
    Disabled,
}

/// Anything that can turn a prompt into text. `AppState` carries an `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;

    /// Backend name for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserTurn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl MessagesResponse {
    /// All text blocks, concatenated in order.
    fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect()
    }
}

/// Outcome of a single HTTP attempt that did not succeed.
enum AttemptError {
    /// Worth retrying, optionally after a server-requested wait.
    Transient(LlmError, Option<Duration>),
    Fatal(LlmError),
}

/// 429, 5xx and Anthropic's 529 "overloaded" are retried; other failures are final.
fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Parses a `Retry-After` header given in whole seconds.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Wait before attempt `attempt + 1`: the server hint when present, exponential
/// backoff from `BASE_BACKOFF` otherwise, never more than `MAX_RETRY_WAIT`.
fn retry_delay(attempt: u32, hint: Option<Duration>) -> Duration {
    hint.unwrap_or_else(|| BASE_BACKOFF * 2u32.saturating_pow(attempt.saturating_sub(1)))
        .min(MAX_RETRY_WAIT)
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            http: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_once(&self, body: &MessagesRequest<'_>) -> Result<MessagesResponse, AttemptError> {
        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(LlmError::Http(e), None))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<MessagesResponse>()
                .await
                .map_err(|e| AttemptError::Fatal(LlmError::Http(e)));
        }

        let hint = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        let error = LlmError::Api {
            status: status.as_u16(),
            message,
        };

        if is_transient(status) {
            Err(AttemptError::Transient(error, hint))
        } else {
            Err(AttemptError::Fatal(error))
        }
    }

    /// Sends one user turn, retrying transient failures up to `MAX_ATTEMPTS` times.
    async fn send(&self, prompt: &str, system: &str) -> Result<MessagesResponse, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: [UserTurn {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&body).await {
                Ok(response) => {
                    debug!(
                        "LLM call succeeded on attempt {attempt}: input_tokens={}, output_tokens={}",
                        response.usage.input_tokens, response.usage.output_tokens
                    );
                    return Ok(response);
                }
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Transient(e, _)) if attempt >= MAX_ATTEMPTS => {
                    return Err(LlmError::Exhausted {
                        attempts: attempt,
                        last: e.to_string(),
                    });
                }
                Err(AttemptError::Transient(e, hint)) => {
                    let delay = retry_delay(attempt, hint);
                    warn!(
                        "LLM attempt {attempt}/{MAX_ATTEMPTS} failed ({e}), retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let text = self.send(prompt, system).await?.joined_text();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text)
    }

    fn backend(&self) -> &'static str {
        "anthropic"
    }
}

/// Used when no API key is configured. Every call fails, so callers serve fallbacks.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}

/// Calls the generator and deserializes the text response as JSON.
/// The prompt must instruct the model to return a JSON object.
pub async fn generate_json<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    prompt: &str,
    system: &str,
) -> Result<T, LlmError> {
    let text = generator.complete(prompt, system).await?;
    parse_json_reply(&text)
}

/// Parses a model reply that should contain one JSON object, tolerating code
/// fences and chatter around the object.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(text);
    let candidate = extract_json_object(text).unwrap_or(text);
    serde_json::from_str(candidate).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the slice from the first `{` to the last `}`, if both exist in order.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Normalizes model prose for plain-text display: drops markdown emphasis and
/// heading hashes, unifies bullet markers to "- ", collapses blank-line runs.
/// Text of an ATX heading: one to six `#` followed by whitespace or nothing.
fn strip_heading(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches('#');
    let hashes = line.len() - rest.len();
    let is_heading = (1..=6).contains(&hashes)
        && (rest.is_empty() || rest.starts_with(char::is_whitespace));
    is_heading.then(|| rest.trim_start())
}

pub fn clean_ai_text(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = true;

    for raw in text.lines() {
        let line = raw.replace("**", "").replace("__", "");
        let line = line.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            if !previous_blank {
                lines.push(String::new());
            }
            previous_blank = true;
            continue;
        }
        previous_blank = false;

        let cleaned = if let Some(heading) = strip_heading(trimmed) {
            heading.to_string()
        } else if let Some(rest) = trimmed
            .strip_prefix("* ")
            .or_else(|| trimmed.strip_prefix("• "))
            .or_else(|| trimmed.strip_prefix("- "))
        {
            format!("- {}", rest.trim_start())
        } else {
            line.to_string()
        };
        lines.push(cleaned);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Reply {
        key: String,
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_reply_ignores_surrounding_chatter() {
        let input = "Sure! Here is the story:\n{\"key\": \"value\"}\nHope this helps.";
        let reply: Reply = parse_json_reply(input).unwrap();
        assert_eq!(reply.key, "value");
    }

    #[test]
    fn test_parse_json_reply_rejects_prose() {
        let result: Result<Reply, _> = parse_json_reply("I cannot help with that.");
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_clean_ai_text_strips_markdown() {
        let input = "## The Loom\n\n\n**Ikat** is *resist-dyed* before weaving.\n* warp\n• weft\n\n";
        assert_eq!(
            clean_ai_text(input),
            "The Loom\n\nIkat is *resist-dyed* before weaving.\n- warp\n- weft"
        );
    }

    #[test]
    fn test_clean_ai_text_keeps_plain_paragraphs() {
        let input = "First paragraph.\n\nSecond paragraph.";
        assert_eq!(clean_ai_text(input), input);
    }

    #[test]
    fn test_clean_ai_text_keeps_hashes_that_are_not_headings() {
        assert_eq!(clean_ai_text("#Handmade goods sell well"), "#Handmade goods sell well");
        assert_eq!(clean_ai_text("#1 export craft"), "#1 export craft");
        assert_eq!(clean_ai_text("####### seven"), "####### seven");
        assert_eq!(clean_ai_text("###### Origins"), "Origins");
    }

    #[test]
    fn test_response_joins_text_blocks_and_skips_others() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{
                "content": [
                    {"type": "text", "text": "{\"key\": "},
                    {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                    {"type": "text", "text": "\"value\"}"}
                ],
                "usage": {"input_tokens": 12, "output_tokens": 7}
            }"#,
        )
        .unwrap();
        assert_eq!(response.joined_text(), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::BAD_GATEWAY));
        assert!(is_transient(StatusCode::from_u16(529).unwrap()));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_retry_delay() {
        assert_eq!(retry_delay(1, None), Duration::from_millis(500));
        assert_eq!(retry_delay(2, None), Duration::from_secs(1));
        assert_eq!(retry_delay(1, Some(Duration::from_secs(3))), Duration::from_secs(3));
        assert_eq!(retry_delay(1, Some(Duration::from_secs(600))), MAX_RETRY_WAIT);
        assert_eq!(retry_delay(30, None), MAX_RETRY_WAIT);
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after(" 7 "), Some(Duration::from_secs(7)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[tokio::test]
    async fn test_disabled_generator_always_fails() {
        let result = DisabledGenerator.complete("prompt", "system").await;
        assert!(matches!(result, Err(LlmError::Disabled)));
    }

    #[tokio::test]
    async fn test_generate_json_through_stub() {
        let stub = testing::StubGenerator::replying("```json\n{\"key\": \"madhubani\"}\n```");
        let reply: Reply = generate_json(&stub, "p", "s").await.unwrap();
        assert_eq!(reply.key, "madhubani");
        assert_eq!(stub.call_count(), 1);
    }
}

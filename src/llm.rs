//! Answer synthesis via an OpenAI-compatible chat completions API.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("no API key found, please set {0}")]
    MissingApiKey(String),

    #[error("LLM HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("LLM response has no choices")]
    EmptyResponse,
}

/// The answer-synthesis boundary: context plus question in, an HTML
/// fragment out. Implemented by [`LlmClient`]; tests substitute stubs.
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, context: &str, question: &str) -> anyhow::Result<String>;
}

pub struct LlmClient {
    config: LlmConfig,
    api_key: String,
}

impl LlmClient {
    /// Build a client, reading the API key from the configured env var.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| LlmError::MissingApiKey(config.api_key_env.clone()))?;

        Ok(Self {
            config: config.clone(),
            api_key,
        })
    }

    fn complete(&self, prompt: String) -> Result<String, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .build()?;

        let req_body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: Some(self.config.max_tokens),
        };

        let response = client
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        let resp_body: ChatResponse = response.json()?;

        resp_body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

impl Synthesizer for LlmClient {
    fn synthesize(&self, context: &str, question: &str) -> anyhow::Result<String> {
        Ok(self.complete(build_prompt(context, question))?)
    }
}

/// Build the completion prompt: retrieved context, the question, and the
/// formatting contract restricting output to h3/h4/p tags.
fn build_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are given the following context:

{context}

Question: {question}

Instructions:
- Write the answer in clean HTML.
- Use only <h3>, <h4>, and <p> tags for structuring the response.
- <h3> should be used for the main title.
- <h4> should be used for subheadings.
- <p> should be used for paragraphs of text.
- Do not use any other HTML tags.
"#
    )
}

// OpenAI-compatible request/response structures
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_question_and_format_contract() {
        let prompt = build_prompt("price rose today", "what happened to prices?");

        assert!(prompt.contains("price rose today"));
        assert!(prompt.contains("Question: what happened to prices?"));
        assert!(prompt.contains("<h3>, <h4>, and <p>"));
    }

    #[test]
    fn missing_api_key_is_typed_error() {
        let config = LlmConfig {
            api_key_env: "NEWSRAG_TEST_KEY_THAT_DOES_NOT_EXIST".to_string(),
            ..Default::default()
        };

        let result = LlmClient::from_config(&config);
        assert!(matches!(result, Err(LlmError::MissingApiKey(_))));
    }

    #[test]
    fn chat_response_parses_openai_shape() {
        let fixture = r#"{
            "id": "chatcmpl-1",
            "model": "llama-3.1-8b-instant",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "<h3>Answer</h3>"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let parsed: ChatResponse = serde_json::from_str(fixture).unwrap();
        assert_eq!(parsed.choices[0].message.content, "<h3>Answer</h3>");
    }

    #[test]
    fn request_serializes_single_user_message() {
        let req = ChatRequest {
            model: "llama-3.1-8b-instant".to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            max_tokens: Some(1000),
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 1000);
    }
}

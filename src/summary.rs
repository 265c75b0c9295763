//! Transcript summarization via OpenAI chat completions.

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;

use crate::error::{Result, SpillisteError};
use crate::openai::create_client;

/// Character budget for transcripts sent to the model.
pub const MAX_TRANSCRIPT_CHARS: usize = 15_000;

/// Bounded output length for the completion.
const MAX_OUTPUT_TOKENS: u32 = 1000;

/// Low randomness for reproducible summaries.
const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that summarizes video transcripts accurately and concisely.";

/// Trait for summary providers, so the pipeline can run against fakes.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Generate a summary for transcript text.
    async fn summarize(&self, transcript: &str) -> Result<String>;
}

/// Build the user prompt for a transcript, applying the character budget.
///
/// Returns the prompt and whether the transcript was truncated. Truncated
/// transcripts get an explicit notice and a request for an indented,
/// bulleted summary reflecting the content hierarchy.
pub fn build_prompt(transcript: &str, target_language: Option<&str>) -> (String, bool) {
    let truncated = transcript.chars().count() > MAX_TRANSCRIPT_CHARS;

    let body: String = if truncated {
        let head: String = transcript.chars().take(MAX_TRANSCRIPT_CHARS).collect();
        format!("{}... [transcript truncated due to length]", head)
    } else {
        transcript.to_string()
    };

    let language_instruction = match target_language {
        Some(lang) if lang != "en" => format!(" Provide the summary in {}.", lang),
        _ => String::new(),
    };

    let prompt = format!(
        "Please provide a reasonably detailed summary of the following transcript. \
         Please try to capture the logical flow of the transcript and use different \
         indentation and bullet points to express the hierarchy of the content.{}\n\n\
         Transcript:\n{}",
        language_instruction, body
    );

    (prompt, truncated)
}

/// Summarizer backed by an OpenAI chat model.
pub struct Summarizer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    target_language: Option<String>,
}

impl Summarizer {
    pub fn new(model: &str, target_language: Option<&str>, api_key: Option<&str>) -> Self {
        Self {
            client: create_client(api_key),
            model: model.to_string(),
            target_language: target_language.map(|s| s.to_string()),
        }
    }
}

#[async_trait]
impl SummaryProvider for Summarizer {
    async fn summarize(&self, transcript: &str) -> Result<String> {
        if transcript.trim().is_empty() {
            return Err(SpillisteError::Summary(
                "No transcript available to summarize".to_string(),
            ));
        }

        let (prompt, _truncated) = build_prompt(transcript, self.target_language.as_deref());

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| SpillisteError::Summary(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| SpillisteError::Summary(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(TEMPERATURE)
            .max_completion_tokens(MAX_OUTPUT_TOKENS)
            .build()
            .map_err(|e| SpillisteError::Summary(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SpillisteError::OpenAI(format!("Failed to generate summary: {}", e)))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SpillisteError::Summary("Empty response from model".to_string()))?
            .trim()
            .to_string();

        Ok(summary)
    }
}

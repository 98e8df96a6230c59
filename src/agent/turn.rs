use anyhow::{Context, Result};
use serde_json::Value;

use crate::agent::dispatch::{dispatch, tool_declarations};
use crate::llm::provider::{ChatProvider, ChatRequest, ChatTurn};
use crate::notify::Notify;
use crate::record::{FeedbackRecorder, InterestRecorder};

pub const APOLOGY_REPLY: &str =
    "I apologize, but I'm experiencing technical difficulties. Please try again.";

/// One conversation turn is at most two completion calls: the first offers
/// the tool schema, and if the model requests tools, their results are folded
/// into a second call with no tools offered.
pub struct ChatAgent<P, N> {
    provider: P,
    interest: InterestRecorder<N>,
    feedback: FeedbackRecorder<N>,
    system_prompt: String,
}

impl<P: ChatProvider, N: Notify> ChatAgent<P, N> {
    pub fn new(
        provider: P,
        interest: InterestRecorder<N>,
        feedback: FeedbackRecorder<N>,
        system_prompt: String,
    ) -> Self {
        Self {
            provider,
            interest,
            feedback,
            system_prompt,
        }
    }

    /// Runs one turn against the caller-supplied history. Never surfaces an
    /// error to the visitor: any failure collapses into a fixed apology,
    /// with the structured cause logged to stderr.
    pub async fn reply(&self, message: &str, history: &[(String, String)]) -> String {
        match self.run_turn(message, history).await {
            Ok(text) => text,
            Err(err) => {
                eprintln!("[agent] turn failed: {err:#}");
                APOLOGY_REPLY.to_string()
            }
        }
    }

    async fn run_turn(&self, message: &str, history: &[(String, String)]) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() * 2 + 2);
        messages.push(ChatTurn::system(&self.system_prompt));
        for (user, assistant) in history {
            messages.push(ChatTurn::user(user));
            if !assistant.is_empty() {
                messages.push(ChatTurn::assistant(assistant));
            }
        }
        messages.push(ChatTurn::user(message));

        let first = self
            .provider
            .complete(ChatRequest {
                messages: messages.clone(),
                tools: tool_declarations(),
            })
            .await?;

        if first.tool_calls.is_empty() {
            return Ok(first.content);
        }

        messages.push(ChatTurn::assistant_with_calls(
            first.content.clone(),
            first.tool_calls.clone(),
        ));

        for call in &first.tool_calls {
            let args: Value = serde_json::from_str(&call.arguments)
                .with_context(|| format!("malformed arguments for tool {}", call.name))?;
            let result = dispatch(&self.interest, &self.feedback, &call.name, &args).await?;
            messages.push(ChatTurn::tool_result(&call.id, &call.name, result));
        }

        let second = self
            .provider
            .complete(ChatRequest {
                messages,
                tools: vec![],
            })
            .await?;
        Ok(second.content)
    }
}

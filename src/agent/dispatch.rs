use anyhow::Result;
use serde_json::{Value, json};

use crate::llm::provider::ToolDeclaration;
use crate::notify::Notify;
use crate::record::{FeedbackRecorder, InterestRecorder};

pub const INTEREST_TOOL: &str = "record_customer_interest";
pub const FEEDBACK_TOOL: &str = "record_feedback";
pub const UNKNOWN_TOOL_REPLY: &str = "Unknown tool";

pub fn tool_declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: INTEREST_TOOL.to_string(),
            description: "Record a customer's contact information and interest in NeuraVis \
                          services. Use when customer wants to learn more, get contacted, or \
                          shows interest in our services."
                .to_string(),
            parameters_json_schema: json!({
                "type": "object",
                "properties": {
                    "email": {
                        "type": "string",
                        "description": "Customer's email address"
                    },
                    "name": {
                        "type": "string",
                        "description": "Customer's full name"
                    },
                    "message": {
                        "type": "string",
                        "description": "Customer's message, interest area, or specific needs"
                    }
                },
                "required": ["email", "name", "message"]
            }),
        },
        ToolDeclaration {
            name: FEEDBACK_TOOL.to_string(),
            description: "Record questions that you cannot answer or customer feedback. Use \
                          when you don't have enough information to answer a question."
                .to_string(),
            parameters_json_schema: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The question or feedback from the customer"
                    }
                },
                "required": ["question"]
            }),
        },
    ]
}

/// Routes one parsed tool call to its recorder. Unrecognized names answer
/// with a sentinel string instead of failing the turn.
pub async fn dispatch<N: Notify>(
    interest: &InterestRecorder<N>,
    feedback: &FeedbackRecorder<N>,
    name: &str,
    args: &Value,
) -> Result<String> {
    match name {
        INTEREST_TOOL => {
            interest
                .record(
                    str_arg(args, "email"),
                    str_arg(args, "name"),
                    str_arg(args, "message"),
                )
                .await
        }
        FEEDBACK_TOOL => feedback.record(str_arg(args, "question")).await,
        _ => Ok(UNKNOWN_TOOL_REPLY.to_string()),
    }
}

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{FEEDBACK_TOOL, INTEREST_TOOL, UNKNOWN_TOOL_REPLY, dispatch, tool_declarations};
    use crate::notify::RecordingNotifier;
    use crate::record::{FeedbackRecorder, InterestRecorder};
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        tmp: TempDir,
        interest: InterestRecorder<RecordingNotifier>,
        feedback: FeedbackRecorder<RecordingNotifier>,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().expect("tempdir");
            let interest = InterestRecorder::new(
                tmp.path().join("customer_leads.log"),
                RecordingNotifier::succeeding(),
            );
            let feedback = FeedbackRecorder::new(
                tmp.path().join("customer_feedback.log"),
                RecordingNotifier::succeeding(),
            );
            Self {
                tmp,
                interest,
                feedback,
            }
        }

        fn lead_log(&self) -> PathBuf {
            self.tmp.path().join("customer_leads.log")
        }

        fn feedback_log(&self) -> PathBuf {
            self.tmp.path().join("customer_feedback.log")
        }
    }

    #[test]
    fn declarations_cover_exactly_the_two_tools() {
        let declarations = tool_declarations();
        let names: Vec<&str> = declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![INTEREST_TOOL, FEEDBACK_TOOL]);

        let interest = &declarations[0].parameters_json_schema;
        assert_eq!(interest["required"], json!(["email", "name", "message"]));
        let feedback = &declarations[1].parameters_json_schema;
        assert_eq!(feedback["required"], json!(["question"]));
    }

    #[tokio::test]
    async fn dispatch_routes_customer_interest() {
        let fx = Fixture::new();
        let args = json!({"email": "ada@example.com", "name": "Ada", "message": "demo please"});

        let reply = dispatch(&fx.interest, &fx.feedback, INTEREST_TOOL, &args)
            .await
            .expect("dispatch succeeds");

        assert!(reply.contains("Ada"));
        assert!(reply.contains("ada@example.com"));
        assert!(fx.lead_log().is_file());
        assert!(!fx.feedback_log().exists());
    }

    #[tokio::test]
    async fn dispatch_routes_feedback() {
        let fx = Fixture::new();
        let args = json!({"question": "What does a pilot cost?"});

        let reply = dispatch(&fx.interest, &fx.feedback, FEEDBACK_TOOL, &args)
            .await
            .expect("dispatch succeeds");

        assert!(reply.contains("recorded your question"));
        let content = fs::read_to_string(fx.feedback_log()).expect("read log");
        assert!(content.contains("What does a pilot cost?"));
        assert!(!fx.lead_log().exists());
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_returns_sentinel_without_side_effects() {
        let fx = Fixture::new();

        let reply = dispatch(&fx.interest, &fx.feedback, "transfer_funds", &json!({}))
            .await
            .expect("dispatch succeeds");

        assert_eq!(reply, UNKNOWN_TOOL_REPLY);
        assert!(!fx.lead_log().exists());
        assert!(!fx.feedback_log().exists());
    }

    #[tokio::test]
    async fn dispatch_defaults_missing_fields_to_empty_strings() {
        let fx = Fixture::new();

        let reply = dispatch(&fx.interest, &fx.feedback, INTEREST_TOOL, &json!({"name": "Ada"}))
            .await
            .expect("dispatch succeeds");

        assert!(reply.contains("Ada"));
        let content = fs::read_to_string(fx.lead_log()).expect("read log");
        assert!(content.contains("| Email:  | Message: "));
    }
}

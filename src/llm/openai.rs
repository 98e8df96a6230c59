use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::{
    ChatCompletion, ChatProvider, ChatRequest, ChatRole, ChatTurn, LlmError, LlmResult,
    ToolCallRequest, ToolDeclaration,
};
use crate::http::client::HttpClient;

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(
        http: HttpClient,
        api_key: Option<String>,
        model: String,
        base_url: String,
    ) -> LlmResult<Self> {
        let api_key = api_key
            .filter(|v| !v.trim().is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        Ok(Self {
            http,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, request: &ChatRequest) -> WireChatRequest {
        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(request.tools.iter().map(wire_tool).collect())
        };

        WireChatRequest {
            model: self.model.clone(),
            messages: request.messages.iter().map(wire_message).collect(),
            tool_choice: tools.as_ref().map(|_| "auto"),
            tools,
        }
    }

    fn extract_completion(body: &str) -> LlmResult<ChatCompletion> {
        let parsed = serde_json::from_str::<WireChatResponse>(body)
            .map_err(|err| LlmError::Parse(err.to_string()))?;

        let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ChatCompletion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

impl ChatProvider for OpenAiProvider {
    async fn complete(&self, request: ChatRequest) -> LlmResult<ChatCompletion> {
        let payload = self.build_request(&request);
        let resp = self
            .http
            .post_json(&self.endpoint(), Some(&self.api_key), &payload)
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        if !(200..300).contains(&resp.status) {
            let body = resp.body.chars().take(400).collect::<String>();
            return Err(LlmError::HttpStatus {
                status: resp.status,
                body,
            });
        }

        Self::extract_completion(&resp.body)
    }
}

fn wire_message(turn: &ChatTurn) -> WireMessage {
    let role = match turn.role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
        ChatRole::Tool => "tool",
    };

    // An assistant echo turn that only carries tool calls has null content.
    let content = if turn.content.is_empty() && !turn.tool_calls.is_empty() {
        None
    } else {
        Some(turn.content.clone())
    };

    WireMessage {
        role,
        content,
        tool_calls: turn
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                kind: "function".to_string(),
                function: WireFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect(),
        tool_call_id: turn.tool_call_id.clone(),
        name: turn.tool_name.clone(),
    }
}

fn wire_tool(declaration: &ToolDeclaration) -> WireTool {
    WireTool {
        kind: "function",
        function: WireFunctionDeclaration {
            name: declaration.name.clone(),
            description: declaration.description.clone(),
            parameters: declaration.parameters_json_schema.clone(),
        },
    }
}

#[derive(Debug, Serialize)]
struct WireChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionDeclaration,
}

#[derive(Debug, Serialize)]
struct WireFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct WireChatResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[cfg(test)]
mod tests {
    use super::OpenAiProvider;
    use crate::http::client::HttpClient;
    use crate::http::debug::HttpDebugConfig;
    use crate::llm::provider::{ChatProvider, ChatRequest, ChatTurn, LlmError, ToolDeclaration};
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(
            HttpClient::new(Client::new(), HttpDebugConfig::disabled()),
            Some("test-key".to_string()),
            "test-model".to_string(),
            server.uri(),
        )
        .expect("provider")
    }

    fn declared_tool() -> ToolDeclaration {
        ToolDeclaration {
            name: "record_feedback".to_string(),
            description: "Record feedback".to_string(),
            parameters_json_schema: json!({"type": "object", "properties": {}}),
        }
    }

    #[tokio::test]
    async fn complete_sends_tools_and_returns_text_content() {
        let server = MockServer::start().await;
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "hello from the model"}}
            ]
        }"#;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_string_contains("\"model\":\"test-model\""))
            .and(body_string_contains("\"tool_choice\":\"auto\""))
            .and(body_string_contains("record_feedback"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let out = provider_for(&server)
            .complete(ChatRequest {
                messages: vec![ChatTurn::system("prompt"), ChatTurn::user("hi")],
                tools: vec![declared_tool()],
            })
            .await
            .expect("success response");

        assert_eq!(out.content, "hello from the model");
        assert!(out.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn complete_parses_tool_call_requests() {
        let server = MockServer::start().await;
        let body = r#"{
            "choices": [
                {"message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "call_1", "type": "function",
                         "function": {"name": "record_feedback",
                                      "arguments": "{\"question\":\"pricing?\"}"}}
                    ]
                }}
            ]
        }"#;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let out = provider_for(&server)
            .complete(ChatRequest {
                messages: vec![ChatTurn::user("hi")],
                tools: vec![declared_tool()],
            })
            .await
            .expect("success response");

        assert_eq!(out.content, "");
        assert_eq!(out.tool_calls.len(), 1);
        assert_eq!(out.tool_calls[0].id, "call_1");
        assert_eq!(out.tool_calls[0].name, "record_feedback");
        assert_eq!(out.tool_calls[0].arguments, "{\"question\":\"pricing?\"}");
    }

    #[tokio::test]
    async fn complete_omits_tools_when_none_offered() {
        let server = MockServer::start().await;
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "final"}}]}"#;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let out = provider_for(&server)
            .complete(ChatRequest {
                messages: vec![ChatTurn::user("hi")],
                tools: vec![],
            })
            .await
            .expect("success response");
        assert_eq!(out.content, "final");

        let requests = server.received_requests().await.expect("requests recorded");
        let sent = String::from_utf8(requests[0].body.clone()).expect("utf8 body");
        assert!(!sent.contains("\"tools\""));
        assert!(!sent.contains("\"tool_choice\""));
    }

    #[tokio::test]
    async fn complete_maps_http_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(ChatRequest {
                messages: vec![ChatTurn::user("hi")],
                tools: vec![],
            })
            .await
            .expect_err("expected auth error");

        match err {
            LlmError::HttpStatus { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid key"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_returns_empty_response_error_when_no_choices() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"choices": []}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(ChatRequest {
                messages: vec![ChatTurn::user("hi")],
                tools: vec![],
            })
            .await
            .expect_err("expected empty response error");

        assert_eq!(err, LlmError::EmptyResponse);
    }

    #[tokio::test]
    async fn complete_maps_unparseable_body_to_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(ChatRequest {
                messages: vec![ChatTurn::user("hi")],
                tools: vec![],
            })
            .await
            .expect_err("expected parse error");

        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn new_requires_api_key() {
        let err = OpenAiProvider::new(
            HttpClient::new(Client::new(), HttpDebugConfig::disabled()),
            None,
            "test-model".to_string(),
            "https://example.com".to_string(),
        )
        .expect_err("missing key should fail");

        assert_eq!(err, LlmError::MissingApiKey);
    }
}

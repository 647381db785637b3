//! OpenAI client implementation using async-openai library

use crate::config::ResolvedLlmConfig;
use crate::error::{ConfigError, Error, LlmError, Result};
use crate::llm::{
    ChatOptions, FinishReason, LlmClient, LlmMessage, LlmResponse, ToolChoice, ToolDefinition,
    Usage,
};
use crate::tools::ToolCall;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall,
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestToolMessage, ChatCompletionRequestToolMessageContent,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// OpenAI client using async-openai library
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::Llm(LlmError::Authentication {
                message: "No API key found for OpenAI".to_string(),
            }));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(config.base_url.trim_end_matches('/'));

        let mut client = Client::with_config(openai_config);
        if !config.headers.is_empty() {
            let http = reqwest::Client::builder()
                .default_headers(Self::build_headers(config)?)
                .build()?;
            client = client.with_http_client(http);
        }

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    fn build_headers(config: &ResolvedLlmConfig) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                ConfigError::InvalidValue {
                    field: "headers".to_string(),
                    value: key.clone(),
                }
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidValue {
                field: format!("headers.{}", key),
                value: value.clone(),
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Convert our internal message format to async-openai format
    fn convert_messages(&self, messages: Vec<LlmMessage>) -> Vec<ChatCompletionRequestMessage> {
        messages
            .into_iter()
            .map(|message| match message {
                LlmMessage::System { content } => {
                    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                        content: content.into(),
                        name: None,
                    })
                }
                LlmMessage::User { content } => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: content.into(),
                        name: None,
                    })
                }
                LlmMessage::Assistant {
                    content,
                    tool_calls,
                } => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessage {
                        content: content.map(ChatCompletionRequestAssistantMessageContent::Text),
                        name: None,
                        tool_calls: if tool_calls.is_empty() {
                            None
                        } else {
                            Some(tool_calls.iter().map(Self::convert_tool_call).collect())
                        },
                        audio: None,
                        refusal: None,
                        ..Default::default()
                    },
                ),
                LlmMessage::Tool {
                    tool_call_id,
                    content,
                } => ChatCompletionRequestMessage::Tool(ChatCompletionRequestToolMessage {
                    content: ChatCompletionRequestToolMessageContent::Text(content),
                    tool_call_id,
                }),
            })
            .collect()
    }

    fn convert_tool_call(call: &ToolCall) -> ChatCompletionMessageToolCall {
        ChatCompletionMessageToolCall {
            id: call.id.clone(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall {
                name: call.name.clone(),
                arguments: call.arguments_text(),
            },
        }
    }

    /// Convert our tool definitions to async-openai format
    fn convert_tools(&self, tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
        tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.function.name,
                    description: Some(tool.function.description),
                    parameters: Some(tool.function.parameters),
                    strict: None,
                },
            })
            .collect()
    }

    fn convert_tool_choice(choice: ToolChoice) -> ChatCompletionToolChoiceOption {
        match choice {
            ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
            ToolChoice::None => ChatCompletionToolChoiceOption::None,
        }
    }

    /// Convert async-openai response to our internal format
    fn convert_response(
        &self,
        response: async_openai::types::CreateChatCompletionResponse,
    ) -> Result<LlmResponse> {
        let choice =
            response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LlmError::MalformedResponse {
                    message: "No choices in response".to_string(),
                })?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tool_call| {
                ToolCall::from_raw(
                    tool_call.id,
                    tool_call.function.name,
                    tool_call.function.arguments,
                )
            })
            .collect();

        let content = choice.message.content.filter(|text| !text.is_empty());
        let message = LlmMessage::assistant_with_tools(content, tool_calls);

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let finish_reason = choice.finish_reason.map(|reason| match reason {
            async_openai::types::FinishReason::Stop => FinishReason::Stop,
            async_openai::types::FinishReason::Length => FinishReason::Length,
            async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
            async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
            async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
        });

        Ok(LlmResponse {
            message,
            usage,
            model: response.model,
            finish_reason,
        })
    }
}

fn map_api_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::Reqwest(e) => LlmError::Network {
            message: e.to_string(),
        },
        other => LlmError::ApiError {
            status: 500, // async-openai doesn't expose status codes directly
            message: other.to_string(),
        },
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let converted_messages = self.convert_messages(messages);
        let converted_tools = tools
            .filter(|t| !t.is_empty())
            .map(|t| self.convert_tools(t));
        let has_tools = converted_tools.is_some();

        if let Some(ref tools) = converted_tools {
            tracing::debug!("OpenAI request with {} tools enabled", tools.len());
        }

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(converted_messages);

        if let Some(tools) = converted_tools {
            request_builder.tools(tools);
        }

        if let Some(opts) = options {
            if let Some(max_tokens) = opts.max_tokens {
                request_builder.max_tokens(max_tokens);
            }
            if let Some(temperature) = opts.temperature {
                request_builder.temperature(temperature);
            }
            if let Some(top_p) = opts.top_p {
                request_builder.top_p(top_p);
            }
            // tool_choice is only valid alongside tools
            if let Some(choice) = opts.tool_choice.filter(|_| has_tools) {
                request_builder.tool_choice(Self::convert_tool_choice(choice));
            }
        }

        let request = request_builder.build().map_err(|e| {
            tracing::error!("Failed to build OpenAI request: {}", e);
            LlmError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            }
        })?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!("OpenAI API call failed: {}", e);
            map_api_error(e)
        })?;

        let response = self.convert_response(response)?;
        let tool_calls = response.message.tool_calls();
        if !tool_calls.is_empty() {
            tracing::debug!("OpenAI response contains {} tool calls", tool_calls.len());
            for call in tool_calls {
                tracing::debug!("Tool call: {} (id: {})", call.name, call.id);
            }
        }

        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

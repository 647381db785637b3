//! AgentCore implementation

use super::config::AgentConfig;
use crate::agent::{Agent, AgentExecution, AgentResult};
use crate::conversation::Conversation;
use crate::error::{AgentError, Error, LlmError, Result, ToolError};
use crate::llm::{ChatOptions, LlmClient, LlmMessage, LlmResponse, ToolChoice, ToolDefinition};
use crate::output::{
    AgentEvent, AgentOutput, TokenUsage, ToolExecutionInfo, ToolExecutionStatus,
};
use crate::tools::{ToolBackend, ToolCall};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Where a turn currently stands
#[derive(Debug)]
enum LoopState {
    /// Next step is a model request
    AwaitingModel,
    /// The model asked for these calls, to be run in order
    DispatchingTools(Vec<ToolCall>),
    /// Turn finished with the final assistant text
    Done(Option<String>),
}

/// Drives the model/tool loop for each query
pub struct AgentCore {
    config: AgentConfig,
    llm_client: Arc<dyn LlmClient>,
    backend: Arc<dyn ToolBackend>,
    output: Box<dyn AgentOutput>,
}

impl AgentCore {
    pub fn new(
        config: AgentConfig,
        llm_client: Arc<dyn LlmClient>,
        backend: Arc<dyn ToolBackend>,
        output: Box<dyn AgentOutput>,
    ) -> Self {
        Self {
            config,
            llm_client,
            backend,
            output,
        }
    }

    /// Get agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn emit(&self, event: AgentEvent) {
        if let Err(e) = self.output.emit_event(event).await {
            tracing::debug!("Failed to emit agent event: {}", e);
        }
    }

    /// Send the conversation to the model, with the system prompt in front
    async fn request_model(
        &self,
        conversation: &Conversation,
        tools: &[ToolDefinition],
        tool_choice: &ToolChoice,
    ) -> Result<LlmResponse> {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        if let Some(prompt) = &self.config.system_prompt {
            messages.push(LlmMessage::system(prompt.clone()));
        }
        messages.extend(conversation.messages().iter().cloned());

        let options = ChatOptions {
            max_tokens: Some(self.config.max_tokens),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            tool_choice: Some(tool_choice.clone()),
        };

        let seconds = self.config.llm_timeout_secs;
        let request = self
            .llm_client
            .chat_completion(messages, Some(tools.to_vec()), Some(options));

        match tokio::time::timeout(Duration::from_secs(seconds), request).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                tracing::error!("LLM request failed: {}", e);
                Err(e)
            }
            Err(_) => {
                tracing::error!(seconds, "LLM request timed out");
                Err(LlmError::Timeout { seconds }.into())
            }
        }
    }

    /// Run one call; failures become the tool message content
    async fn dispatch(&self, call: &ToolCall) -> (String, ToolExecutionStatus) {
        let timeout = Duration::from_secs(self.config.tool_timeout_secs);
        tracing::info!(tool = %call.name, id = %call.id, "dispatching tool call");

        let result = match tokio::time::timeout(timeout, self.backend.invoke(call)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                name: call.name.clone(),
            }
            .into()),
        };

        match result {
            Ok(content) => (content, ToolExecutionStatus::Success),
            Err(e) => {
                tracing::warn!(tool = %call.name, "tool call failed: {}", e);
                (format!("Error: {}", describe(&e)), ToolExecutionStatus::Error)
            }
        }
    }
}

/// Error text without the top-level category prefix
fn describe(error: &Error) -> String {
    match error {
        Error::Tool(e) => e.to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Agent for AgentCore {
    async fn process_query(
        &self,
        query: &str,
        conversation: &mut Conversation,
    ) -> AgentResult<AgentExecution> {
        let start_time = Instant::now();
        let start_len = conversation.len();

        let tool_choice = self.config.tool_policy.choice_for(query);
        let tools: Vec<ToolDefinition> = self
            .backend
            .list_tools()
            .await?
            .iter()
            .map(|schema| schema.to_definition())
            .collect();
        tracing::debug!(?tool_choice, tools = tools.len(), "starting turn");

        conversation.push_user(query);

        let mut iterations = 0;
        let mut tool_calls_executed = 0;
        let mut token_usage = TokenUsage::default();
        let mut state = LoopState::AwaitingModel;

        let final_text = loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if iterations >= self.config.max_iterations {
                        tracing::warn!(iterations, "iteration cap reached");
                        return Err(AgentError::MaxIterationsExceeded {
                            max_iterations: self.config.max_iterations,
                        }
                        .into());
                    }
                    iterations += 1;
                    tracing::debug!(iteration = iterations, "awaiting model");

                    let response = self
                        .request_model(conversation, &tools, &tool_choice)
                        .await?;

                    if let Some(usage) = response.usage {
                        token_usage.input_tokens += usage.prompt_tokens;
                        token_usage.output_tokens += usage.completion_tokens;
                        token_usage.total_tokens += usage.total_tokens;
                        if let Err(e) = self.output.emit_token_update(token_usage).await {
                            tracing::debug!("Failed to emit token update: {}", e);
                        }
                    }

                    let text = response
                        .message
                        .get_text()
                        .filter(|t| !t.trim().is_empty())
                        .map(str::to_string);
                    if let Some(text) = &text {
                        self.emit(AgentEvent::AssistantText { text: text.clone() })
                            .await;
                    }

                    let calls = response.message.tool_calls().to_vec();
                    if calls.is_empty() {
                        conversation
                            .push(LlmMessage::assistant_with_tools(text.clone(), Vec::new()))?;
                        LoopState::Done(text)
                    } else if tool_choice == ToolChoice::None {
                        let tools: Vec<String> = calls.iter().map(|c| c.name.clone()).collect();
                        tracing::warn!(?tools, "model requested tools while tools were disabled");
                        self.emit(AgentEvent::PolicyViolation {
                            tools: tools.clone(),
                        })
                        .await;
                        return Err(AgentError::PolicyViolation { tools }.into());
                    } else {
                        conversation.push(response.message)?;
                        LoopState::DispatchingTools(calls)
                    }
                }
                LoopState::DispatchingTools(calls) => {
                    tracing::debug!(count = calls.len(), "dispatching tools");
                    for call in &calls {
                        self.emit(AgentEvent::ToolExecutionStarted {
                            tool_info: ToolExecutionInfo::new(
                                call,
                                ToolExecutionStatus::Executing,
                                None,
                            ),
                        })
                        .await;

                        let (content, status) = self.dispatch(call).await;
                        self.emit(AgentEvent::ToolExecutionCompleted {
                            tool_info: ToolExecutionInfo::new(call, status, Some(content.clone())),
                        })
                        .await;

                        conversation.push(LlmMessage::tool(call.id.clone(), content))?;
                        tool_calls_executed += 1;
                    }
                    LoopState::AwaitingModel
                }
                LoopState::Done(text) => break text,
            };
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(iterations, tool_calls_executed, duration_ms, "turn complete");

        Ok(AgentExecution {
            final_text,
            iterations,
            tool_calls_executed,
            messages_appended: conversation.len() - start_len,
            token_usage,
            duration_ms,
        })
    }

    fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn agent_type(&self) -> &str {
        "paper_chat"
    }
}

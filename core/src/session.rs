//! Interactive query loop over a single conversation

use crate::agent::Agent;
use crate::conversation::Conversation;
use crate::error::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const BANNER: &str = "Paper Chat Started!\nType your queries or 'quit' to exit.";
pub const PROMPT: &str = "\nQuery: ";
pub const QUIT_COMMAND: &str = "quit";

/// Reads queries line by line and hands them to an agent.
///
/// Turn errors are reported and the loop continues.
pub struct ChatSession<A: Agent> {
    agent: A,
    conversation: Conversation,
}

impl<A: Agent> ChatSession<A> {
    pub fn new(agent: A) -> Self {
        Self {
            agent,
            conversation: Conversation::new(),
        }
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run until `quit` or end of input. Returns the number of queries
    /// processed, failed ones included.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut processed = 0;

        output.write_all(format!("{}\n", BANNER).as_bytes()).await?;

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                tracing::debug!("input closed");
                break;
            };
            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            if query.eq_ignore_ascii_case(QUIT_COMMAND) {
                break;
            }

            processed += 1;
            match self.agent.process_query(query, &mut self.conversation).await {
                Ok(execution) => {
                    tracing::debug!(
                        iterations = execution.iterations,
                        tool_calls = execution.tool_calls_executed,
                        duration_ms = execution.duration_ms,
                        "query processed"
                    );
                }
                Err(e) => {
                    tracing::warn!("query failed: {}", e);
                    output.write_all(format!("\nError: {}\n", e).as_bytes()).await?;
                }
            }
        }

        output.flush().await?;
        Ok(processed)
    }
}

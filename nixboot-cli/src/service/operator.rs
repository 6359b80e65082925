//! Operator service
//!
//! The human at the console: answers prompts, acknowledges rendezvous points
//! and reads the notices the pipeline emits.

use anyhow::Result;
use async_trait::async_trait;
use nixboot_core::Stage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

use crate::console;

/// Something the pipeline wants the operator to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A stage is starting
    Step(Stage),
    Info(String),
    Warning(String),
    Success(String),
    /// Public key and the link where it has to be registered
    Registration {
        repository: String,
        public_key: String,
        link: String,
    },
}

/// Service trait for operator interaction
#[async_trait]
pub trait Operator: Send + Sync {
    /// Shows `prompt` and waits for one line of input
    ///
    /// # Returns
    /// The line without its line terminator, or `None` once input is closed
    async fn read_line(&self, prompt: &str) -> Result<Option<String>>;

    /// Presents a notice
    fn notify(&self, notice: Notice);
}

/// Operator at an interactive terminal
///
/// Input is read as raw bytes and decoded lossily, so a line that is not
/// valid UTF-8 still reaches the stage as an answer. Only end of input
/// yields `None`.
pub struct TerminalOperator<R = BufReader<Stdin>> {
    input: Mutex<R>,
}

impl TerminalOperator {
    /// Creates an operator reading from the process stdin
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> TerminalOperator<R> {
    /// Creates an operator reading answers from `input`
    pub fn from_reader(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

impl Default for TerminalOperator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> Operator for TerminalOperator<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        console::prompt(prompt);

        let mut bytes = Vec::new();
        let read = self.input.lock().await.read_until(b'\n', &mut bytes).await?;
        if read == 0 {
            println!();
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&bytes);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Step(stage) => console::step(stage),
            Notice::Info(message) => console::info(&message),
            Notice::Warning(message) => console::warning(&message),
            Notice::Success(message) => console::success(&message),
            Notice::Registration {
                repository,
                public_key,
                link,
            } => console::registration(&repository, &public_key, &link),
        }
    }
}

//! Line-oriented front end shared by every binary.
//!
//! Grammar, one command per line:
//!
//! ```text
//! goto <url>      load a page
//! <KEY>           activate a marker in the current context
//! <KEY> new       activate a marker, opening links in a new context
//! !<KEY>          same as `<KEY> new`
//! ```
//!
//! A marker keyed `goto` is reachable as bare `goto`, `goto new` or `!goto`.

use crate::backend::Backend;
use crate::dispatcher::MarkerDispatcher;
use markjump_common::error::{BackendError, DispatchError};
use markjump_common::formatter::{format_result, result_to_json};
use markjump_common::protocol::DispatchRequest;

#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GoTo(String),
    Dispatch(DispatchRequest),
}

pub fn parse_line(line: &str) -> Result<Command, ExecutorError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(ExecutorError::Parse("empty line".into()));
    };
    let rest: Vec<&str> = words.collect();

    if head.eq_ignore_ascii_case("goto") {
        match rest.as_slice() {
            [] | ["new"] => {}
            [url] => return Ok(Command::GoTo((*url).to_string())),
            _ => return Err(ExecutorError::Parse("usage: goto <url>".into())),
        }
    }

    let (key, bang) = match head.strip_prefix('!') {
        Some(key) => (key, true),
        None => (head, false),
    };
    let new_context = match rest.as_slice() {
        [] => bang,
        ["new"] if !bang => true,
        _ => {
            return Err(ExecutorError::Parse(format!(
                "unexpected input after key: {:?}",
                rest.join(" ")
            )));
        }
    };
    Ok(Command::Dispatch(DispatchRequest::new(key, new_context)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Result of executing a line.
pub struct ExecutionResult {
    /// Formatted output string for display.
    pub output: String,
    pub success: bool,
}

pub struct CommandExecutor {
    dispatcher: MarkerDispatcher,
    format: OutputFormat,
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(MarkerDispatcher::default(), OutputFormat::Text)
    }
}

impl CommandExecutor {
    pub fn new(dispatcher: MarkerDispatcher, format: OutputFormat) -> Self {
        Self { dispatcher, format }
    }

    pub async fn execute_line<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        line: &str,
    ) -> Result<ExecutionResult, ExecutorError> {
        match parse_line(line)? {
            Command::GoTo(url) => {
                let nav = backend.navigate(&url).await?;
                Ok(ExecutionResult {
                    output: format!("@ {} {:?}", nav.url, nav.title),
                    success: true,
                })
            }
            Command::Dispatch(request) => Ok(self.dispatch(backend, &request).await),
        }
    }

    /// Run one dispatch and render it. Dispatch failures become an
    /// unsuccessful result rather than an error so they can be rendered in
    /// the selected output format.
    pub async fn dispatch<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        request: &DispatchRequest,
    ) -> ExecutionResult {
        let result = backend.dispatch(&self.dispatcher, request).await;
        let output = match self.format {
            OutputFormat::Text => format_result(&result),
            OutputFormat::Json => result_to_json(&result).to_string(),
        };
        ExecutionResult {
            output,
            success: result.is_ok(),
        }
    }
}

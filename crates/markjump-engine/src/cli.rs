use crate::backend::Backend;
use crate::executor::CommandExecutor;
use std::error::Error;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
}

pub struct ReplOptions<'a> {
    pub banner_lines: &'a [&'a str],
    pub prompt: &'a str,
    pub exit_commands: &'a [&'a str],
}

/// Blank lines and `#` comments are not commands.
fn is_command(line: &str) -> bool {
    !line.is_empty() && !line.starts_with('#')
}

/// Execute one line, routing its rendering to `out` or `err`.
/// Returns whether the line succeeded.
async fn run_line<B: Backend + ?Sized>(
    backend: &mut B,
    executor: &mut CommandExecutor,
    output: OutputHandlers,
    line: &str,
) -> bool {
    match executor.execute_line(backend, line).await {
        Ok(result) if result.success => {
            (output.out)(&result.output);
            true
        }
        Ok(result) => {
            (output.err)(&result.output);
            false
        }
        Err(e) => {
            (output.err)(&format!("Error: {}", e));
            false
        }
    }
}

/// Run every command in a script file. Stops at the first failing line when
/// `stop_on_error` is set.
pub async fn run_file<B: Backend + ?Sized>(
    backend: &mut B,
    executor: &mut CommandExecutor,
    output: OutputHandlers,
    path: &str,
    stop_on_error: bool,
) -> Result<(), Box<dyn Error>> {
    let content = tokio::fs::read_to_string(path).await?;
    for (number, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if !is_command(trimmed) {
            continue;
        }
        if !run_line(backend, executor, output, trimmed).await && stop_on_error {
            return Err(io::Error::other(format!(
                "{}:{}: '{}' failed",
                path,
                number + 1,
                trimmed
            ))
            .into());
        }
    }
    Ok(())
}

pub async fn run_repl<B: Backend + ?Sized>(
    backend: &mut B,
    executor: &mut CommandExecutor,
    output: OutputHandlers,
    options: ReplOptions<'_>,
) -> Result<(), Box<dyn Error>> {
    for line in options.banner_lines {
        (output.out)(line);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        print!("{}", options.prompt);
        stdout.flush()?;

        let next = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(input) = next else {
            break;
        };

        let trimmed = input.trim();
        if options.exit_commands.contains(&trimmed) {
            break;
        }
        if is_command(trimmed) {
            run_line(backend, executor, output, trimmed).await;
        }
    }
    Ok(())
}

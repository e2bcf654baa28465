use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use markjump_e::backend::EmbeddedBackend;
use markjump_engine::backend::Backend;
use markjump_engine::cli::{self, OutputHandlers, ReplOptions};
use markjump_engine::config::loader::ConfigLoader;
use markjump_engine::config::schema::MarkjumpConfig;
use markjump_engine::dispatcher::MarkerDispatcher;
use markjump_engine::executor::{CommandExecutor, OutputFormat};
use markjump_engine::protocol::DispatchRequest;
use markjump_h::backend::HeadlessBackend;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "markjump", version, about = "Activate marker-tagged elements in a browser page")]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Config file (defaults to ./markjump.yaml, then ~/.markjump/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Page to load before dispatching
    #[arg(long, global = true)]
    url: Option<String>,

    /// Dispatch this single marker key and exit
    #[arg(long, global = true)]
    key: Option<String>,

    /// Open links in a new browsing context (with --key)
    #[arg(long, global = true)]
    new_context: bool,

    /// Script of commands to execute (non-interactive mode)
    #[arg(long, global = true)]
    file: Option<String>,

    /// Keep executing a script after a failing line
    #[arg(long, global = true)]
    keep_going: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Use headless browser (Chromium) via CDP
    Headless {
        /// Launch browser in visible mode (not headless)
        #[arg(long)]
        visible: bool,
    },
    /// Use a browser behind an external WebDriver server
    Embedded {
        /// WebDriver URL (falls back to backend.webdriver_url in the config)
        #[arg(long)]
        webdriver_url: Option<String>,

        /// Request a headless session from the driver
        #[arg(long)]
        headless: bool,
    },
}

fn build_backend(mode: &Mode, config: &MarkjumpConfig) -> anyhow::Result<Box<dyn Backend>> {
    let backend: Box<dyn Backend> = match mode {
        Mode::Headless { visible } => Box::new(HeadlessBackend::new_with_visibility(
            *visible || config.backend.visible,
        )),
        Mode::Embedded {
            webdriver_url,
            headless,
        } => {
            let url = webdriver_url
                .clone()
                .or_else(|| config.backend.webdriver_url.clone())
                .ok_or_else(|| {
                    anyhow!("embedded mode needs --webdriver-url or backend.webdriver_url")
                })?;
            let backend = EmbeddedBackend::with_url(url);
            Box::new(if *headless { backend.headless() } else { backend })
        }
    };
    Ok(backend)
}

async fn run_session(
    backend: &mut dyn Backend,
    executor: &mut CommandExecutor,
    args: &Args,
) -> anyhow::Result<ExitCode> {
    let output = OutputHandlers {
        out: |msg| println!("{}", msg),
        err: |msg| eprintln!("{}", msg),
    };

    if let Some(url) = &args.url {
        let nav = backend.navigate(url).await?;
        tracing::info!("Loaded {} ({:?})", nav.url, nav.title);
    }

    if let Some(key) = &args.key {
        let request = DispatchRequest::new(key.clone(), args.new_context)?;
        let result = executor.dispatch(backend, &request).await;
        return Ok(if result.success {
            (output.out)(&result.output);
            ExitCode::SUCCESS
        } else {
            (output.err)(&result.output);
            ExitCode::FAILURE
        });
    }

    if let Some(path) = &args.file {
        cli::run_file(backend, executor, output, path, !args.keep_going)
            .await
            .map_err(|e| anyhow!("{}", e))?;
    } else {
        let options = ReplOptions {
            banner_lines: &[
                "Backend launched. Enter a marker key (e.g. 'AF', 'AF new', '!AF') or 'goto <url>'.",
                "Type 'exit' or 'quit' to close.",
            ],
            prompt: "> ",
            exit_commands: &["exit", "quit"],
        };
        cli::run_repl(backend, executor, output, options)
            .await
            .map_err(|e| anyhow!("{}", e))?;
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // stdout carries dispatch results; logs go to stderr
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = ConfigLoader::load(args.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    let mut backend = build_backend(&args.mode, &config)?;
    backend
        .launch()
        .await
        .context("Failed to launch backend")?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut executor = CommandExecutor::new(MarkerDispatcher::new(config.markers.clone()), format);

    let result = run_session(&mut *backend, &mut executor, &args).await;
    backend.close().await?;
    result
}

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

pub struct CdpClient {
    pub browser: Browser,
    pub handler_task: JoinHandle<()>,
    pub page: Page,
    user_data_dir: PathBuf,
    cleanup_user_data_dir: bool,
}

impl CdpClient {
    pub async fn launch(visible: bool) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let (user_data_dir, cleanup_user_data_dir) = resolve_user_data_dir()?;
        let mut config_builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(&user_data_dir);

        if visible {
            tracing::info!("Launching browser in visible mode");
            config_builder = config_builder.with_head();
        }

        if let Ok(chrome_bin) = std::env::var("CHROME_BIN") {
            tracing::info!("Using custom Chrome binary: {}", chrome_bin);
            config_builder = config_builder.chrome_executable(chrome_bin);
        }

        let (browser, mut handler) = Browser::launch(
            config_builder
                .build()
                .map_err(|e| format!("Failed to build browser config: {}", e))?,
        )
        .await
        .map_err(|e| format!("Failed to launch browser: {}", e))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(e) = h {
                    tracing::error!("Browser handler error (ignoring): {}", e);
                }
            }
            tracing::info!("Browser handler task ended");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| format!("Failed to create page: {}", e))?;

        // A dialog opened by a click would block every later evaluation.
        let mut dialog_events = page
            .event_listener::<chromiumoxide::cdp::browser_protocol::page::EventJavascriptDialogOpening>()
            .await
            .map_err(|e| format!("Failed to subscribe to dialog events: {}", e))?;

        let page_clone = page.clone();
        tokio::spawn(async move {
            while let Some(event) = dialog_events.next().await {
                tracing::info!("Accepting JavaScript dialog: {}", event.message);
                let cmd =
                    chromiumoxide::cdp::browser_protocol::page::HandleJavaScriptDialogParams::new(
                        true,
                    );
                if let Err(e) = page_clone.execute(cmd).await {
                    tracing::error!("Failed to accept dialog: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            page,
            user_data_dir,
            cleanup_user_data_dir,
        })
    }

    pub async fn close(mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.browser
            .close()
            .await
            .map_err(|e| format!("Error closing browser: {}", e))?;
        self.handler_task
            .await
            .map_err(|e| format!("Error awaiting handler: {}", e))?;

        if self.cleanup_user_data_dir
            && let Err(e) = std::fs::remove_dir_all(&self.user_data_dir)
        {
            tracing::debug!(
                "Failed to clean up user-data-dir {}: {}",
                self.user_data_dir.display(),
                e
            );
        }

        Ok(())
    }
}

/// `MARKJUMP_USER_DATA_DIR` if set (kept after close), otherwise a fresh
/// temporary profile that is removed on close.
fn resolve_user_data_dir() -> Result<(PathBuf, bool), Box<dyn std::error::Error + Send + Sync>> {
    if let Ok(dir) = std::env::var("MARKJUMP_USER_DATA_DIR") {
        let path = PathBuf::from(dir);
        std::fs::create_dir_all(&path)?;
        tracing::info!("Using user data dir from MARKJUMP_USER_DATA_DIR: {}", path.display());
        return Ok((path, false));
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("System clock error: {}", e))?
        .as_nanos();
    let unique = format!("markjump-chromium-profile-{}-{}", std::process::id(), nanos);
    let path = std::env::temp_dir().join(unique);
    std::fs::create_dir_all(&path)?;
    tracing::debug!("Using isolated user data dir: {}", path.display());
    Ok((path, true))
}

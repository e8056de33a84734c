//! Chrome launcher for the browser pool

use crate::config::BrowserConfig;
use crate::fetcher::pool::Launcher;
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Environment variables consulted for the browser binary, in order
const EXECUTABLE_ENV_VARS: &[&str] = &["CHROME_PATH", "CHROMIUM_PATH"];

const LAUNCH_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-software-rasterizer",
    "--disable-extensions",
];

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

/// Launches one headless Chrome per pool slot
pub struct ChromeLauncher {
    executable: Option<PathBuf>,
    request_timeout: Duration,
    launched: AtomicU64,
}

impl ChromeLauncher {
    /// Uses the configured executable, else `CHROME_PATH` / `CHROMIUM_PATH`,
    /// else chromiumoxide's own detection
    pub fn from_config(config: &BrowserConfig) -> Self {
        let executable = config
            .chrome_executable
            .clone()
            .or_else(|| {
                EXECUTABLE_ENV_VARS
                    .iter()
                    .find_map(|name| std::env::var(name).ok())
            })
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Self {
            executable,
            request_timeout: Duration::from_millis(config.cdp_timeout_ms),
            launched: AtomicU64::new(0),
        }
    }

    fn chrome_config(&self, user_data_dir: &Path) -> Result<ChromeConfig> {
        let mut builder = ChromeConfig::builder()
            .request_timeout(self.request_timeout)
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .user_data_dir(user_data_dir);

        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }

        builder
            .build()
            .map_err(|e| ScrapeError::BrowserLaunch(format!("invalid browser config: {}", e)))
    }
}

/// A running browser plus the task driving its CDP connection
pub struct ChromeInstance {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    user_data_dir: PathBuf,
}

impl ChromeInstance {
    pub fn browser(&self) -> &Mutex<Browser> {
        &self.browser
    }
}

impl Drop for ChromeInstance {
    fn drop(&mut self) {
        // Browser's own Drop kills the process if close() never ran
        self.handler.abort();
        if self.user_data_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.user_data_dir) {
                tracing::debug!(
                    "Failed to remove browser profile {}: {}",
                    self.user_data_dir.display(),
                    e
                );
            }
        }
    }
}

#[async_trait]
impl Launcher for ChromeLauncher {
    type Instance = ChromeInstance;

    async fn launch(&self) -> Result<ChromeInstance> {
        let n = self.launched.fetch_add(1, Ordering::Relaxed);
        // Concurrent instances cannot share a profile directory
        let user_data_dir = std::env::temp_dir().join(format!(
            "scrapedown-chrome-{}-{}",
            std::process::id(),
            n
        ));

        let config = self.chrome_config(&user_data_dir)?;
        tracing::debug!("Launching browser with profile {}", user_data_dir.display());

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler error: {:?}", e);
                }
            }
        });

        Ok(ChromeInstance {
            browser: Mutex::new(browser),
            handler,
            user_data_dir,
        })
    }

    async fn shutdown(&self, instance: Arc<ChromeInstance>) {
        let mut browser = instance.browser.lock().await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Browser close failed: {}", e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Browser wait failed: {}", e);
        }
    }
}

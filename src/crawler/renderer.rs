//! Rendering sessions for product detail pages
//!
//! Detail pages need script execution, so they are loaded in a headless
//! browser instead of fetched over plain HTTP. A [`Renderer`] owns the
//! browser for the whole run; each detail worker opens its own
//! [`RenderSession`] (one tab per worker), so concurrent workers never share
//! navigation state.

use crate::identity::IdentityPool;
use crate::RenderError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;

/// A single navigable page owned by one worker
#[async_trait]
pub trait RenderSession: Send + 'static {
    /// Loads `url` and waits for navigation to finish
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Returns the current rendered document
    async fn content(&mut self) -> Result<String, RenderError>;

    /// Releases the session
    async fn close(self) -> Result<(), RenderError>;
}

/// Owner of the rendering engine for a run
#[async_trait]
pub trait Renderer: Send + Sync {
    type Session: RenderSession;

    /// Opens a new independent session
    async fn open_session(&self) -> Result<Self::Session, RenderError>;

    /// Tears the engine down; called once on every exit path of a run
    async fn shutdown(self) -> Result<(), RenderError>;
}

/// Launch options for the headless browser
#[derive(Debug, Clone, Default)]
pub struct ChromiumOptions {
    /// Browser binary; auto-detected when `None`
    pub executable: Option<PathBuf>,

    /// Disable the browser sandbox
    pub no_sandbox: bool,
}

/// Headless Chromium driven over the DevTools protocol
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launches a headless browser presenting one identity from `identities`
    ///
    /// # Returns
    ///
    /// * `Ok(ChromiumRenderer)` - Browser running and its event handler spawned
    /// * `Err(RenderError::Launch)` - Browser could not be configured or started
    pub async fn launch(
        options: &ChromiumOptions,
        identities: &IdentityPool,
    ) -> Result<Self, RenderError> {
        let identity = identities.pick();

        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", identity.user_agent))
            .arg(format!("--lang={}", primary_language(&identity.accept_language)));

        if let Some(executable) = &options.executable {
            builder = builder.chrome_executable(executable);
        }
        if options.no_sandbox {
            builder = builder.no_sandbox();
        }

        let config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
        });

        tracing::info!(user_agent = %identity.user_agent, "Headless browser launched");

        Ok(Self { browser, handler })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    type Session = ChromiumSession;

    async fn open_session(&self) -> Result<ChromiumSession, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Session(e.to_string()))?;
        Ok(ChromiumSession {
            page,
            current_url: String::new(),
        })
    }

    async fn shutdown(mut self) -> Result<(), RenderError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| RenderError::Shutdown(e.to_string()));

        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();

        tracing::info!("Headless browser closed");
        closed
    }
}

/// One browser tab
pub struct ChromiumSession {
    page: Page,
    current_url: String,
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        let navigation_error = |e: chromiumoxide::error::CdpError| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };

        self.page.goto(url).await.map_err(navigation_error)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(navigation_error)?;

        self.current_url = url.to_string();
        Ok(())
    }

    async fn content(&mut self) -> Result<String, RenderError> {
        self.page
            .content()
            .await
            .map_err(|e| RenderError::Content {
                url: self.current_url.clone(),
                message: e.to_string(),
            })
    }

    async fn close(self) -> Result<(), RenderError> {
        self.page
            .close()
            .await
            .map_err(|e| RenderError::Session(e.to_string()))
    }
}

/// `en-US,en;q=0.9` -> `en-US`
fn primary_language(accept_language: &str) -> &str {
    accept_language
        .split([',', ';'])
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("en-US")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_language() {
        assert_eq!(primary_language("en-US,en;q=0.9"), "en-US");
        assert_eq!(primary_language("de-DE"), "de-DE");
        assert_eq!(primary_language(""), "en-US");
    }

    #[test]
    fn test_default_options() {
        let options = ChromiumOptions::default();
        assert!(options.executable.is_none());
        assert!(!options.no_sandbox);
    }
}

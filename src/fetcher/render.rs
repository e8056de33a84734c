//! Headless-browser render engine

use crate::config::BrowserConfig;
use crate::fetcher::{BrowserPool, ChromeInstance, PageContent};
use crate::{Result, ScrapeError};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, LoaderId, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, FrameId, NavigateParams, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Selectors for tab controls that are not currently selected
pub const TAB_SELECTORS: &[&str] = &[
    ".tab:not(.active)",
    "[role=\"tab\"][aria-selected=\"false\"]",
    ".tabs__item:not(.is-active)",
    "button[data-tab]:not(.active)",
    ".ant-tabs-tab:not(.ant-tabs-tab-active)",
];

/// Lifecycle events that mark a document as done with the network
const NETWORK_IDLE_EVENTS: &[&str] = &["networkAlmostIdle", "networkIdle"];

/// Renders a page in a pooled browser and converts it
///
/// Holds one pool slot for the whole call and hands it back on every exit
/// path. The timeout bounds navigation up to network idle; the settle grace
/// and tab clicks come on top of it. Links are resolved against the URL the
/// browser ended up on.
///
/// # Arguments
///
/// * `pool` - Browser pool to draw an instance from
/// * `config` - Settle and tab-click timings
/// * `url` - Page to render
/// * `timeout` - Deadline for navigation and network idle
/// * `auto_click_tabs` - Click inactive tabs before capturing the DOM
pub async fn render_page(
    pool: &BrowserPool,
    config: &BrowserConfig,
    url: &str,
    timeout: Duration,
    auto_click_tabs: bool,
) -> Result<PageContent> {
    let token = pool.acquire().await?;
    let outcome = render_with(token.instance(), config, url, timeout, auto_click_tabs).await;
    pool.release(token).await;

    let (raw_html, final_url) = outcome?;
    Ok(PageContent::from_raw_html(&raw_html, &final_url))
}

async fn render_with(
    instance: &ChromeInstance,
    config: &BrowserConfig,
    url: &str,
    timeout: Duration,
    auto_click_tabs: bool,
) -> Result<(String, String)> {
    let page = instance
        .browser()
        .lock()
        .await
        .new_page("about:blank")
        .await
        .map_err(|e| render_error(url, e))?;

    let outcome = capture(&page, config, url, timeout, auto_click_tabs).await;

    if let Err(e) = page.close().await {
        tracing::trace!("Page close failed for {}: {}", url, e);
    }

    outcome
}

async fn capture(
    page: &Page,
    config: &BrowserConfig,
    url: &str,
    timeout: Duration,
    auto_click_tabs: bool,
) -> Result<(String, String)> {
    let interceptor = block_heavy_resources(page)
        .await
        .map_err(|e| render_error(url, e))?;

    let navigation = tokio::time::timeout(timeout, navigate_until_idle(page, url)).await;

    let result = match navigation {
        Err(_) => Err(ScrapeError::Timeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
        Ok(Err(e)) => Err(e),
        Ok(Ok(())) => {
            tokio::time::sleep(Duration::from_millis(config.settle_ms)).await;

            if auto_click_tabs {
                let clicked =
                    click_inactive_tabs(page, Duration::from_millis(config.tab_click_pause_ms))
                        .await;
                tracing::debug!("Clicked {} inactive tab(s) on {}", clicked, url);
            }

            match page.content().await {
                Ok(html) => {
                    let reported = page.url().await.ok().flatten();
                    Ok((html, page_base_url(reported, url)))
                }
                Err(e) => Err(render_error(url, e)),
            }
        }
    };

    interceptor.abort();
    result
}

/// Navigates to `url` and waits until the new document's network goes idle
async fn navigate_until_idle(page: &Page, url: &str) -> Result<()> {
    let mut lifecycle = page
        .event_listener::<EventLifecycleEvent>()
        .await
        .map_err(|e| render_error(url, e))?;
    page.execute(SetLifecycleEventsEnabledParams::new(true))
        .await
        .map_err(|e| render_error(url, e))?;

    let navigation = page
        .execute(NavigateParams::new(url))
        .await
        .map_err(|e| render_error(url, e))?;

    if let Some(error) = &navigation.result.error_text {
        return Err(render_error(url, error));
    }

    // Same-document navigations start no new load
    let Some(loader) = navigation.result.loader_id.as_ref() else {
        return Ok(());
    };
    let frame = &navigation.result.frame_id;

    while let Some(event) = lifecycle.next().await {
        if is_network_idle(&event.name, &event.frame_id, &event.loader_id, frame, loader) {
            tracing::trace!("{} reached {}", url, event.name);
            return Ok(());
        }
    }

    Err(render_error(url, "page closed before the network went idle"))
}

/// Whether a lifecycle event reports network idle for the navigated document
fn is_network_idle(
    name: &str,
    event_frame: &FrameId,
    event_loader: &LoaderId,
    frame: &FrameId,
    loader: &LoaderId,
) -> bool {
    NETWORK_IDLE_EVENTS.contains(&name) && event_frame == frame && event_loader == loader
}

/// URL to resolve links against; blank or missing reports fall back to the request
fn page_base_url(reported: Option<String>, requested: &str) -> String {
    match reported {
        Some(url) if !url.is_empty() && url != "about:blank" => url,
        _ => requested.to_string(),
    }
}

/// Fails image, stylesheet, font and media requests; lets everything else through
async fn block_heavy_resources(
    page: &Page,
) -> std::result::Result<JoinHandle<()>, chromiumoxide::error::CdpError> {
    let mut paused = page.event_listener::<EventRequestPaused>().await?;
    page.execute(EnableParams::builder().build()).await?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let blocked = matches!(
                event.resource_type,
                ResourceType::Image
                    | ResourceType::Stylesheet
                    | ResourceType::Font
                    | ResourceType::Media
            );

            let outcome = if blocked {
                page.execute(FailRequestParams::new(
                    event.request_id.clone(),
                    ErrorReason::BlockedByClient,
                ))
                .await
                .map(|_| ())
            } else {
                page.execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ())
            };

            if let Err(e) = outcome {
                tracing::trace!("Request interception failed: {}", e);
            }
        }
    }))
}

/// Clicks every element matching [`TAB_SELECTORS`], pausing after each click
///
/// Misses and click failures are skipped.
///
/// # Returns
///
/// The number of successful clicks
pub async fn click_inactive_tabs(page: &Page, pause: Duration) -> usize {
    let mut clicked = 0;

    for selector in TAB_SELECTORS {
        let elements = match page.find_elements(*selector).await {
            Ok(elements) => elements,
            Err(e) => {
                tracing::trace!("No tabs for {}: {}", selector, e);
                continue;
            }
        };

        for element in elements {
            match element.click().await {
                Ok(_) => {
                    clicked += 1;
                    tokio::time::sleep(pause).await;
                }
                Err(e) => tracing::trace!("Tab click failed for {}: {}", selector, e),
            }
        }
    }

    clicked
}

fn render_error(url: &str, error: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Render {
        url: url.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_idle_on_navigated_document() {
        let main = FrameId::new("main");
        let loader = LoaderId::new("nav-1");

        for name in ["networkAlmostIdle", "networkIdle"] {
            assert!(is_network_idle(name, &main, &loader, &main, &loader));
        }
    }

    #[test]
    fn test_other_events_do_not_settle() {
        let main = FrameId::new("main");
        let iframe = FrameId::new("ad-frame");
        let loader = LoaderId::new("nav-1");
        let blank = LoaderId::new("about-blank");

        assert!(!is_network_idle("load", &main, &loader, &main, &loader));
        assert!(!is_network_idle("DOMContentLoaded", &main, &loader, &main, &loader));
        assert!(!is_network_idle("networkIdle", &iframe, &loader, &main, &loader));
        assert!(!is_network_idle("networkIdle", &main, &blank, &main, &loader));
    }

    #[test]
    fn test_page_base_url_prefers_final_url() {
        assert_eq!(
            page_base_url(
                Some("https://example.com/guide/".to_string()),
                "https://example.com/old"
            ),
            "https://example.com/guide/"
        );
    }

    #[test]
    fn test_page_base_url_falls_back_to_request() {
        let requested = "https://example.com/page";
        assert_eq!(page_base_url(None, requested), requested);
        assert_eq!(page_base_url(Some(String::new()), requested), requested);
        assert_eq!(page_base_url(Some("about:blank".to_string()), requested), requested);
    }
}

//! Request/response channel between the UI and a page session
//!
//! The UI never holds session state. It sends a [`Command`] and gets back a
//! [`Response`]. When the receiving end is missing (page loaded before the
//! session was injected) the caller re-initialises once and retries.

use crate::command::{Command, Response};
use crate::config::HeatGridConfig;
use crate::error::HeatGridError;
use crate::host::StaticPage;
use crate::recording::SessionDriver;
use chrono::{DateTime, Utc};
use log::{info, warn};

/// URL prefixes of pages that cannot host a session
const RESTRICTED_PREFIXES: &[&str] = &["chrome://", "edge://", "about:", "chrome-extension://"];

/// Store pages that block injection
const RESTRICTED_HOSTS: &[&str] = &[
    "chrome.google.com/webstore",
    "chromewebstore.google.com",
    "microsoftedge.microsoft.com/addons",
];

/// Whether a session can never run on this URL
pub fn is_restricted_url(url: &str) -> bool {
    let url = url.trim();
    RESTRICTED_PREFIXES.iter().any(|p| url.starts_with(p))
        || RESTRICTED_HOSTS.iter().any(|h| url.contains(h))
}

/// Transport to a page session
pub trait CommandChannel {
    fn send(&mut self, command: Command, now: DateTime<Utc>) -> Result<Response, HeatGridError>;

    /// Install a receiving end on the page
    fn reinitialize(&mut self, now: DateTime<Utc>) -> Result<(), HeatGridError>;
}

/// Send, re-initialising the receiver and retrying once if it is missing
pub fn send_with_reinit<C: CommandChannel + ?Sized>(
    channel: &mut C,
    command: Command,
    now: DateTime<Utc>,
) -> Result<Response, HeatGridError> {
    match channel.send(command, now) {
        Err(HeatGridError::ChannelUnavailable(reason)) => {
            warn!("{} undelivered ({}), reinitialising", command.action(), reason);
            channel.reinitialize(now)?;
            channel.send(command, now)
        }
        other => other,
    }
}

/// In-process channel to a session over a static page
#[derive(Debug)]
pub struct SessionChannel {
    url: String,
    config: HeatGridConfig,
    page: StaticPage,
    driver: Option<SessionDriver>,
}

impl SessionChannel {
    /// Channel with no receiver yet; the first send triggers initialisation
    pub fn new(url: impl Into<String>, config: HeatGridConfig, page: StaticPage) -> Self {
        Self {
            url: url.into(),
            config,
            page,
            driver: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn driver(&self) -> Option<&SessionDriver> {
        self.driver.as_ref()
    }

    pub fn driver_mut(&mut self) -> Option<&mut SessionDriver> {
        self.driver.as_mut()
    }

    /// Drop the receiver, as a page navigation would
    pub fn disconnect(&mut self) {
        self.driver = None;
    }
}

impl CommandChannel for SessionChannel {
    fn send(&mut self, command: Command, now: DateTime<Utc>) -> Result<Response, HeatGridError> {
        let driver = self
            .driver
            .as_mut()
            .ok_or_else(|| HeatGridError::ChannelUnavailable(self.url.clone()))?;
        Ok(driver.command(command, now))
    }

    fn reinitialize(&mut self, _now: DateTime<Utc>) -> Result<(), HeatGridError> {
        if is_restricted_url(&self.url) {
            return Err(HeatGridError::ChannelUnavailable(format!(
                "cannot run on {}",
                self.url
            )));
        }
        self.driver = Some(SessionDriver::new(self.config.clone(), self.page.clone())?);
        info!("session injected into {}", self.url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Ack;
    use crate::types::PageMetrics;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 16, 0, 0).unwrap()
    }

    fn page() -> StaticPage {
        StaticPage::new(PageMetrics::new(1000.0, 2000.0, 1000.0, 800.0))
    }

    #[test]
    fn test_restricted_urls() {
        assert!(is_restricted_url("chrome://extensions"));
        assert!(is_restricted_url("about:blank"));
        assert!(is_restricted_url("https://chromewebstore.google.com/detail/abc"));
        assert!(is_restricted_url("https://microsoftedge.microsoft.com/addons/x"));
        assert!(!is_restricted_url("https://example.com/chrome"));
    }

    #[test]
    fn test_lazy_init_and_retry() {
        let mut channel = SessionChannel::new("https://example.com", HeatGridConfig::default(), page());
        assert!(matches!(
            channel.send(Command::GetStatus, t0()),
            Err(HeatGridError::ChannelUnavailable(_))
        ));

        let response = send_with_reinit(&mut channel, Command::Start, t0()).unwrap();
        assert_eq!(response, Response::Ack(Ack::paused(false)));
        assert!(channel.driver().unwrap().session.is_tracking());

        // Connected channels do not reinitialise
        let id = channel.driver().unwrap().session.id();
        send_with_reinit(&mut channel, Command::GetStatus, t0()).unwrap();
        assert_eq!(channel.driver().unwrap().session.id(), id);
    }

    #[test]
    fn test_restricted_page_fails_once() {
        let mut channel = SessionChannel::new("chrome://settings", HeatGridConfig::default(), page());
        let err = send_with_reinit(&mut channel, Command::Start, t0()).unwrap_err();
        assert!(matches!(err, HeatGridError::ChannelUnavailable(_)));
        assert!(channel.driver().is_none());
    }
}

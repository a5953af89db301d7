use crate::config::RunConfig;
use crate::scrapers::traits::CalendarSource;
use crate::scrapers::types::TargetMonth;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Smoobu booking widget, addressed by apartment id and verification hash
pub struct SmoobuCalendar {
    base_url: String,
    apartment_id: String,
    apartment_hash: String,
}

impl SmoobuCalendar {
    pub fn new(
        base_url: impl Into<String>,
        apartment_id: impl Into<String>,
        apartment_hash: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            apartment_id: apartment_id.into(),
            apartment_hash: apartment_hash.into(),
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            &config.widget_base_url,
            &config.apartment_id,
            &config.apartment_hash,
        )
    }

    fn iframe_url(&self) -> String {
        format!(
            "{}/en/cockpit/widget/show-calendar-iframe/{}/{}",
            self.base_url, self.apartment_id, self.apartment_hash
        )
    }

    fn calendar_url(&self) -> String {
        format!(
            "{}/en/cockpit/widget/single-calendar/{}",
            self.base_url, self.apartment_id
        )
    }

    /// One client per fetch, so the widget session and its cookies
    /// live exactly as long as a single check
    fn session() -> Result<Client> {
        Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .context("Failed to create HTTP client")
    }
}

#[async_trait]
impl CalendarSource for SmoobuCalendar {
    async fn fetch_calendar_html(&self, target: &TargetMonth) -> Result<String> {
        let session = Self::session()?;

        let iframe_url = self.iframe_url();
        debug!("Initialising widget session: {}", iframe_url);
        let init = session
            .get(&iframe_url)
            .send()
            .await
            .context("Failed to open calendar widget")?;
        if !init.status().is_success() {
            // The calendar POST may still work, let it decide
            warn!("Widget iframe returned status: {}", init.status());
        }

        let month = target.month().to_string();
        let year = target.year().to_string();
        let form = [
            ("month", month.as_str()),
            ("year", year.as_str()),
            ("verificationHash", self.apartment_hash.as_str()),
        ];

        let response = session
            .post(self.calendar_url())
            .form(&form)
            .send()
            .await
            .context("Failed to fetch calendar")?;

        if !response.status().is_success() {
            warn!("Calendar endpoint returned status: {}", response.status());
            anyhow::bail!("Failed to fetch calendar: {}", response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read calendar response body")?;

        debug!("Downloaded {} bytes of calendar HTML", html.len());

        Ok(html)
    }

    fn source_name(&self) -> &'static str {
        "Smoobu"
    }
}

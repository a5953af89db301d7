use crate::scrapers::types::TargetMonth;
use anyhow::Result;
use async_trait::async_trait;

/// Anything that can hand back the calendar markup for a month.
/// Keeps the HTTP side apart from the parsing rule in `calendar`.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Fetch the HTML fragment holding the month tables around `target`
    async fn fetch_calendar_html(&self, target: &TargetMonth) -> Result<String>;

    /// Get the name of the booking widget
    fn source_name(&self) -> &'static str;
}

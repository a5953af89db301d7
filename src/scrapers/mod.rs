pub mod calendar;
pub mod error;
pub mod smoobu;
pub mod traits;
pub mod types;

pub use calendar::parse_availability;
pub use smoobu::SmoobuCalendar;
pub use traits::CalendarSource;
pub use types::TargetMonth;

use crate::config::RunConfig;
use anyhow::Result;
use tracing::info;

/// Whether the configured month has at least one bookable day
pub async fn check_for_bookability<S>(source: &S, config: &RunConfig) -> Result<bool>
where
    S: CalendarSource + ?Sized,
{
    let target = TargetMonth::parse(&config.target_month, &config.target_year)?;
    info!(
        "Checking {} calendar for {} {}",
        source.source_name(),
        target.month_name(),
        target.year()
    );

    let html = source.fetch_calendar_html(&target).await?;
    Ok(parse_availability(&html, target.month_name())?)
}

use crate::scrapers::error::CalendarError;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Class the widget puts on day cells that cannot be booked.
/// Polarity inferred from observed markup: a day without it is bookable.
pub const BOOKED_CLASS: &str = "normal";

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Decide whether the month titled `month_name` has at least one bookable day.
///
/// Day cells with no visible text pad the grid with days of the adjacent
/// months and are ignored. Returns at the first bookable cell.
pub fn parse_availability(html: &str, month_name: &str) -> Result<bool, CalendarError> {
    let document = Html::parse_document(html);

    let section = find_month_section(&document, month_name).ok_or_else(|| {
        CalendarError::SectionNotFound {
            month: month_name.to_string(),
        }
    })?;

    let cell_selector = selector("tbody td");
    for cell in section.select(&cell_selector) {
        let text = cell.text().collect::<String>();
        let day = text.trim();
        if day.is_empty() {
            continue;
        }

        if !cell.value().classes().any(|class| class == BOOKED_CLASS) {
            debug!("{} {} is bookable", month_name, day);
            return Ok(true);
        }
    }

    Ok(false)
}

/// First `div.calendar` whose `h2` heading mentions the month
fn find_month_section<'a>(document: &'a Html, month_name: &str) -> Option<ElementRef<'a>> {
    let section_selector = selector("div.calendar");
    let heading_selector = selector("h2");

    document.select(&section_selector).find(|section| {
        section
            .select(&heading_selector)
            .any(|heading| heading.text().collect::<String>().contains(month_name))
    })
}

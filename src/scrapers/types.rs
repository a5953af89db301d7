use crate::scrapers::error::CalendarError;

/// English month names as they appear in the widget's section headings.
/// Fixed table so matching does not depend on the host locale.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Month of the calendar to check. Only built through [`TargetMonth::parse`],
/// so `month` is always in 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetMonth {
    /// 1 = January
    month: u32,
    year: i32,
}

impl TargetMonth {
    /// Parse the raw `TARGET_MONTH` / `TARGET_YEAR` values
    pub fn parse(month: &str, year: &str) -> Result<Self, CalendarError> {
        let month = month
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| CalendarError::InvalidMonth(month.to_string()))?;
        let year = year
            .trim()
            .parse::<i32>()
            .map_err(|_| CalendarError::InvalidYear(year.to_string()))?;

        Ok(Self { month, year })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }
}

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid TARGET_MONTH {0:?}, expected 1-12")]
    InvalidMonth(String),

    #[error("invalid TARGET_YEAR {0:?}")]
    InvalidYear(String),

    #[error("{month} calendar section not found!")]
    SectionNotFound { month: String },
}

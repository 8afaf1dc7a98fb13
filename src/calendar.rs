use chrono::{Datelike, Months, NaiveDate};

use crate::error::RunError;

/// Parse an ISO `YYYY-MM-DD` date string.
pub fn parse_date(value: &str) -> Result<NaiveDate, RunError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        RunError::DateParse {
            value: value.to_string(),
        }
    })
}

pub trait LongForm {
    /// Display form used on the invoice, e.g. "March 4, 2024".
    fn long_form(&self) -> String;

    fn previous_month(&self) -> Self
    where
        Self: Sized;
}

impl LongForm for NaiveDate {
    fn long_form(&self) -> String {
        format!("{} {}, {}", self.format("%B"), self.day(), self.year())
    }

    fn previous_month(&self) -> Self {
        self.checked_sub_months(Months::new(1))
            .unwrap_or(NaiveDate::MIN)
    }
}

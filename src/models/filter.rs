use time::Date;
use crate::models::date::{format_date, today};

/// Date range the catalog is filtered by. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl DateFilter {
    pub fn new(start_date: Option<Date>, end_date: Option<Date>) -> Self {
        Self { start_date, end_date }
    }

    /// Today through tomorrow, the range a fresh catalog starts with.
    pub fn upcoming() -> Self {
        let start = today();
        Self::new(Some(start), start.next_day())
    }

    /// Both ends, or nothing. A half-filled filter behaves like no filter.
    pub fn range(&self) -> Option<(Date, Date)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self.range() {
            Some((start, end)) => vec![
                ("startDate", format_date(start)),
                ("endDate", format_date(end)),
            ],
            None => Vec::new(),
        }
    }
}

use aero_shared::PageRequest;
use chrono::NaiveDate;

use crate::schedule_days::iso_weekday;

/// Filter for a single schedule-store query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleSearch {
    /// Departure airport code
    pub origin: Option<String>,
    /// Arrival airport code
    pub destination: Option<String>,
    /// ISO weekday (1..=7) the schedule must operate on
    pub day_of_week: Option<u8>,
    /// Restrict to these airlines; empty means any
    pub airline_ids: Vec<String>,
    pub page: PageRequest,
}

impl ScheduleSearch {
    pub fn route(origin: &str, destination: &str) -> Self {
        Self {
            origin: Some(origin.to_string()),
            destination: Some(destination.to_string()),
            ..Self::default()
        }
    }

    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.day_of_week = Some(iso_weekday(date));
        self
    }

    pub fn for_airline(mut self, airline_id: &str) -> Self {
        self.airline_ids = vec![airline_id.to_string()];
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let search = ScheduleSearch::route("CGK", "DPS")
            .on_date(date)
            .for_airline("ga")
            .with_page(PageRequest::new(1, 1000));
        assert_eq!(search.origin.as_deref(), Some("CGK"));
        assert_eq!(search.day_of_week, Some(7));
        assert_eq!(search.airline_ids, vec!["ga".to_string()]);
        assert_eq!(search.page.page_size, 1000);
    }
}

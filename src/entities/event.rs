//! Shared calendar events

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::core::cells;
use crate::core::entity::{require, Record, ValidationError};
use crate::core::role::Role;
use crate::core::table::{Row, RowRef};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub event_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub attendees: Vec<String>,
    pub created_by: String,
    pub timestamp: Option<NaiveDateTime>,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        created_by: &Role,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            event_id: String::new(),
            title: title.into(),
            description: None,
            start_date: Some(start),
            end_date: Some(end),
            attendees: Vec::new(),
            created_by: created_by.as_str().to_string(),
            timestamp: Some(now),
        }
    }

    /// `role` attends and the event has not ended before `today`
    pub fn is_upcoming_for(&self, role: &Role, today: NaiveDate) -> bool {
        self.attendees.iter().any(|a| a == role.as_str())
            && self.end_date.is_some_and(|end| end >= today)
    }
}

impl Record for Event {
    const KIND: &'static str = "event";
    const FILE: &'static str = "events.csv";
    const COLUMNS: &'static [&'static str] = &[
        "event_id",
        "title",
        "description",
        "start_date",
        "end_date",
        "attendees",
        "created_by",
        "timestamp",
    ];
    const ID_COLUMN: &'static str = "event_id";
    const ID_PREFIX: Option<&'static str> = Some("EVENT");

    fn id(&self) -> &str {
        &self.event_id
    }

    fn assign_id(&mut self, id: String) {
        self.event_id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&[("Title", &self.title)])?;
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => Err(ValidationError::Invalid {
                field: "end_date",
                message: format!("({}) is before start_date ({})", end, start),
            }),
            (Some(_), Some(_)) => Ok(()),
            _ => Err(ValidationError::Missing(vec!["Start Date", "End Date"])),
        }
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("event_id", self.event_id.as_str())
            .with("title", self.title.as_str())
            .with("description", self.description.clone())
            .with("start_date", self.start_date.map(cells::format_date))
            .with("end_date", self.end_date.map(cells::format_date))
            .with("attendees", cells::encode_list(&self.attendees))
            .with("created_by", self.created_by.as_str())
            .with("timestamp", self.timestamp.map(cells::format_timestamp))
    }

    fn from_row(row: &RowRef<'_>) -> Self {
        Self {
            event_id: cells::text_or_default(row, "event_id"),
            title: cells::text_or_default(row, "title"),
            description: cells::text(row, "description"),
            start_date: cells::date(row, "start_date"),
            end_date: cells::date(row, "end_date"),
            attendees: cells::list(row, "attendees"),
            created_by: cells::text_or_default(row, "created_by"),
            timestamp: cells::timestamp(row, "timestamp"),
        }
    }
}

/// Events `role` attends that end today or later, soonest first
pub fn upcoming(events: Vec<Event>, role: &Role, today: NaiveDate) -> Vec<Event> {
    let mut events: Vec<Event> = events
        .into_iter()
        .filter(|e| e.is_upcoming_for(role, today))
        .collect();
    events.sort_by_key(|e| e.start_date);
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn event(title: &str, start: u32, end: u32, attendees: &[&str]) -> Event {
        let oem = Role::default();
        let mut e = Event::new(title, day(start), day(end), &oem, day(1).and_hms_opt(0, 0, 0).unwrap());
        e.attendees = attendees.iter().map(|a| a.to_string()).collect();
        e
    }

    #[test]
    fn test_end_before_start_rejected() {
        let e = event("Review", 10, 9, &[]);
        assert!(matches!(
            e.validate(),
            Err(ValidationError::Invalid { field: "end_date", .. })
        ));
        assert!(event("Review", 9, 9, &[]).validate().is_ok());
    }

    #[test]
    fn test_upcoming_filters_and_sorts() {
        let role = Role::new("Supplier A");
        let events = vec![
            event("Late", 20, 21, &["Supplier A"]),
            event("Past", 1, 4, &["Supplier A"]),
            event("Ongoing", 3, 5, &["OEM", "Supplier A"]),
            event("Other", 6, 6, &["Supplier B"]),
        ];
        let titles: Vec<String> = upcoming(events, &role, day(5))
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Ongoing", "Late"]);
    }
}

//! Promotion Aggregate: dated storefront banners, at most one on air at a time

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive date range of a banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventPeriod {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl EventPeriod {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self, EventError> {
        let (Some(start), Some(end)) = (start, end) else { return Err(EventError::MissingDates) };
        if end <= start { return Err(EventError::EndBeforeStart); }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> { self.start }
    pub fn end(&self) -> DateTime<Utc> { self.end }
    pub fn contains(&self, at: DateTime<Utc>) -> bool { self.start <= at && at <= self.end }

    /// Shared bounds count as an overlap.
    pub fn overlaps(&self, other: &EventPeriod) -> bool { self.start <= other.end && other.start <= self.end }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoEvent {
    pub id: String,
    pub image: String,
    #[serde(default)]
    pub url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub sort_order: i32,
    pub is_active: bool,
}

impl PromoEvent {
    pub fn period(&self) -> EventPeriod { EventPeriod { start: self.start_date, end: self.end_date } }
    pub fn is_live(&self, now: DateTime<Utc>) -> bool { self.is_active && self.period().contains(now) }
}

/// Rejects `period` if an active event other than `exclude_id` already runs during it.
pub fn check_schedule(period: &EventPeriod, existing: &[PromoEvent], exclude_id: Option<&str>) -> Result<(), EventError> {
    let clash = existing.iter()
        .filter(|e| e.is_active && Some(e.id.as_str()) != exclude_id)
        .any(|e| e.period().overlaps(period));
    if clash { Err(EventError::Overlap) } else { Ok(()) }
}

/// Active events by `sort_order`, for the back office.
pub fn active_events(events: &[PromoEvent]) -> Vec<&PromoEvent> {
    let mut active: Vec<_> = events.iter().filter(|e| e.is_active).collect();
    active.sort_by_key(|e| e.sort_order);
    active
}

/// The single banner the storefront shows at `now`.
pub fn current_event(events: &[PromoEvent], now: DateTime<Utc>) -> Option<&PromoEvent> {
    active_events(events).into_iter().find(|e| e.is_live(now))
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum EventError { MissingDates, EndBeforeStart, Overlap }
impl std::error::Error for EventError {}
impl std::fmt::Display for EventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDates => write!(f, "Les dates de début et de fin sont requises"),
            Self::EndBeforeStart => write!(f, "La date de fin doit être postérieure à la date de début"),
            Self::Overlap => write!(f, "Un autre événement est déjà programmé sur cette période"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2026, 7, d, 0, 0, 0).unwrap() }

    fn event(id: &str, start: u32, end: u32, sort_order: i32, is_active: bool) -> PromoEvent {
        PromoEvent { id: id.into(), image: format!("/events/{id}.jpg"), url: None, start_date: day(start), end_date: day(end), sort_order, is_active }
    }

    #[test]
    fn test_period_validation() {
        assert_eq!(EventPeriod::new(Some(day(1)), None).unwrap_err(), EventError::MissingDates);
        assert_eq!(EventPeriod::new(Some(day(5)), Some(day(5))).unwrap_err(), EventError::EndBeforeStart);
        assert_eq!(EventPeriod::new(Some(day(5)), Some(day(2))).unwrap_err().to_string(), "La date de fin doit être postérieure à la date de début");
        assert!(EventPeriod::new(Some(day(1)), Some(day(2))).is_ok());
    }

    #[test]
    fn test_overlap_detection() {
        let existing = vec![event("a", 10, 20, 0, true), event("off", 1, 31, 0, false)];
        let check = |s, e| check_schedule(&EventPeriod::new(Some(day(s)), Some(day(e))).unwrap(), &existing, None);

        assert_eq!(check(5, 12), Err(EventError::Overlap));
        assert_eq!(check(15, 25), Err(EventError::Overlap));
        assert_eq!(check(5, 25), Err(EventError::Overlap));
        assert_eq!(check(20, 22), Err(EventError::Overlap));
        assert_eq!(check(21, 25), Ok(()));
        assert_eq!(check(1, 9), Ok(()));
    }

    #[test]
    fn test_update_ignores_itself() {
        let existing = vec![event("a", 10, 20, 0, true)];
        let period = EventPeriod::new(Some(day(12)), Some(day(22))).unwrap();
        assert_eq!(check_schedule(&period, &existing, Some("a")), Ok(()));
        assert_eq!(check_schedule(&period, &existing, Some("b")), Err(EventError::Overlap));
    }

    #[test]
    fn test_current_event_by_sort_order() {
        let events = vec![event("late", 1, 10, 2, true), event("first", 1, 10, 1, true), event("hidden", 1, 10, 0, false), event("future", 20, 25, 0, true)];
        assert_eq!(current_event(&events, day(5)).map(|e| e.id.as_str()), Some("first"));
        assert_eq!(current_event(&events, day(10)).map(|e| e.id.as_str()), Some("first"));
        assert!(current_event(&events, day(15)).is_none());
        let ids: Vec<_> = active_events(&events).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["future", "first", "late"]);
    }
}

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::event_request::EventRequest;
use crate::utils::time::format_time_range;

use super::Slot;

/// Where a conflicting commitment comes from: an already-approved Active
/// event, or another request still waiting for approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictOrigin {
    ApprovedEvent,
    PendingRequest,
}

/// An existing booking a candidate slot is checked against. Both Active
/// events and Pending requests normalize into this shape.
#[derive(Debug, Clone)]
pub struct Commitment {
    pub id: Uuid,
    /// For events materialized from a request, the request's id. An
    /// exclusion id matches either, so re-checking an edited request
    /// never collides with its own earlier self.
    pub source_request_id: Option<Uuid>,
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub origin: ConflictOrigin,
}

impl Commitment {
    pub fn from_event(event: &Event) -> Self {
        Self {
            id: event.id,
            source_request_id: event.event_request_id,
            name: event.event_name.clone(),
            start: event.start_time,
            end: event.end_time,
            origin: ConflictOrigin::ApprovedEvent,
        }
    }

    pub fn from_request(request: &EventRequest) -> Self {
        Self {
            id: request.id,
            source_request_id: None,
            name: request.event_name.clone(),
            start: request.start_time,
            end: request.end_time,
            origin: ConflictOrigin::PendingRequest,
        }
    }

    fn matches_exclusion(&self, exclude: Option<Uuid>) -> bool {
        match exclude {
            Some(id) => self.id == id || self.source_request_id == Some(id),
            None => false,
        }
    }
}

/// One reported overlap, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictItem {
    #[serde(rename = "type")]
    pub origin: ConflictOrigin,
    pub name: String,
    /// Human-readable range, e.g. `3:00 PM - 5:00 PM`.
    pub time: String,
}

/// Half-open interval overlap: `[s1,e1)` and `[s2,e2)` collide iff
/// `s1 < e2 && e1 > s2`. Touching boundaries do not collide, so an
/// event may start exactly when the previous one ends.
pub fn overlaps(s1: NaiveTime, e1: NaiveTime, s2: NaiveTime, e2: NaiveTime) -> bool {
    s1 < e2 && e1 > s2
}

/// Checks a candidate slot against the given commitments (already
/// filtered to the same location and date) and returns every overlap in
/// input order. `exclude` skips the commitment being edited or approved.
pub fn detect_conflicts(
    slot: &Slot,
    commitments: &[Commitment],
    exclude: Option<Uuid>,
) -> Vec<ConflictItem> {
    commitments
        .iter()
        .filter(|c| !c.matches_exclusion(exclude))
        .filter(|c| overlaps(slot.start, slot.end, c.start, c.end))
        .map(|c| ConflictItem {
            origin: c.origin,
            name: c.name.clone(),
            time: format_time_range(c.start, c.end),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(start: NaiveTime, end: NaiveTime) -> Slot {
        Slot::new(
            "Gym".to_string(),
            NaiveDate::from_ymd_opt(2025, 12, 8).unwrap(),
            start,
            end,
        )
        .unwrap()
    }

    fn commitment(name: &str, start: NaiveTime, end: NaiveTime, origin: ConflictOrigin) -> Commitment {
        Commitment {
            id: Uuid::new_v4(),
            source_request_id: None,
            name: name.to_string(),
            start,
            end,
            origin,
        }
    }

    #[test]
    fn test_boundary_touch_is_not_a_conflict() {
        // A=[10:00,11:00) vs B=[11:00,12:00)
        assert!(!overlaps(t(11, 0), t(12, 0), t(10, 0), t(11, 0)));

        let existing = [commitment(
            "A",
            t(10, 0),
            t(11, 0),
            ConflictOrigin::ApprovedEvent,
        )];
        let conflicts = detect_conflicts(&slot(t(11, 0), t(12, 0)), &existing, None);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_partial_overlap_is_a_conflict() {
        // A=[10:00,11:00) vs B=[10:30,11:30)
        let existing = [commitment(
            "A",
            t(10, 0),
            t(11, 0),
            ConflictOrigin::ApprovedEvent,
        )];
        let conflicts = detect_conflicts(&slot(t(10, 30), t(11, 30)), &existing, None);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].name, "A");
        assert_eq!(conflicts[0].origin, ConflictOrigin::ApprovedEvent);
    }

    #[test]
    fn test_containment_is_a_conflict() {
        let existing = [commitment(
            "All Day",
            t(8, 0),
            t(18, 0),
            ConflictOrigin::ApprovedEvent,
        )];
        let conflicts = detect_conflicts(&slot(t(10, 0), t(11, 0)), &existing, None);
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn test_gym_scenario_overlapping_active_event() {
        // Request 14:00-16:00 while an Active event holds 15:00-17:00
        let existing = [commitment(
            "Sports Fest",
            t(15, 0),
            t(17, 0),
            ConflictOrigin::ApprovedEvent,
        )];
        let conflicts = detect_conflicts(&slot(t(14, 0), t(16, 0)), &existing, None);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].name, "Sports Fest");
        assert_eq!(conflicts[0].time, "3:00 PM - 5:00 PM");
    }

    #[test]
    fn test_gym_scenario_free_slot() {
        // Request 17:00-18:00 starts exactly when the event ends
        let existing = [commitment(
            "Sports Fest",
            t(15, 0),
            t(17, 0),
            ConflictOrigin::ApprovedEvent,
        )];
        let conflicts = detect_conflicts(&slot(t(17, 0), t(18, 0)), &existing, None);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_reports_both_origins_in_order() {
        let existing = [
            commitment("Fair", t(9, 0), t(12, 0), ConflictOrigin::ApprovedEvent),
            commitment("Seminar", t(11, 0), t(13, 0), ConflictOrigin::PendingRequest),
        ];
        let conflicts = detect_conflicts(&slot(t(10, 0), t(11, 30)), &existing, None);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].origin, ConflictOrigin::ApprovedEvent);
        assert_eq!(conflicts[1].origin, ConflictOrigin::PendingRequest);
    }

    #[test]
    fn test_exclusion_by_own_id() {
        let mine = commitment("Mine", t(10, 0), t(11, 0), ConflictOrigin::PendingRequest);
        let exclude = Some(mine.id);
        let conflicts = detect_conflicts(&slot(t(10, 0), t(11, 0)), &[mine], exclude);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_exclusion_by_source_request() {
        // An event materialized from the request being re-checked is not
        // a conflict with itself.
        let request_id = Uuid::new_v4();
        let mut materialized =
            commitment("Mine", t(10, 0), t(11, 0), ConflictOrigin::ApprovedEvent);
        materialized.source_request_id = Some(request_id);

        let conflicts = detect_conflicts(
            &slot(t(10, 0), t(11, 0)),
            &[materialized],
            Some(request_id),
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_serializes_origin_tags() {
        let item = ConflictItem {
            origin: ConflictOrigin::ApprovedEvent,
            name: "A".to_string(),
            time: "10:00 AM - 11:00 AM".to_string(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "approved_event");
    }
}

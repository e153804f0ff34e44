use std::collections::HashMap;

use uuid::Uuid;

use crate::db::requests::{NewEventRequest, RequestRepo};
use crate::models::event::Event;
use crate::models::event_request::{EventRequest, RequestStatus};
use crate::scheduling::conflict::{detect_conflicts, ConflictItem};
use crate::scheduling::store::SchedulingStore;
use crate::scheduling::Slot;
use crate::utils::error::AppError;

/// Drives the request approval state machine over a [`SchedulingStore`].
///
/// `Pending → {Approved, Rejected, Cancelled}`; every target state is
/// terminal. Approval re-checks the slot against the live commitment
/// landscape immediately before materializing the event, since it may
/// have changed between submission and approval.
#[derive(Debug, Clone)]
pub struct ApprovalEngine<S> {
    store: S,
}

impl<S: SchedulingStore> ApprovalEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Conflicts the given slot would collide with right now.
    pub async fn conflicts_for(
        &self,
        slot: &Slot,
        exclude: Option<Uuid>,
    ) -> Result<Vec<ConflictItem>, AppError> {
        let commitments = self.store.commitments_at(&slot.location, slot.date).await?;
        Ok(detect_conflicts(slot, &commitments, exclude))
    }

    /// Errors with a conflict report unless the slot is free.
    pub async fn ensure_slot_free(
        &self,
        slot: &Slot,
        exclude: Option<Uuid>,
    ) -> Result<(), AppError> {
        let conflicts = self.conflicts_for(slot, exclude).await?;
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(AppError::schedule_conflict(conflicts))
        }
    }

    /// Approves a Pending request: re-checks the slot, then atomically
    /// marks it Approved and materializes the event (with its
    /// requirement list). On conflict the request is left untouched and
    /// the conflicting names are reported.
    pub async fn approve(&self, request_id: Uuid) -> Result<Event, AppError> {
        let request = self.load(request_id).await?;
        request.status.ensure_pending()?;

        let slot = Slot::new(
            request.location.clone(),
            request.date,
            request.start_time,
            request.end_time,
        )?;
        self.ensure_slot_free(&slot, Some(request.id)).await?;

        self.store.approve_and_materialize(&request).await
    }

    pub async fn reject(&self, request_id: Uuid) -> Result<(), AppError> {
        let request = self.load(request_id).await?;
        request.status.ensure_pending()?;
        self.store
            .transition_request(request.id, RequestStatus::Rejected)
            .await
    }

    async fn load(&self, request_id: Uuid) -> Result<EventRequest, AppError> {
        self.store
            .find_request(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))
    }
}

/// Department- and oversight-facing request operations.
#[derive(Debug, Clone)]
pub struct RequestService {
    requests: RequestRepo,
    approvals: ApprovalEngine<RequestRepo>,
}

impl RequestService {
    pub fn new(requests: RequestRepo) -> Self {
        let approvals = ApprovalEngine::new(requests.clone());
        Self {
            requests,
            approvals,
        }
    }

    pub fn approvals(&self) -> &ApprovalEngine<RequestRepo> {
        &self.approvals
    }

    /// Submits a new request, refusing up front if the slot is already
    /// taken by an Active event or another Pending request.
    pub async fn submit(&self, new: NewEventRequest) -> Result<EventRequest, AppError> {
        let slot = Slot::new(new.location.clone(), new.date, new.start_time, new.end_time)?;
        self.approvals.ensure_slot_free(&slot, None).await?;
        self.requests.insert(&new).await
    }

    /// Rewrites a Pending request, re-running the conflict check with
    /// the request itself excluded.
    pub async fn edit(
        &self,
        request_id: Uuid,
        department_id: Uuid,
        new: NewEventRequest,
    ) -> Result<EventRequest, AppError> {
        let existing = self.find_owned(request_id, department_id).await?;
        existing.status.ensure_pending()?;

        let slot = Slot::new(new.location.clone(), new.date, new.start_time, new.end_time)?;
        self.approvals
            .ensure_slot_free(&slot, Some(request_id))
            .await?;

        self.requests
            .update_pending(request_id, department_id, &new)
            .await?
            .ok_or_else(|| AppError::StateError("Request already processed".to_string()))
    }

    /// Cancels a Pending request; it stays in the department's history.
    pub async fn cancel(&self, request_id: Uuid, department_id: Uuid) -> Result<(), AppError> {
        let existing = self.find_owned(request_id, department_id).await?;
        existing.status.ensure_pending()?;
        self.requests
            .transition_request(request_id, RequestStatus::Cancelled)
            .await
    }

    /// Hard-deletes a Pending request.
    pub async fn delete(&self, request_id: Uuid, department_id: Uuid) -> Result<(), AppError> {
        let existing = self.find_owned(request_id, department_id).await?;
        existing.status.ensure_pending()?;

        if !self.requests.delete_pending(request_id, department_id).await? {
            return Err(AppError::StateError(
                "Only pending requests can be deleted".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn find(&self, request_id: Uuid) -> Result<EventRequest, AppError> {
        self.requests
            .find(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Request not found".to_string()))
    }

    pub async fn find_owned(
        &self,
        request_id: Uuid,
        department_id: Uuid,
    ) -> Result<EventRequest, AppError> {
        let request = self.find(request_id).await?;
        if request.department_id != department_id {
            return Err(AppError::Forbidden(
                "This request does not belong to your department".to_string(),
            ));
        }
        Ok(request)
    }

    pub async fn list_for_department(
        &self,
        department_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<EventRequest>, AppError> {
        self.requests.list_by_department(department_id, status).await
    }

    pub async fn list(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<EventRequest>, AppError> {
        self.requests.list(status).await
    }

    pub async fn status_counts(
        &self,
        department: Option<Uuid>,
    ) -> Result<RequestStatusCounts, AppError> {
        let statuses = self.requests.statuses(department).await?;
        Ok(RequestStatusCounts::tally(statuses))
    }

    /// Conflict annotations for a batch of requests, keyed by request
    /// id; only Pending requests are checked.
    pub async fn conflicts_for_requests(
        &self,
        requests: &[EventRequest],
    ) -> Result<HashMap<Uuid, Vec<ConflictItem>>, AppError> {
        let mut map = HashMap::new();
        for request in requests {
            if request.status != RequestStatus::Pending {
                continue;
            }
            let slot = Slot::new(
                request.location.clone(),
                request.date,
                request.start_time,
                request.end_time,
            )?;
            let conflicts = self.approvals.conflicts_for(&slot, Some(request.id)).await?;
            if !conflicts.is_empty() {
                map.insert(request.id, conflicts);
            }
        }
        Ok(map)
    }
}

/// Per-status request counters for dashboards.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct RequestStatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub cancelled: i64,
}

impl RequestStatusCounts {
    pub fn tally(statuses: impl IntoIterator<Item = RequestStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                RequestStatus::Pending => counts.pending += 1,
                RequestStatus::Approved => counts.approved += 1,
                RequestStatus::Rejected => counts.rejected += 1,
                RequestStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use sqlx::types::Json;
    use std::sync::Mutex;

    use crate::models::event::EventStatus;
    use crate::scheduling::conflict::Commitment;

    /// In-memory stand-in for the Postgres-backed store, driving the
    /// same state machine the production path uses.
    #[derive(Default)]
    struct InMemoryStore {
        requests: Mutex<Vec<EventRequest>>,
        events: Mutex<Vec<Event>>,
    }

    impl InMemoryStore {
        fn add_request(&self, request: EventRequest) {
            self.requests.lock().unwrap().push(request);
        }

        fn add_event(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }

        fn request_status(&self, id: Uuid) -> RequestStatus {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.status)
                .unwrap()
        }

        fn event_count(&self) -> usize {
            self.events.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SchedulingStore for InMemoryStore {
        async fn find_request(&self, id: Uuid) -> Result<Option<EventRequest>, AppError> {
            Ok(self
                .requests
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }

        async fn commitments_at(
            &self,
            location: &str,
            date: NaiveDate,
        ) -> Result<Vec<Commitment>, AppError> {
            let mut commitments: Vec<Commitment> = self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| {
                    e.location == location && e.date == date && e.status == EventStatus::Active
                })
                .map(Commitment::from_event)
                .collect();
            commitments.extend(
                self.requests
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|r| {
                        r.location == location
                            && r.date == date
                            && r.status == RequestStatus::Pending
                    })
                    .map(Commitment::from_request),
            );
            Ok(commitments)
        }

        async fn approve_and_materialize(
            &self,
            request: &EventRequest,
        ) -> Result<Event, AppError> {
            let mut requests = self.requests.lock().unwrap();
            let stored = requests
                .iter_mut()
                .find(|r| r.id == request.id)
                .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;
            stored.status.ensure_pending()?;
            stored.status = RequestStatus::Approved;

            let event = Event {
                id: Uuid::new_v4(),
                organizer_id: request.department_id,
                event_request_id: Some(request.id),
                event_name: request.event_name.clone(),
                description: request.description.clone(),
                location: request.location.clone(),
                date: request.date,
                start_time: request.start_time,
                end_time: request.end_time,
                participant_limit: request.participant_limit,
                status: EventStatus::Active,
                created_at: Utc::now(),
            };
            self.events.lock().unwrap().push(event.clone());
            Ok(event)
        }

        async fn transition_request(
            &self,
            id: Uuid,
            to: RequestStatus,
        ) -> Result<(), AppError> {
            let mut requests = self.requests.lock().unwrap();
            let stored = requests
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| AppError::NotFound("Request not found".to_string()))?;
            stored.status.ensure_pending()?;
            stored.status = to;
            Ok(())
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn gym_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 8).unwrap()
    }

    fn make_request(status: RequestStatus, start: NaiveTime, end: NaiveTime) -> EventRequest {
        EventRequest {
            id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            event_name: "Tech Summit".to_string(),
            description: None,
            location: "Gym".to_string(),
            date: gym_date(),
            start_time: start,
            end_time: end,
            participant_limit: Some(100),
            requirements: Json(vec!["Waiver".to_string()]),
            status,
            created_at: Utc::now(),
        }
    }

    fn make_active_event(name: &str, start: NaiveTime, end: NaiveTime) -> Event {
        Event {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            event_request_id: None,
            event_name: name.to_string(),
            description: None,
            location: "Gym".to_string(),
            date: gym_date(),
            start_time: start,
            end_time: end,
            participant_limit: None,
            status: EventStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_approval_conflict_leaves_request_pending() {
        let store = InMemoryStore::default();
        let request = make_request(RequestStatus::Pending, t(14, 0), t(16, 0));
        let request_id = request.id;
        store.add_request(request);
        store.add_event(make_active_event("Sports Fest", t(15, 0), t(17, 0)));

        let engine = ApprovalEngine::new(store);
        let err = engine.approve(request_id).await.unwrap_err();

        let AppError::Conflict { message, conflicts } = err else {
            panic!("expected conflict error");
        };
        assert!(message.contains("Sports Fest"));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(
            engine.store.request_status(request_id),
            RequestStatus::Pending
        );
        assert_eq!(engine.store.event_count(), 1);
    }

    #[tokio::test]
    async fn test_approval_of_free_slot_materializes_event() {
        let store = InMemoryStore::default();
        let request = make_request(RequestStatus::Pending, t(17, 0), t(18, 0));
        let request_id = request.id;
        store.add_request(request);
        store.add_event(make_active_event("Sports Fest", t(15, 0), t(17, 0)));

        let engine = ApprovalEngine::new(store);
        let event = engine.approve(request_id).await.unwrap();

        assert_eq!(event.status, EventStatus::Active);
        assert_eq!(event.event_request_id, Some(request_id));
        assert_eq!(
            engine.store.request_status(request_id),
            RequestStatus::Approved
        );
        assert_eq!(engine.store.event_count(), 2);
    }

    #[tokio::test]
    async fn test_approving_non_pending_request_is_a_state_error() {
        let store = InMemoryStore::default();
        let request = make_request(RequestStatus::Rejected, t(9, 0), t(10, 0));
        let request_id = request.id;
        store.add_request(request);

        let engine = ApprovalEngine::new(store);
        let err = engine.approve(request_id).await.unwrap_err();

        let AppError::StateError(message) = err else {
            panic!("expected state error");
        };
        assert!(message.contains("rejected"));
        assert_eq!(
            engine.store.request_status(request_id),
            RequestStatus::Rejected
        );
        assert_eq!(engine.store.event_count(), 0);
    }

    #[tokio::test]
    async fn test_rejecting_pending_request() {
        let store = InMemoryStore::default();
        let request = make_request(RequestStatus::Pending, t(9, 0), t(10, 0));
        let request_id = request.id;
        store.add_request(request);

        let engine = ApprovalEngine::new(store);
        engine.reject(request_id).await.unwrap();
        assert_eq!(
            engine.store.request_status(request_id),
            RequestStatus::Rejected
        );

        // Terminal: a second rejection refuses
        assert!(engine.reject(request_id).await.is_err());
    }

    #[tokio::test]
    async fn test_approving_unknown_request_is_not_found() {
        let engine = ApprovalEngine::new(InMemoryStore::default());
        let err = engine.approve(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pending_requests_also_block_each_other() {
        let store = InMemoryStore::default();
        let first = make_request(RequestStatus::Pending, t(10, 0), t(12, 0));
        store.add_request(first);
        let second = make_request(RequestStatus::Pending, t(11, 0), t(13, 0));
        let second_id = second.id;
        store.add_request(second);

        let engine = ApprovalEngine::new(store);
        let err = engine.approve(second_id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }
}

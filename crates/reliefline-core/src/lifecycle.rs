//! The case lifecycle manager.
//!
//! Owns the state machine: every mutation validates authorization and the
//! requested transition inside the store's atomic mutator, then emits the
//! corresponding lifecycle event once the write has committed. Concurrent
//! mutations on the same case serialize at the store layer; the loser of a
//! race sees an ordinary `InvalidTransition`, never a torn write.

use crate::actor::Actor;
use crate::case::{Case, CaseDraft, CaseFilter, CaseId, CaseStatus, GeoPoint, Intervention};
use crate::dispatch::Dispatcher;
use crate::error::{CaseError, CaseResult};
use crate::events::LifecycleEvent;
use crate::store::CaseStore;
use tracing::info;

/// Validates and applies case transitions, emitting events on success.
pub struct CaseLifecycleManager<S> {
    store: S,
    dispatcher: Dispatcher,
}

impl<S: CaseStore> CaseLifecycleManager<S> {
    pub fn new(store: S, dispatcher: Dispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Report a new case. Always starts `Pending`, owned by the actor.
    pub async fn create(&self, draft: CaseDraft, actor: &Actor) -> CaseResult<Case> {
        let case = Case::new(draft, actor.id);
        self.store.insert(case.clone()).await?;

        info!(case_id = %case.id, author = %actor.id, "case created");
        self.dispatcher.dispatch(LifecycleEvent::CaseCreated {
            case: case.clone(),
        });
        Ok(case)
    }

    /// Rewrite the mutable fields of a case. Author or admin only; never
    /// touches status.
    pub async fn update(&self, id: CaseId, draft: CaseDraft, actor: &Actor) -> CaseResult<Case> {
        let actor = *actor;
        let updated = self
            .store
            .update_with(
                id,
                Box::new(move |case| {
                    if case.author != actor.id && !actor.is_admin() {
                        return Err(CaseError::unauthorized(actor.id, "update this case"));
                    }
                    case.title = draft.title;
                    case.description = draft.description;
                    case.category = draft.category;
                    case.location = draft.location;
                    Ok(())
                }),
            )
            .await?;

        info!(case_id = %id, actor = %actor.id, "case updated");
        self.dispatcher.dispatch(LifecycleEvent::CaseUpdated {
            case: updated.clone(),
        });
        Ok(updated)
    }

    /// Permanently remove a case. Author or admin only. Destructive, not a
    /// transition; no event.
    ///
    /// Authorship is immutable, so the check-then-remove sequence cannot be
    /// invalidated by a concurrent mutation.
    pub async fn delete(&self, id: CaseId, actor: &Actor) -> CaseResult<()> {
        let case = self.store.get(id).await?;
        if case.author != actor.id && !actor.is_admin() {
            return Err(CaseError::unauthorized(actor.id, "delete this case"));
        }
        self.store.remove(id).await?;
        info!(case_id = %id, actor = %actor.id, "case deleted");
        Ok(())
    }

    /// Take a validated case as the intervening volunteer.
    ///
    /// The status check runs inside the atomic mutator, so when several
    /// volunteers race for the same case exactly one wins; the others get
    /// `InvalidTransition` against the now-`InProgress` state.
    pub async fn take(
        &self,
        id: CaseId,
        intervention: Intervention,
        actor: &Actor,
    ) -> CaseResult<Case> {
        let volunteer = actor.id;
        let updated = self
            .store
            .update_with(
                id,
                Box::new(move |case| {
                    if case.status != CaseStatus::Validated {
                        return Err(CaseError::invalid_transition(
                            case.status,
                            CaseStatus::InProgress,
                        ));
                    }
                    case.status = CaseStatus::InProgress;
                    case.volunteer = Some(volunteer);
                    case.intervention = Some(intervention);
                    Ok(())
                }),
            )
            .await?;

        info!(case_id = %id, volunteer = %volunteer, "intervention confirmed");
        self.dispatcher.dispatch(LifecycleEvent::InterventionConfirmed {
            case: updated.clone(),
        });
        Ok(updated)
    }

    /// Mark an in-progress case resolved. Author or assigned volunteer only.
    pub async fn resolve(&self, id: CaseId, actor: &Actor) -> CaseResult<Case> {
        let actor_id = actor.id;
        let updated = self
            .store
            .update_with(
                id,
                Box::new(move |case| {
                    let is_author = case.author == actor_id;
                    let is_volunteer = case.volunteer == Some(actor_id);
                    if !is_author && !is_volunteer {
                        return Err(CaseError::unauthorized(actor_id, "resolve this case"));
                    }
                    // Re-validate the assignee as well as the status: admin
                    // force-sets touch the same state.
                    if case.status != CaseStatus::InProgress || case.volunteer.is_none() {
                        return Err(CaseError::invalid_transition(
                            case.status,
                            CaseStatus::Resolved,
                        ));
                    }
                    case.status = CaseStatus::Resolved;
                    Ok(())
                }),
            )
            .await?;

        info!(case_id = %id, actor = %actor_id, "case resolved");
        self.dispatcher.dispatch(LifecycleEvent::CaseResolved {
            case: updated.clone(),
        });
        Ok(updated)
    }

    /// Force a status change as an admin.
    ///
    /// Terminal states stay terminal even here. Forcing `InProgress` on a
    /// case with no assigned volunteer stores `Validated` instead: a case
    /// must never appear in progress without an assignee. Forcing a status
    /// outside `InProgress`/`Resolved` clears the assignment so the
    /// assignee invariant keeps holding.
    pub async fn admin_set_status(
        &self,
        id: CaseId,
        status: CaseStatus,
        actor: &Actor,
    ) -> CaseResult<Case> {
        if !actor.is_admin() {
            return Err(CaseError::unauthorized(actor.id, "force case status"));
        }

        let updated = self
            .store
            .update_with(
                id,
                Box::new(move |case| {
                    if case.status.is_terminal() {
                        return Err(CaseError::invalid_transition(case.status, status));
                    }
                    let effective = if status == CaseStatus::InProgress && case.volunteer.is_none()
                    {
                        CaseStatus::Validated
                    } else {
                        status
                    };
                    case.status = effective;
                    if !matches!(effective, CaseStatus::InProgress | CaseStatus::Resolved) {
                        case.volunteer = None;
                        case.intervention = None;
                    }
                    Ok(())
                }),
            )
            .await?;

        info!(case_id = %id, status = %updated.status, "status forced by admin");
        Ok(updated)
    }

    /// Fetch a case by id.
    pub async fn get(&self, id: CaseId) -> CaseResult<Case> {
        self.store.get(id).await
    }

    /// List cases matching a filter.
    pub async fn list(&self, filter: &CaseFilter) -> CaseResult<Vec<Case>> {
        self.store.list(filter).await
    }

    /// Validated cases within `radius_m` meters of `origin`.
    pub async fn list_nearby(&self, origin: GeoPoint, radius_m: f64) -> CaseResult<Vec<Case>> {
        let validated = self
            .store
            .list(&CaseFilter::by_status(CaseStatus::Validated))
            .await?;
        Ok(validated
            .into_iter()
            .filter(|case| case.location.distance_m(&origin) <= radius_m)
            .collect())
    }
}

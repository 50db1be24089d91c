//! Case records and the status graph they move through.

use crate::actor::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a case record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(Uuid);

impl CaseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of assistance a case asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCategory {
    Medical,
    Food,
    Housing,
    Clothing,
    Logistics,
    Other,
}

/// Lifecycle status of a case.
///
/// Normal operations follow this graph; nothing leaves a terminal state:
///
/// ```text
/// Pending ──(admin validate)──▶ Validated ──(admin reject)──▶ Rejected
/// Pending ──(admin reject)────▶ Rejected
/// Validated ──(volunteer takes)──▶ InProgress
/// InProgress ──(author or volunteer resolves)──▶ Resolved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pending,
    Validated,
    InProgress,
    Resolved,
    Rejected,
}

impl CaseStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseStatus::Resolved | CaseStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Validated => "validated",
            CaseStatus::InProgress => "in_progress",
            CaseStatus::Resolved => "resolved",
            CaseStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WGS84 coordinates of the reported need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

const EARTH_RADIUS_M: f64 = 6_371_000.0;

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

/// Details a volunteer attaches when taking a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    /// When the volunteer plans to intervene.
    pub scheduled_for: DateTime<Utc>,
    /// Message from the volunteer to the author.
    pub message: String,
}

/// A humanitarian assistance case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub title: String,
    pub description: String,
    pub category: CaseCategory,
    pub status: CaseStatus,
    pub location: GeoPoint,
    /// The citizen who reported the case.
    pub author: UserId,
    /// Set when a volunteer takes the case; present only in
    /// `InProgress` and `Resolved`.
    pub volunteer: Option<UserId>,
    pub intervention: Option<Intervention>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every committed write.
    pub version: u64,
}

impl Case {
    /// Build a fresh `Pending` case from a draft.
    pub fn new(draft: CaseDraft, author: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: CaseId::new(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            status: CaseStatus::Pending,
            location: draft.location,
            author,
            volunteer: None,
            intervention: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }
}

/// Mutable fields of a case, as supplied by the request layer.
///
/// Field validation happens before a draft reaches the core; drafts are
/// assumed well-formed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDraft {
    pub title: String,
    pub description: String,
    pub category: CaseCategory,
    pub location: GeoPoint,
}

/// Filter for case listings. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseFilter {
    pub status: Option<CaseStatus>,
    pub category: Option<CaseCategory>,
    pub author: Option<UserId>,
    pub volunteer: Option<UserId>,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        self.status.map_or(true, |s| case.status == s)
            && self.category.map_or(true, |c| case.category == c)
            && self.author.map_or(true, |a| case.author == a)
            && self.volunteer.map_or(true, |v| case.volunteer == Some(v))
    }

    pub fn by_status(status: CaseStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn by_author(author: UserId) -> Self {
        Self {
            author: Some(author),
            ..Default::default()
        }
    }

    pub fn by_volunteer(volunteer: UserId) -> Self {
        Self {
            volunteer: Some(volunteer),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CaseDraft {
        CaseDraft {
            title: "Water shortage".to_string(),
            description: "Neighborhood well ran dry".to_string(),
            category: CaseCategory::Logistics,
            location: GeoPoint::new(36.8, 10.18),
        }
    }

    #[test]
    fn new_case_starts_pending_and_unassigned() {
        let author = UserId::new();
        let case = Case::new(draft(), author);

        assert_eq!(case.status, CaseStatus::Pending);
        assert_eq!(case.author, author);
        assert!(case.volunteer.is_none());
        assert!(case.intervention.is_none());
        assert_eq!(case.version, 0);
    }

    #[test]
    fn terminal_statuses() {
        assert!(CaseStatus::Resolved.is_terminal());
        assert!(CaseStatus::Rejected.is_terminal());
        assert!(!CaseStatus::Pending.is_terminal());
        assert!(!CaseStatus::Validated.is_terminal());
        assert!(!CaseStatus::InProgress.is_terminal());
    }

    #[test]
    fn haversine_sanity() {
        let tunis = GeoPoint::new(36.8065, 10.1815);
        let sfax = GeoPoint::new(34.7406, 10.7603);

        let d = tunis.distance_m(&sfax);
        // Roughly 235 km apart.
        assert!(d > 220_000.0 && d < 250_000.0, "got {d}");

        assert!(tunis.distance_m(&tunis) < 1.0);
    }

    #[test]
    fn filter_matches_combinations() {
        let author = UserId::new();
        let mut case = Case::new(draft(), author);
        case.status = CaseStatus::Validated;

        assert!(CaseFilter::default().matches(&case));
        assert!(CaseFilter::by_status(CaseStatus::Validated).matches(&case));
        assert!(!CaseFilter::by_status(CaseStatus::Pending).matches(&case));
        assert!(CaseFilter::by_author(author).matches(&case));
        assert!(!CaseFilter::by_author(UserId::new()).matches(&case));
        // Unassigned case never matches a volunteer filter.
        assert!(!CaseFilter::by_volunteer(UserId::new()).matches(&case));
    }
}

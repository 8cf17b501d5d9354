//! Entity types for the platform: users, profiles, and waves.
//!
//! Wire field names are camelCase, matching the public API. All
//! cross-entity references (`userId`, `creatorId`, `charityId`,
//! participant `profileId`) are weak: opaque string ids resolved at read
//! time, with a missing target reported as absent rather than an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use utoipa::ToSchema;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Company,
    Person,
    Charity,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Person
    }
}

/// Tri-state review status shared by charity-support entries, wave
/// participants, and the wave charity-approval gate. Any value may be
/// overwritten by any other: approval authority is external to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for ReviewStatus {
    fn default() -> Self {
        ReviewStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SupportType {
    Volunteering,
    Donation,
    Sponsorship,
    Endorsement,
    InKind,
}

// --- Users ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Opaque credential hash. Hashing happens in the authentication
    /// layer; the core only stores the value.
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub verification_token: Option<String>,
    #[serde(default)]
    pub verification_token_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User as exposed on the wire: everything except the credential hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        UserView {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            role: u.role,
            is_verified: u.is_verified,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Already-hashed credential supplied by the authentication layer.
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

// --- Profiles ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// One charity endorsement request on a profile. `charity_id` is a weak
/// reference to another (charity) profile; unique within one profile's
/// `charitiesSupported` list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CharitySupport {
    pub charity_id: String,
    #[serde(default)]
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Unique across all profiles.
    pub slug: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub social_media_links: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub impact_metrics: HashMap<String, JsonValue>,
    #[serde(default)]
    pub support_types: Vec<String>,
    #[serde(default)]
    pub causes_supported: Vec<String>,
    #[serde(default)]
    pub charities_supported: Vec<CharitySupport>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub logo_image: Option<String>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The resolved form of a weak profile reference, embedded in views.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub logo_image: Option<String>,
}

impl From<&Profile> for ProfileSummary {
    fn from(p: &Profile) -> Self {
        ProfileSummary {
            id: p.id.clone(),
            name: p.name.clone(),
            slug: p.slug.clone(),
            logo_image: p.logo_image.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    /// Explicit slug; when omitted one is derived from the name (fallback:
    /// the owner's email) plus a random uniqueness suffix.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub social_media_links: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub impact_metrics: HashMap<String, JsonValue>,
    #[serde(default)]
    pub support_types: Vec<String>,
    #[serde(default)]
    pub causes_supported: Vec<String>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub logo_image: Option<String>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub social_media_links: Option<Vec<String>>,
    #[serde(default)]
    pub values: Option<Vec<String>>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub impact_metrics: Option<HashMap<String, JsonValue>>,
    #[serde(default)]
    pub support_types: Option<Vec<String>>,
    #[serde(default)]
    pub causes_supported: Option<Vec<String>>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub logo_image: Option<String>,
    #[serde(default)]
    pub certifications: Option<Vec<Certification>>,
}

/// Per-profile aggregate computed across the wave ledger and the
/// profile's own charity-support list. The individual counts are
/// independent reads with no shared snapshot.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMetrics {
    pub total_waves_created: u64,
    pub total_waves_participated: u64,
    pub unique_charities_supported: u64,
    pub total_unique_participants: u64,
    pub cause_names: Vec<String>,
}

// --- Waves ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub profile_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_approved: bool,
}

/// Canonical participant shape. Earlier data written as a bare id array
/// needs a one-time migration to this form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub profile_id: String,
    #[serde(default)]
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wave {
    pub id: String,
    pub creator_id: String,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub is_new_wave: bool,
    #[serde(default)]
    pub parent_wave_id: Option<String>,
    #[serde(default)]
    pub cause_name: Option<String>,
    #[serde(default)]
    pub charity_id: Option<String>,
    #[serde(default)]
    pub support_types: Vec<SupportType>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub event_link: Option<String>,
    #[serde(default)]
    pub monetary_value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_monetary_value_visible: bool,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub video_urls: Vec<String>,
    #[serde(default)]
    pub document_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hashtag: Option<String>,
    #[serde(default = "default_true")]
    pub allow_comments: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// Gates public discovery: only `approved` waves appear in the
    /// filtered listing.
    #[serde(default)]
    pub charity_approval_status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A wave with its weak references resolved for display. Unresolvable
/// references serialize as `null` (creator, charity) or are omitted
/// (participant summaries); they never fail the read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveView {
    #[serde(flatten)]
    pub wave: Wave,
    pub creator: Option<ProfileSummary>,
    pub charity: Option<ProfileSummary>,
    /// Summaries of participants whose profiles still exist.
    pub participant_profiles: Vec<ProfileSummary>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewWave {
    pub creator_id: String,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub is_new_wave: Option<bool>,
    #[serde(default)]
    pub parent_wave_id: Option<String>,
    #[serde(default)]
    pub cause_name: Option<String>,
    #[serde(default)]
    pub charity_id: Option<String>,
    #[serde(default)]
    pub support_types: Vec<SupportType>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub event_link: Option<String>,
    #[serde(default)]
    pub monetary_value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_monetary_value_visible: Option<bool>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub video_urls: Vec<String>,
    #[serde(default)]
    pub document_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hashtag: Option<String>,
    #[serde(default)]
    pub allow_comments: Option<bool>,
    #[serde(default)]
    pub charity_approval_status: Option<ReviewStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WavePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub is_new_wave: Option<bool>,
    #[serde(default)]
    pub parent_wave_id: Option<String>,
    #[serde(default)]
    pub cause_name: Option<String>,
    #[serde(default)]
    pub charity_id: Option<String>,
    #[serde(default)]
    pub support_types: Option<Vec<SupportType>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub event_link: Option<String>,
    #[serde(default)]
    pub monetary_value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_monetary_value_visible: Option<bool>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub video_urls: Option<Vec<String>>,
    #[serde(default)]
    pub document_urls: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub hashtag: Option<String>,
    #[serde(default)]
    pub allow_comments: Option<bool>,
}

/// Hashtag popularity entry: total participant count summed across all
/// waves carrying the hashtag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HashtagStat {
    pub hashtag: String,
    pub participant_count: u64,
}

/// Pagination envelope used by every paginated listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

pub(crate) fn paginate<T>(items: Vec<T>, page: u64, limit: u64) -> Paginated<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = items.len() as u64;
    // page and limit come straight from the query string; saturate so an
    // out-of-range page yields an empty page instead of overflowing.
    let offset = (page - 1).saturating_mul(limit).min(total);
    let data = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Paginated {
        data,
        total,
        page,
        limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_and_reports_total() {
        let p = paginate((1..=25).collect::<Vec<_>>(), 2, 10);
        assert_eq!(p.total, 25);
        assert_eq!(p.data, (11..=20).collect::<Vec<_>>());
        assert_eq!(p.page, 2);
        assert_eq!(p.limit, 10);
    }

    #[test]
    fn paginate_clamps_zero_page_to_first() {
        let p = paginate(vec![1, 2, 3], 0, 2);
        assert_eq!(p.data, vec![1, 2]);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn paginate_saturates_on_huge_page_numbers() {
        let p = paginate(vec![1, 2, 3], u64::MAX, 10);
        assert!(p.data.is_empty());
        assert_eq!(p.total, 3);

        let p = paginate(vec![1, 2, 3], u64::MAX, u64::MAX);
        assert!(p.data.is_empty());
        assert_eq!(p.total, 3);
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ReviewStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(
            serde_json::to_string(&SupportType::InKind).unwrap(),
            "\"in-kind\""
        );
    }

    #[test]
    fn wave_defaults_apply_on_deserialize() {
        let w: Wave = serde_json::from_value(serde_json::json!({
            "id": "w1",
            "creatorId": "p1",
            "title": "Beach cleanup",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert!(w.allow_comments);
        assert_eq!(w.charity_approval_status, ReviewStatus::Pending);
        assert!(w.participants.is_empty());
        assert!(!w.is_monetary_value_visible);
    }
}

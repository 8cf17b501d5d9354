//! Profile Directory: one public profile per user, the charity-support
//! relationship list, and the per-profile metrics aggregate.

use crate::domain::error::Error;
use crate::domain::identity::IdentityStore;
use crate::domain::model::{
    paginate, CharitySupport, NewProfile, Paginated, Profile, ProfileMetrics, ProfilePatch,
    ProfileSummary, ReviewStatus,
};
use crate::domain::waves::WaveLedger;
use crate::domain::{decode, encode, slug};
use crate::storage::document::DocumentStore;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub(crate) const PROFILES: &str = "profiles";

/// Attempts at deriving a unique slug before giving up with `Conflict`.
/// The suffix is randomized per attempt, so collisions here mean
/// something is very wrong with the random source.
const SLUG_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct ProfileDirectory {
    store: Arc<dyn DocumentStore>,
}

impl ProfileDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Creates the owner's profile. At most one profile may exist per
    /// user; a second attempt fails with `Conflict`.
    pub async fn create_profile(
        &self,
        owner_id: &str,
        owner_email: Option<&str>,
        input: NewProfile,
    ) -> Result<Profile, Error> {
        if input.name.trim().is_empty() {
            return Err(Error::validation("name must not be empty"));
        }
        if self.find_by_owner(owner_id).await?.is_some() {
            return Err(Error::conflict("profile already exists for this user"));
        }

        let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => {
                if self.find_by_slug(explicit).await?.is_some() {
                    return Err(Error::conflict("profile slug already exists"));
                }
                explicit.to_string()
            }
            None => self.derive_slug(&input.name, owner_email).await?,
        };

        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            name: input.name,
            slug,
            short_description: input.short_description,
            industry: input.industry,
            location: input.location,
            overview: input.overview,
            website: input.website,
            address: input.address,
            phone: input.phone,
            social_media_links: input.social_media_links,
            values: input.values,
            impact_metrics: input.impact_metrics,
            support_types: input.support_types,
            causes_supported: input.causes_supported,
            charities_supported: Vec::new(),
            banner_image: input.banner_image,
            logo_image: input.logo_image,
            certifications: input.certifications,
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert(PROFILES, &profile.id, encode(&profile)?)
            .await?;
        Ok(profile)
    }

    /// The suffix is random, so a collision is only possible against an
    /// explicitly chosen slug; re-roll a bounded number of times.
    async fn derive_slug(&self, name: &str, owner_email: Option<&str>) -> Result<String, Error> {
        let source = if !slug::slug_base(name).is_empty() {
            name.to_string()
        } else {
            owner_email.unwrap_or("").to_string()
        };
        for _ in 0..SLUG_ATTEMPTS {
            let candidate = slug::slugify(&source);
            if self.find_by_slug(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(Error::conflict("could not allocate a unique profile slug"))
    }

    pub async fn get(&self, id: &str) -> Result<Profile, Error> {
        match self.store.get(PROFILES, id).await? {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("profile {}", id))),
        }
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Profile, Error> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| Error::not_found(format!("profile with slug {}", slug)))
    }

    pub async fn get_by_owner(&self, user_id: &str) -> Result<Profile, Error> {
        self.find_by_owner(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("profile for user {}", user_id)))
    }

    /// Resolves a weak profile reference; `None` when the target is gone.
    pub async fn resolve(&self, id: &str) -> Result<Option<ProfileSummary>, Error> {
        match self.store.get(PROFILES, id).await? {
            Some(doc) => {
                let profile: Profile = decode(doc)?;
                Ok(Some(ProfileSummary::from(&profile)))
            }
            None => Ok(None),
        }
    }

    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        industry: Option<&str>,
        location: Option<&str>,
    ) -> Result<Paginated<Profile>, Error> {
        let mut profiles = self.all_profiles().await?;
        if let Some(industry) = industry {
            profiles.retain(|p| p.industry.as_deref() == Some(industry));
        }
        if let Some(location) = location {
            profiles.retain(|p| p.location.as_deref() == Some(location));
        }
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(profiles, page, limit))
    }

    /// Case-insensitive substring search across name, industry, location,
    /// supported causes, and values.
    pub async fn search(
        &self,
        query: &str,
        page: u64,
        limit: u64,
    ) -> Result<Paginated<Profile>, Error> {
        let needle = query.to_lowercase();
        let mut profiles = self.all_profiles().await?;
        profiles.retain(|p| {
            let in_field = |f: &Option<String>| {
                f.as_deref()
                    .map(|v| v.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            };
            let in_list =
                |l: &[String]| l.iter().any(|v| v.to_lowercase().contains(&needle));
            p.name.to_lowercase().contains(&needle)
                || in_field(&p.industry)
                || in_field(&p.location)
                || in_list(&p.causes_supported)
                || in_list(&p.values)
        });
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(profiles, page, limit))
    }

    pub async fn update(&self, id: &str, patch: ProfilePatch) -> Result<Profile, Error> {
        if let Some(slug) = patch.slug.as_deref() {
            if let Some(existing) = self.find_by_slug(slug).await? {
                if existing.id != id {
                    return Err(Error::conflict("profile slug already exists"));
                }
            }
        }
        let updated = self
            .store
            .mutate(
                PROFILES,
                id,
                Box::new(move |doc| {
                    let mut p: Profile = decode(doc)?;
                    if let Some(v) = patch.name {
                        p.name = v;
                    }
                    if let Some(v) = patch.slug {
                        p.slug = v;
                    }
                    if let Some(v) = patch.short_description {
                        p.short_description = Some(v);
                    }
                    if let Some(v) = patch.industry {
                        p.industry = Some(v);
                    }
                    if let Some(v) = patch.location {
                        p.location = Some(v);
                    }
                    if let Some(v) = patch.overview {
                        p.overview = Some(v);
                    }
                    if let Some(v) = patch.website {
                        p.website = Some(v);
                    }
                    if let Some(v) = patch.address {
                        p.address = Some(v);
                    }
                    if let Some(v) = patch.phone {
                        p.phone = Some(v);
                    }
                    if let Some(v) = patch.social_media_links {
                        p.social_media_links = v;
                    }
                    if let Some(v) = patch.values {
                        p.values = v;
                    }
                    if let Some(v) = patch.impact_metrics {
                        p.impact_metrics = v;
                    }
                    if let Some(v) = patch.support_types {
                        p.support_types = v;
                    }
                    if let Some(v) = patch.causes_supported {
                        p.causes_supported = v;
                    }
                    if let Some(v) = patch.banner_image {
                        p.banner_image = Some(v);
                    }
                    if let Some(v) = patch.logo_image {
                        p.logo_image = Some(v);
                    }
                    if let Some(v) = patch.certifications {
                        p.certifications = v;
                    }
                    p.updated_at = Utc::now();
                    encode(&p)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("profile {}", id))),
        }
    }

    /// Deletes the profile. Waves referencing it are left untouched;
    /// their reads resolve the dangling reference to `null`.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        if self.store.delete(PROFILES, id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("profile {}", id)))
        }
    }

    /// Appends `{charityId, status: pending}`. Fails with `Conflict` when
    /// the charity is already in the list; the check runs inside the
    /// store's critical section, so concurrent appends cannot both win.
    pub async fn add_charity_support(&self, id: &str, charity_id: &str) -> Result<Profile, Error> {
        if charity_id.trim().is_empty() {
            return Err(Error::validation("charityId must not be empty"));
        }
        let charity_id = charity_id.to_string();
        let updated = self
            .store
            .mutate(
                PROFILES,
                id,
                Box::new(move |doc| {
                    let mut p: Profile = decode(doc)?;
                    if p.charities_supported.iter().any(|s| s.charity_id == charity_id) {
                        return Err(Error::conflict("charity already supported"));
                    }
                    p.charities_supported.push(CharitySupport {
                        charity_id,
                        status: ReviewStatus::Pending,
                    });
                    p.updated_at = Utc::now();
                    encode(&p)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("profile {}", id))),
        }
    }

    /// Overwrites the entry's status in place. Any of the three values is
    /// accepted regardless of the current one; approval authority is
    /// external to this component.
    pub async fn set_charity_support_status(
        &self,
        id: &str,
        charity_id: &str,
        status: ReviewStatus,
    ) -> Result<Profile, Error> {
        let charity_id = charity_id.to_string();
        let updated = self
            .store
            .mutate(
                PROFILES,
                id,
                Box::new(move |doc| {
                    let mut p: Profile = decode(doc)?;
                    let entry = p
                        .charities_supported
                        .iter_mut()
                        .find(|s| s.charity_id == charity_id)
                        .ok_or_else(|| {
                            Error::not_found(format!(
                                "charity {} in this profile's support list",
                                charity_id
                            ))
                        })?;
                    entry.status = status;
                    p.updated_at = Utc::now();
                    encode(&p)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("profile {}", id))),
        }
    }

    pub async fn remove_charity_support(
        &self,
        id: &str,
        charity_id: &str,
    ) -> Result<Profile, Error> {
        let charity_id = charity_id.to_string();
        let updated = self
            .store
            .mutate(
                PROFILES,
                id,
                Box::new(move |doc| {
                    let mut p: Profile = decode(doc)?;
                    let before = p.charities_supported.len();
                    p.charities_supported.retain(|s| s.charity_id != charity_id);
                    if p.charities_supported.len() == before {
                        return Err(Error::not_found(format!(
                            "charity {} in this profile's support list",
                            charity_id
                        )));
                    }
                    p.updated_at = Utc::now();
                    encode(&p)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("profile {}", id))),
        }
    }

    /// Profiles whose owning user registered with the charity role: an
    /// explicit join across the identity and profile collections.
    pub async fn list_charity_profiles(
        &self,
        identity: &IdentityStore,
    ) -> Result<Vec<Profile>, Error> {
        let charity_users = identity.charity_user_ids().await?;
        let mut out = self.all_profiles().await?;
        out.retain(|p| charity_users.contains(&p.user_id));
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    /// Aggregates wave-ledger counts with the approved charity-support
    /// count. Each figure is an independent read; missing weak references
    /// contribute zero.
    pub async fn compute_metrics(
        &self,
        profile_id: &str,
        ledger: &WaveLedger,
    ) -> Result<ProfileMetrics, Error> {
        let profile = self.get(profile_id).await?;
        let waves = ledger.all_waves().await?;

        let total_waves_created = waves
            .iter()
            .filter(|w| w.creator_id == profile_id)
            .count() as u64;

        let total_waves_participated = waves
            .iter()
            .filter(|w| w.participants.iter().any(|p| p.profile_id == profile_id))
            .count() as u64;

        let unique_charities_supported = profile
            .charities_supported
            .iter()
            .filter(|s| s.status == ReviewStatus::Approved)
            .count() as u64;

        // A participant who joined several of this profile's waves counts once.
        let mut distinct: HashSet<&str> = HashSet::new();
        for wave in waves.iter().filter(|w| w.creator_id == profile_id) {
            for participant in &wave.participants {
                distinct.insert(participant.profile_id.as_str());
            }
        }
        let total_unique_participants = distinct.len() as u64;

        let mut cause_names: Vec<String> = Vec::new();
        for wave in &waves {
            if !wave.participants.iter().any(|p| p.profile_id == profile_id) {
                continue;
            }
            if let Some(cause) = wave.cause_name.as_deref() {
                if !cause.is_empty() && !cause_names.iter().any(|c| c == cause) {
                    cause_names.push(cause.to_string());
                }
            }
        }

        Ok(ProfileMetrics {
            total_waves_created,
            total_waves_participated,
            unique_charities_supported,
            total_unique_participants,
            cause_names,
        })
    }

    async fn all_profiles(&self) -> Result<Vec<Profile>, Error> {
        let mut out = Vec::new();
        for doc in self.store.scan(PROFILES).await? {
            out.push(decode(doc)?);
        }
        Ok(out)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Profile>, Error> {
        Ok(self.all_profiles().await?.into_iter().find(|p| p.slug == slug))
    }

    async fn find_by_owner(&self, user_id: &str) -> Result<Option<Profile>, Error> {
        Ok(self
            .all_profiles()
            .await?
            .into_iter()
            .find(|p| p.user_id == user_id))
    }
}

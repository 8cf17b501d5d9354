//! Wave Ledger: campaign records, their participant and comment lists,
//! the charity-approval gate, and discovery queries.

use crate::domain::error::Error;
use crate::domain::model::{
    paginate, Comment, HashtagStat, NewWave, Paginated, Participant, ReviewStatus, Wave,
    WavePatch, WaveView,
};
use crate::domain::profiles::ProfileDirectory;
use crate::domain::{decode, encode};
use crate::storage::document::DocumentStore;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub(crate) const WAVES: &str = "waves";

#[derive(Clone)]
pub struct WaveLedger {
    store: Arc<dyn DocumentStore>,
    profiles: ProfileDirectory,
}

impl WaveLedger {
    pub fn new(store: Arc<dyn DocumentStore>, profiles: ProfileDirectory) -> Self {
        Self { store, profiles }
    }

    /// Creates a wave. The creator profile must resolve; every other
    /// reference stays weak.
    pub async fn create_wave(&self, input: NewWave) -> Result<Wave, Error> {
        if input.title.trim().is_empty() {
            return Err(Error::validation("title must not be empty"));
        }
        if self.profiles.resolve(&input.creator_id).await?.is_none() {
            return Err(Error::not_found(format!(
                "creator profile {}",
                input.creator_id
            )));
        }

        let now = Utc::now();
        let wave = Wave {
            id: Uuid::new_v4().to_string(),
            creator_id: input.creator_id,
            title: input.title,
            short_description: input.short_description,
            long_description: input.long_description,
            is_new_wave: input.is_new_wave.unwrap_or(false),
            parent_wave_id: input.parent_wave_id,
            cause_name: input.cause_name,
            charity_id: input.charity_id,
            support_types: input.support_types,
            location: input.location,
            event_link: input.event_link,
            monetary_value: input.monetary_value,
            currency: input.currency,
            is_monetary_value_visible: input.is_monetary_value_visible.unwrap_or(false),
            image_urls: input.image_urls,
            video_urls: input.video_urls,
            document_urls: input.document_urls,
            tags: input.tags,
            hashtag: input.hashtag,
            allow_comments: input.allow_comments.unwrap_or(true),
            comments: Vec::new(),
            participants: Vec::new(),
            charity_approval_status: input.charity_approval_status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert(WAVES, &wave.id, encode(&wave)?).await?;
        Ok(wave)
    }

    pub async fn get(&self, id: &str) -> Result<WaveView, Error> {
        match self.store.get(WAVES, id).await? {
            Some(doc) => self.resolve_view(decode(doc)?).await,
            None => Err(Error::not_found(format!("wave {}", id))),
        }
    }

    pub async fn find_by_creator(&self, profile_id: &str) -> Result<Vec<WaveView>, Error> {
        self.find_where(|w| w.creator_id == profile_id).await
    }

    pub async fn find_by_charity(&self, profile_id: &str) -> Result<Vec<WaveView>, Error> {
        self.find_where(|w| w.charity_id.as_deref() == Some(profile_id))
            .await
    }

    pub async fn find_by_cause(&self, cause: &str) -> Result<Vec<WaveView>, Error> {
        self.find_where(|w| w.cause_name.as_deref() == Some(cause))
            .await
    }

    pub async fn find_by_hashtag(&self, hashtag: &str) -> Result<Vec<WaveView>, Error> {
        self.find_where(|w| w.hashtag.as_deref() == Some(hashtag))
            .await
    }

    /// Matches waves carrying ANY of the given tags.
    pub async fn find_by_tags(&self, tags: &[String]) -> Result<Vec<WaveView>, Error> {
        self.find_where(|w| w.tags.iter().any(|t| tags.contains(t)))
            .await
    }

    pub async fn find_by_participant(&self, profile_id: &str) -> Result<Vec<WaveView>, Error> {
        self.find_where(|w| w.participants.iter().any(|p| p.profile_id == profile_id))
            .await
    }

    /// Public discovery listing. Only charity-approved waves are visible,
    /// for any filter combination including the empty one.
    pub async fn find_with_filters(
        &self,
        hashtags: Option<&[String]>,
        title: Option<&str>,
        page: u64,
        limit: u64,
    ) -> Result<Paginated<WaveView>, Error> {
        let title_needle = title.map(str::to_lowercase);
        let mut waves = self.all_waves().await?;
        waves.retain(|w| {
            if w.charity_approval_status != ReviewStatus::Approved {
                return false;
            }
            if let Some(hashtags) = hashtags {
                let carried = match w.hashtag.as_deref() {
                    Some(h) => hashtags.iter().any(|wanted| wanted == h),
                    None => false,
                };
                if !carried {
                    return false;
                }
            }
            if let Some(needle) = &title_needle {
                if !w.title.to_lowercase().contains(needle) {
                    return false;
                }
            }
            true
        });
        waves.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let page = paginate(waves, page, limit);
        let mut data = Vec::with_capacity(page.data.len());
        for wave in page.data {
            data.push(self.resolve_view(wave).await?);
        }
        Ok(Paginated {
            data,
            total: page.total,
            page: page.page,
            limit: page.limit,
        })
    }

    pub async fn update(&self, id: &str, patch: WavePatch) -> Result<Wave, Error> {
        let updated = self
            .store
            .mutate(
                WAVES,
                id,
                Box::new(move |doc| {
                    let mut w: Wave = decode(doc)?;
                    if let Some(v) = patch.title {
                        w.title = v;
                    }
                    if let Some(v) = patch.short_description {
                        w.short_description = Some(v);
                    }
                    if let Some(v) = patch.long_description {
                        w.long_description = Some(v);
                    }
                    if let Some(v) = patch.is_new_wave {
                        w.is_new_wave = v;
                    }
                    if let Some(v) = patch.parent_wave_id {
                        w.parent_wave_id = Some(v);
                    }
                    if let Some(v) = patch.cause_name {
                        w.cause_name = Some(v);
                    }
                    if let Some(v) = patch.charity_id {
                        w.charity_id = Some(v);
                    }
                    if let Some(v) = patch.support_types {
                        w.support_types = v;
                    }
                    if let Some(v) = patch.location {
                        w.location = Some(v);
                    }
                    if let Some(v) = patch.event_link {
                        w.event_link = Some(v);
                    }
                    if let Some(v) = patch.monetary_value {
                        w.monetary_value = Some(v);
                    }
                    if let Some(v) = patch.currency {
                        w.currency = Some(v);
                    }
                    if let Some(v) = patch.is_monetary_value_visible {
                        w.is_monetary_value_visible = v;
                    }
                    if let Some(v) = patch.image_urls {
                        w.image_urls = v;
                    }
                    if let Some(v) = patch.video_urls {
                        w.video_urls = v;
                    }
                    if let Some(v) = patch.document_urls {
                        w.document_urls = v;
                    }
                    if let Some(v) = patch.tags {
                        w.tags = v;
                    }
                    if let Some(v) = patch.hashtag {
                        w.hashtag = Some(v);
                    }
                    if let Some(v) = patch.allow_comments {
                        w.allow_comments = v;
                    }
                    w.updated_at = Utc::now();
                    encode(&w)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("wave {}", id))),
        }
    }

    /// Appends a comment with a server-assigned timestamp. Nothing here
    /// auto-approves: `isApproved` stays false unless the caller says
    /// otherwise.
    pub async fn add_comment(
        &self,
        id: &str,
        profile_id: &str,
        content: &str,
        is_approved: bool,
    ) -> Result<Wave, Error> {
        if content.trim().is_empty() {
            return Err(Error::validation("comment content must not be empty"));
        }
        let comment = Comment {
            profile_id: profile_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            is_approved,
        };
        let updated = self
            .store
            .mutate(
                WAVES,
                id,
                Box::new(move |doc| {
                    let mut w: Wave = decode(doc)?;
                    w.comments.push(comment);
                    w.updated_at = Utc::now();
                    encode(&w)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("wave {}", id))),
        }
    }

    /// Joins a profile to the wave with `status: pending`. Uniqueness by
    /// `profileId` is checked inside the store's critical section.
    pub async fn add_participant(&self, id: &str, profile_id: &str) -> Result<Wave, Error> {
        if self.profiles.resolve(profile_id).await?.is_none() {
            return Err(Error::not_found(format!("profile {}", profile_id)));
        }
        let profile_id = profile_id.to_string();
        let updated = self
            .store
            .mutate(
                WAVES,
                id,
                Box::new(move |doc| {
                    let mut w: Wave = decode(doc)?;
                    if w.participants.iter().any(|p| p.profile_id == profile_id) {
                        return Err(Error::conflict("profile is already a participant"));
                    }
                    w.participants.push(Participant {
                        profile_id,
                        status: ReviewStatus::Pending,
                    });
                    w.updated_at = Utc::now();
                    encode(&w)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("wave {}", id))),
        }
    }

    pub async fn update_participant_status(
        &self,
        id: &str,
        profile_id: &str,
        status: ReviewStatus,
    ) -> Result<Wave, Error> {
        let profile_id = profile_id.to_string();
        let updated = self
            .store
            .mutate(
                WAVES,
                id,
                Box::new(move |doc| {
                    let mut w: Wave = decode(doc)?;
                    let entry = w
                        .participants
                        .iter_mut()
                        .find(|p| p.profile_id == profile_id)
                        .ok_or_else(|| {
                            Error::not_found(format!(
                                "participant {} in this wave",
                                profile_id
                            ))
                        })?;
                    entry.status = status;
                    w.updated_at = Utc::now();
                    encode(&w)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("wave {}", id))),
        }
    }

    /// Unconditional overwrite, mirroring the charity-support status
    /// design: the gate has no transition restrictions.
    pub async fn set_charity_approval_status(
        &self,
        id: &str,
        status: ReviewStatus,
    ) -> Result<Wave, Error> {
        let updated = self
            .store
            .mutate(
                WAVES,
                id,
                Box::new(move |doc| {
                    let mut w: Wave = decode(doc)?;
                    w.charity_approval_status = status;
                    w.updated_at = Utc::now();
                    encode(&w)
                }),
            )
            .await?;
        match updated {
            Some(doc) => decode(doc),
            None => Err(Error::not_found(format!("wave {}", id))),
        }
    }

    /// Deletes the wave. Profiles referencing it keep their dangling
    /// entries; readers tolerate those.
    pub async fn remove(&self, id: &str) -> Result<(), Error> {
        if self.store.delete(WAVES, id).await? {
            Ok(())
        } else {
            Err(Error::not_found(format!("wave {}", id)))
        }
    }

    /// Distinct non-empty hashtags ranked by the total participant count
    /// summed across all waves carrying them, descending. Ties keep
    /// first-created order (stable sort).
    pub async fn all_hashtags(&self) -> Result<Vec<HashtagStat>, Error> {
        let mut waves = self.all_waves().await?;
        waves.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, u64> = HashMap::new();
        for wave in &waves {
            let Some(hashtag) = wave.hashtag.as_deref() else {
                continue;
            };
            if hashtag.is_empty() {
                continue;
            }
            if !counts.contains_key(hashtag) {
                order.push(hashtag.to_string());
            }
            *counts.entry(hashtag.to_string()).or_insert(0) += wave.participants.len() as u64;
        }

        let mut stats: Vec<HashtagStat> = order
            .into_iter()
            .map(|hashtag| {
                let participant_count = counts.get(&hashtag).copied().unwrap_or(0);
                HashtagStat {
                    hashtag,
                    participant_count,
                }
            })
            .collect();
        stats.sort_by(|a, b| b.participant_count.cmp(&a.participant_count));
        Ok(stats)
    }

    pub(crate) async fn all_waves(&self) -> Result<Vec<Wave>, Error> {
        let mut out = Vec::new();
        for doc in self.store.scan(WAVES).await? {
            out.push(decode(doc)?);
        }
        Ok(out)
    }

    async fn find_where<F>(&self, keep: F) -> Result<Vec<WaveView>, Error>
    where
        F: Fn(&Wave) -> bool,
    {
        let mut waves = self.all_waves().await?;
        waves.retain(|w| keep(w));
        waves.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut out = Vec::with_capacity(waves.len());
        for wave in waves {
            out.push(self.resolve_view(wave).await?);
        }
        Ok(out)
    }

    /// Resolves weak references for display. A deleted profile turns into
    /// `null` (creator, charity) or disappears from the participant
    /// summaries; it never fails the read.
    async fn resolve_view(&self, wave: Wave) -> Result<WaveView, Error> {
        let creator = self.profiles.resolve(&wave.creator_id).await?;
        let charity = match wave.charity_id.as_deref() {
            Some(id) => self.profiles.resolve(id).await?,
            None => None,
        };
        let mut participant_profiles = Vec::new();
        for participant in &wave.participants {
            if let Some(summary) = self.profiles.resolve(&participant.profile_id).await? {
                participant_profiles.push(summary);
            }
        }
        Ok(WaveView {
            wave,
            creator,
            charity,
            participant_profiles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::NewProfile;
    use crate::storage::memory::MemoryStore;

    async fn fixture() -> (ProfileDirectory, WaveLedger) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let profiles = ProfileDirectory::new(store.clone());
        let ledger = WaveLedger::new(store, profiles.clone());
        (profiles, ledger)
    }

    async fn profile(dir: &ProfileDirectory, owner: &str, name: &str) -> String {
        dir.create_profile(
            owner,
            None,
            NewProfile {
                name: name.to_string(),
                ..NewProfile::default()
            },
        )
        .await
        .unwrap()
        .id
    }

    fn wave_for(creator: &str, title: &str) -> NewWave {
        NewWave {
            creator_id: creator.to_string(),
            title: title.to_string(),
            short_description: None,
            long_description: None,
            is_new_wave: None,
            parent_wave_id: None,
            cause_name: None,
            charity_id: None,
            support_types: Vec::new(),
            location: None,
            event_link: None,
            monetary_value: None,
            currency: None,
            is_monetary_value_visible: None,
            image_urls: Vec::new(),
            video_urls: Vec::new(),
            document_urls: Vec::new(),
            tags: Vec::new(),
            hashtag: None,
            allow_comments: None,
            charity_approval_status: None,
        }
    }

    #[tokio::test]
    async fn create_requires_resolvable_creator() {
        let (_, ledger) = fixture().await;
        let err = ledger.create_wave(wave_for("ghost", "Nope")).await;
        assert!(matches!(err, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn create_then_get_round_trips_with_defaults() {
        let (dir, ledger) = fixture().await;
        let creator = profile(&dir, "u1", "Maker").await;
        let mut input = wave_for(&creator, "River cleanup");
        input.tags = vec!["water".into()];
        input.monetary_value = Some(250.0);

        let created = ledger.create_wave(input).await.unwrap();
        assert!(created.allow_comments);
        assert_eq!(created.charity_approval_status, ReviewStatus::Pending);

        let fetched = ledger.get(&created.id).await.unwrap();
        assert_eq!(fetched.wave.title, "River cleanup");
        assert_eq!(fetched.wave.tags, vec!["water".to_string()]);
        assert_eq!(fetched.wave.monetary_value, Some(250.0));
        assert_eq!(fetched.creator.as_ref().map(|c| c.id.as_str()), Some(creator.as_str()));
    }

    #[tokio::test]
    async fn participants_are_unique_per_wave() {
        let (dir, ledger) = fixture().await;
        let creator = profile(&dir, "u1", "Maker").await;
        let joiner = profile(&dir, "u2", "Joiner").await;
        let wave = ledger.create_wave(wave_for(&creator, "W")).await.unwrap();

        let first = ledger.add_participant(&wave.id, &joiner).await.unwrap();
        assert_eq!(first.participants[0].status, ReviewStatus::Pending);

        let err = ledger.add_participant(&wave.id, &joiner).await;
        assert!(matches!(err, Err(Error::Conflict(_))));
        let after = ledger.get(&wave.id).await.unwrap();
        assert_eq!(after.wave.participants.len(), 1);
    }

    #[tokio::test]
    async fn filtered_listing_only_shows_approved_waves() {
        let (dir, ledger) = fixture().await;
        let creator = profile(&dir, "u1", "Maker").await;
        let pending = ledger.create_wave(wave_for(&creator, "Pending one")).await.unwrap();
        let approved = ledger.create_wave(wave_for(&creator, "Approved one")).await.unwrap();
        ledger
            .set_charity_approval_status(&approved.id, ReviewStatus::Approved)
            .await
            .unwrap();

        let page = ledger.find_with_filters(None, None, 1, 10).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].wave.id, approved.id);

        // Even a title filter that matches the pending wave leaks nothing.
        let page = ledger
            .find_with_filters(None, Some("pending"), 1, 10)
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        let _ = pending;
    }

    #[tokio::test]
    async fn hashtag_ranking_sums_participants_with_stable_ties() {
        let (dir, ledger) = fixture().await;
        let creator = profile(&dir, "u1", "Maker").await;
        let joiners: Vec<String> = {
            let mut out = Vec::new();
            for i in 0..8 {
                out.push(profile(&dir, &format!("joiner-{}", i), "J").await);
            }
            out
        };

        let mut w1 = wave_for(&creator, "H1");
        w1.hashtag = Some("#x".into());
        let w1 = ledger.create_wave(w1).await.unwrap();
        let mut w2 = wave_for(&creator, "H2");
        w2.hashtag = Some("#x".into());
        let w2 = ledger.create_wave(w2).await.unwrap();
        let mut w3 = wave_for(&creator, "H3");
        w3.hashtag = Some("#y".into());
        let w3 = ledger.create_wave(w3).await.unwrap();

        for joiner in &joiners[0..2] {
            ledger.add_participant(&w1.id, joiner).await.unwrap();
        }
        for joiner in &joiners[2..7] {
            ledger.add_participant(&w2.id, joiner).await.unwrap();
        }
        ledger.add_participant(&w3.id, &joiners[7]).await.unwrap();

        let stats = ledger.all_hashtags().await.unwrap();
        assert_eq!(
            stats,
            vec![
                HashtagStat { hashtag: "#x".into(), participant_count: 7 },
                HashtagStat { hashtag: "#y".into(), participant_count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn hashtag_ties_rank_first_created_first() {
        let (dir, ledger) = fixture().await;
        let creator = profile(&dir, "u1", "Maker").await;
        let j1 = profile(&dir, "j1", "J").await;
        let j2 = profile(&dir, "j2", "J").await;
        let j3 = profile(&dir, "j3", "J").await;
        let j4 = profile(&dir, "j4", "J").await;

        // #late is created first, #early second; both end up at two
        // participants, so only creation order can break the tie.
        let mut first = wave_for(&creator, "First");
        first.hashtag = Some("#late".into());
        let first = ledger.create_wave(first).await.unwrap();
        let mut second = wave_for(&creator, "Second");
        second.hashtag = Some("#early".into());
        let second = ledger.create_wave(second).await.unwrap();

        ledger.add_participant(&second.id, &j1).await.unwrap();
        ledger.add_participant(&second.id, &j2).await.unwrap();
        ledger.add_participant(&first.id, &j3).await.unwrap();
        ledger.add_participant(&first.id, &j4).await.unwrap();

        let stats = ledger.all_hashtags().await.unwrap();
        assert_eq!(
            stats,
            vec![
                HashtagStat { hashtag: "#late".into(), participant_count: 2 },
                HashtagStat { hashtag: "#early".into(), participant_count: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn deleting_creator_resolves_to_null_not_error() {
        let (dir, ledger) = fixture().await;
        let creator = profile(&dir, "u1", "Maker").await;
        let wave = ledger.create_wave(wave_for(&creator, "Orphan")).await.unwrap();

        dir.delete(&creator).await.unwrap();

        let view = ledger.get(&wave.id).await.unwrap();
        assert!(view.creator.is_none());
        assert_eq!(view.wave.creator_id, creator);
    }

    #[tokio::test]
    async fn metrics_deduplicate_participants_across_waves() {
        let (dir, ledger) = fixture().await;
        let a = profile(&dir, "ua", "A").await;
        let b = profile(&dir, "ub", "B").await;
        let c = profile(&dir, "uc", "C").await;

        let w1 = ledger.create_wave(wave_for(&a, "W1")).await.unwrap();
        let w2 = ledger.create_wave(wave_for(&a, "W2")).await.unwrap();
        ledger.add_participant(&w1.id, &b).await.unwrap();
        ledger.add_participant(&w1.id, &c).await.unwrap();
        ledger.add_participant(&w2.id, &b).await.unwrap();

        let metrics = dir.compute_metrics(&a, &ledger).await.unwrap();
        assert_eq!(metrics.total_waves_created, 2);
        assert_eq!(metrics.total_unique_participants, 2);
        assert_eq!(metrics.total_waves_participated, 0);
    }

    #[tokio::test]
    async fn participant_status_update_requires_membership() {
        let (dir, ledger) = fixture().await;
        let creator = profile(&dir, "u1", "Maker").await;
        let wave = ledger.create_wave(wave_for(&creator, "W")).await.unwrap();

        let err = ledger
            .update_participant_status(&wave.id, "ghost", ReviewStatus::Approved)
            .await;
        assert!(matches!(err, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn tag_discovery_matches_any_tag() {
        let (dir, ledger) = fixture().await;
        let creator = profile(&dir, "u1", "Maker").await;
        let mut tagged = wave_for(&creator, "Tagged");
        tagged.tags = vec!["ocean".into(), "beach".into()];
        let tagged = ledger.create_wave(tagged).await.unwrap();
        ledger.create_wave(wave_for(&creator, "Untagged")).await.unwrap();

        let hits = ledger
            .find_by_tags(&["beach".to_string(), "forest".to_string()])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].wave.id, tagged.id);
    }
}

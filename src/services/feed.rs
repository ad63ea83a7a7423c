use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Interaction, Post},
    services::tags::{normalize_all, SubstringMatcher, TagMatcher},
    store::FeedStore,
};

/// Weight of one matched skill or interest
const DIRECT_MATCH_WEIGHT: u32 = 5;
/// Weight of one tag shared with a previously liked post
const LIKED_OVERLAP_WEIGHT: u32 = 3;

/// A candidate post with its computed relevance
///
/// Ephemeral, rebuilt on every feed request. The match counts are not
/// diagnostics only: the balancer partitions on them.
#[derive(Debug, Clone)]
pub struct ScoredPost {
    pub post_id: Uuid,
    pub score: u32,
    pub skill_matches: usize,
    pub pref_matches: usize,
    /// Original (un-normalized) tag list, for logging
    pub tags: Vec<String>,
    pub title: String,
}

/// Personalized feed ranking service
///
/// Combines declared-skill matches, declared-interest matches, and
/// implicit signal from prior likes into a bounded, balanced list of
/// post identifiers. A pure read/compute path: it never writes to the
/// store and never touches counters.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn FeedStore>,
    matcher: Arc<dyn TagMatcher>,
}

impl FeedService {
    /// Creates a feed service with the default substring matching policy
    pub fn new(store: Arc<dyn FeedStore>) -> Self {
        Self::with_matcher(store, Arc::new(SubstringMatcher))
    }

    /// Creates a feed service with a custom matching policy
    pub fn with_matcher(store: Arc<dyn FeedStore>, matcher: Arc<dyn TagMatcher>) -> Self {
        Self { store, matcher }
    }

    /// Computes the recommended feed for a user
    ///
    /// Returns at most `limit` post identifiers, highest relevance
    /// first, duplicate-free, drawn from the candidate set. A user
    /// without a profile gets an empty feed, as does a non-positive
    /// limit; neither is an error.
    pub async fn recommend(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<Uuid>> {
        if limit <= 0 {
            return Ok(Vec::new());
        }
        let limit = limit as usize;

        // 1. Load profile; no profile means no personalization is possible
        let Some(profile) = self.store.profile_for(user_id).await? else {
            tracing::debug!(user_id = %user_id, "No profile, returning empty feed");
            return Ok(Vec::new());
        };

        // 2. Load interaction history
        let interactions = self.store.interactions_for(user_id).await?;

        // 3. Candidates: everything except own posts and already-viewed posts
        let viewed: HashSet<Uuid> = interactions
            .iter()
            .filter(|i| i.is_view())
            .map(|i| i.post_id)
            .collect();
        let candidates = self.store.candidate_posts(user_id, viewed).await?;

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // 4. Normalize declared terms once per invocation
        let skills = normalize_all(&profile.skills);
        let interests = normalize_all(&profile.interests);

        // 5. Resolve liked posts' tag sets once, not per candidate
        let liked_tag_sets = self.liked_tag_sets(&interactions).await?;

        // 6. Score every candidate
        let mut scored: Vec<ScoredPost> = candidates
            .iter()
            .map(|post| {
                score_post(
                    post,
                    &skills,
                    &interests,
                    &liked_tag_sets,
                    self.matcher.as_ref(),
                )
            })
            .collect();

        // 7. Highest score first; stable, so ties keep candidate order
        scored.sort_by(|a, b| b.score.cmp(&a.score));

        // 8. Balance skill-driven and interest-driven content, backfill
        let selected = balance(scored, &skills, &interests, limit);

        for entry in &selected {
            tracing::debug!(
                post_id = %entry.post_id,
                score = entry.score,
                skill_matches = entry.skill_matches,
                pref_matches = entry.pref_matches,
                title = %entry.title,
                "Ranked feed entry"
            );
        }
        tracing::info!(
            user_id = %user_id,
            candidates = candidates.len(),
            returned = selected.len(),
            "Feed computed"
        );

        Ok(selected.into_iter().map(|p| p.post_id).collect())
    }

    /// Fetches the normalized tag set of every post the user liked
    ///
    /// A liked post that no longer resolves is skipped; it contributes
    /// zero rather than failing the whole ranking.
    async fn liked_tag_sets(
        &self,
        interactions: &[Interaction],
    ) -> AppResult<Vec<(Uuid, HashSet<String>)>> {
        let mut sets = Vec::new();

        for interaction in interactions.iter().filter(|i| i.is_like()) {
            match self.store.post_by_id(interaction.post_id).await {
                Ok(Some(liked)) => {
                    let tags: HashSet<String> = normalize_all(&liked.tags).into_iter().collect();
                    sets.push((liked.id, tags));
                }
                Ok(None) => {
                    tracing::debug!(post_id = %interaction.post_id, "Liked post no longer exists, skipping");
                }
                Err(e) => {
                    tracing::warn!(post_id = %interaction.post_id, error = %e, "Liked post lookup failed, skipping");
                }
            }
        }

        Ok(sets)
    }
}

/// Scores one candidate post
///
/// Direct score: 5 per declared skill and per declared interest that
/// matches any tag under the matcher policy. Interaction score: 3 per
/// candidate tag found (exact equality) in the tag set of each other
/// post the user liked.
fn score_post(
    post: &Post,
    skills: &[String],
    interests: &[String],
    liked_tag_sets: &[(Uuid, HashSet<String>)],
    matcher: &dyn TagMatcher,
) -> ScoredPost {
    let tags = normalize_all(&post.tags);

    let skill_matches = count_matched_terms(skills, &tags, matcher);
    let pref_matches = count_matched_terms(interests, &tags, matcher);
    let direct_score = DIRECT_MATCH_WEIGHT * (skill_matches + pref_matches) as u32;

    let mut interaction_score = 0u32;
    for (liked_id, liked_tags) in liked_tag_sets {
        // Similarity to *other* liked content; a like on the candidate
        // itself says nothing about tag affinity
        if *liked_id == post.id {
            continue;
        }
        let overlap = tags.iter().filter(|t| liked_tags.contains(*t)).count();
        interaction_score += LIKED_OVERLAP_WEIGHT * overlap as u32;
    }

    ScoredPost {
        post_id: post.id,
        score: direct_score + interaction_score,
        skill_matches,
        pref_matches,
        tags: post.tags.clone(),
        title: post.title.clone(),
    }
}

/// Counts declared terms that match at least one tag
fn count_matched_terms(declared: &[String], tags: &[String], matcher: &dyn TagMatcher) -> usize {
    declared
        .iter()
        .filter(|term| tags.iter().any(|tag| matcher.matches(term, tag)))
        .count()
}

/// Selects at most `limit` entries from the descending-sorted pool
///
/// When the user declared both skills and interests and both partitions
/// are non-empty, half the limit (floor) goes to skill-related entries
/// and the remainder to interest-related ones, deduplicated by id.
/// Whatever room is left is backfilled from the overall pool in score
/// order. The final list is re-sorted by score (stable) and truncated.
fn balance(
    pool: Vec<ScoredPost>,
    skills: &[String],
    interests: &[String],
    limit: usize,
) -> Vec<ScoredPost> {
    let skill_related: Vec<&ScoredPost> = pool.iter().filter(|p| p.skill_matches > 0).collect();
    let pref_related: Vec<&ScoredPost> = pool.iter().filter(|p| p.pref_matches > 0).collect();

    let mut result: Vec<ScoredPost> = Vec::new();
    let mut picked: HashSet<Uuid> = HashSet::new();

    if !skills.is_empty()
        && !interests.is_empty()
        && !skill_related.is_empty()
        && !pref_related.is_empty()
    {
        let skill_count = (limit / 2).min(skill_related.len());
        let pref_count = (limit - skill_count).min(pref_related.len());

        for entry in skill_related.iter().take(skill_count) {
            if picked.insert(entry.post_id) {
                result.push((*entry).clone());
            }
        }
        for entry in pref_related.iter().take(pref_count) {
            if picked.insert(entry.post_id) {
                result.push((*entry).clone());
            }
        }
    }

    // Pad up to the limit with the best remaining candidates
    for entry in &pool {
        if result.len() >= limit {
            break;
        }
        if picked.insert(entry.post_id) {
            result.push(entry.clone());
        }
    }

    // The sections above interleave skill-first, interest-first, then
    // backfill; restore global score order before emitting
    result.sort_by(|a, b| b.score.cmp(&a.score));
    result.truncate(limit);
    result
}

/// Track search over the configured catalog
use crate::config::CatalogEntry;
use async_trait::async_trait;
use encore_core::{Result, TrackId, TrackRef, TrackResolver};

/// Resolver that matches queries against titles and authors
///
/// Every query word must appear in the title or author. Exact title matches
/// rank first, then catalog order. Each hit carries a fresh [`TrackId`], so
/// requesting the same song twice queues two distinct entries.
pub struct CatalogResolver {
    tracks: Vec<TrackRef>,
}

impl CatalogResolver {
    pub fn new(entries: &[CatalogEntry]) -> Self {
        Self {
            tracks: entries.iter().map(CatalogEntry::to_track).collect(),
        }
    }

    pub fn tracks(&self) -> &[TrackRef] {
        &self.tracks
    }

    fn matches(track: &TrackRef, words: &[String]) -> bool {
        let haystack = format!(
            "{} {}",
            track.title.to_lowercase(),
            track.author.as_deref().unwrap_or_default().to_lowercase()
        );
        words.iter().all(|word| haystack.contains(word.as_str()))
    }
}

#[async_trait]
impl TrackResolver for CatalogResolver {
    async fn search(&self, query: &str) -> Result<Vec<TrackRef>> {
        let query = query.trim().to_lowercase();
        let words: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<TrackRef> = self
            .tracks
            .iter()
            .filter(|track| Self::matches(track, &words))
            .map(|track| TrackRef {
                id: TrackId::generate(),
                ..track.clone()
            })
            .collect();

        // Stable sort keeps catalog order among equals
        hits.sort_by_key(|track| track.title.to_lowercase() != query);
        Ok(hits)
    }
}

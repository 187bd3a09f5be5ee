use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::GenreId;

/// Maximum number of genres a user may pin
pub const MAX_PREFERRED_GENRES: usize = 3;

/// Genre reference used by preference and recommendation payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferredGenreSummary {
    pub id: GenreId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// The user's manually selected genres, ordered by selection rank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PreferredGenres {
    #[serde(default)]
    pub preferred_genres: Vec<PreferredGenreSummary>,
    #[serde(default)]
    pub preferred_genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub last_genre_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cooldown_active: bool,
    #[serde(default)]
    pub next_update_available_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub days_until_next_update: u32,
}

impl PreferredGenres {
    /// Genre ids in rank order, falling back to the summaries when the id list is absent
    pub fn genre_ids(&self) -> Vec<GenreId> {
        if self.preferred_genre_ids.is_empty() {
            self.preferred_genres.iter().map(|g| g.id).collect()
        } else {
            self.preferred_genre_ids.clone()
        }
    }

    /// Time left before the backend accepts another change
    pub fn cooldown_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        if !self.cooldown_active {
            return None;
        }

        match self.next_update_available_at {
            Some(at) if at > now => Some(at - now),
            Some(_) => None,
            None => Some(Duration::days(i64::from(self.days_until_next_update))),
        }
    }
}

/// Body of a preferred-genre update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferredGenresUpdate {
    pub genre_ids: Vec<GenreId>,
}

impl PreferredGenresUpdate {
    /// Drops duplicate ids (keeping first occurrence) and enforces the genre cap
    pub fn normalized(&self) -> Result<Vec<GenreId>, String> {
        let mut ids: Vec<GenreId> = Vec::with_capacity(self.genre_ids.len());
        for id in &self.genre_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }

        if ids.len() > MAX_PREFERRED_GENRES {
            return Err(format!(
                "At most {} preferred genres can be selected",
                MAX_PREFERRED_GENRES
            ));
        }

        Ok(ids)
    }
}

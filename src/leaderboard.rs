use rocket::serde::{self, Serialize};

use crate::database::GameScore;

/// The number of entries the public leaderboard shows.
pub const TOP_SCORES_LIMIT: usize = 10;

/// Entries ordered by score, highest first, never longer than the limit it was built with.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaderboard<T: LeaderboardItem> {
    collection: Vec<T>,
}

impl<T: LeaderboardItem> Leaderboard<T> {
    /// Ranks `collection` by score (ties keep their incoming order) and keeps the first `limit`.
    pub fn ranked(mut collection: Vec<T>, limit: usize) -> Self {
        collection.sort_by(|a, b| b.score().cmp(&a.score()));
        collection.truncate(limit);
        Self { collection }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.collection.iter()
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }
}

impl<T: LeaderboardItem> Serialize for Leaderboard<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.collection.serialize(serializer)
    }
}

pub trait LeaderboardItem: Serialize {
    fn score(&self) -> GameScore;
}

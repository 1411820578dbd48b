use chrono::NaiveDateTime;
use rocket::serde::{Deserialize, Serialize};

use crate::leaderboard::LeaderboardItem;

pub type GameScore = i64;

/// Format of `created_at`: ISO-8601 on the server's local clock, without an offset.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A score as submitted by a player.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ScoreSubmission {
    pub player_name: String,
    pub score: GameScore,
    pub difficulty: String,
    pub time_taken: i64,
}

impl ScoreSubmission {
    #[cfg(test)]
    pub fn new(
        player_name: impl Into<String>,
        score: GameScore,
        difficulty: impl Into<String>,
        time_taken: i64,
    ) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            difficulty: difficulty.into(),
            time_taken,
        }
    }

    pub fn stamp(self, created_at: NaiveDateTime) -> ScoreRecord {
        ScoreRecord {
            player_name: self.player_name,
            score: self.score,
            difficulty: self.difficulty,
            time_taken: self.time_taken,
            created_at: created_at.format(CREATED_AT_FORMAT).to_string(),
        }
    }
}

/// A submission stamped with its creation time, ready to be written.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ScoreRecord {
    pub player_name: String,
    pub score: GameScore,
    pub difficulty: String,
    pub time_taken: i64,
    pub created_at: String,
}

/// The public projection of a record, as listed on the leaderboard.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(crate = "rocket::serde")]
pub struct ScoreEntry {
    pub player_name: String,
    pub score: GameScore,
    pub difficulty: String,
    pub time_taken: i64,
}

impl From<ScoreSubmission> for ScoreEntry {
    fn from(submission: ScoreSubmission) -> Self {
        Self {
            player_name: submission.player_name,
            score: submission.score,
            difficulty: submission.difficulty,
            time_taken: submission.time_taken,
        }
    }
}

impl LeaderboardItem for ScoreEntry {
    fn score(&self) -> GameScore {
        self.score
    }
}


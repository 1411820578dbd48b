use async_trait::async_trait;
use rocket::serde::json::Value;
use sqlx::any::AnyRow;
use sqlx::{AnyPool, Row};

use super::*;

/// The SQL flavours a database url may point at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SqlDialect {
    Postgres,
    Sqlite,
}

impl SqlDialect {
    pub fn from_url(database_url: &str) -> Self {
        let url = database_url.to_ascii_lowercase();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Self::Postgres
        } else {
            Self::Sqlite
        }
    }

    /// Placeholder for the `created_at` text, converted to the column's time type where needed.
    fn created_at_param(self) -> &'static str {
        match self {
            Self::Postgres => "CAST($5 AS TIMESTAMPTZ)",
            Self::Sqlite => "$5",
        }
    }

    /// An expression rendering the inserted row as a JSON text column.
    fn inserted_row(self, table: &str) -> String {
        match self {
            Self::Postgres => format!("CAST(row_to_json({}) AS TEXT)", table),
            Self::Sqlite => "json_object('id', id, 'player_name', player_name, 'score', score, \
                             'difficulty', difficulty, 'time_taken', time_taken, \
                             'created_at', created_at)"
                .to_owned(),
        }
    }
}

/// Scores kept in a SQL table reached through a database url (postgres or sqlite).
///
/// Expected columns: `id` (generated), `player_name`, `score`, `difficulty`,
/// `time_taken` and `created_at` (a timestamp on postgres, ISO-8601 text on sqlite).
pub struct SqlScoreStore {
    pool: AnyPool,
    dialect: SqlDialect,
    table: String,
}

impl SqlScoreStore {
    pub async fn connect(database_url: &str, table: &str) -> StoreResult<Self> {
        sqlx::any::install_default_drivers();
        let pool = AnyPool::connect(database_url).await?;
        Ok(Self::new(pool, SqlDialect::from_url(database_url), table))
    }

    pub fn new(pool: AnyPool, dialect: SqlDialect, table: &str) -> Self {
        Self {
            pool,
            dialect,
            table: table.to_owned(),
        }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    fn insert_query(&self) -> String {
        format!(
            "INSERT INTO {} (player_name, score, difficulty, time_taken, created_at) \
             VALUES ($1, $2, $3, $4, {}) \
             RETURNING {} AS inserted",
            self.table,
            self.dialect.created_at_param(),
            self.dialect.inserted_row(&self.table)
        )
    }
}

#[async_trait]
impl ScoreStore for SqlScoreStore {
    async fn top_scores(&self, limit: usize) -> StoreResult<Vec<ScoreEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT player_name, score, difficulty, time_taken FROM {} ORDER BY score DESC LIMIT {}",
            self.table, limit
        ))
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(entries)
    }

    async fn insert_score(&self, record: &ScoreRecord) -> StoreResult<Value> {
        let rows = sqlx::query(&self.insert_query())
            .bind(record.player_name.clone())
            .bind(record.score)
            .bind(record.difficulty.clone())
            .bind(record.time_taken)
            .bind(record.created_at.clone())
            .fetch_all(&self.pool)
            .await?;

        let mut inserted = Vec::with_capacity(rows.len());
        for row in &rows {
            let json: String = row.try_get("inserted")?;
            inserted.push(rocket::serde::json::from_str::<Value>(&json)?);
        }
        Ok(Value::Array(inserted))
    }
}

fn entry_from_row(row: &AnyRow) -> Result<ScoreEntry, sqlx::Error> {
    Ok(ScoreEntry {
        player_name: row.try_get("player_name")?,
        score: row.try_get("score")?,
        difficulty: row.try_get("difficulty")?,
        time_taken: row.try_get("time_taken")?,
    })
}

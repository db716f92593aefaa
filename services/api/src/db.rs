//! Data Access Layer
//!
//! PostgreSQL implementation of [`VocabularyStore`]. Multi-statement operations
//! run inside a transaction, and the unique constraints on `users.external_id`,
//! `words (native_term, target_term)` and `vocabulary_entries (user_id, word_id)`
//! absorb concurrent duplicate inserts through `ON CONFLICT`.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use vocabot_core::model::{AddedWord, EnsuredUser, Progress, UserId, VocabularyItem, WordId, normalize_term};
use vocabot_core::{Result, SeedPair, VocabularyStore};

#[derive(sqlx::FromRow)]
struct ItemRow {
    word_id: i64,
    native_term: String,
    target_term: String,
    attempt_count: i32,
    correct_count: i32,
}

impl From<ItemRow> for VocabularyItem {
    fn from(row: ItemRow) -> Self {
        Self {
            word_id: WordId(row.word_id),
            native_term: row.native_term,
            target_term: row.target_term,
            attempt_count: row.attempt_count,
            correct_count: row.correct_count,
        }
    }
}

/// A wrapper around the `PgPool` to provide a clear data access interface.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Creates a new `Db` instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("failed to connect to the database")?;
        Ok(Self::new(pool))
    }

    /// Runs all pending `sqlx` migrations.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl VocabularyStore for Db {
    async fn seed_common_words(&self, pairs: &[SeedPair]) -> Result<usize> {
        let mut tx = self.pool.begin().await.context("failed to begin seeding")?;

        let seeded: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM words WHERE is_common)")
            .fetch_one(&mut *tx)
            .await
            .context("failed to check for common words")?;
        if seeded {
            return Ok(0);
        }

        for pair in pairs {
            sqlx::query(
                r#"
                INSERT INTO words (native_term, target_term, is_common)
                VALUES ($1, $2, TRUE)
                ON CONFLICT (native_term, target_term) DO UPDATE SET is_common = TRUE
                "#,
            )
            .bind(normalize_term(pair.native))
            .bind(normalize_term(pair.target))
            .execute(&mut *tx)
            .await
            .context("failed to insert common word")?;
        }

        tx.commit().await.context("failed to commit seeding")?;
        Ok(pairs.len())
    }

    async fn ensure_user(&self, external_id: i64, display_name: &str) -> Result<EnsuredUser> {
        let mut tx = self.pool.begin().await.context("failed to begin enrollment")?;

        let created: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO users (external_id, display_name)
            VALUES ($1, $2)
            ON CONFLICT (external_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(external_id)
        .bind(display_name)
        .fetch_optional(&mut *tx)
        .await
        .context("failed to insert user")?;

        let ensured = match created {
            Some(id) => {
                sqlx::query(
                    r#"
                    INSERT INTO vocabulary_entries (user_id, word_id)
                    SELECT $1, id FROM words WHERE is_common
                    ON CONFLICT (user_id, word_id) DO NOTHING
                    "#,
                )
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("failed to enroll common words")?;
                EnsuredUser {
                    id: UserId(id),
                    is_new: true,
                }
            }
            None => {
                let id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE external_id = $1")
                    .bind(external_id)
                    .fetch_one(&mut *tx)
                    .await
                    .context("failed to load existing user")?;
                EnsuredUser {
                    id: UserId(id),
                    is_new: false,
                }
            }
        };

        tx.commit().await.context("failed to commit enrollment")?;
        Ok(ensured)
    }

    async fn lookup_user(&self, external_id: i64) -> Result<Option<UserId>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .context("failed to look up user")?;
        Ok(id.map(UserId))
    }

    async fn add_word(
        &self,
        user_id: UserId,
        native_term: &str,
        target_term: &str,
    ) -> Result<AddedWord> {
        let mut tx = self.pool.begin().await.context("failed to begin add_word")?;

        // The no-op update makes RETURNING yield the id of an existing row too.
        let word_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO words (native_term, target_term)
            VALUES ($1, $2)
            ON CONFLICT (native_term, target_term) DO UPDATE SET native_term = EXCLUDED.native_term
            RETURNING id
            "#,
        )
        .bind(normalize_term(native_term))
        .bind(normalize_term(target_term))
        .fetch_one(&mut *tx)
        .await
        .context("failed to upsert word")?;

        sqlx::query(
            r#"
            INSERT INTO vocabulary_entries (user_id, word_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, word_id) DO NOTHING
            "#,
        )
        .bind(user_id.0)
        .bind(word_id)
        .execute(&mut *tx)
        .await
        .context("failed to link word to user")?;

        let total_words: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM vocabulary_entries WHERE user_id = $1")
                .bind(user_id.0)
                .fetch_one(&mut *tx)
                .await
                .context("failed to count vocabulary")?;

        tx.commit().await.context("failed to commit add_word")?;
        Ok(AddedWord {
            word_id: WordId(word_id),
            total_words,
        })
    }

    async fn remove_word(&self, user_id: UserId, word_id: WordId) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM vocabulary_entries WHERE user_id = $1 AND word_id = $2")
                .bind(user_id.0)
                .bind(word_id.0)
                .execute(&self.pool)
                .await
                .context("failed to remove word")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_words(&self, user_id: UserId) -> Result<Vec<VocabularyItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT w.id AS word_id, w.native_term, w.target_term, e.attempt_count, e.correct_count
            FROM vocabulary_entries e
            JOIN words w ON w.id = e.word_id
            WHERE e.user_id = $1
            ORDER BY e.created_at, e.id
            "#,
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .context("failed to list words")?;
        Ok(rows.into_iter().map(VocabularyItem::from).collect())
    }

    async fn sample_target_terms(
        &self,
        exclude_word: WordId,
        exclude_terms: &[String],
        limit: usize,
    ) -> Result<Vec<String>> {
        let terms: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT target_term FROM (
                SELECT DISTINCT target_term
                FROM words
                WHERE id <> $1 AND NOT (target_term = ANY($2))
            ) pool
            ORDER BY random()
            LIMIT $3
            "#,
        )
        .bind(exclude_word.0)
        .bind(exclude_terms)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .context("failed to sample target terms")?;
        Ok(terms)
    }

    async fn record_attempt(
        &self,
        user_id: UserId,
        word_id: WordId,
        correct: bool,
    ) -> Result<Option<Progress>> {
        let row: Option<(i32, i32)> = sqlx::query_as(
            r#"
            UPDATE vocabulary_entries
            SET attempt_count = attempt_count + 1,
                correct_count = correct_count + CASE WHEN $3 THEN 1 ELSE 0 END
            WHERE user_id = $1 AND word_id = $2
            RETURNING attempt_count, correct_count
            "#,
        )
        .bind(user_id.0)
        .bind(word_id.0)
        .bind(correct)
        .fetch_optional(&self.pool)
        .await
        .context("failed to record attempt")?;
        Ok(row.map(|(attempt_count, correct_count)| Progress {
            attempt_count,
            correct_count,
        }))
    }
}

//! Postgres-backed document store. Each profile and chat session is one
//! JSONB document keyed by its id; reads and writes always move the whole
//! document.

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::chat::ChatSession;
use crate::models::profile::StudentProfile;
use crate::store::{ChatStore, ProfileStore};

/// Creates the document tables if they do not exist. Run once at startup.
pub async fn ensure_schema(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id    TEXT PRIMARY KEY,
            doc        JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_sessions (
            id         TEXT PRIMARY KEY,
            user_id    TEXT NOT NULL,
            doc        JSONB NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS chat_sessions_user_id_idx ON chat_sessions (user_id)")
        .execute(pool)
        .await?;

    info!("Document store schema ready");
    Ok(())
}

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        PgProfileStore { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find(&self, user_id: &str) -> Result<Option<StudentProfile>, AppError> {
        let doc: Option<Value> =
            sqlx::query_scalar("SELECT doc FROM profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        match doc {
            None => Ok(None),
            Some(doc) => {
                let profile = serde_json::from_value(doc)
                    .with_context(|| format!("corrupt profile document for user {user_id}"))?;
                Ok(Some(profile))
            }
        }
    }

    async fn save(&self, profile: &StudentProfile) -> Result<(), AppError> {
        let doc = serde_json::to_value(profile).context("serialize profile document")?;
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, doc)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET doc = EXCLUDED.doc, updated_at = now()
            "#,
        )
        .bind(&profile.user_id)
        .bind(doc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create(&self, profile: &StudentProfile) -> Result<(), AppError> {
        let doc = serde_json::to_value(profile).context("serialize profile document")?;
        let result = sqlx::query(
            "INSERT INTO profiles (user_id, doc) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(&profile.user_id)
        .bind(doc)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "A profile already exists for user {}",
                profile.user_id
            )));
        }
        info!("Created profile for user {}", profile.user_id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        PgChatStore { pool }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn find_session(&self, id: &str) -> Result<Option<ChatSession>, AppError> {
        let doc: Option<Value> =
            sqlx::query_scalar("SELECT doc FROM chat_sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match doc {
            None => Ok(None),
            Some(doc) => {
                let session = serde_json::from_value(doc)
                    .with_context(|| format!("corrupt chat session document {id}"))?;
                Ok(Some(session))
            }
        }
    }

    async fn sessions_for_user(&self, user_id: &str) -> Result<Vec<ChatSession>, AppError> {
        let docs: Vec<Value> = sqlx::query_scalar(
            "SELECT doc FROM chat_sessions WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = Vec::with_capacity(docs.len());
        for doc in docs {
            sessions.push(
                serde_json::from_value(doc)
                    .with_context(|| format!("corrupt chat session for user {user_id}"))?,
            );
        }
        Ok(sessions)
    }

    async fn save_session(&self, session: &ChatSession) -> Result<(), AppError> {
        let doc = serde_json::to_value(session).context("serialize chat session document")?;
        sqlx::query(
            r#"
            INSERT INTO chat_sessions (id, user_id, doc)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc, updated_at = now()
            "#,
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(doc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

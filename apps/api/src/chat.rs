//! Counselor chat. Each session maps one-to-one to a conversation held by
//! the chat collaborator; we persist the transcript and echo the
//! collaborator's continuation token on every follow-up message.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::config::WorkflowKeys;
use crate::errors::AppError;
use crate::models::chat::{ChatSession, Sender};
use crate::models::profile::StudentProfile;
use crate::state::AppState;
use crate::store::{require_profile, ChatStore};
use crate::workflow::{Inputs, WorkflowClient};

#[derive(Debug)]
pub struct ChatOutcome {
    pub session: ChatSession,
    pub answer: String,
}

/// Sends one message through the counselor chatflow and persists the
/// updated transcript. A missing `session_id` starts a new conversation
/// keyed by the collaborator's token.
pub async fn send_message(
    chat_store: &dyn ChatStore,
    workflow: &dyn WorkflowClient,
    keys: &WorkflowKeys,
    profile: &StudentProfile,
    session_id: Option<&str>,
    message: &str,
) -> Result<ChatOutcome, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation("Message must not be empty".to_string()));
    }

    let existing = match session_id {
        Some(id) => {
            let session = chat_store
                .find_session(id)
                .await?
                .filter(|s| s.user_id == profile.user_id)
                .ok_or_else(|| AppError::NotFound(format!("Chat session {id} not found")))?;
            Some(session)
        }
        None => None,
    };

    let mut inputs: Inputs = BTreeMap::new();
    if !profile.profile_summary.trim().is_empty() {
        inputs.insert("profile".to_string(), profile.profile_summary.clone());
    }

    let reply = workflow
        .chat(
            &keys.counselor,
            inputs,
            message,
            existing.as_ref().map(|s| s.conversation_id.as_str()),
            &profile.user_id,
        )
        .await?;

    let mut session = existing
        .unwrap_or_else(|| ChatSession::new(&profile.user_id, &reply.conversation_id));
    session.push(message, Sender::User);
    session.push(&reply.answer, Sender::Counselor);
    chat_store.save_session(&session).await?;

    info!(
        "Chat message handled for user {} (session {})",
        profile.user_id, session.id
    );
    Ok(ChatOutcome {
        session,
        answer: reply.answer,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl From<&ChatSession> for SessionSummary {
    fn from(session: &ChatSession) -> Self {
        SessionSummary {
            id: session.id.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
            message_count: session.messages.len(),
            last_message: session.messages.last().map(|m| m.text.clone()),
        }
    }
}

/// GET /api/chat/sessions/:userId
pub async fn handle_list_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    let sessions = state.chat_store.sessions_for_user(&user_id).await?;
    Ok(Json(sessions.iter().map(SessionSummary::from).collect()))
}

/// GET /api/chat/session/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ChatSession>, AppError> {
    let session = state
        .chat_store
        .find_session(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chat session {id} not found")))?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub user_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub session_id: String,
    pub answer: String,
}

/// POST /api/chat/message
pub async fn handle_chat_message(
    State(state): State<AppState>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, AppError> {
    let profile = require_profile(state.store.as_ref(), &request.user_id).await?;
    let outcome = send_message(
        state.chat_store.as_ref(),
        state.workflow.as_ref(),
        &state.config.workflow_keys,
        &profile,
        request.session_id.as_deref(),
        &request.message,
    )
    .await?;
    Ok(Json(ChatMessageResponse {
        session_id: outcome.session.id,
        answer: outcome.answer,
    }))
}

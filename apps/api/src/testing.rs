//! Test doubles shared across module tests: an in-memory document store and
//! a scripted workflow collaborator.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::errors::AppError;
use crate::models::chat::ChatSession;
use crate::models::profile::StudentProfile;
use crate::store::{ChatStore, ProfileStore};
use crate::workflow::{ChatReply, Inputs, Outputs, WorkflowClient, WorkflowError};

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, StudentProfile>>,
    saves: Mutex<u32>,
}

impl MemoryProfileStore {
    pub fn insert(&self, profile: StudentProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id.clone(), profile);
    }

    pub fn get(&self, user_id: &str) -> Option<StudentProfile> {
        self.profiles.lock().unwrap().get(user_id).cloned()
    }

    /// Number of `save` calls observed — lets tests assert that cache hits
    /// and failed generations never persist.
    pub fn save_count(&self) -> u32 {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn find(&self, user_id: &str) -> Result<Option<StudentProfile>, AppError> {
        Ok(self.get(user_id))
    }

    async fn save(&self, profile: &StudentProfile) -> Result<(), AppError> {
        *self.saves.lock().unwrap() += 1;
        self.insert(profile.clone());
        Ok(())
    }

    async fn create(&self, profile: &StudentProfile) -> Result<(), AppError> {
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.contains_key(&profile.user_id) {
            return Err(AppError::Conflict(format!(
                "A profile already exists for user {}",
                profile.user_id
            )));
        }
        profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryChatStore {
    sessions: Mutex<HashMap<String, ChatSession>>,
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn find_session(&self, id: &str) -> Result<Option<ChatSession>, AppError> {
        Ok(self.sessions.lock().unwrap().get(id).cloned())
    }

    async fn sessions_for_user(&self, user_id: &str) -> Result<Vec<ChatSession>, AppError> {
        let mut sessions: Vec<ChatSession> = self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn save_session(&self, session: &ChatSession) -> Result<(), AppError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }
}

/// One recorded workflow invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub key: String,
    pub inputs: Inputs,
    pub user: String,
}

/// Scripted collaborator: pops pre-queued responses in order and records
/// every call for assertions.
#[derive(Default)]
pub struct ScriptedWorkflow {
    responses: Mutex<VecDeque<Result<Outputs, WorkflowError>>>,
    chat_replies: Mutex<VecDeque<Result<ChatReply, WorkflowError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedWorkflow {
    /// Queues a successful run whose outputs are the given JSON object.
    pub fn push_outputs(&self, value: Value) {
        let map = match value {
            Value::Object(map) => map,
            _ => panic!("scripted outputs must be a JSON object"),
        };
        self.responses.lock().unwrap().push_back(Ok(Outputs(map)));
    }

    pub fn push_error(&self, error: WorkflowError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn push_chat_reply(&self, answer: &str, conversation_id: &str) {
        self.chat_replies.lock().unwrap().push_back(Ok(ChatReply {
            answer: answer.to_string(),
            conversation_id: conversation_id.to_string(),
        }));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl WorkflowClient for ScriptedWorkflow {
    async fn run_workflow(
        &self,
        key: &str,
        inputs: Inputs,
        user: &str,
    ) -> Result<Outputs, WorkflowError> {
        self.calls.lock().unwrap().push(RecordedCall {
            key: key.to_string(),
            inputs,
            user: user.to_string(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted workflow call with key '{key}'"))
    }

    async fn chat(
        &self,
        key: &str,
        inputs: Inputs,
        query: &str,
        conversation_id: Option<&str>,
        user: &str,
    ) -> Result<ChatReply, WorkflowError> {
        let mut inputs = inputs;
        inputs.insert("query".to_string(), query.to_string());
        if let Some(id) = conversation_id {
            inputs.insert("conversation_id".to_string(), id.to_string());
        }
        self.calls.lock().unwrap().push(RecordedCall {
            key: key.to_string(),
            inputs,
            user: user.to_string(),
        });
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted chat call with key '{key}'"))
    }
}

/// Workflow keys with recognizable per-artifact values for assertions.
pub fn test_keys() -> crate::config::WorkflowKeys {
    crate::config::WorkflowKeys {
        profile_summary: "key-summary".to_string(),
        strengths: "key-strengths".to_string(),
        improvements: "key-improvements".to_string(),
        college_list: "key-college-list".to_string(),
        college_why: "key-college-why".to_string(),
        strategies: "key-strategies".to_string(),
        schedule: "key-schedule".to_string(),
        essay_brainstorm: "key-essay-brainstorm".to_string(),
        activities_improver: "key-activities-improver".to_string(),
        counselor: "key-counselor".to_string(),
    }
}

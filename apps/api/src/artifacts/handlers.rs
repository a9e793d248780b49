//! Axum route handlers for the AI-artifact endpoints. Handlers stay thin:
//! load the profile, delegate to the artifact module, return JSON.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::artifacts::activities::improve_description;
use crate::artifacts::colleges::{get_college_list, get_why_reasons};
use crate::artifacts::essays::{
    add_supplemental, brainstorm, remove_supplemental, BrainstormRequest, NewSupplemental,
    COMMON_APP_PROMPTS, UC_PROMPTS,
};
use crate::artifacts::insights::{get_insights, InsightKind};
use crate::artifacts::schedule::{add_task, edit_task, get_schedule, remove_task, TaskEdit};
use crate::artifacts::strategies::get_strategies;
use crate::errors::AppError;
use crate::models::profile::{
    ApplicationStrategies, CollegeList, Schedule, SupplementalEssay, Task, WhyReason,
};
use crate::state::AppState;
use crate::store::require_profile;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub user_id: String,
    #[serde(default)]
    pub force: bool,
}

/// POST /api/colleges/generate
pub async fn handle_generate_colleges(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<CollegeList>, AppError> {
    let mut profile = require_profile(state.store.as_ref(), &request.user_id).await?;
    let list = get_college_list(state.artifacts(), &mut profile, request.force).await?;
    Ok(Json(list))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhyRequest {
    pub user_id: String,
    pub school: String,
}

#[derive(Debug, Serialize)]
pub struct WhyResponse {
    pub school: String,
    pub reasons: Vec<WhyReason>,
}

/// POST /api/colleges/why
pub async fn handle_college_why(
    State(state): State<AppState>,
    Json(request): Json<WhyRequest>,
) -> Result<Json<WhyResponse>, AppError> {
    let mut profile = require_profile(state.store.as_ref(), &request.user_id).await?;
    let reasons = get_why_reasons(state.artifacts(), &mut profile, &request.school).await?;
    Ok(Json(WhyResponse {
        school: request.school,
        reasons,
    }))
}

/// POST /api/strategies/generate
pub async fn handle_generate_strategies(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ApplicationStrategies>, AppError> {
    let mut profile = require_profile(state.store.as_ref(), &request.user_id).await?;
    let strategies = get_strategies(state.artifacts(), &mut profile, request.force).await?;
    Ok(Json(strategies))
}

async fn insights_response(
    state: &AppState,
    user_id: &str,
    kind: InsightKind,
    force: bool,
) -> Result<Json<Vec<Value>>, AppError> {
    let mut profile = require_profile(state.store.as_ref(), user_id).await?;
    let insights = get_insights(state.artifacts(), &mut profile, kind, force).await?;
    Ok(Json(insights))
}

/// GET /api/profile/:userId/strengths — cached, generated on first read.
pub async fn handle_get_strengths(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    insights_response(&state, &user_id, InsightKind::Strengths, false).await
}

/// POST /api/profile/:userId/analyze/strengths — forced regeneration.
pub async fn handle_analyze_strengths(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    insights_response(&state, &user_id, InsightKind::Strengths, true).await
}

/// GET /api/profile/:userId/improvements
pub async fn handle_get_improvements(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    insights_response(&state, &user_id, InsightKind::Improvements, false).await
}

/// POST /api/profile/:userId/analyze/improvements
pub async fn handle_analyze_improvements(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    insights_response(&state, &user_id, InsightKind::Improvements, true).await
}

/// GET /api/profile/:userId/schedule
pub async fn handle_get_schedule(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Schedule>, AppError> {
    let mut profile = require_profile(state.store.as_ref(), &user_id).await?;
    let schedule = get_schedule(state.artifacts(), &mut profile).await?;
    Ok(Json(schedule))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskRequest {
    pub text: String,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// POST /api/profile/:userId/schedule/tasks
pub async fn handle_add_task(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<NewTaskRequest>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("Task text is required".to_string()));
    }
    let mut profile = require_profile(state.store.as_ref(), &user_id).await?;
    let task = add_task(&mut profile.schedule, request.text, request.due_date);
    profile.touch();
    state.store.save(&profile).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/profile/:userId/schedule/tasks/:taskId
pub async fn handle_edit_task(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(String, String)>,
    Json(edit): Json<TaskEdit>,
) -> Result<Json<Task>, AppError> {
    let mut profile = require_profile(state.store.as_ref(), &user_id).await?;
    let task = edit_task(&mut profile.schedule, &task_id, &edit)?;
    profile.touch();
    state.store.save(&profile).await?;
    Ok(Json(task))
}

/// DELETE /api/profile/:userId/schedule/tasks/:taskId
pub async fn handle_remove_task(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let mut profile = require_profile(state.store.as_ref(), &user_id).await?;
    remove_task(&mut profile.schedule, &task_id)?;
    profile.touch();
    state.store.save(&profile).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct PromptCatalogEntry {
    pub id: &'static str,
    pub text: &'static str,
}

/// GET /api/essays/common-app-prompts
pub async fn handle_common_app_prompts() -> Json<Vec<PromptCatalogEntry>> {
    Json(
        COMMON_APP_PROMPTS
            .iter()
            .map(|p| PromptCatalogEntry {
                id: p.id,
                text: p.text,
            })
            .collect(),
    )
}

/// GET /api/essays/uc-prompts
pub async fn handle_uc_prompts() -> Json<Vec<PromptCatalogEntry>> {
    Json(
        UC_PROMPTS
            .iter()
            .map(|p| PromptCatalogEntry {
                id: p.id,
                text: p.text,
            })
            .collect(),
    )
}

/// GET /api/profile/:userId/essays/common-app
pub async fn handle_common_app_ideas(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BTreeMap<String, Vec<String>>>, AppError> {
    let profile = require_profile(state.store.as_ref(), &user_id).await?;
    Ok(Json(profile.essays_and_activities.common_app))
}

/// GET /api/profile/:userId/essays/uc-questions
pub async fn handle_uc_ideas(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BTreeMap<String, Vec<String>>>, AppError> {
    let profile = require_profile(state.store.as_ref(), &user_id).await?;
    Ok(Json(profile.essays_and_activities.uc_questions))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementalView {
    pub id: String,
    pub school: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_limit: Option<u32>,
    pub ideas: Vec<String>,
}

impl SupplementalView {
    fn from_entry(id: &str, entry: &SupplementalEssay) -> Self {
        SupplementalView {
            id: id.to_string(),
            school: entry.school.clone(),
            prompt: entry.prompt.clone(),
            word_limit: entry.word_limit,
            ideas: entry.ideas.clone(),
        }
    }
}

/// GET /api/profile/:userId/supplementals
pub async fn handle_list_supplementals(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<SupplementalView>>, AppError> {
    let profile = require_profile(state.store.as_ref(), &user_id).await?;
    let views = profile
        .essays_and_activities
        .supplementals
        .iter()
        .map(|(id, entry)| SupplementalView::from_entry(id, entry))
        .collect();
    Ok(Json(views))
}

/// POST /api/profile/:userId/supplementals
pub async fn handle_add_supplemental(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<NewSupplemental>,
) -> Result<(StatusCode, Json<SupplementalView>), AppError> {
    if request.school.trim().is_empty() || request.prompt.trim().is_empty() {
        return Err(AppError::Validation(
            "School and prompt are required".to_string(),
        ));
    }
    let mut profile = require_profile(state.store.as_ref(), &user_id).await?;
    let (id, entry) = add_supplemental(&mut profile.essays_and_activities, request);
    profile.touch();
    state.store.save(&profile).await?;
    Ok((
        StatusCode::CREATED,
        Json(SupplementalView::from_entry(&id, &entry)),
    ))
}

/// DELETE /api/profile/:userId/supplementals/:promptId
pub async fn handle_remove_supplemental(
    State(state): State<AppState>,
    Path((user_id, prompt_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let mut profile = require_profile(state.store.as_ref(), &user_id).await?;
    remove_supplemental(&mut profile.essays_and_activities, &prompt_id)?;
    profile.touch();
    state.store.save(&profile).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/profile/:userId/essays/brainstorm
pub async fn handle_brainstorm(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<BrainstormRequest>,
) -> Result<Json<Vec<String>>, AppError> {
    let mut profile = require_profile(state.store.as_ref(), &user_id).await?;
    let ideas = brainstorm(state.artifacts(), &mut profile, &request).await?;
    Ok(Json(ideas))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveActivityRequest {
    pub activity_description: String,
}

#[derive(Debug, Serialize)]
pub struct ImproveActivityResponse {
    pub improved_description: String,
}

/// POST /api/profile/:userId/activities/improve
pub async fn handle_improve_activity(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<ImproveActivityRequest>,
) -> Result<Json<ImproveActivityResponse>, AppError> {
    let profile = require_profile(state.store.as_ref(), &user_id).await?;
    let improved =
        improve_description(state.artifacts(), &profile, &request.activity_description).await?;
    Ok(Json(ImproveActivityResponse {
        improved_description: improved,
    }))
}

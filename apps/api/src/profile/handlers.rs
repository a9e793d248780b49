//! Axum route handlers for signup and profile CRUD.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::errors::AppError;
use crate::models::profile::{Category, StudentProfile};
use crate::profile::merge::{merge_category, AnswerMap};
use crate::profile::tracker::{apply_tracker_update, derive_tracker, TrackerUpdate};
use crate::state::AppState;
use crate::store::require_profile;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub message: String,
    pub user_id: String,
}

/// POST /api/users/create
///
/// Creates the empty profile at signup. Credential handling lives with the
/// identity provider, not here.
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), AppError> {
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(AppError::Validation(
            "Name and email are required".to_string(),
        ));
    }

    let profile = StudentProfile::new(request.email.trim(), request.name.trim());
    state.store.create(&profile).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "User account and profile created successfully".to_string(),
            user_id: profile.user_id,
        }),
    ))
}

/// GET /api/profile/:userId
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<StudentProfile>, AppError> {
    let profile = require_profile(state.store.as_ref(), &user_id).await?;
    Ok(Json(profile))
}

/// Partial profile update: whole categories of questionnaire answers plus
/// optional user-managed tracker fields, applied in one read-modify-write.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub questionnaire: Option<BTreeMap<String, AnswerMap>>,
    #[serde(default)]
    pub tracker: Option<TrackerUpdate>,
}

/// Applies the update to an in-memory profile. The tracker is re-derived
/// after every merge so it cannot drift from the raw answers; explicit
/// tracker values from the same request win over preserved ones.
pub fn apply_profile_update(
    profile: &mut StudentProfile,
    request: &ProfileUpdateRequest,
) -> Result<(), AppError> {
    if request.questionnaire.is_none() && request.tracker.is_none() {
        return Err(AppError::Validation(
            "Missing 'questionnaire' or 'tracker' data in request body".to_string(),
        ));
    }

    if let Some(categories) = &request.questionnaire {
        for (key, answers) in categories {
            let category = Category::parse(key).ok_or_else(|| {
                AppError::Validation(format!("Unknown questionnaire category '{key}'"))
            })?;
            merge_category(&mut profile.questionnaire, category, answers);
        }
    }

    profile.tracker = derive_tracker(&profile.questionnaire, &profile.tracker);
    if let Some(update) = &request.tracker {
        apply_tracker_update(&mut profile.tracker, update);
    }
    profile.touch();
    Ok(())
}

/// PUT /api/profile/:userId
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<Json<StudentProfile>, AppError> {
    let mut profile = require_profile(state.store.as_ref(), &user_id).await?;
    apply_profile_update(&mut profile, &request)?;
    state.store.save(&profile).await?;
    info!("Profile updated for user {user_id}");
    Ok(Json(profile))
}

/// GET /api/profile/:userId/answers
///
/// Questionnaire answers regrouped per category for form rendering.
pub async fn handle_get_answers(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BTreeMap<Category, AnswerMap>>, AppError> {
    let profile = require_profile(state.store.as_ref(), &user_id).await?;

    let mut answers: BTreeMap<Category, AnswerMap> = Category::ALL
        .iter()
        .map(|c| (*c, AnswerMap::new()))
        .collect();
    for record in &profile.questionnaire {
        if let Some(map) = answers.get_mut(&record.category) {
            map.insert(record.id.clone(), record.answer.clone());
        }
    }
    Ok(Json(answers))
}

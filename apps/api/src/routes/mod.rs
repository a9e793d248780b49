pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::artifacts::handlers as artifacts;
use crate::chat;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts and profile CRUD
        .route("/api/users/create", post(profile::handle_create_user))
        .route("/api/profile/:user_id", get(profile::handle_get_profile))
        .route("/api/profile/:user_id", put(profile::handle_update_profile))
        .route(
            "/api/profile/:user_id/answers",
            get(profile::handle_get_answers),
        )
        // College list and per-school reasons
        .route(
            "/api/colleges/generate",
            post(artifacts::handle_generate_colleges),
        )
        .route("/api/colleges/why", post(artifacts::handle_college_why))
        .route(
            "/api/strategies/generate",
            post(artifacts::handle_generate_strategies),
        )
        // Profile insights
        .route(
            "/api/profile/:user_id/strengths",
            get(artifacts::handle_get_strengths),
        )
        .route(
            "/api/profile/:user_id/improvements",
            get(artifacts::handle_get_improvements),
        )
        .route(
            "/api/profile/:user_id/analyze/strengths",
            post(artifacts::handle_analyze_strengths),
        )
        .route(
            "/api/profile/:user_id/analyze/improvements",
            post(artifacts::handle_analyze_improvements),
        )
        // Schedule and tasks
        .route(
            "/api/profile/:user_id/schedule",
            get(artifacts::handle_get_schedule),
        )
        .route(
            "/api/profile/:user_id/schedule/tasks",
            post(artifacts::handle_add_task),
        )
        .route(
            "/api/profile/:user_id/schedule/tasks/:task_id",
            put(artifacts::handle_edit_task),
        )
        .route(
            "/api/profile/:user_id/schedule/tasks/:task_id",
            delete(artifacts::handle_remove_task),
        )
        // Essays
        .route(
            "/api/essays/common-app-prompts",
            get(artifacts::handle_common_app_prompts),
        )
        .route("/api/essays/uc-prompts", get(artifacts::handle_uc_prompts))
        .route(
            "/api/profile/:user_id/essays/common-app",
            get(artifacts::handle_common_app_ideas),
        )
        .route(
            "/api/profile/:user_id/essays/uc-questions",
            get(artifacts::handle_uc_ideas),
        )
        .route(
            "/api/profile/:user_id/supplementals",
            get(artifacts::handle_list_supplementals).post(artifacts::handle_add_supplemental),
        )
        .route(
            "/api/profile/:user_id/supplementals/:prompt_id",
            delete(artifacts::handle_remove_supplemental),
        )
        .route(
            "/api/profile/:user_id/essays/brainstorm",
            post(artifacts::handle_brainstorm),
        )
        // Activities
        .route(
            "/api/profile/:user_id/activities/improve",
            post(artifacts::handle_improve_activity),
        )
        // Counselor chat
        .route(
            "/api/chat/sessions/:user_id",
            get(chat::handle_list_sessions),
        )
        .route("/api/chat/session/:id", get(chat::handle_get_session))
        .route("/api/chat/message", post(chat::handle_chat_message))
        .with_state(state)
}

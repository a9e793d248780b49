//! Application schedule: a generated checklist refreshed on a 14-day window,
//! plus direct task edits between regenerations.
//!
//! Regeneration snapshots every replaced task's text into the profile's
//! audit trail (completed or not) and always clears the catch-up list — the
//! new checklist supersedes both.

use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use crate::artifacts::colleges::format_college_list;
use crate::artifacts::{
    get_or_generate, regeneration_window, ArtifactContext, Cached, Freshness,
};
use crate::errors::AppError;
use crate::models::profile::{Schedule, StudentProfile, Task, TaskStatus};
use crate::workflow::Inputs;

#[derive(Debug, Deserialize)]
struct GeneratedSchedule {
    checklist: Vec<GeneratedTask>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedTask {
    #[serde(default)]
    id: Option<String>,
    text: String,
    #[serde(default)]
    due_date: Option<String>,
}

impl GeneratedTask {
    fn into_task(self) -> Task {
        Task {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            text: self.text,
            status: TaskStatus::Incomplete,
            due_date: self.due_date,
        }
    }
}

/// Task history string sent to the schedule workflow: the audit trail plus
/// any currently completed tasks.
fn format_task_history(profile: &StudentProfile) -> String {
    let mut done: Vec<String> = profile.completed_tasks.clone();
    done.extend(
        profile
            .schedule
            .checklist
            .iter()
            .chain(profile.schedule.catch_up.iter())
            .filter(|t| t.status == TaskStatus::Complete)
            .map(|t| t.text.clone()),
    );
    if done.is_empty() {
        return "None".to_string();
    }
    done.iter()
        .map(|t| format!("- {t}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cache-or-generate for the schedule (14-day TTL). Generation requires the
/// summary and college list to exist already; a fresh cached schedule is
/// served without checking either.
pub async fn get_schedule(
    ctx: ArtifactContext<'_>,
    profile: &mut StudentProfile,
) -> Result<Schedule, AppError> {
    get_or_generate(
        ctx.store,
        profile,
        Freshness::Ttl(regeneration_window()),
        false,
        |p| {
            p.schedule
                .last_generated
                .map(|at| Cached::stamped(p.schedule.clone(), Some(at)))
        },
        |snapshot| async move {
            if snapshot.profile_summary.trim().is_empty() || snapshot.college_list.is_empty() {
                return Err(AppError::Precondition(
                    "A profile summary and college list must be generated before a schedule"
                        .to_string(),
                ));
            }

            info!("Generating schedule for user {}", snapshot.user_id);
            let mut inputs: Inputs = BTreeMap::new();
            inputs.insert(
                "current_date".to_string(),
                Utc::now().format("%B %-d").to_string(),
            );
            inputs.insert("profile".to_string(), snapshot.profile_summary.clone());
            inputs.insert(
                "college_list".to_string(),
                format_college_list(&snapshot.college_list),
            );
            inputs.insert("completed_tasks".to_string(), format_task_history(&snapshot));

            let outputs = ctx
                .workflow
                .run_workflow(&ctx.keys.schedule, inputs, &snapshot.user_id)
                .await?;
            let generated: GeneratedSchedule = outputs.require("result")?;

            Ok(Schedule {
                last_generated: Some(Utc::now()),
                checklist: generated
                    .checklist
                    .into_iter()
                    .map(GeneratedTask::into_task)
                    .collect(),
                catch_up: Vec::new(),
            })
        },
        |p, schedule| {
            let removed: Vec<String> = p
                .schedule
                .checklist
                .iter()
                .chain(p.schedule.catch_up.iter())
                .map(|t| t.text.clone())
                .collect();
            p.completed_tasks.extend(removed);
            p.schedule = schedule.clone();
        },
    )
    .await
}

/// Fields a task edit may change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskEdit {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

pub fn add_task(schedule: &mut Schedule, text: String, due_date: Option<String>) -> Task {
    let task = Task {
        id: Uuid::new_v4().to_string(),
        text,
        status: TaskStatus::Incomplete,
        due_date,
    };
    schedule.checklist.push(task.clone());
    task
}

fn find_task<'a>(schedule: &'a mut Schedule, task_id: &str) -> Option<&'a mut Task> {
    schedule
        .checklist
        .iter_mut()
        .chain(schedule.catch_up.iter_mut())
        .find(|t| t.id == task_id)
}

pub fn edit_task(
    schedule: &mut Schedule,
    task_id: &str,
    edit: &TaskEdit,
) -> Result<Task, AppError> {
    let task = find_task(schedule, task_id)
        .ok_or_else(|| AppError::NotFound(format!("Task {task_id} not found")))?;
    if let Some(text) = &edit.text {
        task.text = text.clone();
    }
    if let Some(status) = edit.status {
        task.status = status;
    }
    Ok(task.clone())
}

pub fn remove_task(schedule: &mut Schedule, task_id: &str) -> Result<Task, AppError> {
    if let Some(pos) = schedule.checklist.iter().position(|t| t.id == task_id) {
        return Ok(schedule.checklist.remove(pos));
    }
    if let Some(pos) = schedule.catch_up.iter().position(|t| t.id == task_id) {
        return Ok(schedule.catch_up.remove(pos));
    }
    Err(AppError::NotFound(format!("Task {task_id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::colleges::partition_colleges;
    use crate::testing::{test_keys, MemoryProfileStore, ScriptedWorkflow};
    use chrono::Duration;
    use serde_json::json;

    fn task(id: &str, text: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            text: text.to_string(),
            status,
            due_date: None,
        }
    }

    fn ready_profile(schedule_age_days: Option<i64>) -> StudentProfile {
        let mut p = StudentProfile::new("s@example.com", "Sophia");
        p.profile_summary = "An ambitious student.".to_string();
        p.college_list = partition_colleges(vec![
            serde_json::from_value(json!({"school": "MIT", "category": "Reach"})).unwrap(),
            serde_json::from_value(json!({"school": "Rice University", "category": "Target"}))
                .unwrap(),
        ]);
        if let Some(days) = schedule_age_days {
            p.schedule = Schedule {
                last_generated: Some(Utc::now() - Duration::days(days)),
                checklist: vec![
                    task("t1", "Draft personal statement", TaskStatus::Complete),
                    task("t2", "Request teacher recommendation", TaskStatus::Incomplete),
                ],
                catch_up: vec![task("t3", "Register for the SAT", TaskStatus::Incomplete)],
            };
        }
        p
    }

    #[tokio::test]
    async fn test_fresh_schedule_served_from_cache() {
        let store = MemoryProfileStore::default();
        let workflow = ScriptedWorkflow::default();
        let keys = test_keys();
        let ctx = ArtifactContext {
            store: &store,
            workflow: &workflow,
            keys: &keys,
        };

        let mut p = ready_profile(Some(1));
        store.insert(p.clone());

        let schedule = get_schedule(ctx, &mut p).await.unwrap();
        assert_eq!(schedule.checklist.len(), 2);
        assert_eq!(workflow.call_count(), 0);
    }

    #[tokio::test]
    async fn test_regeneration_audits_all_tasks_and_clears_catch_up() {
        let store = MemoryProfileStore::default();
        let workflow = ScriptedWorkflow::default();
        workflow.push_outputs(json!({
            "result": {
                "checklist": [
                    {"text": "Finalize college list", "dueDate": "2026-09-01"},
                    {"text": "Start supplemental essays"}
                ]
            }
        }));
        let keys = test_keys();
        let ctx = ArtifactContext {
            store: &store,
            workflow: &workflow,
            keys: &keys,
        };

        let mut p = ready_profile(Some(20));
        store.insert(p.clone());

        let schedule = get_schedule(ctx, &mut p).await.unwrap();
        assert_eq!(workflow.call_count(), 1);
        assert_eq!(schedule.checklist.len(), 2);
        assert!(schedule.catch_up.is_empty());
        assert_eq!(schedule.checklist[0].status, TaskStatus::Incomplete);
        assert_eq!(schedule.checklist[0].due_date.as_deref(), Some("2026-09-01"));

        // Every replaced task lands in the audit trail, not just the
        // completed one.
        let saved = store.get("s@example.com").unwrap();
        assert_eq!(
            saved.completed_tasks,
            vec![
                "Draft personal statement",
                "Request teacher recommendation",
                "Register for the SAT"
            ]
        );
        assert!(saved.schedule.catch_up.is_empty());
    }

    #[tokio::test]
    async fn test_history_input_includes_audit_trail_and_completed_tasks() {
        let store = MemoryProfileStore::default();
        let workflow = ScriptedWorkflow::default();
        workflow.push_outputs(json!({"result": {"checklist": []}}));
        let keys = test_keys();
        let ctx = ArtifactContext {
            store: &store,
            workflow: &workflow,
            keys: &keys,
        };

        let mut p = ready_profile(Some(20));
        p.completed_tasks = vec!["Attend college fair".to_string()];
        store.insert(p.clone());

        get_schedule(ctx, &mut p).await.unwrap();
        let history = workflow.calls()[0].inputs["completed_tasks"].clone();
        assert!(history.contains("- Attend college fair"));
        assert!(history.contains("- Draft personal statement"));
        // Incomplete tasks are not reported as done.
        assert!(!history.contains("Request teacher recommendation"));
    }

    #[tokio::test]
    async fn test_generation_requires_summary_and_college_list() {
        let store = MemoryProfileStore::default();
        let workflow = ScriptedWorkflow::default();
        let keys = test_keys();
        let ctx = ArtifactContext {
            store: &store,
            workflow: &workflow,
            keys: &keys,
        };

        let mut p = StudentProfile::new("s@example.com", "Sophia");
        store.insert(p.clone());

        let err = get_schedule(ctx, &mut p).await.unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
        assert_eq!(workflow.call_count(), 0);
    }

    #[test]
    fn test_task_history_formats_none_when_empty() {
        let p = ready_profile(None);
        assert_eq!(format_task_history(&p), "None");
    }

    #[test]
    fn test_add_edit_remove_task() {
        let mut schedule = Schedule::default();
        let added = add_task(&mut schedule, "Visit campus".to_string(), None);
        assert_eq!(schedule.checklist.len(), 1);

        let edited = edit_task(
            &mut schedule,
            &added.id,
            &TaskEdit {
                text: None,
                status: Some(TaskStatus::Complete),
            },
        )
        .unwrap();
        assert_eq!(edited.status, TaskStatus::Complete);

        let removed = remove_task(&mut schedule, &added.id).unwrap();
        assert_eq!(removed.id, added.id);
        assert!(schedule.checklist.is_empty());
    }

    #[test]
    fn test_edit_missing_task_is_not_found() {
        let mut schedule = Schedule::default();
        let err = edit_task(&mut schedule, "ghost", &TaskEdit::default()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = remove_task(&mut schedule, "ghost").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_edit_finds_tasks_in_catch_up_partition() {
        let mut schedule = Schedule {
            last_generated: None,
            checklist: vec![],
            catch_up: vec![task("c1", "Retake the SAT", TaskStatus::Incomplete)],
        };
        let edited = edit_task(
            &mut schedule,
            "c1",
            &TaskEdit {
                text: Some("Retake the SAT in October".to_string()),
                status: None,
            },
        )
        .unwrap();
        assert_eq!(edited.text, "Retake the SAT in October");
    }
}

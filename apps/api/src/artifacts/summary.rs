//! Profile summary — the prerequisite artifact every other generation feeds
//! on. The questionnaire and discovered traits are flattened into a plain
//! text block, summarized once by the collaborator, and cached until the
//! profile changes enough for a caller to force a refresh.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use crate::artifacts::{get_or_generate, ArtifactContext, Cached, Freshness};
use crate::errors::AppError;
use crate::models::profile::{AnswerValue, StudentProfile};
use crate::workflow::Inputs;

/// Renders the profile as the plain-text block sent to the summarizer.
pub fn format_profile_string(profile: &StudentProfile) -> String {
    let mut out = String::from("--- Student Profile ---\n");

    if !profile.questionnaire.is_empty() {
        out.push_str("Questionnaire Answers:\n");
        for record in &profile.questionnaire {
            match &record.answer {
                AnswerValue::Activities(activities) => {
                    for activity in activities {
                        out.push_str(&format!(
                            "- Activity: {} - Description: {}\n",
                            activity.name, activity.description
                        ));
                    }
                }
                answer => {
                    out.push_str(&format!(
                        "- {}: {}\n",
                        record.question,
                        format_answer(answer)
                    ));
                }
            }
        }
    }

    if !profile.discovered.interests.is_empty() {
        out.push_str("Discovered Interests: ");
        out.push_str(&profile.discovered.interests.join(", "));
        out.push('\n');
    }
    if !profile.discovered.strengths.is_empty() {
        out.push_str("Discovered Strengths: ");
        let rendered: Vec<String> = profile
            .discovered
            .strengths
            .iter()
            .map(render_insight)
            .collect();
        out.push_str(&rendered.join(", "));
        out.push('\n');
    }

    out.trim_end().to_string()
}

fn format_answer(answer: &AnswerValue) -> String {
    match answer {
        AnswerValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
        AnswerValue::Number(n) => format!("{n}"),
        AnswerValue::Text(s) => s.clone(),
        AnswerValue::Activities(_) => String::new(),
    }
}

/// Strength/improvement entries keep the collaborator's shape; render the
/// title when there is one, the raw string otherwise.
fn render_insight(value: &Value) -> String {
    if let Some(s) = value.as_str() {
        return s.to_string();
    }
    if let Some(title) = value.get("title").and_then(Value::as_str) {
        return title.to_string();
    }
    value.to_string()
}

/// Returns the cached summary, generating and persisting it first when the
/// profile does not have one yet.
pub async fn ensure_summary(
    ctx: ArtifactContext<'_>,
    profile: &mut StudentProfile,
) -> Result<String, AppError> {
    get_or_generate(
        ctx.store,
        profile,
        Freshness::Presence,
        false,
        |p| {
            let summary = p.profile_summary.trim();
            (!summary.is_empty()).then(|| Cached::unstamped(summary.to_string()))
        },
        |snapshot| async move {
            info!("Generating profile summary for user {}", snapshot.user_id);
            let mut inputs: Inputs = BTreeMap::new();
            inputs.insert("profile".to_string(), format_profile_string(&snapshot));
            let outputs = ctx
                .workflow
                .run_workflow(&ctx.keys.profile_summary, inputs, &snapshot.user_id)
                .await?;
            Ok(outputs.require::<String>("summary")?)
        },
        |p, summary| p.profile_summary = summary.clone(),
    )
    .await
}

/// Regenerates the summary unconditionally (used when the questionnaire
/// changed and the caller wants downstream artifacts to see fresh context).
pub async fn refresh_summary(
    ctx: ArtifactContext<'_>,
    profile: &mut StudentProfile,
) -> Result<String, AppError> {
    profile.profile_summary.clear();
    ensure_summary(ctx, profile).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{Activity, AnswerRecord, Category};
    use crate::testing::{test_keys, MemoryProfileStore, ScriptedWorkflow};
    use serde_json::json;

    fn record(category: Category, id: &str, question: &str, answer: AnswerValue) -> AnswerRecord {
        AnswerRecord {
            id: id.to_string(),
            category,
            question: question.to_string(),
            answer,
        }
    }

    fn sample_profile() -> StudentProfile {
        let mut p = StudentProfile::new("s@example.com", "Sophia");
        p.questionnaire = vec![
            record(
                Category::Priorities,
                "academics",
                "Academics Priority",
                AnswerValue::Number(9.0),
            ),
            record(
                Category::Interests,
                "career",
                "Do you have a career or major in mind?",
                AnswerValue::Text("Biomedical engineering".to_string()),
            ),
            record(
                Category::Activities,
                "activities",
                "Extracurricular Activities",
                AnswerValue::Activities(vec![Activity {
                    id: "a1".to_string(),
                    name: "Robotics Club".to_string(),
                    description: "Team lead".to_string(),
                }]),
            ),
        ];
        p.discovered.interests = vec!["bioengineering".to_string()];
        p
    }

    #[test]
    fn test_format_renders_labels_answers_and_activities() {
        let text = format_profile_string(&sample_profile());
        assert!(text.starts_with("--- Student Profile ---"));
        assert!(text.contains("- Academics Priority: 9"));
        assert!(text.contains("- Do you have a career or major in mind?: Biomedical engineering"));
        assert!(text.contains("- Activity: Robotics Club - Description: Team lead"));
        assert!(text.contains("Discovered Interests: bioengineering"));
    }

    #[test]
    fn test_format_renders_structured_strengths_by_title() {
        let mut p = sample_profile();
        p.discovered.strengths = vec![
            json!({"title": "Leadership", "explanation": "…"}),
            json!("Persistence"),
        ];
        let text = format_profile_string(&p);
        assert!(text.contains("Discovered Strengths: Leadership, Persistence"));
    }

    #[tokio::test]
    async fn test_ensure_summary_generates_once_then_serves_cache() {
        let store = MemoryProfileStore::default();
        let workflow = ScriptedWorkflow::default();
        workflow.push_outputs(json!({"summary": "A driven robotics student."}));
        let keys = test_keys();
        let ctx = ArtifactContext {
            store: &store,
            workflow: &workflow,
            keys: &keys,
        };

        let mut p = sample_profile();
        store.insert(p.clone());

        let first = ensure_summary(ctx, &mut p).await.unwrap();
        assert_eq!(first, "A driven robotics student.");
        assert_eq!(workflow.call_count(), 1);
        assert_eq!(workflow.calls()[0].key, "key-summary");
        assert_eq!(
            store.get("s@example.com").unwrap().profile_summary,
            "A driven robotics student."
        );

        // Second call must not touch the collaborator.
        let second = ensure_summary(ctx, &mut p).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(workflow.call_count(), 1);
    }

    #[tokio::test]
    async fn test_ensure_summary_rejects_non_string_output() {
        let store = MemoryProfileStore::default();
        let workflow = ScriptedWorkflow::default();
        workflow.push_outputs(json!({"summary": ["not", "a", "string"]}));
        let keys = test_keys();
        let ctx = ArtifactContext {
            store: &store,
            workflow: &workflow,
            keys: &keys,
        };

        let mut p = sample_profile();
        store.insert(p.clone());

        let err = ensure_summary(ctx, &mut p).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert!(store.get("s@example.com").unwrap().profile_summary.is_empty());
    }
}

//! One-shot activity description improver. Unlike the cached artifacts this
//! is a pure suggestion: the rewritten description goes back to the client,
//! which decides whether to merge it into the questionnaire.

use std::collections::BTreeMap;
use tracing::info;

use crate::artifacts::ArtifactContext;
use crate::errors::AppError;
use crate::models::profile::StudentProfile;
use crate::workflow::Inputs;

pub async fn improve_description(
    ctx: ArtifactContext<'_>,
    profile: &StudentProfile,
    description: &str,
) -> Result<String, AppError> {
    if description.trim().is_empty() {
        return Err(AppError::Validation(
            "activityDescription must not be empty".to_string(),
        ));
    }

    info!("Improving activity description for user {}", profile.user_id);
    let mut inputs: Inputs = BTreeMap::new();
    inputs.insert("activity".to_string(), description.to_string());
    if !profile.profile_summary.trim().is_empty() {
        inputs.insert("profile".to_string(), profile.profile_summary.clone());
    }
    let outputs = ctx
        .workflow
        .run_workflow(&ctx.keys.activities_improver, inputs, &profile.user_id)
        .await?;
    Ok(outputs.require::<String>("improved_description")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_keys, MemoryProfileStore, ScriptedWorkflow};
    use serde_json::json;

    #[tokio::test]
    async fn test_returns_improved_description_without_persisting() {
        let store = MemoryProfileStore::default();
        let workflow = ScriptedWorkflow::default();
        workflow.push_outputs(json!({
            "improved_description": "Led a 12-member robotics team to the state finals."
        }));
        let keys = test_keys();
        let ctx = ArtifactContext {
            store: &store,
            workflow: &workflow,
            keys: &keys,
        };

        let p = StudentProfile::new("s@example.com", "Sophia");
        store.insert(p.clone());

        let improved = improve_description(ctx, &p, "robotics team lead")
            .await
            .unwrap();
        assert!(improved.contains("state finals"));
        assert_eq!(workflow.calls()[0].key, "key-activities-improver");
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected_before_any_call() {
        let store = MemoryProfileStore::default();
        let workflow = ScriptedWorkflow::default();
        let keys = test_keys();
        let ctx = ArtifactContext {
            store: &store,
            workflow: &workflow,
            keys: &keys,
        };

        let p = StudentProfile::new("s@example.com", "Sophia");
        let err = improve_description(ctx, &p, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(workflow.call_count(), 0);
    }
}

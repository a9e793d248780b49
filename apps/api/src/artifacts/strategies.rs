//! Application strategies (early decision / early action recommendations).
//! Requires an existing college list — the strategies workflow reasons over
//! the student's actual schools, so there is nothing to generate before the
//! list exists.

use std::collections::BTreeMap;
use tracing::info;

use crate::artifacts::colleges::format_college_list;
use crate::artifacts::summary::ensure_summary;
use crate::artifacts::{get_or_generate, ArtifactContext, Cached, Freshness};
use crate::errors::AppError;
use crate::models::profile::{ApplicationStrategies, StudentProfile};
use crate::workflow::Inputs;

pub async fn get_strategies(
    ctx: ArtifactContext<'_>,
    profile: &mut StudentProfile,
    force: bool,
) -> Result<ApplicationStrategies, AppError> {
    if profile.college_list.is_empty() {
        return Err(AppError::Precondition(
            "A college list must be generated before application strategies".to_string(),
        ));
    }

    let summary = ensure_summary(ctx, profile).await?;
    let college_list = format_college_list(&profile.college_list);

    get_or_generate(
        ctx.store,
        profile,
        Freshness::Presence,
        force,
        |p| {
            (!p.application_strategies.is_empty())
                .then(|| Cached::unstamped(p.application_strategies.clone()))
        },
        |snapshot| async move {
            info!("Generating application strategies for user {}", snapshot.user_id);
            let mut inputs: Inputs = BTreeMap::new();
            inputs.insert("profile".to_string(), summary);
            inputs.insert("college_list".to_string(), college_list);
            let outputs = ctx
                .workflow
                .run_workflow(&ctx.keys.strategies, inputs, &snapshot.user_id)
                .await?;
            // The object with named sub-lists is the contract; a bare array
            // or string is a failed generation.
            Ok(outputs.require::<ApplicationStrategies>("strategy")?)
        },
        |p, strategies| p.application_strategies = strategies.clone(),
    )
    .await
}

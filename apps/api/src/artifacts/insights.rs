//! Discovered strengths and improvement areas. Both run the same generation
//! with different credentials and output keys, so they share one code path
//! keyed by `InsightKind`.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use crate::artifacts::summary::ensure_summary;
use crate::artifacts::{get_or_generate, ArtifactContext, Cached, Freshness};
use crate::errors::AppError;
use crate::models::profile::StudentProfile;
use crate::workflow::Inputs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Strengths,
    Improvements,
}

impl InsightKind {
    fn credential<'a>(&self, ctx: &ArtifactContext<'a>) -> &'a str {
        match self {
            InsightKind::Strengths => &ctx.keys.strengths,
            InsightKind::Improvements => &ctx.keys.improvements,
        }
    }

    /// Output key the workflow publishes its list under.
    fn output_key(&self) -> &'static str {
        match self {
            InsightKind::Strengths => "strengths",
            InsightKind::Improvements => "improvements",
        }
    }

    fn cached<'a>(&self, profile: &'a StudentProfile) -> &'a [Value] {
        match self {
            InsightKind::Strengths => &profile.discovered.strengths,
            InsightKind::Improvements => &profile.discovered.improvements,
        }
    }

    fn store_on(&self, profile: &mut StudentProfile, values: &[Value]) {
        match self {
            InsightKind::Strengths => profile.discovered.strengths = values.to_vec(),
            InsightKind::Improvements => profile.discovered.improvements = values.to_vec(),
        }
    }
}

/// Cached-or-generate for one insight kind. `force` regenerates even when a
/// cached list exists.
pub async fn get_insights(
    ctx: ArtifactContext<'_>,
    profile: &mut StudentProfile,
    kind: InsightKind,
    force: bool,
) -> Result<Vec<Value>, AppError> {
    let summary = ensure_summary(ctx, profile).await?;

    let key = kind.credential(&ctx).to_string();
    let output_key = kind.output_key();

    get_or_generate(
        ctx.store,
        profile,
        Freshness::Presence,
        force,
        |p| {
            let cached = kind.cached(p);
            (!cached.is_empty()).then(|| Cached::unstamped(cached.to_vec()))
        },
        |snapshot| async move {
            info!("Generating {output_key} for user {}", snapshot.user_id);
            let mut inputs: Inputs = BTreeMap::new();
            inputs.insert("profile".to_string(), summary);
            let outputs = ctx
                .workflow
                .run_workflow(&key, inputs, &snapshot.user_id)
                .await?;
            // The list must be an array; anything else is a failed generation.
            Ok(outputs.require::<Vec<Value>>(output_key)?)
        },
        |p, values| kind.store_on(p, values),
    )
    .await
}

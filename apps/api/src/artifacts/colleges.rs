//! College list generation and per-school "why this school" reasons.
//!
//! The list is replaced wholesale on regeneration (any cached per-school
//! reasons go with it); reasons are cached one school at a time inside the
//! matching list entry, looked up by exact school name across the
//! reach/target/likely partitions.

use chrono::Utc;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::artifacts::summary::{ensure_summary, refresh_summary};
use crate::artifacts::{
    get_or_generate, regeneration_window, ArtifactContext, Cached, Freshness,
};
use crate::errors::AppError;
use crate::models::profile::{CollegeList, School, StudentProfile, WhyReason};
use crate::workflow::Inputs;

/// Splits the collaborator's flat school list into reach/target/likely by
/// each entry's `category` field. Entries with an unknown category are
/// dropped rather than guessed.
pub fn partition_colleges(schools: Vec<School>) -> CollegeList {
    let mut list = CollegeList {
        last_generated: Some(Utc::now()),
        ..CollegeList::default()
    };
    for school in schools {
        match school.extra.get("category").and_then(|v| v.as_str()) {
            Some("Reach") => list.reach.push(school),
            Some("Target") => list.target.push(school),
            Some("Safety") | Some("Likely") => list.likely.push(school),
            _ => {}
        }
    }
    list
}

/// Cache-or-generate for the college list (14-day TTL). A forced
/// regeneration refreshes the summary first so the list reflects the latest
/// questionnaire state.
pub async fn get_college_list(
    ctx: ArtifactContext<'_>,
    profile: &mut StudentProfile,
    force: bool,
) -> Result<CollegeList, AppError> {
    let summary = if force {
        refresh_summary(ctx, profile).await?
    } else {
        ensure_summary(ctx, profile).await?
    };

    get_or_generate(
        ctx.store,
        profile,
        Freshness::Ttl(regeneration_window()),
        force,
        |p| {
            (!p.college_list.is_empty())
                .then(|| Cached::stamped(p.college_list.clone(), p.college_list.last_generated))
        },
        |snapshot| async move {
            info!("Generating college list for user {}", snapshot.user_id);
            let mut inputs: Inputs = BTreeMap::new();
            inputs.insert("profile".to_string(), summary);
            let outputs = ctx
                .workflow
                .run_workflow(&ctx.keys.college_list, inputs, &snapshot.user_id)
                .await?;
            let schools: Vec<School> = outputs.require("CollegeList")?;
            Ok(partition_colleges(schools))
        },
        |p, list| p.college_list = list.clone(),
    )
    .await
}

/// Formats the list the way downstream prompts expect it.
pub fn format_college_list(list: &CollegeList) -> String {
    let names = |schools: &[School]| {
        schools
            .iter()
            .map(|s| s.school.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Reach: {}\nTarget: {}\nLikely: {}",
        names(&list.reach),
        names(&list.target),
        names(&list.likely)
    )
}

#[derive(Debug, Deserialize)]
struct WhyPayload {
    #[serde(default)]
    reasons: Vec<WhyReason>,
}

/// Cache-or-generate for one school's "why" reasons. The school must already
/// be on the student's list.
pub async fn get_why_reasons(
    ctx: ArtifactContext<'_>,
    profile: &mut StudentProfile,
    school_name: &str,
) -> Result<Vec<WhyReason>, AppError> {
    if !profile
        .college_list
        .schools()
        .any(|s| s.school == school_name)
    {
        return Err(AppError::NotFound(format!(
            "{school_name} is not on this student's college list"
        )));
    }

    let summary = ensure_summary(ctx, profile).await?;
    let school_owned = school_name.to_string();

    get_or_generate(
        ctx.store,
        profile,
        Freshness::Presence,
        false,
        |p| {
            p.college_list
                .schools()
                .find(|s| s.school == school_name)
                .filter(|s| !s.reasons.is_empty())
                .map(|s| Cached::unstamped(s.reasons.clone()))
        },
        |snapshot| async move {
            info!(
                "Generating 'why' reasons for {} (user {})",
                school_owned, snapshot.user_id
            );
            let mut inputs: Inputs = BTreeMap::new();
            inputs.insert("profile".to_string(), summary);
            inputs.insert("school".to_string(), school_owned);
            let outputs = ctx
                .workflow
                .run_workflow(&ctx.keys.college_why, inputs, &snapshot.user_id)
                .await?;
            let payload: WhyPayload = outputs.require_embedded("reasoning")?;
            Ok(payload.reasons)
        },
        |p, reasons| {
            if let Some(school) = p
                .college_list
                .schools_mut()
                .find(|s| s.school == school_name)
            {
                school.reasons = reasons.clone();
            }
        },
    )
    .await
}

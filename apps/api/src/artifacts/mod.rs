//! AI-artifact cache orchestration.
//!
//! Every AI-backed feature (summary, strengths, improvements, college list,
//! strategies, schedule, per-school reasons, essay ideas) runs the same flow:
//! return the cached artifact when it is present and fresh, otherwise invoke
//! the workflow collaborator, validate the output shape, write the artifact
//! onto the profile and persist the whole document once. A failed generation
//! persists nothing — the next read simply retries.
//!
//! Freshness and failure handling are defined here once; the per-artifact
//! modules only supply cache lookup, generation and write-back.

pub mod activities;
pub mod colleges;
pub mod essays;
pub mod handlers;
pub mod insights;
pub mod schedule;
pub mod strategies;
pub mod summary;

use chrono::{DateTime, Duration, Utc};
use std::future::Future;

use crate::config::WorkflowKeys;
use crate::errors::AppError;
use crate::models::profile::StudentProfile;
use crate::store::ProfileStore;
use crate::workflow::WorkflowClient;

/// Everything a generation needs: the document store, the workflow
/// collaborator and the per-artifact credentials.
#[derive(Clone, Copy)]
pub struct ArtifactContext<'a> {
    pub store: &'a dyn ProfileStore,
    pub workflow: &'a dyn WorkflowClient,
    pub keys: &'a WorkflowKeys,
}

/// Rule deciding whether a cached artifact may be served without
/// regeneration.
#[derive(Debug, Clone, Copy)]
pub enum Freshness {
    /// Fresh as long as it exists (summary, insights, strategies, ideas).
    Presence,
    /// Fresh for a bounded window after `last_generated` (schedule, college
    /// list).
    Ttl(Duration),
}

/// TTL shared by the schedule and college-list artifacts.
pub fn regeneration_window() -> Duration {
    Duration::days(14)
}

pub fn is_fresh(
    generated_at: Option<DateTime<Utc>>,
    policy: Freshness,
    now: DateTime<Utc>,
) -> bool {
    match policy {
        Freshness::Presence => true,
        Freshness::Ttl(ttl) => match generated_at {
            Some(at) => now - at <= ttl,
            None => false,
        },
    }
}

/// A cached artifact plus the timestamp TTL policies are measured from.
pub struct Cached<T> {
    pub value: T,
    pub generated_at: Option<DateTime<Utc>>,
}

impl<T> Cached<T> {
    /// Cached value for presence-only policies, which never consult the
    /// timestamp.
    pub fn unstamped(value: T) -> Self {
        Cached {
            value,
            generated_at: None,
        }
    }

    pub fn stamped(value: T, generated_at: Option<DateTime<Utc>>) -> Self {
        Cached {
            value,
            generated_at,
        }
    }
}

/// The generic cache-or-generate flow.
///
/// `load` reads the cached artifact off the profile; `generate` receives a
/// snapshot of the profile and produces a validated artifact; `apply` writes
/// it back. The caller's loaded `profile` is mutated and saved only on
/// success, so a failed generation leaves the stored document untouched.
pub async fn get_or_generate<T, Load, Gen, Fut, Apply>(
    store: &dyn ProfileStore,
    profile: &mut StudentProfile,
    policy: Freshness,
    force: bool,
    load: Load,
    generate: Gen,
    apply: Apply,
) -> Result<T, AppError>
where
    T: Clone,
    Load: FnOnce(&StudentProfile) -> Option<Cached<T>>,
    Gen: FnOnce(StudentProfile) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
    Apply: FnOnce(&mut StudentProfile, &T),
{
    if !force {
        if let Some(cached) = load(profile) {
            if is_fresh(cached.generated_at, policy, Utc::now()) {
                return Ok(cached.value);
            }
        }
    }

    let value = generate(profile.clone()).await?;

    apply(profile, &value);
    profile.touch();
    store.save(profile).await?;
    Ok(value)
}

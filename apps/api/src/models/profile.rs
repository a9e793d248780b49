//! The student profile aggregate — one document per user.
//!
//! The whole struct round-trips through the store as a single JSON document.
//! Every collection defaults to empty so documents written by older builds
//! still deserialize; unknown top-level fields are preserved via `extra`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Closed set of questionnaire sections. Unknown categories are rejected at
/// the API boundary rather than silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Priorities,
    Interests,
    AboutMe,
    Activities,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Priorities,
        Category::Interests,
        Category::AboutMe,
        Category::Activities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Priorities => "priorities",
            Category::Interests => "interests",
            Category::AboutMe => "aboutMe",
            Category::Activities => "activities",
        }
    }

    /// Parses the wire name of a category. `None` for anything outside the
    /// closed set — callers reject those explicitly.
    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single questionnaire answer. `(category, id)` pairs are unique within
/// a profile's questionnaire after any merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: String,
    pub category: Category,
    pub question: String,
    pub answer: AnswerValue,
}

/// Answer payloads are free-form: slider numbers, free text, or (for the
/// activities section) a nested list of structured activity entries stored
/// as one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    Activities(Vec<Activity>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    #[serde(default)]
    pub sat: SatTracker,
    #[serde(default)]
    pub gpa: GpaTracker,
    #[serde(default)]
    pub act: ActTracker,
    #[serde(default)]
    pub competitions: Vec<Competition>,
}

/// SAT roll-up. `current`/`reading`/`math` are derived from the
/// questionnaire; `goal` and `target_date` are user-managed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatTracker {
    pub current: Option<f64>,
    pub reading: Option<f64>,
    pub math: Option<f64>,
    pub goal: Option<f64>,
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaTracker {
    pub current: Option<f64>,
    pub unweighted: Option<f64>,
    pub weighted: Option<f64>,
    pub goal: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActTracker {
    pub current: Option<f64>,
    pub goal: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub result: String,
}

/// AI-derived observations about the student. Strength/improvement entries
/// keep the collaborator's object shape verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Discovered {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<Value>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeList {
    #[serde(default)]
    pub reach: Vec<School>,
    #[serde(default)]
    pub target: Vec<School>,
    #[serde(default)]
    pub likely: Vec<School>,
    pub last_generated: Option<DateTime<Utc>>,
}

impl CollegeList {
    pub fn is_empty(&self) -> bool {
        self.reach.is_empty() && self.target.is_empty() && self.likely.is_empty()
    }

    /// Iterates every school across the reach/target/likely partitions.
    pub fn schools_mut(&mut self) -> impl Iterator<Item = &mut School> {
        self.reach
            .iter_mut()
            .chain(self.target.iter_mut())
            .chain(self.likely.iter_mut())
    }

    pub fn schools(&self) -> impl Iterator<Item = &School> {
        self.reach
            .iter()
            .chain(self.target.iter())
            .chain(self.likely.iter())
    }
}

/// One entry on the college list. The collaborator attaches fields we do not
/// model (acceptance rates, locations, …) — `extra` carries them through
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub school: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<WhyReason>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A cached per-school "why this school" reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhyReason {
    pub title: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStrategies {
    #[serde(default)]
    pub early_decision: Vec<Value>,
    #[serde(default)]
    pub early_action: Vec<Value>,
    #[serde(default)]
    pub strengths_to_highlight: Value,
}

impl ApplicationStrategies {
    pub fn is_empty(&self) -> bool {
        self.early_decision.is_empty()
            && self.early_action.is_empty()
            && self.strengths_to_highlight.is_null()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub last_generated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub checklist: Vec<Task>,
    #[serde(default)]
    pub catch_up: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Incomplete,
    Complete,
}

/// Essay brainstorms, keyed so entries survive prompt-list changes:
/// Common App and UC ideas key on the fixed prompt id, supplementals on a
/// server-generated id (never array position).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssaysAndActivities {
    #[serde(default)]
    pub common_app: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub uc_questions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub supplementals: BTreeMap<String, SupplementalEssay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementalEssay {
    pub school: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_limit: Option<u32>,
    #[serde(default)]
    pub ideas: Vec<String>,
}

/// The aggregate root. Constructed empty at signup; every later write is a
/// partial merge followed by one whole-document save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub user_id: String,
    pub name: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub questionnaire: Vec<AnswerRecord>,
    #[serde(default)]
    pub tracker: Tracker,
    #[serde(default)]
    pub discovered: Discovered,
    #[serde(default)]
    pub college_list: CollegeList,
    #[serde(default)]
    pub application_strategies: ApplicationStrategies,
    #[serde(default)]
    pub profile_summary: String,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub essays_and_activities: EssaysAndActivities,
    #[serde(default)]
    pub completed_tasks: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl StudentProfile {
    /// All-empty profile created at signup. Defaults live here, not in the
    /// storage layer.
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        StudentProfile {
            user_id: user_id.into(),
            name: name.into(),
            last_updated: Utc::now(),
            questionnaire: Vec::new(),
            tracker: Tracker::default(),
            discovered: Discovered::default(),
            college_list: CollegeList::default(),
            application_strategies: ApplicationStrategies::default(),
            profile_summary: String::new(),
            schedule: Schedule::default(),
            essays_and_activities: EssaysAndActivities::default(),
            completed_tasks: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

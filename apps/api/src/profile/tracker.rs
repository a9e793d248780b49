//! Derived academic tracker.
//!
//! Score fields are a pure projection of the questionnaire's `aboutMe`
//! answers and are overwritten on every derivation; goals, target dates and
//! competitions belong to the user and survive unless an update supplies new
//! values. Runs after every questionnaire merge so the tracker never drifts
//! from the raw answers.

use serde::Deserialize;

use crate::models::profile::{
    ActTracker, AnswerRecord, AnswerValue, Category, Competition, GpaTracker, SatTracker, Tracker,
};

const ID_UNWEIGHTED_GPA: &str = "uwGpa";
const ID_WEIGHTED_GPA: &str = "wGpa";
const ID_SAT_READING: &str = "satReading";
const ID_SAT_MATH: &str = "satMath";
const ID_ACT: &str = "act";

/// Pure projection: reads `aboutMe` answers, keeps user-managed fields from
/// `existing`. Never panics on blank or malformed input.
pub fn derive_tracker(questionnaire: &[AnswerRecord], existing: &Tracker) -> Tracker {
    let score = |id: &str| {
        questionnaire
            .iter()
            .find(|r| r.category == Category::AboutMe && r.id == id)
            .and_then(|r| answer_number(&r.answer))
    };

    let reading = score(ID_SAT_READING);
    let math = score(ID_SAT_MATH);
    let composite = match (reading, math) {
        (Some(r), Some(m)) => Some(r + m),
        (Some(r), None) => Some(r),
        (None, Some(m)) => Some(m),
        (None, None) => None,
    };

    let unweighted = score(ID_UNWEIGHTED_GPA);
    let weighted = score(ID_WEIGHTED_GPA);

    Tracker {
        sat: SatTracker {
            current: composite,
            reading,
            math,
            goal: existing.sat.goal,
            target_date: existing.sat.target_date.clone(),
        },
        gpa: GpaTracker {
            current: unweighted.or(weighted),
            unweighted,
            weighted,
            goal: existing.gpa.goal,
        },
        act: ActTracker {
            current: score(ID_ACT),
            goal: existing.act.goal,
        },
        competitions: existing.competitions.clone(),
    }
}

/// Coerces an answer to a finite number. Blank, missing, non-numeric and
/// nested-activity answers all coerce to `None` — never NaN.
fn answer_number(answer: &AnswerValue) -> Option<f64> {
    match answer {
        AnswerValue::Number(n) => n.is_finite().then_some(*n),
        AnswerValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        AnswerValue::Activities(_) => None,
    }
}

/// User-managed tracker fields supplied alongside a profile update. Only the
/// fields present overwrite; everything else is preserved.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerUpdate {
    #[serde(default)]
    pub sat: Option<SatGoals>,
    #[serde(default)]
    pub gpa: Option<GpaGoals>,
    #[serde(default)]
    pub act: Option<ActGoals>,
    #[serde(default)]
    pub competitions: Option<Vec<Competition>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatGoals {
    pub goal: Option<f64>,
    pub target_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GpaGoals {
    pub goal: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActGoals {
    pub goal: Option<f64>,
}

pub fn apply_tracker_update(tracker: &mut Tracker, update: &TrackerUpdate) {
    if let Some(sat) = &update.sat {
        if let Some(goal) = sat.goal {
            tracker.sat.goal = Some(goal);
        }
        if let Some(target_date) = &sat.target_date {
            tracker.sat.target_date = Some(target_date.clone());
        }
    }
    if let Some(gpa) = &update.gpa {
        if let Some(goal) = gpa.goal {
            tracker.gpa.goal = Some(goal);
        }
    }
    if let Some(act) = &update.act {
        if let Some(goal) = act.goal {
            tracker.act.goal = Some(goal);
        }
    }
    if let Some(competitions) = &update.competitions {
        tracker.competitions = competitions.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn about_me(id: &str, answer: AnswerValue) -> AnswerRecord {
        AnswerRecord {
            id: id.to_string(),
            category: Category::AboutMe,
            question: id.to_string(),
            answer,
        }
    }

    fn text(s: &str) -> AnswerValue {
        AnswerValue::Text(s.to_string())
    }

    #[test]
    fn test_sat_composite_both_scores() {
        let q = vec![
            about_me("satReading", AnswerValue::Number(650.0)),
            about_me("satMath", AnswerValue::Number(700.0)),
        ];
        let t = derive_tracker(&q, &Tracker::default());
        assert_eq!(t.sat.current, Some(1350.0));
        assert_eq!(t.sat.reading, Some(650.0));
        assert_eq!(t.sat.math, Some(700.0));
    }

    #[test]
    fn test_sat_composite_single_score() {
        let q = vec![about_me("satReading", AnswerValue::Number(650.0))];
        let t = derive_tracker(&q, &Tracker::default());
        assert_eq!(t.sat.current, Some(650.0));
        assert_eq!(t.sat.math, None);
    }

    #[test]
    fn test_sat_composite_absent_when_no_scores() {
        let t = derive_tracker(&[], &Tracker::default());
        assert_eq!(t.sat.current, None);
    }

    #[test]
    fn test_blank_and_malformed_inputs_coerce_to_none() {
        let q = vec![
            about_me("uwGpa", text("")),
            about_me("wGpa", text("   ")),
            about_me("satReading", text("n/a")),
            about_me("act", text("NaN")),
        ];
        let t = derive_tracker(&q, &Tracker::default());
        assert_eq!(t.gpa.current, None);
        assert_eq!(t.gpa.unweighted, None);
        assert_eq!(t.gpa.weighted, None);
        assert_eq!(t.sat.current, None);
        assert_eq!(t.act.current, None);
    }

    #[test]
    fn test_numeric_strings_parse() {
        let q = vec![
            about_me("uwGpa", text("3.85")),
            about_me("act", text(" 31 ")),
        ];
        let t = derive_tracker(&q, &Tracker::default());
        assert_eq!(t.gpa.unweighted, Some(3.85));
        assert_eq!(t.act.current, Some(31.0));
    }

    #[test]
    fn test_gpa_current_prefers_unweighted() {
        let q = vec![
            about_me("uwGpa", AnswerValue::Number(3.8)),
            about_me("wGpa", AnswerValue::Number(4.3)),
        ];
        let t = derive_tracker(&q, &Tracker::default());
        assert_eq!(t.gpa.current, Some(3.8));

        let weighted_only = vec![about_me("wGpa", AnswerValue::Number(4.3))];
        let t = derive_tracker(&weighted_only, &Tracker::default());
        assert_eq!(t.gpa.current, Some(4.3));
    }

    #[test]
    fn test_user_managed_fields_survive_derivation() {
        let existing = Tracker {
            sat: SatTracker {
                goal: Some(1500.0),
                target_date: Some("2026-12-01".to_string()),
                ..SatTracker::default()
            },
            gpa: GpaTracker {
                goal: Some(3.9),
                ..GpaTracker::default()
            },
            competitions: vec![Competition {
                id: "c1".to_string(),
                name: "AMC 12".to_string(),
                result: "qualified".to_string(),
            }],
            ..Tracker::default()
        };
        let q = vec![about_me("satReading", AnswerValue::Number(700.0))];
        let t = derive_tracker(&q, &existing);
        assert_eq!(t.sat.goal, Some(1500.0));
        assert_eq!(t.sat.target_date.as_deref(), Some("2026-12-01"));
        assert_eq!(t.gpa.goal, Some(3.9));
        assert_eq!(t.competitions, existing.competitions);
    }

    #[test]
    fn test_derived_fields_overwritten_on_every_call() {
        let stale = Tracker {
            sat: SatTracker {
                current: Some(1600.0),
                reading: Some(800.0),
                math: Some(800.0),
                ..SatTracker::default()
            },
            ..Tracker::default()
        };
        // Questionnaire no longer carries SAT answers: derived fields reset.
        let t = derive_tracker(&[], &stale);
        assert_eq!(t.sat.current, None);
        assert_eq!(t.sat.reading, None);
        assert_eq!(t.sat.math, None);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let q = vec![
            about_me("uwGpa", text("3.7")),
            about_me("satReading", AnswerValue::Number(640.0)),
            about_me("satMath", AnswerValue::Number(680.0)),
        ];
        let first = derive_tracker(&q, &Tracker::default());
        let second = derive_tracker(&q, &first);
        assert_eq!(first, second);
    }

    #[test]
    fn test_tracker_update_overwrites_only_supplied_fields() {
        let mut tracker = Tracker {
            sat: SatTracker {
                goal: Some(1400.0),
                target_date: Some("2026-10-01".to_string()),
                ..SatTracker::default()
            },
            ..Tracker::default()
        };
        apply_tracker_update(
            &mut tracker,
            &TrackerUpdate {
                sat: Some(SatGoals {
                    goal: Some(1500.0),
                    target_date: None,
                }),
                ..TrackerUpdate::default()
            },
        );
        assert_eq!(tracker.sat.goal, Some(1500.0));
        assert_eq!(tracker.sat.target_date.as_deref(), Some("2026-10-01"));
    }
}

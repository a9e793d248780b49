//! Questionnaire merge engine.
//!
//! A profile update carries whole categories: the records of an updated
//! category are replaced wholesale, every other category is left untouched.
//! Applying the same answer map twice yields the same record set, so client
//! retries are harmless.

use std::collections::BTreeMap;

use crate::models::profile::{AnswerRecord, AnswerValue, Category};
use crate::profile::questions::label_for;

/// Partial answers for exactly one category, keyed by question id. BTreeMap
/// keys keep record order deterministic for a given update.
pub type AnswerMap = BTreeMap<String, AnswerValue>;

/// Replaces `category`'s records with freshly built ones from `answers`.
/// An empty map clears the category — that is the explicit way to delete.
pub fn merge_category(
    questionnaire: &mut Vec<AnswerRecord>,
    category: Category,
    answers: &AnswerMap,
) {
    questionnaire.retain(|record| record.category != category);
    for (id, answer) in answers {
        questionnaire.push(AnswerRecord {
            id: id.clone(),
            category,
            question: label_for(category, id).map(str::to_string).unwrap_or_else(|| id.clone()),
            answer: answer.clone(),
        });
    }
}

//! Essay brainstorming: Common App and UC prompts come from fixed catalogs,
//! supplemental prompts are user-entered per school. Generated ideas cache
//! under the prompt's id — supplementals use a server-generated id so edits
//! and deletions never depend on array position.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use crate::artifacts::summary::ensure_summary;
use crate::artifacts::{get_or_generate, ArtifactContext, Cached, Freshness};
use crate::errors::AppError;
use crate::models::profile::{EssaysAndActivities, StudentProfile, SupplementalEssay};
use crate::workflow::Inputs;

pub struct EssayPrompt {
    pub id: &'static str,
    pub text: &'static str,
}

pub const COMMON_APP_PROMPTS: &[EssayPrompt] = &[
    EssayPrompt {
        id: "ca1",
        text: "Some students have a background, identity, interest, or talent that is so meaningful they believe their application would be incomplete without it. If this sounds like you, then please share your story.",
    },
    EssayPrompt {
        id: "ca2",
        text: "The lessons we take from obstacles we encounter can be fundamental to later success. Recount a time when you faced a challenge, setback, or failure. How did it affect you, and what did you learn from the experience?",
    },
    EssayPrompt {
        id: "ca3",
        text: "Reflect on a time when you questioned or challenged a belief or idea. What prompted your thinking? What was the outcome?",
    },
    EssayPrompt {
        id: "ca4",
        text: "Reflect on something that someone has done for you that has made you happy or thankful in a surprising way. How has this gratitude affected or motivated you?",
    },
    EssayPrompt {
        id: "ca5",
        text: "Discuss an accomplishment, event, or realization that sparked a period of personal growth and a new understanding of yourself or others.",
    },
    EssayPrompt {
        id: "ca6",
        text: "Describe a topic, idea, or concept you find so engaging that it makes you lose all track of time. Why does it captivate you? What or who do you turn to when you want to learn more?",
    },
    EssayPrompt {
        id: "ca7",
        text: "Share an essay on any topic of your choice. It can be one you've already written, one that responds to a different prompt, or one of your own design.",
    },
];

pub const UC_PROMPTS: &[EssayPrompt] = &[
    EssayPrompt {
        id: "uc1",
        text: "Describe an example of your leadership experience in which you have positively influenced others, helped resolve disputes, or contributed to group efforts over time.",
    },
    EssayPrompt {
        id: "uc2",
        text: "Every person has a creative side, and it can be expressed in many ways. Describe how you express your creative side.",
    },
    EssayPrompt {
        id: "uc3",
        text: "What would you say is your greatest talent or skill? How have you developed and demonstrated that talent over time?",
    },
    EssayPrompt {
        id: "uc4",
        text: "Describe how you have taken advantage of a significant educational opportunity or worked to overcome an educational barrier you have faced.",
    },
    EssayPrompt {
        id: "uc5",
        text: "Describe the most significant challenge you have faced and the steps you have taken to overcome this challenge. How has this challenge affected your academic achievement?",
    },
    EssayPrompt {
        id: "uc6",
        text: "Think about an academic subject that inspires you. Describe how you have furthered this interest inside and/or outside of the classroom.",
    },
    EssayPrompt {
        id: "uc7",
        text: "What have you done to make your school or your community a better place?",
    },
    EssayPrompt {
        id: "uc8",
        text: "Beyond what has already been shared in your application, what do you believe makes you a strong candidate for admissions to the University of California?",
    },
];

fn catalog_text(catalog: &[EssayPrompt], id: &str) -> Option<&'static str> {
    catalog.iter().find(|p| p.id == id).map(|p| p.text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptType {
    CommonApp,
    UcQuestions,
    Supplemental,
}

/// The prompt a brainstorm targets. Catalog prompts resolve their text by
/// id; `text` is only consulted for ids the catalog does not know.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRef {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrainstormRequest {
    pub prompt_type: PromptType,
    pub prompt: PromptRef,
    #[serde(default)]
    pub force: bool,
}

/// Cache-or-generate essay ideas for one prompt.
pub async fn brainstorm(
    ctx: ArtifactContext<'_>,
    profile: &mut StudentProfile,
    request: &BrainstormRequest,
) -> Result<Vec<String>, AppError> {
    let prompt_id = request.prompt.id.clone();
    let (prompt_text, word_limit) = match request.prompt_type {
        PromptType::CommonApp => (
            resolve_text(COMMON_APP_PROMPTS, &request.prompt)?,
            None,
        ),
        PromptType::UcQuestions => (resolve_text(UC_PROMPTS, &request.prompt)?, None),
        PromptType::Supplemental => {
            let entry = profile
                .essays_and_activities
                .supplementals
                .get(&prompt_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Supplemental prompt {prompt_id} not found"))
                })?;
            (entry.prompt.clone(), entry.word_limit)
        }
    };

    let summary = ensure_summary(ctx, profile).await?;
    let prompt_type = request.prompt_type;

    get_or_generate(
        ctx.store,
        profile,
        Freshness::Presence,
        request.force,
        |p| {
            let cached = match prompt_type {
                PromptType::CommonApp => p.essays_and_activities.common_app.get(&prompt_id),
                PromptType::UcQuestions => p.essays_and_activities.uc_questions.get(&prompt_id),
                PromptType::Supplemental => p
                    .essays_and_activities
                    .supplementals
                    .get(&prompt_id)
                    .map(|s| &s.ideas),
            };
            cached
                .filter(|ideas| !ideas.is_empty())
                .map(|ideas| Cached::unstamped(ideas.clone()))
        },
        |snapshot| async move {
            info!("Brainstorming essay ideas for user {}", snapshot.user_id);
            let mut inputs: Inputs = BTreeMap::new();
            inputs.insert("profile".to_string(), summary);
            inputs.insert("prompt".to_string(), prompt_text);
            inputs.insert(
                "essay_type".to_string(),
                match prompt_type {
                    PromptType::CommonApp => "common_app".to_string(),
                    PromptType::UcQuestions => "uc_question".to_string(),
                    PromptType::Supplemental => "supplemental".to_string(),
                },
            );
            if let Some(limit) = word_limit {
                inputs.insert("word_limit".to_string(), limit.to_string());
            }
            let outputs = ctx
                .workflow
                .run_workflow(&ctx.keys.essay_brainstorm, inputs, &snapshot.user_id)
                .await?;
            Ok(outputs.require::<Vec<String>>("ideas")?)
        },
        |p, ideas| {
            let essays = &mut p.essays_and_activities;
            match prompt_type {
                PromptType::CommonApp => {
                    essays.common_app.insert(request.prompt.id.clone(), ideas.clone());
                }
                PromptType::UcQuestions => {
                    essays.uc_questions.insert(request.prompt.id.clone(), ideas.clone());
                }
                PromptType::Supplemental => {
                    if let Some(entry) = essays.supplementals.get_mut(&request.prompt.id) {
                        entry.ideas = ideas.clone();
                    }
                }
            }
        },
    )
    .await
}

fn resolve_text(catalog: &[EssayPrompt], prompt: &PromptRef) -> Result<String, AppError> {
    catalog_text(catalog, &prompt.id)
        .map(str::to_string)
        .or_else(|| prompt.text.clone())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Unknown prompt id '{}' and no prompt text supplied",
                prompt.id
            ))
        })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplemental {
    pub school: String,
    pub prompt: String,
    #[serde(default)]
    pub word_limit: Option<u32>,
}

/// Registers a supplemental prompt under a fresh server-generated id.
pub fn add_supplemental(
    essays: &mut EssaysAndActivities,
    new: NewSupplemental,
) -> (String, SupplementalEssay) {
    let id = Uuid::new_v4().to_string();
    let entry = SupplementalEssay {
        school: new.school,
        prompt: new.prompt,
        word_limit: new.word_limit,
        ideas: Vec::new(),
    };
    essays.supplementals.insert(id.clone(), entry.clone());
    (id, entry)
}

pub fn remove_supplemental(
    essays: &mut EssaysAndActivities,
    id: &str,
) -> Result<SupplementalEssay, AppError> {
    essays
        .supplementals
        .remove(id)
        .ok_or_else(|| AppError::NotFound(format!("Supplemental prompt {id} not found")))
}

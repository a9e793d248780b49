//! Static questionnaire catalog: category → question-id → label.
//! Merge resolves labels through this table, falling back to the raw id for
//! questions the catalog does not know.

use crate::models::profile::Category;

pub struct QuestionDef {
    pub id: &'static str,
    pub label: &'static str,
}

const PRIORITIES: &[QuestionDef] = &[
    QuestionDef { id: "academics", label: "Academics Priority" },
    QuestionDef { id: "partyScene", label: "Party Scene Priority" },
    QuestionDef { id: "diversity", label: "Diversity Priority" },
    QuestionDef { id: "localArea", label: "Local Area Priority" },
    QuestionDef { id: "athletics", label: "Athletics Priority" },
    QuestionDef { id: "safety", label: "Safety Priority" },
    QuestionDef { id: "campus", label: "Campus Priority" },
    QuestionDef { id: "affordability", label: "Affordability Priority" },
];

const INTERESTS: &[QuestionDef] = &[
    QuestionDef { id: "career", label: "Do you have a career or major in mind?" },
    QuestionDef { id: "subjects", label: "What are your favorite subjects? Why?" },
    QuestionDef { id: "freeTime", label: "What do you do in your free time?" },
];

const ABOUT_ME: &[QuestionDef] = &[
    QuestionDef { id: "uwGpa", label: "Unweighted GPA" },
    QuestionDef { id: "wGpa", label: "Weighted GPA" },
    QuestionDef { id: "satReading", label: "SAT Reading Score" },
    QuestionDef { id: "satMath", label: "SAT Math Score" },
    QuestionDef { id: "act", label: "ACT Score" },
];

const ACTIVITIES: &[QuestionDef] = &[
    QuestionDef { id: "activities", label: "Extracurricular Activities" },
];

pub fn questions_for(category: Category) -> &'static [QuestionDef] {
    match category {
        Category::Priorities => PRIORITIES,
        Category::Interests => INTERESTS,
        Category::AboutMe => ABOUT_ME,
        Category::Activities => ACTIVITIES,
    }
}

/// Resolves the display label for a question id within a category.
pub fn label_for(category: Category, id: &str) -> Option<&'static str> {
    questions_for(category)
        .iter()
        .find(|q| q.id == id)
        .map(|q| q.label)
}

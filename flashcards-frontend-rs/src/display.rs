//! What the presentation layer draws. Everything here is derived from the session and is safe to recompute on every change.

use lesson_utils::ContentItem;

use crate::preferences::{AssociationLanguage, Direction, Preferences};

/// Card text. Multi-line phrases keep their line breaks; everything else is plain text and must never be
/// interpreted as markup.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum DisplayText {
    Plain(String),
    MultiLine(Vec<String>),
}

impl DisplayText {
    pub fn new(text: &str) -> Self {
        if text.contains('\n') {
            DisplayText::MultiLine(text.split('\n').map(str::to_string).collect())
        } else {
            DisplayText::Plain(text.to_string())
        }
    }

    pub fn lines(&self) -> Vec<&str> {
        match self {
            DisplayText::Plain(text) => vec![text.as_str()],
            DisplayText::MultiLine(lines) => lines.iter().map(String::as_str).collect(),
        }
    }
}

impl std::fmt::Display for DisplayText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayText::Plain(text) => f.write_str(text),
            DisplayText::MultiLine(lines) => f.write_str(&lines.join("\n")),
        }
    }
}

/// The association settings a session was started with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssociationSettings {
    pub show: bool,
    pub languages: std::collections::BTreeSet<AssociationLanguage>,
}

impl From<&Preferences> for AssociationSettings {
    fn from(prefs: &Preferences) -> Self {
        Self {
            show: prefs.show_associations,
            languages: prefs.association_languages.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sides<'a> {
    pub front: &'a str,
    pub back: &'a str,
    pub back_associations: Vec<&'a str>,
}

impl<'a> Sides<'a> {
    pub fn derive(
        item: &'a ContentItem,
        direction: Direction,
        associations: &AssociationSettings,
    ) -> Self {
        match direction {
            // Showing an English mnemonic next to the Thai prompt would give the answer away.
            Direction::ThaiToEnglish => Sides {
                front: &item.thai,
                back: &item.english,
                back_associations: Vec::new(),
            },
            Direction::EnglishToThai => {
                let mut back_associations = Vec::new();
                if associations.show && item.is_word() && !associations.languages.is_empty() {
                    if associations.languages.contains(&AssociationLanguage::En) {
                        back_associations.extend(item.association_en.as_deref());
                    }
                    if associations.languages.contains(&AssociationLanguage::Ru) {
                        back_associations.extend(item.association_ru.as_deref());
                    }
                }
                Sides {
                    front: &item.english,
                    back: &item.thai,
                    back_associations,
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// 1-based
    pub position: usize,
    pub total: usize,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.position, self.total)
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct CardDisplay {
    pub front: DisplayText,
    pub back: DisplayText,
    pub back_associations: Vec<String>,
    pub showing_front: bool,
    pub progress: Progress,
    pub can_go_previous: bool,
    pub can_go_next: bool,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub score: u32,
    pub attempts: u32,
    pub percentage: u32,
}

impl QuizSummary {
    pub fn new(score: u32, attempts: u32) -> Self {
        // rounds half up
        let percentage = if attempts > 0 {
            (200 * score + attempts) / (2 * attempts)
        } else {
            0
        };
        Self {
            score,
            attempts,
            percentage,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Feedback {
    Correct,
    Incorrect { answer: String },
    Complete(QuizSummary),
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feedback::Correct => f.write_str("Correct! ✓"),
            Feedback::Incorrect { answer } => write!(f, "Incorrect. The answer is: {answer}"),
            Feedback::Complete(QuizSummary {
                score,
                attempts,
                percentage,
            }) => write!(
                f,
                "Quiz complete! Final score: {score}/{attempts} ({percentage}%)"
            ),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct QuizDisplay {
    /// `None` once the quiz is complete.
    pub prompt: Option<DisplayText>,
    pub answer_placeholder: String,
    pub progress: Progress,
    pub score: u32,
    pub attempts: u32,
    pub feedback: Option<Feedback>,
}

impl QuizDisplay {
    pub fn progress_line(&self) -> String {
        format!("Question {}", self.progress)
    }

    pub fn score_line(&self) -> String {
        format!("Score: {} / {}", self.score, self.attempts)
    }

    pub fn accepts_answers(&self) -> bool {
        self.prompt.is_some()
    }
}

pub(crate) fn answer_placeholder(direction: Direction) -> &'static str {
    match direction {
        Direction::ThaiToEnglish => "Enter English translation...",
        Direction::EnglishToThai => "Enter Thai translation (phonetic)...",
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(tag = "screen", content = "state", rename_all = "camelCase")]
pub enum DisplayState {
    Menu,
    Flashcard(CardDisplay),
    Quiz(QuizDisplay),
}

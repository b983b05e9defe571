//! # Session
//! A session is one run over a built list of items, either as flashcards or as a typed-answer quiz.
//! It is created from scratch on every start and owns a snapshot of the items, so changing preferences
//! mid-session has no effect on it.
//!
//! Quiz pacing: grading an answer does not advance the quiz by itself. It hands back a [`PendingAdvance`]
//! that the presentation layer fires after [`PendingAdvance::delay`]. The ticket names the session and the
//! question it was issued for, so a ticket that fires after the session was ended, rebuilt, or already
//! advanced is ignored.

use std::time::Duration;

use eyedee::Id;
use lesson_utils::ContentItem;

use crate::display::{
    AssociationSettings, CardDisplay, DisplayText, Feedback, Progress, QuizDisplay, QuizSummary,
    Sides, answer_placeholder,
};
use crate::preferences::{Direction, Preferences, StudyMode};

pub const CORRECT_ADVANCE_DELAY: Duration = Duration::from_millis(1500);
pub const INCORRECT_ADVANCE_DELAY: Duration = Duration::from_millis(3000);

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub enum SessionMode {
    Flashcard,
    Quiz,
}

impl From<StudyMode> for SessionMode {
    fn from(mode: StudyMode) -> Self {
        match mode {
            StudyMode::Ordered | StudyMode::Shuffled => SessionMode::Flashcard,
            StudyMode::Quiz => SessionMode::Quiz,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct PendingAdvance {
    pub session: Id,
    pub question: usize,
    #[serde(with = "millis")]
    #[cfg_attr(target_arch = "wasm32", tsify(type = "number"))]
    pub delay: Duration,
}

mod millis {
    use std::time::Duration;

    pub fn serialize<S: serde::Serializer>(delay: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(delay.as_millis() as u64)
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis: u64 = serde::Deserialize::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct Graded {
    pub correct: bool,
    pub feedback: Feedback,
    pub pending: PendingAdvance,
}

/// Trim and lowercase.
fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// After trimming and lowercasing, the answer counts if either string contains the other.
/// Partial or padded answers pass, and so does e.g. "one" for "on".
pub fn is_correct(submission: &str, expected: &str) -> bool {
    let submission = normalize(submission);
    let expected = normalize(expected);
    submission == expected || expected.contains(&submission) || submission.contains(&expected)
}

#[derive(Clone, Debug)]
pub struct Session {
    id: Id,
    items: Vec<ContentItem>,
    index: usize,
    mode: SessionMode,
    showing_front: bool,
    score: u32,
    attempts: u32,
    feedback: Option<Feedback>,
    direction: Direction,
    associations: AssociationSettings,
}

impl Session {
    /// An empty quiz starts out complete, and an empty flashcard session has no card to show.
    pub fn new(items: Vec<ContentItem>, prefs: &Preferences) -> Self {
        Self {
            id: Id::new(),
            items,
            index: 0,
            mode: prefs.study_mode.into(),
            showing_front: true,
            score: 0,
            attempts: 0,
            feedback: None,
            direction: prefs.direction,
            associations: AssociationSettings::from(prefs),
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn showing_front(&self) -> bool {
        self.showing_front
    }

    pub fn current_item(&self) -> Option<&ContentItem> {
        self.items.get(self.index)
    }

    fn current_sides(&self) -> Option<Sides<'_>> {
        self.current_item()
            .map(|item| Sides::derive(item, self.direction, &self.associations))
    }

    fn progress(&self) -> Progress {
        Progress {
            position: (self.index + 1).min(self.items.len()),
            total: self.items.len(),
        }
    }

    // =======
    // flashcards
    // =======

    /// Returns whether anything changed.
    pub fn flip(&mut self) -> bool {
        if self.mode != SessionMode::Flashcard {
            return false;
        }
        self.showing_front = !self.showing_front;
        true
    }

    /// Moves one card back (negative `step`) or forward (positive `step`). Stepping past either end does
    /// nothing. Returns whether the card changed.
    pub fn navigate(&mut self, step: i32) -> bool {
        if self.mode != SessionMode::Flashcard {
            return false;
        }
        let target = match step.signum() {
            -1 if self.index > 0 => self.index - 1,
            1 if self.index + 1 < self.items.len() => self.index + 1,
            _ => return false,
        };
        self.index = target;
        self.showing_front = true;
        true
    }

    pub fn card_display(&self) -> Option<CardDisplay> {
        if self.mode != SessionMode::Flashcard {
            return None;
        }
        let sides = self.current_sides()?;
        Some(CardDisplay {
            front: DisplayText::new(sides.front),
            back: DisplayText::new(sides.back),
            back_associations: sides
                .back_associations
                .iter()
                .map(|text| text.to_string())
                .collect(),
            showing_front: self.showing_front,
            progress: self.progress(),
            can_go_previous: self.index > 0,
            can_go_next: self.index + 1 < self.items.len(),
        })
    }

    // =======
    // quiz
    // =======

    pub fn is_complete(&self) -> bool {
        self.mode == SessionMode::Quiz && self.index >= self.items.len()
    }

    pub fn summary(&self) -> Option<QuizSummary> {
        self.is_complete()
            .then(|| QuizSummary::new(self.score, self.attempts))
    }

    /// Grades a typed answer against the current question. `None` outside quiz mode or after the quiz is complete.
    ///
    /// Every call counts as an attempt, including a second submission for a question that is already graded.
    pub fn submit_answer(&mut self, raw: &str) -> Option<Graded> {
        if self.mode != SessionMode::Quiz {
            return None;
        }
        let expected = self.current_sides()?.back.to_string();

        let correct = is_correct(raw, &expected);
        self.attempts += 1;
        let (feedback, delay) = if correct {
            self.score += 1;
            (Feedback::Correct, CORRECT_ADVANCE_DELAY)
        } else {
            (
                Feedback::Incorrect { answer: expected },
                INCORRECT_ADVANCE_DELAY,
            )
        };
        self.feedback = Some(feedback.clone());

        Some(Graded {
            correct,
            feedback,
            pending: PendingAdvance {
                session: self.id.clone(),
                question: self.index,
                delay,
            },
        })
    }

    /// Moves to the next question if `pending` was issued by this session for the current question.
    /// Returns whether the quiz advanced.
    pub fn advance(&mut self, pending: &PendingAdvance) -> bool {
        if pending.session != self.id {
            log::debug!("Ignoring advance for session {}", pending.session);
            return false;
        }
        if self.is_complete() || pending.question != self.index {
            log::debug!(
                "Ignoring stale advance for question {} (now at {})",
                pending.question,
                self.index
            );
            return false;
        }

        self.index += 1;
        self.feedback = None;
        if let Some(summary) = self.summary() {
            log::info!(
                "Quiz complete: {}/{} ({}%)",
                summary.score,
                summary.attempts,
                summary.percentage
            );
            self.feedback = Some(Feedback::Complete(summary));
        }
        true
    }

    pub fn quiz_display(&self) -> Option<QuizDisplay> {
        if self.mode != SessionMode::Quiz {
            return None;
        }
        Some(QuizDisplay {
            prompt: self.current_sides().map(|sides| DisplayText::new(sides.front)),
            answer_placeholder: answer_placeholder(self.direction).to_string(),
            progress: self.progress(),
            score: self.score,
            attempts: self.attempts,
            feedback: self.feedback.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::AssociationLanguage;
    use lesson_utils::ContentKind;

    fn item(thai: &str, english: &str) -> ContentItem {
        ContentItem {
            thai: thai.to_string(),
            english: english.to_string(),
            association_en: None,
            association_ru: None,
            kind: ContentKind::Word,
        }
    }

    fn session(mode: StudyMode, items: Vec<ContentItem>) -> Session {
        Session::new(
            items,
            &Preferences {
                study_mode: mode,
                ..Default::default()
            },
        )
    }

    fn three_cards() -> Session {
        session(
            StudyMode::Ordered,
            vec![
                item("nueng", "one"),
                item("song", "two"),
                item("sam", "three"),
            ],
        )
    }

    #[test]
    fn test_lenient_grading() {
        assert!(is_correct("Cat ", "cat"));
        assert!(is_correct("  THANK YOU", "thank you"));
        assert!(is_correct("thank", "thank you"));
        assert!(is_correct("the bill, please now", "the bill, please"));
        assert!(is_correct("one", "on"));
        assert!(is_correct("doge", "dog"));
        assert!(!is_correct("cat", "dog"));
    }

    #[test]
    fn test_flashcards_start_on_first_front() {
        let session = three_cards();
        let display = session.card_display().unwrap();
        assert_eq!(display.progress.to_string(), "1 / 3");
        assert!(display.showing_front);
        assert_eq!(display.front, DisplayText::Plain("nueng".to_string()));
        assert_eq!(display.back, DisplayText::Plain("one".to_string()));
        assert!(!display.can_go_previous);
        assert!(display.can_go_next);
        assert!(session.quiz_display().is_none());
    }

    #[test]
    fn test_navigate_clamps_at_both_ends() {
        let mut session = three_cards();
        assert!(!session.navigate(-1));
        assert_eq!(session.index(), 0);

        assert!(session.navigate(1));
        assert!(session.navigate(1));
        assert!(!session.navigate(1));
        assert_eq!(session.index(), 2);

        let display = session.card_display().unwrap();
        assert!(display.can_go_previous);
        assert!(!display.can_go_next);
        assert_eq!(display.progress.to_string(), "3 / 3");

        assert!(session.navigate(-1));
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn test_flip_twice_is_identity_and_navigation_resets() {
        let mut session = three_cards();
        assert!(session.flip());
        assert!(!session.showing_front());
        session.flip();
        assert!(session.showing_front());

        session.flip();
        session.navigate(1);
        assert!(session.showing_front());

        session.navigate(1);
        session.flip();
        // already on the last card, so the back stays up
        assert!(!session.navigate(1));
        assert!(!session.showing_front());
    }

    #[test]
    fn test_single_card_cannot_move() {
        let mut session = session(StudyMode::Shuffled, vec![item("nam", "water")]);
        assert!(!session.navigate(1));
        assert!(!session.navigate(-1));
        let display = session.card_display().unwrap();
        assert!(!display.can_go_previous && !display.can_go_next);
    }

    #[test]
    fn test_flashcard_multiline_and_associations() {
        let mut word = item("khob khun", "thank you");
        word.association_en = Some("Knock on the cob".to_string());
        word.association_ru = Some("Коп благодарит".to_string());
        let phrase = ContentItem {
            kind: ContentKind::Phrase,
            ..item("lieo sai\nlaew trong pai", "turn left\nthen go straight")
        };
        let session = Session::new(
            vec![word, phrase],
            &Preferences {
                direction: Direction::EnglishToThai,
                show_associations: true,
                association_languages: [AssociationLanguage::En, AssociationLanguage::Ru]
                    .into_iter()
                    .collect(),
                ..Default::default()
            },
        );
        let display = session.card_display().unwrap();
        assert_eq!(display.front, DisplayText::Plain("thank you".to_string()));
        assert_eq!(
            display.back_associations,
            vec!["Knock on the cob".to_string(), "Коп благодарит".to_string()]
        );

        let mut session = session;
        session.navigate(1);
        let display = session.card_display().unwrap();
        assert_eq!(
            display.back,
            DisplayText::MultiLine(vec!["lieo sai".to_string(), "laew trong pai".to_string()])
        );
        assert!(display.back_associations.is_empty());
    }

    #[test]
    fn test_quiz_ignores_flashcard_intents() {
        let mut quiz = session(StudyMode::Quiz, vec![item("nam", "water")]);
        assert!(!quiz.flip());
        assert!(!quiz.navigate(1));
        assert!(quiz.card_display().is_none());

        let mut cards = three_cards();
        assert!(cards.submit_answer("one").is_none());
        assert_eq!(cards.attempts(), 0);
    }

    #[test]
    fn test_quiz_scores_and_completes() {
        let mut quiz = session(
            StudyMode::Quiz,
            vec![item("maew", "cat"), item("ma", "dog")],
        );
        let display = quiz.quiz_display().unwrap();
        assert_eq!(display.prompt, Some(DisplayText::Plain("maew".to_string())));
        assert_eq!(display.answer_placeholder, "Enter English translation...");
        assert_eq!(display.progress_line(), "Question 1 / 2");
        assert_eq!(display.score_line(), "Score: 0 / 0");

        let graded = quiz.submit_answer("Cat ").unwrap();
        assert!(graded.correct);
        assert_eq!(graded.pending.delay, CORRECT_ADVANCE_DELAY);
        assert_eq!(quiz.quiz_display().unwrap().feedback, Some(Feedback::Correct));
        assert!(quiz.advance(&graded.pending));
        assert_eq!(quiz.quiz_display().unwrap().feedback, None);

        let graded = quiz.submit_answer("doge").unwrap();
        assert!(graded.correct, "\"doge\" contains \"dog\"");

        let mut quiz = session(
            StudyMode::Quiz,
            vec![item("maew", "cat"), item("ma", "dog")],
        );
        let first = quiz.submit_answer("Cat ").unwrap();
        quiz.advance(&first.pending);
        let second = quiz.submit_answer("bird").unwrap();
        assert!(!second.correct);
        assert_eq!(second.pending.delay, INCORRECT_ADVANCE_DELAY);
        assert_eq!(
            second.feedback,
            Feedback::Incorrect {
                answer: "dog".to_string()
            }
        );
        assert!(quiz.advance(&second.pending));

        assert!(quiz.is_complete());
        let summary = quiz.summary().unwrap();
        assert_eq!(
            summary,
            QuizSummary {
                score: 1,
                attempts: 2,
                percentage: 50
            }
        );
        let display = quiz.quiz_display().unwrap();
        assert!(!display.accepts_answers());
        assert_eq!(display.feedback, Some(Feedback::Complete(summary)));
        assert_eq!(display.progress.to_string(), "2 / 2");

        assert!(quiz.submit_answer("anything").is_none());
        assert_eq!(quiz.attempts(), 2);
    }

    #[test]
    fn test_double_submit_counts_attempts_but_advances_once() {
        let mut quiz = session(
            StudyMode::Quiz,
            vec![item("maew", "cat"), item("ma", "dog"), item("nok", "bird")],
        );
        let first = quiz.submit_answer("cat").unwrap();
        let second = quiz.submit_answer("fish").unwrap();
        assert_eq!(quiz.attempts(), 2);
        assert_eq!(quiz.score(), 1);

        assert!(quiz.advance(&first.pending));
        assert!(!quiz.advance(&second.pending));
        assert_eq!(quiz.index(), 1);
    }

    #[test]
    fn test_advance_from_other_session_is_ignored() {
        let mut old = session(StudyMode::Quiz, vec![item("maew", "cat")]);
        let stale = old.submit_answer("cat").unwrap().pending;

        let mut fresh = session(StudyMode::Quiz, vec![item("maew", "cat")]);
        assert!(!fresh.advance(&stale));
        assert_eq!(fresh.index(), 0);
        assert_eq!(fresh.attempts(), 0);
    }

    #[test]
    fn test_english_to_thai_quiz_expects_thai() {
        let mut quiz = Session::new(
            vec![item("sawatdee", "hello")],
            &Preferences {
                study_mode: StudyMode::Quiz,
                direction: Direction::EnglishToThai,
                ..Default::default()
            },
        );
        let display = quiz.quiz_display().unwrap();
        assert_eq!(display.prompt, Some(DisplayText::Plain("hello".to_string())));
        assert_eq!(
            display.answer_placeholder,
            "Enter Thai translation (phonetic)..."
        );
        assert!(!quiz.submit_answer("hello there").unwrap().correct);
    }

    #[test]
    fn test_empty_session_is_inert() {
        let cards = session(StudyMode::Ordered, Vec::new());
        assert!(cards.card_display().is_none());
        assert!(!cards.clone().navigate(1));

        let mut quiz = session(StudyMode::Quiz, Vec::new());
        assert!(quiz.is_complete());
        assert!(quiz.submit_answer("cat").is_none());
        assert_eq!(quiz.summary(), Some(QuizSummary::new(0, 0)));
        assert_eq!(quiz.quiz_display().unwrap().prompt, None);
    }

    #[test]
    fn test_pending_advance_wire_format() {
        let mut quiz = session(StudyMode::Quiz, vec![item("maew", "cat")]);
        let pending = quiz.submit_answer("cat").unwrap().pending;
        let json = serde_json::to_value(&pending).unwrap();
        assert_eq!(json["delay"], 1500);
        assert_eq!(json["question"], 0);
        let back: PendingAdvance = serde_json::from_value(json).unwrap();
        assert_eq!(back, pending);
    }
}

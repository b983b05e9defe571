use lesson_utils::ContentItem;

use crate::display::QuizSummary;
use crate::session::Session;

impl Session {
    /// Run a quiz to completion, calling `answer` for each question and firing each ticket immediately
    /// instead of waiting for its delay.
    pub(crate) fn simulate_quiz<F>(&mut self, mut answer: F) -> Option<QuizSummary>
    where
        F: FnMut(&ContentItem) -> String,
    {
        while let Some(item) = self.current_item() {
            let submission = answer(item);
            let graded = self.submit_answer(&submission)?;
            if !self.advance(&graded.pending) {
                break;
            }
        }
        self.summary()
    }
}

#[cfg(test)]
mod tests {
    use crate::display::DisplayState;
    use crate::preferences::{ContentType, Direction, SettingsUpdate, StudyMode};
    use crate::{App, Preferences, build_session};
    use lesson_utils::{ContentStore, LessonId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use stash::MemoryStore;

    use super::*;

    fn quiz_over(lessons: &[u32], direction: Direction, seed: u64) -> Session {
        let prefs = Preferences {
            selected_lessons: lessons.iter().copied().map(LessonId).collect(),
            study_mode: StudyMode::Quiz,
            content_type: ContentType::Both,
            direction,
            ..Default::default()
        };
        let store = ContentStore::bundled().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Session::new(build_session(&store, &prefs, &mut rng), &prefs)
    }

    #[test]
    fn test_perfect_answers_score_everything() {
        for direction in [Direction::ThaiToEnglish, Direction::EnglishToThai] {
            let mut quiz = quiz_over(&[1, 2, 3, 4, 5], direction, 11);
            let total = quiz.len() as u32;
            let summary = quiz
                .simulate_quiz(|item| match direction {
                    Direction::ThaiToEnglish => item.english.to_uppercase(),
                    Direction::EnglishToThai => format!("  {}  ", item.thai),
                })
                .unwrap();
            assert_eq!(summary.score, total);
            assert_eq!(summary.attempts, total);
            assert_eq!(summary.percentage, 100);
        }
    }

    #[test]
    fn test_every_other_answer_wrong() {
        let mut quiz = quiz_over(&[1, 2], Direction::ThaiToEnglish, 5);
        let total = quiz.len() as u32;
        let mut n = 0;
        let summary = quiz
            .simulate_quiz(|item| {
                n += 1;
                if n % 2 == 0 {
                    "?!?".to_string()
                } else {
                    item.english.clone()
                }
            })
            .unwrap();
        assert_eq!(summary.attempts, total);
        assert_eq!(summary.score, total.div_ceil(2));
    }

    #[test]
    fn test_flashcard_session_does_not_simulate() {
        let prefs = Preferences {
            selected_lessons: [LessonId(1)].into_iter().collect(),
            ..Default::default()
        };
        let store = ContentStore::bundled().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut cards = Session::new(build_session(&store, &prefs, &mut rng), &prefs);
        assert_eq!(cards.simulate_quiz(|item| item.english.clone()), None);
        assert_eq!(cards.attempts(), 0);
    }

    #[test]
    fn test_simulated_quiz_through_app() {
        let app = App::with_bundled_lessons(MemoryStore::new(), 99).unwrap();
        app.save_settings(SettingsUpdate {
            selected_lessons: Some([LessonId(5)].into_iter().collect()),
            study_mode: Some(StudyMode::Quiz),
            ..Default::default()
        });
        app.start_session().unwrap();

        loop {
            let Some(expected) = app
                .with_session(|session| session.current_item().map(|item| item.english.clone()))
                .flatten()
            else {
                break;
            };
            let graded = app.submit_quiz_answer(expected).unwrap();
            assert!(app.advance_quiz(graded.pending));
        }

        let DisplayState::Quiz(display) = app.display_state() else {
            panic!("expected the quiz screen");
        };
        assert!(!display.accepts_answers());
        assert_eq!(
            display.feedback.unwrap().to_string(),
            "Quiz complete! Final score: 6/6 (100%)"
        );
        assert!(matches!(
            app.with_session(|session| session.summary()).flatten(),
            Some(summary) if summary.percentage == 100
        ));
    }
}

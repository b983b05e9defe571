use lesson_utils::{ContentItem, ContentStore, LessonId};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::preferences::{ContentType, Preferences};

/// Walks the selected lessons in ascending ID order, yielding each lesson's words and then its phrases.
pub struct SelectedContent<'a> {
    lessons: Vec<LessonId>,
    content_type: ContentType,
    store: &'a ContentStore,
    current: std::iter::Chain<std::slice::Iter<'a, ContentItem>, std::slice::Iter<'a, ContentItem>>,
}

impl<'a> SelectedContent<'a> {
    pub fn new(store: &'a ContentStore, prefs: &Preferences) -> Self {
        let empty: &'a [ContentItem] = &[];
        Self {
            // BTreeSet iteration is ascending; reversed so `pop` visits the lowest ID first
            lessons: prefs.selected_lessons.iter().rev().copied().collect(),
            content_type: prefs.content_type,
            store,
            current: empty.iter().chain(empty.iter()),
        }
    }

    fn next_lesson(&mut self) -> Option<()> {
        loop {
            let id = self.lessons.pop()?;
            let Some(lesson) = self.store.lesson(id) else {
                log::warn!("Lesson {id} is selected but does not exist");
                continue;
            };
            let words: &'a [ContentItem] = if self.content_type.includes_words() {
                &lesson.vocabulary
            } else {
                &[]
            };
            let phrases: &'a [ContentItem] = if self.content_type.includes_phrases() {
                &lesson.phrases
            } else {
                &[]
            };
            self.current = words.iter().chain(phrases.iter());
            return Some(());
        }
    }
}

impl<'a> Iterator for SelectedContent<'a> {
    type Item = &'a ContentItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(item);
            }
            self.next_lesson()?;
        }
    }
}

/// The item list for a new session. Shuffled and quiz sessions get a uniform random permutation.
/// An empty result means there is nothing to study.
pub fn build_session<R: Rng + ?Sized>(
    store: &ContentStore,
    prefs: &Preferences,
    rng: &mut R,
) -> Vec<ContentItem> {
    let mut items: Vec<ContentItem> = SelectedContent::new(store, prefs).cloned().collect();
    if prefs.study_mode.is_randomized() {
        items.shuffle(rng);
    }
    items
}

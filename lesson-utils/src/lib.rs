//! Lesson content shared by the frontend and the terminal client.
//! A lesson is a bundle of vocabulary words and phrases. Lessons ship as JSON files that are embedded in the binary,
//! and are never modified once loaded.

use std::collections::BTreeMap;

const BUNDLED_LESSONS: [(u32, &str); 5] = [
    (1, include_str!("../lessons/lesson1.json")),
    (2, include_str!("../lessons/lesson2.json")),
    (3, include_str!("../lessons/lesson3.json")),
    (4, include_str!("../lessons/lesson4.json")),
    (5, include_str!("../lessons/lesson5.json")),
];

#[derive(
    Clone, Copy, Debug, serde::Serialize, serde::Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd,
)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(transparent)]
pub struct LessonId(pub u32);

impl std::fmt::Display for LessonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, Eq, PartialEq, Hash)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    Word,
    Phrase,
}

/// One Thai/English pair. Associations are mnemonic hints and only ever shown for words.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, Eq, PartialEq, Hash)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub thai: String,
    pub english: String,
    pub association_en: Option<String>,
    pub association_ru: Option<String>,
    pub kind: ContentKind,
}

impl ContentItem {
    pub fn is_word(&self) -> bool {
        self.kind == ContentKind::Word
    }
}

/// An item as it appears in a lesson file. The kind is implied by which list it is in.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonFileItem {
    thai: String,
    english: String,
    #[serde(default)]
    association_en: Option<String>,
    #[serde(default)]
    association_ru: Option<String>,
}

impl LessonFileItem {
    fn into_item(self, kind: ContentKind) -> ContentItem {
        ContentItem {
            thai: self.thai,
            english: self.english,
            association_en: self.association_en,
            association_ru: self.association_ru,
            kind,
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct LessonFile {
    #[serde(default)]
    vocabulary: Vec<LessonFileItem>,
    #[serde(default)]
    phrases: Vec<LessonFileItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LessonRecord {
    pub vocabulary: Vec<ContentItem>,
    pub phrases: Vec<ContentItem>,
}

impl LessonRecord {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let LessonFile {
            vocabulary,
            phrases,
        } = serde_json::from_str(json)?;
        Ok(Self {
            vocabulary: vocabulary
                .into_iter()
                .map(|item| item.into_item(ContentKind::Word))
                .collect(),
            phrases: phrases
                .into_iter()
                .map(|item| item.into_item(ContentKind::Phrase))
                .collect(),
        })
    }
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub id: LessonId,
    pub word_count: usize,
    pub phrase_count: usize,
}

impl std::fmt::Display for LessonSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let LessonSummary {
            id,
            word_count,
            phrase_count,
        } = self;
        match (word_count, phrase_count) {
            (0, 0) => write!(f, "Lesson {id} ()"),
            (words, 0) => write!(f, "Lesson {id} ({words} words)"),
            (0, phrases) => write!(f, "Lesson {id} ({phrases} phrases)"),
            (words, phrases) => write!(f, "Lesson {id} ({words} words, {phrases} phrases)"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ContentStore {
    lessons: BTreeMap<LessonId, LessonRecord>,
}

impl ContentStore {
    /// The lessons compiled into the binary.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        let lessons = BUNDLED_LESSONS
            .iter()
            .map(|(id, json)| Ok((LessonId(*id), LessonRecord::from_json(json)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        Ok(Self::from_lessons(lessons))
    }

    pub fn from_lessons(lessons: impl IntoIterator<Item = (LessonId, LessonRecord)>) -> Self {
        Self {
            lessons: lessons.into_iter().collect(),
        }
    }

    pub fn lesson(&self, id: LessonId) -> Option<&LessonRecord> {
        self.lessons.get(&id)
    }

    /// Lesson IDs in ascending order.
    pub fn lesson_ids(&self) -> impl Iterator<Item = LessonId> + '_ {
        self.lessons.keys().copied()
    }

    pub fn summaries(&self) -> Vec<LessonSummary> {
        self.lessons
            .iter()
            .map(|(id, lesson)| LessonSummary {
                id: *id,
                word_count: lesson.vocabulary.len(),
                phrase_count: lesson.phrases.len(),
            })
            .collect()
    }
}

use std::collections::BTreeSet;

use lesson_utils::LessonId;
use stash::{KeyValueStore, StorageError};

const SELECTED_LESSONS_KEY: &str = "selectedLessons";
const STUDY_MODE_KEY: &str = "selectedMode";
const DIRECTION_KEY: &str = "translationDirection";
const CONTENT_TYPE_KEY: &str = "selectedContentType";
const SHOW_ASSOCIATIONS_KEY: &str = "showAssociations";
const ASSOCIATION_LANGUAGES_KEY: &str = "associationLanguages";

/// Implements `as_str`/`from_stored` for an enum persisted under a fixed set of names.
macro_rules! stored_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }

            pub fn from_stored(name: &str) -> Option<Self> {
                match name {
                    $($name => Some($ty::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash,
)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Words,
    Phrases,
    Both,
}

impl ContentType {
    pub fn includes_words(self) -> bool {
        matches!(self, ContentType::Words | ContentType::Both)
    }

    pub fn includes_phrases(self) -> bool {
        matches!(self, ContentType::Phrases | ContentType::Both)
    }
}

stored_names!(ContentType {
    Words => "words",
    Phrases => "phrases",
    Both => "both",
});

#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash,
)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    #[default]
    Ordered,
    Shuffled,
    Quiz,
}

impl StudyMode {
    pub fn is_randomized(self) -> bool {
        matches!(self, StudyMode::Shuffled | StudyMode::Quiz)
    }
}

stored_names!(StudyMode {
    Ordered => "ordered",
    Shuffled => "shuffled",
    Quiz => "quiz",
});

#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq, Hash,
)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub enum Direction {
    #[default]
    #[serde(rename = "thai-english")]
    ThaiToEnglish,
    #[serde(rename = "english-thai")]
    EnglishToThai,
}

stored_names!(Direction {
    ThaiToEnglish => "thai-english",
    EnglishToThai => "english-thai",
});

#[derive(
    Clone,
    Copy,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "lowercase")]
pub enum AssociationLanguage {
    En,
    Ru,
}

stored_names!(AssociationLanguage {
    En => "en",
    Ru => "ru",
});

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub selected_lessons: BTreeSet<LessonId>,
    pub content_type: ContentType,
    pub study_mode: StudyMode,
    pub direction: Direction,
    pub show_associations: bool,
    pub association_languages: BTreeSet<AssociationLanguage>,
}

/// A settings form submission. Fields left as `None` keep their current value.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub selected_lessons: Option<BTreeSet<LessonId>>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub study_mode: Option<StudyMode>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub show_associations: Option<bool>,
    #[serde(default)]
    pub association_languages: Option<BTreeSet<AssociationLanguage>>,
}

impl Preferences {
    /// Checking a lesson box selects it, unchecking deselects it. Not persisted until the next save.
    pub fn toggle_lesson(&mut self, id: LessonId) {
        if !self.selected_lessons.remove(&id) {
            self.selected_lessons.insert(id);
        }
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        let SettingsUpdate {
            selected_lessons,
            content_type,
            study_mode,
            direction,
            show_associations,
            association_languages,
        } = update;

        if let Some(selected_lessons) = selected_lessons {
            self.selected_lessons = selected_lessons;
        }
        if let Some(content_type) = content_type {
            self.content_type = content_type;
        }
        if let Some(study_mode) = study_mode {
            self.study_mode = study_mode;
        }
        if let Some(direction) = direction {
            self.direction = direction;
        }
        if let Some(show_associations) = show_associations {
            self.show_associations = show_associations;
        }
        if let Some(association_languages) = association_languages {
            self.association_languages = association_languages;
        }
    }

    /// Writes every field under its own key. Stops at the first key that fails to write.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let lessons: Vec<u32> = self.selected_lessons.iter().map(|id| id.0).collect();
        store.set(SELECTED_LESSONS_KEY, &serde_json::to_string(&lessons)?)?;
        store.set(STUDY_MODE_KEY, self.study_mode.as_str())?;
        store.set(DIRECTION_KEY, self.direction.as_str())?;
        store.set(CONTENT_TYPE_KEY, self.content_type.as_str())?;
        store.set(
            SHOW_ASSOCIATIONS_KEY,
            if self.show_associations { "true" } else { "false" },
        )?;
        let languages: Vec<&str> = self
            .association_languages
            .iter()
            .map(|language| language.as_str())
            .collect();
        store.set(
            ASSOCIATION_LANGUAGES_KEY,
            &serde_json::to_string(&languages)?,
        )?;
        Ok(())
    }

    /// Never fails: anything missing, unreadable or malformed falls back to that field's default.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();

        let selected_lessons = read(store, SELECTED_LESSONS_KEY)
            .and_then(|raw| parse_json_set::<u32>(SELECTED_LESSONS_KEY, &raw))
            .map(|ids| ids.into_iter().map(LessonId).collect())
            .unwrap_or(defaults.selected_lessons);

        let study_mode = read(store, STUDY_MODE_KEY)
            .and_then(|raw| parse_name(STUDY_MODE_KEY, &raw, StudyMode::from_stored))
            .unwrap_or(defaults.study_mode);

        let direction = read(store, DIRECTION_KEY)
            .and_then(|raw| parse_name(DIRECTION_KEY, &raw, Direction::from_stored))
            .unwrap_or(defaults.direction);

        let content_type = read(store, CONTENT_TYPE_KEY)
            .and_then(|raw| parse_name(CONTENT_TYPE_KEY, &raw, ContentType::from_stored))
            .unwrap_or(defaults.content_type);

        let show_associations = read(store, SHOW_ASSOCIATIONS_KEY)
            .map(|raw| raw == "true")
            .unwrap_or(defaults.show_associations);

        let association_languages = read(store, ASSOCIATION_LANGUAGES_KEY)
            .and_then(|raw| parse_json_set::<String>(ASSOCIATION_LANGUAGES_KEY, &raw))
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| {
                        let language = AssociationLanguage::from_stored(name);
                        if language.is_none() {
                            log::warn!("Ignoring unknown association language {name:?}");
                        }
                        language
                    })
                    .collect()
            })
            .unwrap_or(defaults.association_languages);

        Self {
            selected_lessons,
            content_type,
            study_mode,
            direction,
            show_associations,
            association_languages,
        }
    }
}

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    store
        .get(key)
        .inspect_err(|e| log::error!("Error reading preference {key}: {e}"))
        .ok()
        .flatten()
}

fn parse_json_set<T: serde::de::DeserializeOwned + Ord>(
    key: &str,
    raw: &str,
) -> Option<BTreeSet<T>> {
    serde_json::from_str::<Vec<T>>(raw)
        .inspect_err(|e| log::warn!("Ignoring malformed preference {key}={raw:?}: {e}"))
        .ok()
        .map(|values| values.into_iter().collect())
}

fn parse_name<T>(key: &str, raw: &str, from_stored: fn(&str) -> Option<T>) -> Option<T> {
    let value = from_stored(raw);
    if value.is_none() {
        log::warn!("Ignoring unknown value for preference {key}: {raw:?}");
    }
    value
}

mod display;
mod notifications;
mod preferences;
mod session;
mod session_builder;
#[cfg(test)]
mod simulation;
mod utils;

use std::cell::RefCell;
use std::sync::Arc;

use lesson_utils::{ContentStore, LessonId, LessonSummary};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use stash::KeyValueStore;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub use display::{
    AssociationSettings, CardDisplay, DisplayState, DisplayText, Feedback, Progress, QuizDisplay,
    QuizSummary, Sides,
};
pub use notifications::{ListenerKey, Topic};
pub use preferences::{
    AssociationLanguage, ContentType, Direction, Preferences, SettingsUpdate, StudyMode,
};
pub use session::{
    CORRECT_ADVANCE_DELAY, Graded, INCORRECT_ADVANCE_DELAY, PendingAdvance, Session, SessionMode,
    is_correct,
};
pub use session_builder::{SelectedContent, build_session};

use crate::notifications::Notifier;

pub const START_HINT: &str = "Please select lessons in Settings first";

#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartSessionError {
    #[error("Please select lessons in Settings first!")]
    NoLessonsSelected,
    #[error("No content available! Please select lessons in Settings.")]
    NoContent,
}

#[cfg(target_arch = "wasm32")]
impl From<StartSessionError> for JsValue {
    fn from(error: StartSessionError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub struct App {
    // never hold one of these borrows while calling a listener; listeners call back into the app
    preferences: RefCell<Preferences>,
    session: RefCell<Option<Session>>,
    store: RefCell<Box<dyn KeyValueStore>>,
    rng: RefCell<ChaCha8Rng>,
    notifier: RefCell<Notifier>,

    content: Arc<ContentStore>,
}

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
#[cfg(target_arch = "wasm32")]
static LOGGER: std::sync::LazyLock<()> = std::sync::LazyLock::new(|| {
    utils::set_panic_hook();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

impl App {
    /// Loads preferences from `store`. Missing or malformed values fall back to defaults.
    pub fn new(content: ContentStore, store: impl KeyValueStore + 'static, seed: u64) -> Self {
        let preferences = Preferences::load(&store);
        log::debug!("Loaded preferences: {preferences:?}");
        Self {
            preferences: RefCell::new(preferences),
            session: RefCell::new(None),
            store: RefCell::new(Box::new(store)),
            rng: RefCell::new(ChaCha8Rng::seed_from_u64(seed)),
            notifier: RefCell::new(Notifier::default()),
            content: Arc::new(content),
        }
    }

    /// Same as [`App::new`] with the lessons compiled into the binary.
    pub fn with_bundled_lessons(
        store: impl KeyValueStore + 'static,
        seed: u64,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(ContentStore::bundled()?, store, seed))
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    /// `listener` runs once per changed topic after the intent that changed it returns.
    pub fn subscribe(&self, listener: impl Fn(Topic) + 'static) -> ListenerKey {
        self.notifier
            .borrow_mut()
            .register_listener(move |_, topic| listener(topic))
    }

    /// `None` when no session is running.
    pub fn with_session<T>(&self, f: impl FnOnce(&Session) -> T) -> Option<T> {
        self.session.borrow().as_ref().map(f)
    }

    fn mark_dirty(&self, topic: Topic) {
        self.notifier.borrow_mut().mark_dirty(topic);
    }

    /// Runs `f` on the current session, marking the session dirty if `f` reports a change.
    fn update_session(&self, f: impl FnOnce(&mut Session) -> bool) -> bool {
        let changed = self.session.borrow_mut().as_mut().is_some_and(f);
        if changed {
            self.mark_dirty(Topic::Session);
        }
        changed
    }

    fn flush_notifications(&self) {
        // do it like this to avoid holding the borrow while we call the callbacks
        let notifications = self.notifier.borrow_mut().drain_due_notifications();
        for notification in notifications {
            notification();
        }
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl App {
    /// Browser entry point: preferences live in `localStorage`, falling back to memory when it is unavailable.
    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen(constructor)]
    pub fn create() -> Result<App, JsValue> {
        // used to only initialize the logger once
        *LOGGER;

        let seed = utils::browser_seed();
        let content = ContentStore::bundled().map_err(|e| {
            log::error!("Bundled lessons failed to parse: {e}");
            JsValue::from_str(&e.to_string())
        })?;
        Ok(match stash::LocalStorage::new() {
            Ok(storage) => App::new(content, storage, seed),
            Err(e) => {
                log::error!("localStorage unavailable, preferences will not persist: {e}");
                App::new(content, stash::MemoryStore::new(), seed)
            }
        })
    }

    /// `callback` is called with the changed topic's name (`"preferences"` or `"session"`).
    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen(js_name = subscribe)]
    pub fn subscribe_js(&self, callback: js_sys::Function) -> ListenerKey {
        self.subscribe(move |topic| {
            let this = JsValue::null();
            let _ = callback.call1(&this, &JsValue::from_str(topic.as_str()));
        })
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn unsubscribe(&self, key: ListenerKey) {
        self.notifier.borrow_mut().unregister_listener(key)
    }

    // =======
    // settings
    // =======

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn preferences(&self) -> Preferences {
        self.preferences.borrow().clone()
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn lesson_summaries(&self) -> Vec<LessonSummary> {
        self.content.summaries()
    }

    /// Only changes the in-memory selection; `save_settings` persists it.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn toggle_lesson_selection(&self, lesson: u32) {
        let _flusher = FlushLater::new(self);
        self.preferences
            .borrow_mut()
            .toggle_lesson(LessonId(lesson));
        self.mark_dirty(Topic::Preferences);
    }

    /// Applies `update` and persists all preferences. Returns `false` if they could not be saved;
    /// the in-memory preferences are updated either way.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn save_settings(&self, update: SettingsUpdate) -> bool {
        let _flusher = FlushLater::new(self);
        self.preferences.borrow_mut().apply(update);
        self.mark_dirty(Topic::Preferences);

        let result = self
            .preferences
            .borrow()
            .save(self.store.borrow_mut().as_mut());
        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("Preferences not saved: {e}");
                false
            }
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn can_start(&self) -> bool {
        !self.preferences.borrow().selected_lessons.is_empty()
    }

    /// Why the start button is disabled, if it is.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn start_hint(&self) -> Option<String> {
        (!self.can_start()).then(|| START_HINT.to_string())
    }

    // =======
    // session
    // =======

    /// Builds a fresh session from the current preferences, replacing any running one.
    /// On error nothing changes.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn start_session(&self) -> Result<SessionMode, StartSessionError> {
        let _flusher = FlushLater::new(self);
        let prefs = self.preferences.borrow().clone();
        if prefs.selected_lessons.is_empty() {
            log::warn!("Not starting: no lessons selected");
            return Err(StartSessionError::NoLessonsSelected);
        }

        let items = build_session(&self.content, &prefs, &mut *self.rng.borrow_mut());
        if items.is_empty() {
            log::warn!(
                "Not starting: lessons {:?} have no {} content",
                prefs.selected_lessons,
                prefs.content_type
            );
            return Err(StartSessionError::NoContent);
        }

        let session = Session::new(items, &prefs);
        log::info!(
            "Starting {:?} session {} with {} items",
            session.mode(),
            session.id(),
            session.len()
        );
        let mode = session.mode();
        *self.session.borrow_mut() = Some(session);
        self.mark_dirty(Topic::Session);
        Ok(mode)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn end_session(&self) {
        let _flusher = FlushLater::new(self);
        if let Some(session) = self.session.borrow_mut().take() {
            log::info!("Ended session {}", session.id());
            self.mark_dirty(Topic::Session);
        }
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn flip(&self) -> bool {
        let _flusher = FlushLater::new(self);
        self.update_session(Session::flip)
    }

    /// `step` is -1 for previous, 1 for next.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn navigate(&self, step: i32) -> bool {
        let _flusher = FlushLater::new(self);
        self.update_session(|session| session.navigate(step))
    }

    /// Grades `answer` against the current quiz question. The caller schedules
    /// [`App::advance_quiz`] with the returned ticket after its delay.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn submit_quiz_answer(&self, answer: String) -> Option<Graded> {
        let _flusher = FlushLater::new(self);
        let graded = self
            .session
            .borrow_mut()
            .as_mut()
            .and_then(|session| session.submit_answer(&answer));
        if graded.is_some() {
            self.mark_dirty(Topic::Session);
        }
        graded
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn advance_quiz(&self, pending: PendingAdvance) -> bool {
        let _flusher = FlushLater::new(self);
        self.update_session(|session| session.advance(&pending))
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
    pub fn display_state(&self) -> DisplayState {
        let session = self.session.borrow();
        let Some(session) = session.as_ref() else {
            return DisplayState::Menu;
        };
        let display = match session.mode() {
            SessionMode::Flashcard => session.card_display().map(DisplayState::Flashcard),
            SessionMode::Quiz => session.quiz_display().map(DisplayState::Quiz),
        };
        display.unwrap_or(DisplayState::Menu)
    }
}

/// Flushes listeners when dropped, whichever path the intent returns through.
struct FlushLater<'a> {
    app: &'a App,
}

impl<'a> FlushLater<'a> {
    fn new(app: &'a App) -> Self {
        Self { app }
    }
}

impl<'a> Drop for FlushLater<'a> {
    fn drop(&mut self) {
        self.app.flush_notifications();
    }
}

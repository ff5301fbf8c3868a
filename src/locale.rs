//! Locale state and the typed-word easter egg.
//!
//! The page speaks English until a visitor types the secret word anywhere on
//! it. The switch flips the persona to Thai and unlocks the music deck;
//! typing the word again flips it back.
//!
//! State lives in one [`LocaleStore`] owned by the host. Anything that
//! renders locale-dependent copy subscribes to it:
//!
//! ```ignore
//! let mut store = LocaleStore::new(&LocaleConfig::default());
//! let id = store.subscribe(|state| println!("now {:?}", state.locale));
//!
//! store.handle_text("t");
//! store.handle_text("hai"); // prints "now Thai"
//! ```

use std::collections::VecDeque;

use tracing::info;

use crate::config::LocaleConfig;

/// Languages the site can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    Thai,
}

impl Locale {
    /// The other locale.
    pub fn toggled(self) -> Self {
        match self {
            Locale::English => Locale::Thai,
            Locale::Thai => Locale::English,
        }
    }

    /// BCP 47 tag.
    pub fn tag(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Thai => "th",
        }
    }

    /// Hero greeting for the persona.
    pub fn greeting(self) -> &'static str {
        match self {
            Locale::English => "Hello, we build things that run.",
            Locale::Thai => "สวัสดีครับ เราสร้างระบบที่ใช้งานได้จริง",
        }
    }

    /// Hero tagline for the persona.
    pub fn tagline(self) -> &'static str {
        match self {
            Locale::English => "IT services, infrastructure and software for small teams.",
            Locale::Thai => "บริการไอที โครงสร้างพื้นฐาน และซอฟต์แวร์สำหรับทีมเล็ก",
        }
    }
}

/// Snapshot handed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocaleState {
    pub locale: Locale,
    /// The music deck is only reachable from the Thai persona.
    pub music_unlocked: bool,
}

impl LocaleState {
    fn for_locale(locale: Locale) -> Self {
        Self {
            locale,
            music_unlocked: locale == Locale::Thai,
        }
    }
}

/// Rolling-window matcher over typed characters.
///
/// Keeps the last `N` letters (where `N` is the length of the word) and
/// reports a match whenever they spell the word, ignoring case. Anything
/// that is not a letter resets the window.
#[derive(Debug, Clone)]
pub struct KeystrokeMatcher {
    word: Vec<char>,
    window: VecDeque<char>,
}

impl KeystrokeMatcher {
    pub fn new(word: &str) -> Self {
        let word: Vec<char> = word.chars().flat_map(char::to_lowercase).collect();
        Self {
            window: VecDeque::with_capacity(word.len()),
            word,
        }
    }

    /// Feed one character. Returns `true` when it completes the word.
    pub fn push(&mut self, c: char) -> bool {
        if self.word.is_empty() {
            return false;
        }
        if !c.is_alphabetic() {
            self.window.clear();
            return false;
        }
        for lower in c.to_lowercase() {
            if self.window.len() == self.word.len() {
                self.window.pop_front();
            }
            self.window.push_back(lower);
        }
        if self.window.iter().eq(self.word.iter()) {
            self.window.clear();
            true
        } else {
            false
        }
    }

    /// Feed a string. Returns how many times the word was completed.
    pub fn push_str(&mut self, text: &str) -> usize {
        text.chars().filter(|&c| self.push(c)).count()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

/// Handle returned by [`LocaleStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(LocaleState)>;

/// Owner of the locale state.
pub struct LocaleStore {
    state: LocaleState,
    matcher: KeystrokeMatcher,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl LocaleStore {
    pub fn new(config: &LocaleConfig) -> Self {
        Self {
            state: LocaleState::default(),
            matcher: KeystrokeMatcher::new(&config.secret_word),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> LocaleState {
        self.state
    }

    pub fn locale(&self) -> Locale {
        self.state.locale
    }

    /// Register a listener called on every change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(LocaleState) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(other, _)| *other != id);
        self.listeners.len() != before
    }

    /// Switch locale. Listeners hear about it only if it changed.
    pub fn set_locale(&mut self, locale: Locale) {
        if locale == self.state.locale {
            return;
        }
        self.state = LocaleState::for_locale(locale);
        info!(locale = locale.tag(), "locale switched");
        for (_, listener) in &mut self.listeners {
            listener(self.state);
        }
    }

    pub fn toggle(&mut self) {
        self.set_locale(self.state.locale.toggled());
    }

    /// Feed typed text. Each completed secret word toggles the locale.
    pub fn handle_text(&mut self, text: &str) {
        for _ in 0..self.matcher.push_str(text) {
            self.toggle();
        }
    }
}

impl std::fmt::Debug for LocaleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleStore")
            .field("state", &self.state)
            .field("matcher", &self.matcher)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_matcher_suffix() {
        let mut matcher = KeystrokeMatcher::new("thai");
        assert_eq!(matcher.push_str("xxthx"), 0);
        assert_eq!(matcher.push_str("tTHai"), 1);
    }

    #[test]
    fn test_matcher_resets_on_non_letters() {
        let mut matcher = KeystrokeMatcher::new("thai");
        assert_eq!(matcher.push_str("th ai"), 0);
        assert_eq!(matcher.push_str("thai thai"), 2);
    }

    #[test]
    fn test_empty_word_never_matches() {
        let mut matcher = KeystrokeMatcher::new("");
        assert_eq!(matcher.push_str("anything"), 0);
    }

    #[test]
    fn test_store_toggles_and_unlocks() {
        let mut store = LocaleStore::new(&LocaleConfig::default());
        assert_eq!(store.locale(), Locale::English);
        assert!(!store.state().music_unlocked);

        store.handle_text("th");
        store.handle_text("ai");
        assert_eq!(store.locale(), Locale::Thai);
        assert!(store.state().music_unlocked);

        store.handle_text("thai");
        assert_eq!(store.locale(), Locale::English);
        assert!(!store.state().music_unlocked);
    }

    #[test]
    fn test_subscribers_notified_once_per_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = LocaleStore::new(&LocaleConfig::default());
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |state| sink.borrow_mut().push(state.locale));

        store.set_locale(Locale::English);
        store.set_locale(Locale::Thai);
        store.set_locale(Locale::Thai);
        assert_eq!(*seen.borrow(), vec![Locale::Thai]);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.toggle();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_persona_copy_differs() {
        assert_ne!(Locale::English.greeting(), Locale::Thai.greeting());
        assert_eq!(Locale::Thai.tag(), "th");
    }
}

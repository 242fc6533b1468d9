use crate::error::{Error, Result};
use crate::view::ViewBinder;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, warn};

/// Translation table shipped with the binary
const BUNDLED_TRANSLATIONS: &str = include_str!("../assets/i18n/translations.json");

/// Supported display languages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    En,
    Nl,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Nl];

    /// Parses a language code, returning `None` for unsupported codes
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "nl" => Some(Language::Nl),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Nl => "nl",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Static language code -> key -> string mapping
#[derive(Debug, Clone)]
pub struct LanguageTable {
    en: Map<String, Value>,
    nl: Map<String, Value>,
}

impl LanguageTable {
    /// Loads the table embedded in the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_TRANSLATIONS)
    }

    /// Loads a table from a JSON file on disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parses a table and checks that every language carries the same keys
    pub fn from_json(json: &str) -> Result<Self> {
        let mut root: Map<String, Value> = serde_json::from_str(json)?;
        let mut take = |language: Language| match root.remove(language.code()) {
            Some(Value::Object(entries)) => Ok(entries),
            _ => Err(Error::MissingLanguage(language.code().to_string())),
        };
        let table = LanguageTable {
            en: take(Language::En)?,
            nl: take(Language::Nl)?,
        };

        let en_keys = key_paths(&table.en);
        let nl_keys = key_paths(&table.nl);
        if en_keys != nl_keys {
            let differing: Vec<String> = en_keys.symmetric_difference(&nl_keys).cloned().collect();
            return Err(Error::KeyMismatch(differing.join(", ")));
        }

        debug!(keys = en_keys.len(), "loaded translation table");
        Ok(table)
    }

    fn entries(&self, language: Language) -> &Map<String, Value> {
        match language {
            Language::En => &self.en,
            Language::Nl => &self.nl,
        }
    }

    /// Resolves a dot-separated key path, returning `None` when any segment is missing
    pub fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.entries(language).get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        current.as_str()
    }

    /// Every leaf key path, dot-separated
    pub fn keys(&self) -> BTreeSet<String> {
        key_paths(&self.en)
    }
}

/// Collects dot-separated paths to every string leaf of a nested object
fn key_paths(entries: &Map<String, Value>) -> BTreeSet<String> {
    let mut paths = BTreeSet::new();
    let mut stack: Vec<(String, &Map<String, Value>)> = vec![(String::new(), entries)];
    while let Some((prefix, map)) = stack.pop() {
        for (key, value) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                Value::Object(nested) => stack.push((path, nested)),
                _ => {
                    paths.insert(path);
                }
            }
        }
    }
    paths
}

/// Callback notified with the new language after a successful switch
pub type LanguageObserver = Rc<dyn Fn(Language)>;

/// Tracks the active language and notifies observers when it changes
pub struct LanguageSwitcher {
    table: LanguageTable,
    current: Language,
    observers: Vec<LanguageObserver>,
}

impl LanguageSwitcher {
    pub fn new(table: LanguageTable, initial: Language, view: &mut dyn ViewBinder) -> Self {
        view.set_document_language(initial);
        view.set_active_language_button(initial);
        LanguageSwitcher {
            table,
            current: initial,
            observers: Vec::new(),
        }
    }

    pub fn language(&self) -> Language {
        self.current
    }

    pub fn table(&self) -> &LanguageTable {
        &self.table
    }

    /// Switches to `code`. Unsupported codes and the active language are ignored.
    ///
    /// Returns whether the language changed.
    pub fn set_language(&mut self, code: &str, view: &mut dyn ViewBinder) -> bool {
        let Some(language) = Language::from_code(code) else {
            debug!(code, "ignoring unsupported language");
            return false;
        };
        if language == self.current {
            return false;
        }

        self.current = language;
        view.set_document_language(language);
        view.set_active_language_button(language);
        debug!(%language, observers = self.observers.len(), "language changed");

        for observer in &self.observers {
            observer(language);
        }
        true
    }

    /// Registers an observer; registering the same `Rc` twice has no effect
    pub fn add_observer(&mut self, observer: LanguageObserver) {
        if !self.observers.iter().any(|o| Rc::ptr_eq(o, &observer)) {
            self.observers.push(observer);
        }
    }

    pub fn remove_observer(&mut self, observer: &LanguageObserver) {
        self.observers.retain(|o| !Rc::ptr_eq(o, observer));
    }

    /// Translates a key in the active language, falling back to the key itself
    pub fn translate(&self, key: &str) -> String {
        self.translate_in(self.current, key)
    }

    /// Translates a key in a specific language, falling back to the key itself
    pub fn translate_in(&self, language: Language, key: &str) -> String {
        match self.table.lookup(language, key) {
            Some(text) => text.to_string(),
            None => {
                warn!(key, %language, "translation key not found");
                key.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::RecordingView;
    use std::cell::RefCell;

    fn switcher(view: &mut RecordingView) -> LanguageSwitcher {
        let table = LanguageTable::bundled().unwrap();
        LanguageSwitcher::new(table, Language::En, view)
    }

    #[test]
    fn every_key_translates_to_the_stored_string() {
        let mut view = RecordingView::default();
        let mut switcher = switcher(&mut view);
        let keys = switcher.table().keys();
        for language in Language::ALL {
            switcher.set_language(language.code(), &mut view);
            for key in &keys {
                let expected = switcher.table().lookup(language, key).unwrap().to_string();
                assert_eq!(switcher.translate(key), expected);
            }
        }
        assert_eq!(switcher.translate("startButton"), "Start Ervaring");
    }

    #[test]
    fn glossary_keys_are_present() {
        let table = LanguageTable::bundled().unwrap();
        for key in [
            "loading",
            "permissionTitle",
            "permissionText",
            "startButton",
            "placementInstructions",
            "placeButton",
            "resetButton",
            "helpButton",
            "closeButton",
            "checkout",
            "offers",
            "sausage",
            "helpTitle",
            "helpText",
            "entrance",
            "exit",
            "checkoutDesc",
            "offersDesc",
            "sausageDesc",
        ] {
            assert!(table.lookup(Language::Nl, key).is_some(), "missing {key}");
        }
        assert_eq!(table.keys().len(), 19);
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        let mut view = RecordingView::default();
        let switcher = switcher(&mut view);
        assert_eq!(switcher.translate("nonexistent.key"), "nonexistent.key");
        // A string leaf cannot be descended into
        assert_eq!(switcher.translate("loading.more"), "loading.more");
    }

    #[test]
    fn nested_keys_resolve_by_path() {
        let json = r#"{"en": {"menu": {"open": "Open"}}, "nl": {"menu": {"open": "Openen"}}}"#;
        let table = LanguageTable::from_json(json).unwrap();
        assert_eq!(table.lookup(Language::Nl, "menu.open"), Some("Openen"));
        assert_eq!(table.lookup(Language::En, "menu"), None);
    }

    #[test]
    fn mismatched_key_sets_are_rejected() {
        let json = r#"{"en": {"a": "A", "b": "B"}, "nl": {"a": "A"}}"#;
        assert!(matches!(
            LanguageTable::from_json(json),
            Err(Error::KeyMismatch(keys)) if keys == "b"
        ));
        assert!(matches!(
            LanguageTable::from_json(r#"{"en": {}}"#),
            Err(Error::MissingLanguage(code)) if code == "nl"
        ));
    }

    #[test]
    fn unsupported_or_active_language_is_a_no_op() {
        let mut view = RecordingView::default();
        let mut switcher = switcher(&mut view);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        let observer: LanguageObserver =
            Rc::new(move |language: Language| sink.borrow_mut().push(language));
        switcher.add_observer(observer);
        view.document_language = None;

        assert!(!switcher.set_language("de", &mut view));
        assert!(!switcher.set_language("en", &mut view));
        assert_eq!(switcher.language(), Language::En);
        assert!(calls.borrow().is_empty());
        assert_eq!(view.document_language, None);
    }

    #[test]
    fn observers_run_once_in_registration_order() {
        let mut view = RecordingView::default();
        let mut switcher = switcher(&mut view);
        let calls = Rc::new(RefCell::new(Vec::new()));

        let first_sink = calls.clone();
        let first: LanguageObserver = Rc::new(move |language: Language| {
            first_sink.borrow_mut().push(("first", language))
        });
        let second_sink = calls.clone();
        let second: LanguageObserver = Rc::new(move |language: Language| {
            second_sink.borrow_mut().push(("second", language))
        });

        switcher.add_observer(first.clone());
        switcher.add_observer(second);
        switcher.add_observer(first);

        assert!(switcher.set_language("nl", &mut view));
        assert_eq!(
            *calls.borrow(),
            vec![("first", Language::Nl), ("second", Language::Nl)]
        );
        assert_eq!(view.document_language, Some(Language::Nl));
        assert_eq!(view.active_language, Some(Language::Nl));
    }

    #[test]
    fn removed_observer_is_not_notified() {
        let mut view = RecordingView::default();
        let mut switcher = switcher(&mut view);
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        let observer: LanguageObserver = Rc::new(move |_: Language| *sink.borrow_mut() += 1);
        let stranger: LanguageObserver = Rc::new(|_: Language| {});

        switcher.add_observer(observer.clone());
        switcher.remove_observer(&stranger);
        switcher.set_language("nl", &mut view);
        switcher.remove_observer(&observer);
        switcher.set_language("en", &mut view);

        assert_eq!(*calls.borrow(), 1);
    }
}

use crate::i18n::{Language, LanguageSwitcher};
use crate::navigation::Destination;
use std::collections::BTreeMap;

/// UI panels the session shows and hides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Panel {
    Loading,
    Permission,
    Placement,
    Navigation,
    Controls,
    Help,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Loading,
        Panel::Permission,
        Panel::Placement,
        Panel::Navigation,
        Panel::Controls,
        Panel::Help,
    ];
}

/// Capability through which the core touches the user interface
pub trait ViewBinder {
    fn set_panel_visible(&mut self, panel: Panel, visible: bool);
    /// Locale attribute of the root document
    fn set_document_language(&mut self, language: Language);
    fn set_active_language_button(&mut self, language: Language);
    fn set_active_destination(&mut self, destination: Option<Destination>);
}

/// Translation keys bound to each panel, in display order
fn panel_keys(panel: Panel) -> &'static [&'static str] {
    match panel {
        Panel::Loading => &["loading"],
        Panel::Permission => &["permissionTitle", "permissionText", "startButton"],
        Panel::Placement => &["placementInstructions", "placeButton"],
        Panel::Navigation => &[],
        Panel::Controls => &["resetButton", "helpButton"],
        Panel::Help => &["helpTitle", "helpText", "closeButton"],
    }
}

/// Key hint shown in front of a bound label
fn key_hint(key: &str) -> Option<&'static str> {
    match key {
        "startButton" | "placeButton" => Some("Enter"),
        "resetButton" => Some("r"),
        "helpButton" => Some("h"),
        "closeButton" => Some("c"),
        _ => None,
    }
}

/// One line of overlay text
#[derive(Clone, Debug, PartialEq)]
pub struct HudLine {
    pub text: String,
    pub active: bool,
}

/// Terminal heads-up display: panel state plus the translated text bound to it
#[derive(Debug, Default)]
pub struct Hud {
    visible: BTreeMap<Panel, bool>,
    document_language: Option<Language>,
    active_language: Option<Language>,
    active_destination: Option<Destination>,
    labels: BTreeMap<&'static str, String>,
    destination_labels: Vec<(Destination, String)>,
}

impl Hud {
    /// A display showing only the loading panel
    pub fn new() -> Self {
        let mut hud = Hud::default();
        hud.visible.insert(Panel::Loading, true);
        hud
    }

    pub fn is_visible(&self, panel: Panel) -> bool {
        self.visible.get(&panel).copied().unwrap_or(false)
    }

    pub fn document_language(&self) -> Option<Language> {
        self.document_language
    }

    pub fn active_destination(&self) -> Option<Destination> {
        self.active_destination
    }

    /// Re-binds every label to the switcher's active language
    pub fn retranslate(&mut self, switcher: &LanguageSwitcher) {
        self.labels.clear();
        for panel in Panel::ALL {
            for &key in panel_keys(panel) {
                self.labels.insert(key, switcher.translate(key));
            }
        }
        // Destination buttons always carry both languages
        self.destination_labels = Destination::ALL
            .iter()
            .map(|&destination| {
                let id = destination.id();
                let en = switcher.translate_in(Language::En, id);
                let nl = switcher.translate_in(Language::Nl, id);
                (destination, format!("{en} / {nl}"))
            })
            .collect();
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Lines of every visible panel, top to bottom
    pub fn lines(&self) -> Vec<HudLine> {
        let mut lines = vec![HudLine {
            text: Language::ALL
                .iter()
                .map(|&language| {
                    let code = language.code().to_uppercase();
                    if self.active_language == Some(language) {
                        format!("[{code}]")
                    } else {
                        format!(" {code} ")
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            active: false,
        }];

        for panel in Panel::ALL {
            if !self.is_visible(panel) {
                continue;
            }
            if panel == Panel::Navigation {
                for (index, (destination, label)) in self.destination_labels.iter().enumerate() {
                    lines.push(HudLine {
                        text: format!("[{}] {label}", index + 1),
                        active: self.active_destination == Some(*destination),
                    });
                }
                continue;
            }
            for &key in panel_keys(panel) {
                let text = self.label(key).unwrap_or(key);
                let text = match key_hint(key) {
                    Some(hint) => format!("[{hint}] {text}"),
                    None => text.to_string(),
                };
                lines.push(HudLine {
                    text,
                    active: false,
                });
            }
        }
        lines
    }
}

impl ViewBinder for Hud {
    fn set_panel_visible(&mut self, panel: Panel, visible: bool) {
        self.visible.insert(panel, visible);
    }

    fn set_document_language(&mut self, language: Language) {
        self.document_language = Some(language);
    }

    fn set_active_language_button(&mut self, language: Language) {
        self.active_language = Some(language);
    }

    fn set_active_destination(&mut self, destination: Option<Destination>) {
        self.active_destination = destination;
    }
}

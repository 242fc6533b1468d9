use crate::camera::CameraProvider;
use crate::i18n::{Language, LanguageSwitcher, LanguageTable};
use crate::math::Vec3;
use crate::navigation::Destination;
use crate::scene::{NodeDesc, NodeHandle, SceneGraph};
use crate::store::StoreLayout;
use crate::view::{Panel, ViewBinder};
use std::fmt;
use tracing::{debug, info};

/// Where the store is anchored relative to the camera until it is placed
pub const ANCHOR_OFFSET: Vec3 = [0.0, 0.0, -5.0];

/// Placement phases of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingPermission,
    Ready,
    Placing,
    Placed,
}

/// Actions fired by the user interface
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    PermissionGranted,
    Start,
    Place,
    Reset,
    SelectDestination(String),
    ToggleHelp,
    CloseHelp,
    SetLanguage(String),
}

impl fmt::Display for UiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiAction::PermissionGranted => f.write_str("permission-granted"),
            UiAction::Start => f.write_str("start"),
            UiAction::Place => f.write_str("place"),
            UiAction::Reset => f.write_str("reset"),
            UiAction::SelectDestination(id) => write!(f, "select-destination({id})"),
            UiAction::ToggleHelp => f.write_str("toggle-help"),
            UiAction::CloseHelp => f.write_str("close-help"),
            UiAction::SetLanguage(code) => write!(f, "set-language({code})"),
        }
    }
}

/// Owns all per-session state and drives it from UI actions and frame ticks
pub struct Session<S, V, C> {
    scene: S,
    view: V,
    camera: C,
    language: LanguageSwitcher,
    anchor: NodeHandle,
    store: StoreLayout,
    phase: Phase,
    selected: Option<Destination>,
    help_visible: bool,
}

impl<S: SceneGraph, V: ViewBinder, C: CameraProvider> Session<S, V, C> {
    /// Builds the store into `scene` and shows the loading panel
    pub fn new(
        mut scene: S,
        mut view: V,
        camera: C,
        table: LanguageTable,
        language: Language,
    ) -> Self {
        let anchor_position = camera.anchor_from_camera_offset(&ANCHOR_OFFSET);
        let anchor = scene.add_node(None, NodeDesc::group("anchor").at(anchor_position));
        let store = StoreLayout::build(&mut scene, Some(anchor));
        let language = LanguageSwitcher::new(table, language, &mut view);

        for panel in Panel::ALL {
            view.set_panel_visible(panel, panel == Panel::Loading);
        }

        Session {
            scene,
            view,
            camera,
            language,
            anchor,
            store,
            phase: Phase::AwaitingPermission,
            selected: None,
            help_visible: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the store has been anchored into the view
    pub fn is_placed(&self) -> bool {
        self.phase == Phase::Placed
    }

    pub fn selected_destination(&self) -> Option<Destination> {
        self.selected
    }

    pub fn is_help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn language(&self) -> &LanguageSwitcher {
        &self.language
    }

    pub fn language_mut(&mut self) -> &mut LanguageSwitcher {
        &mut self.language
    }

    /// The view together with the switcher, for re-binding translated text
    pub fn view_with_language(&mut self) -> (&mut V, &LanguageSwitcher) {
        (&mut self.view, &self.language)
    }

    pub fn store(&self) -> &StoreLayout {
        &self.store
    }

    pub fn anchor(&self) -> NodeHandle {
        self.anchor
    }

    /// Applies a UI action. Returns false when the action does not apply in
    /// the current phase.
    pub fn dispatch(&mut self, action: UiAction) -> bool {
        let applied = match &action {
            UiAction::PermissionGranted => self.grant_permission(),
            UiAction::Start => self.start(),
            UiAction::Place => self.place(),
            UiAction::Reset => self.reset(),
            UiAction::SelectDestination(id) => self.select_destination(id),
            UiAction::ToggleHelp => self.set_help(!self.help_visible),
            UiAction::CloseHelp => self.help_visible && self.set_help(false),
            UiAction::SetLanguage(code) => self.language.set_language(code, &mut self.view),
        };
        if applied {
            debug!(%action, phase = ?self.phase, "action applied");
        } else {
            debug!(%action, phase = ?self.phase, "action ignored");
        }
        applied
    }

    /// Per-frame step: keep the anchor in front of the camera until placed,
    /// then animate the selected destination's arrows.
    pub fn frame(&mut self, elapsed: f64) {
        if self.phase == Phase::AwaitingPermission && self.camera.poll_permission(elapsed) {
            self.dispatch(UiAction::PermissionGranted);
        }

        if !self.is_placed() {
            let position = self.camera.anchor_from_camera_offset(&ANCHOR_OFFSET);
            self.scene.set_position(self.anchor, position);
            return;
        }

        if self.selected.is_some() {
            self.store.navigation.tick(&mut self.scene, elapsed);
        }
    }

    fn grant_permission(&mut self) -> bool {
        if self.phase != Phase::AwaitingPermission {
            return false;
        }
        self.phase = Phase::Ready;
        self.view.set_panel_visible(Panel::Loading, false);
        self.view.set_panel_visible(Panel::Permission, true);
        true
    }

    fn start(&mut self) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        self.phase = Phase::Placing;
        self.view.set_panel_visible(Panel::Permission, false);
        self.view.set_panel_visible(Panel::Placement, true);
        true
    }

    fn place(&mut self) -> bool {
        if self.phase != Phase::Placing {
            return false;
        }
        self.phase = Phase::Placed;
        self.scene.set_visible(self.store.root, true);
        self.view.set_panel_visible(Panel::Placement, false);
        self.view.set_panel_visible(Panel::Navigation, true);
        self.view.set_panel_visible(Panel::Controls, true);
        info!("store placed");
        true
    }

    fn reset(&mut self) -> bool {
        if self.phase != Phase::Placed {
            return false;
        }
        self.phase = Phase::Placing;
        self.scene.set_visible(self.store.root, false);
        self.store.navigation.hide_all(&mut self.scene);
        self.selected = None;
        self.view.set_active_destination(None);
        self.view.set_panel_visible(Panel::Navigation, false);
        self.view.set_panel_visible(Panel::Controls, false);
        self.view.set_panel_visible(Panel::Placement, true);
        info!("placement reset");
        true
    }

    fn select_destination(&mut self, id: &str) -> bool {
        if self.phase != Phase::Placed {
            return false;
        }
        self.selected = self.store.navigation.show_destination_id(&mut self.scene, id);
        self.view.set_active_destination(self.selected);
        self.selected.is_some()
    }

    fn set_help(&mut self, visible: bool) -> bool {
        // The help button only exists once the camera is available
        if self.phase == Phase::AwaitingPermission {
            return false;
        }
        self.help_visible = visible;
        self.view.set_panel_visible(Panel::Help, visible);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::VirtualCamera;
    use crate::scene::Scene;
    use crate::view::tests::RecordingView;

    type TestSession = Session<Scene, RecordingView, VirtualCamera>;

    fn session() -> TestSession {
        Session::new(
            Scene::new(),
            RecordingView::default(),
            VirtualCamera::new(1.0),
            LanguageTable::bundled().unwrap(),
            Language::En,
        )
    }

    fn placed_session() -> TestSession {
        let mut session = session();
        session.frame(1.0);
        assert!(session.dispatch(UiAction::Start));
        assert!(session.dispatch(UiAction::Place));
        session
    }

    #[test]
    fn permission_arrives_through_the_frame_loop() {
        let mut session = session();
        assert_eq!(session.view().panels.get(&Panel::Loading), Some(&true));
        session.frame(0.5);
        assert_eq!(session.phase(), Phase::AwaitingPermission);
        session.frame(1.0);
        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.view().panels.get(&Panel::Loading), Some(&false));
        assert_eq!(session.view().panels.get(&Panel::Permission), Some(&true));
    }

    #[test]
    fn out_of_phase_actions_are_rejected() {
        let mut session = session();
        assert!(!session.dispatch(UiAction::Start));
        assert!(!session.dispatch(UiAction::Place));
        assert!(!session.dispatch(UiAction::ToggleHelp));
        assert!(!session.dispatch(UiAction::SelectDestination("checkout".into())));
        assert_eq!(session.phase(), Phase::AwaitingPermission);

        session.frame(1.0);
        assert!(!session.dispatch(UiAction::Place));
        assert!(!session.dispatch(UiAction::Reset));
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn placing_shows_store_and_navigation() {
        let session = placed_session();
        assert!(session.is_placed());
        assert!(session.scene().is_effectively_visible(session.store().root));
        let panels = &session.view().panels;
        assert_eq!(panels.get(&Panel::Placement), Some(&false));
        assert_eq!(panels.get(&Panel::Navigation), Some(&true));
        assert_eq!(panels.get(&Panel::Controls), Some(&true));
    }

    #[test]
    fn unknown_destination_clears_the_selection() {
        let mut session = placed_session();
        assert!(session.dispatch(UiAction::SelectDestination("offers".into())));
        assert!(!session.dispatch(UiAction::SelectDestination("bakery".into())));
        assert_eq!(session.selected_destination(), None);
        assert_eq!(session.store().navigation.visible_destination(), None);
        assert_eq!(session.view().active_destination, None);
    }

    #[test]
    fn anchor_follows_camera_until_placed() {
        let mut session = session();
        session.frame(1.0);
        session.dispatch(UiAction::Start);
        session.camera_mut().walk(2.0);
        session.frame(1.1);
        let following = session.scene().node(session.anchor()).unwrap().desc.position;
        assert!(following[2] < -6.5);

        session.dispatch(UiAction::Place);
        session.camera_mut().walk(3.0);
        session.frame(1.2);
        let placed = session.scene().node(session.anchor()).unwrap().desc.position;
        assert_eq!(placed, following);
    }

    #[test]
    fn help_toggles_after_permission() {
        let mut session = session();
        session.frame(1.0);
        assert!(session.dispatch(UiAction::ToggleHelp));
        assert!(session.is_help_visible());
        assert!(session.dispatch(UiAction::CloseHelp));
        assert!(!session.dispatch(UiAction::CloseHelp));
        assert_eq!(session.view().panels.get(&Panel::Help), Some(&false));
    }

    #[test]
    fn language_can_change_in_any_phase() {
        let mut session = session();
        assert!(session.dispatch(UiAction::SetLanguage("nl".into())));
        assert!(!session.dispatch(UiAction::SetLanguage("fr".into())));
        assert_eq!(session.language().language(), Language::Nl);
        assert_eq!(session.view().document_language, Some(Language::Nl));
    }
}

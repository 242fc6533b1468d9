use approx::assert_relative_eq;
use std::cell::RefCell;
use std::rc::Rc;
use storenav::camera::VirtualCamera;
use storenav::i18n::{Language, LanguageObserver, LanguageTable};
use storenav::navigation::{compute_heading, Destination};
use storenav::scene::{Node, Scene};
use storenav::session::{Phase, Session, UiAction};
use storenav::view::{Hud, Panel};

type TestSession = Session<Scene, Hud, VirtualCamera>;

fn new_session() -> TestSession {
    Session::new(
        Scene::new(),
        Hud::new(),
        VirtualCamera::new(0.0),
        LanguageTable::bundled().expect("bundled translations"),
        Language::En,
    )
}

fn placed_session() -> TestSession {
    let mut session = new_session();
    session.frame(0.0);
    assert!(session.dispatch(UiAction::Start));
    assert!(session.dispatch(UiAction::Place));
    session
}

fn marker_nodes(session: &TestSession) -> Vec<Node> {
    session
        .store()
        .navigation
        .paths()
        .iter()
        .flat_map(|path| &path.markers)
        .map(|marker| session.scene().node(marker.node).cloned().unwrap())
        .collect()
}

#[test]
fn full_walkthrough_reaches_placed() {
    let mut session = new_session();
    assert_eq!(session.phase(), Phase::AwaitingPermission);
    assert!(session.view().is_visible(Panel::Loading));

    session.frame(0.0);
    assert_eq!(session.phase(), Phase::Ready);
    assert!(session.view().is_visible(Panel::Permission));

    assert!(session.dispatch(UiAction::Start));
    assert_eq!(session.phase(), Phase::Placing);
    assert!(session.view().is_visible(Panel::Placement));
    assert!(!session.is_placed());

    assert!(session.dispatch(UiAction::Place));
    assert!(session.is_placed());
    assert!(session.view().is_visible(Panel::Navigation));
    assert!(session.view().is_visible(Panel::Controls));
    assert!(!session.view().is_visible(Panel::Placement));
}

#[test]
fn selecting_checkout_shows_only_checkout_markers() {
    let mut session = placed_session();
    assert!(session.dispatch(UiAction::SelectDestination("checkout".to_string())));

    for path in session.store().navigation.paths() {
        let expected = path.destination == Destination::Checkout;
        for marker in &path.markers {
            assert_eq!(marker.visible, expected, "{} marker", path.destination);
            assert_eq!(session.scene().is_effectively_visible(marker.node), expected);
        }
    }
    assert_eq!(session.view().active_destination(), Some(Destination::Checkout));
}

#[test]
fn destinations_cannot_be_selected_before_placement() {
    let mut session = new_session();
    session.frame(0.0);
    session.dispatch(UiAction::Start);
    assert!(!session.dispatch(UiAction::SelectDestination("offers".to_string())));
    assert_eq!(session.selected_destination(), None);
    assert_eq!(session.store().navigation.visible_destination(), None);
}

#[test]
fn reset_clears_selection_and_stops_animation() {
    let mut session = placed_session();
    session.dispatch(UiAction::SelectDestination("sausage".to_string()));
    session.frame(2.0);

    assert!(session.dispatch(UiAction::Reset));
    assert_eq!(session.phase(), Phase::Placing);
    assert_eq!(session.selected_destination(), None);
    assert_eq!(session.view().active_destination(), None);
    assert!(session.view().is_visible(Panel::Placement));
    assert!(!session.view().is_visible(Panel::Navigation));
    assert!(!session.scene().is_effectively_visible(session.store().root));

    let before = marker_nodes(&session);
    session.frame(3.7);
    assert_eq!(marker_nodes(&session), before);
}

#[test]
fn animation_is_repeatable_for_the_same_time() {
    let mut session = placed_session();
    session.dispatch(UiAction::SelectDestination("offers".to_string()));

    session.frame(4.2);
    let first = marker_nodes(&session);
    session.frame(4.2);
    assert_eq!(marker_nodes(&session), first);

    let offers = session.store().navigation.path(Destination::Offers).unwrap();
    let scales: Vec<f64> = offers.markers.iter().map(|m| m.pose.scale).collect();
    // Phases differ per marker, so neighbours pulse out of step
    assert!(scales.windows(2).all(|pair| (pair[0] - pair[1]).abs() > 1e-6));
}

#[test]
fn heading_continues_the_last_bearing() {
    let path = [[0.0, 0.0, 0.0], [1.0, 0.0, 1.0]];
    assert_relative_eq!(compute_heading(&path, 0), 45f64.to_radians());
    assert_relative_eq!(compute_heading(&path, 1), 45f64.to_radians());
}

#[test]
fn language_observers_fire_in_registration_order() {
    let mut session = new_session();
    let calls: Rc<RefCell<Vec<(u8, Language)>>> = Rc::default();

    for id in [1u8, 2] {
        let sink = calls.clone();
        let observer: LanguageObserver = Rc::new(move |language: Language| {
            sink.borrow_mut().push((id, language))
        });
        session.language_mut().add_observer(observer);
    }

    assert!(session.dispatch(UiAction::SetLanguage("nl".to_string())));
    assert_eq!(*calls.borrow(), vec![(1, Language::Nl), (2, Language::Nl)]);
    assert_eq!(session.view().document_language(), Some(Language::Nl));

    let (hud, language) = session.view_with_language();
    hud.retranslate(language);
    assert_eq!(session.view().label("startButton"), Some("Start Ervaring"));
    assert_eq!(session.language().translate("nonexistent.key"), "nonexistent.key");
}

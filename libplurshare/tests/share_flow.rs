//! Full share flow: server picker, room list, composer, finish

use std::rc::Rc;
use std::sync::Arc;

use libplurshare::host::memory::{
    MemoryProvider, RecordingContext, SceneScreenFactory, VecViewStack,
};
use libplurshare::host::AttachmentProvider;
use libplurshare::{
    Action, AppState, NavigationController, Room, Scene, SceneTransition, Server, ShareConfig,
    ShareSession, Store, StoreSubscriber,
};
use tokio::runtime::Handle;

/// Screen logic stand-in: pushes the room list once a server is selected
struct ServerPicker;

impl StoreSubscriber for ServerPicker {
    fn state_updated(&self, store: &Store, state: &AppState) {
        if state.selected_server.is_some()
            && state.rooms.is_empty()
            && state.navigation.scene_transition == SceneTransition::None
            && !state.navigation.finished
        {
            store.dispatch(Action::SetRooms(vec![Room {
                id: "GENERAL".to_string(),
                name: "general".to_string(),
            }]));
            store.dispatch(Action::MakeSceneTransition(SceneTransition::Push(
                Scene::Rooms,
            )));
        }
    }
}

fn servers() -> Vec<Server> {
    vec![
        Server {
            name: "Open".to_string(),
            url: "https://open.rocket.chat".parse().unwrap(),
        },
        Server {
            name: "Internal".to_string(),
            url: "https://chat.example.org".parse().unwrap(),
        },
    ]
}

#[tokio::test]
async fn test_share_to_room_then_finish() {
    let mut config = ShareConfig::default();
    config.navigation.initial_scene = Scene::Servers;
    let session = ShareSession::new(config);
    let views_factory = SceneScreenFactory::new();
    let context = RecordingContext::new();
    let controller = NavigationController::new(
        Box::new(VecViewStack::new()),
        Box::new(views_factory.clone()),
        Box::new(context.clone()),
    );
    session.start(&controller);
    session.store().subscribe(Rc::new(ServerPicker));

    let providers: Vec<Arc<dyn AttachmentProvider>> =
        vec![Arc::new(MemoryProvider::text("meeting notes"))];
    let ingestion = session.ingestion().ingest(providers, &Handle::current());

    let store = session.store();
    store.dispatch(Action::SetServers(servers()));
    store.dispatch(Action::SelectServer(1));

    assert_eq!(controller.top_scene(), Some(Scene::Rooms));
    assert_eq!(
        store.state().selected_server().map(|s| s.name.as_str()),
        Some("Internal")
    );

    let general = store.state().rooms[0].clone();
    store.dispatch(Action::SetCurrentRoom(general));
    store.dispatch(Action::MakeSceneTransition(SceneTransition::Push(
        Scene::Compose,
    )));
    store.dispatch(Action::SetComposeText("see attached".to_string()));

    ingestion.join().await;
    session.pump();

    let state = store.state();
    assert!(state.can_send());
    assert_eq!(state.content.joined_text(), "meeting notes");
    assert_eq!(controller.depth(), 3);

    store.dispatch(Action::MakeSceneTransition(SceneTransition::Finish));

    assert!(session.is_finished());
    assert_eq!(context.cancel_count(), 1);
    assert_eq!(
        views_factory.made(),
        vec![Scene::Servers, Scene::Rooms, Scene::Compose]
    );
}

#[test]
fn test_reselecting_server_clears_room() {
    let session = ShareSession::new(ShareConfig::default());
    let store = session.store();
    store.dispatch(Action::SetServers(servers()));
    store.dispatch(Action::SelectServer(0));
    store.dispatch(Action::SetRooms(vec![Room {
        id: "GENERAL".to_string(),
        name: "general".to_string(),
    }]));
    store.dispatch(Action::SetCurrentRoom(Room {
        id: "GENERAL".to_string(),
        name: "general".to_string(),
    }));

    store.dispatch(Action::SelectServer(1));

    let state = store.state();
    assert!(state.rooms.is_empty());
    assert!(state.current_room.is_none());
    assert!(!state.can_send());
}

#[test]
fn test_out_of_range_selection_is_ignored() {
    let session = ShareSession::new(ShareConfig::default());
    let store = session.store();
    store.dispatch(Action::SetServers(servers()));
    store.dispatch(Action::SelectServer(0));

    store.dispatch(Action::SelectServer(7));

    assert_eq!(store.state().selected_server, Some(0));
}

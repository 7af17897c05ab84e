use std::io;
use std::sync::{Arc, Mutex};

use career_api::{GameService, ServiceError, SqliteProfileStore};
use career_core::{CareerConfig, CareerEngine, GameError};
use contracts::{Branch, Country, NewGame, PauseKind, PlayerAction};
use tracing::{Dispatch, Level};
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;

const DAY: i64 = 120_000;

fn service(dir: &tempfile::TempDir) -> GameService {
    let store = SqliteProfileStore::open(dir.path().join("service.sqlite")).expect("open store");
    GameService::new(CareerEngine::new(CareerConfig::builtin()), store)
}

fn request() -> NewGame {
    NewGame {
        profile_id: "flow".to_string(),
        player_name: "Choi".to_string(),
        country: Country::Kr,
        branch: Branch::Army,
        start_age: 20,
        time_scale: 1,
    }
}

#[derive(Clone, Default)]
struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn text(&self) -> String {
        let bytes = self.buffer.lock().expect("log buffer").clone();
        String::from_utf8(bytes).expect("utf8 logs")
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn profile_creation_is_logged_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut service = service(&dir);
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .finish();

    let dispatch = Dispatch::new(subscriber);
    tracing::dispatcher::with_default(&dispatch, || {
        service.create_profile(&request(), 0, 9).expect("create");
    });

    assert_eq!(logs.text().matches("profile.created").count(), 1);
}

#[test]
fn duplicate_profiles_conflict() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut service = service(&dir);
    service.create_profile(&request(), 0, 9).expect("create");
    assert!(matches!(
        service.create_profile(&request(), 0, 9),
        Err(ServiceError::Game(GameError::Conflict(_)))
    ));
}

#[test]
fn unknown_profile_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut service = service(&dir);
    assert!(matches!(
        service.snapshot("ghost", 0),
        Err(ServiceError::Game(GameError::NotFound { .. }))
    ));
    assert!(matches!(
        service.list_decisions("ghost", None, 10),
        Err(ServiceError::Game(GameError::NotFound { .. }))
    ));
}

#[test]
fn failed_action_keeps_nothing_from_the_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut service = service(&dir);
    service.create_profile(&request(), 0, 21).expect("create");

    let before = service.snapshot("flow", DAY).expect("snapshot").state;
    let failed = service.act("flow", &PlayerAction::Recruitment, DAY * 2);
    assert!(matches!(failed, Err(ServiceError::Game(GameError::Precondition(_)))));

    let after = service.snapshot("flow", DAY).expect("snapshot").state;
    assert_eq!(after.action_nonce, before.action_nonce + 1);
    assert_eq!(after.current_day, before.current_day);
}

#[test]
fn user_pause_round_trip_through_the_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut service = service(&dir);
    service.create_profile(&request(), 0, 4).expect("create");

    let paused = service.pause("flow", PauseKind::Subpage, 10).expect("pause");
    assert!(paused.snapshot.state.is_paused());
    assert!(matches!(
        service.resume("flow", Uuid::nil(), 20),
        Err(ServiceError::Game(GameError::Conflict(_)))
    ));
    let resumed = service.resume("flow", paused.pause_token, 30).expect("resume");
    assert!(!resumed.state.is_paused());
}

#[test]
fn decisions_and_ceremony_play_out_across_requests() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut service = service(&dir);
    service.create_profile(&request(), 0, 1234).expect("create");

    let mut now = 0;
    let mut choices = 0;
    let mut ceremony_ready = false;
    for _ in 0..200 {
        now += DAY;
        let snapshot = service.snapshot("flow", now).expect("snapshot");
        if let Some(decision) = snapshot.state.pending_decision() {
            let choice = PlayerAction::DecisionChoice {
                decision_id: Some(decision.decision_id.clone()),
                option_id: decision.options[0].option_id.clone(),
            };
            service.act("flow", &choice, now).expect("choose");
            choices += 1;
            continue;
        }
        if snapshot.state.pause.kind() == Some(PauseKind::Ceremony) {
            ceremony_ready = true;
            break;
        }
    }
    assert!(ceremony_ready, "ceremony pause reached");

    let preview = service.ceremony_preview("flow", now).expect("preview");
    let done = service.complete_ceremony("flow", now).expect("complete");
    assert_eq!(done.report, preview);
    assert_eq!(done.snapshot.state.ceremony_completed_day, preview.ceremony_day);
    assert!(!done.snapshot.state.is_paused());

    let page = service.list_decisions("flow", None, 500).expect("decisions");
    assert_eq!(page.entries.len(), choices);
    assert!(page.entries.windows(2).all(|pair| pair[0].id < pair[1].id));
}

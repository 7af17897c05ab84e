use career_api::SqliteProfileStore;
use career_core::{CareerConfig, CareerEngine};
use contracts::{Branch, Country, NewGame, PauseKind};

#[test]
fn saved_world_loads_back_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("profiles.sqlite");
    let engine = CareerEngine::new(CareerConfig::builtin());

    let mut world = engine
        .new_game(
            &NewGame {
                profile_id: "round-trip".to_string(),
                player_name: "Jordan".to_string(),
                country: Country::Us,
                branch: Branch::AirForce,
                start_age: 22,
                time_scale: 3,
            },
            10_000,
            555,
        )
        .expect("new game");
    let mut rng = CareerEngine::request_rng(&world.state);
    engine
        .pause(&mut world, PauseKind::Modal, 20_000, &mut rng)
        .expect("pause");
    let ticket = world.roster.mark_kia("npc_007", 0, 14).expect("kia");
    world.state.recruitment_queue.push(ticket);

    {
        let mut store = SqliteProfileStore::open(&path).expect("open");
        let tx = store.begin().expect("begin");
        tx.insert_world(&world, 20_000).expect("insert");
        tx.commit().expect("commit");
    }

    let mut store = SqliteProfileStore::connect(&path).expect("reconnect");
    let tx = store.begin().expect("begin");
    let loaded = tx.load_world("round-trip").expect("load").expect("present");
    assert_eq!(loaded, world);
    assert!(tx.load_world("missing").expect("load").is_none());
}

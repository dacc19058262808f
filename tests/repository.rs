use clubstore::model::{NewContract, NewPlayer, NewPosition, NewSeasonStat, NewTeam, Record};
use clubstore::{ClubStore, EntityKind, FailureKind, QueryCatalog, Report};
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

fn team(name: &str) -> NewTeam {
    NewTeam {
        team_name: name.to_string(),
        city: "Sevilla".to_string(),
        stadium_name: format!("{} Stadium", name),
    }
}

#[test]
fn records_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("club.db");

    let id = {
        let store = ClubStore::open(&path).unwrap();
        let outcome = store.create(&team("Sevilla FC"));
        assert!(outcome.ok, "{}", outcome.message);
        outcome.id.unwrap()
    };

    let store = ClubStore::open(&path).unwrap();
    let row = store.get_by_id(EntityKind::Team, id).unwrap();
    assert_eq!(row["team_name"], json!("Sevilla FC"));
    assert_eq!(store.get_all(EntityKind::Team).len(), 1);
}

#[test]
fn identifiers_are_never_reissued() {
    let store = ClubStore::open_in_memory().unwrap();
    let mut seen = Vec::new();
    for name in ["Betis", "Valencia", "Villarreal", "Osasuna"] {
        let outcome = store.create(&team(name));
        let id = outcome.id.unwrap();
        assert!(!seen.contains(&id));
        seen.push(id);
    }
}

#[test]
fn failed_batch_leaves_no_trace() {
    let store = ClubStore::open_in_memory().unwrap();
    let rows = vec![
        record(json!({ "team_name": "Girona", "city": "Girona", "stadium_name": "Montilivi" })),
        record(json!({ "team_name": "Getafe", "city": "Getafe" })),
        record(json!({ "team_name": "Alavés", "city": "Vitoria", "stadium_name": "Mendizorroza" })),
    ];

    let outcome = store.insert_many(EntityKind::Team, &rows);
    assert!(!outcome.ok);
    assert_eq!(outcome.failure, Some(FailureKind::Validation));
    assert!(store.get_all(EntityKind::Team).is_empty());
}

#[test]
fn out_of_range_age_is_a_validation_failure() {
    let store = ClubStore::open_in_memory().unwrap();
    let outcome = store.create(&NewPlayer {
        player_name: "Methuselah".to_string(),
        age: 200,
        position_id: 1,
        team_id: None,
    });

    assert!(!outcome.ok);
    assert_eq!(outcome.failure, Some(FailureKind::Validation));
}

#[test]
fn reports_see_inserted_records() {
    let store = ClubStore::open_in_memory().unwrap();
    let betis = store.create(&team("Betis")).id.unwrap();
    store.create(&team("Cádiz"));
    let winger = store.create(&NewPosition { position_name: "Winger".to_string() }).id.unwrap();
    let player = store
        .create(&NewPlayer {
            player_name: "Isco".to_string(),
            age: 32,
            position_id: winger,
            team_id: Some(betis),
        })
        .id
        .unwrap();
    store.create(&NewContract {
        player_id: player,
        start_date: "2023-07-01".parse().unwrap(),
        end_date: "2027-06-30".parse().unwrap(),
        player_value: 8_000_000.0,
    });
    store.create(&NewSeasonStat {
        player_id: player,
        goals: 8,
        assists: 5,
        yellow_cards: 3,
        red_cards: 0,
        minutes_played: 2400,
    });

    let catalog = QueryCatalog::new(store.database());

    let top = catalog.run(Report::TopTeams, Some(1));
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["team_name"], json!("Betis"));

    let empty = catalog.run(Report::TeamsWithoutPlayers, None);
    assert_eq!(empty.len(), 1);
    assert_eq!(empty[0]["team_name"], json!("Cádiz"));

    let summary = catalog.player_summary(player).unwrap();
    assert_eq!(summary["goals"], json!(8));
    assert_eq!(summary["end_date"], json!("2027-06-30"));
}

use critter_dash::game_server::EffectKind;
use critter_dash::{GameServer, GameState, RaceConfig, RaceError, RosterError};

fn quiet_server() -> GameServer {
    let config = RaceConfig {
        skill_chance: 0.0,
        ..RaceConfig::default()
    };
    GameServer::seeded(config, 1234)
}

#[test]
fn two_racers_without_skills_finish_after_900_ticks() {
    let mut server = quiet_server();
    server.submit_roster(&["A", "B"]).unwrap();

    for now in 0..899u64 {
        let frame = server.tick(now * 16).unwrap();
        assert!(frame.completion.is_none(), "finished early at tick {}", now + 1);
    }
    assert!(server.get_snapshot().unwrap().ranking.is_empty());

    let frame = server.tick(899 * 16).unwrap();
    assert_eq!(frame.completion, Some(vec!["A".to_string(), "B".to_string()]));
    assert_eq!(server.get_state(), GameState::Finished);
    assert!(frame.snapshot.racers.iter().all(|r| r.finished && r.position == 900.0));

    let results = server.get_results().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].place, 1);
    assert_eq!(results[0].finish_tick, 900);

    let race = server.race().unwrap();
    for result in &results {
        let racer = race.racer(result.racer_id).unwrap();
        assert_eq!(racer.name, result.name);
        assert_eq!(racer.finish_tick, Some(result.finish_tick));
        assert_eq!(racer.position, race.config().finish_line);
    }
    assert!(race.racer(99).is_none());
}

#[test]
fn completion_is_one_shot() {
    let mut server = quiet_server();
    server.submit_roster(&["A", "B"]).unwrap();

    let mut completions = 0;
    for now in 0..1200u64 {
        if server.tick(now).unwrap().completion.is_some() {
            completions += 1;
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(server.get_state(), GameState::Finished);
    assert_eq!(server.get_snapshot().unwrap().ranking.len(), 2);
}

#[test]
fn roster_bounds_are_enforced() {
    let mut server = quiet_server();

    assert_eq!(
        server.submit_roster(&["Solo"]).unwrap_err(),
        RaceError::Roster(RosterError::TooFewEntries { min: 2, found: 1 })
    );

    let crowd: Vec<String> = (0..11).map(|i| format!("R{i}")).collect();
    assert_eq!(
        server.submit_roster(crowd.as_slice()).unwrap_err(),
        RaceError::Roster(RosterError::TooManyEntries { max: 10, found: 11 })
    );

    assert_eq!(
        server.submit_roster(&["A", "", "   "]).unwrap_err(),
        RaceError::Roster(RosterError::TooFewNames { min: 2, found: 1 })
    );
    assert_eq!(server.get_state(), GameState::AwaitingRoster);
}

#[test]
fn names_are_trimmed_and_blank_entries_dropped() {
    let mut server = quiet_server();
    let snapshot = server.submit_roster(&["  Ann ", "", "Bo"]).unwrap();

    let names: Vec<&str> = snapshot.racers.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Bo"]);
    let lanes: Vec<usize> = snapshot.racers.iter().map(|r| r.lane).collect();
    assert_eq!(lanes, vec![0, 1]);
    assert_eq!(snapshot.racers[1].lane_y, 79.0);
}

#[test]
fn reset_mid_race_starts_the_next_race_clean() {
    let config = RaceConfig {
        skill_chance: 0.2,
        ..RaceConfig::default()
    };
    let mut server = GameServer::seeded(config, 99);
    server.submit_roster(&["A", "B", "C", "D"]).unwrap();
    for now in (0..3000).step_by(16) {
        server.tick(now);
    }
    server.race_mut().unwrap().grant_shield(0, None);
    assert!(server.race().unwrap().racers().iter().any(|r| !r.effects.is_empty()));

    server.reset();
    assert_eq!(server.get_state(), GameState::AwaitingRoster);
    assert!(server.get_snapshot().is_none());

    let snapshot = server.submit_roster(&["A", "B", "C", "D"]).unwrap();
    assert!(snapshot.ranking.is_empty());
    assert!(snapshot.objects.is_empty());
    assert!(snapshot.racers.iter().all(|r| r.position == 0.0 && !r.finished && !r.shielded));
    let race = server.race().unwrap();
    assert_eq!(race.tick_count(), 0);
    assert!(race.racers().iter().all(|r| r.effects.is_empty()));
    assert!(race
        .racers()
        .iter()
        .all(|r| !r.effects.is_active(EffectKind::UsingSkill)));
}

#[test]
fn snapshot_serializes_for_the_renderer() {
    let mut server = quiet_server();
    server.submit_roster(&["A", "B"]).unwrap();
    let frame = server.tick(0).unwrap();

    let value = serde_json::to_value(&frame.snapshot).unwrap();
    assert_eq!(value["racers"][0]["visual"], "normal");
    assert_eq!(value["racers"][0]["position"], 1.0);
    assert_eq!(value["tick"], 1);
    assert!(value["objects"].as_array().unwrap().is_empty());
}

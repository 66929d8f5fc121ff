use std::collections::{HashMap, HashSet};
use critter_dash::game_server::{ObjectEffect, RemovalReason};
use critter_dash::{GameServer, RaceConfig, RaceEvent};

const NAMES: [&str; 10] = ["Ann", "Bo", "Cy", "Di", "Ed", "Flo", "Gus", "Hal", "Ivy", "Jo"];

/// Run a busy race to completion, checking invariants after every tick
fn run_checked(seed: u64, racers: usize) {
    let config = RaceConfig {
        skill_chance: 0.02,
        ..RaceConfig::default()
    };
    let mut server = GameServer::seeded(config, seed);
    let mut last = server.submit_roster(&NAMES[..racers]).unwrap();

    let mut spawned: HashMap<u64, ObjectEffect> = HashMap::new();
    let mut removed: HashSet<u64> = HashSet::new();
    let mut completions = 0;
    let mut ticks_after_completion = 0;

    for tick in 0..50_000u64 {
        let frame = server.tick(tick * 16).unwrap();
        let snap = &frame.snapshot;

        for (before, after) in last.racers.iter().zip(&snap.racers) {
            assert!(after.position >= before.position, "seed {seed}: {} moved backwards", after.name);
            if before.finished {
                assert_eq!(after.position, before.position, "seed {seed}: finished racer moved");
                assert!(after.finished);
            }
        }

        assert!(snap.ranking.starts_with(&last.ranking), "ranking must be append-only");
        let unique: HashSet<&String> = snap.ranking.iter().collect();
        assert_eq!(unique.len(), snap.ranking.len(), "no duplicate names in ranking");
        for name in &snap.ranking {
            let racer = snap.racers.iter().find(|r| &r.name == name).unwrap();
            assert!(racer.finished);
            assert_eq!(racer.position, snap.finish_line);
        }

        for event in &frame.events {
            match event {
                RaceEvent::ObjectSpawned { object_id, effect, .. } => {
                    spawned.insert(*object_id, *effect);
                }
                RaceEvent::ObjectRemoved { object_id, reason, .. } => {
                    assert!(spawned.contains_key(object_id));
                    assert!(removed.insert(*object_id), "object {object_id} removed twice");
                    if *reason == RemovalReason::Consumed {
                        let effect = spawned[object_id];
                        assert!(matches!(
                            effect,
                            ObjectEffect::Slow | ObjectEffect::Freeze | ObjectEffect::Stun
                        ));
                    }
                }
                _ => {}
            }
        }

        if let Some(ranking) = &frame.completion {
            completions += 1;
            assert_eq!(ranking.len(), racers);
            assert!(snap.racers.iter().all(|r| r.finished));
        } else {
            assert!(snap.ranking.len() < racers || completions == 1);
        }

        last = frame.snapshot;
        if completions == 1 {
            // Keep ticking a little: finished races must stay inert
            ticks_after_completion += 1;
            if ticks_after_completion > 20 {
                break;
            }
        }
    }

    assert_eq!(completions, 1, "seed {seed}: race never completed");
}

#[test]
fn busy_races_keep_their_invariants() {
    for seed in 0..8 {
        run_checked(seed, 10);
    }
}

#[test]
fn small_races_keep_their_invariants() {
    for seed in 100..106 {
        run_checked(seed, 2);
    }
}

#[test]
fn skills_fire_during_a_normal_race() {
    let mut server = GameServer::seeded(RaceConfig::default(), 42);
    server.submit_roster(&NAMES).unwrap();

    let mut activations = 0;
    for tick in 0..20_000u64 {
        let frame = server.tick(tick * 16).unwrap();
        activations += frame
            .events
            .iter()
            .filter(|e| matches!(e, RaceEvent::SkillActivated { .. }))
            .count();
        if frame.completion.is_some() {
            break;
        }
    }
    assert!(activations > 0);
}

use std::time::Duration;

use glam::Vec2;
use lane_defence_core::{
    Burst, Catalog, DamageType, EnemyTemplate, Event, GameStatus, Gold, Health, PlacementError,
    Rules, SaleError, Scenario, TargetingMode, TowerTemplate, UpgradeError, UpgradeTier, Wave,
    WavePhase, WaveSchedule,
};
use lane_defence_simulation::{Simulation, MAX_SPEED};

const FRAME: Duration = Duration::from_millis(50);

fn grunt(name: &str, health: u32, speed: f32) -> EnemyTemplate {
    EnemyTemplate {
        name: name.to_owned(),
        max_health: Health::new(health),
        speed,
        size: 20.0,
        color: "#aa0000".to_owned(),
        hidden: false,
        spawner: None,
        death_spawn: None,
    }
}

fn sniper() -> TowerTemplate {
    TowerTemplate {
        name: "Sniper".to_owned(),
        damage: 1_000,
        fire_rate: 0.05,
        range: 2_000.0,
        cost: Gold::new(200),
        color: "#00aaff".to_owned(),
        mode: TargetingMode::Strongest,
        detection: true,
        damage_type: DamageType::Direct,
        income: false,
        projectile_speed: None,
        upgrades: vec![UpgradeTier {
            price: Gold::new(100),
            range: Some(2_500.0),
            name: "Scope".to_owned(),
            description: "Longer reach".to_owned(),
            ..UpgradeTier::default()
        }],
    }
}

fn scenario(schedule: WaveSchedule, rules: Rules) -> Scenario {
    let mut catalog = Catalog::new();
    catalog.insert_enemy(grunt("Normal", 20, 100.0));
    catalog.insert_tower(sniper());
    Scenario {
        catalog,
        path: vec![Vec2::new(0.0, 0.0), Vec2::new(1_000.0, 0.0)],
        schedule,
        rules,
    }
}

fn waves(count: u32, wait: f32) -> WaveSchedule {
    let mut schedule = WaveSchedule::new();
    for number in 1..=count {
        schedule.insert(
            number,
            Wave {
                bursts: vec![Burst {
                    enemy: "Normal".to_owned(),
                    quantity: 2,
                    cooldown: 0.5,
                }],
                wait,
                reward: Gold::new(25),
            },
        );
    }
    schedule
}

fn run(simulation: &mut Simulation, frames: usize) -> Vec<Event> {
    let mut collected = Vec::new();
    for _ in 0..frames {
        collected.extend_from_slice(simulation.tick(FRAME));
    }
    collected
}

#[test]
fn defended_schedule_ends_in_single_victory() {
    let mut simulation =
        Simulation::new(scenario(waves(2, 1.0), Rules::default())).expect("valid scenario");
    let sniper = simulation
        .place_tower("Sniper", Vec2::new(500.0, 100.0))
        .expect("placement succeeds");

    let events = run(&mut simulation, 400);

    let victories = events
        .iter()
        .filter(|event| matches!(event, Event::Victory))
        .count();
    assert_eq!(victories, 1);
    assert_eq!(simulation.status(), GameStatus::Victory);
    assert_eq!(simulation.base_health(), simulation.base_max_health());
    assert_eq!(simulation.wave_status().phase, WavePhase::Terminal);

    let kills = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .count();
    assert_eq!(kills, 4);
    assert_eq!(simulation.gold(), Gold::new(550 - 200 + 4 * 20 + 2 * 25));

    let snapshot = simulation.towers().into_vec().remove(0);
    assert_eq!(snapshot.id, sniper);
    assert_eq!(snapshot.total_damage, 4 * 1_000);

    assert!(run(&mut simulation, 10).is_empty(), "finished sessions stay frozen");
}

#[test]
fn undefended_base_falls_once() {
    let rules = Rules {
        base_health: Health::new(30),
        ..Rules::default()
    };
    let mut simulation = Simulation::new(scenario(waves(2, 30.0), rules)).expect("valid scenario");
    let events = run(&mut simulation, 600);

    let defeats = events
        .iter()
        .filter(|event| matches!(event, Event::Defeat))
        .count();
    assert_eq!(defeats, 1);
    assert_eq!(simulation.status(), GameStatus::Defeat);
    assert!(simulation.base_health().is_zero());
    assert!(!events.iter().any(|event| matches!(event, Event::Victory)));
}

#[test]
fn skip_is_refused_while_enemies_live() {
    let mut simulation =
        Simulation::new(scenario(waves(2, 1.0), Rules::default())).expect("valid scenario");
    assert!(!simulation.skip_wave(), "no skipping before the first pause");

    while !simulation.wave_status().can_skip {
        let _ = simulation.tick(FRAME);
    }
    assert_eq!(simulation.enemies().len(), 2);
    assert!(!simulation.skip_wave());
    assert!(simulation.wave_status().countdown > 0.0);

    let _ = simulation
        .place_tower("Sniper", Vec2::new(500.0, 100.0))
        .expect("placement succeeds");
    for _ in 0..5 {
        let _ = simulation.tick(FRAME);
    }
    assert!(simulation.enemies().is_empty());
    assert!(simulation.skip_wave());
    assert_eq!(simulation.wave_status().countdown, 0.0);

    let events = simulation.tick(FRAME).to_vec();
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::WaveCompleted { wave: 1, .. })));
    assert_eq!(simulation.wave(), 2);
}

#[test]
fn speed_multiplier_scales_clamped_frames() {
    let mut schedule = WaveSchedule::new();
    schedule.insert(
        1,
        Wave {
            bursts: vec![Burst {
                enemy: "Normal".to_owned(),
                quantity: 1,
                cooldown: 10.0,
            }],
            wait: 10.0,
            reward: Gold::ZERO,
        },
    );
    let mut simulation =
        Simulation::new(scenario(schedule, Rules::default())).expect("valid scenario");
    assert_eq!(simulation.set_speed(99), MAX_SPEED);
    assert_eq!(simulation.set_speed(2), 2);

    let _ = simulation.tick(FRAME);
    let _ = simulation.tick(FRAME);
    let spawned = simulation.enemies().into_vec().remove(0);
    assert!((spawned.position.x - 10.0).abs() < 1e-3);

    let _ = simulation.tick(Duration::from_secs(5));
    let moved = simulation.enemies().into_vec().remove(0);
    assert!((moved.position.x - 30.0).abs() < 1e-3);
}

#[test]
fn intents_report_rejection_reasons() {
    let rules = Rules {
        starting_gold: Gold::new(250),
        ..Rules::default()
    };
    let mut simulation = Simulation::new(scenario(waves(1, 1.0), rules)).expect("valid scenario");

    assert_eq!(
        simulation.place_tower("Ballista", Vec2::new(500.0, 100.0)),
        Err(PlacementError::UnknownTemplate)
    );
    assert_eq!(
        simulation.place_tower("Sniper", Vec2::new(500.0, 10.0)),
        Err(PlacementError::OnPath)
    );
    let tower = simulation
        .place_tower("Sniper", Vec2::new(500.0, 100.0))
        .expect("placement succeeds");
    assert_eq!(
        simulation.place_tower("Sniper", Vec2::new(800.0, 100.0)),
        Err(PlacementError::InsufficientFunds)
    );
    assert_eq!(
        simulation.upgrade_tower(tower),
        Err(UpgradeError::InsufficientFunds)
    );

    assert_eq!(simulation.sell_tower(tower), Ok(Gold::new(200)));
    assert_eq!(simulation.sell_tower(tower), Err(SaleError::MissingTower));
    assert_eq!(simulation.gold(), Gold::new(250));

    let tower = simulation
        .place_tower("Sniper", Vec2::new(520.0, 100.0))
        .expect("space was freed");
    let _ = simulation.tick(FRAME);
    assert_eq!(simulation.gold(), Gold::new(50));
    assert_eq!(
        simulation.upgrade_tower(tower),
        Err(UpgradeError::InsufficientFunds)
    );
}

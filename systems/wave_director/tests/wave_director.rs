use std::time::Duration;

use glam::Vec2;
use lane_defence_core::{
    Burst, Catalog, Command, EnemyTemplate, Event, GameStatus, Gold, Health, Rules, Wave,
    WavePhase, WaveSchedule,
};
use lane_defence_system_wave_director::WaveDirector;
use lane_defence_world::{self as world, query, World};

fn burst(enemy: &str, quantity: u32, cooldown: f32) -> Burst {
    Burst {
        enemy: enemy.to_owned(),
        quantity,
        cooldown,
    }
}

fn two_wave_schedule() -> WaveSchedule {
    let mut schedule = WaveSchedule::new();
    schedule.insert(
        1,
        Wave {
            bursts: vec![burst("Normal", 2, 1.0), burst("Swift", 1, 0.5)],
            wait: 3.0,
            reward: Gold::new(40),
        },
    );
    schedule.insert(
        2,
        Wave {
            bursts: vec![burst("Normal", 1, 1.0)],
            wait: 2.0,
            reward: Gold::new(60),
        },
    );
    schedule
}

fn idle_world() -> World {
    let mut catalog = Catalog::new();
    for name in ["Normal", "Swift"] {
        catalog.insert_enemy(EnemyTemplate {
            name: name.to_owned(),
            max_health: Health::new(10),
            speed: 0.0,
            size: 10.0,
            color: "#ffffff".to_owned(),
            hidden: false,
            spawner: None,
            death_spawn: None,
        });
    }
    World::new(
        catalog,
        vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)],
        Rules::default(),
    )
    .expect("valid world")
}

fn spawn(template: &str) -> Command {
    Command::SpawnEnemy {
        template: template.to_owned(),
    }
}

#[test]
fn walks_schedule_in_order() {
    let schedule = two_wave_schedule();
    let mut director = WaveDirector::new();
    let mut commands = Vec::new();

    for _ in 0..30 {
        director.handle(Duration::from_secs(1), &schedule, &mut commands);
    }

    assert_eq!(
        commands,
        vec![
            spawn("Normal"),
            spawn("Normal"),
            spawn("Swift"),
            Command::CompleteWave {
                wave: 1,
                reward: Gold::new(40),
            },
            spawn("Normal"),
            Command::CompleteWave {
                wave: 2,
                reward: Gold::new(60),
            },
            Command::ConcludeSchedule,
        ]
    );
    assert!(director.is_terminal());
    assert_eq!(director.status().phase, WavePhase::Terminal);
}

#[test]
fn pause_unlocks_skip_until_next_wave() {
    let schedule = two_wave_schedule();
    let mut director = WaveDirector::new();
    let mut commands = Vec::new();

    for _ in 0..7 {
        director.handle(Duration::from_secs(1), &schedule, &mut commands);
        assert!(!director.can_skip() || director.status().phase == WavePhase::BetweenWaves);
    }
    let status = director.status();
    assert!(status.can_skip);
    assert_eq!(status.countdown, 3.0);
    assert_eq!(status.wave, 1);

    assert!(!director.skip_wave(2), "live enemies block skipping");
    assert!(director.skip_wave(0));

    commands.clear();
    director.handle(Duration::from_millis(16), &schedule, &mut commands);
    assert_eq!(
        commands,
        vec![Command::CompleteWave {
            wave: 1,
            reward: Gold::new(40),
        }]
    );
    assert!(!director.can_skip());
    assert_eq!(director.wave(), 2);
}

#[test]
fn driving_world_yields_rewards_and_single_victory() {
    let schedule = two_wave_schedule();
    let mut director = WaveDirector::new();
    let mut world = idle_world();
    let mut victories = 0;
    let mut completed = Vec::new();

    for _ in 0..40 {
        let mut commands = Vec::new();
        director.handle(Duration::from_secs(1), &schedule, &mut commands);
        commands.push(Command::Tick {
            dt: Duration::from_secs(1),
        });

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        for event in events {
            match event {
                Event::Victory => victories += 1,
                Event::WaveCompleted { wave, .. } => completed.push(wave),
                _ => {}
            }
        }
    }

    assert_eq!(victories, 1);
    assert_eq!(completed, vec![1, 2]);
    assert_eq!(query::status(&world), GameStatus::Victory);
    assert_eq!(query::live_enemy_count(&world), 4);
    assert_eq!(query::gold(&world), Gold::new(550 + 40 + 60));
}

#[test]
fn unknown_schedule_entry_is_rejected_without_stopping() {
    let mut schedule = WaveSchedule::new();
    schedule.insert(
        1,
        Wave {
            bursts: vec![burst("Ghost", 1, 0.5), burst("Normal", 1, 0.5)],
            wait: 1.0,
            reward: Gold::new(5),
        },
    );
    let mut director = WaveDirector::new();
    let mut world = idle_world();
    let mut events = Vec::new();

    for _ in 0..6 {
        let mut commands = Vec::new();
        director.handle(Duration::from_secs(1), &schedule, &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    }

    assert!(events.iter().any(|event| matches!(
        event,
        Event::EnemySpawnRejected { template, .. } if template == "Ghost"
    )));
    assert_eq!(query::live_enemy_count(&world), 1);
}

use std::time::Duration;

use maze_chase_core::{Command, Direction, Event, GhostId, GhostMode, MazeData, TilePos};
use maze_chase_system_collision::Collision;
use maze_chase_world::{self as world, query, scaffolding, Config, World};

const FRAME: Duration = Duration::from_millis(16);

fn world() -> World {
    world_with(Config::default())
}

fn world_with(config: Config) -> World {
    let maze = MazeData::from_ascii(&[
        "#########",
        "#o.....o#",
        "#.##.##.#",
        "#...G...#",
        ".........",
        "#.##.##.#",
        "#...P...#",
        "#o.....o#",
        "#########",
    ])
    .expect("valid maze");
    World::new(maze, config).expect("valid config")
}

/// Runs the resolver passes and applies their commands in order.
fn resolve(world: &mut World, collision: &mut Collision, events: &[Event]) -> Vec<Event> {
    let player = query::player(world);
    let mut commands = Vec::new();
    collision.handle_pickups(events, query::maze(world), &player, &mut commands);
    let mut pickup_events = Vec::new();
    for command in commands.drain(..) {
        world::apply(world, command, &mut pickup_events);
    }

    let ghosts = query::ghost_view(world);
    collision.handle_contacts(&pickup_events, &player, &ghosts, &mut commands);
    let mut contact_events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut contact_events);
    }

    pickup_events.extend(contact_events);
    pickup_events
}

#[test]
fn dots_add_ten_points_each() {
    let mut world = world();
    let mut collision = Collision::default();
    let cells = [TilePos::new(5, 6), TilePos::new(6, 6), TilePos::new(7, 6)];
    for cell in cells {
        scaffolding::place_player(&mut world, cell, Direction::Right, false);
        let events = resolve(&mut world, &mut collision, &[]);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::DotConsumed { cell: eaten, .. } if *eaten == cell)));
    }
    assert_eq!(query::game_state(&world).score, 30);

    let events = resolve(&mut world, &mut collision, &[]);
    assert!(events.is_empty(), "the same dot is never eaten twice");
}

#[test]
fn pellet_on_ghost_tile_frightens_before_contact() {
    let mut world = world();
    let mut collision = Collision::default();
    let pellet = TilePos::new(1, 1);
    let ghost = GhostId::new(3);
    scaffolding::place_player(&mut world, pellet, Direction::Up, false);
    scaffolding::place_ghost(&mut world, ghost, pellet, Direction::Left);

    let events = resolve(&mut world, &mut collision, &[]);
    assert!(events.contains(&Event::PowerModeStarted {
        duration: Duration::from_secs(8)
    }));
    assert!(events.contains(&Event::GhostEaten {
        ghost,
        points: 200,
        score: 250,
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::LifeLost { .. })));
}

#[test]
fn ghost_rewards_double_within_one_power_window() {
    let mut world = world();
    let mut collision = Collision::default();
    let pellet = TilePos::new(7, 7);
    scaffolding::place_player(&mut world, pellet, Direction::Left, false);
    let events = resolve(&mut world, &mut collision, &[]);
    assert!(events.contains(&Event::PowerPelletConsumed {
        cell: pellet,
        score: 50,
    }));

    let mut rewards = Vec::new();
    for id in 0..4 {
        let ghost = GhostId::new(id);
        scaffolding::place_ghost(&mut world, ghost, pellet, Direction::Up);
        for event in resolve(&mut world, &mut collision, &[]) {
            if let Event::GhostEaten { points, .. } = event {
                rewards.push(points);
            }
        }
    }
    assert_eq!(rewards, vec![200, 400, 800, 1_600]);
    assert_eq!(query::game_state(&world).score, 50 + 200 + 400 + 800 + 1_600);

    let second = TilePos::new(1, 7);
    scaffolding::place_player(&mut world, second, Direction::Left, false);
    let events = resolve(&mut world, &mut collision, &[]);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PowerModeStarted { .. })));
    assert_eq!(collision.ghost_reward(), 200);
}

#[test]
fn hunting_ghost_costs_exactly_one_life() {
    let mut world = world();
    let mut collision = Collision::default();
    let cell = TilePos::new(2, 3);
    scaffolding::place_player(&mut world, cell, Direction::Left, false);
    scaffolding::place_ghost(&mut world, GhostId::new(0), cell, Direction::Right);
    scaffolding::place_ghost(&mut world, GhostId::new(1), cell, Direction::Right);

    let events = resolve(&mut world, &mut collision, &[]);
    let losses = events
        .iter()
        .filter(|event| matches!(event, Event::LifeLost { .. }))
        .count();
    assert_eq!(losses, 1);
    assert_eq!(query::game_state(&world).lives, 2);
    assert_eq!(query::player(&world).cell, TilePos::new(4, 6));
}

#[test]
fn eaten_ghosts_pass_through() {
    let mut world = world();
    let mut collision = Collision::default();
    let cell = TilePos::new(6, 3);
    let ghost = GhostId::new(2);
    scaffolding::place_player(&mut world, cell, Direction::Left, false);
    scaffolding::place_ghost(&mut world, ghost, cell, Direction::Right);
    scaffolding::set_ghost_mode(&mut world, ghost, GhostMode::Eaten);

    let events = resolve(&mut world, &mut collision, &[]);
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::DotConsumed { .. })));
    assert_eq!(query::game_state(&world).lives, 3);
}

#[test]
fn lives_run_out_into_game_over() {
    let mut world = world();
    let mut collision = Collision::default();
    let cell = TilePos::new(2, 3);
    let mut game_overs = Vec::new();
    for _ in 0..5 {
        scaffolding::place_player(&mut world, cell, Direction::Left, false);
        scaffolding::place_ghost(&mut world, GhostId::new(0), cell, Direction::Right);
        for event in resolve(&mut world, &mut collision, &[]) {
            if let Event::GameOver { score } = event {
                game_overs.push(score);
            }
        }
        let mut respite = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1_500),
            },
            &mut respite,
        );
    }
    let state = query::game_state(&world);
    assert_eq!(state.lives, 0);
    assert_eq!(game_overs.len(), 1);
    assert_eq!(game_overs[0], state.score);
}

#[test]
fn head_on_crossings_never_pass_through() {
    for step in 0..40_u8 {
        let speed = 5.0 + 0.25 * f32::from(step);
        let mut world = world_with(Config {
            player_speed: speed,
            ..Config::default()
        });
        let mut collision = Collision::default();
        scaffolding::place_player(&mut world, TilePos::new(1, 6), Direction::Right, true);
        scaffolding::place_ghost(&mut world, GhostId::new(0), TilePos::new(7, 6), Direction::Left);

        let mut caught = false;
        for _ in 0..60 {
            let mut moved = Vec::new();
            world::apply(&mut world, Command::AdvanceActors { dt: FRAME }, &mut moved);
            let events = resolve(&mut world, &mut collision, &moved);
            if events
                .iter()
                .any(|event| matches!(event, Event::LifeLost { .. }))
            {
                caught = true;
                break;
            }
        }
        assert!(caught, "player at {speed} tiles/s slipped past the ghost");
        assert_eq!(query::game_state(&world).lives, 2);
    }
}

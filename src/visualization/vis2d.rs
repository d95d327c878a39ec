use bevy::color::palettes::css;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::simulation::scenario::{Command, Scenario};
use crate::simulation::states::{Bounds, NVec2};

const FALLBACK_COLOR: Srgba = css::WHITE;

pub fn run_2d(scenario: Scenario) {
    let bounds = *scenario.bounds();
    tracing::info!(atoms = scenario.atom_count(), "run_2d: starting Bevy 2D viewer");

    App::new()
        .insert_resource(scenario)
        .insert_resource(ClearColor(Color::BLACK))
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "atomlife".into(),
                        resolution: (bounds.width() as f32, bounds.height() as f32).into(),
                        ..default()
                    }),
                    ..default()
                })
                // tracing subscriber is installed by main
                .disable::<LogPlugin>(),
        )
        .add_systems(Startup, setup_camera_system)
        .add_systems(Update, (input_system, physics_step_system, draw_atoms_system).chain())
        .run();
}

fn setup_camera_system(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

fn input_system(keys: Res<ButtonInput<KeyCode>>, mut scenario: ResMut<Scenario>, mut exit: EventWriter<AppExit>) {
    let mut commands = Vec::new();
    if keys.just_pressed(KeyCode::KeyB) {
        commands.push(Command::CycleBoundary);
    }
    if keys.just_pressed(KeyCode::KeyP) {
        commands.push(Command::DumpState);
    }
    if keys.just_pressed(KeyCode::Escape) {
        commands.push(Command::Stop);
    }

    for cmd in commands {
        if !scenario.handle(cmd) {
            exit.send(AppExit::Success);
            return;
        }
    }
}

fn physics_step_system(time: Res<Time>, mut scenario: ResMut<Scenario>) {
    if scenario.is_running() {
        scenario.tick(time.delta());
    }
}

// Each atom is drawn as the segment it travelled since the last displayed frame
fn draw_atoms_system(mut gizmos: Gizmos, scenario: Res<Scenario>, mut last_frame: Local<Vec<Vec2>>) {
    let bounds = scenario.bounds();
    let atoms = scenario.snapshot();
    let current: Vec<Vec2> = atoms.iter().map(|a| to_world(bounds, a.position)).collect();
    for (atom, (from, to)) in atoms.iter().zip(trail_segments(&last_frame, &current)) {
        gizmos.line_2d(from, to, resolve_color(atom.color));
    }
    *last_frame = current;
}

/// Pair each display position with the one shown the frame before.
/// Without a matching previous frame a segment starts where it ends.
fn trail_segments(previous: &[Vec2], current: &[Vec2]) -> Vec<(Vec2, Vec2)> {
    if previous.len() != current.len() {
        return current.iter().map(|&p| (p, p)).collect();
    }
    previous.iter().copied().zip(current.iter().copied()).collect()
}

/// Domain coordinates (origin top-left, y down) to Bevy world (origin center, y up)
fn to_world(bounds: &Bounds, p: NVec2) -> Vec2 {
    Vec2::new(
        (p.x - bounds.width() / 2.0) as f32,
        (bounds.height() / 2.0 - p.y) as f32,
    )
}

/// Resolve a color tag: a handful of CSS names or a hex string, white otherwise
fn resolve_color(tag: &str) -> Srgba {
    match tag {
        "red" => css::RED,
        "green" => css::LIME,
        "blue" => css::BLUE,
        "yellow" => css::YELLOW,
        "white" => css::WHITE,
        "orange" => css::ORANGE,
        "purple" => css::PURPLE,
        "cyan" | "aqua" => css::AQUA,
        other => Srgba::hex(other).unwrap_or(FALLBACK_COLOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_mapping_centers_domain() {
        let b = Bounds::new(500.0, 300.0).unwrap();
        assert_eq!(to_world(&b, NVec2::new(250.0, 150.0)), Vec2::ZERO);
        assert_eq!(to_world(&b, NVec2::new(0.0, 0.0)), Vec2::new(-250.0, 150.0));
    }

    #[test]
    fn segments_run_from_last_displayed_position() {
        let last = [Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0)];
        let now = [Vec2::new(2.0, -1.0), Vec2::new(5.0, 5.0)];
        let segs = trail_segments(&last, &now);
        assert_eq!(segs, vec![(last[0], now[0]), (last[1], now[1])]);
    }

    #[test]
    fn first_frame_segments_are_points() {
        let now = [Vec2::new(3.0, 4.0)];
        assert_eq!(trail_segments(&[], &now), vec![(now[0], now[0])]);
    }

    #[test]
    fn color_tags_resolve() {
        assert_eq!(resolve_color("red"), css::RED);
        assert_eq!(resolve_color("#0000ff"), css::BLUE);
        assert_eq!(resolve_color("not a color"), FALLBACK_COLOR);
    }
}

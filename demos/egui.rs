//! Egui console example.
//!
//! Demonstrates the egui-based developer console with log capture and
//! instance commands.
//!
//! Run with: `cargo run --example egui`
//!
//! Controls:
//! - Press ` (grave/tilde) to toggle console
//! - Press Enter to submit commands
//! - Press Tab to accept the highlighted suggestion
//! - Press ArrowUp/ArrowDown to move through suggestions or history
//! - Press Escape to clear the input
//!
//! Try these commands:
//! - `commands` - List all commands
//! - `spawn 5` - Spawn entities
//! - `tint 1 0.2 0.2` - Recolor every demo entity
//! - `time.scale 0.25` - Slow motion
//! - `log.filter Log` - Hide plain log lines

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_dev_console::prelude::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(LogPlugin {
            custom_layer: bevy_dev_console::logging::custom_log_layer,
            ..default()
        }))
        .add_plugins(bevy_egui::EguiPlugin::default())
        .add_plugins(ConsolePlugin::default())
        .add_systems(Startup, setup)
        .add_systems(Update, (spawn_requested, spin))
        .run();
}

/// Marker for demo entities.
#[derive(Component)]
struct DemoEntity;

/// Entities the `spawn` command asked for.
#[derive(Resource, Default)]
struct SpawnRequests(u32);

fn setup(mut commands: Commands, mut console: Console) {
    commands.spawn(Camera2d);
    commands.init_resource::<SpawnRequests>();

    console
        .expose_resource::<SpawnRequests>()
        .expose_component::<Sprite>();

    console.register(
        ConCommand::instance::<SpawnRequests, _>("spawn", TargetPolicy::WellKnownAccessor, |req, args| {
            let count = args.uint(0).unwrap_or(1);
            req.0 += count as u32;
            Ok(Some(format!("Spawning {} entities", count)))
        })
        .param(ParamSpec::new("count", ParamKind::U8).default_value(ArgValue::UInt(1)))
        .description("Spawn demo entities"),
    );

    console.register(
        ConCommand::instance::<Sprite, _>("tint", TargetPolicy::AllLiveInstances, |sprite, args| {
            let channel = |i| args.float(i).unwrap_or(1.0) as f32;
            sprite.color = Color::srgb(channel(0), channel(1), channel(2));
            Ok(None)
        })
        .param(ParamSpec::float("r"))
        .param(ParamSpec::float("g"))
        .param(ParamSpec::float("b"))
        .description("Recolor every sprite"),
    );

    info!("Press ` to open console. Try: help, commands, spawn 5, tint 1 0 0");
    warn!("This is what a warning looks like");
}

fn spawn_requested(
    mut commands: Commands,
    mut requests: ResMut<SpawnRequests>,
    existing: Query<&DemoEntity>,
) {
    let base = existing.iter().count() as f32;
    for i in 0..std::mem::take(&mut requests.0) {
        let x = (base + i as f32) * 60.0 - 300.0;
        commands.spawn((
            Sprite {
                color: Color::srgb(0.3, 0.7, 0.3),
                custom_size: Some(Vec2::new(50.0, 50.0)),
                ..default()
            },
            Transform::from_xyz(x, 0.0, 0.0),
            DemoEntity,
        ));
    }
}

fn spin(time: Res<Time>, mut query: Query<&mut Transform, With<DemoEntity>>) {
    for mut transform in &mut query {
        transform.rotate_z(time.delta_secs());
    }
}

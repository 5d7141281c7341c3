//! Minimal headless console example.
//!
//! Demonstrates using bevy_dev_console programmatically without any UI.
//! Useful for testing or custom UI implementations.
//!
//! Run with: `cargo run --example minimal --no-default-features`

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_dev_console::prelude::*;

/// A resource commands can reach as the shared instance of its type.
#[derive(Resource)]
struct Gravity(f32);

#[derive(Component)]
struct Crate {
    mass: f32,
}

fn main() {
    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(ConsolePlugin::default())
        .insert_resource(Gravity(9.8))
        .add_systems(Startup, setup)
        .add_systems(Update, send_test_commands.run_if(run_once))
        .add_systems(Update, process_results)
        .run();
}

fn setup(mut console: Console, mut commands: Commands) {
    console.expose_resource::<Gravity>().expose_component::<Crate>();

    // A static command
    console.register(
        ConCommand::new("greet", |args, _ctx| {
            Ok(Some(format!("Hello, {}!", args.text(0).unwrap_or("World"))))
        })
        .param(ParamSpec::optional("name", ParamKind::Text))
        .description("Greet someone"),
    );

    // Get or set a resource
    console.register(
        ConCommand::instance::<Gravity, _>("gravity", TargetPolicy::WellKnownAccessor, |g, args| {
            if let Some(value) = args.float(0) {
                g.0 = value as f32;
            }
            Ok(Some(format!("gravity = {}", g.0)))
        })
        .param(ParamSpec::optional("value", ParamKind::F32))
        .description("Get or set gravity"),
    );

    // Run on every crate
    console.register(
        ConCommand::instance::<Crate, _>("crates.scale", TargetPolicy::AllLiveInstances, |c, args| {
            c.mass *= args.float(0).unwrap_or(1.0) as f32;
            Ok(None)
        })
        .param(ParamSpec::float("factor"))
        .description("Multiply the mass of every crate"),
    );

    for mass in [1.0, 2.5, 4.0] {
        commands.spawn(Crate { mass });
    }
    println!("Console initialized. Registered: greet, gravity, crates.scale");
}

/// Send some test commands programmatically.
fn send_test_commands(mut events: MessageWriter<ConsoleInputEvent>) {
    println!("\n--- Sending test commands ---");

    events.write(ConsoleInputEvent::new("greet"));
    events.write(ConsoleInputEvent::new("greet \"Bevy Developer\""));
    events.write(ConsoleInputEvent::new("gravity"));
    events.write(ConsoleInputEvent::new("gravity 1.62"));
    events.write(ConsoleInputEvent::new("crates.scale 2"));
    events.write(ConsoleInputEvent::new("gravity moon"));
    events.write(ConsoleInputEvent::new("teleport 0 0"));
}

/// Print execution results, exiting once every test command ran.
fn process_results(
    mut events: MessageReader<ConsoleExecutedEvent>,
    crates: Query<&Crate>,
    mut seen: Local<usize>,
    mut exit: MessageWriter<AppExit>,
) {
    for event in events.read() {
        let status = if event.result.success { "ok" } else { "failed" };
        println!("$ {} [{}] {}", event.line, status, event.result.output);
        if event.line.starts_with("crates.scale") {
            let masses: Vec<f32> = crates.iter().map(|c| c.mass).collect();
            println!("  masses now {:?}", masses);
        }
        *seen += 1;
    }
    if *seen >= 7 {
        exit.write(AppExit::Success);
    }
}

//! Terminal console example.
//!
//! Demonstrates using bevy_dev_console with stdin/stdout for headless applications
//! like dedicated servers.
//!
//! Run with: `cargo run --example terminal --no-default-features --features terminal`
//!
//! Commands:
//! - `commands` - List available commands
//! - `players` - Show connected players
//! - `kick <name>` - Remove a player
//! - `quit` - Exit the application

use bevy::prelude::*;
use bevy_dev_console::prelude::*;

fn main() {
    println!("=== Terminal Console Example ===");
    println!("Type commands and press Enter. Type 'quit' to exit.");
    println!();

    // Ensure output is flushed before starting the app
    use std::io::Write;
    let _ = std::io::stdout().flush();

    App::new()
        .add_plugins(MinimalPlugins)
        .add_plugins(ConsolePlugin::default())
        .insert_resource(Players(vec!["alice".into(), "bob".into()]))
        .add_systems(Startup, setup)
        .run();
}

#[derive(Resource)]
struct Players(Vec<String>);

fn setup(mut console: Console) {
    console.expose_resource::<Players>();

    console.register(
        ConCommand::instance::<Players, _>("players", TargetPolicy::WellKnownAccessor, |players, _| {
            Ok(Some(format!("{} connected: {}", players.0.len(), players.0.join(", "))))
        })
        .description("Show connected players"),
    );

    console.register(
        ConCommand::instance::<Players, _>("kick", TargetPolicy::WellKnownAccessor, |players, args| {
            let name = args.text(0).unwrap_or_default();
            let before = players.0.len();
            players.0.retain(|p| !p.eq_ignore_ascii_case(name));
            if players.0.len() == before {
                return Err(CommandError::new(format!("no player named '{}'", name)));
            }
            Ok(Some(format!("Kicked {}", name)))
        })
        .param(ParamSpec::text("name"))
        .description("Remove a player"),
    );

    console.print(LogSeverity::Log, "Server ready");
}

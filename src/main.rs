mod api;
mod cache;
mod commands;
mod state;
mod store;
mod upload;

use clap::{Parser, Subcommand};

use commands::{CreateRoomFlags, UpdateRoomFlags};
use state::{AppState, Config};

/// Admin CLI for the guesthouse booking system.
#[derive(Parser, Debug)]
#[command(name = "guesthouse-admin", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session token
    Logout,
    /// Manage rooms
    Rooms {
        #[command(subcommand)]
        command: RoomsCommand,
    },
    /// View bookings
    Bookings {
        #[command(subcommand)]
        command: BookingsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RoomsCommand {
    /// List all rooms
    List,
    /// Show one room in detail
    Show { id: u64 },
    /// Create a room
    Create {
        #[command(flatten)]
        flags: CreateRoomFlags,
    },
    /// Update a room; omitted flags keep their current value
    Update {
        id: u64,
        #[command(flatten)]
        flags: UpdateRoomFlags,
    },
    /// Delete a room
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum BookingsCommand {
    /// List all bookings
    List,
}

#[tokio::main]
async fn main() {
    // Shared .env between local API and CLI during development.
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::from_env();
    log::debug!("API base URL: {}", config.api_base_url);
    let state = AppState::new(&config);

    let result = match cli.command {
        Command::Login { email, password } => commands::login(&state, &email, &password).await,
        Command::Logout => commands::logout(&state).await,
        Command::Rooms { command } => match command {
            RoomsCommand::List => commands::rooms_list(&state).await,
            RoomsCommand::Show { id } => commands::room_show(&state, id).await,
            RoomsCommand::Create { flags } => commands::room_create(&state, flags).await,
            RoomsCommand::Update { id, flags } => commands::room_update(&state, id, flags).await,
            RoomsCommand::Delete { id, yes } => commands::room_delete(&state, id, yes).await,
        },
        Command::Bookings { command } => match command {
            BookingsCommand::List => commands::bookings_list(&state).await,
        },
    };

    if let Err(message) = result {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

//! `roadlog` - CLI for the truck simulator companion tracker
//!
//! This binary provides the command-line interface for recording trips and
//! fines, following live game telemetry, and viewing driver statistics.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use chrono::Utc;
use clap::Parser;
use tokio::sync::mpsc;

use roadlog::cli::{
    AdminCommand, Cli, Command, ConfigCommand, DriversCommand, FineCommand, LoginCommand,
    ProfileCommand, RegisterCommand, StatsCommand, StatusCommand, TripCommand,
};
use roadlog::record::parse_date_input;
use roadlog::stats::{self, Level};
use roadlog::telemetry::monitor::{MonitorUpdate, TelemetryMonitor};
use roadlog::telemetry::tracker::{Tracker, TrackerEvent};
use roadlog::{
    init_logging, session, Config, Fine, FileSnapshotSource, Snapshot, SnapshotSource, Store, Trip,
    UserStatus,
};

/// Largest accepted avatar image, in bytes.
const AVATAR_MAX_BYTES: u64 = 2 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Register(cmd) => handle_register(&config, &cmd),
        Command::Login(cmd) => handle_login(&config, &cmd),
        Command::Logout => handle_logout(&config),
        Command::Watch => handle_watch(&config).await,
        Command::Trip(cmd) => handle_trip(&config, cmd),
        Command::Fine(cmd) => handle_fine(&config, cmd),
        Command::Stats(cmd) => handle_stats(&config, &cmd),
        Command::Drivers(cmd) => handle_drivers(&config, &cmd),
        Command::Profile(cmd) => handle_profile(&config, cmd),
        Command::Admin(cmd) => handle_admin(&config, cmd),
        Command::Status(cmd) => handle_status(&config, &cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> roadlog::Result<Store> {
    Store::open(config.database_path())
}

fn handle_register(config: &Config, cmd: &RegisterCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    session::require_logged_out(&store)?;

    let user = session::register(&store, &cmd.name, &cmd.email, &cmd.password)?;
    println!("Account created for {} <{}>.", user.name, user.email);
    println!("You can now log in: roadlog login {} <password>", user.email);
    Ok(())
}

fn handle_login(config: &Config, cmd: &LoginCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    session::require_logged_out(&store)?;

    let logged_in = session::login(&store, &cmd.email, &cmd.password)?;
    let user = logged_in.user(&store)?;
    println!("Logged in as {} <{}>.", user.name, user.email);
    Ok(())
}

fn handle_logout(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    session::logout(&store)?;
    println!("Logged out.");
    Ok(())
}

async fn handle_watch(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let current = session::require(&store)?;

    let source = FileSnapshotSource::new(config.telemetry_path());
    let tracker = Tracker::new(config.trip_cooldown(), config.telemetry.min_trip_km);
    let monitor = TelemetryMonitor::new(source, tracker, config.poll_interval());
    let handle = monitor.handle();

    let (tx, mut rx) = mpsc::channel(32);
    let task = tokio::spawn(monitor.run(tx));

    println!("Recording for {} (Ctrl-C to stop).", current.email);
    println!("Snapshot file: {}", config.telemetry_path().display());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                handle.stop();
                break;
            }
            update = rx.recv() => {
                let Some(update) = update else { break };
                apply_update(&store, &current.email, &update)?;
            }
        }
    }

    let _ = task.await;
    println!("Stopped.");
    Ok(())
}

/// Turn one monitor update into records and console output.
fn apply_update(store: &Store, email: &str, update: &MonitorUpdate) -> anyhow::Result<()> {
    match update {
        MonitorUpdate::Connection(true) => println!("Telemetry connected."),
        MonitorUpdate::Connection(false) => println!("Telemetry disconnected."),
        MonitorUpdate::Odometer { km } => {
            println!("Odometer: {} km ({})", km, Level::for_km(*km));
        }
        MonitorUpdate::Event(TrackerEvent::TripCompleted {
            source,
            destination,
            distance_km,
            cargo,
            income,
        }) => {
            let trip = Trip {
                id: None,
                user_email: email.to_string(),
                source: source.clone(),
                destination: destination.clone(),
                distance_km: *distance_km,
                cargo: cargo.clone(),
                income: *income,
                date: Utc::now(),
            };
            store.insert_trip(&trip)?;
            println!("Trip finished! {source} -> {destination} ({distance_km} km)");
        }
        MonitorUpdate::Event(TrackerEvent::FineIssued { offence, amount }) => {
            let fine = Fine {
                id: None,
                user_email: email.to_string(),
                offence: offence.clone(),
                amount: *amount,
                date: Utc::now(),
            };
            store.insert_fine(&fine)?;
            println!("Fine received! -{amount} ({offence})");
        }
    }
    Ok(())
}

fn handle_trip(config: &Config, cmd: TripCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let current = session::require(&store)?;

    match cmd {
        TripCommand::Add {
            source,
            destination,
            distance,
            cargo,
            income,
            date,
        } => {
            let date = match date {
                Some(input) => parse_date_input(&input)?,
                None => Utc::now(),
            };
            let trip = Trip {
                id: None,
                user_email: current.email.clone(),
                source,
                destination,
                distance_km: distance,
                cargo,
                income,
                date,
            };
            store.insert_trip(&trip)?;
            println!(
                "Recorded trip {} -> {} ({} km).",
                trip.source, trip.destination, trip.distance_km
            );
        }
        TripCommand::List { json } => {
            let mut trips = store.trips_for(&current.email)?;
            trips.reverse(); // newest first

            if json {
                println!("{}", serde_json::to_string_pretty(&trips)?);
            } else if trips.is_empty() {
                println!("No trips recorded yet.");
            } else {
                for trip in &trips {
                    let income = trip
                        .income
                        .map(|i| format!("  +{i}"))
                        .unwrap_or_default();
                    println!(
                        "{}  {} -> {}  {} km  {}{}",
                        trip.date.format("%Y-%m-%d"),
                        trip.source,
                        trip.destination,
                        trip.distance_km,
                        if trip.cargo.is_empty() {
                            "(no cargo)"
                        } else {
                            &trip.cargo
                        },
                        income,
                    );
                }
            }
        }
        TripCommand::Clear { yes } => {
            if yes {
                let cleared = store.clear_trips(&current.email)?;
                println!("Deleted {cleared} trips.");
            } else {
                println!("This will delete your entire trip history.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_fine(config: &Config, cmd: FineCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let current = session::require(&store)?;

    match cmd {
        FineCommand::Add {
            offence,
            amount,
            date,
        } => {
            let date = match date {
                Some(input) => parse_date_input(&input)?,
                None => Utc::now(),
            };
            let fine = Fine {
                id: None,
                user_email: current.email.clone(),
                offence,
                amount,
                date,
            };
            store.insert_fine(&fine)?;
            println!("Recorded fine: -{} ({}).", fine.amount, fine.offence);
        }
        FineCommand::List { json } => {
            let mut fines = store.fines_for(&current.email)?;
            let total: i64 = fines.iter().map(|f| f.amount).sum();
            fines.reverse(); // newest first

            if json {
                println!("{}", serde_json::to_string_pretty(&fines)?);
            } else if fines.is_empty() {
                println!("No fines recorded. Keep it up!");
            } else {
                println!("Total fined: {total}");
                for fine in &fines {
                    println!(
                        "{}  -{}  {}",
                        fine.date.format("%Y-%m-%d"),
                        fine.amount,
                        fine.offence
                    );
                }
            }
        }
    }
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let current = session::require(&store)?;
    let user = current.user(&store)?;

    let trips = store.trips_for(&current.email)?;
    let fines = store.fines_for(&current.email)?;

    let totals = stats::driver_totals(&current.email, &trips, &fines, cmd.month.as_deref());
    let level = Level::for_km(totals.distance_km);
    let monthly = stats::monthly_breakdown(&trips);

    let all_time = stats::driver_totals(&current.email, &trips, &fines, None);
    let goal = store.goal(&current.email)?.or(Some(config.stats.default_goal_km));
    let quota = stats::quota_progress(all_time.distance_km, goal);

    if cmd.json {
        let out = serde_json::json!({
            "driver": { "name": user.name, "email": user.email },
            "period": cmd.month.as_deref().unwrap_or("all-time"),
            "totals": totals,
            "level": level,
            "monthly": monthly,
            "quota": quota,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match cmd.month.as_deref() {
        Some(month) => println!("Stats for {} — {month}", user.name),
        None => println!("Stats for {} — all time", user.name),
    }
    println!("----------------------------------------");
    println!("Distance:    {} km", totals.distance_km);
    println!("Level:       {level}");
    println!("Trips:       {}", totals.trips);
    println!("Net profit:  {}", totals.net_profit);
    println!("Fines:       {}", totals.fines);
    println!();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = quota.percent.round() as u32;
    println!(
        "Goal:        {} / {} km ({percent}%), {} km remaining",
        quota.driven_km, quota.goal_km, quota.remaining_km
    );

    if !monthly.is_empty() {
        println!();
        println!("By month:");
        for bucket in &monthly {
            println!(
                "  {}  {} km  {} loads",
                bucket.label(),
                bucket.distance_km,
                bucket.loads
            );
        }
    }
    Ok(())
}

fn handle_drivers(config: &Config, cmd: &DriversCommand) -> anyhow::Result<()> {
    // The one record-viewing command that works without a session.
    let store = open_store(config)?;

    let month = if cmd.all_time {
        None
    } else {
        Some(
            cmd.month
                .clone()
                .unwrap_or_else(|| Utc::now().format("%Y-%m").to_string()),
        )
    };

    let users = store.users()?;
    let trips = store.trips()?;
    let fines = store.fines()?;
    let board = stats::leaderboard(&users, &trips, &fines, month.as_deref());

    if cmd.json {
        let out = serde_json::json!({
            "period": month.as_deref().unwrap_or("all-time"),
            "drivers": board,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match month.as_deref() {
        Some(month) => println!("Leaderboard — {month}"),
        None => println!("Leaderboard — all time"),
    }

    if board.is_empty() {
        println!("No drivers registered for this period.");
        return Ok(());
    }

    for (index, entry) in board.iter().enumerate() {
        println!(
            "{:>2}. {} — {} — {} km, {} trips, profit {}, {} fines",
            index + 1,
            entry.name,
            entry.level,
            entry.totals.distance_km,
            entry.totals.trips,
            entry.totals.net_profit,
            entry.totals.fines,
        );
    }
    Ok(())
}

fn handle_profile(config: &Config, cmd: ProfileCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let current = session::require(&store)?;
    let user = current.user(&store)?;

    match cmd {
        ProfileCommand::Show { json } => {
            let trips = store.trips_for(&current.email)?;
            let driven: i64 = trips.iter().map(|t| t.distance_km).sum();
            let goal = store.goal(&current.email)?.or(Some(config.stats.default_goal_km));
            let quota = stats::quota_progress(driven, goal);

            if json {
                let out = serde_json::json!({
                    "name": user.name,
                    "email": user.email,
                    "status": user.status,
                    "created_at": user.created_at,
                    "has_avatar": user.avatar.is_some(),
                    "quota": quota,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            println!("Name:    {}", user.name);
            println!("Email:   {}", user.email);
            println!("Status:  {}", user.status);
            println!("Since:   {}", user.created_at.format("%Y-%m-%d"));
            println!(
                "Avatar:  {}",
                if user.avatar.is_some() { "set" } else { "none" }
            );
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let percent = quota.percent.round() as u32;
            println!(
                "Goal:    {} / {} km ({percent}%), {} km remaining",
                quota.driven_km, quota.goal_km, quota.remaining_km
            );
        }
        ProfileCommand::Edit { name, password } => {
            if name.is_none() && password.is_none() {
                println!("Nothing to change. Pass --name and/or --password.");
                return Ok(());
            }
            let name = name.unwrap_or(user.name);
            store.update_profile(&current.email, &name, password.as_deref())?;
            println!("Profile updated.");
        }
        ProfileCommand::Avatar { file } => {
            let size = std::fs::metadata(&file)?.len();
            if size > AVATAR_MAX_BYTES {
                return Err(roadlog::Error::AvatarTooLarge {
                    size,
                    limit: AVATAR_MAX_BYTES,
                }
                .into());
            }
            let image = std::fs::read(&file)?;
            store.set_avatar(&current.email, &image)?;
            println!("Avatar updated ({size} bytes).");
        }
        ProfileCommand::Goal { km } => {
            if km <= 0 {
                return Err(roadlog::Error::InvalidGoal { value: km }.into());
            }
            store.set_goal(&current.email, km)?;
            println!("Goal set to {km} km.");
        }
        ProfileCommand::Delete { yes } => {
            if yes {
                store.delete_user(&current.email)?;
                session::logout(&store)?;
                println!("Account and all its records deleted.");
            } else {
                println!("This will delete your account, trips and fines.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

fn handle_admin(config: &Config, cmd: AdminCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    session::require_admin(&store, config)?;

    match cmd {
        AdminCommand::Pending => {
            let pending = store.users_with_status(UserStatus::Pending)?;
            if pending.is_empty() {
                println!("No accounts awaiting approval.");
            } else {
                for user in &pending {
                    println!("{} <{}>", user.name, user.email);
                }
            }
        }
        AdminCommand::Approve { email } => {
            store.set_status(&email, UserStatus::Active)?;
            println!("Approved {email}.");
        }
        AdminCommand::Reject { email, yes } => {
            if yes {
                if store.delete_user(&email)? {
                    println!("Rejected {email}; account and records deleted.");
                } else {
                    return Err(roadlog::Error::unknown_user(&email).into());
                }
            } else {
                println!("This will delete {email} and all their records.");
                println!("Use --yes to confirm.");
            }
        }
    }
    Ok(())
}

async fn handle_status(config: &Config, cmd: &StatusCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let store_stats = store.stats()?;
    let logged_in = session::current(&store)?;

    let source = FileSnapshotSource::new(config.telemetry_path());
    let snapshot = source.fetch().await;

    if cmd.json {
        let out = serde_json::json!({
            "database": {
                "path": config.database_path(),
                "stats": store_stats,
            },
            "session": logged_in.as_ref().map(|s| s.email.clone()),
            "telemetry": {
                "path": config.telemetry_path(),
                "connected": snapshot.connected,
                "odometer_km": snapshot.odometer_km(),
            },
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("roadlog status");
    println!("--------------");
    println!("Database:   {}", config.database_path().display());
    println!(
        "Records:    {} drivers, {} trips, {} fines",
        store_stats.drivers, store_stats.trips, store_stats.fines
    );
    match logged_in {
        Some(s) => println!("Session:    {}", s.email),
        None => println!("Session:    not logged in"),
    }
    println!("Telemetry:  {}", config.telemetry_path().display());
    print_game_state(&snapshot);
    Ok(())
}

/// Print the live-game lines of the status output.
fn print_game_state(snapshot: &Snapshot) {
    if !snapshot.connected {
        println!("Game:       not running");
        return;
    }

    println!("Game:       connected");
    if let Some(km) = snapshot.odometer_km() {
        println!("Odometer:   {} km ({})", km, Level::for_km(km));
    }
    #[allow(clippy::cast_possible_truncation)]
    let speed = snapshot.speed.round() as i64;
    println!("Speed:      {speed} km/h");
    if snapshot.job_active {
        println!(
            "Job:        {} -> {} ({})",
            snapshot.source, snapshot.destination, snapshot.cargo
        );
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:    {}", config.database_path().display());
                println!();
                println!("[Telemetry]");
                println!("  Snapshot file:    {}", config.telemetry_path().display());
                println!(
                    "  Poll interval:    {} ms",
                    config.telemetry.poll_interval_ms
                );
                println!(
                    "  Trip cooldown:    {} s",
                    config.telemetry.trip_cooldown_secs
                );
                println!("  Min trip:         {} km", config.telemetry.min_trip_km);
                println!();
                println!("[Stats]");
                println!("  Default goal:     {} km", config.stats.default_goal_km);
                println!();
                println!("[Admin]");
                println!(
                    "  Admin email:      {}",
                    config.admin.email.as_deref().unwrap_or("(none)")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

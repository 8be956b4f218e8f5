//! FitSocial - command line entry point.
//!
//! Inspects the local social database:
//!
//! ```text
//! fitsocial friends <user-id>
//! fitsocial feed <user-id> [friends|global] [page]
//! fitsocial leaderboard <user-id> <type> [friends|global]
//! fitsocial strength <user-id> <exercise> [friends|global]
//! fitsocial popular [limit]
//! fitsocial invite <user-id>
//! fitsocial init-config
//! ```

use anyhow::{bail, Context};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use fitsocial::leaderboards::{LeaderboardType, StaticStreaks};
use fitsocial::social::{Scope, StaticAuth};
use fitsocial::storage::config;
use fitsocial::storage::Database;
use fitsocial::{SocialHub, SocialStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FitSocial v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    let config = config::load_config().context("loading configuration")?;

    if command == "init-config" {
        config::save_config(&config).context("writing configuration")?;
        println!("{}", config::get_config_path().display());
        return Ok(());
    }

    let db_path = config.database_path();
    let db = Database::open(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    let version = db.version().context("reading schema version")?;
    tracing::info!(path = %db_path.display(), version, "Database ready");

    let auth = Arc::new(StaticAuth::anonymous());
    let hub = SocialHub::new(
        SocialStore::new(Arc::new(db)),
        &config,
        auth.clone(),
        Arc::new(StaticStreaks::new()),
    );

    match command.as_str() {
        "friends" => {
            auth.sign_in(user_arg(&args, 1)?);
            for friend in hub.friends().await? {
                println!("{}  {}", friend.profile.id, friend.profile.display_name);
            }
        }
        "feed" => {
            auth.sign_in(user_arg(&args, 1)?);
            let scope = scope_arg(&args, 2)?;
            let page = match args.get(3) {
                Some(p) => p.parse().context("page must be a number")?,
                None => 0,
            };
            let feed = hub.activity_feed(scope, page).await?;
            for entry in &feed.entries {
                let owner = entry
                    .profile
                    .as_ref()
                    .map(|p| p.display_name.as_str())
                    .unwrap_or("Unknown");
                println!(
                    "{}  {}  {}  {:.0} kg  {} reactions",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    owner,
                    entry.workout_name,
                    entry.total_volume_kg,
                    entry.reactions.len()
                );
            }
            if feed.has_more {
                println!("(more on page {})", page + 1);
            }
        }
        "leaderboard" => {
            auth.sign_in(user_arg(&args, 1)?);
            let name = args.get(2).context("missing leaderboard type")?;
            let entry_type = LeaderboardType::from_str(name)
                .with_context(|| format!("unknown leaderboard type '{}'", name))?;
            let board = hub.leaderboard(entry_type, scope_arg(&args, 3)?, 25).await?;
            println!("{} for week of {}", entry_type.as_str(), board.week_start);
            for entry in &board.entries {
                let marker = if entry.is_current_user { "*" } else { " " };
                println!("{}{:>3}. {:<24} {:>10.1}", marker, entry.rank, entry.display_name, entry.value);
            }
        }
        "strength" => {
            auth.sign_in(user_arg(&args, 1)?);
            let exercise = args.get(2).context("missing exercise name")?;
            for entry in hub
                .strength_leaderboard(exercise, scope_arg(&args, 3)?, 25)
                .await?
            {
                println!(
                    "{:>3}. {:<24} {:.2}x ({:.1} kg @ {:.1} kg)",
                    entry.rank,
                    entry.display_name,
                    entry.ratio,
                    entry.lifted_load_kg,
                    entry.bodyweight_kg
                );
            }
        }
        "popular" => {
            let limit = match args.get(1) {
                Some(n) => n.parse().context("limit must be a number")?,
                None => 10,
            };
            for name in hub.leaderboards().popular_exercises(limit).await? {
                println!("{}", name);
            }
        }
        "invite" => {
            auth.sign_in(user_arg(&args, 1)?);
            match hub.pending_session_invite().await? {
                Some(session) => println!(
                    "{}  hosted by {}  {} participants",
                    session.id,
                    session.host_id,
                    session.participant_ids.len()
                ),
                None => println!("No pending invite"),
            }
        }
        other => {
            print_usage();
            bail!("unknown command '{}'", other);
        }
    }

    Ok(())
}

fn user_arg(args: &[String], index: usize) -> anyhow::Result<Uuid> {
    let raw = args.get(index).context("missing user id")?;
    Uuid::parse_str(raw).with_context(|| format!("invalid user id '{}'", raw))
}

fn scope_arg(args: &[String], index: usize) -> anyhow::Result<Scope> {
    match args.get(index) {
        None => Ok(Scope::Friends),
        Some(raw) => Scope::from_str(raw).with_context(|| format!("invalid scope '{}'", raw)),
    }
}

fn print_usage() {
    eprintln!("usage: fitsocial <friends|feed|leaderboard|strength|popular|invite|init-config> ...");
}

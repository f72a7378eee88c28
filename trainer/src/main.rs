//! Command-line driver for the opening trainer.
//!
//! Browsing commands print the embedded catalogue. `train` runs one session
//! interactively: moves are typed as UCI (`e2e4`, `e7e8q`) and the session's
//! events are printed as they arrive.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chess::{DisplayBoard, PieceColor};
use clap::{Parser, Subcommand, ValueEnum};
use openings::{flatten_variations, CategoryKind, OpeningRepository, CATEGORIES};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use trainer::config::{get_data_dir, Timings};
use trainer::persistence::{now_timestamp, JsonBlobStore};
use trainer::session::{FeedbackKind, MoveOutcome, SessionPhase};
use trainer::{
    MoveIntent, ProgressState, Repertoire, SessionEvent, SessionSnapshot, Trainer, TrainingMode,
};

#[derive(Parser)]
#[command(name = "opening-trainer", about = "Drill chess opening lines from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List openings.
    List {
        /// Only openings for this side.
        #[arg(short, long)]
        color: Option<PieceColor>,
        /// Case-insensitive match on name, ECO code or tag.
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show an opening and its variation tree.
    Show { opening: String },
    /// Group openings into categories.
    Categories,
    /// Train one variation.
    Train {
        opening: String,
        variation: String,
        #[arg(short, long, value_enum, default_value_t = ModeArg::Practice)]
        mode: ModeArg,
        /// Side you play. Required for versus; optional for practice.
        #[arg(long)]
        side: Option<PieceColor>,
    },
    /// Show recorded progress.
    Progress,
    /// Manage your repertoire.
    Repertoire {
        #[command(subcommand)]
        action: RepertoireAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Demo,
    Practice,
    Versus,
}

#[derive(Subcommand)]
enum RepertoireAction {
    List {
        #[arg(short, long)]
        color: Option<PieceColor>,
    },
    Add {
        color: PieceColor,
        opening: String,
        variation: String,
        #[arg(short, long)]
        group: Option<String>,
    },
    Remove {
        color: PieceColor,
        opening: String,
        variation: String,
    },
    Stats {
        #[arg(short, long)]
        color: Option<PieceColor>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = get_data_dir();
    tracing::debug!("Using data directory: {}", data_dir.display());
    let repository = OpeningRepository::embedded();

    match cli.command {
        Commands::List { color, search } => list(&repository, color, search.as_deref()),
        Commands::Show { opening } => show(&repository, &opening),
        Commands::Categories => categories(&repository),
        Commands::Train {
            opening,
            variation,
            mode,
            side,
        } => {
            let mode = match (mode, side) {
                (ModeArg::Demo, _) => TrainingMode::Demo,
                (ModeArg::Practice, side) => TrainingMode::Practice { side },
                (ModeArg::Versus, Some(human)) => TrainingMode::VersusComputer { human },
                (ModeArg::Versus, None) => bail!("versus mode needs --side white|black"),
            };
            let trainer = Trainer::new(repository, Timings::from_env())
                .with_store(JsonBlobStore::new(&data_dir));
            train(&trainer, &opening, &variation, mode).await
        }
        Commands::Progress => progress(&repository, &data_dir),
        Commands::Repertoire { action } => repertoire(&repository, &data_dir, action),
    }
}

fn list(
    repository: &OpeningRepository,
    color: Option<PieceColor>,
    search: Option<&str>,
) -> Result<()> {
    let openings = match search {
        Some(query) => repository.search(query),
        None => repository.all().iter().collect(),
    };
    for opening in openings
        .into_iter()
        .filter(|o| color.is_none_or(|c| o.color == c))
    {
        println!(
            "{:<20} {:<4} {:<6} {}",
            opening.id, opening.eco, opening.color.as_str(), opening.name
        );
    }
    Ok(())
}

fn show(repository: &OpeningRepository, opening_id: &str) -> Result<()> {
    let opening = repository
        .get_by_id(opening_id)
        .ok_or_else(|| anyhow!("unknown opening: {}", opening_id))?;

    println!("{} ({}), {}", opening.name, opening.eco, opening.color);
    println!("{}", opening.description);
    if !opening.tags.is_empty() {
        println!("tags: {}", opening.tags.join(", "));
    }
    for variation in flatten_variations(opening) {
        let line = repository
            .resolve_line(&opening.id, &variation.id)
            .map(|l| l.sans().join(" "))
            .unwrap_or_default();
        println!("  {:<24} {:<28} {}", variation.id, variation.name, line);
    }
    Ok(())
}

fn categories(repository: &OpeningRepository) -> Result<()> {
    let groups = repository.categorize(CATEGORIES);
    for kind in CategoryKind::ALL {
        println!("{}", kind.heading());
        for group in groups.iter().filter(|g| g.category.kind == kind) {
            println!("  {} ({})", group.category.name, group.openings.len());
            for opening in &group.openings {
                println!("    {:<20} {}", opening.id, opening.name);
            }
        }
    }
    Ok(())
}

fn progress(repository: &OpeningRepository, data_dir: &Path) -> Result<()> {
    let state = JsonBlobStore::<ProgressState>::new(data_dir).load_or_default();
    println!("completed variations: {}", state.total_completed);
    for (opening_id, opening) in &state.openings {
        let name = repository
            .get_by_id(opening_id)
            .map(|o| o.name.as_str())
            .unwrap_or(opening_id);
        println!("{}", name);
        for entry in opening.variations.values() {
            println!(
                "  {:<24} attempts {:>3}  best {:>3}%  {}",
                entry.variation_id,
                entry.attempts,
                entry.best_score,
                if entry.completed_at.is_some() { "done" } else { "" }
            );
        }
    }
    Ok(())
}

fn repertoire(
    repository: &OpeningRepository,
    data_dir: &Path,
    action: RepertoireAction,
) -> Result<()> {
    let store = JsonBlobStore::<Repertoire>::new(data_dir);
    let mut repertoire = store.load_or_default();

    match action {
        RepertoireAction::List { color } => {
            let colors = match color {
                Some(c) => vec![c],
                None => vec![PieceColor::White, PieceColor::Black],
            };
            for color in colors {
                println!("{}", color);
                for group in repertoire.sorted_groups() {
                    let items = repertoire.items_by_group(color, &group.id);
                    if items.is_empty() {
                        continue;
                    }
                    println!("  {}", group.name);
                    for item in items {
                        println!("    {} / {}", item.opening_id, item.variation_id);
                    }
                }
            }
        }
        RepertoireAction::Add {
            color,
            opening,
            variation,
            group,
        } => {
            if repository.get_variation(&opening, &variation).is_none() {
                bail!("unknown variation {} of {}", variation, opening);
            }
            if let Some(group) = group.as_deref() {
                if repertoire.group_by_id(group).is_none() {
                    bail!("unknown group: {}", group);
                }
            }
            if repertoire.add(color, &opening, &variation, group.as_deref(), now_timestamp()) {
                store.save(&repertoire).context("saving repertoire")?;
                println!("added {} / {}", opening, variation);
            } else {
                println!("already in repertoire");
            }
        }
        RepertoireAction::Remove {
            color,
            opening,
            variation,
        } => {
            if repertoire.remove(color, &opening, &variation) {
                store.save(&repertoire).context("saving repertoire")?;
                println!("removed {} / {}", opening, variation);
            } else {
                println!("not in repertoire");
            }
        }
        RepertoireAction::Stats { color } => {
            let progress = JsonBlobStore::<ProgressState>::new(data_dir).load_or_default();
            let stats = repertoire.stats(&progress, color);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}

async fn train(
    trainer: &Trainer,
    opening_id: &str,
    variation_id: &str,
    mode: TrainingMode,
) -> Result<()> {
    let handle = trainer.open_session(opening_id, variation_id).await?;
    let (initial, rx) = handle.subscribe().await?;
    let mut events = BroadcastStream::new(rx);
    let flipped = matches!(
        mode,
        TrainingMode::Practice {
            side: Some(PieceColor::Black)
        } | TrainingMode::VersusComputer {
            human: PieceColor::Black
        }
    );

    println!("{} / {}", initial.opening_name, initial.variation_name);
    println!("Type moves as e2e4; commands: hint, reset, start, quit");
    let snapshot = handle.start(mode).await?;
    print_snapshot(&snapshot, flipped);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_printed = snapshot;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => continue,
                    "quit" | "q" => break,
                    "hint" | "h" => {
                        let snapshot = handle.hint().await?;
                        print_feedback(&snapshot);
                    }
                    "reset" => {
                        handle.reset().await?;
                        println!("Session reset. Type start to go again.");
                    }
                    "start" => {
                        handle.start(mode).await?;
                    }
                    input => match MoveIntent::from_uci(input) {
                        Some(intent) => {
                            let (outcome, _) = handle.submit_move(intent).await?;
                            if let MoveOutcome::Rejected(reason) = outcome {
                                println!("move rejected: {:?}", reason);
                            }
                        }
                        None => println!("not a move: {}", input),
                    },
                }
            }
            event = events.next() => {
                match event {
                    Some(Ok(SessionEvent::StateChanged(snapshot))) => {
                        if snapshot.history != last_printed.history
                            || snapshot.phase != last_printed.phase
                        {
                            print_snapshot(&snapshot, flipped);
                        } else if snapshot.feedback != last_printed.feedback {
                            print_feedback(&snapshot);
                        }
                        last_printed = snapshot;
                    }
                    Some(Ok(SessionEvent::Completed(stats))) => {
                        println!(
                            "Line complete: {} correct, {} incorrect, accuracy {}%{}",
                            stats.correct,
                            stats.incorrect,
                            stats.accuracy,
                            stats.outcome.map(|o| format!(" ({:?})", o)).unwrap_or_default()
                        );
                        println!("Type start to go again or quit to leave.");
                    }
                    Some(Err(e)) => tracing::warn!("Missed session events: {}", e),
                    None => break,
                }
            }
        }
    }

    trainer.close_session().await;
    Ok(())
}

fn print_snapshot(snapshot: &SessionSnapshot, flipped: bool) {
    let highlight: Vec<(u8, u8)> = snapshot
        .last_move
        .iter()
        .flat_map(|(from, to)| [square_coords(from), square_coords(to)])
        .flatten()
        .collect();
    match DisplayBoard::from_fen(&snapshot.fen) {
        Ok(board) => print!("{}", board.render_ascii(flipped, &highlight)),
        Err(e) => tracing::warn!("Cannot render board: {}", e),
    }
    if !snapshot.history.is_empty() {
        println!("{}", snapshot.move_text());
    }
    if snapshot.is_checkmate {
        println!("Checkmate.");
    } else if snapshot.is_check {
        println!("Check.");
    }
    if let SessionPhase::Running(_) = snapshot.phase {
        println!(
            "{} to move, line {}/{} ({}%)",
            snapshot.side_to_move, snapshot.cursor, snapshot.line_length, snapshot.progress_percent
        );
    }
    print_feedback(snapshot);
}

fn print_feedback(snapshot: &SessionSnapshot) {
    if let Some(feedback) = &snapshot.feedback {
        let marker = match feedback.kind {
            FeedbackKind::Correct => "+",
            FeedbackKind::Incorrect => "x",
            FeedbackKind::Hint => "?",
        };
        println!("[{}] {}", marker, feedback.message);
    }
}

fn square_coords(square: &str) -> Option<(u8, u8)> {
    let bytes = square.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].checked_sub(b'a')?;
    let rank = bytes[1].checked_sub(b'1')?;
    (file < 8 && rank < 8).then_some((file, rank))
}

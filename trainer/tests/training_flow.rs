//! End-to-end training runs against the embedded opening catalogue.

use std::time::Duration;

use chess::PieceColor;
use openings::OpeningRepository;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast;
use trainer::config::Timings;
use trainer::persistence::JsonBlobStore;
use trainer::session::{MoveOutcome, SessionError, SessionPhase};
use trainer::{MoveIntent, ProgressState, SessionEvent, SessionSnapshot, Trainer, TrainingMode};

fn trainer() -> Trainer {
    Trainer::new(OpeningRepository::embedded(), Timings::default())
}

async fn wait_for_history(
    events: &mut broadcast::Receiver<SessionEvent>,
    len: usize,
) -> SessionSnapshot {
    loop {
        if let SessionEvent::StateChanged(snap) = events.recv().await.unwrap() {
            if snap.history.len() >= len {
                return snap;
            }
        }
    }
}

#[tokio::test]
async fn test_unknown_opening_or_variation() {
    let trainer = trainer();
    assert!(matches!(
        trainer.open_session("kings-indian", "classical").await,
        Err(SessionError::NotFound(_))
    ));
    assert!(matches!(
        trainer.open_session("italian-game", "no-such-line").await,
        Err(SessionError::NotFound(_))
    ));
    assert!(trainer.active().await.is_none());
}

async fn wait_for_saved(store: &JsonBlobStore<ProgressState>) -> ProgressState {
    for _ in 0..200 {
        if let Ok(Some(state)) = store.load() {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("progress never saved to {:?}", store.file_path());
}

#[tokio::test]
async fn test_practice_nested_variation_persists_progress() {
    let dir = tempfile::tempdir().unwrap();
    let trainer = trainer().with_store(JsonBlobStore::new(dir.path()));
    let line = trainer
        .repository()
        .resolve_line("italian-game", "giuoco-piano-main")
        .unwrap();
    // Starting moves, then the parent variation, then the branch.
    assert_eq!(line.len(), 5 + 4 + 7);

    let handle = trainer
        .open_session("italian-game", "giuoco-piano-main")
        .await
        .unwrap();
    let (_, mut events) = handle.subscribe().await.unwrap();
    handle
        .start(TrainingMode::Practice { side: None })
        .await
        .unwrap();

    for book in &line.moves {
        let (outcome, _) = handle
            .submit_move(MoveIntent::from_uci(&book.uci).unwrap())
            .await
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Correct { san: book.san.clone() });
    }

    let stats = loop {
        if let SessionEvent::Completed(stats) = events.recv().await.unwrap() {
            break stats;
        }
    };
    assert_eq!(stats.correct, 16);
    assert_eq!(stats.accuracy, 100);

    let snap = handle.get_snapshot().await.unwrap();
    assert!(matches!(snap.phase, SessionPhase::Complete(_)));
    assert_eq!(snap.progress_percent, 100);

    let progress = trainer.progress().await;
    assert_eq!(progress.total_completed, 1);

    // The save lands in the background; a fresh trainer then sees it.
    let saved = wait_for_saved(&JsonBlobStore::new(dir.path())).await;
    let entry = saved.variation("italian-game", "giuoco-piano-main").unwrap();
    assert_eq!(entry.best_score, 100);
    assert!(entry.completed_at.is_some());

    let reopened = Trainer::new(OpeningRepository::embedded(), Timings::default())
        .with_store(JsonBlobStore::new(dir.path()));
    assert_eq!(reopened.progress().await.total_completed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_practice_wrong_move_keeps_position() {
    let trainer = trainer();
    let handle = trainer.open_session("sicilian-defense", "najdorf").await.unwrap();
    handle
        .start(TrainingMode::Practice { side: None })
        .await
        .unwrap();

    let (outcome, snap) = handle
        .submit_move(MoveIntent::new("d2", "d4"))
        .await
        .unwrap();
    match outcome {
        MoveOutcome::Incorrect {
            expected, applied, ..
        } => {
            assert_eq!(expected.unwrap().san, "e4");
            assert!(!applied);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(snap.history.is_empty());
    assert_eq!(snap.fen, chess::STARTING_FEN);
    assert_eq!(snap.incorrect, 1);

    let (outcome, _) = handle
        .submit_move(MoveIntent::new("e2", "e5"))
        .await
        .unwrap();
    assert!(outcome.is_rejected());
}

#[tokio::test(start_paused = true)]
async fn test_versus_plays_book_then_leaves_it() {
    let trainer = trainer();
    let line = trainer
        .repository()
        .resolve_line("italian-game", "evans-gambit")
        .unwrap();
    let handle = trainer.open_line_with_rng(line.clone(), StdRng::seed_from_u64(3)).await;
    let (_, mut events) = handle.subscribe().await.unwrap();
    handle
        .start(TrainingMode::VersusComputer {
            human: PieceColor::White,
        })
        .await
        .unwrap();

    let mut snap = handle.get_snapshot().await.unwrap();
    for (ply, book) in line.moves.iter().enumerate().step_by(2) {
        assert_eq!(snap.history.len(), ply);
        let (outcome, _) = handle
            .submit_move(MoveIntent::from_uci(&book.uci).unwrap())
            .await
            .unwrap();
        assert!(matches!(outcome, MoveOutcome::Correct { .. }));
        // The computer answers every move, in book or not.
        snap = wait_for_history(&mut events, ply + 2).await;
        if ply + 1 < line.len() {
            assert_eq!(snap.history[ply + 1], line.moves[ply + 1].san);
        }
    }

    assert_eq!(snap.correct, 6);
    assert_eq!(snap.incorrect, 0);
    assert!(!snap.in_book);
    assert_eq!(snap.side_to_move, PieceColor::White);
    assert!(matches!(snap.phase, SessionPhase::Running(_)));
}

#[tokio::test]
async fn test_opening_a_session_closes_the_previous_one() {
    let trainer = trainer();
    let first = trainer.open_session("french-defense", "winawer").await.unwrap();
    let second = trainer.open_session("queens-gambit", "slav").await.unwrap();

    assert!(first.get_snapshot().await.is_err());
    let snap = second.get_snapshot().await.unwrap();
    assert_eq!(snap.opening_id, "queens-gambit");
    assert_eq!(trainer.active().await.unwrap().id(), second.id());

    trainer.close_session().await;
    assert!(second.get_snapshot().await.is_err());
    assert!(trainer.active().await.is_none());
}

use std::time::Duration;

use chess::{PieceColor, PlayedMove, Position};
use openings::{BookLine, BookMove};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use uuid::Uuid;

use crate::config::Timings;
use crate::matcher::{is_expected_move, MoveIntent};
use crate::opponent::OpponentDriver;

use super::mode::{
    accuracy, CompletionStats, Feedback, FeedbackKind, GameOutcome, MoveOutcome, RejectReason,
    SessionPhase, TrainingMode,
};
use super::snapshot::SessionSnapshot;
use super::timers::{ScheduledTask, TimerAction, TimerToken};

const CORRECT_MESSAGE: &str = "Correct move!";
const NO_HINT_MESSAGE: &str = "No hint available - play any legal move!";

/// One training run over one book line.
///
/// Everything here is synchronous and runs to completion. Deferred work is
/// expressed as [`ScheduledTask`]s collected with [`take_scheduled`] and fed
/// back through [`fire`].
///
/// [`take_scheduled`]: TrainingSession::take_scheduled
/// [`fire`]: TrainingSession::fire
pub struct TrainingSession {
    session_id: String,
    line: BookLine,
    start: Position,
    position: Position,
    history: Vec<PlayedMove>,
    cursor: usize,
    phase: SessionPhase,
    correct: u32,
    incorrect: u32,
    feedback: Option<Feedback>,
    feedback_token: Option<TimerToken>,
    outcome: Option<GameOutcome>,
    driver: OpponentDriver,
    timings: Timings,
    generation: u64,
    next_seq: u64,
    outbox: Vec<ScheduledTask>,
    rng: Box<dyn RngCore + Send>,
}

impl TrainingSession {
    pub fn new(line: BookLine, timings: Timings) -> Self {
        let driver = OpponentDriver::new(line.moves.clone());
        Self {
            session_id: Uuid::new_v4().to_string(),
            line,
            start: Position::new(),
            position: Position::new(),
            history: Vec::new(),
            cursor: 0,
            phase: SessionPhase::NotStarted,
            correct: 0,
            incorrect: 0,
            feedback: None,
            feedback_token: None,
            outcome: None,
            driver,
            timings,
            generation: 0,
            next_seq: 0,
            outbox: Vec::new(),
            rng: Box::new(StdRng::from_os_rng()),
        }
    }

    /// Replace the random source used by the opponent once out of book.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn line(&self) -> &BookLine {
        &self.line
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn counts(&self) -> (u32, u32) {
        (self.correct, self.incorrect)
    }

    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    /// Drain the tasks scheduled since the last call.
    pub fn take_scheduled(&mut self) -> Vec<ScheduledTask> {
        std::mem::take(&mut self.outbox)
    }

    /// Back to `NotStarted` with the start position. Every task scheduled so
    /// far becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.outbox.clear();
        self.position = self.start.clone();
        self.history.clear();
        self.cursor = 0;
        self.phase = SessionPhase::NotStarted;
        self.correct = 0;
        self.incorrect = 0;
        self.feedback = None;
        self.feedback_token = None;
        self.outcome = None;
        self.driver.reset();
        tracing::debug!(generation = self.generation, "Session reset");
    }

    /// Start `mode` from a clean slate.
    pub fn start(&mut self, mode: TrainingMode) {
        self.reset();
        self.phase = SessionPhase::Running(mode);
        tracing::info!(
            opening = %self.line.opening_id,
            variation = %self.line.variation_id,
            ?mode,
            "Training started"
        );

        match mode {
            TrainingMode::Demo => {
                if self.line.is_empty() {
                    self.complete();
                } else {
                    self.schedule(TimerAction::DemoAdvance, self.timings.demo_interval);
                }
            }
            TrainingMode::Practice { side } => {
                if self.line.is_empty() {
                    self.complete();
                } else {
                    self.schedule_practice_reply(side);
                }
            }
            TrainingMode::VersusComputer { human } => self.schedule_computer_reply(human),
        }
    }

    /// Handle a move from the user.
    pub fn submit_move(&mut self, intent: &MoveIntent) -> MoveOutcome {
        let SessionPhase::Running(mode) = self.phase else {
            return MoveOutcome::Rejected(RejectReason::NotAccepting);
        };
        match mode {
            TrainingMode::Demo => MoveOutcome::Rejected(RejectReason::NotAccepting),
            TrainingMode::Practice { side } => self.submit_practice(intent, side),
            TrainingMode::VersusComputer { human } => self.submit_versus(intent, human),
        }
    }

    fn submit_practice(&mut self, intent: &MoveIntent, side: Option<PieceColor>) -> MoveOutcome {
        if side.is_some_and(|s| s != self.position.side_to_move()) {
            return MoveOutcome::Rejected(RejectReason::NotYourTurn);
        }
        let Some(expected) = self.line.get(self.cursor).cloned() else {
            return MoveOutcome::Rejected(RejectReason::NotAccepting);
        };
        let Ok((next, played)) = self
            .position
            .apply_move(&intent.from, &intent.to, intent.promotion)
        else {
            return MoveOutcome::Rejected(RejectReason::Illegal);
        };

        // Compare the canonical squares so castling written as king-takes-rook
        // still matches the book.
        let attempt = MoveIntent {
            from: played.from.clone(),
            to: played.to.clone(),
            promotion: intent.promotion,
        };
        if !is_expected_move(&attempt, &expected) {
            self.incorrect += 1;
            self.set_feedback(
                FeedbackKind::Incorrect,
                format!("Not quite! Expected: {}", expected.san),
                Some(expected.san.clone()),
                self.timings.feedback_duration,
            );
            tracing::debug!(attempted = %played.san, expected = %expected.san, "Practice mismatch");
            return MoveOutcome::Incorrect {
                attempted: played.san,
                expected: Some(expected),
                applied: false,
            };
        }

        // The book decides the promotion piece when the user left it out.
        let (next, played) = self
            .position
            .apply_uci(&expected.uci)
            .unwrap_or((next, played));
        let san = played.san.clone();
        self.commit(next, played);
        self.cursor += 1;
        self.correct += 1;
        self.set_feedback(
            FeedbackKind::Correct,
            CORRECT_MESSAGE.to_string(),
            None,
            self.timings.feedback_duration,
        );

        if self.cursor >= self.line.len() {
            self.complete();
        } else {
            self.schedule_practice_reply(side);
        }
        MoveOutcome::Correct { san }
    }

    fn submit_versus(&mut self, intent: &MoveIntent, human: PieceColor) -> MoveOutcome {
        if self.position.side_to_move() != human {
            return MoveOutcome::Rejected(RejectReason::NotYourTurn);
        }
        let Ok((next, played)) = self
            .position
            .apply_move(&intent.from, &intent.to, intent.promotion)
        else {
            return MoveOutcome::Rejected(RejectReason::Illegal);
        };
        let san = played.san.clone();

        let outcome = if self.driver.is_in_book() {
            let expected = self.driver.hint().cloned();
            if self.driver.check_player_move(&san) {
                self.correct += 1;
                self.set_feedback(
                    FeedbackKind::Correct,
                    CORRECT_MESSAGE.to_string(),
                    None,
                    self.timings.feedback_duration,
                );
                MoveOutcome::Correct { san }
            } else {
                self.incorrect += 1;
                self.driver.leave_book();
                let expected_san = expected.as_ref().map(|m| m.san.clone());
                self.set_feedback(
                    FeedbackKind::Incorrect,
                    format!(
                        "That's not the opening move! Expected: {}",
                        expected_san.as_deref().unwrap_or("?")
                    ),
                    expected_san,
                    self.timings.feedback_duration,
                );
                MoveOutcome::Incorrect {
                    attempted: san,
                    expected,
                    applied: true,
                }
            }
        } else {
            MoveOutcome::Played { san }
        };

        self.commit(next, played);
        self.cursor = self.driver.cursor();
        if !self.finish_if_game_over(human) {
            self.schedule_computer_reply(human);
        }
        outcome
    }

    /// Show the next book move, if there is one.
    pub fn request_hint(&mut self) -> bool {
        let SessionPhase::Running(mode) = self.phase else {
            return false;
        };
        let next = match mode {
            TrainingMode::Demo => return false,
            TrainingMode::Practice { .. } => self.line.get(self.cursor).cloned(),
            TrainingMode::VersusComputer { .. } => self.driver.hint().cloned(),
        };
        match next {
            Some(book) => self.set_feedback(
                FeedbackKind::Hint,
                format!("Hint: {}", book.san),
                Some(book.san),
                self.timings.hint_duration,
            ),
            None => self.set_feedback(
                FeedbackKind::Hint,
                NO_HINT_MESSAGE.to_string(),
                None,
                self.timings.feedback_duration,
            ),
        }
        true
    }

    /// Run a scheduled task. Returns whether anything changed; stale tasks
    /// never change anything.
    pub fn fire(&mut self, task: &ScheduledTask) -> bool {
        if task.token.generation != self.generation {
            tracing::debug!(
                task_generation = task.token.generation,
                generation = self.generation,
                "Ignoring stale timer"
            );
            return false;
        }

        match task.action {
            TimerAction::ClearFeedback => {
                if self.feedback_token == Some(task.token) {
                    self.feedback = None;
                    self.feedback_token = None;
                    true
                } else {
                    false
                }
            }
            TimerAction::DemoAdvance => self.demo_advance(),
            TimerAction::OpponentMove => match self.phase {
                SessionPhase::Running(TrainingMode::Practice { side: Some(side) }) => {
                    self.practice_reply(side)
                }
                SessionPhase::Running(TrainingMode::VersusComputer { human }) => {
                    self.computer_reply(human)
                }
                _ => false,
            },
        }
    }

    fn demo_advance(&mut self) -> bool {
        if self.phase != SessionPhase::Running(TrainingMode::Demo) {
            return false;
        }
        if !self.play_book_move() {
            self.complete();
            return true;
        }
        if self.cursor >= self.line.len() {
            self.complete();
        } else {
            self.schedule(TimerAction::DemoAdvance, self.timings.demo_interval);
        }
        true
    }

    fn practice_reply(&mut self, side: PieceColor) -> bool {
        if self.position.side_to_move() == side || self.cursor >= self.line.len() {
            return false;
        }
        if !self.play_book_move() || self.cursor >= self.line.len() {
            self.complete();
        }
        true
    }

    fn computer_reply(&mut self, human: PieceColor) -> bool {
        if self.position.side_to_move() == human {
            return false;
        }
        let Some(choice) = self.driver.next_move(&self.position, &mut self.rng) else {
            return self.finish_if_game_over(human);
        };
        match self.position.apply_uci(&choice.uci) {
            Ok((next, played)) => {
                tracing::debug!(san = %choice.san, from_book = choice.from_book, "Opponent moved");
                self.commit(next, played);
                self.cursor = self.driver.cursor();
                self.finish_if_game_over(human);
                true
            }
            Err(e) => {
                tracing::warn!(uci = %choice.uci, "Opponent produced an unplayable move: {}", e);
                false
            }
        }
    }

    /// Apply the book move at the cursor. False if the line is exhausted or
    /// the move does not apply.
    fn play_book_move(&mut self) -> bool {
        let Some(book) = self.line.get(self.cursor) else {
            return false;
        };
        match self.position.apply_uci(&book.uci) {
            Ok((next, played)) => {
                self.commit(next, played);
                self.cursor += 1;
                true
            }
            Err(e) => {
                tracing::warn!(
                    index = self.cursor,
                    uci = %book.uci,
                    "Book move does not apply: {}",
                    e
                );
                false
            }
        }
    }

    fn commit(&mut self, next: Position, played: PlayedMove) {
        self.position = next;
        self.history.push(played);
    }

    fn schedule(&mut self, action: TimerAction, delay: Duration) -> TimerToken {
        let token = TimerToken {
            generation: self.generation,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.outbox.push(ScheduledTask {
            token,
            delay,
            action,
        });
        token
    }

    fn set_feedback(
        &mut self,
        kind: FeedbackKind,
        message: String,
        expected: Option<String>,
        duration: Duration,
    ) {
        let token = self.schedule(TimerAction::ClearFeedback, duration);
        self.feedback = Some(Feedback {
            kind,
            message,
            expected,
        });
        self.feedback_token = Some(token);
    }

    fn schedule_practice_reply(&mut self, side: Option<PieceColor>) {
        if let Some(side) = side {
            if self.position.side_to_move() != side && self.cursor < self.line.len() {
                self.schedule(TimerAction::OpponentMove, self.timings.opponent_delay);
            }
        }
    }

    fn schedule_computer_reply(&mut self, human: PieceColor) {
        if self.position.side_to_move() != human && !self.position.is_game_over() {
            self.schedule(TimerAction::OpponentMove, self.timings.opponent_delay);
        }
    }

    /// End a versus game on mate, stalemate or another terminal position.
    fn finish_if_game_over(&mut self, human: PieceColor) -> bool {
        if !self.position.is_game_over() {
            return false;
        }
        let outcome = if self.position.is_checkmate() {
            // The side to move is the one mated.
            if self.position.side_to_move() == human {
                GameOutcome::Lost
            } else {
                GameOutcome::Won
            }
        } else {
            GameOutcome::Drawn
        };
        self.outcome = Some(outcome);
        self.complete();
        true
    }

    fn complete(&mut self) {
        if let SessionPhase::Running(mode) = self.phase {
            self.phase = SessionPhase::Complete(mode);
            tracing::info!(
                correct = self.correct,
                incorrect = self.incorrect,
                outcome = ?self.outcome,
                "Training complete"
            );
        }
    }

    /// Scores for a completed session.
    pub fn completion(&self) -> Option<CompletionStats> {
        let SessionPhase::Complete(mode) = self.phase else {
            return None;
        };
        Some(CompletionStats {
            opening_id: self.line.opening_id.clone(),
            variation_id: self.line.variation_id.clone(),
            mode,
            correct: self.correct,
            incorrect: self.incorrect,
            accuracy: accuracy(self.correct, self.incorrect),
            outcome: self.outcome,
        })
    }

    /// Is the user allowed to move right now?
    pub fn accepts_input(&self) -> bool {
        match self.phase {
            SessionPhase::Running(TrainingMode::Practice { side }) => {
                side.is_none_or(|s| s == self.position.side_to_move())
            }
            SessionPhase::Running(TrainingMode::VersusComputer { human }) => {
                human == self.position.side_to_move()
            }
            _ => false,
        }
    }

    /// The next book move, as surfaced to hint arrows.
    pub fn expected_move(&self) -> Option<&BookMove> {
        match self.phase {
            SessionPhase::Running(TrainingMode::VersusComputer { .. }) => self.driver.hint(),
            SessionPhase::Running(_) => self.line.get(self.cursor),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let line_length = self.line.len();
        let progress_percent = if line_length == 0 {
            100
        } else {
            (self.cursor.min(line_length) * 100 / line_length) as u8
        };

        SessionSnapshot {
            session_id: self.session_id.clone(),
            generation: self.generation,
            opening_id: self.line.opening_id.clone(),
            opening_name: self.line.opening_name.clone(),
            variation_id: self.line.variation_id.clone(),
            variation_name: self.line.variation_name.clone(),
            fen: self.position.to_fen(),
            side_to_move: self.position.side_to_move(),
            is_check: self.position.is_check(),
            is_checkmate: self.position.is_checkmate(),
            is_stalemate: self.position.is_stalemate(),
            history: self.history.iter().map(|m| m.san.clone()).collect(),
            last_move: self.history.last().map(|m| (m.from.clone(), m.to.clone())),
            cursor: self.cursor,
            line_length,
            progress_percent,
            phase: self.phase,
            feedback: self.feedback.clone(),
            correct: self.correct,
            incorrect: self.incorrect,
            accuracy: accuracy(self.correct, self.incorrect),
            outcome: self.outcome,
            in_book: self.driver.is_in_book(),
            legal_moves: if self.accepts_input() {
                self.position.legal_moves()
            } else {
                Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(pairs: &[(&str, &str)]) -> TrainingSession {
        let line = BookLine::from_pairs("test", PieceColor::White, pairs);
        TrainingSession::new(line, Timings::default()).with_rng(StdRng::seed_from_u64(11))
    }

    fn intent(uci: &str) -> MoveIntent {
        MoveIntent::from_uci(uci).unwrap()
    }

    fn fire_all(s: &mut TrainingSession, action: TimerAction) -> usize {
        let tasks: Vec<_> = s
            .take_scheduled()
            .into_iter()
            .filter(|t| t.action == action)
            .collect();
        let n = tasks.len();
        for t in &tasks {
            s.fire(t);
        }
        n
    }

    const OPEN: &[(&str, &str)] = &[("e4", "e2e4"), ("e5", "e7e5"), ("Nf3", "g1f3")];

    #[test]
    fn test_not_started_rejects() {
        let mut s = session(OPEN);
        assert_eq!(
            s.submit_move(&intent("e2e4")),
            MoveOutcome::Rejected(RejectReason::NotAccepting)
        );
        assert!(!s.request_hint());
        assert!(s.snapshot().legal_moves.is_empty());
    }

    #[test]
    fn test_practice_correct_then_incorrect() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Practice { side: None });

        let out = s.submit_move(&intent("e2e4"));
        assert_eq!(out, MoveOutcome::Correct { san: "e4".into() });
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.feedback().unwrap().kind, FeedbackKind::Correct);

        let out = s.submit_move(&intent("d7d5"));
        match out {
            MoveOutcome::Incorrect {
                attempted,
                expected,
                applied,
            } => {
                assert_eq!(attempted, "d5");
                assert_eq!(expected.unwrap().san, "e5");
                assert!(!applied);
            }
            other => panic!("unexpected {other:?}"),
        }
        let fb = s.feedback().unwrap();
        assert_eq!(fb.kind, FeedbackKind::Incorrect);
        assert_eq!(fb.expected.as_deref(), Some("e5"));
        assert_eq!(fb.message, "Not quite! Expected: e5");
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.counts(), (1, 1));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_practice_illegal_is_silent() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Practice { side: None });
        s.take_scheduled();
        assert_eq!(
            s.submit_move(&intent("e2e5")),
            MoveOutcome::Rejected(RejectReason::Illegal)
        );
        assert!(s.feedback().is_none());
        assert!(s.take_scheduled().is_empty());
        assert_eq!(s.counts(), (0, 0));
    }

    #[test]
    fn test_practice_completes_and_scores() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Practice { side: None });
        s.submit_move(&intent("e2e4"));
        s.submit_move(&intent("a7a6"));
        s.submit_move(&intent("e7e5"));
        s.submit_move(&intent("g1f3"));

        assert!(s.phase().is_complete());
        let stats = s.completion().unwrap();
        assert_eq!((stats.correct, stats.incorrect), (3, 1));
        assert_eq!(stats.accuracy, 75);
        assert_eq!(
            s.submit_move(&intent("b8c6")),
            MoveOutcome::Rejected(RejectReason::NotAccepting)
        );
    }

    #[test]
    fn test_practice_with_side_autoplays_opponent() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Practice {
            side: Some(PieceColor::White),
        });
        assert_eq!(s.submit_move(&intent("e2e4")), MoveOutcome::Correct { san: "e4".into() });
        assert_eq!(
            s.submit_move(&intent("e7e5")),
            MoveOutcome::Rejected(RejectReason::NotYourTurn)
        );

        assert_eq!(fire_all(&mut s, TimerAction::OpponentMove), 1);
        assert_eq!(s.cursor(), 2);
        assert_eq!(s.snapshot().history, vec!["e4", "e5"]);

        s.submit_move(&intent("g1f3"));
        assert!(s.phase().is_complete());
        assert_eq!(s.counts(), (2, 0));
    }

    #[test]
    fn test_practice_as_black_opponent_moves_first() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Practice {
            side: Some(PieceColor::Black),
        });
        assert!(!s.accepts_input());
        assert_eq!(fire_all(&mut s, TimerAction::OpponentMove), 1);
        assert_eq!(s.snapshot().history, vec!["e4"]);
        assert!(s.accepts_input());
    }

    #[test]
    fn test_demo_plays_line_and_ignores_input() {
        let four = &[("e4", "e2e4"), ("e5", "e7e5"), ("Nf3", "g1f3"), ("Nc6", "b8c6")];
        let mut s = session(four);
        s.start(TrainingMode::Demo);

        let mut advances = 0;
        while !s.phase().is_complete() {
            assert_eq!(
                s.submit_move(&intent("d2d4")),
                MoveOutcome::Rejected(RejectReason::NotAccepting)
            );
            let fired = fire_all(&mut s, TimerAction::DemoAdvance);
            assert_eq!(fired, 1);
            advances += fired;
        }
        assert_eq!(advances, 4);
        assert_eq!(s.counts(), (0, 0));
        assert!(s.feedback().is_none());
        assert!(s.take_scheduled().is_empty());
    }

    #[test]
    fn test_stale_tasks_after_reset_are_ignored() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Demo);
        let stale = s.take_scheduled();
        assert_eq!(stale.len(), 1);

        s.reset();
        for task in &stale {
            assert!(!s.fire(task));
        }
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.phase(), SessionPhase::NotStarted);
    }

    #[test]
    fn test_feedback_clear_only_matches_its_token() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Practice { side: None });
        s.submit_move(&intent("d2d4"));
        let first = s.take_scheduled();
        s.submit_move(&intent("c2c4"));
        let second = s.take_scheduled();

        assert!(!s.fire(&first[0]));
        assert!(s.feedback().is_some());
        assert!(s.fire(&second[0]));
        assert!(s.feedback().is_none());
    }

    #[test]
    fn test_hint_messages() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Practice { side: None });
        assert!(s.request_hint());
        let fb = s.feedback().unwrap();
        assert_eq!(fb.kind, FeedbackKind::Hint);
        assert_eq!(fb.message, "Hint: e4");
        let task = s.take_scheduled().pop().unwrap();
        assert_eq!(task.delay, Timings::default().hint_duration);

        let mut v = session(&[("e4", "e2e4")]);
        v.start(TrainingMode::VersusComputer {
            human: PieceColor::White,
        });
        v.submit_move(&intent("d2d4"));
        assert!(v.request_hint());
        assert_eq!(v.feedback().unwrap().message, NO_HINT_MESSAGE);
    }

    #[test]
    fn test_versus_human_black_computer_moves_first() {
        let mut s = session(OPEN);
        s.start(TrainingMode::VersusComputer {
            human: PieceColor::Black,
        });
        assert_eq!(
            s.submit_move(&intent("e7e5")),
            MoveOutcome::Rejected(RejectReason::NotYourTurn)
        );
        assert_eq!(fire_all(&mut s, TimerAction::OpponentMove), 1);
        assert_eq!(s.snapshot().history, vec!["e4"]);

        assert_eq!(s.submit_move(&intent("e7e5")), MoveOutcome::Correct { san: "e5".into() });
        assert_eq!(fire_all(&mut s, TimerAction::OpponentMove), 1);
        assert_eq!(s.snapshot().history, vec!["e4", "e5", "Nf3"]);
        assert!(!s.snapshot().in_book);
    }

    #[test]
    fn test_versus_mismatch_is_played_and_leaves_book() {
        let mut s = session(OPEN);
        s.start(TrainingMode::VersusComputer {
            human: PieceColor::White,
        });
        let out = s.submit_move(&intent("d2d4"));
        assert!(matches!(out, MoveOutcome::Incorrect { applied: true, .. }));
        assert_eq!(
            s.feedback().unwrap().message,
            "That's not the opening move! Expected: e4"
        );
        assert_eq!(s.counts(), (0, 1));
        assert!(!s.snapshot().in_book);

        // The random reply is legal and the game goes on unscored.
        assert_eq!(fire_all(&mut s, TimerAction::OpponentMove), 1);
        assert_eq!(s.history().len(), 2);
        let legal = s.position().legal_uci_moves();
        assert!(matches!(
            s.submit_move(&intent(&legal[0])),
            MoveOutcome::Played { .. }
        ));
        assert_eq!(s.counts(), (0, 1));
    }

    #[test]
    fn test_versus_checkmate_outcomes() {
        // Fool's mate with the human as black delivering it.
        let line = &[("f3", "f2f3"), ("e5", "e7e5"), ("g4", "g2g4"), ("Qh4#", "d8h4")];
        let mut s = session(line);
        s.start(TrainingMode::VersusComputer {
            human: PieceColor::Black,
        });
        fire_all(&mut s, TimerAction::OpponentMove);
        s.submit_move(&intent("e7e5"));
        fire_all(&mut s, TimerAction::OpponentMove);
        assert_eq!(s.submit_move(&intent("d8h4")), MoveOutcome::Correct { san: "Qh4#".into() });

        assert!(s.phase().is_complete());
        let stats = s.completion().unwrap();
        assert_eq!(stats.outcome, Some(GameOutcome::Won));
        assert_eq!(stats.accuracy, 100);
        assert!(s.take_scheduled().iter().all(|t| t.action != TimerAction::OpponentMove));

        // Same line, human as white: the computer mates.
        let mut s = session(line);
        s.start(TrainingMode::VersusComputer {
            human: PieceColor::White,
        });
        s.submit_move(&intent("f2f3"));
        fire_all(&mut s, TimerAction::OpponentMove);
        s.submit_move(&intent("g2g4"));
        fire_all(&mut s, TimerAction::OpponentMove);
        assert_eq!(s.completion().unwrap().outcome, Some(GameOutcome::Lost));
    }

    #[test]
    fn test_versus_stalemate_is_drawn() {
        let line = &[
            ("e3", "e2e3"),
            ("a5", "a7a5"),
            ("Qh5", "d1h5"),
            ("Ra6", "a8a6"),
            ("Qxa5", "h5a5"),
            ("h5", "h7h5"),
            ("h4", "h2h4"),
            ("Rah6", "a6h6"),
            ("Qxc7", "a5c7"),
            ("f6", "f7f6"),
            ("Qxd7+", "c7d7"),
            ("Kf7", "e8f7"),
            ("Qxb7", "d7b7"),
            ("Qd3", "d8d3"),
            ("Qxb8", "b7b8"),
            ("Qh7", "d3h7"),
            ("Qxc8", "b8c8"),
            ("Kg6", "f7g6"),
            ("Qe6", "c8e6"),
        ];
        let mut s = session(line);
        s.start(TrainingMode::VersusComputer {
            human: PieceColor::White,
        });
        for (ply, (san, uci)) in line.iter().enumerate().step_by(2) {
            assert_eq!(s.submit_move(&intent(uci)), MoveOutcome::Correct { san: san.to_string() });
            if ply + 1 < line.len() {
                assert_eq!(fire_all(&mut s, TimerAction::OpponentMove), 1);
            }
        }

        assert!(s.position().is_stalemate());
        assert!(s.phase().is_complete());
        let stats = s.completion().unwrap();
        assert_eq!(stats.outcome, Some(GameOutcome::Drawn));
        assert_eq!((stats.correct, stats.incorrect), (10, 0));
        assert!(s.take_scheduled().iter().all(|t| t.action != TimerAction::OpponentMove));
        assert!(!s.accepts_input());
    }

    #[test]
    fn test_start_fully_resets() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Practice { side: None });
        s.submit_move(&intent("e2e4"));
        s.submit_move(&intent("a7a6"));
        let generation = s.generation();

        s.start(TrainingMode::Practice { side: None });
        assert_eq!(s.generation(), generation + 1);
        assert_eq!(s.counts(), (0, 0));
        assert_eq!(s.cursor(), 0);
        assert!(s.history().is_empty());
        assert!(s.feedback().is_none());
        assert_eq!(s.position().to_fen(), chess::STARTING_FEN);
    }

    #[test]
    fn test_snapshot_progress() {
        let mut s = session(OPEN);
        s.start(TrainingMode::Practice { side: None });
        s.submit_move(&intent("e2e4"));
        let snap = s.snapshot();
        assert_eq!(snap.progress_percent, 33);
        assert_eq!(snap.last_move, Some(("e2".into(), "e4".into())));
        assert_eq!(snap.side_to_move, PieceColor::Black);
        assert!(snap.legal_moves.contains_key("e7"));
    }
}

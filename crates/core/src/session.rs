use chrono::{DateTime, Utc};
use std::fmt;

use crate::model::{CategoryId, Question};

/// Points awarded for a correct answer.
pub const POINTS_PER_QUESTION: u32 = 20;

/// Seconds a player gets per question before the answer is forced open.
pub const QUESTION_TIME_LIMIT_SECS: u32 = 30;

/// Number of questions drawn (without replacement) for a mixed-mode attempt.
pub const MIXED_SAMPLE_SIZE: usize = 10;

//
// ─── SCREENS AND MODES ─────────────────────────────────────────────────────────
//

/// The screen the UI should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Hero,
    Categories,
    Quiz,
    Results,
}

/// What a play-through draws its questions from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizMode {
    Category(CategoryId),
    Mixed,
}

impl QuizMode {
    /// Display label, "mixed" for mixed-mode play.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            QuizMode::Category(id) => id.as_str(),
            QuizMode::Mixed => "mixed",
        }
    }
}

/// The recorded choice for one question.
///
/// `TimedOut` is an automatic non-submission, distinct from any selected
/// option; it serializes as `-1` in the history log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Selected(usize),
    TimedOut,
}

impl Answer {
    /// Raw wire form: the option index, or `-1` for a timeout.
    #[must_use]
    pub fn raw(&self) -> i32 {
        match self {
            Answer::Selected(i) => i32::try_from(*i).unwrap_or(i32::MAX),
            Answer::TimedOut => -1,
        }
    }
}

/// Final numbers for a completed attempt, read off the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub mode: QuizMode,
    pub score: u32,
    pub correct_count: u32,
    pub total_questions: u32,
    pub accuracy_percent: u8,
    pub total_time_secs: u64,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Everything that only exists while an attempt is alive.
#[derive(Debug, Clone)]
struct Attempt {
    mode: QuizMode,
    questions: Vec<Question>,
    current: usize,
    selected: Option<usize>,
    answers: Vec<Answer>,
    score: u32,
    time_remaining: u32,
    revealed: bool,
    started_at: DateTime<Utc>,
    total_time_secs: Option<u64>,
}

/// Screen state machine for the quiz: `hero → categories → quiz → results`,
/// with early exits back to `hero`.
///
/// Every operation is a defensive no-op when called in a state where it is
/// not legal; the UI disables affordances, and the core never corrupts state
/// or panics on an illegal call. Timer and fetch drivers must pass the
/// [`generation`](Self::generation) they observed when scheduling so that a
/// callback firing after the attempt was discarded falls on the floor.
pub struct QuizSession {
    screen: Screen,
    generation: u64,
    attempt: Option<Attempt>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// A fresh session on the hero screen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: Screen::Hero,
            generation: 0,
            attempt: None,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Validity token for async callbacks (ticks). Bumped whenever an attempt
    /// starts or is discarded.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn mode(&self) -> Option<&QuizMode> {
        self.attempt.as_ref().map(|a| &a.mode)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        let attempt = self.attempt.as_ref()?;
        attempt.questions.get(attempt.current)
    }

    /// Zero-based index of the current question.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.attempt.as_ref().map_or(0, |a| a.current)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.attempt.as_ref().map_or(0, |a| a.questions.len())
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<usize> {
        self.attempt.as_ref().and_then(|a| a.selected)
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        self.attempt.as_ref().map_or(&[], |a| a.answers.as_slice())
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.attempt.as_ref().map_or(0, |a| a.score)
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.attempt.as_ref().map_or(0, |a| a.time_remaining)
    }

    /// True while answer feedback for the current question is showing.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.attempt.as_ref().is_some_and(|a| a.revealed)
    }

    /// Move from the hero screen to category selection.
    pub fn browse_categories(&mut self) {
        if self.screen == Screen::Hero {
            self.screen = Screen::Categories;
        }
    }

    /// Leave category selection without starting an attempt.
    pub fn leave_categories(&mut self) {
        if self.screen == Screen::Categories {
            self.screen = Screen::Hero;
        }
    }

    /// Start an attempt with a fixed question snapshot.
    ///
    /// The snapshot is built by the caller (category filter in catalog order,
    /// or a mixed-mode sample) and stays fixed for the attempt's lifetime.
    /// Legal from the hero or categories screen with a non-empty snapshot;
    /// a no-op otherwise.
    pub fn start_attempt(
        &mut self,
        mode: QuizMode,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) {
        if !matches!(self.screen, Screen::Hero | Screen::Categories) || questions.is_empty() {
            return;
        }

        self.attempt = Some(Attempt {
            mode,
            questions,
            current: 0,
            selected: None,
            answers: Vec::new(),
            score: 0,
            time_remaining: QUESTION_TIME_LIMIT_SECS,
            revealed: false,
            started_at: now,
            total_time_secs: None,
        });
        self.screen = Screen::Quiz;
        self.generation += 1;
    }

    /// Select (or re-select) an option for the current question.
    ///
    /// Only the last selection before submit is retained. A no-op once the
    /// answer is revealed or when the index is out of range.
    pub fn select_answer(&mut self, option_index: usize) {
        if self.screen != Screen::Quiz {
            return;
        }
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if attempt.revealed {
            return;
        }
        let options = attempt.questions[attempt.current].options().len();
        if option_index < options {
            attempt.selected = Some(option_index);
        }
    }

    /// Submit the selected answer: record it, score it, reveal feedback.
    ///
    /// Does not advance. A no-op without a selection or after reveal, so a
    /// double submit changes nothing.
    pub fn submit_answer(&mut self) {
        if self.screen != Screen::Quiz {
            return;
        }
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if attempt.revealed {
            return;
        }
        let Some(selected) = attempt.selected else {
            return;
        };

        debug_assert_eq!(attempt.answers.len(), attempt.current);
        attempt.answers.push(Answer::Selected(selected));
        if attempt.questions[attempt.current].is_correct(selected) {
            attempt.score += POINTS_PER_QUESTION;
        }
        attempt.revealed = true;
    }

    /// One second of the countdown.
    ///
    /// `generation` is the value of [`Self::generation`] the timer driver saw
    /// when it scheduled this tick; a stale tick is ignored. Hitting zero
    /// forces the reveal with a recorded timeout and no score change.
    pub fn tick(&mut self, generation: u64) {
        if generation != self.generation || self.screen != Screen::Quiz {
            return;
        }
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if attempt.revealed || attempt.time_remaining == 0 {
            return;
        }

        attempt.time_remaining -= 1;
        if attempt.time_remaining == 0 {
            debug_assert_eq!(attempt.answers.len(), attempt.current);
            attempt.answers.push(Answer::TimedOut);
            attempt.selected = None;
            attempt.revealed = true;
        }
    }

    /// Leave the reveal: next question, or the results screen after the last
    /// one. A no-op before the current question is revealed.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        if self.screen != Screen::Quiz {
            return;
        }
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if !attempt.revealed {
            return;
        }

        if attempt.current + 1 >= attempt.questions.len() {
            let elapsed = now.signed_duration_since(attempt.started_at).num_seconds();
            attempt.total_time_secs = Some(u64::try_from(elapsed).unwrap_or(0));
            self.screen = Screen::Results;
        } else {
            attempt.current += 1;
            attempt.selected = None;
            attempt.revealed = false;
            attempt.time_remaining = QUESTION_TIME_LIMIT_SECS;
        }
    }

    /// Abandon the attempt mid-quiz. Nothing is recorded.
    pub fn quit(&mut self) {
        if self.screen != Screen::Quiz {
            return;
        }
        self.attempt = None;
        self.screen = Screen::Hero;
        self.generation += 1;
    }

    /// Leave the results screen, discarding the attempt.
    pub fn reset(&mut self) {
        if self.screen != Screen::Results {
            return;
        }
        self.attempt = None;
        self.screen = Screen::Hero;
        self.generation += 1;
    }

    /// Final numbers, available only on the results screen.
    #[must_use]
    pub fn outcome(&self) -> Option<QuizOutcome> {
        if self.screen != Screen::Results {
            return None;
        }
        let attempt = self.attempt.as_ref()?;

        let total = attempt.questions.len();
        debug_assert_eq!(attempt.answers.len(), total);
        let correct = attempt
            .answers
            .iter()
            .zip(&attempt.questions)
            .filter(|(answer, question)| {
                matches!(answer, Answer::Selected(i) if question.is_correct(*i))
            })
            .count();

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let accuracy = if total == 0 {
            0
        } else {
            ((correct as f64 / total as f64) * 100.0).round() as u8
        };

        Some(QuizOutcome {
            mode: attempt.mode.clone(),
            score: attempt.score,
            correct_count: u32::try_from(correct).unwrap_or(u32::MAX),
            total_questions: u32::try_from(total).unwrap_or(u32::MAX),
            accuracy_percent: accuracy,
            total_time_secs: attempt.total_time_secs.unwrap_or(0),
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("screen", &self.screen)
            .field("generation", &self.generation)
            .field("current", &self.current_index())
            .field("answers_len", &self.answers().len())
            .field("score", &self.score())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryId, Question, QuestionId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn question(id: u32, correct: usize) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Question {id}?"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            CategoryId::new("durga-trivia").unwrap(),
            None,
        )
        .unwrap()
    }

    fn in_quiz(questions: Vec<Question>) -> QuizSession {
        let mut session = QuizSession::new();
        session.start_attempt(QuizMode::Mixed, questions, fixed_now());
        assert_eq!(session.screen(), Screen::Quiz);
        session
    }

    #[test]
    fn start_resets_attempt_state() {
        let session = in_quiz(vec![question(1, 0), question(2, 1)]);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.answers().len(), 0);
        assert_eq!(session.time_remaining(), QUESTION_TIME_LIMIT_SECS);
        assert!(!session.is_revealed());
    }

    #[test]
    fn start_with_empty_snapshot_is_a_noop() {
        let mut session = QuizSession::new();
        session.start_attempt(QuizMode::Mixed, Vec::new(), fixed_now());
        assert_eq!(session.screen(), Screen::Hero);
    }

    #[test]
    fn correct_answer_scores_twenty() {
        let mut session = in_quiz(vec![question(1, 2), question(2, 0)]);
        session.select_answer(2);
        session.submit_answer();
        assert_eq!(session.score(), POINTS_PER_QUESTION);
        assert!(session.is_revealed());
        assert_eq!(session.answers(), &[Answer::Selected(2)]);
    }

    #[test]
    fn wrong_answer_scores_nothing() {
        let mut session = in_quiz(vec![question(1, 2)]);
        session.select_answer(0);
        session.submit_answer();
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn only_last_selection_counts() {
        let mut session = in_quiz(vec![question(1, 3)]);
        session.select_answer(0);
        session.select_answer(1);
        session.select_answer(3);
        session.submit_answer();
        assert_eq!(session.answers(), &[Answer::Selected(3)]);
        assert_eq!(session.score(), POINTS_PER_QUESTION);
    }

    #[test]
    fn double_submit_is_a_noop() {
        let mut session = in_quiz(vec![question(1, 0), question(2, 0)]);
        session.select_answer(0);
        session.submit_answer();
        session.submit_answer();
        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.score(), POINTS_PER_QUESTION);
    }

    #[test]
    fn submit_without_selection_is_a_noop() {
        let mut session = in_quiz(vec![question(1, 0)]);
        session.submit_answer();
        assert!(!session.is_revealed());
        assert_eq!(session.answers().len(), 0);
    }

    #[test]
    fn select_after_reveal_is_a_noop() {
        let mut session = in_quiz(vec![question(1, 0)]);
        session.select_answer(0);
        session.submit_answer();
        session.select_answer(1);
        assert_eq!(session.selected_answer(), Some(0));
    }

    #[test]
    fn select_out_of_range_is_a_noop() {
        let mut session = in_quiz(vec![question(1, 0)]);
        session.select_answer(4);
        assert_eq!(session.selected_answer(), None);
    }

    #[test]
    fn timeout_records_minus_one_without_scoring() {
        let mut session = in_quiz(vec![question(1, 0), question(2, 0)]);
        let generation = session.generation();
        for _ in 0..QUESTION_TIME_LIMIT_SECS {
            session.tick(generation);
        }
        assert!(session.is_revealed());
        assert_eq!(session.selected_answer(), None);
        assert_eq!(session.answers(), &[Answer::TimedOut]);
        assert_eq!(session.answers()[0].raw(), -1);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn tick_after_reveal_does_not_decrement() {
        let mut session = in_quiz(vec![question(1, 0)]);
        let generation = session.generation();
        session.select_answer(0);
        session.submit_answer();
        let remaining = session.time_remaining();
        session.tick(generation);
        assert_eq!(session.time_remaining(), remaining);
    }

    #[test]
    fn stale_generation_tick_is_ignored() {
        let mut session = in_quiz(vec![question(1, 0)]);
        let stale = session.generation();
        session.quit();
        session.start_attempt(QuizMode::Mixed, vec![question(2, 0)], fixed_now());
        session.tick(stale);
        assert_eq!(session.time_remaining(), QUESTION_TIME_LIMIT_SECS);
    }

    #[test]
    fn advance_moves_to_next_question_with_fresh_timer() {
        let mut session = in_quiz(vec![question(1, 0), question(2, 1)]);
        session.select_answer(0);
        session.submit_answer();
        session.advance(fixed_now());
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.selected_answer(), None);
        assert!(!session.is_revealed());
        assert_eq!(session.time_remaining(), QUESTION_TIME_LIMIT_SECS);
    }

    #[test]
    fn advance_before_reveal_is_a_noop() {
        let mut session = in_quiz(vec![question(1, 0), question(2, 0)]);
        session.advance(fixed_now());
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn full_run_reaches_results_with_all_answers_recorded() {
        let mut session = in_quiz(vec![question(1, 0), question(2, 1), question(3, 2)]);
        let generation = session.generation();
        let finished_at = fixed_now() + Duration::seconds(42);

        // first: correct
        session.select_answer(0);
        session.submit_answer();
        session.advance(fixed_now());
        // second: wrong
        session.select_answer(0);
        session.submit_answer();
        session.advance(fixed_now());
        // third: timeout
        for _ in 0..QUESTION_TIME_LIMIT_SECS {
            session.tick(generation);
        }
        session.advance(finished_at);

        assert_eq!(session.screen(), Screen::Results);
        assert_eq!(session.answers().len(), session.total_questions());

        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.score, POINTS_PER_QUESTION);
        assert_eq!(outcome.correct_count, 1);
        assert_eq!(outcome.total_questions, 3);
        assert_eq!(outcome.accuracy_percent, 33);
        assert_eq!(outcome.total_time_secs, 42);
    }

    #[test]
    fn score_matches_twenty_per_correct_answer() {
        let questions = vec![question(1, 0), question(2, 1), question(3, 2), question(4, 3)];
        let picks = [0usize, 1, 0, 3]; // three correct
        let mut session = in_quiz(questions.clone());
        for pick in picks {
            session.select_answer(pick);
            session.submit_answer();
            session.advance(fixed_now());
        }

        let correct = picks
            .iter()
            .zip(&questions)
            .filter(|(pick, q)| q.is_correct(**pick))
            .count() as u32;
        assert_eq!(session.outcome().unwrap().score, correct * POINTS_PER_QUESTION);
    }

    #[test]
    fn quit_discards_attempt() {
        let mut session = in_quiz(vec![question(1, 0)]);
        session.select_answer(0);
        session.quit();
        assert_eq!(session.screen(), Screen::Hero);
        assert_eq!(session.total_questions(), 0);
        assert!(session.outcome().is_none());
    }

    #[test]
    fn reset_only_works_from_results() {
        let mut session = in_quiz(vec![question(1, 0)]);
        session.reset();
        assert_eq!(session.screen(), Screen::Quiz);

        session.select_answer(0);
        session.submit_answer();
        session.advance(fixed_now());
        assert_eq!(session.screen(), Screen::Results);
        session.reset();
        assert_eq!(session.screen(), Screen::Hero);
    }

    #[test]
    fn hero_to_categories_and_back() {
        let mut session = QuizSession::new();
        session.browse_categories();
        assert_eq!(session.screen(), Screen::Categories);
        session.leave_categories();
        assert_eq!(session.screen(), Screen::Hero);
    }

    #[test]
    fn operations_on_hero_screen_are_noops() {
        let mut session = QuizSession::new();
        session.select_answer(0);
        session.submit_answer();
        session.tick(session.generation());
        session.advance(fixed_now());
        session.quit();
        assert_eq!(session.screen(), Screen::Hero);
        assert!(session.outcome().is_none());
    }

    #[test]
    fn clock_going_backwards_clamps_total_time_to_zero() {
        let mut session = in_quiz(vec![question(1, 0)]);
        session.select_answer(0);
        session.submit_answer();
        session.advance(fixed_now() - Duration::seconds(5));
        assert_eq!(session.outcome().unwrap().total_time_secs, 0);
    }
}

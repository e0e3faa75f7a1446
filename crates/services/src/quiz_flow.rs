use std::sync::Arc;

use log::info;
use rand::seq::index::sample;

use quiz_core::catalog::Catalog;
use quiz_core::model::{CategoryId, HistoryEntry, Question};
use quiz_core::{Clock, MIXED_SAMPLE_SIZE, QuizMode, QuizOutcome, QuizSession};
use storage::repository::HistoryRepository;

use crate::error::QuizFlowError;
use crate::events::{EventSink, NullSink, QuizEvent};
use crate::leaderboard::{LeaderboardStore, RecordedAttempt, format_date};

/// Drives a [`QuizSession`] through the parts that need the outside world:
/// picking questions out of the catalog, and turning a finished attempt into
/// a history row and a leaderboard entry.
pub struct QuizFlowService {
    catalog: Arc<Catalog>,
    leaderboard: Arc<LeaderboardStore>,
    history: Arc<dyn HistoryRepository>,
    clock: Clock,
    events: Arc<dyn EventSink>,
}

/// Everything produced by [`QuizFlowService::complete_attempt`].
#[derive(Debug, Clone)]
pub struct CompletedAttempt {
    pub outcome: QuizOutcome,
    pub recorded: RecordedAttempt,
}

impl QuizFlowService {
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        leaderboard: Arc<LeaderboardStore>,
        history: Arc<dyn HistoryRepository>,
        clock: Clock,
    ) -> Self {
        Self {
            catalog,
            leaderboard,
            history,
            clock,
            events: Arc::new(NullSink),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn leaderboard(&self) -> &LeaderboardStore {
        &self.leaderboard
    }

    /// Start a category attempt: the category's questions, catalog order.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::NoQuestions` when the category has none.
    pub fn start_category(
        &self,
        session: &mut QuizSession,
        category: &CategoryId,
    ) -> Result<(), QuizFlowError> {
        let questions = self.catalog.questions_in(category);
        if questions.is_empty() {
            return Err(QuizFlowError::NoQuestions(category.as_str().to_owned()));
        }
        info!(
            "starting category attempt: {} ({} questions)",
            category.as_str(),
            questions.len()
        );
        session.start_attempt(
            QuizMode::Category(category.clone()),
            questions,
            self.clock.now(),
        );
        Ok(())
    }

    /// Start a mixed attempt: a random sample across the whole catalog,
    /// capped at [`MIXED_SAMPLE_SIZE`] questions, each question at most once.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::NoQuestions` on an empty catalog.
    pub fn start_mixed(&self, session: &mut QuizSession) -> Result<(), QuizFlowError> {
        let pool = self.catalog.questions();
        if pool.is_empty() {
            return Err(QuizFlowError::NoQuestions("mixed".to_owned()));
        }

        let questions: Vec<Question> = if pool.len() <= MIXED_SAMPLE_SIZE {
            pool.to_vec()
        } else {
            sample(&mut rand::rng(), pool.len(), MIXED_SAMPLE_SIZE)
                .iter()
                .map(|i| pool[i].clone())
                .collect()
        };
        info!("starting mixed attempt ({} questions)", questions.len());
        session.start_attempt(QuizMode::Mixed, questions, self.clock.now());
        Ok(())
    }

    /// Record a finished attempt: append a history row and put the score on
    /// the leaderboard under `player_name`.
    ///
    /// # Errors
    ///
    /// `QuizFlowError::NotCompleted` when the session is not on the results
    /// screen, otherwise storage and leaderboard failures.
    pub async fn complete_attempt(
        &self,
        session: &QuizSession,
        player_name: &str,
    ) -> Result<CompletedAttempt, QuizFlowError> {
        let outcome = session.outcome().ok_or(QuizFlowError::NotCompleted)?;
        self.events.publish(QuizEvent::AttemptCompleted {
            outcome: outcome.clone(),
        });

        let now = self.clock.now();
        self.history
            .append_history(&HistoryEntry {
                date: format_date(now),
                category: outcome.mode.label().to_owned(),
                score: outcome.score,
                total_questions: outcome.total_questions,
                time_spent_secs: outcome.total_time_secs,
                timestamp: now,
            })
            .await?;

        let category = match &outcome.mode {
            QuizMode::Category(id) => Some(id.clone()),
            QuizMode::Mixed => None,
        };
        let recorded = self
            .leaderboard
            .record_attempt(player_name, outcome.accuracy_percent, category)
            .await?;

        Ok(CompletedAttempt { outcome, recorded })
    }

    /// Most recent attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError` for storage failures.
    pub async fn recent_history(&self, limit: u32) -> Result<Vec<HistoryEntry>, QuizFlowError> {
        Ok(self.history.list_history(limit).await?)
    }
}

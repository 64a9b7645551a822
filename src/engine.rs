//! Drill engine: the operations the presentation layer calls.
//!
//! The engine holds only immutable configuration (catalog and settings). All
//! per-learner state lives in the [`SessionContext`] the caller passes in, so
//! switching learners is just starting a new context.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::catalog::FactCatalog;
use crate::config::DrillSettings;
use crate::domain::{Fact, Problem, Tier};
use crate::drill;
use crate::error::{DrillError, LogOnError, Result};
use crate::mastery::MasteryLedger;
use crate::scheduler::{self, AdvanceTicket};
use crate::session::{LearnerId, SessionContext, SessionStats};
use crate::validation::{self, AnswerResult, Evaluation};
use crate::{profile_log, profile_scope};

/// What the learner sees after answering
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
  pub fact: Fact,
  pub evaluation: Evaluation,
  pub stats: SessionStats,
  /// Time between presentation and answer
  pub latency_ms: i64,
  /// Set when a correct-answer streak moved the learner up a tier
  pub advanced_to: Option<usize>,
}

impl SubmitOutcome {
  pub fn is_correct(&self) -> bool {
    self.evaluation.is_correct
  }

  pub fn message(&self) -> &str {
    &self.evaluation.message
  }
}

#[derive(Debug, Clone)]
pub struct DrillEngine {
  catalog: FactCatalog,
  settings: DrillSettings,
}

impl DrillEngine {
  pub fn new(catalog: FactCatalog, settings: DrillSettings) -> Self {
    Self { catalog, settings }
  }

  /// Build an engine with the catalog named in `settings`
  pub fn from_settings(settings: DrillSettings) -> Result<Self> {
    let catalog = FactCatalog::from_settings(&settings)?;
    Ok(Self::new(catalog, settings))
  }

  pub fn catalog(&self) -> &FactCatalog {
    &self.catalog
  }

  pub fn settings(&self) -> &DrillSettings {
    &self.settings
  }

  pub fn get_tier(&self, index: usize) -> Result<&Tier> {
    self.catalog.tier_at(index)
  }

  pub fn tier_count(&self) -> usize {
    self.catalog.tier_count()
  }

  pub fn advance_tier(&self, current: usize) -> usize {
    self.catalog.advance_tier(current)
  }

  /// Enter game mode for a learner on the given tier.
  ///
  /// The returned context already has its first problem and zeroed stats.
  pub fn start_session(
    &self,
    learner: impl Into<LearnerId>,
    tier_index: usize,
  ) -> Result<SessionContext> {
    let tier = self.catalog.tier_at(tier_index)?;
    let mut ctx = SessionContext::new(learner.into(), tier_index);

    tracing::info!("Learner {} started {}", ctx.learner_id(), tier.title());
    profile_log!(crate::profiling::EventType::SessionStart {
      learner_id: ctx.learner_id().to_string(),
      tier: tier_index,
    });

    self.next_problem(&mut ctx)?;
    Ok(ctx)
  }

  /// Draw a new problem from the context's tier and put it on screen
  pub fn next_problem<'a>(&self, ctx: &'a mut SessionContext) -> Result<&'a Problem> {
    let tier = self.catalog.tier_at(ctx.tier_index)?;
    let problem = profile_scope!("next_problem", { drill::next_problem(tier) })?;

    tracing::debug!("Presenting {} with choices {:?}", problem.fact, problem.choices);
    profile_log!(crate::profiling::EventType::ProblemPresented {
      fact: problem.fact.token(),
      choices: problem.choices.to_vec(),
    });

    let problem: &Problem = ctx.problem.insert(problem);
    Ok(problem)
  }

  /// Replace the current problem without scoring it
  pub fn skip_problem<'a>(&self, ctx: &'a mut SessionContext) -> Result<&'a Problem> {
    ctx.cancel_pending();
    self.next_problem(ctx)
  }

  /// Score the learner's pick for the problem on screen.
  ///
  /// The problem is consumed. Stats and the mastery ledger are updated; a
  /// ledger failure is logged and does not fail the submission.
  pub fn submit_answer(
    &self,
    ctx: &mut SessionContext,
    choice: u32,
    ledger: &mut dyn MasteryLedger,
  ) -> Result<SubmitOutcome> {
    let problem = ctx.problem.take().ok_or_else(|| DrillError::NoActiveProblem {
      learner: ctx.learner_id().to_string(),
    })?;

    let evaluation = validation::evaluate(&problem, choice);
    let latency_ms = problem.elapsed_ms(chrono::Utc::now());
    if evaluation.result == AnswerResult::NotOffered {
      tracing::warn!(
        "Learner {} submitted {} for {}, which was not one of {:?}",
        ctx.learner_id(),
        choice,
        problem.fact,
        problem.choices
      );
    }

    ctx.stats = ctx.stats.record_attempt(evaluation.is_correct);
    ctx.streak = if evaluation.is_correct {
      ctx.streak.saturating_add(1)
    } else {
      0
    };

    ledger
      .record_attempt(ctx.learner_id(), &problem.fact.token(), evaluation.is_correct)
      .log_warn("Failed to record mastery attempt");

    tracing::debug!(
      "{} answered {} -> {} ({})",
      ctx.learner_id(),
      problem.fact,
      evaluation.result.as_str(),
      ctx.stats
    );
    profile_log!(crate::profiling::EventType::AnswerEvaluated {
      fact: problem.fact.token(),
      result: evaluation.result.as_str().to_string(),
      latency_ms,
    });

    let advanced_to = self.apply_streak_policy(ctx);

    Ok(SubmitOutcome {
      fact: problem.fact,
      evaluation,
      stats: ctx.stats,
      latency_ms,
      advanced_to,
    })
  }

  /// Move up a tier once the streak target is reached, if one is configured
  fn apply_streak_policy(&self, ctx: &mut SessionContext) -> Option<usize> {
    let target = self.settings.auto_advance_streak?;
    if ctx.streak < target {
      return None;
    }
    let next = self.catalog.advance_tier(ctx.tier_index);
    if next == ctx.tier_index {
      return None;
    }

    tracing::info!(
      "Learner {} reached a streak of {}, moving to tier {}",
      ctx.learner_id(),
      ctx.streak,
      next
    );
    profile_log!(crate::profiling::EventType::TierChanged {
      learner_id: ctx.learner_id().to_string(),
      from: ctx.tier_index,
      to: next,
      automatic: true,
    });

    ctx.tier_index = next;
    ctx.streak = 0;
    Some(next)
  }

  /// Start the feedback delay. When it elapses a ticket arrives on `tx`;
  /// pass it to [`DrillEngine::complete_advance`].
  pub fn schedule_advance(
    &self,
    ctx: &mut SessionContext,
    tx: UnboundedSender<AdvanceTicket>,
  ) -> Result<()> {
    let ticket = ctx.issue_ticket();
    let pending = scheduler::schedule_advance(ticket, self.settings.feedback_delay, tx)?;
    if let Some(previous) = ctx.pending.replace(pending) {
      previous.cancel();
    }
    Ok(())
  }

  /// Present the next problem for a fired timer.
  ///
  /// Returns `Ok(None)` for a ticket that no longer matches the session's
  /// pending advance (tier switched, session restarted, problem skipped,
  /// another learner).
  pub fn complete_advance<'a>(
    &self,
    ctx: &'a mut SessionContext,
    ticket: AdvanceTicket,
  ) -> Result<Option<&'a Problem>> {
    let expected = ctx
      .pending
      .as_ref()
      .is_some_and(|pending| pending.ticket() == &ticket);
    if !expected || !ctx.is_current(&ticket) {
      tracing::debug!(
        "Discarding stale advance for {} (generation {}, current {})",
        ticket.learner_id,
        ticket.generation,
        ctx.generation()
      );
      profile_log!(crate::profiling::EventType::AdvanceDiscarded {
        learner_id: ticket.learner_id.to_string(),
        generation: ticket.generation,
      });
      return Ok(None);
    }

    ctx.pending = None;
    self.next_problem(ctx).map(Some)
  }

  /// Move the learner to another tier. Starts a fresh session there.
  pub fn switch_tier<'a>(&self, ctx: &'a mut SessionContext, tier_index: usize) -> Result<&'a Problem> {
    let tier = self.catalog.tier_at(tier_index)?;
    tracing::info!("Learner {} switched to {}", ctx.learner_id(), tier.title());
    profile_log!(crate::profiling::EventType::TierChanged {
      learner_id: ctx.learner_id().to_string(),
      from: ctx.tier_index,
      to: tier_index,
      automatic: false,
    });

    ctx.reset();
    ctx.tier_index = tier_index;
    self.next_problem(ctx)
  }

  /// Restart the session on the same tier
  pub fn restart<'a>(&self, ctx: &'a mut SessionContext) -> Result<&'a Problem> {
    tracing::info!("Learner {} restarted the session", ctx.learner_id());
    ctx.reset();
    self.next_problem(ctx)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::TierDefinition;
  use crate::mastery::InMemoryLedger;
  use std::time::Duration;
  use tokio::sync::mpsc;

  /// Tiers as (name, comma separated facts)
  fn engine_with(tiers: &[(&str, &str)], settings: DrillSettings) -> DrillEngine {
    let definitions = tiers
      .iter()
      .map(|(name, facts)| TierDefinition {
        name: name.to_string(),
        icon: String::new(),
        facts: facts.split(',').map(|f| f.to_string()).collect(),
      })
      .collect();
    DrillEngine::new(FactCatalog::from_definitions(definitions).unwrap(), settings)
  }

  fn single_fact_engine() -> DrillEngine {
    engine_with(
      &[("Threes", "3×4"), ("Sixes", "6×7")],
      DrillSettings::default(),
    )
  }

  fn wrong_choice(problem: &Problem) -> u32 {
    *problem.choices.iter().find(|&&c| c != problem.answer()).unwrap()
  }

  struct FailingLedger;

  impl MasteryLedger for FailingLedger {
    fn record_attempt(&mut self, _: &LearnerId, _: &str, _: bool) -> Result<()> {
      Err(DrillError::Ledger("store offline".into()))
    }
  }

  #[test]
  fn test_builtin_engine_queries() {
    let engine = DrillEngine::from_settings(DrillSettings::default()).unwrap();
    assert_eq!(engine.tier_count(), 7);
    assert_eq!(engine.get_tier(3).unwrap().display_name, "Easy Patterns");
    assert!(matches!(engine.get_tier(7), Err(DrillError::OutOfRange { .. })));
    assert_eq!(engine.advance_tier(6), 6);
  }

  #[test]
  fn test_start_session() {
    let engine = single_fact_engine();
    let ctx = engine.start_session("maya", 0).unwrap();

    assert_eq!(ctx.learner_id().as_str(), "maya");
    assert_eq!(ctx.tier_index(), 0);
    assert_eq!(ctx.stats(), SessionStats::new());
    let problem = ctx.problem().unwrap();
    assert_eq!(problem.fact.token(), "3×4");
    assert_eq!(problem.answer(), 12);
  }

  #[test]
  fn test_start_session_out_of_range() {
    let engine = single_fact_engine();
    assert!(matches!(
      engine.start_session("maya", 2),
      Err(DrillError::OutOfRange { index: 2, count: 2 })
    ));
  }

  #[test]
  fn test_submit_correct_answer() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    let outcome = engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    assert!(outcome.is_correct());
    assert_eq!(outcome.message(), "🎉 Excellent! Well done!");
    assert_eq!((outcome.stats.correct(), outcome.stats.total()), (1, 1));
    assert!(ctx.problem().is_none());
    assert_eq!(ctx.streak(), 1);

    let record = ledger.record(ctx.learner_id(), "3×4").unwrap();
    assert_eq!((record.attempts, record.correct), (1, 1));
  }

  #[test]
  fn test_submit_wrong_answer_shows_equation() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let mut ctx = engine.start_session("maya", 1).unwrap();
    let choice = wrong_choice(ctx.problem().unwrap());

    let outcome = engine.submit_answer(&mut ctx, choice, &mut ledger).unwrap();
    assert!(!outcome.is_correct());
    assert_eq!(outcome.evaluation.result, AnswerResult::Incorrect);
    assert!(outcome.message().contains("6 × 7 = 42"));
    assert_eq!((outcome.stats.correct(), outcome.stats.total()), (0, 1));
    assert_eq!(ctx.streak(), 0);
  }

  #[test]
  fn test_submit_value_not_offered_scores_incorrect() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    let outcome = engine.submit_answer(&mut ctx, 999, &mut ledger).unwrap();
    assert_eq!(outcome.evaluation.result, AnswerResult::NotOffered);
    assert_eq!(outcome.stats.total(), 1);
    assert_eq!(ledger.record(ctx.learner_id(), "3×4").unwrap().correct, 0);
  }

  #[test]
  fn test_submit_without_problem() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let mut ctx = engine.start_session("maya", 0).unwrap();
    engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();

    let err = engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap_err();
    assert!(matches!(err, DrillError::NoActiveProblem { learner } if learner == "maya"));
    assert_eq!(ctx.stats().total(), 1);
  }

  #[test]
  fn test_ledger_failure_does_not_fail_submission() {
    let engine = single_fact_engine();
    let mut ctx = engine.start_session("maya", 0).unwrap();
    let outcome = engine.submit_answer(&mut ctx, 12, &mut FailingLedger).unwrap();
    assert!(outcome.is_correct());
    assert_eq!(ctx.stats().total(), 1);
  }

  #[test]
  fn test_restart_after_five_attempts() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    for is_correct in [true, true, false, true, false] {
      let choice = if is_correct { 12 } else { 13 };
      engine.submit_answer(&mut ctx, choice, &mut ledger).unwrap();
      engine.next_problem(&mut ctx).unwrap();
    }
    assert_eq!((ctx.stats().correct(), ctx.stats().total()), (3, 5));

    engine.restart(&mut ctx).unwrap();
    assert_eq!(ctx.stats(), SessionStats::new());
    assert!(ctx.problem().is_some());
    // Mastery history outlives the session
    assert_eq!(ledger.record(ctx.learner_id(), "3×4").unwrap().attempts, 5);
  }

  #[test]
  fn test_switch_tier_resets_session() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let mut ctx = engine.start_session("maya", 0).unwrap();
    engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();

    let problem = engine.switch_tier(&mut ctx, 1).unwrap();
    assert_eq!(problem.fact.token(), "6×7");
    assert_eq!(ctx.tier_index(), 1);
    assert_eq!(ctx.stats().total(), 0);
    assert_eq!(ctx.generation(), 1);
  }

  #[test]
  fn test_switch_tier_out_of_range_keeps_session() {
    let engine = single_fact_engine();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    assert!(engine.switch_tier(&mut ctx, 5).is_err());
    assert_eq!(ctx.tier_index(), 0);
    assert_eq!(ctx.generation(), 0);
    assert!(ctx.problem().is_some());
  }

  #[test]
  fn test_streak_advances_tier() {
    let settings = DrillSettings {
      auto_advance_streak: Some(2),
      ..DrillSettings::default()
    };
    let engine = engine_with(&[("Threes", "3×4"), ("Sixes", "6×7")], settings);
    let mut ledger = InMemoryLedger::new();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    let first = engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    assert_eq!(first.advanced_to, None);
    engine.next_problem(&mut ctx).unwrap();

    let second = engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    assert_eq!(second.advanced_to, Some(1));
    assert_eq!(ctx.tier_index(), 1);
    assert_eq!(ctx.streak(), 0);
    assert_eq!(ctx.stats().total(), 2);

    assert_eq!(engine.next_problem(&mut ctx).unwrap().fact.token(), "6×7");
  }

  #[test]
  fn test_streak_stays_on_last_tier() {
    let settings = DrillSettings {
      auto_advance_streak: Some(1),
      ..DrillSettings::default()
    };
    let engine = engine_with(&[("Only", "3×4")], settings);
    let mut ledger = InMemoryLedger::new();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    let outcome = engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    assert_eq!(outcome.advanced_to, None);
    assert_eq!(ctx.tier_index(), 0);
  }

  #[test]
  fn test_manual_policy_never_advances() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let mut ctx = engine.start_session("maya", 0).unwrap();
    for _ in 0..10 {
      let outcome = engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
      assert_eq!(outcome.advanced_to, None);
      engine.next_problem(&mut ctx).unwrap();
    }
    assert_eq!(ctx.tier_index(), 0);
  }

  // Feedback delay

  #[tokio::test(start_paused = true)]
  async fn test_advance_after_feedback_delay() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    engine.schedule_advance(&mut ctx, tx).unwrap();
    assert!(ctx.has_pending_advance());

    let start = tokio::time::Instant::now();
    let ticket = rx.recv().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(2000));

    let problem = engine.complete_advance(&mut ctx, ticket).unwrap();
    assert_eq!(problem.unwrap().fact.token(), "3×4");
    assert!(!ctx.has_pending_advance());
  }

  #[tokio::test(start_paused = true)]
  async fn test_tier_switch_cancels_pending_advance() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    engine.schedule_advance(&mut ctx, tx.clone()).unwrap();
    engine.switch_tier(&mut ctx, 1).unwrap();
    assert!(!ctx.has_pending_advance());

    let waited = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
    assert!(waited.is_err(), "cancelled advance fired");
    assert_eq!(ctx.problem().unwrap().fact.token(), "6×7");
  }

  #[tokio::test(start_paused = true)]
  async fn test_stale_ticket_is_discarded() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    engine.schedule_advance(&mut ctx, tx).unwrap();
    // Timer fires, but the learner restarts before the ticket is handled
    let ticket = rx.recv().await.unwrap();
    engine.restart(&mut ctx).unwrap();
    let on_screen = ctx.problem().cloned();

    assert!(engine.complete_advance(&mut ctx, ticket).unwrap().is_none());
    assert_eq!(ctx.problem().cloned(), on_screen);
  }

  #[tokio::test(start_paused = true)]
  async fn test_ticket_from_other_learner_is_discarded() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut maya = engine.start_session("maya", 0).unwrap();
    engine.submit_answer(&mut maya, 12, &mut ledger).unwrap();
    engine.schedule_advance(&mut maya, tx).unwrap();
    let ticket = rx.recv().await.unwrap();

    let mut leo = engine.start_session("leo", 0).unwrap();
    engine.submit_answer(&mut leo, 12, &mut ledger).unwrap();
    assert!(engine.complete_advance(&mut leo, ticket).unwrap().is_none());
    assert!(leo.problem().is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn test_skip_discards_delivered_ticket() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    engine.schedule_advance(&mut ctx, tx).unwrap();
    let ticket = rx.recv().await.unwrap();
    engine.skip_problem(&mut ctx).unwrap();

    assert!(engine.complete_advance(&mut ctx, ticket).unwrap().is_none());
    assert!(ctx.problem().is_some());
  }

  #[tokio::test(start_paused = true)]
  async fn test_queued_ticket_from_before_skip_does_not_cut_next_delay() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    engine.schedule_advance(&mut ctx, tx.clone()).unwrap();
    tokio::time::sleep(Duration::from_millis(2001)).await;

    // Old ticket is still queued while the learner skips and answers again
    engine.skip_problem(&mut ctx).unwrap();
    engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    engine.schedule_advance(&mut ctx, tx).unwrap();

    let old = rx.recv().await.unwrap();
    assert!(engine.complete_advance(&mut ctx, old).unwrap().is_none());
    assert!(ctx.problem().is_none());
    assert!(ctx.has_pending_advance());

    let start = tokio::time::Instant::now();
    let fresh = rx.recv().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(2000));
    assert!(engine.complete_advance(&mut ctx, fresh).unwrap().is_some());
  }

  #[tokio::test(start_paused = true)]
  async fn test_rescheduling_replaces_earlier_ticket() {
    let engine = single_fact_engine();
    let mut ledger = InMemoryLedger::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ctx = engine.start_session("maya", 0).unwrap();

    engine.submit_answer(&mut ctx, 12, &mut ledger).unwrap();
    engine.schedule_advance(&mut ctx, tx.clone()).unwrap();
    let first = rx.recv().await.unwrap();
    engine.schedule_advance(&mut ctx, tx).unwrap();

    assert!(engine.complete_advance(&mut ctx, first).unwrap().is_none());
    let second = rx.recv().await.unwrap();
    assert!(engine.complete_advance(&mut ctx, second).unwrap().is_some());
  }
}

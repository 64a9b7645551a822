//! Deferred "show the next problem" action.
//!
//! After feedback is shown the next problem appears on a timer. The timer is a
//! Tokio task that sends an [`AdvanceTicket`] when it fires. The task is
//! aborted when its [`PendingAdvance`] is cancelled or dropped, and the ticket
//! carries the session generation so a late delivery is still recognisable.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use crate::error::{DrillError, Result};
use crate::session::LearnerId;

/// Delivered when the feedback delay has elapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceTicket {
  pub learner_id: LearnerId,
  pub generation: u64,
  pub sequence: u64,
}

/// Handle to a scheduled advance. Dropping it cancels the timer.
#[derive(Debug)]
pub struct PendingAdvance {
  handle: AbortHandle,
  ticket: AdvanceTicket,
}

impl PendingAdvance {
  pub fn ticket(&self) -> &AdvanceTicket {
    &self.ticket
  }

  pub fn cancel(self) {
    // Drop aborts
    tracing::debug!(
      "Cancelled pending advance for {} (generation {}, #{})",
      self.ticket.learner_id,
      self.ticket.generation,
      self.ticket.sequence
    );
  }
}

impl Drop for PendingAdvance {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

/// Send `ticket` on `tx` after `delay`.
///
/// Must be called from inside a Tokio runtime.
pub fn schedule_advance(
  ticket: AdvanceTicket,
  delay: Duration,
  tx: UnboundedSender<AdvanceTicket>,
) -> Result<PendingAdvance> {
  let runtime = tokio::runtime::Handle::try_current()
    .map_err(|e| DrillError::Scheduler(format!("feedback timer needs a Tokio runtime: {}", e)))?;

  let sent = ticket.clone();
  let task = runtime.spawn(async move {
    tokio::time::sleep(delay).await;
    if tx.send(sent).is_err() {
      tracing::debug!("Advance receiver closed before the timer fired");
    }
  });

  Ok(PendingAdvance {
    handle: task.abort_handle(),
    ticket,
  })
}

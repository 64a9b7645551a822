pub mod catalog;
pub mod config;
pub mod domain;
pub mod drill;
pub mod engine;
pub mod error;
pub mod mastery;
pub mod profiling;
pub mod scheduler;
pub mod session;
pub mod validation;

pub use catalog::{FactCatalog, TierDefinition};
pub use domain::{Fact, Problem, Tier};
pub use engine::{DrillEngine, SubmitOutcome};
pub use error::{DrillError, Result};
pub use mastery::{InMemoryLedger, MasteryLedger, MasteryRecord};
pub use scheduler::AdvanceTicket;
pub use session::{LearnerId, SessionContext, SessionStats};
pub use validation::{AnswerResult, Evaluation};

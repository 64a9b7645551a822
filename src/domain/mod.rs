pub mod fact;
pub mod problem;
pub mod tier;

pub use fact::{parse, Fact, MULTIPLY_GLYPH};
pub use problem::{Problem, CHOICE_COUNT};
pub use tier::Tier;

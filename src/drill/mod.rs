pub mod choices;
pub mod selector;

pub use choices::{generate_choices, generate_choices_with};
pub use selector::{next_problem, next_problem_with, select_fact};

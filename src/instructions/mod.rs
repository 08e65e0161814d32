pub mod close;
pub mod compute_budget;

pub use close::{CloseError, ClosePlan, assemble};

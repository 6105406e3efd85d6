pub mod deal_evaluator;
pub mod schedule_fetcher;

pub use deal_evaluator::*;
pub use schedule_fetcher::*;

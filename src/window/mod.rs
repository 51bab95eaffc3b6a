pub mod aggregate;
pub mod matrix;
pub mod weight;

pub use aggregate::{aggregate, Aggregation, Aggregator, Window};
pub use matrix::ContributionMatrix;
pub use weight::weight;

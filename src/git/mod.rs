pub mod repo;

pub use repo::{count_changed_lines, GitRepo};

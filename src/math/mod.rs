//! Small geometric helpers shared by picking and tests.

pub mod ray;

pub use ray::Ray;

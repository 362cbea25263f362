pub mod client;
#[cfg(test)]
pub mod mock;

pub use client::{Endpoints, HttpJobApi, JobApi};

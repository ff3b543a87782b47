//! Clients for external services

pub mod classifier;

pub use classifier::{ClassifierClient, ClassifierError};

mod client;

pub use client::{OrchestratorClient, PAGE_SIZE};

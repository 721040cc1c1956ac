// Fetch → parse → publish for a single series
pub mod pipeline;

// Periodic refresh with per-series single-flight guard
pub mod scheduler;

// System orchestrator
pub mod system;

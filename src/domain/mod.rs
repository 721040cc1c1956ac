// Series descriptors and observations
pub mod series;

// Data-section state machine
pub mod scanner;

// Data row parsing
pub mod record;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;

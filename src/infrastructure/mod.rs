pub mod core;
pub mod observability;
pub mod sources;

pub use self::core::HttpClientFactory;

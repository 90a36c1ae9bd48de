/// Database access layer
///
/// - [`pool`]: connection pool construction and lifecycle
/// - [`migrations`]: embedded sqlx migration runner

pub mod migrations;
pub mod pool;

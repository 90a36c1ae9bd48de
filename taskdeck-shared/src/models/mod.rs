/// Database models
///
/// - [`user`]: accounts, roles, and admin listing queries
/// - [`task`]: tasks, their lifecycle status, and owner-scoped queries

pub mod task;
pub mod user;

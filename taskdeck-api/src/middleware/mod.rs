/// Request middleware
///
/// - [`auth`]: bearer-token authentication, attaches the request identity
/// - [`role`]: admin gate for the user-management routes

pub mod auth;
pub mod role;

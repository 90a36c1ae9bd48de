/// Authentication primitives
///
/// - [`password`]: Argon2id hashing and verification
/// - [`jwt`]: HS256 token creation and validation
/// - [`identity`]: the resolved request identity and auth error taxonomy
///
/// The middleware that wires these into the request pipeline lives in the
/// API crate; this module stays framework-light so the primitives are
/// testable in isolation.

pub mod identity;
pub mod jwt;
pub mod password;

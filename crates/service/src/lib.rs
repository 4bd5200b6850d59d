//! Service layer providing user account operations on top of models.
//! - Separates business logic from data access (`UserRepository`).
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod user;
#[cfg(test)]
pub mod test_support;

pub use user::UserService;

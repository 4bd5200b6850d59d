//! User accounts: domain inputs, persistence port, SeaORM adapter and the
//! `UserService` that ties them together.

pub mod domain;
pub mod password;
pub mod repository;
pub mod repo;
pub mod service;

pub use models::user::Model as User;
pub use service::UserService;

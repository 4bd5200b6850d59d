//! Pieces shared by the server crate and the binary: wire types and logging setup.

pub mod types;
pub mod utils;

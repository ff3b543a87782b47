//! SQLite schema and account storage

pub mod init;
pub mod users;

pub use init::*;
pub use users::*;

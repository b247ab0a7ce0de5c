//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument.

pub mod invalid_attempt_repo;
pub mod share_token_repo;

pub use invalid_attempt_repo::InvalidAttemptRepo;
pub use share_token_repo::ShareTokenRepo;

//! Domain logic for the skiff file-sharing service.
//!
//! Pure building blocks with no HTTP or database dependencies:
//! credential lists, throttle window math, quota arithmetic, share-token
//! generation, and filename normalization. Persistence lives in
//! `skiff_db`, transport in `skiff_api`.

pub mod credentials;
pub mod error;
pub mod filename;
pub mod quota;
pub mod share_link;
pub mod throttle;
pub mod types;

//! Row types and create DTOs.

pub mod invalid_attempt;
pub mod share_token;

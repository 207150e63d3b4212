//! In-memory storage for outstanding challenges and known users.
//!
//! Both stores are process-local and guarded by a single mutex each.
//! Nothing survives a restart: pending challenges simply have to be
//! requested again, and users are re-created on their next login.

pub mod nonce;
pub mod user;

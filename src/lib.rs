//! # Vendo account service
//!
//! `vendo` is the authentication backend for the Vendo shop: OTP-gated
//! signup and password reset over email, backed by Postgres.
//!
//! ## OTP lifecycle
//!
//! Two independent flows (signup verification and password reset) share
//! one lifecycle: a 6-digit code is generated, stored as a SHA-256 hash with
//! a flow-specific TTL, and mailed to the address. Validation checks pending
//! state, expiry, and the flow's attempt ceiling before comparing hashes;
//! a matching submission consumes the code and clears its slot. Issuance is
//! throttled by a 30-second resend cooldown, and re-issuing is the only
//! recovery from a locked-out or expired code.
//!
//! Codes and session tokens are never persisted in cleartext; passwords are
//! stored as argon2 hashes.

pub mod api;
pub mod cli;
pub mod otp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

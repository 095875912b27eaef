//! Router Module Index
//!
//! Splits the HTTP surface by access level, so the session layer is applied at module
//! level rather than per handler.

/// Routes accessible without a credential.
pub mod public;

/// Routes protected by the `Session` extractor middleware.
pub mod authenticated;

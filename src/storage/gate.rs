//! Authorization gate
//!
//! Backup and restore expose the whole vault, so the host app fronts them
//! with its biometric or device-credential prompt. The core treats that
//! prompt as an opaque capability: it asks the gate before either
//! operation and refuses to proceed on a negative answer. The gate itself
//! never sees passwords or record data.

/// A yes/no authorization capability supplied by the host platform
pub trait AuthorizationGate {
    /// Ask the user to authorize an operation
    ///
    /// `reason` is a short human-readable description for the prompt.
    fn authorize(&self, reason: &str) -> bool;
}

/// Gate that grants every request
///
/// The default for hosts without a device credential, and for tests.
pub struct AlwaysAllow;

impl AuthorizationGate for AlwaysAllow {
    fn authorize(&self, _reason: &str) -> bool {
        true
    }
}

//! Validation of caller-supplied identifiers
//!
//! User ids are opaque strings issued by the surrounding identity system. The
//! only rule enforced here is that a user-scoped query must name a user.

use crate::error::{RbacError, Result};
use rand::RngCore;

/// Reject an empty user id before any lookup happens
///
/// # Examples
///
/// ```
/// use rbac_store::core::validation::validate_user_id;
///
/// assert!(validate_user_id("u1").is_ok());
/// assert!(validate_user_id("").unwrap_err().is_validation());
/// ```
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(RbacError::Validation("user id cannot be empty".to_string()));
    }
    Ok(())
}

/// Generate a random 128-bit identifier as 32 lowercase hex characters
pub fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (mnemo-infra) implements. The core crate never depends on any specific
//! storage technology.

pub mod conversation;
pub mod memory;
pub mod skill;

/// Reject ids that could escape a per-record storage directory.
pub fn validate_record_id(id: &str) -> Result<(), mnemo_types::error::RepositoryError> {
    let trimmed = id.trim();
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains("..")
        || trimmed.contains('\0')
    {
        return Err(mnemo_types::error::RepositoryError::InvalidId(id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_record_id() {
        assert!(validate_record_id("default").is_ok());
        assert!(validate_record_id("work-2025_01").is_ok());
        assert!(validate_record_id("").is_err());
        assert!(validate_record_id("../etc").is_err());
        assert!(validate_record_id("a/b").is_err());
        assert!(validate_record_id("a\\b").is_err());
    }
}

// mcpgate-evidence/src/opid.rs
// ============================================================================
// Module: Operation ID
// Description: Generates the UUIDv4 attached to every event, span, and
//              receipt for one invocation.
// Purpose: spec.md §4.9.
// ============================================================================

use uuid::Uuid;

/// Generates a fresh operation id.
#[must_use]
pub fn new() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_distinct_ids() {
        assert_ne!(new(), new());
    }

    #[test]
    fn is_uuid_shaped() {
        let id = new();
        assert_eq!(id.len(), 36);
        assert_eq!(id.chars().filter(|c| *c == '-').count(), 4);
    }
}

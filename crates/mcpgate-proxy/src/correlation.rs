// mcpgate-proxy/src/correlation.rs
// ============================================================================
// Module: Correlation Table
// Description: Bounded map from a host-issued request id to the method it
//              asked for, so the server->host direction knows which list
//              responses to filter.
// Purpose: spec.md §4.4's correlation table, §5's single-mutex sharing rule.
// Dependencies: tokio::sync::Mutex, std::collections
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;

use serde_json::Value;
use tokio::sync::Mutex;

/// Maximum pending entries before the oldest is evicted (spec.md §4.4).
pub const MAX_PENDING: usize = 10_000;

/// `map<request_id, method>`, insertion-ordered for oldest-first eviction.
pub struct CorrelationTable {
    /// Guards both the map and the insertion-order queue together.
    inner: Mutex<Inner>,
}

/// The guarded state: kept as one struct so a single lock covers both.
struct Inner {
    /// Request id (as received on the wire) to the method it named.
    methods: HashMap<String, String>,
    /// Insertion order, for oldest-first eviction once [`MAX_PENDING`] is
    /// exceeded.
    order: VecDeque<String>,
}

impl CorrelationTable {
    /// Builds an empty correlation table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                methods: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Records that a request with id `id` asked for `method`. Evicts the
    /// oldest entry and logs a capacity event if this insertion exceeds
    /// [`MAX_PENDING`].
    pub async fn insert(&self, id: &Value, method: &str) {
        let key = id_key(id);
        let mut guard = self.inner.lock().await;
        guard.methods.insert(key.clone(), method.to_string());
        guard.order.push_back(key);
        if guard.order.len() > MAX_PENDING {
            if let Some(oldest) = guard.order.pop_front() {
                guard.methods.remove(&oldest);
                tracing::warn!(capacity = MAX_PENDING, "correlation table evicted oldest pending entry");
            }
        }
    }

    /// Removes and returns the method recorded for `id`, if any.
    pub async fn take(&self, id: &Value) -> Option<String> {
        let key = id_key(id);
        let mut guard = self.inner.lock().await;
        guard.order.retain(|k| k != &key);
        guard.methods.remove(&key)
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes a JSON-RPC id (number or string, per the spec) to a string
/// key; `retain`'s O(n) cost is acceptable at the 10 000-entry cap spec.md
/// §4.4 sets.
fn id_key(id: &Value) -> String {
    match id {
        Value::String(s) => format!("s:{s}"),
        other => format!("n:{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_then_take_round_trips() {
        let table = CorrelationTable::new();
        table.insert(&json!(1), "tools/list").await;
        assert_eq!(table.take(&json!(1)).await, Some("tools/list".to_string()));
        assert_eq!(table.take(&json!(1)).await, None);
    }

    #[tokio::test]
    async fn string_and_numeric_ids_do_not_collide() {
        let table = CorrelationTable::new();
        table.insert(&json!(1), "a").await;
        table.insert(&json!("1"), "b").await;
        assert_eq!(table.take(&json!(1)).await, Some("a".to_string()));
        assert_eq!(table.take(&json!("1")).await, Some("b".to_string()));
    }

    #[tokio::test]
    async fn eviction_drops_the_oldest_entry_past_capacity() {
        let table = CorrelationTable::new();
        for i in 0..MAX_PENDING {
            table.insert(&json!(i), "tools/list").await;
        }
        table.insert(&json!(MAX_PENDING), "tools/list").await;
        assert_eq!(table.take(&json!(0)).await, None);
        assert!(table.take(&json!(MAX_PENDING)).await.is_some());
    }
}

//! Business identifier generation for PR and PO numbers.
//!
//! Numbers keep the `PR-<n>` / `PO-<n>` shape where `<n>` starts from
//! epoch milliseconds, but the counter is forced to strictly increase
//! process-locally so two creations in the same millisecond can never
//! collide. The unique indexes on `pr_number`/`po_number` remain the
//! backstop across processes; a violation surfaces as `Conflict`.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_sequence() -> i64 {
    let now = Utc::now().timestamp_millis();
    LAST_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .map(|last| now.max(last + 1))
        .unwrap_or(now)
}

/// Next purchase requisition number, e.g. `PR-1735689600123`.
pub fn next_pr_number() -> String {
    format!("PR-{}", next_sequence())
}

/// Next purchase order number, e.g. `PO-1735689600124`.
pub fn next_po_number() -> String {
    format!("PO-{}", next_sequence())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn sequence_is_strictly_monotonic() {
        let mut prev = next_sequence();
        for _ in 0..1000 {
            let next = next_sequence();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn concurrent_generation_never_repeats() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| (0..200).map(|_| next_sequence()).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
    }

    #[test]
    fn numbers_carry_the_expected_prefix() {
        assert!(next_pr_number().starts_with("PR-"));
        assert!(next_po_number().starts_with("PO-"));
    }
}

//! Temporary guids for entities that have not been persisted yet.
//!
//! A temporary guid is a negative integer rendered as a string. The service
//! swaps it for a stable identifier on create and reports the mapping in
//! `MutationResponse::guid_assignments`.

use std::sync::atomic::{AtomicI64, Ordering};

use rand::Rng;

/// Source of temporary guids, injected wherever an entity needs one.
pub trait GuidSource: Send + Sync {
    fn next_guid(&self) -> String;
}

/// Random negative guids drawn from the calling thread's generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGuids;

impl GuidSource for RandomGuids {
    fn next_guid(&self) -> String {
        let value: i64 = rand::thread_rng().gen_range(1..i64::MAX);
        format!("-{}", value)
    }
}

/// Deterministic guids `-1`, `-2`, ... for tests and reproducible payloads.
#[derive(Debug, Default)]
pub struct SequentialGuids {
    issued: AtomicI64,
}

impl SequentialGuids {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GuidSource for SequentialGuids {
    fn next_guid(&self) -> String {
        let next = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        format!("-{}", next)
    }
}

/// True when `guid` is a client-minted placeholder.
pub fn is_temporary(guid: &str) -> bool {
    guid.strip_prefix('-')
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn random_guids_are_temporary() {
        let guids = RandomGuids;
        for _ in 0..100 {
            assert!(is_temporary(&guids.next_guid()));
        }
    }

    #[test]
    fn sequential_guids_count_down_from_minus_one() {
        let guids = SequentialGuids::new();
        assert_eq!(guids.next_guid(), "-1");
        assert_eq!(guids.next_guid(), "-2");
        assert_eq!(guids.next_guid(), "-3");
    }

    #[test]
    fn sequential_guids_are_unique_across_threads() {
        let guids = Arc::new(SequentialGuids::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let guids = Arc::clone(&guids);
                std::thread::spawn(move || (0..250).map(|_| guids.next_guid()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for guid in handle.join().unwrap() {
                assert!(seen.insert(guid));
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn is_temporary_rejects_server_guids() {
        assert!(!is_temporary("9b4e2c1a-5f0d-4c3b-8a7e-1d2f3a4b5c6d"));
        assert!(!is_temporary("-"));
        assert!(!is_temporary("-12a"));
        assert!(is_temporary("-42"));
    }
}

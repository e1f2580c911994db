//! Advisor assignment: resolves exactly one contact number for a visitor.
//!
//! Precedence, first match wins:
//! 1. explicit override (from a shared link) — adopted and persisted;
//! 2. sticky cache — the number this device was already routed to;
//! 3. uniform random pick over the advisor directory — persisted;
//! 4. nothing available — no number, contact actions must be disabled.
//!
//! The store, directory, and random source are injected so the server wires
//! in cookies, Postgres, and `rand` while tests substitute deterministic
//! fakes.

use serde::Serialize;

use crate::advisors::AdvisorRecord;

/// Fixed key under which a device's sticky assignment is persisted,
/// distinct from any other client-side state.
pub const STICKY_STORE_KEY: &str = "celred_sticky_wa";

/// How the resolved number was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentSource {
    ExplicitOverride,
    StickyCache,
    RandomPick,
    NoneAvailable,
}

/// The outcome of one resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub number: Option<String>,
    pub source: AssignmentSource,
}

impl Assignment {
    #[must_use]
    pub fn none_available() -> Self {
        Self {
            number: None,
            source: AssignmentSource::NoneAvailable,
        }
    }

    /// `true` when a contact number was resolved and outbound contact
    /// actions may be enabled.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.number.is_some()
    }
}

/// Device-local persistent slot holding the sticky contact number.
///
/// Last-write-wins; the store is never shared across devices, so no locking
/// is needed. Entries never expire.
pub trait AssignmentStore {
    fn get(&self) -> Option<String>;
    fn set(&mut self, number: &str);
}

/// Read-side view of the advisor directory.
pub trait DirectoryProvider {
    type Error: std::fmt::Display;

    /// Fetches the current directory, in insertion order.
    fn fetch(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<AdvisorRecord>, Self::Error>> + Send;
}

/// Uniform index source for the random-pick branch.
pub trait IndexPicker {
    /// Returns an index in `0..len`. Callers guarantee `len >= 1`.
    fn pick(&mut self, len: usize) -> usize;
}

/// Production picker backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformPicker;

impl IndexPicker for UniformPicker {
    fn pick(&mut self, len: usize) -> usize {
        use rand::Rng;
        rand::rng().random_range(0..len)
    }
}

/// Resolves the advisor assignment for the current visitor.
///
/// Exactly one store write happens when an override is adopted or a random
/// pick lands; the sticky and none-available branches never write. A failed
/// directory fetch is logged and degrades to [`Assignment::none_available`],
/// identical to an empty directory — there is deliberately no hardcoded
/// fallback number, since that would defeat load distribution and could
/// route leads to a decommissioned contact.
pub async fn resolve_assignment<S, D, P>(
    explicit_override: Option<&str>,
    store: &mut S,
    directory: &D,
    picker: &mut P,
) -> Assignment
where
    S: AssignmentStore,
    D: DirectoryProvider,
    P: IndexPicker,
{
    // 1. An override from a shared link claims the visitor, overwriting any
    //    prior stickiness.
    if let Some(number) = explicit_override.map(str::trim).filter(|n| !n.is_empty()) {
        store.set(number);
        return Assignment {
            number: Some(number.to_owned()),
            source: AssignmentSource::ExplicitOverride,
        };
    }

    // 2. A previously routed device keeps its advisor. The cached number may
    //    reference an advisor no longer in the directory; stale assignments
    //    are tolerated, not reconciled.
    if let Some(cached) = store.get() {
        return Assignment {
            number: Some(cached),
            source: AssignmentSource::StickyCache,
        };
    }

    // 3. Fresh device: spread load uniformly across the roster.
    let advisors = match directory.fetch().await {
        Ok(advisors) => advisors,
        Err(e) => {
            tracing::warn!(error = %e, "advisor directory unavailable, treating as empty");
            return Assignment::none_available();
        }
    };

    if advisors.is_empty() {
        return Assignment::none_available();
    }

    let chosen = &advisors[picker.pick(advisors.len())];
    store.set(&chosen.number);
    Assignment {
        number: Some(chosen.number.clone()),
        source: AssignmentSource::RandomPick,
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    /// In-memory single-slot store that counts writes.
    #[derive(Debug, Default)]
    struct MemoryStore {
        value: Option<String>,
        writes: usize,
    }

    impl MemoryStore {
        fn holding(number: &str) -> Self {
            Self {
                value: Some(number.to_owned()),
                writes: 0,
            }
        }
    }

    impl AssignmentStore for MemoryStore {
        fn get(&self) -> Option<String> {
            self.value.clone()
        }

        fn set(&mut self, number: &str) {
            self.value = Some(number.to_owned());
            self.writes += 1;
        }
    }

    struct StaticDirectory(Vec<AdvisorRecord>);

    impl StaticDirectory {
        fn with_numbers(numbers: &[&str]) -> Self {
            Self(
                numbers
                    .iter()
                    .map(|n| AdvisorRecord {
                        number: (*n).to_owned(),
                        name: None,
                        image_url: None,
                    })
                    .collect(),
            )
        }
    }

    impl DirectoryProvider for StaticDirectory {
        type Error = Infallible;

        async fn fetch(&self) -> Result<Vec<AdvisorRecord>, Infallible> {
            Ok(self.0.clone())
        }
    }

    struct FailingDirectory;

    impl DirectoryProvider for FailingDirectory {
        type Error = String;

        async fn fetch(&self) -> Result<Vec<AdvisorRecord>, String> {
            Err("connection refused".to_owned())
        }
    }

    /// Deterministic picker returning a fixed index.
    struct FixedPicker(usize);

    impl IndexPicker for FixedPicker {
        fn pick(&mut self, _len: usize) -> usize {
            self.0
        }
    }

    #[tokio::test]
    async fn override_wins_over_everything_and_is_persisted() {
        let mut store = MemoryStore::holding("573001111111");
        let directory = StaticDirectory::with_numbers(&["573001111111", "573002222222"]);
        let mut picker = FixedPicker(0);

        let assignment =
            resolve_assignment(Some("573009999999"), &mut store, &directory, &mut picker).await;

        assert_eq!(assignment.number.as_deref(), Some("573009999999"));
        assert_eq!(assignment.source, AssignmentSource::ExplicitOverride);
        assert_eq!(store.value.as_deref(), Some("573009999999"));
        assert_eq!(store.writes, 1);
    }

    #[tokio::test]
    async fn blank_override_is_ignored() {
        let mut store = MemoryStore::holding("573001111111");
        let directory = StaticDirectory::with_numbers(&["573002222222"]);
        let mut picker = FixedPicker(0);

        let assignment =
            resolve_assignment(Some("   "), &mut store, &directory, &mut picker).await;

        assert_eq!(assignment.source, AssignmentSource::StickyCache);
        assert_eq!(assignment.number.as_deref(), Some("573001111111"));
        assert_eq!(store.writes, 0);
    }

    #[tokio::test]
    async fn sticky_cache_is_returned_without_a_write() {
        let mut store = MemoryStore::holding("573001111111");
        let directory = StaticDirectory::with_numbers(&["573002222222"]);
        let mut picker = FixedPicker(0);

        let assignment = resolve_assignment(None, &mut store, &directory, &mut picker).await;

        assert_eq!(assignment.number.as_deref(), Some("573001111111"));
        assert_eq!(assignment.source, AssignmentSource::StickyCache);
        assert_eq!(store.writes, 0);
    }

    #[tokio::test]
    async fn sticky_resolution_is_idempotent() {
        let mut store = MemoryStore::holding("573001111111");
        let directory = StaticDirectory::with_numbers(&["573002222222"]);
        let mut picker = FixedPicker(0);

        let first = resolve_assignment(None, &mut store, &directory, &mut picker).await;
        let second = resolve_assignment(None, &mut store, &directory, &mut picker).await;

        assert_eq!(first, second);
        assert_eq!(store.writes, 0);
    }

    #[tokio::test]
    async fn random_pick_persists_the_chosen_number() {
        let mut store = MemoryStore::default();
        let directory = StaticDirectory::with_numbers(&["573001111111", "573002222222"]);
        let mut picker = FixedPicker(1);

        let assignment = resolve_assignment(None, &mut store, &directory, &mut picker).await;

        assert_eq!(assignment.number.as_deref(), Some("573002222222"));
        assert_eq!(assignment.source, AssignmentSource::RandomPick);
        assert_eq!(store.value.as_deref(), Some("573002222222"));
        assert_eq!(store.writes, 1);
    }

    #[tokio::test]
    async fn random_pick_result_is_one_of_the_directory_numbers() {
        let numbers = ["573001111111", "573002222222"];
        let directory = StaticDirectory::with_numbers(&numbers);
        let mut store = MemoryStore::default();
        let mut picker = UniformPicker;

        let assignment = resolve_assignment(None, &mut store, &directory, &mut picker).await;

        let number = assignment.number.expect("a number should be assigned");
        assert!(numbers.contains(&number.as_str()), "unexpected pick: {number}");
        assert_eq!(store.value.as_deref(), Some(number.as_str()));
    }

    #[tokio::test]
    async fn uniform_picker_reaches_every_index() {
        // Statistical sanity check on the production picker: over many draws
        // from a small roster, every index must come up at least once.
        let mut picker = UniformPicker;
        let mut seen = [false; 3];
        for _ in 0..500 {
            let idx = picker.pick(3);
            assert!(idx < 3, "picker returned out-of-range index {idx}");
            seen[idx] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[tokio::test]
    async fn empty_directory_yields_none_available_without_a_write() {
        let mut store = MemoryStore::default();
        let directory = StaticDirectory::with_numbers(&[]);
        let mut picker = FixedPicker(0);

        let assignment = resolve_assignment(None, &mut store, &directory, &mut picker).await;

        assert_eq!(assignment, Assignment::none_available());
        assert!(!assignment.is_resolved());
        assert_eq!(store.writes, 0);
        assert_eq!(store.value, None);
    }

    #[tokio::test]
    async fn directory_failure_degrades_to_none_available() {
        let mut store = MemoryStore::default();
        let mut picker = FixedPicker(0);

        let assignment =
            resolve_assignment(None, &mut store, &FailingDirectory, &mut picker).await;

        assert_eq!(assignment.source, AssignmentSource::NoneAvailable);
        assert_eq!(assignment.number, None);
        assert_eq!(store.writes, 0);
    }

    #[tokio::test]
    async fn override_still_wins_when_directory_is_down() {
        let mut store = MemoryStore::default();
        let mut picker = FixedPicker(0);

        let assignment =
            resolve_assignment(Some("573009999999"), &mut store, &FailingDirectory, &mut picker)
                .await;

        assert_eq!(assignment.source, AssignmentSource::ExplicitOverride);
        assert_eq!(assignment.number.as_deref(), Some("573009999999"));
    }

    #[test]
    fn source_serializes_kebab_case() {
        let json = serde_json::to_string(&AssignmentSource::ExplicitOverride).expect("serialize");
        assert_eq!(json, "\"explicit-override\"");
        let json = serde_json::to_string(&AssignmentSource::NoneAvailable).expect("serialize");
        assert_eq!(json, "\"none-available\"");
    }

    #[test]
    fn assignment_serializes_number_and_source() {
        let assignment = Assignment {
            number: Some("573001111111".to_owned()),
            source: AssignmentSource::StickyCache,
        };
        let json = serde_json::to_string(&assignment).expect("serialize");
        assert!(json.contains("\"number\":\"573001111111\""));
        assert!(json.contains("\"source\":\"sticky-cache\""));
    }
}

use std::collections::BTreeSet;
use tripod_schema::prelude::{MAX_TAG, RESERVED_TAGS};

///
/// TagAllocator
///
/// Two-pass field numbering for one message. Explicit tags are reserved
/// first, then every untagged member takes the lowest free number from 1,
/// skipping the protobuf reserved range.
///

#[derive(Debug)]
pub struct TagAllocator {
    used: BTreeSet<u32>,
    next: u32,
}

impl Default for TagAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl TagAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            used: BTreeSet::new(),
            next: 1,
        }
    }

    /// Assign a tag to every member; `explicit` is in member order.
    /// Returns `None` only when the numbering space is exhausted.
    pub fn assign(explicit: &[Option<u32>]) -> Option<Vec<u32>> {
        let mut allocator = Self::new();

        // Phase 1: reserve explicit tags
        for tag in explicit.iter().flatten() {
            allocator.used.insert(*tag);
        }

        // Phase 2: fill gaps
        explicit
            .iter()
            .map(|tag| tag.or_else(|| allocator.next_free()))
            .collect()
    }

    fn next_free(&mut self) -> Option<u32> {
        loop {
            let candidate = self.next;
            if candidate > MAX_TAG {
                return None;
            }
            self.next += 1;

            if RESERVED_TAGS.contains(&candidate) {
                self.next = RESERVED_TAGS.end() + 1;
                continue;
            }
            if self.used.insert(candidate) {
                return Some(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn untagged_members_take_lowest_free_number() {
        let tags = TagAllocator::assign(&[None, Some(2), None, None]);

        assert_eq!(tags, Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn explicit_tags_are_reserved_before_gaps_fill() {
        // the explicit tag comes after the untagged member in order
        let tags = TagAllocator::assign(&[None, Some(1), None]);

        assert_eq!(tags, Some(vec![2, 1, 3]));
    }

    #[test]
    fn reserved_range_is_skipped() {
        let mut allocator = TagAllocator::new();
        allocator.next = *RESERVED_TAGS.start();

        assert_eq!(allocator.next_free(), Some(RESERVED_TAGS.end() + 1));
    }

    proptest! {
        #[test]
        fn tags_are_unique_and_explicit_tags_survive(
            explicit in proptest::collection::vec(
                proptest::option::of(1_u32..64),
                0..24,
            )
        ) {
            // duplicate explicit tags are rejected by validation upstream
            let mut seen = BTreeSet::new();
            let explicit: Vec<Option<u32>> = explicit
                .into_iter()
                .map(|tag| tag.filter(|t| seen.insert(*t)))
                .collect();

            let tags = TagAllocator::assign(&explicit).expect("tags");

            prop_assert_eq!(tags.len(), explicit.len());
            let unique: BTreeSet<_> = tags.iter().copied().collect();
            prop_assert_eq!(unique.len(), tags.len());
            prop_assert!(tags.iter().all(|t| *t >= 1));

            for (tag, wanted) in tags.iter().zip(&explicit) {
                if let Some(wanted) = wanted {
                    prop_assert_eq!(tag, wanted);
                }
            }
        }
    }
}

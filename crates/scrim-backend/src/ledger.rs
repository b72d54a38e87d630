#![forbid(unsafe_code)]

//! Page-wide ledger for body padding adjustments.
//!
//! The body's right padding is one piece of global page state. Each modal
//! that compensates for the scrollbar records the value it found before
//! writing its own; the ledger keeps those records as a stack so nested
//! modals restore in any order without clobbering each other.
//!
//! # Invariants
//!
//! - At most one entry per owner.
//! - Restoring the top entry yields the value to write back.
//! - Restoring a buried entry writes nothing; its saved value is handed to
//!   the entry directly above it, which now restores to the older value.
//! - Restoring an owner with no entry is a no-op.

use std::cell::{Cell, RefCell};

/// Identifies one participant in a [`ScrollLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerId(u64);

impl LedgerId {
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Outcome of [`ScrollLedger::restore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restore {
    /// Write this value back to the body.
    Write(String),
    /// Another participant is stacked above; leave the body as is.
    Deferred,
    /// The owner had nothing recorded.
    Nothing,
}

#[derive(Debug, Clone)]
struct Entry {
    owner: LedgerId,
    saved: String,
}

/// Stack of saved body padding values, one per active participant.
#[derive(Debug, Default)]
pub struct ScrollLedger {
    next_id: Cell<u64>,
    entries: RefCell<Vec<Entry>>,
}

impl ScrollLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a new participant.
    pub fn register(&self) -> LedgerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        LedgerId(id)
    }

    /// Record `current` as the value to restore for `owner`.
    ///
    /// Returns `false` and keeps the earlier record if `owner` already has
    /// one.
    pub fn save(&self, owner: LedgerId, current: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|e| e.owner == owner) {
            return false;
        }
        entries.push(Entry {
            owner,
            saved: current.to_owned(),
        });
        true
    }

    /// Release `owner`'s record.
    pub fn restore(&self, owner: LedgerId) -> Restore {
        let mut entries = self.entries.borrow_mut();
        let Some(index) = entries.iter().position(|e| e.owner == owner) else {
            return Restore::Nothing;
        };
        let entry = entries.remove(index);
        match entries.get_mut(index) {
            Some(above) => {
                above.saved = entry.saved;
                Restore::Deferred
            }
            None => Restore::Write(entry.saved),
        }
    }

    /// Drop `owner`'s record without producing a value to write.
    pub fn forget(&self, owner: LedgerId) {
        let mut entries = self.entries.borrow_mut();
        if let Some(index) = entries.iter().position(|e| e.owner == owner) {
            let entry = entries.remove(index);
            if let Some(above) = entries.get_mut(index) {
                above.saved = entry.saved;
            }
        }
    }

    #[inline]
    pub fn is_saved(&self, owner: LedgerId) -> bool {
        self.entries.borrow().iter().any(|e| e.owner == owner)
    }

    /// Number of active records.
    #[inline]
    pub fn depth(&self) -> usize {
        self.entries.borrow().len()
    }

    /// The value the page returns to once every participant restores.
    pub fn baseline(&self) -> Option<String> {
        self.entries.borrow().first().map(|e| e.saved.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_save_restore_round_trip() {
        let ledger = ScrollLedger::new();
        let a = ledger.register();
        assert!(ledger.save(a, "4px"));
        assert_eq!(ledger.restore(a), Restore::Write("4px".into()));
        assert_eq!(ledger.depth(), 0);
    }

    #[test]
    fn restore_without_save_is_noop() {
        let ledger = ScrollLedger::new();
        let a = ledger.register();
        assert_eq!(ledger.restore(a), Restore::Nothing);
        assert!(ledger.save(a, ""));
        assert_eq!(ledger.restore(a), Restore::Write(String::new()));
        assert_eq!(ledger.restore(a), Restore::Nothing);
    }

    #[test]
    fn second_save_keeps_first_value() {
        let ledger = ScrollLedger::new();
        let a = ledger.register();
        assert!(ledger.save(a, "1px"));
        assert!(!ledger.save(a, "99px"));
        assert_eq!(ledger.restore(a), Restore::Write("1px".into()));
    }

    #[test]
    fn nested_restore_in_order() {
        let ledger = ScrollLedger::new();
        let outer = ledger.register();
        let inner = ledger.register();
        ledger.save(outer, "");
        ledger.save(inner, "15px");
        assert_eq!(ledger.restore(inner), Restore::Write("15px".into()));
        assert_eq!(ledger.restore(outer), Restore::Write(String::new()));
    }

    #[test]
    fn buried_restore_hands_value_upwards() {
        let ledger = ScrollLedger::new();
        let outer = ledger.register();
        let inner = ledger.register();
        ledger.save(outer, "");
        ledger.save(inner, "15px");
        assert_eq!(ledger.restore(outer), Restore::Deferred);
        assert_eq!(ledger.baseline(), Some(String::new()));
        assert_eq!(ledger.restore(inner), Restore::Write(String::new()));
    }

    #[test]
    fn forget_preserves_baseline() {
        let ledger = ScrollLedger::new();
        let outer = ledger.register();
        let inner = ledger.register();
        ledger.save(outer, "2px");
        ledger.save(inner, "17px");
        ledger.forget(outer);
        assert!(!ledger.is_saved(outer));
        assert_eq!(ledger.restore(inner), Restore::Write("2px".into()));
    }

    #[test]
    fn register_hands_out_distinct_ids() {
        let ledger = ScrollLedger::new();
        let a = ledger.register();
        let b = ledger.register();
        assert_ne!(a, b);
        assert!(a < b);
    }

    proptest! {
        // Whatever order participants restore in, the last write is the
        // value found before the first save.
        #[test]
        fn any_restore_order_returns_to_baseline(
            count in 1usize..8,
            order in proptest::collection::vec(any::<prop::sample::Index>(), 8),
        ) {
            let ledger = ScrollLedger::new();
            let ids: Vec<LedgerId> = (0..count).map(|_| ledger.register()).collect();
            let mut body = String::from("3px");
            for (i, id) in ids.iter().enumerate() {
                ledger.save(*id, &body);
                body = format!("{}px", 3 + 15 * (i + 1));
            }

            let mut remaining = ids.clone();
            let mut picks = order.into_iter();
            while !remaining.is_empty() {
                let pick = picks
                    .next()
                    .map(|ix| ix.index(remaining.len()))
                    .unwrap_or(0);
                let id = remaining.remove(pick);
                if let Restore::Write(value) = ledger.restore(id) {
                    body = value;
                }
            }

            prop_assert_eq!(body, "3px");
            prop_assert_eq!(ledger.depth(), 0);
        }
    }
}

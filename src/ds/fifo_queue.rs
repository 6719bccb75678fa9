//! Intrusive FIFO queue threaded through records in a shared [`SlotArena`].
//!
//! The queue itself owns only head/tail handles and a length counter; the
//! records live in an arena passed to every operation, with the prev/next
//! links embedded in the records. Several queues can thread disjoint
//! subsets of one arena, which is what lets a record migrate from queue to
//! queue as two O(1) splices with no reallocation and no stale handles.
//!
//! ```text
//!   arena (SlotArena<T: Chained>)
//!   ┌────────┬────────────────────────────────────────────┐
//!   │ SlotId │ record { ..., links: { prev, next } }      │
//!   ├────────┼────────────────────────────────────────────┤
//!   │ id_1   │ { A, prev: None,       next: Some(id_2) }  │
//!   │ id_2   │ { B, prev: Some(id_1), next: Some(id_3) }  │
//!   │ id_3   │ { C, prev: Some(id_2), next: None }        │
//!   └────────┴────────────────────────────────────────────┘
//!
//!   front ─► [id_1] ◄──► [id_2] ◄──► [id_3] ◄── back
//! ```
//!
//! Front = most recently pushed; back = next eviction candidate. All of
//! `push_front`, `pop_back`, `remove`, and `clear` are O(1). The queue
//! never touches anything but its own counters and the records' links.

use crate::ds::slot_arena::{SlotArena, SlotId};

/// Intrusive prev/next pair embedded in arena records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FifoLinks {
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

impl FifoLinks {
    pub fn prev(self) -> Option<SlotId> {
        self.prev
    }

    pub fn next(self) -> Option<SlotId> {
        self.next
    }
}

/// Implemented by record types that embed [`FifoLinks`].
pub trait Chained {
    fn links(&self) -> FifoLinks;
    fn links_mut(&mut self) -> &mut FifoLinks;
}

/// FIFO view over records in a shared arena.
///
/// A record may be threaded on at most one queue at a time; `remove` and
/// `pop_back` expect the record to currently be on *this* queue, and
/// `push_front` expects it to be detached. Violations corrupt the chains,
/// so the caller (the cache engine) tracks ownership with a tier tag.
#[derive(Debug, Default)]
pub struct FifoQueue {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl FifoQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently pushed record, if any.
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Next eviction candidate, if any.
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Threads a detached record onto the front of the queue.
    pub fn push_front<T: Chained>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let old_head = self.head;
        {
            let links = arena
                .get_mut(id)
                .expect("push_front: stale SlotId")
                .links_mut();
            links.prev = None;
            links.next = old_head;
        }
        match old_head {
            Some(h) => {
                arena
                    .get_mut(h)
                    .expect("push_front: stale head SlotId")
                    .links_mut()
                    .prev = Some(id);
            },
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    /// Detaches and returns the back record, or `None` if the queue is
    /// empty. Callers that have already checked `len` treat `None` as a
    /// size-bookkeeping bug.
    pub fn pop_back<T: Chained>(&mut self, arena: &mut SlotArena<T>) -> Option<SlotId> {
        let id = self.tail?;
        let prev = arena.get(id).expect("pop_back: stale SlotId").links().prev;
        match prev {
            Some(p) => {
                arena
                    .get_mut(p)
                    .expect("pop_back: stale prev SlotId")
                    .links_mut()
                    .next = None;
            },
            None => self.head = None,
        }
        self.tail = prev;
        *arena
            .get_mut(id)
            .expect("pop_back: stale SlotId")
            .links_mut() = FifoLinks::default();
        self.len -= 1;
        Some(id)
    }

    /// Splices a record out of wherever it sits in the chain.
    pub fn remove<T: Chained>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let FifoLinks { prev, next } = arena.get(id).expect("remove: stale SlotId").links();

        match prev {
            Some(p) => {
                arena
                    .get_mut(p)
                    .expect("remove: stale prev SlotId")
                    .links_mut()
                    .next = next;
            },
            None => self.head = next,
        }
        match next {
            Some(n) => {
                arena
                    .get_mut(n)
                    .expect("remove: stale next SlotId")
                    .links_mut()
                    .prev = prev;
            },
            None => self.tail = prev,
        }

        *arena.get_mut(id).expect("remove: stale SlotId").links_mut() = FifoLinks::default();
        self.len -= 1;
    }

    /// Detaches the queue from all records in O(1). Record memory stays in
    /// the arena; the caller decides what happens to it.
    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants<T: Chained>(&self, arena: &SlotArena<T>) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len, 0);
            return;
        }

        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;
        while let Some(id) = current {
            let links = arena.get(id).expect("queue walk: stale SlotId").links();
            assert_eq!(links.prev, prev);
            if links.next.is_none() {
                assert_eq!(self.tail, Some(id));
            }
            prev = Some(id);
            current = links.next;
            count += 1;
            assert!(count <= self.len);
        }
        assert_eq!(count, self.len);
    }
}

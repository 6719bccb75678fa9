#![no_main]

use std::collections::VecDeque;

use fifokit::ds::{Chained, FifoLinks, FifoQueue, SlotArena, SlotId};
use libfuzzer_sys::fuzz_target;

struct Record {
    _value: u8,
    links: FifoLinks,
}

impl Chained for Record {
    fn links(&self) -> FifoLinks {
        self.links
    }

    fn links_mut(&mut self) -> &mut FifoLinks {
        &mut self.links
    }
}

// Fuzz arbitrary operation sequences on FifoQueue
//
// Drives push_front / pop_back / remove / clear against a VecDeque model
// (front of the model = front of the queue) and validates the chain after
// every step.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut arena: SlotArena<Record> = SlotArena::new();
    let mut queue = FifoQueue::new();
    let mut model: VecDeque<SlotId> = VecDeque::new();

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 4;
        let value = data[idx + 1];
        idx += 2;

        match op {
            0 => {
                let id = arena.insert(Record {
                    _value: value,
                    links: FifoLinks::default(),
                });
                queue.push_front(&mut arena, id);
                model.push_front(id);

                assert_eq!(queue.front(), Some(id));
            }
            1 => {
                let popped = queue.pop_back(&mut arena);
                let expected = model.pop_back();
                assert_eq!(popped, expected);
                if let Some(id) = popped {
                    // Detached, not freed.
                    assert!(arena.contains(id));
                    arena.remove(id);
                }
            }
            2 => {
                if !model.is_empty() {
                    let pos = (value as usize) % model.len();
                    let id = model.remove(pos).unwrap();
                    queue.remove(&mut arena, id);
                    arena.remove(id);
                    assert!(!arena.contains(id));
                }
            }
            3 => {
                if value == 0 {
                    queue.clear();
                    for id in model.drain(..) {
                        arena.remove(id);
                    }
                }
            }
            _ => unreachable!(),
        }

        assert_eq!(queue.len(), model.len());
        assert_eq!(queue.front(), model.front().copied());
        assert_eq!(queue.back(), model.back().copied());
        #[cfg(debug_assertions)]
        queue.debug_validate_invariants(&arena);
    }
});

pub mod fifo_queue;
pub mod slot_arena;

pub use fifo_queue::{Chained, FifoLinks, FifoQueue};
pub use slot_arena::{SlotArena, SlotId};

pub use crate::ds::{Chained, FifoLinks, FifoQueue, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::policy::s3_fifo::S3FifoMetrics;
pub use crate::policy::s3_fifo::S3FifoCache;
pub use crate::traits::{CoreCache, MutableCache, ReadOnlyCache};

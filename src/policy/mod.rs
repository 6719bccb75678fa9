pub mod s3_fifo;

pub use s3_fifo::S3FifoCache;

pub mod client;
pub mod fs;
pub mod memory;

pub use client::{BlobError, BlobStore, blob_key, blob_key_for, strip_file_extension};
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;

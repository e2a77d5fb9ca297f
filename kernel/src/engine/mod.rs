//! Storage clients: genuinely-shippable implementations of the storage backend contract. Every
//! reader needs *some* working [`crate::storage::StorageClient`] out of the box; the columnar
//! decoder, by contrast, stays a pure contract because the `parquet` crate already implements
//! it end to end (see [`crate::checkpoint`]).

#[cfg(feature = "sync-engine")]
pub mod sync;

#[cfg(feature = "default-engine")]
pub mod default;

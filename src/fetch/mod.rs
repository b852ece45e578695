// src/fetch/mod.rs
pub mod cache;
pub mod client;
pub mod fetcher;

pub use cache::{MemoryCache, PageCache};
pub use client::{HttpTransport, Transport};
pub use fetcher::PageFetcher;

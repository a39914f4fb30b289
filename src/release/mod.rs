//! Release resolution layer
//!
//! This module turns a GitHub-style release feed into a single
//! `(version, asset URL)` pair: the newest non-excluded release that ships an
//! asset whose file name matches a pattern.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │   Fetcher   │────▶│    Cache    │
//! │  (network)  │     │  (policy)   │
//! └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌───────────────────────────────────┐
//! │             Selector              │
//! │ parse → filter → order → match    │
//! └───────────────────────────────────┘
//!        │            │           │
//!        ▼            ▼           ▼
//! ┌──────────┐ ┌───────────┐ ┌─────────┐
//! │  Filter  │ │  Version  │ │ Matcher │
//! │  (tags)  │ │ (ordering)│ │ (asset) │
//! └──────────┘ └───────────┘ └─────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: cache key derivation, freshness policy and the file-backed store
//! - [`error`]: error types for configuration, transport and decoding failures
//! - [`fetcher`]: trait for obtaining the raw release feed
//! - [`filter`]: tag exclusion patterns
//! - [`github`]: HTTP implementation of [`fetcher::FeedFetcher`]
//! - [`matcher`]: asset file name matching
//! - [`selector`]: orchestrates the above into a [`types::SelectionResult`]
//! - [`types`]: feed and result data types
//! - [`version`]: lenient/strict version parsing and ordering

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod github;
pub mod matcher;
pub mod selector;
pub mod types;
pub mod version;

//! SAME Registry - lookup tables for header field validation.
//!
//! Three small tables back C4's structural validation step:
//!
//! - [`org`] - the closed `ORG` originator set (`EAS`/`CIV`/`WXR`/`PEP`)
//! - [`event`] - the `EEE` event-code table, extensible at runtime
//! - [`location`] - `PSSCCC` location code parsing
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! same-registry = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod event;
pub mod location;
pub mod org;

pub use event::{EventCategory, EventCodeTable, EventDescriptor};
pub use location::{LocationCode, LocationCodeError};
pub use org::Organization;

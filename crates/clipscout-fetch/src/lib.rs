//! SSRF-safe media fetching.
//!
//! This crate is the single gate through which ClipScout touches a
//! user-supplied URL. Validation runs before any network I/O: scheme,
//! embedded credentials, host allow-list and the resolved address set
//! are all checked, and every redirect `Location` goes through the same
//! checks before it is followed.
//!
//! The fetcher is a general-purpose collaborator: any subsystem that
//! must retrieve a user-supplied media URL passes an explicit
//! [`FetchPolicy`] (allow-list + https requirement) and receives a
//! stream written to a caller-scoped file.

pub mod error;
pub mod fetch;
pub mod policy;
pub mod validate;

pub use error::{FetchError, FetchResult, ValidationError};
pub use fetch::{FetchedMedia, MediaFetcher};
pub use policy::FetchPolicy;
pub use validate::validate_media_url;

//! Content resolution for the ORGiD graph indexer.
//!
//! Turns a [`ContentId`](orgid_types::ContentId) into a stored profile:
//!
//! 1. [`ContentFetcher`] retrieves the raw document bytes. Backends:
//!    [`InMemoryContentFetcher`], [`DirectoryContentFetcher`] (a local mirror
//!    of pinned documents), and [`IpfsGatewayFetcher`] (HTTP gateway).
//! 2. [`extract_profile`] validates the document against the strict shape
//!    contract and builds the profile without touching the store.
//! 3. [`ContentResolver`] ties both together and persists the address and
//!    profile only once the whole document has been accepted.

pub mod error;
pub mod fetcher;
pub mod gateway;
pub mod profile;
pub mod resolver;

pub use error::{FetchError, FetchResult, ProfileError};
pub use fetcher::{ContentFetcher, DirectoryContentFetcher, InMemoryContentFetcher};
pub use gateway::{GatewayConfig, IpfsGatewayFetcher};
pub use profile::{extract_profile, Profile, ProfileDocument};
pub use resolver::{ContentResolver, ProfileResolution};

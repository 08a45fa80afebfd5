//! Container decoders.
//!
//! A decoder turns the bytes of a container into the ordered list of
//! [`Entry`](crate::types::Entry) descriptors it holds. Decoding happens once
//! per archive; everything after that works from the cached entry list.

pub mod traits;
pub mod zip;

pub use self::zip::ZipDecoder;
pub use traits::ContainerDecoder;

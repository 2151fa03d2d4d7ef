pub mod hash;
pub mod types;
pub mod validate;
pub mod wire;

pub use hash::{content_fingerprint, sha256_hex};
pub use types::*;
pub use wire::EntryForSummary;

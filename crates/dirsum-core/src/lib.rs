pub mod config;
pub mod logging;

pub mod checksum;
pub mod error;
pub mod root;
pub mod scan;

pub use checksum::{ChecksumEntry, Digest, Encoding};
pub use error::{ErrorKind, ScanError};
pub use scan::{checksum_tree, ScanOptions, Scanner};

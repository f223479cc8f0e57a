//! SHA-256 digests of files and their text renderings.
//!
//! Files are streamed through the hasher in fixed-size chunks so memory use
//! stays bounded regardless of file size.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// Default read buffer for streaming a file into the hasher.
pub const DEFAULT_BUF_SIZE: usize = 64 * 1024;

/// Text encoding used when rendering a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Lowercase hex, 64 characters.
    #[default]
    Hex,
    /// Standard base64 with padding, 44 characters.
    Base64,
}

/// A SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    pub fn encode(&self, encoding: Encoding) -> String {
        match encoding {
            Encoding::Hex => self.to_hex(),
            Encoding::Base64 => self.to_base64(),
        }
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Checksum of one file: its path as visited by the walk and its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    path: PathBuf,
    digest: Digest,
}

impl ChecksumEntry {
    pub fn new(path: PathBuf, digest: Digest) -> Self {
        Self { path, digest }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// `<digest> <path>`, one report line.
    pub fn render(&self, encoding: Encoding) -> String {
        format!("{} {}", self.digest.encode(encoding), self.path.display())
    }
}

impl fmt::Display for ChecksumEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.digest, self.path.display())
    }
}

/// Stream `reader` to EOF through SHA-256. Returns the digest and byte count.
/// Interrupted reads are retried; any other error discards the partial state.
pub fn hash_reader<R: Read>(mut reader: R, buf_size: usize) -> io::Result<(Digest, u64)> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; buf_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
        total += n as u64;
    }
    Ok((Digest(hasher.finalize().into()), total))
}

/// Open `path` and hash its contents. Open and read failures are reported
/// as distinct error kinds, both naming the path.
pub fn hash_file(path: &Path, buf_size: usize) -> Result<(Digest, u64), ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    hash_reader(file, buf_size).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Compute SHA-256 of a single file.
pub fn sha256_path(path: &Path) -> Result<Digest, ScanError> {
    hash_file(path, DEFAULT_BUF_SIZE).map(|(digest, _)| digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn sha256_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = sha256_path(f.path()).unwrap();
        assert_eq!(digest.to_hex(), EMPTY_SHA256);
        assert_eq!(
            digest.to_base64(),
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn sha256_path_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let digest = sha256_path(f.path()).unwrap();
        assert_eq!(
            digest.to_hex(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn tiny_buffer_matches_default() {
        let data: Vec<u8> = (0u8..=255).cycle().take(10_000).collect();
        let (small, n_small) = hash_reader(&data[..], 7).unwrap();
        let (big, n_big) = hash_reader(&data[..], DEFAULT_BUF_SIZE).unwrap();
        assert_eq!(small, big);
        assert_eq!(n_small, 10_000);
        assert_eq!(n_big, 10_000);
    }

    struct FailAfter {
        left: usize,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.left == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
            }
            let n = self.left.min(buf.len());
            buf[..n].fill(b'x');
            self.left -= n;
            Ok(n)
        }
    }

    #[test]
    fn read_error_mid_stream_yields_no_digest() {
        let err = hash_reader(FailAfter { left: 100 }, 16).unwrap_err();
        assert_eq!(err.to_string(), "device gone");
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");
        let err = sha256_path(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Open);
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn reading_a_directory_is_read_error() {
        // open(2) succeeds on a directory, read(2) fails with EISDIR.
        let dir = tempfile::tempdir().unwrap();
        let err = sha256_path(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Read);
    }

    #[test]
    fn render_uses_single_space() {
        let (digest, _) = hash_reader(&b"hi"[..], DEFAULT_BUF_SIZE).unwrap();
        let entry = ChecksumEntry::new(PathBuf::from("/r/a.txt"), digest);
        assert_eq!(
            entry.render(Encoding::Hex),
            "8f434346648f6b96df89dda901c5176b10a6d83961dd3c1ac88b59b2dc327aa4 /r/a.txt"
        );
        assert_eq!(
            entry.render(Encoding::Base64),
            "j0NDRmSPa5bfid2pAcUXaxCm2Dlh3TwayItZstwyeqQ= /r/a.txt"
        );
        assert_eq!(entry.to_string(), entry.render(Encoding::Hex));
    }
}

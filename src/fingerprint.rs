use ring::digest::{digest, SHA256};

/// Lowercase hex SHA-256 of `bytes`, the same digest the ledger stores as a
/// certificate's `fileHash`.
pub fn file_hash(bytes: &[u8]) -> String {
    hex::encode(digest(&SHA256, bytes))
}

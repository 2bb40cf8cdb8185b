//! Pak archive index handling: footer, index decryption, entry decoding.

mod crypto;
mod index;

pub use crypto::{decrypt_in_place, parse_key};
pub use index::{PakEntry, PakFooter, PakIndex, FOOTER_SIZE, PAK_MAGIC, PAK_VERSION};

#[cfg(test)]
pub(crate) use index::test_fixtures;

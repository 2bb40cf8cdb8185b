//! The downloader service: manifest acquisition, pak retrieval and
//! decryption, file extraction.

mod reader;
mod state;

pub use reader::PakService;
pub use state::{EncryptedPak, ServiceState};

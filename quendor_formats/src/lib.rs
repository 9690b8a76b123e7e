pub mod blorb;
pub mod error;
pub mod zcode;

pub use blorb::{Blorb, Chunk, ChunkTag, ResourceEntry, ResourceKey, locate_chunk};
pub use error::{FieldMismatch, FormatError, IdentityField, UnsupportedTarget};
pub use zcode::{ProgramFormat, TitleIdentity, ZcodeHeader, classify};

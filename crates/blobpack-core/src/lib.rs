//! Core library for packing images into an embeddable blob table.
//!
//! - Codec: byte-level RLE with a reserved escape byte (`2`), runs of 3..=255
//! - Packaging: optional alpha-only projection, escape-conflict resolution, and a fallback to
//!   the original encoded file whenever it is smaller than the RLE stream
//! - Table: records serialize to a C++ header (`std::map` initializer list) and parse back exactly
//!
//! Quick example:
//! ```ignore
//! use blobpack_core::{PackConfig, pack_images, serialize_table, source::load_input};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = PackConfig::default();
//! let inputs = vec![
//!   load_input("assets/a.png".as_ref(), "a.png".into(), cfg.target_size)?,
//!   load_input("assets/b.png".as_ref(), "b.png".into(), cfg.target_size)?,
//! ];
//! let out = pack_images(inputs, &cfg)?;
//! std::fs::write("image_data.h", serialize_table(&out.table))?;
//! println!("{}", out.stats.summary());
//! # Ok(()) }
//! ```

pub mod alpha;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod resolve;
pub mod rle;
pub mod source;
pub mod table;
pub mod verify;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use pipeline::*;
pub use table::*;

/// Convenience prelude for common types and functions.
/// Importing `blobpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::alpha::{expand_alpha, extract_alpha};
    pub use crate::config::{PackConfig, PackConfigBuilder, RecordOrder};
    pub use crate::model::{CompressedRecord, PackStats, Table};
    pub use crate::resolve::resolve_conflicts;
    pub use crate::rle::{compress, decompress};
    pub use crate::table::{deserialize_table, serialize_table};
    pub use crate::verify::{Reconstructed, reconstruct, verify_table};
    pub use crate::{
        InputImage, PackFailure, PackOutput, PackagedImage, pack_images, package_image,
    };
}

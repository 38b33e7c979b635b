pub mod config;
pub mod error;
pub mod loader;
pub mod sections;
pub mod store;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use types::{Chunk, ChunkFlag, Document, Meta, SectionLabel, SectionMarker, Separator, StrategyKind};

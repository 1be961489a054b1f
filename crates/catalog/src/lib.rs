//! Historical map catalog: digital libraries, maps, coordinates and metadata,
//! plus the sources the globe reads map records from.

pub mod config;
pub mod error;
pub mod model;
pub mod source;
pub mod store;

pub use config::SourceConfig;
pub use error::CatalogError;
pub use model::{
    Coordinate, CoordinateId, CoordinateInfo, CoordinateMapEntry, CoordinateMaps, DigitalLibrary,
    LibraryId, LibraryImage, MapId, MapInformation, MapMetadata, MapRecord, MapRow, MetadataId,
    MetadataOutcome,
};
pub use source::{BoxFuture, HttpMapSource, MapSource, SourceError, StoreMapSource};
pub use store::{CatalogSnapshot, CatalogStore, SyncReport};

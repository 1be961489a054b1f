use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Digital library (municipality) primary key.
    LibraryId
);
id_type!(MapId);
id_type!(CoordinateId);
id_type!(MetadataId);

/// A digital library: the owner of one folder of map images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalLibrary {
    pub id: LibraryId,
    pub name: String,
    #[serde(rename = "mapsNumber")]
    pub maps_number: u32,
    #[serde(rename = "markerColor")]
    pub marker_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRow {
    pub id: MapId,
    pub title: String,
    pub file_name: String,
    #[serde(rename = "m_id", default)]
    pub library_id: Option<LibraryId>,
    #[serde(default)]
    pub coord_id: Option<CoordinateId>,
    #[serde(default)]
    pub historical_period: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub id: CoordinateId,
    #[serde(default)]
    pub place_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Per-map descriptive metadata. At most one row per map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    pub id: MetadataId,
    pub map_id: MapId,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// A map as delivered to the globe client: the row plus its embedded
/// coordinate, if any.
///
/// The backend names the embedded object `Coordinate`; both spellings are
/// accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: MapId,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub coord_id: Option<CoordinateId>,
    #[serde(alias = "Coordinate", default)]
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryName {
    pub name: String,
}

/// One map in a per-coordinate listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapEntry {
    pub id: MapId,
    pub title: String,
    pub location: Option<String>,
    pub historical_period: Option<String>,
    pub creator: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub file_name: String,
    #[serde(rename = "Digital_Library")]
    pub library: Option<LibraryName>,
    #[serde(rename = "Coordinate")]
    pub coordinate: Option<Coordinate>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMaps {
    pub coordinate_id: CoordinateId,
    pub total_maps: usize,
    pub maps: Vec<CoordinateMapEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateInfo {
    pub coordinate: Coordinate,
    pub map_count: usize,
}

/// Static image reference for one map of a library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryImage {
    pub map_id: MapId,
    pub title: String,
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataOutcome {
    Added(MapMetadata),
    Updated(MapMetadata),
}

impl MetadataOutcome {
    pub fn metadata(&self) -> &MapMetadata {
        match self {
            MetadataOutcome::Added(m) | MetadataOutcome::Updated(m) => m,
        }
    }
}

/// Descriptive fields editable on a map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapInformation {
    pub historical_period: Option<String>,
    pub creator: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location: Option<String>,
}

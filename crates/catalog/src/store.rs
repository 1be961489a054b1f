use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::model::{
    Coordinate, CoordinateId, CoordinateInfo, CoordinateMapEntry, CoordinateMaps, DigitalLibrary,
    LibraryId, LibraryImage, LibraryName, MapId, MapInformation, MapMetadata, MapRecord, MapRow,
    MetadataId, MetadataOutcome,
};

/// Marker colour given to libraries discovered on disk.
pub const DEFAULT_MARKER_COLOR: &str = "#000000";

/// Serializable form of the whole catalog. Tables are stored as id-ordered
/// lists.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub libraries: Vec<DigitalLibrary>,
    #[serde(default)]
    pub maps: Vec<MapRow>,
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
    #[serde(default)]
    pub metadata: Vec<MapMetadata>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub libraries_created: Vec<String>,
    pub maps_added: Vec<String>,
}

/// In-memory relational catalog: digital libraries, maps, coordinates and
/// map metadata, joined by foreign keys.
///
/// Every operation touches a single entity (plus foreign-key lookups).
/// Ids are assigned by per-table auto-increment starting at 1.
#[derive(Debug, Default, Clone)]
pub struct CatalogStore {
    libraries: BTreeMap<LibraryId, DigitalLibrary>,
    maps: BTreeMap<MapId, MapRow>,
    coordinates: BTreeMap<CoordinateId, Coordinate>,
    metadata: BTreeMap<MetadataId, MapMetadata>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self, CatalogError> {
        let mut store = Self::new();
        for lib in snapshot.libraries {
            if store.libraries.insert(lib.id, lib.clone()).is_some() {
                return Err(CatalogError::Corrupt(format!("duplicate library id {}", lib.id)));
            }
        }
        for coord in snapshot.coordinates {
            if store.coordinates.insert(coord.id, coord.clone()).is_some() {
                return Err(CatalogError::Corrupt(format!(
                    "duplicate coordinate id {}",
                    coord.id
                )));
            }
        }
        for map in snapshot.maps {
            if let Some(lib) = map.library_id {
                if !store.libraries.contains_key(&lib) {
                    return Err(CatalogError::Corrupt(format!(
                        "map {} references missing library {lib}",
                        map.id
                    )));
                }
            }
            if let Some(coord) = map.coord_id {
                if !store.coordinates.contains_key(&coord) {
                    return Err(CatalogError::Corrupt(format!(
                        "map {} references missing coordinate {coord}",
                        map.id
                    )));
                }
            }
            if store.maps.insert(map.id, map.clone()).is_some() {
                return Err(CatalogError::Corrupt(format!("duplicate map id {}", map.id)));
            }
        }
        let mut seen_maps = BTreeSet::new();
        for meta in snapshot.metadata {
            if !store.maps.contains_key(&meta.map_id) || !seen_maps.insert(meta.map_id) {
                return Err(CatalogError::Corrupt(format!(
                    "metadata {} has a missing or duplicate map {}",
                    meta.id, meta.map_id
                )));
            }
            store.metadata.insert(meta.id, meta);
        }
        let highest = [
            ("library", store.libraries.keys().next_back().map(|k| k.0)),
            ("map", store.maps.keys().next_back().map(|k| k.0)),
            ("coordinate", store.coordinates.keys().next_back().map(|k| k.0)),
            ("metadata", store.metadata.keys().next_back().map(|k| k.0)),
        ];
        for (table, max) in highest {
            if max == Some(u32::MAX) {
                return Err(CatalogError::Corrupt(format!(
                    "{table} id {} leaves no room for new rows",
                    u32::MAX
                )));
            }
        }
        Ok(store)
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            libraries: self.libraries.values().cloned().collect(),
            maps: self.maps.values().cloned().collect(),
            coordinates: self.coordinates.values().cloned().collect(),
            metadata: self.metadata.values().cloned().collect(),
        }
    }

    /// Load a JSON snapshot. A missing file yields an empty catalog.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no catalog snapshot at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(CatalogError::Io(format!("read {}: {e}", path.display()))),
        };
        let snapshot = serde_json::from_str::<CatalogSnapshot>(&raw)
            .map_err(|e| CatalogError::Corrupt(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let raw = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| CatalogError::Io(e.to_string()))?;
        fs::write(path, raw).map_err(|e| CatalogError::Io(format!("write {}: {e}", path.display())))
    }

    // ------------------------------------------------------------------
    // Inserts
    // ------------------------------------------------------------------

    pub fn insert_library(
        &mut self,
        name: impl Into<String>,
        marker_color: impl Into<String>,
    ) -> Result<LibraryId, CatalogError> {
        let id = LibraryId(next_id("library", self.libraries.keys().map(|k| k.0))?);
        self.libraries.insert(
            id,
            DigitalLibrary {
                id,
                name: name.into(),
                maps_number: 0,
                marker_color: marker_color.into(),
            },
        );
        Ok(id)
    }

    pub fn insert_map(
        &mut self,
        title: impl Into<String>,
        file_name: impl Into<String>,
        library_id: Option<LibraryId>,
    ) -> Result<MapId, CatalogError> {
        if let Some(lib) = library_id {
            self.library(lib)?;
        }
        let id = MapId(next_id("map", self.maps.keys().map(|k| k.0))?);
        self.maps.insert(
            id,
            MapRow {
                id,
                title: title.into(),
                file_name: file_name.into(),
                library_id,
                coord_id: None,
                historical_period: None,
                creator: None,
                kind: None,
                location: None,
            },
        );
        Ok(id)
    }

    pub fn insert_coordinate(
        &mut self,
        place_name: Option<String>,
        geo: GeoPoint,
    ) -> Result<Coordinate, CatalogError> {
        let id = CoordinateId(next_id("coordinate", self.coordinates.keys().map(|k| k.0))?);
        let coordinate = Coordinate {
            id,
            place_name,
            latitude: geo.latitude(),
            longitude: geo.longitude(),
        };
        self.coordinates.insert(id, coordinate.clone());
        Ok(coordinate)
    }

    /// Remove a map together with its metadata row.
    pub fn delete_map(&mut self, map_id: MapId) -> Result<MapRow, CatalogError> {
        let map = self
            .maps
            .remove(&map_id)
            .ok_or_else(|| CatalogError::not_found("map"))?;
        self.metadata.retain(|_, m| m.map_id != map_id);
        Ok(map)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn libraries(&self) -> Vec<DigitalLibrary> {
        self.libraries.values().cloned().collect()
    }

    pub fn maps(&self) -> Vec<MapRow> {
        self.maps.values().cloned().collect()
    }

    pub fn library(&self, id: LibraryId) -> Result<&DigitalLibrary, CatalogError> {
        self.libraries
            .get(&id)
            .ok_or_else(|| CatalogError::not_found("digital library"))
    }

    pub fn map(&self, id: MapId) -> Result<&MapRow, CatalogError> {
        self.maps.get(&id).ok_or_else(|| CatalogError::not_found("map"))
    }

    pub fn coordinate(&self, id: CoordinateId) -> Result<&Coordinate, CatalogError> {
        self.coordinates
            .get(&id)
            .ok_or_else(|| CatalogError::not_found("coordinate"))
    }

    pub fn metadata_for(&self, map_id: MapId) -> Option<&MapMetadata> {
        self.metadata.values().find(|m| m.map_id == map_id)
    }

    /// All maps of a library with their embedded coordinate.
    pub fn maps_for_library(&self, library_id: LibraryId) -> Result<Vec<MapRecord>, CatalogError> {
        let records: Vec<MapRecord> = self
            .maps
            .values()
            .filter(|m| m.library_id == Some(library_id))
            .map(|m| self.record_for(m))
            .collect();
        if records.is_empty() {
            return Err(CatalogError::not_found("map"));
        }
        Ok(records)
    }

    pub fn map_coordinates(&self, map_id: MapId) -> Result<&Coordinate, CatalogError> {
        let map = self.map(map_id)?;
        map.coord_id
            .and_then(|id| self.coordinates.get(&id))
            .ok_or_else(|| CatalogError::not_found("coordinate for this map"))
    }

    pub fn count_maps_for_coordinate(&self, coord_id: CoordinateId) -> usize {
        self.maps
            .values()
            .filter(|m| m.coord_id == Some(coord_id))
            .count()
    }

    /// Maps placed at `coord_id`, sorted by title.
    ///
    /// `base_url` prefixes the image URL, which is only present for maps that
    /// belong to a library (the image lives in the library folder).
    pub fn maps_for_coordinate(
        &self,
        coord_id: CoordinateId,
        base_url: &str,
    ) -> Result<CoordinateMaps, CatalogError> {
        let mut maps: Vec<CoordinateMapEntry> = self
            .maps
            .values()
            .filter(|m| m.coord_id == Some(coord_id))
            .map(|m| {
                let library = m
                    .library_id
                    .and_then(|id| self.libraries.get(&id))
                    .map(|l| LibraryName {
                        name: l.name.clone(),
                    });
                let image_url = library
                    .as_ref()
                    .map(|_| format!("{}/api/maps/{}/image", base_url.trim_end_matches('/'), m.id));
                CoordinateMapEntry {
                    id: m.id,
                    title: m.title.clone(),
                    location: m.location.clone(),
                    historical_period: m.historical_period.clone(),
                    creator: m.creator.clone(),
                    kind: m.kind.clone(),
                    file_name: m.file_name.clone(),
                    library,
                    coordinate: self.coordinates.get(&coord_id).cloned(),
                    image_url,
                }
            })
            .collect();
        if maps.is_empty() {
            return Err(CatalogError::not_found("map for this coordinate"));
        }
        maps.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(CoordinateMaps {
            coordinate_id: coord_id,
            total_maps: maps.len(),
            maps,
        })
    }

    pub fn coordinate_info(&self, coord_id: CoordinateId) -> Result<CoordinateInfo, CatalogError> {
        let coordinate = self.coordinate(coord_id)?.clone();
        Ok(CoordinateInfo {
            coordinate,
            map_count: self.count_maps_for_coordinate(coord_id),
        })
    }

    /// On-disk location of a map image: `<maps_dir>/<library name>/<file_name>`.
    pub fn image_path(&self, map_id: MapId, maps_dir: &Path) -> Result<PathBuf, CatalogError> {
        let map = self.map(map_id)?;
        let library = map
            .library_id
            .and_then(|id| self.libraries.get(&id))
            .ok_or_else(|| CatalogError::not_found("digital library for this map"))?;
        Ok(maps_dir.join(&library.name).join(&map.file_name))
    }

    pub fn library_images(&self, library_id: LibraryId) -> Result<Vec<LibraryImage>, CatalogError> {
        let library = self.library(library_id)?;
        let images: Vec<LibraryImage> = self
            .maps
            .values()
            .filter(|m| m.library_id == Some(library_id))
            .map(|m| LibraryImage {
                map_id: m.id,
                title: m.title.clone(),
                file_name: m.file_name.clone(),
                url: format!("/maps_static/{}/{}", library.name, m.file_name),
            })
            .collect();
        if images.is_empty() {
            return Err(CatalogError::not_found("image for this library"));
        }
        Ok(images)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Create a new coordinate and point the map at it.
    pub fn set_coordinates(
        &mut self,
        map_id: MapId,
        place_name: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<(MapRow, Coordinate), CatalogError> {
        let (Some(place_name), Some(latitude), Some(longitude)) = (place_name, latitude, longitude)
        else {
            return Err(CatalogError::InvalidInput(
                "place_name, latitude and longitude are required".to_string(),
            ));
        };
        let geo = GeoPoint::new(latitude, longitude)
            .map_err(|e| CatalogError::InvalidInput(e.to_string()))?;
        self.map(map_id)?;

        let coordinate = self.insert_coordinate(Some(place_name), geo)?;
        let map = self
            .maps
            .get_mut(&map_id)
            .ok_or_else(|| CatalogError::not_found("map"))?;
        map.coord_id = Some(coordinate.id);
        info!(map = %map_id, coordinate = %coordinate.id, "created coordinate for map");
        Ok((map.clone(), coordinate))
    }

    /// Point the map at an existing coordinate.
    pub fn assign_coordinates(
        &mut self,
        map_id: MapId,
        coord_id: Option<CoordinateId>,
    ) -> Result<MapRow, CatalogError> {
        let coord_id = match coord_id {
            Some(id) if id.0 != 0 => id,
            _ => return Err(CatalogError::InvalidInput("coord_id is required".to_string())),
        };
        self.coordinate(coord_id)?;
        let map = self
            .maps
            .get_mut(&map_id)
            .ok_or_else(|| CatalogError::not_found("map"))?;
        map.coord_id = Some(coord_id);
        Ok(map.clone())
    }

    /// Insert or update the metadata row of a map.
    ///
    /// Only `creator` and `location` are written; an update overwrites both,
    /// including with `None`.
    pub fn upsert_metadata(
        &mut self,
        map_id: MapId,
        creator: Option<String>,
        location: Option<String>,
    ) -> Result<MetadataOutcome, CatalogError> {
        self.map(map_id)?;
        if let Some(existing) = self.metadata.values_mut().find(|m| m.map_id == map_id) {
            existing.creator = creator;
            existing.location = location;
            return Ok(MetadataOutcome::Updated(existing.clone()));
        }
        let id = MetadataId(next_id("metadata", self.metadata.keys().map(|k| k.0))?);
        let metadata = MapMetadata {
            id,
            map_id,
            creator,
            kind: None,
            location,
            latitude: None,
            longitude: None,
        };
        self.metadata.insert(id, metadata.clone());
        Ok(MetadataOutcome::Added(metadata))
    }

    pub fn update_information(
        &mut self,
        map_id: MapId,
        info: MapInformation,
    ) -> Result<MapRow, CatalogError> {
        let map = self
            .maps
            .get_mut(&map_id)
            .ok_or_else(|| CatalogError::not_found("map"))?;
        map.historical_period = info.historical_period;
        map.creator = info.creator;
        map.kind = info.kind;
        map.location = info.location;
        Ok(map.clone())
    }

    /// Mirror a maps directory into the catalog.
    ///
    /// Each sub-directory is a digital library; each file inside it that is
    /// not yet known by file name becomes a map titled by its file stem.
    /// Existing rows are never modified or removed.
    pub fn sync_directory(&mut self, maps_dir: &Path) -> Result<SyncReport, CatalogError> {
        let mut report = SyncReport::default();
        let mut folders = list_entries(maps_dir, true)?;
        folders.sort();

        for folder in folders {
            let library_id = match self.libraries.values().find(|l| l.name == folder) {
                Some(lib) => lib.id,
                None => {
                    let id = self.insert_library(folder.clone(), DEFAULT_MARKER_COLOR)?;
                    info!("created digital library {folder}");
                    report.libraries_created.push(folder.clone());
                    id
                }
            };

            let mut files = list_entries(&maps_dir.join(&folder), false)?;
            files.sort();
            let known: BTreeSet<String> =
                self.maps.values().map(|m| m.file_name.clone()).collect();

            for file in files {
                if known.contains(&file) {
                    continue;
                }
                let title = Path::new(&file)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(&file)
                    .to_string();
                self.insert_map(title, file.clone(), Some(library_id))?;
                info!("added map {file} to library {folder}");
                report.maps_added.push(file);
            }
        }
        Ok(report)
    }

    fn record_for(&self, map: &MapRow) -> MapRecord {
        MapRecord {
            id: map.id,
            title: map.title.clone(),
            location: map.location.clone(),
            coord_id: map.coord_id,
            coordinate: map.coord_id.and_then(|id| self.coordinates.get(&id)).cloned(),
        }
    }
}

fn next_id(table: &str, existing: impl Iterator<Item = u32>) -> Result<u32, CatalogError> {
    match existing.max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| CatalogError::Corrupt(format!("{table} ids exhausted"))),
    }
}

fn list_entries(dir: &Path, dirs: bool) -> Result<Vec<String>, CatalogError> {
    let entries =
        fs::read_dir(dir).map_err(|e| CatalogError::Io(format!("read {}: {e}", dir.display())))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CatalogError::Io(e.to_string()))?;
        let file_type = entry
            .file_type()
            .map_err(|e| CatalogError::Io(e.to_string()))?;
        if file_type.is_dir() != dirs {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::{CatalogSnapshot, CatalogStore, DEFAULT_MARKER_COLOR, next_id};
    use crate::error::CatalogError;
    use crate::model::{CoordinateId, LibraryId, MapId, MapInformation, MetadataOutcome};
    use foundation::math::GeoPoint;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn seeded() -> (CatalogStore, LibraryId, MapId, MapId) {
        let mut store = CatalogStore::new();
        let lib = store.insert_library("Palermo", "#8b1f0c").unwrap();
        let a = store.insert_map("Pianta di Palermo", "pianta.jpg", Some(lib)).unwrap();
        let b = store.insert_map("Carta nautica", "nautica.jpg", Some(lib)).unwrap();
        (store, lib, a, b)
    }

    #[test]
    fn ids_auto_increment_from_one() {
        let (store, lib, a, b) = seeded();
        assert_eq!(lib, LibraryId(1));
        assert_eq!((a, b), (MapId(1), MapId(2)));
        assert_eq!(store.maps().len(), 2);
    }

    #[test]
    fn set_coordinates_requires_all_fields() {
        let (mut store, _, a, _) = seeded();
        let err = store
            .set_coordinates(a, Some("Palermo".into()), Some(38.1), None)
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }

    #[test]
    fn set_coordinates_rejects_out_of_range_latitude() {
        let (mut store, _, a, _) = seeded();
        let err = store
            .set_coordinates(a, Some("Nowhere".into()), Some(123.0), Some(0.0))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }

    #[test]
    fn set_coordinates_creates_and_assigns() {
        let (mut store, lib, a, _) = seeded();
        let (map, coord) = store
            .set_coordinates(a, Some("Palermo".into()), Some(38.1157), Some(13.3615))
            .unwrap();
        assert_eq!(map.coord_id, Some(coord.id));
        assert_eq!(store.map_coordinates(a).unwrap(), &coord);

        let records = store.maps_for_library(lib).unwrap();
        let with_coord: Vec<_> = records.iter().filter(|r| r.coordinate.is_some()).collect();
        assert_eq!(with_coord.len(), 1);
        assert_eq!(with_coord[0].id, a);
    }

    #[test]
    fn set_coordinates_unknown_map_is_not_found() {
        let (mut store, _, _, _) = seeded();
        let err = store
            .set_coordinates(MapId(99), Some("x".into()), Some(1.0), Some(1.0))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn assign_coordinates_validates_in_order() {
        let (mut store, _, a, b) = seeded();
        assert!(matches!(
            store.assign_coordinates(a, None),
            Err(CatalogError::InvalidInput(_))
        ));
        assert!(matches!(
            store.assign_coordinates(a, Some(CoordinateId(0))),
            Err(CatalogError::InvalidInput(_))
        ));
        assert_eq!(
            store.assign_coordinates(a, Some(CoordinateId(5))),
            Err(CatalogError::not_found("coordinate"))
        );

        let coord = store.insert_coordinate(None, GeoPoint::new(38.1, 13.3).unwrap()).unwrap();
        assert_eq!(
            store.assign_coordinates(MapId(42), Some(coord.id)),
            Err(CatalogError::not_found("map"))
        );
        store.assign_coordinates(a, Some(coord.id)).unwrap();
        store.assign_coordinates(b, Some(coord.id)).unwrap();
        assert_eq!(store.count_maps_for_coordinate(coord.id), 2);
        assert_eq!(store.count_maps_for_coordinate(CoordinateId(77)), 0);
    }

    #[test]
    fn maps_for_coordinate_sorted_by_title_with_image_url() {
        let (mut store, _, a, b) = seeded();
        let coord = store
            .insert_coordinate(Some("Palermo".into()), GeoPoint::new(38.1, 13.3).unwrap())
            .unwrap();
        store.assign_coordinates(a, Some(coord.id)).unwrap();
        store.assign_coordinates(b, Some(coord.id)).unwrap();
        let orphan = store.insert_map("Abbozzo", "abbozzo.jpg", None).unwrap();
        store.assign_coordinates(orphan, Some(coord.id)).unwrap();

        let listing = store
            .maps_for_coordinate(coord.id, "http://localhost:3000/")
            .unwrap();
        assert_eq!(listing.total_maps, 3);
        let titles: Vec<&str> = listing.maps.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Abbozzo", "Carta nautica", "Pianta di Palermo"]);
        assert_eq!(listing.maps[0].image_url, None);
        assert_eq!(
            listing.maps[1].image_url.as_deref(),
            Some("http://localhost:3000/api/maps/2/image")
        );
        assert_eq!(listing.maps[1].library.as_ref().map(|l| l.name.as_str()), Some("Palermo"));

        assert!(store.maps_for_coordinate(CoordinateId(99), "").unwrap_err().is_not_found());
    }

    #[test]
    fn coordinate_info_counts_maps() {
        let (mut store, _, a, _) = seeded();
        let (_, coord) = store
            .set_coordinates(a, Some("Palermo".into()), Some(38.1), Some(13.3))
            .unwrap();
        let info = store.coordinate_info(coord.id).unwrap();
        assert_eq!(info.map_count, 1);
        assert!(store.coordinate_info(CoordinateId(9)).unwrap_err().is_not_found());
    }

    #[test]
    fn map_without_coordinate_is_not_found() {
        let (store, _, a, _) = seeded();
        assert!(store.map_coordinates(a).unwrap_err().is_not_found());
        assert!(store.map_coordinates(MapId(50)).unwrap_err().is_not_found());
    }

    #[test]
    fn metadata_upsert_adds_then_updates() {
        let (mut store, _, a, _) = seeded();
        let first = store
            .upsert_metadata(a, Some("Anonimo".into()), Some("Sicilia".into()))
            .unwrap();
        assert!(matches!(first, MetadataOutcome::Added(_)));
        let second = store.upsert_metadata(a, Some("Coronelli".into()), None).unwrap();
        let MetadataOutcome::Updated(meta) = second else {
            panic!("expected update");
        };
        assert_eq!(meta.id, first.metadata().id);
        assert_eq!(meta.creator.as_deref(), Some("Coronelli"));
        assert_eq!(meta.location, None);
    }

    #[test]
    fn deleting_a_map_drops_its_metadata() {
        let (mut store, _, a, _) = seeded();
        store.upsert_metadata(a, Some("Anonimo".into()), None).unwrap();
        store.delete_map(a).unwrap();
        assert!(store.metadata_for(a).is_none());
        assert!(store.snapshot().metadata.is_empty());
    }

    #[test]
    fn update_information_overwrites_fields() {
        let (mut store, _, a, _) = seeded();
        let map = store
            .update_information(
                a,
                MapInformation {
                    historical_period: Some("XVIII secolo".into()),
                    creator: Some("Anonimo".into()),
                    kind: Some("pianta".into()),
                    location: Some("Palermo".into()),
                },
            )
            .unwrap();
        assert_eq!(map.historical_period.as_deref(), Some("XVIII secolo"));
        assert!(store
            .update_information(MapId(9), MapInformation::default())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn image_path_uses_library_folder() {
        let (mut store, lib, a, _) = seeded();
        let path = store.image_path(a, Path::new("/srv/maps")).unwrap();
        assert_eq!(path, Path::new("/srv/maps/Palermo/pianta.jpg"));

        let orphan = store.insert_map("Orfana", "orfana.jpg", None).unwrap();
        assert!(store.image_path(orphan, Path::new("/srv/maps")).unwrap_err().is_not_found());

        let images = store.library_images(lib).unwrap();
        assert_eq!(images[0].url, "/maps_static/Palermo/pianta.jpg");
    }

    #[test]
    fn library_images_require_maps() {
        let mut store = CatalogStore::new();
        let empty = store.insert_library("Vuota", DEFAULT_MARKER_COLOR).unwrap();
        assert!(store.library_images(empty).unwrap_err().is_not_found());
        assert!(store.library_images(LibraryId(8)).unwrap_err().is_not_found());
        assert!(store.maps_for_library(empty).unwrap_err().is_not_found());
    }

    #[test]
    fn snapshot_round_trips_and_rejects_dangling_keys() {
        let (mut store, _, a, _) = seeded();
        store
            .set_coordinates(a, Some("Palermo".into()), Some(38.1), Some(13.3))
            .unwrap();
        let snapshot = store.snapshot();
        let reloaded = CatalogStore::from_snapshot(snapshot.clone()).unwrap();
        assert_eq!(reloaded.snapshot(), snapshot);

        let mut broken: CatalogSnapshot = snapshot;
        broken.coordinates.clear();
        assert!(matches!(
            CatalogStore::from_snapshot(broken),
            Err(CatalogError::Corrupt(_))
        ));
    }

    #[test]
    fn snapshot_with_the_largest_id_is_rejected() {
        let (store, lib, _, _) = seeded();
        let mut snapshot = store.snapshot();
        snapshot.libraries[0].id = LibraryId(u32::MAX);
        for map in &mut snapshot.maps {
            map.library_id = Some(LibraryId(u32::MAX));
        }
        assert!(matches!(
            CatalogStore::from_snapshot(snapshot),
            Err(CatalogError::Corrupt(_))
        ));

        let mut near_limit = store.snapshot();
        near_limit.libraries[0].id = LibraryId(u32::MAX - 1);
        for map in &mut near_limit.maps {
            map.library_id = Some(LibraryId(u32::MAX - 1));
        }
        let mut reloaded = CatalogStore::from_snapshot(near_limit).unwrap();
        assert!(reloaded.library(lib).is_err());
        assert_eq!(
            reloaded.insert_library("Catania", DEFAULT_MARKER_COLOR).unwrap(),
            LibraryId(u32::MAX)
        );
        assert!(matches!(
            reloaded.insert_library("Messina", DEFAULT_MARKER_COLOR),
            Err(CatalogError::Corrupt(_))
        ));
    }

    #[test]
    fn id_allocation_stops_at_the_top_of_the_range() {
        assert_eq!(next_id("map", std::iter::empty()).unwrap(), 1);
        assert_eq!(next_id("map", [3, 9, 4].into_iter()).unwrap(), 10);
        assert!(next_id("map", [u32::MAX].into_iter()).is_err());
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        assert!(CatalogStore::load(&path).unwrap().maps().is_empty());

        let (store, _, _, _) = seeded();
        store.save(&path).unwrap();
        let loaded = CatalogStore::load(&path).unwrap();
        assert_eq!(loaded.snapshot(), store.snapshot());
    }

    #[test]
    fn sync_directory_creates_libraries_and_new_maps_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("Catania")).unwrap();
        std::fs::create_dir_all(root.join("Palermo")).unwrap();
        std::fs::write(root.join("Catania/etna.png"), b"png").unwrap();
        std::fs::write(root.join("Palermo/pianta.jpg"), b"jpg").unwrap();
        std::fs::write(root.join("Palermo/porto.jpg"), b"jpg").unwrap();
        std::fs::write(root.join("stray.txt"), b"ignored").unwrap();

        let (mut store, _, _, _) = seeded();
        let report = store.sync_directory(root).unwrap();
        assert_eq!(report.libraries_created, vec!["Catania".to_string()]);
        assert_eq!(
            report.maps_added,
            vec!["etna.png".to_string(), "porto.jpg".to_string()]
        );

        let catania = store
            .libraries()
            .into_iter()
            .find(|l| l.name == "Catania")
            .unwrap();
        assert_eq!(catania.marker_color, DEFAULT_MARKER_COLOR);
        assert_eq!(catania.maps_number, 0);
        let etna = store.maps().into_iter().find(|m| m.file_name == "etna.png").unwrap();
        assert_eq!(etna.title, "etna");
        assert_eq!(etna.library_id, Some(catania.id));

        let again = store.sync_directory(root).unwrap();
        assert!(again.libraries_created.is_empty());
        assert!(again.maps_added.is_empty());
    }
}

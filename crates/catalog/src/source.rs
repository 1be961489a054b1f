//! Map record sources for the globe.
//!
//! A `MapSource` hands the globe the map records of one digital library, the
//! number of maps placed at a coordinate, and raw image bytes for a map.
//! Two implementations exist:
//! - `HttpMapSource` talks to a running backend over HTTP
//! - `StoreMapSource` answers from a shared in-memory `CatalogStore`

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use tracing::debug;

use crate::error::CatalogError;
use crate::model::{CoordinateId, LibraryId, MapId, MapRecord};
use crate::store::CatalogStore;

/// Error type for map source operations.
#[derive(Debug)]
pub struct SourceError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for map record providers.
///
/// Methods return boxed futures so the trait stays dyn-compatible.
pub trait MapSource: Send + Sync {
    /// All maps of a digital library, each with its coordinate if placed.
    fn fetch_records(
        &self,
        library: LibraryId,
    ) -> BoxFuture<'_, Result<Vec<MapRecord>, SourceError>>;

    /// Number of maps placed at a coordinate.
    fn coordinate_map_count(&self, coord: CoordinateId) -> BoxFuture<'_, Result<usize, SourceError>>;

    /// Image bytes of a map.
    ///
    /// Returns `Ok(None)` when the map or its image does not exist.
    fn map_image(&self, map: MapId) -> BoxFuture<'_, Result<Option<Vec<u8>>, SourceError>>;
}

#[derive(Debug, Deserialize)]
struct CountBody {
    count: usize,
}

/// Backend-over-HTTP source.
pub struct HttpMapSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMapSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn records_url(&self, library: LibraryId) -> String {
        format!("{}/api/maps/{library}", self.base_url)
    }

    fn count_url(&self, coord: CoordinateId) -> String {
        format!("{}/api/coordinates/{coord}/maps/count", self.base_url)
    }

    fn image_url(&self, map: MapId) -> String {
        format!("{}/api/maps/{map}/image", self.base_url)
    }

    async fn get_checked(&self, url: &str) -> Result<reqwest::Response, SourceError> {
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::with_source("HTTP request failed", e))?;
        if !resp.status().is_success() {
            return Err(SourceError::new(format!("HTTP error: {}", resp.status())));
        }
        Ok(resp)
    }
}

impl MapSource for HttpMapSource {
    fn fetch_records(
        &self,
        library: LibraryId,
    ) -> BoxFuture<'_, Result<Vec<MapRecord>, SourceError>> {
        let url = self.records_url(library);
        Box::pin(async move {
            let resp = self.get_checked(&url).await?;
            resp.json::<Vec<MapRecord>>()
                .await
                .map_err(|e| SourceError::with_source("Failed to decode map records", e))
        })
    }

    fn coordinate_map_count(&self, coord: CoordinateId) -> BoxFuture<'_, Result<usize, SourceError>> {
        let url = self.count_url(coord);
        Box::pin(async move {
            let resp = self.get_checked(&url).await?;
            let body = resp
                .json::<CountBody>()
                .await
                .map_err(|e| SourceError::with_source("Failed to decode map count", e))?;
            Ok(body.count)
        })
    }

    fn map_image(&self, map: MapId) -> BoxFuture<'_, Result<Option<Vec<u8>>, SourceError>> {
        let url = self.image_url(map);
        Box::pin(async move {
            let resp = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| SourceError::with_source("HTTP request failed", e))?;

            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !resp.status().is_success() {
                return Err(SourceError::new(format!("HTTP error: {}", resp.status())));
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| SourceError::with_source("Failed to read response", e))?;
            Ok(Some(bytes.to_vec()))
        })
    }
}

/// Source backed by a shared catalog store.
///
/// Images are read from `<maps_dir>/<library>/<file>`; without a maps
/// directory every image lookup misses.
#[derive(Clone)]
pub struct StoreMapSource {
    store: Arc<RwLock<CatalogStore>>,
    maps_dir: Option<PathBuf>,
}

impl StoreMapSource {
    pub fn new(store: Arc<RwLock<CatalogStore>>) -> Self {
        Self {
            store,
            maps_dir: None,
        }
    }

    pub fn with_maps_dir(mut self, maps_dir: impl Into<PathBuf>) -> Self {
        self.maps_dir = Some(maps_dir.into());
        self
    }

    pub fn store(&self) -> &Arc<RwLock<CatalogStore>> {
        &self.store
    }
}

impl MapSource for StoreMapSource {
    fn fetch_records(
        &self,
        library: LibraryId,
    ) -> BoxFuture<'_, Result<Vec<MapRecord>, SourceError>> {
        Box::pin(async move {
            self.store
                .read()
                .maps_for_library(library)
                .map_err(|e| SourceError::with_source("Failed to list maps", e))
        })
    }

    fn coordinate_map_count(&self, coord: CoordinateId) -> BoxFuture<'_, Result<usize, SourceError>> {
        Box::pin(async move { Ok(self.store.read().count_maps_for_coordinate(coord)) })
    }

    fn map_image(&self, map: MapId) -> BoxFuture<'_, Result<Option<Vec<u8>>, SourceError>> {
        Box::pin(async move {
            let Some(maps_dir) = self.maps_dir.as_deref() else {
                return Ok(None);
            };
            let path = match self.store.read().image_path(map, maps_dir) {
                Ok(path) => path,
                Err(CatalogError::NotFound(_)) => return Ok(None),
                Err(e) => return Err(SourceError::with_source("Failed to resolve image", e)),
            };
            match std::fs::read(&path) {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(SourceError::with_source("Failed to read image", e)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpMapSource, MapSource, StoreMapSource};
    use crate::model::{CoordinateId, LibraryId, MapId};
    use crate::store::CatalogStore;
    use parking_lot::RwLock;
    use std::sync::Arc;

    fn shared_store() -> (Arc<RwLock<CatalogStore>>, MapId) {
        let mut store = CatalogStore::new();
        let lib = store.insert_library("Palermo", "#8b1f0c").unwrap();
        let map = store.insert_map("Pianta", "pianta.jpg", Some(lib)).unwrap();
        store
            .set_coordinates(map, Some("Palermo".into()), Some(38.1), Some(13.3))
            .unwrap();
        store.insert_map("Senza luogo", "vuota.jpg", Some(lib)).unwrap();
        (Arc::new(RwLock::new(store)), map)
    }

    #[test]
    fn http_urls_follow_backend_routes() {
        let source = HttpMapSource::new("http://localhost:3000/");
        assert_eq!(source.base_url(), "http://localhost:3000");
        assert_eq!(source.records_url(LibraryId(2)), "http://localhost:3000/api/maps/2");
        assert_eq!(
            source.count_url(CoordinateId(7)),
            "http://localhost:3000/api/coordinates/7/maps/count"
        );
        assert_eq!(source.image_url(MapId(3)), "http://localhost:3000/api/maps/3/image");
    }

    #[test]
    fn store_source_lists_records_and_counts() {
        let (store, map) = shared_store();
        let source = StoreMapSource::new(store);
        let records = pollster::block_on(source.fetch_records(LibraryId(1))).unwrap();
        assert_eq!(records.len(), 2);
        let placed = records.iter().find(|r| r.id == map).unwrap();
        let coord = placed.coordinate.as_ref().unwrap().id;
        assert_eq!(pollster::block_on(source.coordinate_map_count(coord)).unwrap(), 1);
        assert!(pollster::block_on(source.fetch_records(LibraryId(9))).is_err());
    }

    #[test]
    fn store_source_reads_images_from_library_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Palermo")).unwrap();
        std::fs::write(dir.path().join("Palermo/pianta.jpg"), b"jpeg-bytes").unwrap();

        let (store, map) = shared_store();
        let bare = StoreMapSource::new(store.clone());
        assert_eq!(pollster::block_on(bare.map_image(map)).unwrap(), None);

        let source = StoreMapSource::new(store).with_maps_dir(dir.path());
        assert_eq!(
            pollster::block_on(source.map_image(map)).unwrap(),
            Some(b"jpeg-bytes".to_vec())
        );
        assert_eq!(pollster::block_on(source.map_image(MapId(2))).unwrap(), None);
        assert_eq!(pollster::block_on(source.map_image(MapId(40))).unwrap(), None);
    }
}

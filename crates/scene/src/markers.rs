use std::collections::BTreeMap;

use catalog::model::{CoordinateId, MapId, MapRecord};
use foundation::ease::Ease;
use foundation::math::{GeoPoint, Vec3, marker_anchor};
use tracing::{debug, warn};

use crate::config::GlobeConfig;
use crate::picking::Sphere;

pub const NO_DESCRIPTION: &str = "Nessuna descrizione disponibile";

/// Opacity range and half-period of the marker pulse.
const PULSE_HIGH: f64 = 0.9;
const PULSE_LOW: f64 = 0.6;
const PULSE_HALF_PERIOD_S: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerImage {
    /// Image served for a catalog map.
    Map(MapId),
    /// Bundled asset path.
    Asset(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// `None` for the built-in fallback markers.
    pub coord_id: Option<CoordinateId>,
    /// Representative map shown in the hover label.
    pub map_id: Option<MapId>,
    pub geo: GeoPoint,
    pub label: String,
    pub description: String,
    pub image: Option<MarkerImage>,
    /// Globe-local anchor, already floated above the surface.
    pub local_position: Vec3,
    pub pick_radius: f64,
}

impl Marker {
    pub fn new(geo: GeoPoint, label: impl Into<String>, cfg: &GlobeConfig) -> Self {
        Self {
            coord_id: None,
            map_id: None,
            geo,
            label: label.into(),
            description: NO_DESCRIPTION.to_string(),
            image: None,
            local_position: marker_anchor(geo, cfg.radius, cfg.marker_offset),
            pick_radius: cfg.pick_radius,
        }
    }

    pub fn pick_sphere(&self, world_position: Vec3) -> Sphere {
        Sphere::new(world_position, self.pick_radius)
    }

    /// Head opacity at session time `t_s`: a sine-eased yoyo between 0.9
    /// and 0.6.
    pub fn pulse_opacity(t_s: f64) -> f64 {
        let cycles = (t_s.max(0.0) / PULSE_HALF_PERIOD_S).floor();
        let phase = t_s.max(0.0) / PULSE_HALF_PERIOD_S - cycles;
        let eased = Ease::SineInOut.apply(phase);
        let k = if cycles as u64 % 2 == 0 { eased } else { 1.0 - eased };
        PULSE_HIGH + (PULSE_LOW - PULSE_HIGH) * k
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MarkerOrigin {
    Fetched,
    Fallback,
}

/// The markers placed on the globe, in a stable order.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSet {
    markers: Vec<Marker>,
    origin: MarkerOrigin,
}

impl MarkerSet {
    /// One marker per coordinate id, ascending.
    ///
    /// Records without a coordinate are skipped; so are coordinates outside
    /// the valid latitude/longitude range. When several records share a
    /// coordinate, the last one supplies the label and description.
    pub fn from_records(records: &[MapRecord], cfg: &GlobeConfig) -> Self {
        let mut groups: BTreeMap<CoordinateId, &MapRecord> = BTreeMap::new();
        for record in records {
            let Some(coordinate) = record.coordinate.as_ref() else {
                continue;
            };
            groups.insert(coordinate.id, record);
        }

        let mut markers = Vec::with_capacity(groups.len());
        for (coord_id, record) in groups {
            let Some(coordinate) = record.coordinate.as_ref() else {
                continue;
            };
            let geo = match GeoPoint::new(coordinate.latitude, coordinate.longitude) {
                Ok(geo) => geo,
                Err(e) => {
                    warn!(coordinate = %coord_id, "skipping marker: {e}");
                    continue;
                }
            };
            let mut marker = Marker::new(geo, record.title.clone(), cfg);
            marker.coord_id = Some(coord_id);
            marker.map_id = Some(record.id);
            marker.description = record
                .location
                .clone()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string());
            marker.image = Some(MarkerImage::Map(record.id));
            markers.push(marker);
        }
        debug!("built {} markers from {} records", markers.len(), records.len());
        Self {
            markers,
            origin: MarkerOrigin::Fetched,
        }
    }

    /// Built-in markers shown when no catalog records are available.
    pub fn fallback(cfg: &GlobeConfig) -> Self {
        const POINTS: [(f64, f64, &str, &str, &str); 5] = [
            (50.4501, 30.5234, "Ucraina", "Mappa storica dell'Ucraina.", "../assets/maps/ucraina.png"),
            (7.873054, 80.771797, "Ceylon (Sri Lanka)", "Mappa storica di Ceylon.", "../assets/maps/celyon.png"),
            (17.352656, 9.677581, "Africa", "Mappa storica dell'Africa.", "../assets/maps/africa.png"),
            (59.329323, 18.068581, "Norway", "Mappa antica della Scandinavia.", "../assets/maps/norway.png"),
            (41.902783, 12.496365, "Italy", "Mappa storica dell'Italia.", "../assets/maps/italy.png"),
        ];
        let markers = POINTS
            .iter()
            .map(|&(lat, lng, name, description, image)| {
                let mut marker = Marker::new(GeoPoint::new_unchecked(lat, lng), name, cfg);
                marker.description = description.to_string();
                marker.image = Some(MarkerImage::Asset(image.to_string()));
                marker
            })
            .collect();
        Self {
            markers,
            origin: MarkerOrigin::Fallback,
        }
    }

    /// `from_records`, or the fallback set when no record has a coordinate.
    pub fn from_records_or_fallback(records: &[MapRecord], cfg: &GlobeConfig) -> Self {
        let set = Self::from_records(records, cfg);
        if set.is_empty() {
            return Self::fallback(cfg);
        }
        set
    }

    pub fn empty() -> Self {
        Self {
            markers: Vec::new(),
            origin: MarkerOrigin::Fetched,
        }
    }

    pub fn origin(&self) -> MarkerOrigin {
        self.origin
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }
}

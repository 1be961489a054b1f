//! Argument handling and report shapes for the `globe` command-line tool.

use std::path::PathBuf;

use catalog::SourceConfig;
use catalog::model::LibraryId;
use scene::{GlobeSession, MarkerOrigin, MarkerSet, OrientationState};
use serde::Serialize;

/// Where marker records are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSource {
    Snapshot(PathBuf),
    Backend(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewArgs {
    pub source: RecordSource,
    pub library: LibraryId,
    pub maps_dir: PathBuf,
    pub config: Option<PathBuf>,
    pub yaw: f64,
    pub pitch: f64,
    pub distance: Option<f64>,
}

/// Parse `[snapshot.json] [--backend URL] [--library ID] [--config FILE]`
/// plus, when `with_view` is set, `[--yaw Y] [--pitch P] [--distance D]`.
///
/// Without a snapshot or `--backend`, records come from the backend named by
/// the environment.
pub fn parse_view_args(
    args: &[String],
    with_view: bool,
    env: &SourceConfig,
) -> Result<ViewArgs, String> {
    let mut snapshot: Option<PathBuf> = None;
    let mut backend: Option<String> = None;
    let mut library = env.library_id;
    let mut config = None;
    let mut yaw = 0.0;
    let mut pitch = 0.0;
    let mut distance = None;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = |name: &str| -> Result<String, String> {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{name} requires a value"))
        };
        match arg {
            "--backend" => backend = Some(value("--backend")?),
            "--library" => {
                let raw = value("--library")?;
                let id = raw
                    .parse::<u32>()
                    .map_err(|e| format!("--library {raw}: {e}"))?;
                library = LibraryId(id);
            }
            "--config" => config = Some(PathBuf::from(value("--config")?)),
            "--yaw" if with_view => yaw = parse_f64("--yaw", &value("--yaw")?)?,
            "--pitch" if with_view => pitch = parse_f64("--pitch", &value("--pitch")?)?,
            "--distance" if with_view => {
                distance = Some(parse_f64("--distance", &value("--distance")?)?)
            }
            s if s.starts_with('-') => return Err(format!("unknown arg: {s}")),
            s => {
                if snapshot.is_some() {
                    return Err(format!("unexpected argument: {s}"));
                }
                snapshot = Some(PathBuf::from(s));
            }
        }
        i += 1;
    }

    let source = match (snapshot, backend) {
        (Some(_), Some(_)) => {
            return Err("give either a snapshot path or --backend, not both".to_string());
        }
        (Some(path), None) => RecordSource::Snapshot(path),
        (None, Some(url)) => RecordSource::Backend(url),
        (None, None) => RecordSource::Backend(env.backend_url.clone()),
    };

    Ok(ViewArgs {
        source,
        library,
        maps_dir: env.maps_dir.clone(),
        config,
        yaw,
        pitch,
        distance,
    })
}

fn parse_f64(name: &str, raw: &str) -> Result<f64, String> {
    let v: f64 = raw.parse().map_err(|e| format!("{name} {raw}: {e}"))?;
    if !v.is_finite() {
        return Err(format!("{name} must be finite"));
    }
    Ok(v)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerReport {
    pub index: usize,
    pub label: String,
    pub description: String,
    pub coord_id: Option<u32>,
    pub map_id: Option<u32>,
    pub latitude: f64,
    pub longitude: f64,
    /// Globe-local position.
    pub position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkersReport {
    pub fallback: bool,
    pub markers: Vec<MarkerReport>,
}

pub fn markers_report(set: &MarkerSet) -> MarkersReport {
    MarkersReport {
        fallback: set.origin() == MarkerOrigin::Fallback,
        markers: set
            .iter()
            .enumerate()
            .map(|(index, m)| MarkerReport {
                index,
                label: m.label.clone(),
                description: m.description.clone(),
                coord_id: m.coord_id.map(|c| c.0),
                map_id: m.map_id.map(|id| id.0),
                latitude: m.geo.latitude(),
                longitude: m.geo.longitude(),
                position: m.local_position.as_array(),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleReport {
    pub yaw: f64,
    pub pitch: f64,
    pub distance: f64,
    pub visible: Vec<MarkerReport>,
}

/// Apply the requested view to `session` and list what it can see.
pub fn visible_report(session: &mut GlobeSession, args: &ViewArgs) -> VisibleReport {
    session.set_orientation(OrientationState::new(args.yaw, args.pitch));
    if let Some(distance) = args.distance {
        session.set_distance(distance);
    }
    let all = markers_report(session.markers()).markers;
    let visible = session.visible_markers();
    let orientation = session.orientation();
    VisibleReport {
        yaw: orientation.yaw(),
        pitch: orientation.pitch(),
        distance: session.zoom().distance(),
        visible: all
            .into_iter()
            .filter(|m| visible.contains(&m.index))
            .collect(),
    }
}

pub fn usage(exe: &str) -> String {
    format!(
        "Usage:\n  {exe} sync [maps_dir] <snapshot.json>\n  {exe} markers [snapshot.json] [--backend URL] [--library ID] [--config FILE]\n  {exe} visible [snapshot.json] [--backend URL] [--library ID] [--config FILE] [--yaw Y] [--pitch P] [--distance D]\n\nEnvironment:\n- GLOBE_BACKEND_URL: backend used when neither a snapshot nor --backend is given.\n- GLOBE_LIBRARY_ID: default digital library.\n- GLOBE_MAPS_DIR: maps directory for `sync` and for snapshot images.\n- RUST_LOG: log filter.\n"
    )
}

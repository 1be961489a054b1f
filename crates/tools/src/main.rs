use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog::{CatalogStore, HttpMapSource, MapSource, SourceConfig, StoreMapSource};
use parking_lot::RwLock;
use scene::{GlobeConfig, GlobeSession, Viewport};
use serde::Serialize;
use tools::{RecordSource, ViewArgs, markers_report, parse_view_args, usage, visible_report};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    let exe = args
        .first()
        .cloned()
        .unwrap_or_else(|| "globe".to_string());
    if args.len() < 2 {
        return Err(usage(&exe));
    }

    let cmd = args[1].clone();
    args.drain(0..2);
    let env_cfg = SourceConfig::from_env();

    match cmd.as_str() {
        "sync" => cmd_sync(args, &env_cfg),
        "markers" => cmd_markers(parse_view_args(&args, false, &env_cfg)?),
        "visible" => cmd_visible(parse_view_args(&args, true, &env_cfg)?),
        _ => Err(usage(&exe)),
    }
}

fn cmd_sync(args: Vec<String>, env_cfg: &SourceConfig) -> Result<(), String> {
    // globe sync [maps_dir] <snapshot.json>
    let (maps_dir, snapshot) = match args.as_slice() {
        [snapshot] => (env_cfg.maps_dir.clone(), PathBuf::from(snapshot)),
        [maps_dir, snapshot] => (PathBuf::from(maps_dir), PathBuf::from(snapshot)),
        _ => return Err("sync takes [maps_dir] <snapshot.json>".to_string()),
    };

    let mut store = CatalogStore::load(&snapshot).map_err(|e| e.to_string())?;
    let report = store
        .sync_directory(&maps_dir)
        .map_err(|e| e.to_string())?;
    store.save(&snapshot).map_err(|e| e.to_string())?;

    eprintln!(
        "synced {} into {} ({} new libraries, {} new maps)",
        maps_dir.display(),
        snapshot.display(),
        report.libraries_created.len(),
        report.maps_added.len()
    );
    Ok(())
}

fn cmd_markers(args: ViewArgs) -> Result<(), String> {
    let session = build_session(&args)?;
    print_json(&markers_report(session.markers()))
}

fn cmd_visible(args: ViewArgs) -> Result<(), String> {
    let mut session = build_session(&args)?;
    let report = visible_report(&mut session, &args);
    print_json(&report)
}

fn build_session(args: &ViewArgs) -> Result<GlobeSession, String> {
    let cfg = match &args.config {
        Some(path) => GlobeConfig::load(path).map_err(|e| e.to_string())?,
        None => GlobeConfig::default(),
    };
    let source = open_source(&args.source, &args.maps_dir)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("start runtime: {e}"))?;

    let mut session = GlobeSession::new(cfg, Viewport::default());
    session.init_globe();
    let origin = runtime.block_on(session.load_markers(source.as_ref(), args.library));
    info!("library {} loaded ({origin:?})", args.library);
    Ok(session)
}

fn open_source(source: &RecordSource, maps_dir: &Path) -> Result<Box<dyn MapSource>, String> {
    match source {
        RecordSource::Backend(url) => Ok(Box::new(HttpMapSource::new(url.clone()))),
        RecordSource::Snapshot(path) => {
            if !path.exists() {
                return Err(format!("snapshot not found: {}", path.display()));
            }
            let store = CatalogStore::load(path).map_err(|e| e.to_string())?;
            Ok(Box::new(
                StoreMapSource::new(Arc::new(RwLock::new(store))).with_maps_dir(maps_dir),
            ))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{payload}").map_err(|e| format!("write stdout: {e}"))
}

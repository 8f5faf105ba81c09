//! Diagnostics report over the adaptive-lighting state
//!
//! The Reporter joins the adaptive-state registry, the snapshot store,
//! both fade-window trackers, and live device readings into one
//! human-readable report. It is strictly read-only and renders "N/A" for
//! anything absent rather than failing the report; only a failing state
//! substrate aborts it.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lumen_core::{Device, DeviceId};
use lumen_platform::DeviceDirectory;
use lumen_store::{
    AdaptiveStateRegistry, DeviceState, FadeWindowTracker, SavedSettings, SnapshotStore,
    StoreResult,
};
use tracing::{debug, instrument};

const NOT_AVAILABLE: &str = "N/A";

/// Read-only status reporter
pub struct Reporter {
    directory: Arc<dyn DeviceDirectory>,
    registry: AdaptiveStateRegistry,
    snapshots: SnapshotStore,
    script_windows: FadeWindowTracker,
    adaptive_windows: FadeWindowTracker,
}

/// One device's joined state, gathered before rendering
struct Row {
    name: String,
    zone: Option<String>,
    state: DeviceState,
    device: Option<Device>,
    saved: Option<SavedSettings>,
    script_fading: bool,
    adaptive_fading: bool,
}

impl Reporter {
    /// Create a reporter over the given stores and directory
    pub fn new(
        directory: Arc<dyn DeviceDirectory>,
        registry: AdaptiveStateRegistry,
        snapshots: SnapshotStore,
        script_windows: FadeWindowTracker,
        adaptive_windows: FadeWindowTracker,
    ) -> Self {
        Self {
            directory,
            registry,
            snapshots,
            script_windows,
            adaptive_windows,
        }
    }

    /// Render the status report
    ///
    /// Covers every device the registry has ever seen, in display-name
    /// order, and closes with the auto/manual totals.
    #[instrument(skip(self))]
    pub async fn report(&self) -> StoreResult<String> {
        let now = Utc::now();
        let ids = self.registry.device_ids()?;
        debug!(devices = ids.len(), "Rendering diagnostics report");

        if ids.is_empty() {
            return Ok("no devices registered\n0 auto, 0 manual\n".to_string());
        }

        let mut rows = Vec::with_capacity(ids.len());
        for id in &ids {
            rows.push(self.gather(id, now).await?);
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));

        let manual = rows.iter().filter(|r| r.state.manual_override).count();
        let auto = rows.len() - manual;

        let mut out = String::new();
        for row in &rows {
            render_row(&mut out, row);
        }
        let _ = writeln!(out, "\n{auto} auto, {manual} manual");
        Ok(out)
    }

    /// Join one device's state across the stores and the live platform
    ///
    /// Platform failures are tolerated here; a device the directory no
    /// longer knows renders under a short identifier label.
    async fn gather(&self, id: &DeviceId, now: DateTime<Utc>) -> StoreResult<Row> {
        let state = self.registry.get(id)?.unwrap_or_default();
        let device = self.directory.device(id).await.ok().flatten();
        let name = device
            .as_ref()
            .map(|d| d.name.clone())
            .unwrap_or_else(|| id.short_label());
        let zone = device.as_ref().and_then(|d| d.zone.clone());

        Ok(Row {
            name,
            zone,
            state,
            device,
            saved: self.snapshots.read(id)?,
            script_fading: self.script_windows.is_active(id, now)?,
            adaptive_fading: self.adaptive_windows.is_active(id, now)?,
        })
    }
}

fn render_row(out: &mut String, row: &Row) {
    let (icon, mode) = if row.state.manual_override {
        ("✋", "manual")
    } else {
        ("🤖", "auto")
    };
    let _ = write!(out, "{icon} {} [{mode}]", row.name);
    if let Some(zone) = &row.zone {
        let _ = write!(out, " ({zone})");
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "   profile: {}",
        row.state.last_profile.as_deref().unwrap_or(NOT_AVAILABLE)
    );
    let _ = writeln!(
        out,
        "   dim: {}   temperature: {}",
        fraction(row.device.as_ref().and_then(Device::dim)),
        fraction(row.device.as_ref().and_then(Device::light_temperature)),
    );
    let _ = writeln!(
        out,
        "   saved: dim={} temperature={}",
        fraction(row.saved.as_ref().map(|s| s.dim)),
        fraction(row.saved.as_ref().and_then(|s| s.temperature)),
    );
    let _ = writeln!(out, "   fading: {}", fading_label(row));
}

fn fading_label(row: &Row) -> &'static str {
    match (row.script_fading, row.adaptive_fading) {
        (true, true) => "script+adaptive",
        (true, false) => "script",
        (false, true) => "adaptive",
        (false, false) => "no",
    }
}

fn fraction(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

//! Fade-out coordinator
//!
//! Orchestrates a single fade-out request: snapshot, fade-window write,
//! group resolution, and per-target delegation to hardware-timed
//! transitions. Within one call the snapshot write happens before the
//! window write, which happens before any delegation, so a concurrent
//! diagnostics read observes either no fade state or complete fade state
//! for a device, never a torn intermediate.

use std::sync::Arc;
use std::time::Duration;

use lumen_core::{capability, Context, Device, DeviceId};
use lumen_platform::{DeviceDirectory, LightControl, Notifier};
use lumen_store::{FadeWindowTracker, SavedSettings, SnapshotStore, StoreError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::resolver::resolve_targets;

/// Brightness at or below which a device is already effectively off
///
/// Driving a hardware fade on an already-dark light is wasteful and can
/// produce visible flicker on some drivers.
pub const DIM_OFF_THRESHOLD: f64 = 0.05;

/// Grace window appended to every fade window beyond the fade duration
pub const DEFAULT_FADE_BUFFER: Duration = Duration::from_secs(5);

/// Errors that abort a fade-out invocation
///
/// Per-target delegation failures are not errors; they are recovered
/// locally and recorded in the report's target outcomes.
#[derive(Debug, Error)]
pub enum FadeError {
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("platform lookup failed: {0}")]
    Platform(#[from] lumen_platform::PlatformError),
}

/// What a fade-out call did overall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FadeOutcome {
    /// Timed transitions were delegated to the resolved targets
    Faded,
    /// The device was already effectively off; no fade was issued
    AlreadyOff,
}

impl FadeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            FadeOutcome::Faded => "faded",
            FadeOutcome::AlreadyOff => "already-off",
        }
    }
}

/// Delegation result for one resolved target
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum TargetStatus {
    /// Timed transition accepted by the platform
    Delegated,
    /// Transition failed; fell back to an instantaneous brightness set
    FellBack(String),
    /// Transition failed and no fallback landed
    Failed(String),
}

/// Per-target outcome of the fan-out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetOutcome {
    pub device: DeviceId,
    pub name: String,
    #[serde(flatten)]
    pub status: TargetStatus,
}

/// Result of a fade-out invocation
#[derive(Debug, Clone, Serialize)]
pub struct FadeReport {
    pub device_name: String,
    pub outcome: FadeOutcome,
    pub targets: Vec<TargetOutcome>,
    #[serde(skip)]
    pub duration: Duration,
}

impl FadeReport {
    /// Targets whose transition was accepted
    pub fn delegated_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.status == TargetStatus::Delegated)
            .count()
    }

    /// Targets that ended in failure (fallbacks included)
    pub fn failed_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| matches!(t.status, TargetStatus::Failed(_)))
            .count()
    }

    /// Human-readable description of what happened
    pub fn summary(&self) -> String {
        match self.outcome {
            FadeOutcome::AlreadyOff => {
                format!("'{}' is already off; fade skipped", self.device_name)
            }
            FadeOutcome::Faded => {
                let total = self.targets.len();
                let failed = self.failed_count();
                if failed == 0 {
                    format!(
                        "fading '{}' to off over {}s ({} target{})",
                        self.device_name,
                        self.duration.as_secs(),
                        total,
                        if total == 1 { "" } else { "s" },
                    )
                } else {
                    format!(
                        "fading '{}' to off over {}s ({} of {} targets delegated)",
                        self.device_name,
                        self.duration.as_secs(),
                        total - failed,
                        total,
                    )
                }
            }
        }
    }
}

/// Coordinates fade-out requests against the platform and the state stores
pub struct FadeCoordinator {
    directory: Arc<dyn DeviceDirectory>,
    control: Arc<dyn LightControl>,
    snapshots: SnapshotStore,
    windows: FadeWindowTracker,
    notifier: Arc<dyn Notifier>,
}

impl FadeCoordinator {
    /// Create a coordinator
    ///
    /// `windows` should address the script-driven namespace; the
    /// adaptive-control loop maintains its own.
    pub fn new(
        directory: Arc<dyn DeviceDirectory>,
        control: Arc<dyn LightControl>,
        snapshots: SnapshotStore,
        windows: FadeWindowTracker,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            control,
            snapshots,
            windows,
            notifier,
        }
    }

    /// Fade a device (or group proxy) to off with the default grace buffer
    pub async fn fade_out(
        &self,
        id: &DeviceId,
        duration: Duration,
        context: Context,
    ) -> Result<FadeReport, FadeError> {
        self.fade_out_with_buffer(id, duration, DEFAULT_FADE_BUFFER, context)
            .await
    }

    /// Fade a device (or group proxy) to off
    ///
    /// Returns as soon as all transitions have been delegated; the fades
    /// proceed asynchronously inside the lighting hardware. Only a missing
    /// device or a failing state store aborts the call.
    #[instrument(skip(self, context), fields(device = %id, context_id = %context.id))]
    pub async fn fade_out_with_buffer(
        &self,
        id: &DeviceId,
        duration: Duration,
        buffer: Duration,
        context: Context,
    ) -> Result<FadeReport, FadeError> {
        let device = self
            .directory
            .device(id)
            .await?
            .ok_or_else(|| FadeError::DeviceNotFound(id.clone()))?;

        let dim = device.dim().unwrap_or(0.0);
        let temperature = device.light_temperature();

        if dim <= DIM_OFF_THRESHOLD {
            return self.skip_already_off(&device).await;
        }

        // Snapshot under the original identifier, even for a group: the
        // restore routine operates at the proxy level, not per member.
        self.snapshots.save(id, &SavedSettings { dim, temperature })?;
        self.windows.mark_active(id, duration, buffer)?;

        let targets = match self.directory.devices().await {
            Ok(all) => resolve_targets(&device, &all),
            Err(err) => {
                // Enumeration failing means members cannot be resolved;
                // the original device still gets its fade.
                warn!(error = %err, "Device enumeration failed; fading the device alone");
                vec![device.clone()]
            }
        };

        let single_target = targets.len() == 1;
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in &targets {
            let status = self.delegate(target, duration, single_target).await;
            outcomes.push(TargetOutcome {
                device: target.id.clone(),
                name: target.name.clone(),
                status,
            });
        }

        let report = FadeReport {
            device_name: device.name,
            outcome: FadeOutcome::Faded,
            targets: outcomes,
            duration,
        };
        debug!(summary = %report.summary(), "Fade-out delegated");
        Ok(report)
    }

    /// Early-out for a device that is already effectively off
    ///
    /// Turns the device off directly and expires the fade window so stale
    /// consumers don't believe a fade is pending.
    async fn skip_already_off(&self, device: &Device) -> Result<FadeReport, FadeError> {
        debug!("Device already effectively off; skipping fade");

        if let Err(err) = self
            .control
            .set_capability(&device.id, capability::ONOFF, json!(false))
            .await
        {
            warn!(error = %err, "Failed to switch device off");
            self.notifier
                .notify(&format!("could not switch off '{}': {err}", device.name));
        }
        self.windows.clear(&device.id)?;

        Ok(FadeReport {
            device_name: device.name.clone(),
            outcome: FadeOutcome::AlreadyOff,
            targets: Vec::new(),
            duration: Duration::ZERO,
        })
    }

    /// Delegate one target's timed transition, best-effort
    async fn delegate(&self, target: &Device, duration: Duration, single: bool) -> TargetStatus {
        match self
            .control
            .start_transition(&target.id, capability::DIM, 0.0, duration)
            .await
        {
            Ok(()) => {
                debug!(target = %target.name, "Delegated timed transition");
                TargetStatus::Delegated
            }
            Err(err) => {
                warn!(target = %target.name, error = %err, "Transition delegation failed");
                self.notifier
                    .notify(&format!("fade delegation failed for '{}': {err}", target.name));

                if !single {
                    return TargetStatus::Failed(err.to_string());
                }

                // Sole target: an instantaneous set beats leaving the
                // light at its pre-fade brightness.
                match self
                    .control
                    .set_capability(&target.id, capability::DIM, json!(0.0))
                    .await
                {
                    Ok(()) => TargetStatus::FellBack(err.to_string()),
                    Err(fallback_err) => {
                        warn!(target = %target.name, error = %fallback_err, "Fallback set failed");
                        TargetStatus::Failed(format!("{err}; fallback failed: {fallback_err}"))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: FadeOutcome, targets: Vec<TargetOutcome>, secs: u64) -> FadeReport {
        FadeReport {
            device_name: "Lights".to_string(),
            outcome,
            targets,
            duration: Duration::from_secs(secs),
        }
    }

    fn outcome(name: &str, status: TargetStatus) -> TargetOutcome {
        TargetOutcome {
            device: DeviceId::new(name.replace(' ', "-")).unwrap(),
            name: name.to_string(),
            status,
        }
    }

    #[test]
    fn test_summary_already_off() {
        let report = report(FadeOutcome::AlreadyOff, vec![], 0);
        assert_eq!(report.summary(), "'Lights' is already off; fade skipped");
    }

    #[test]
    fn test_summary_counts_failures() {
        let report = report(
            FadeOutcome::Faded,
            vec![
                outcome("Lights 1", TargetStatus::Delegated),
                outcome("Lights 2", TargetStatus::Failed("boom".to_string())),
                outcome("Lights 3", TargetStatus::Delegated),
            ],
            30,
        );
        assert_eq!(report.delegated_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(
            report.summary(),
            "fading 'Lights' to off over 30s (2 of 3 targets delegated)"
        );
    }

    #[test]
    fn test_summary_single_target() {
        let report = report(
            FadeOutcome::Faded,
            vec![outcome("Lights", TargetStatus::Delegated)],
            45,
        );
        assert_eq!(report.summary(), "fading 'Lights' to off over 45s (1 target)");
    }

    #[test]
    fn test_fallback_does_not_count_as_failure() {
        let report = report(
            FadeOutcome::Faded,
            vec![outcome("Lights", TargetStatus::FellBack("no fade".to_string()))],
            30,
        );
        assert_eq!(report.failed_count(), 0);
        assert_eq!(report.delegated_count(), 0);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(FadeOutcome::Faded.as_str(), "faded");
        assert_eq!(FadeOutcome::AlreadyOff.as_str(), "already-off");
    }
}

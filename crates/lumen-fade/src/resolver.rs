//! Device/group resolution
//!
//! A device whose name prefixes other light-capable device names (e.g.
//! "Lights 1" and "Lights 2" under "Lights") is treated as a group proxy
//! for those members. The convention is name-based rather than structural;
//! it is isolated here so a structural-group lookup can replace it without
//! touching the coordinator.

use lumen_core::Device;
use tracing::debug;

/// Resolve a device into the targets a fade should address
///
/// Members are the light-capable devices in `all` whose display name
/// begins with `"{device.name} "`, excluding the device itself, in the
/// order `all` enumerates them. A device with no eligible members is its
/// own single target; this includes the group-looking case where the
/// prefix matches nothing eligible.
pub fn resolve_targets(device: &Device, all: &[Device]) -> Vec<Device> {
    let prefix = format!("{} ", device.name);
    let members: Vec<Device> = all
        .iter()
        .filter(|d| d.id != device.id && d.name.starts_with(&prefix) && d.is_light())
        .cloned()
        .collect();

    if members.is_empty() {
        return vec![device.clone()];
    }

    debug!(
        group = %device.name,
        members = members.len(),
        "Resolved group proxy"
    );
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{capability, CapabilityState, Device, DeviceId, CLASS_LIGHT};
    use serde_json::json;
    use std::collections::HashMap;

    fn device(id: &str, name: &str, class: &str, with_dim: bool) -> Device {
        let mut capabilities = HashMap::new();
        if with_dim {
            capabilities.insert(
                capability::DIM.to_string(),
                CapabilityState::new(json!(0.5)),
            );
        }
        Device {
            id: DeviceId::new(id).unwrap(),
            name: name.to_string(),
            class: class.to_string(),
            zone: None,
            capabilities,
        }
    }

    fn light(id: &str, name: &str) -> Device {
        device(id, name, CLASS_LIGHT, true)
    }

    fn names(targets: &[Device]) -> Vec<&str> {
        targets.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_single_device_resolves_to_itself() {
        let lamp = light("lamp", "Desk Lamp");
        let all = vec![lamp.clone(), light("other", "Ceiling")];

        assert_eq!(names(&resolve_targets(&lamp, &all)), vec!["Desk Lamp"]);
    }

    #[test]
    fn test_group_resolves_to_members_without_proxy() {
        let group = light("group", "Lights");
        let all = vec![
            group.clone(),
            light("m1", "Lights 1"),
            light("m2", "Lights 2"),
            light("other", "Hallway"),
        ];

        let targets = resolve_targets(&group, &all);
        assert_eq!(names(&targets), vec!["Lights 1", "Lights 2"]);
        assert!(targets.iter().all(|d| d.id != group.id));
    }

    #[test]
    fn test_member_set_is_order_independent() {
        let group = light("group", "Lights");
        let forward = vec![group.clone(), light("m1", "Lights 1"), light("m2", "Lights 2")];
        let reversed = vec![light("m2", "Lights 2"), light("m1", "Lights 1"), group.clone()];

        let forward_targets = resolve_targets(&group, &forward);
        let reversed_targets = resolve_targets(&group, &reversed);
        let mut a = names(&forward_targets);
        let mut b = names(&reversed_targets);
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
        assert_eq!(a, vec!["Lights 1", "Lights 2"]);
    }

    #[test]
    fn test_prefix_requires_separator() {
        // "Lightstrip" shares the leading characters but not the naming
        // convention; it must not be pulled into the "Lights" group.
        let group = light("group", "Lights");
        let all = vec![group.clone(), light("strip", "Lightstrip")];

        assert_eq!(names(&resolve_targets(&group, &all)), vec!["Lights"]);
    }

    #[test]
    fn test_non_light_members_are_excluded() {
        let group = light("group", "Lights");
        let all = vec![
            group.clone(),
            light("m1", "Lights 1"),
            device("sensor", "Lights motion sensor", "sensor", false),
        ];

        assert_eq!(names(&resolve_targets(&group, &all)), vec!["Lights 1"]);
    }

    #[test]
    fn test_zero_eligible_members_falls_back_to_self() {
        let group = light("group", "Lights");
        let all = vec![
            group.clone(),
            device("sensor", "Lights sensor", "sensor", false),
        ];

        assert_eq!(names(&resolve_targets(&group, &all)), vec!["Lights"]);
    }

    #[test]
    fn test_dimmer_socket_counts_as_light_member() {
        let group = light("group", "Lights");
        let all = vec![
            group.clone(),
            device("socket", "Lights corner", "socket", true),
        ];

        assert_eq!(names(&resolve_targets(&group, &all)), vec!["Lights corner"]);
    }
}

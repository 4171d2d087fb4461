//! Tool capabilities and the dig/hit parameter math derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::{Groups, group_rating};

/// How a tool performs against one node group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolGroupCap {
    /// Dig time in seconds per group rating.
    pub times: BTreeMap<i32, f32>,
    /// Digs at `level == max_level` before the tool wears out. 0 = no wear.
    pub uses: u32,
    /// Highest node `level` this cap can dig.
    pub max_level: i32,
}

impl ToolGroupCap {
    /// Dig time for a node of the given rating, if the cap covers it.
    pub fn time_for(&self, rating: i32) -> Option<f32> {
        self.times.get(&rating).copied()
    }
}

/// Digging and punching abilities of an item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCapabilities {
    /// Seconds between full-strength punches.
    pub full_punch_interval: f32,
    /// Highest drop level the tool collects.
    pub max_drop_level: i32,
    /// Per-group dig abilities, ordered for deterministic tie-breaking.
    pub group_caps: BTreeMap<String, ToolGroupCap>,
    /// Damage per armor group at full punch strength.
    pub damage_groups: BTreeMap<String, i32>,
    /// Punches before the tool wears out. 0 = no wear.
    pub punch_attack_uses: u32,
}

impl Default for ToolCapabilities {
    fn default() -> Self {
        Self {
            full_punch_interval: 1.4,
            max_drop_level: 1,
            group_caps: BTreeMap::new(),
            damage_groups: BTreeMap::new(),
            punch_attack_uses: 0,
        }
    }
}

impl ToolCapabilities {
    /// Adds a group cap.
    pub fn with_group_cap(mut self, group: &str, cap: ToolGroupCap) -> Self {
        self.group_caps.insert(group.to_string(), cap);
        self
    }

    /// Adds a damage group.
    pub fn with_damage(mut self, group: &str, damage: i32) -> Self {
        self.damage_groups.insert(group.to_string(), damage);
        self
    }
}

/// Result of matching a tool against a node.
#[derive(Clone, Debug, PartialEq)]
pub struct DigParams {
    /// Whether the tool can dig the node at all.
    pub diggable: bool,
    /// Seconds to dig. 0 means instant.
    pub time: f32,
    /// Fraction of the tool's life consumed, in `[0, 1]`.
    pub wear: f32,
    /// Group that decided the time.
    pub main_group: String,
}

impl DigParams {
    fn not_diggable() -> Self {
        Self {
            diggable: false,
            time: 0.0,
            wear: 0.0,
            main_group: String::new(),
        }
    }
}

/// Computes how `caps` digs a node with `groups`.
///
/// `dig_immediate` rated nodes short-circuit (rating 2: 0.5 s, rating 3:
/// instant) unless the tool defines its own `dig_immediate` cap. Otherwise the
/// fastest cap wins among those whose `max_level` reaches the node's `level`
/// and that define a time for the node's rating in that group.
pub fn dig_params(groups: &Groups, caps: &ToolCapabilities) -> DigParams {
    if !caps.group_caps.contains_key("dig_immediate") {
        let immediate = match group_rating(groups, "dig_immediate") {
            2 => Some(0.5),
            3 => Some(0.0),
            _ => None,
        };
        if let Some(time) = immediate {
            return DigParams {
                diggable: true,
                time,
                wear: 0.0,
                main_group: "dig_immediate".to_string(),
            };
        }
    }

    let level = group_rating(groups, "level");
    let mut best = DigParams::not_diggable();

    for (group, cap) in &caps.group_caps {
        let leveldiff = cap.max_level - level;
        if leveldiff < 0 {
            continue;
        }
        let Some(mut time) = cap.time_for(group_rating(groups, group)) else {
            continue;
        };
        if leveldiff > 1 {
            time /= leveldiff as f32;
        }
        if !best.diggable || time < best.time {
            let wear = if cap.uses == 0 {
                0.0
            } else {
                1.0 / cap.uses as f32 / 3f32.powi(leveldiff)
            };
            best = DigParams {
                diggable: true,
                time,
                wear,
                main_group: group.clone(),
            };
        }
    }

    best
}

/// Damage and wear of one punch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitParams {
    /// Hit points removed from the target.
    pub hp: i32,
    /// Fraction of the tool's life consumed.
    pub wear: f32,
}

/// Computes the damage `caps` deals to a target with `armor_groups`.
///
/// Damage scales linearly with the time since the last punch up to
/// `full_punch_interval`. Armor ratings are percentages.
pub fn hit_params(armor_groups: &Groups, caps: &ToolCapabilities, time_from_last_punch: f32) -> HitParams {
    let strength = if caps.full_punch_interval > 0.0 {
        (time_from_last_punch / caps.full_punch_interval).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let mut hp = 0i32;
    for (group, damage) in &caps.damage_groups {
        let armor = group_rating(armor_groups, group);
        hp = (hp as f32 + *damage as f32 * strength * armor as f32 / 100.0) as i32;
    }

    let wear = if caps.punch_attack_uses > 0 {
        strength / caps.punch_attack_uses as f32
    } else {
        0.0
    };

    HitParams { hp, wear }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(pairs: &[(&str, i32)]) -> Groups {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn pick() -> ToolCapabilities {
        ToolCapabilities::default().with_group_cap(
            "cracky",
            ToolGroupCap {
                times: BTreeMap::from([(1, 4.0), (2, 1.6), (3, 0.8)]),
                uses: 20,
                max_level: 2,
            },
        )
    }

    #[test]
    fn test_dig_immediate_ratings() {
        let caps = ToolCapabilities::default();
        let fast = dig_params(&groups(&[("dig_immediate", 2)]), &caps);
        assert!(fast.diggable);
        assert_eq!(fast.time, 0.5);

        let instant = dig_params(&groups(&[("dig_immediate", 3)]), &caps);
        assert!(instant.diggable);
        assert_eq!(instant.time, 0.0);
        assert_eq!(instant.main_group, "dig_immediate");
    }

    #[test]
    fn test_no_matching_group_is_not_diggable() {
        let params = dig_params(&groups(&[("crumbly", 3)]), &pick());
        assert!(!params.diggable);
    }

    #[test]
    fn test_rating_selects_time() {
        let params = dig_params(&groups(&[("cracky", 3)]), &pick());
        assert!(params.diggable);
        assert_eq!(params.main_group, "cracky");
        // leveldiff 2 halves the time.
        assert_eq!(params.time, 0.4);
        assert!((params.wear - 1.0 / 20.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_level_above_max_level_blocks_dig() {
        let params = dig_params(&groups(&[("cracky", 3), ("level", 3)]), &pick());
        assert!(!params.diggable);
    }

    #[test]
    fn test_fastest_group_wins() {
        let caps = pick().with_group_cap(
            "crumbly",
            ToolGroupCap {
                times: BTreeMap::from([(3, 0.1)]),
                uses: 0,
                max_level: 1,
            },
        );
        let params = dig_params(&groups(&[("cracky", 3), ("crumbly", 3)]), &caps);
        assert_eq!(params.main_group, "crumbly");
        assert_eq!(params.time, 0.1);
        assert_eq!(params.wear, 0.0);
    }

    #[test]
    fn test_hit_scales_with_punch_interval() {
        let caps = ToolCapabilities {
            full_punch_interval: 1.0,
            ..ToolCapabilities::default()
        }
        .with_damage("fleshy", 4);
        let armor = groups(&[("fleshy", 100)]);

        assert_eq!(hit_params(&armor, &caps, 1.0).hp, 4);
        assert_eq!(hit_params(&armor, &caps, 5.0).hp, 4);
        assert_eq!(hit_params(&armor, &caps, 0.5).hp, 2);
        assert_eq!(hit_params(&groups(&[]), &caps, 1.0).hp, 0);
    }
}

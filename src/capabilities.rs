// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability discovery from field names.
//!
//! Shelly devices do not describe their outputs in any schema. What they do
//! expose is a configuration document whose keys follow fixed conventions:
//! a Gen1 device with two relays reports `relays_0_ison` and `relays_1_ison`
//! under `/settings`, a Gen2 device with a cover reports
//! `configuration_cover_0_id` under `/rpc/shelly.GetConfig`.
//!
//! An [`EntityPattern`] turns these names into [`Command`]s. Each pattern is
//! a regex whose first capture selects the [`EntityKind`] through a lookup
//! table and whose second capture is the zero-based entity index. Supporting
//! another device family means adding a table row, not a branch.
//!
//! # Examples
//!
//! ```
//! use shelly_bridge::capabilities::GEN1_ENTITIES;
//! use shelly_bridge::field::{FieldType, PropertyField};
//!
//! let fields = [
//!     PropertyField::new("settings_relays_0_ison", FieldType::Boolean),
//!     PropertyField::new("settings_relays_0_power", FieldType::Number),
//! ];
//! let catalog = GEN1_ENTITIES.discover(&fields);
//!
//! // Both fields describe relay 0, so they collapse into one command
//! assert_eq!(catalog.len(), 1);
//! assert_eq!(catalog[0].options()[0].action(), "relay/0?turn=on");
//! ```

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::command::{Command, EntityKind};
use crate::field::PropertyField;

static GEN1_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(relays|lights|rollers)_(\d+)_(ison|power)").expect("valid Gen1 entity regex")
});

static GEN2_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"configuration_(cover|switch|light)_(\d+)_id").expect("valid Gen2 entity regex")
});

/// Entities of Gen1 devices, found in the `Settings` group.
pub static GEN1_ENTITIES: EntityPattern = EntityPattern {
    regex: &GEN1_FIELD,
    kinds: &[
        ("relays", EntityKind::Relay),
        ("lights", EntityKind::Light),
        ("rollers", EntityKind::Roller),
    ],
};

/// Entities of Gen2 devices, found in the `Configuration` group.
pub static GEN2_ENTITIES: EntityPattern = EntityPattern {
    regex: &GEN2_FIELD,
    kinds: &[
        ("switch", EntityKind::Switch),
        ("light", EntityKind::RpcLight),
        ("cover", EntityKind::Cover),
    ],
};

/// A field-name pattern and the entity kinds its first capture selects.
#[derive(Debug)]
pub struct EntityPattern {
    regex: &'static LazyLock<Regex>,
    kinds: &'static [(&'static str, EntityKind)],
}

impl EntityPattern {
    /// Returns the entity a field name refers to, if any.
    ///
    /// The pattern is searched anywhere in the name, so group prefixes such
    /// as `settings_` do not matter.
    #[must_use]
    pub fn entity(&self, field_name: &str) -> Option<(EntityKind, u32)> {
        let caps = self.regex.captures(field_name)?;
        let tag = caps.get(1)?.as_str();

        let Some(kind) = self.kind(tag) else {
            tracing::debug!(field = field_name, tag, "Skipping unknown entity kind");
            return None;
        };

        match caps.get(2)?.as_str().parse::<u32>() {
            Ok(index) => Some((kind, index)),
            Err(e) => {
                tracing::debug!(field = field_name, error = %e, "Skipping entity index");
                None
            }
        }
    }

    /// Builds the sorted, deduplicated command catalog for a field set.
    ///
    /// Fields that match no entity are ignored; an empty or unrelated field
    /// set gives an empty catalog.
    #[must_use]
    pub fn discover<'a, I>(&self, fields: I) -> Vec<Command>
    where
        I: IntoIterator<Item = &'a PropertyField>,
    {
        let catalog: BTreeSet<Command> = fields
            .into_iter()
            .filter_map(|field| self.entity(field.name()))
            .map(|(kind, index)| Command::for_entity(kind, index))
            .collect();

        tracing::debug!(commands = catalog.len(), "Discovered commands");

        catalog.into_iter().collect()
    }

    fn kind(&self, tag: &str) -> Option<EntityKind> {
        self.kinds
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, kind)| *kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn fields(names: &[&str]) -> Vec<PropertyField> {
        names
            .iter()
            .map(|n| PropertyField::new(*n, FieldType::Boolean))
            .collect()
    }

    #[test]
    fn gen1_relay_fields_collapse_to_one_command() {
        let catalog = GEN1_ENTITIES.discover(&fields(&[
            "settings_relays_0_ison",
            "settings_relays_0_power",
        ]));

        assert_eq!(catalog.len(), 1);
        let actions: Vec<&str> = catalog[0].options().iter().map(|o| o.action()).collect();
        assert_eq!(
            actions,
            vec!["relay/0?turn=on", "relay/0?turn=off", "relay/0?turn=toggle"]
        );
        assert_eq!(catalog[0].label_key(), "shelly.relay");
    }

    #[test]
    fn gen1_catalog_sorted_by_entity_index() {
        let catalog = GEN1_ENTITIES.discover(&fields(&[
            "settings_relays_2_ison",
            "settings_relays_0_ison",
            "settings_relays_1_ison",
        ]));

        let order: Vec<u32> = catalog.iter().map(Command::sort_index).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(catalog[2].options()[0].action(), "relay/2?turn=on");
    }

    #[test]
    fn gen1_rollers_have_thirteen_options() {
        let catalog = GEN1_ENTITIES.discover(&fields(&["settings_rollers_0_power"]));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].options().len(), 13);
        assert_eq!(catalog[0].label_key(), "shelly.roller");
    }

    #[test]
    fn gen1_lights() {
        let catalog = GEN1_ENTITIES.discover(&fields(&["settings_lights_0_ison"]));
        assert_eq!(catalog[0].options()[2].action(), "light/0?turn=toggle");
    }

    #[test]
    fn gen2_cover_has_position_options() {
        let catalog = GEN2_ENTITIES.discover(&fields(&["configuration_cover_1_id"]));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].options().len(), 13);
        assert_eq!(catalog[0].sort_index(), 2);
        assert!(
            catalog[0]
                .options()
                .iter()
                .any(|o| o.action() == "Cover.GoToPosition?id=1&pos=50")
        );
    }

    #[test]
    fn gen2_switch_and_light() {
        let catalog = GEN2_ENTITIES.discover(&fields(&[
            "configuration_switch_0_id",
            "configuration_light_0_id",
            "configuration_switch_0_name",
        ]));

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].label_key(), "shelly.light");
        assert_eq!(catalog[0].options()[0].action(), "Light.Set?id=0&on=true");
        assert_eq!(catalog[1].options()[2].action(), "Switch.Toggle?id=0");
    }

    #[test]
    fn discovery_is_idempotent() {
        let input = fields(&[
            "settings_relays_1_ison",
            "settings_rollers_0_power",
            "settings_relays_0_ison",
            "settings_relays_1_power",
        ]);
        assert_eq!(GEN1_ENTITIES.discover(&input), GEN1_ENTITIES.discover(&input));
    }

    #[test]
    fn empty_or_unrelated_fields_yield_empty_catalog() {
        assert!(GEN1_ENTITIES.discover(&fields(&[])).is_empty());
        assert!(
            GEN1_ENTITIES
                .discover(&fields(&["settings_name", "settings_wifi_sta_ip"]))
                .is_empty()
        );
        // Gen2 names are not Gen1 entities and vice versa
        assert!(GEN1_ENTITIES.discover(&fields(&["configuration_switch_0_id"])).is_empty());
        assert!(GEN2_ENTITIES.discover(&fields(&["settings_relays_0_ison"])).is_empty());
    }

    #[test]
    fn oversized_index_is_skipped() {
        assert!(GEN1_ENTITIES.entity("relays_99999999999_ison").is_none());
    }

    #[test]
    fn entity_lookup() {
        assert_eq!(
            GEN2_ENTITIES.entity("configuration_cover_3_id"),
            Some((EntityKind::Cover, 3))
        );
        assert_eq!(GEN2_ENTITIES.entity("configuration_input_0_id"), None);
    }
}

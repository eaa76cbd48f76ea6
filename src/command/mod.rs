// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command catalog entries.
//!
//! A [`Command`] stands for one controllable entity (one relay, one roller,
//! one cover, ...). Its options are [`ValueText`] pairs: a partial action
//! string the device understands and a localization key for the label the
//! user sees. Dispatching an option appends the action string to the
//! generation's base URL.
//!
//! # Entity Kinds
//!
//! | Kind | Generation | Label key | Example action |
//! |------|------------|-----------|----------------|
//! | [`EntityKind::Relay`] | 1 | `shelly.relay` | `relay/0?turn=on` |
//! | [`EntityKind::Light`] | 1 | `shelly.light` | `light/0?turn=toggle` |
//! | [`EntityKind::Roller`] | 1 | `shelly.roller` | `roller/0/go=to_pos&roller_pos=50` |
//! | [`EntityKind::Switch`] | 2 | `shelly.relay` | `Switch.Set?id=0&on=true` |
//! | [`EntityKind::RpcLight`] | 2 | `shelly.light` | `Light.Toggle?id=0` |
//! | [`EntityKind::Cover`] | 2 | `shelly.roller` | `Cover.GoToPosition?id=0&pos=50` |
//!
//! # Examples
//!
//! ```
//! use shelly_bridge::command::{Command, EntityKind};
//!
//! let cmd = Command::for_entity(EntityKind::Relay, 0);
//! assert_eq!(cmd.label_key(), "shelly.relay");
//! assert_eq!(cmd.sort_index(), 1);
//! assert_eq!(cmd.options()[0].action(), "relay/0?turn=on");
//! ```

pub mod options;

use serde::{Deserialize, Serialize};

/// Group label shared by every command of this library.
pub const GROUP_LABEL: &str = "Shelly";

/// Kind of controllable entity found on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Gen1 relay output (`/relay/{i}`).
    Relay,
    /// Gen1 light output (`/light/{i}`).
    Light,
    /// Gen1 roller shutter (`/roller/{i}`).
    Roller,
    /// Gen2 switch component (`Switch.*`).
    Switch,
    /// Gen2 light component (`Light.*`).
    RpcLight,
    /// Gen2 cover component (`Cover.*`).
    Cover,
}

impl EntityKind {
    /// Returns the localization key of the command label.
    #[must_use]
    pub const fn label_key(self) -> &'static str {
        match self {
            Self::Relay | Self::Switch => "shelly.relay",
            Self::Light | Self::RpcLight => "shelly.light",
            Self::Roller | Self::Cover => "shelly.roller",
        }
    }

    /// Builds the option list for the entity at `index`.
    #[must_use]
    pub fn options(self, index: u32) -> Vec<ValueText> {
        match self {
            Self::Relay => options::turn("relay", index),
            Self::Light => options::turn("light", index),
            Self::Roller => options::roller(index),
            Self::Switch => options::rpc_set("Switch", index),
            Self::RpcLight => options::rpc_set("Light", index),
            Self::Cover => options::rpc_cover(index),
        }
    }
}

/// One selectable option of a command.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValueText {
    action: String,
    label_key: String,
}

impl ValueText {
    /// Creates an option.
    #[must_use]
    pub fn new(action: impl Into<String>, label_key: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            label_key: label_key.into(),
        }
    }

    /// Returns the partial action string appended to the base URL.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the localization key of the option label.
    #[must_use]
    pub fn label_key(&self) -> &str {
        &self.label_key
    }

    /// Returns the position value of a roller/cover position option.
    ///
    /// Label resolution needs the literal numeral, e.g. `50` for
    /// `shelly.roller.position.50`.
    #[must_use]
    pub fn position(&self) -> Option<u8> {
        self.label_key
            .strip_prefix(options::POSITION_PREFIX)
            .and_then(|p| p.parse().ok())
    }
}

/// One controllable entity with its options.
///
/// Commands compare by value; the derived ordering sorts by `sort_index`
/// first, then by label, which is the catalog order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Command {
    sort_index: u32,
    label_key: String,
    group_label: String,
    category: Option<String>,
    options: Vec<ValueText>,
}

impl Command {
    /// Creates a command.
    #[must_use]
    pub fn new(
        group_label: impl Into<String>,
        label_key: impl Into<String>,
        options: Vec<ValueText>,
        sort_index: u32,
    ) -> Self {
        Self {
            sort_index,
            label_key: label_key.into(),
            group_label: group_label.into(),
            category: None,
            options,
        }
    }

    /// Creates the command for an entity, sorting entity `i` at `i + 1`.
    #[must_use]
    pub fn for_entity(kind: EntityKind, index: u32) -> Self {
        Self::new(
            GROUP_LABEL,
            kind.label_key(),
            kind.options(index),
            index.saturating_add(1),
        )
    }

    /// Returns the group label.
    #[must_use]
    pub fn group_label(&self) -> &str {
        &self.group_label
    }

    /// Returns the localization key of the command label.
    #[must_use]
    pub fn label_key(&self) -> &str {
        &self.label_key
    }

    /// Returns the options in presentation order.
    #[must_use]
    pub fn options(&self) -> &[ValueText] {
        &self.options
    }

    /// Returns the category. Always `None` for discovered commands.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the sort index.
    #[must_use]
    pub fn sort_index(&self) -> u32 {
        self.sort_index
    }

    /// Finds the option with the given action string.
    #[must_use]
    pub fn option(&self, action: &str) -> Option<&ValueText> {
        self.options.iter().find(|o| o.action == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_labels() {
        assert_eq!(EntityKind::Switch.label_key(), "shelly.relay");
        assert_eq!(EntityKind::RpcLight.label_key(), "shelly.light");
        assert_eq!(EntityKind::Cover.label_key(), "shelly.roller");
    }

    #[test]
    fn sort_index_is_entity_index_plus_one() {
        assert_eq!(Command::for_entity(EntityKind::Roller, 0).sort_index(), 1);
        assert_eq!(Command::for_entity(EntityKind::Roller, 2).sort_index(), 3);
    }

    #[test]
    fn ordering_prefers_sort_index_over_label() {
        let light_0 = Command::for_entity(EntityKind::Light, 0);
        let relay_1 = Command::for_entity(EntityKind::Relay, 1);
        let relay_0 = Command::for_entity(EntityKind::Relay, 0);

        let mut catalog = vec![relay_1.clone(), relay_0.clone(), light_0.clone()];
        catalog.sort();

        assert_eq!(catalog, vec![light_0, relay_0, relay_1]);
    }

    #[test]
    fn equal_entities_are_equal_commands() {
        assert_eq!(
            Command::for_entity(EntityKind::Cover, 1),
            Command::for_entity(EntityKind::Cover, 1)
        );
        assert_ne!(
            Command::for_entity(EntityKind::Cover, 1),
            Command::for_entity(EntityKind::Cover, 2)
        );
    }

    #[test]
    fn position_of_options() {
        let cover = Command::for_entity(EntityKind::Cover, 0);
        let positions: Vec<u8> = cover.options().iter().filter_map(ValueText::position).collect();
        assert_eq!(positions, vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        assert_eq!(cover.options()[0].position(), None);
    }

    #[test]
    fn find_option_by_action() {
        let relay = Command::for_entity(EntityKind::Relay, 0);
        let option = relay.option("relay/0?turn=toggle").unwrap();
        assert_eq!(option.label_key(), "shelly.option.toggle");
        assert!(relay.option("relay/1?turn=toggle").is_none());
    }

    #[test]
    fn commands_have_no_category() {
        assert!(Command::for_entity(EntityKind::Switch, 0).category().is_none());
        assert_eq!(Command::for_entity(EntityKind::Switch, 0).group_label(), "Shelly");
    }
}

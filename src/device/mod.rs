// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level device abstraction for Shelly devices.
//!
//! A [`Device`] is created through a [`DeviceBuilder`], which probes the
//! device once to find out which generation it is and binds to the matching
//! adapter for good. From then on every poll and command goes through that
//! adapter; there is no way to re-probe a built device.
//!
//! ```no_run
//! use shelly_bridge::{Device, Variables};
//!
//! # async fn example() -> shelly_bridge::Result<()> {
//! let device = Device::http("192.168.1.100")
//!     .with_credentials("admin", "password")
//!     .build()
//!     .await?;
//!
//! let mut variables = Variables::new();
//! device.poll(&mut variables).await?;
//!
//! if let Some(relay) = device.commands().first() {
//!     device.send_command(relay.options()[0].action()).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Resuming
//!
//! Discovery fetches every endpoint of the device. Its outcome can be saved
//! with [`Device::record`] and handed back through
//! [`DeviceBuilder::with_record`] so the next start only probes.

mod http_builder;

pub use http_builder::DeviceBuilder;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::{DeviceError, Error, Result};
use crate::field::Variables;
use crate::generation::{Adapter, Generation};
use crate::property::{PollSource, PropertyGroup};
use crate::protocol::HttpConfig;
use crate::table::Table;

/// Everything learned about a device that is worth keeping across restarts.
///
/// Caches are not part of the record; restored groups fetch on first poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Generation the device was bound to.
    pub generation: Generation,
    /// Discovered property groups.
    pub groups: Vec<Arc<PropertyGroup>>,
    /// Command catalog.
    pub commands: Vec<Command>,
    /// Measurement tables.
    pub tables: Vec<Table>,
}

/// A Shelly device bound to one generation.
#[derive(Debug)]
pub struct Device {
    adapter: Adapter,
    groups: Vec<Arc<PropertyGroup>>,
    commands: Vec<Command>,
    tables: Vec<Table>,
}

impl Device {
    /// Recommended interval between two [`poll`](Self::poll) calls.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

    pub(crate) fn new(
        adapter: Adapter,
        groups: Vec<Arc<PropertyGroup>>,
        commands: Vec<Command>,
        tables: Vec<Table>,
    ) -> Self {
        Self {
            adapter,
            groups,
            commands,
            tables,
        }
    }

    /// Creates a builder for a device at `host`.
    ///
    /// Equivalent to `Device::http_config(HttpConfig::new(host))`.
    #[must_use]
    pub fn http(host: impl Into<String>) -> DeviceBuilder {
        DeviceBuilder::new(HttpConfig::new(host))
    }

    /// Creates a builder from a full [`HttpConfig`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use shelly_bridge::Device;
    /// use shelly_bridge::protocol::HttpConfig;
    ///
    /// # async fn example() -> shelly_bridge::Result<()> {
    /// let config = HttpConfig::new("192.168.1.100")
    ///     .with_port(8080)
    ///     .with_credentials("admin", "password");
    ///
    /// let device = Device::http_config(config).build().await?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn http_config(config: HttpConfig) -> DeviceBuilder {
        DeviceBuilder::new(config)
    }

    /// Returns the generation the device is bound to.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.adapter.generation()
    }

    /// Returns the property groups in poll order.
    #[must_use]
    pub fn groups(&self) -> &[Arc<PropertyGroup>] {
        &self.groups
    }

    /// Returns the command catalog, sorted by entity index.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns the measurement tables (Gen1 meters only).
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Returns the state needed to resume this device without discovery.
    #[must_use]
    pub fn record(&self) -> DeviceRecord {
        DeviceRecord {
            generation: self.generation(),
            groups: self.groups.clone(),
            commands: self.commands.clone(),
            tables: self.tables.clone(),
        }
    }

    /// Points the device at a new address or credentials.
    ///
    /// The generation and everything discovered stay as they are.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn reconfigure(&self, config: HttpConfig) -> Result<()> {
        tracing::debug!(host = config.host(), port = config.port(), "Reconfiguring device");
        self.adapter.bind(config)
    }

    /// Polls every group in order and projects the values into `variables`.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error; groups after it are not polled.
    pub async fn poll(&self, variables: &mut Variables) -> Result<()> {
        for group in &self.groups {
            self.adapter.poll_group(group, variables).await?;
        }
        Ok(())
    }

    /// Polls a single group by name.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnknownGroup`] if no group has this name, or
    /// the fetch error if the device could not be reached.
    pub async fn poll_group(&self, name: &str, variables: &mut Variables) -> Result<PollSource> {
        let group = self
            .groups
            .iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| Error::Device(DeviceError::UnknownGroup(name.to_string())))?;
        self.adapter.poll_group(group, variables).await
    }

    /// Sends one action string of the catalog, e.g. `relay/0?turn=on`.
    ///
    /// The device's answer is not inspected.
    ///
    /// # Errors
    ///
    /// Returns error only if the request could not be delivered.
    pub async fn send_command(&self, action: &str) -> Result<()> {
        tracing::debug!(action, generation = %self.generation(), "Dispatching command");
        self.adapter.dispatch(action).await
    }
}

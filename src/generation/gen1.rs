// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gen1 adapter (`/settings`, `/status`, `/shelly`).

use std::sync::Arc;

use crate::capabilities::GEN1_ENTITIES;
use crate::command::Command;
use crate::error::Result;
use crate::field::{PropertyField, Snapshot};
use crate::protocol::HttpConfig;
use crate::table::{self, Table};

use super::{Connection, Discovery, GroupSpec, PROBE_ENDPOINT};

/// Base URL template of every Gen1 endpoint.
pub(crate) const BASE_URL: &str = "http://{provider_host}/";

const SETTINGS: GroupSpec = GroupSpec {
    name: "Settings",
    path: "settings",
    prefix: "settings",
    cache_ttl_secs: 3600,
};

const STATUS: GroupSpec = GroupSpec {
    name: "Status",
    path: "status",
    prefix: "status",
    cache_ttl_secs: 0,
};

const SHELLY: GroupSpec = GroupSpec {
    name: "Shelly",
    path: "shelly",
    prefix: "shelly",
    cache_ttl_secs: 3600,
};

/// Adapter for Gen1 devices.
///
/// Settings and Shelly snapshots are cached for an hour; Status is fetched
/// on every poll. Commands come from the relays, lights and rollers listed in
/// the settings.
#[derive(Debug)]
pub struct Gen1Adapter {
    pub(super) connection: Connection,
}

impl Gen1Adapter {
    /// Creates an adapter for the configured device.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: HttpConfig) -> Result<Self> {
        Ok(Self {
            connection: Connection::new(config)?,
        })
    }

    /// Replaces the connection configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn bind(&self, config: HttpConfig) -> Result<()> {
        self.connection.bind(config)
    }

    /// Fetches Settings, Status and Shelly, in that order.
    ///
    /// All three groups are kept even when a response had no fields.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be reached.
    pub async fn initialize(&self) -> Result<Discovery> {
        let client = self.connection.client();

        let settings = SETTINGS.discover(&client, BASE_URL).await?;
        let status = STATUS.discover(&client, BASE_URL).await?;
        let shelly = SHELLY.discover(&client, BASE_URL).await?;

        let commands = Self::discover_commands(settings.fields());
        tracing::debug!(commands = commands.len(), "Available commands");

        Ok(Discovery {
            groups: vec![Arc::new(settings), Arc::new(status), Arc::new(shelly)],
            commands,
        })
    }

    /// Fetches the top-level values of `/shelly`, keys as sent.
    ///
    /// Both generations answer this endpoint, which makes it the probe used
    /// to tell them apart.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be reached.
    pub async fn standard_values(&self) -> Result<Snapshot> {
        let probe = self.connection.client().fetch_top_level(PROBE_ENDPOINT).await?;
        Ok(probe.unwrap_or_default())
    }

    /// Returns the configured device name from `/settings`, or an empty
    /// string if none is set.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be reached.
    pub async fn name(&self) -> Result<String> {
        let settings = self
            .connection
            .client()
            .fetch_top_level(&format!("{BASE_URL}{}", SETTINGS.path))
            .await?
            .unwrap_or_default();
        Ok(settings
            .get("name")
            .map(ToString::to_string)
            .unwrap_or_default())
    }

    /// Derives commands from Settings fields such as `settings_relays_0_ison`.
    #[must_use]
    pub fn discover_commands<'a, I>(fields: I) -> Vec<Command>
    where
        I: IntoIterator<Item = &'a PropertyField>,
    {
        GEN1_ENTITIES.discover(fields)
    }

    /// Builds the `AC`/`Service` tables from Status fields.
    #[must_use]
    pub fn project_tables<'a, I>(fields: I) -> Vec<Table>
    where
        I: IntoIterator<Item = &'a PropertyField>,
    {
        table::project_gen1(fields)
    }
}

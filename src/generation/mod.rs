// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol adapters for the two Shelly device generations.
//!
//! Gen1 devices expose flat endpoints (`/settings`, `/status`,
//! `/relay/0?turn=on`); Gen2 devices expose RPC methods under `/rpc/`
//! (`shelly.GetConfig`, `Switch.Set?id=0&on=true`). Both answer `/shelly`
//! with a small identification document, and only Gen2 puts a `model` key in
//! it. That key is what [`Generation::from_probe`] looks at.
//!
//! [`Adapter`] offers the same operations for both generations. The set of
//! generations is closed, so it is an enum chosen once when a device is
//! bound, not a trait object.

mod gen1;
mod gen2;

pub use gen1::Gen1Adapter;
pub use gen2::Gen2Adapter;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::{Error, Result};
use crate::field::{PropertyField, Snapshot, Variables, fields_of};
use crate::property::{PollSource, PropertyGroup};
use crate::protocol::{HttpClient, HttpConfig};
use crate::table::Table;

/// Probe endpoint understood by both generations.
pub const PROBE_ENDPOINT: &str = "http://{provider_host}/shelly";

/// Key that only Gen2 devices put into the probe response.
pub const GEN2_PROBE_KEY: &str = "model";

/// Shelly device generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    /// Legacy flat-endpoint API.
    Gen1,
    /// RPC API under `/rpc/`.
    Gen2,
}

impl Generation {
    /// Determines the generation from a `/shelly` probe response.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelly_bridge::field::parse_top_level;
    /// use shelly_bridge::Generation;
    ///
    /// let gen1 = parse_top_level(r#"{"type": "SHSW-1", "mac": "A4CF12F4"}"#);
    /// let gen2 = parse_top_level(r#"{"model": "SNSW-001X16EU", "gen": 2}"#);
    ///
    /// assert_eq!(Generation::from_probe(&gen1), Generation::Gen1);
    /// assert_eq!(Generation::from_probe(&gen2), Generation::Gen2);
    /// ```
    #[must_use]
    pub fn from_probe(probe: &Snapshot) -> Self {
        if probe.contains_key(GEN2_PROBE_KEY) {
            Self::Gen2
        } else {
            Self::Gen1
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gen1 => f.write_str("Gen1"),
            Self::Gen2 => f.write_str("Gen2"),
        }
    }
}

/// Result of first-run discovery.
#[derive(Debug)]
pub struct Discovery {
    /// Property groups to poll, in fetch order.
    pub groups: Vec<Arc<PropertyGroup>>,
    /// Command catalog derived from the configuration group.
    pub commands: Vec<Command>,
}

/// A protocol adapter bound to one generation.
#[derive(Debug)]
pub enum Adapter {
    /// Gen1 adapter.
    Gen1(Gen1Adapter),
    /// Gen2 adapter.
    Gen2(Gen2Adapter),
}

impl Adapter {
    /// Creates the adapter for `generation`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(generation: Generation, config: HttpConfig) -> Result<Self> {
        Ok(match generation {
            Generation::Gen1 => Self::Gen1(Gen1Adapter::new(config)?),
            Generation::Gen2 => Self::Gen2(Gen2Adapter::new(config)?),
        })
    }

    /// Returns the generation this adapter speaks.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        match self {
            Self::Gen1(_) => Generation::Gen1,
            Self::Gen2(_) => Generation::Gen2,
        }
    }

    /// Replaces the connection configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn bind(&self, config: HttpConfig) -> Result<()> {
        match self {
            Self::Gen1(adapter) => adapter.bind(config),
            Self::Gen2(adapter) => adapter.bind(config),
        }
    }

    /// Fetches every property group and derives the command catalog.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be reached.
    pub async fn initialize(&self) -> Result<Discovery> {
        match self {
            Self::Gen1(adapter) => adapter.initialize().await,
            Self::Gen2(adapter) => adapter.initialize().await,
        }
    }

    /// Projects the group's values into `variables`, fetching if the cache
    /// is stale.
    ///
    /// # Errors
    ///
    /// Returns error if a fetch is needed and fails.
    pub async fn poll_group(
        &self,
        group: &PropertyGroup,
        variables: &mut Variables,
    ) -> Result<PollSource> {
        let client = self.connection().client();
        group.poll(&client, variables).await.map_err(Error::Protocol)
    }

    /// Sends an action string to the device, ignoring the response.
    ///
    /// # Errors
    ///
    /// Returns error only on transport failure.
    pub async fn dispatch(&self, action: &str) -> Result<()> {
        let template = format!("{}{action}", self.base_url());
        self.connection()
            .client()
            .send(&template)
            .await
            .map_err(Error::Protocol)
    }

    /// Derives the command catalog from configuration fields.
    #[must_use]
    pub fn discover_commands<'a, I>(&self, fields: I) -> Vec<Command>
    where
        I: IntoIterator<Item = &'a PropertyField>,
    {
        match self {
            Self::Gen1(_) => Gen1Adapter::discover_commands(fields),
            Self::Gen2(_) => Gen2Adapter::discover_commands(fields),
        }
    }

    /// Builds measurement tables from status fields. Gen2 has none.
    #[must_use]
    pub fn project_tables<'a, I>(&self, fields: I) -> Vec<Table>
    where
        I: IntoIterator<Item = &'a PropertyField>,
    {
        match self {
            Self::Gen1(_) => Gen1Adapter::project_tables(fields),
            Self::Gen2(_) => Gen2Adapter::project_tables(fields),
        }
    }

    /// Returns the base URL template actions are appended to.
    #[must_use]
    pub const fn base_url(&self) -> &'static str {
        match self {
            Self::Gen1(_) => gen1::BASE_URL,
            Self::Gen2(_) => gen2::BASE_URL,
        }
    }

    fn connection(&self) -> &Connection {
        match self {
            Self::Gen1(adapter) => &adapter.connection,
            Self::Gen2(adapter) => &adapter.connection,
        }
    }
}

/// Swappable HTTP client of an adapter.
#[derive(Debug)]
pub(crate) struct Connection {
    client: RwLock<HttpClient>,
}

impl Connection {
    pub(crate) fn new(config: HttpConfig) -> Result<Self> {
        Ok(Self {
            client: RwLock::new(config.into_client()?),
        })
    }

    pub(crate) fn bind(&self, config: HttpConfig) -> Result<()> {
        let client = config.into_client()?;
        *self.client.write() = client;
        Ok(())
    }

    /// Clones the current client so no lock is held across a request.
    pub(crate) fn client(&self) -> HttpClient {
        self.client.read().clone()
    }
}

/// Static description of one property group of a generation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GroupSpec {
    pub(crate) name: &'static str,
    pub(crate) path: &'static str,
    pub(crate) prefix: &'static str,
    pub(crate) cache_ttl_secs: u64,
}

impl GroupSpec {
    /// Fetches the group once and records the fields found.
    ///
    /// An error status counts as a group without fields and seeds no cache.
    pub(crate) async fn discover(&self, client: &HttpClient, base_url: &str) -> Result<PropertyGroup> {
        let endpoint = format!("{base_url}{}", self.path);
        let snapshot = client.fetch_snapshot(&endpoint, self.prefix).await?;
        let fields = snapshot.as_ref().map(fields_of).unwrap_or_default();

        tracing::debug!(group = self.name, fields = fields.len(), "Discovered property group");

        let group = PropertyGroup::new(self.name, endpoint, self.prefix, fields, self.cache_ttl_secs);
        Ok(match snapshot {
            Some(values) => group.with_snapshot(values),
            None => group,
        })
    }
}

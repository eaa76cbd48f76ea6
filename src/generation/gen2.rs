// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gen2 adapter (`/rpc/shelly.GetConfig`, `/rpc/sys.GetStatus`, ...).

use std::sync::Arc;

use crate::capabilities::GEN2_ENTITIES;
use crate::command::Command;
use crate::error::Result;
use crate::field::PropertyField;
use crate::protocol::HttpConfig;
use crate::table::Table;

use super::{Connection, Discovery, GroupSpec};

/// Base URL template of every Gen2 RPC call.
pub(crate) const BASE_URL: &str = "http://{provider_host}/rpc/";

/// Groups in fetch order. Field prefixes are the lowercased group names.
const GROUPS: [GroupSpec; 6] = [
    GroupSpec {
        name: "Configuration",
        path: "shelly.GetConfig",
        prefix: "configuration",
        cache_ttl_secs: 1810,
    },
    GroupSpec {
        name: "SysConfiguration",
        path: "sys.GetConfig",
        prefix: "sysconfiguration",
        cache_ttl_secs: 3600,
    },
    GroupSpec {
        name: "SysStatus",
        path: "sys.GetStatus",
        prefix: "sysstatus",
        cache_ttl_secs: 3600,
    },
    GroupSpec {
        name: "Status",
        path: "shelly.GetStatus",
        prefix: "status",
        cache_ttl_secs: 0,
    },
    GroupSpec {
        name: "Components",
        path: "shelly.GetComponents",
        prefix: "components",
        cache_ttl_secs: 0,
    },
    GroupSpec {
        name: "DeviceInfo",
        path: "shelly.GetDeviceInfo",
        prefix: "deviceinfo",
        cache_ttl_secs: 3600,
    },
];

/// Adapter for Gen2 (Plus, Pro, Mini and later) devices.
///
/// Which RPC endpoints exist depends on the model and firmware, so groups
/// whose response carried no fields are left out. Commands come from the
/// switch, light and cover components in `shelly.GetConfig`.
#[derive(Debug)]
pub struct Gen2Adapter {
    pub(super) connection: Connection,
}

impl Gen2Adapter {
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

    /// Fetches every RPC group and keeps those that returned fields.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be reached.
    pub async fn initialize(&self) -> Result<Discovery> {
        let client = self.connection.client();

        let mut groups = Vec::with_capacity(GROUPS.len());
        for spec in &GROUPS {
            let group = spec.discover(&client, BASE_URL).await?;
            if group.fields().is_empty() {
                tracing::debug!(group = spec.name, "Skipping group without fields");
            } else {
                groups.push(Arc::new(group));
            }
        }

        let commands = groups
            .iter()
            .find(|g| g.name() == GROUPS[0].name)
            .map(|config| Self::discover_commands(config.fields()))
            .unwrap_or_default();
        tracing::debug!(commands = commands.len(), "Available commands");

        Ok(Discovery { groups, commands })
    }

    /// Derives commands from Configuration fields such as
    /// `configuration_switch_0_id`.
    #[must_use]
    pub fn discover_commands<'a, I>(fields: I) -> Vec<Command>
    where
        I: IntoIterator<Item = &'a PropertyField>,
    {
        GEN2_ENTITIES.discover(fields)
    }

    /// Gen2 devices have no measurement tables.
    #[must_use]
    pub fn project_tables<'a, I>(_fields: I) -> Vec<Table>
    where
        I: IntoIterator<Item = &'a PropertyField>,
    {
        Vec::new()
    }
}

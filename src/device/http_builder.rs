// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP device builder.

use std::sync::Arc;

use crate::device::{Device, DeviceRecord};
use crate::error::Result;
use crate::generation::{Adapter, Discovery, Gen1Adapter, Generation};
use crate::property::PropertyGroup;
use crate::protocol::HttpConfig;
use crate::table::Table;

/// Name of the group Gen1 meter tables are projected from.
const STATUS_GROUP: &str = "Status";

/// Builder for creating [`Device`]s.
///
/// This builder can be created in two ways:
/// - `Device::http("host")` - Simple host string
/// - `Device::http_config(HttpConfig::new("host").with_port(8080))` - Advanced configuration
///
/// # Examples
///
/// ```no_run
/// use shelly_bridge::Device;
///
/// # async fn example() -> shelly_bridge::Result<()> {
/// // First start: probe and discover
/// let device = Device::http("192.168.1.100").build().await?;
/// let record = device.record();
///
/// // Later: probe only, reuse what was discovered
/// let device = Device::http("192.168.1.100")
///     .with_record(record)
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceBuilder {
    config: HttpConfig,
    record: Option<DeviceRecord>,
}

impl DeviceBuilder {
    /// Creates a new builder with the specified HTTP configuration.
    pub(crate) fn new(config: HttpConfig) -> Self {
        Self {
            config,
            record: None,
        }
    }

    /// Sets basic authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.config = self.config.with_credentials(username, password);
        self
    }

    /// Supplies the record of an earlier run.
    ///
    /// If it holds groups of the generation the probe reports, discovery is
    /// skipped and the recorded groups, commands and tables are used.
    #[must_use]
    pub fn with_record(mut self, record: DeviceRecord) -> Self {
        self.record = Some(record);
        self
    }

    /// Returns the record set through [`with_record`](Self::with_record).
    #[must_use]
    pub fn record(&self) -> Option<&DeviceRecord> {
        self.record.as_ref()
    }

    /// Probes the device, binds to its generation and discovers it.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The HTTP client cannot be created
    /// - The device cannot be reached during probing or discovery
    pub async fn build(self) -> Result<Device> {
        let probe = Gen1Adapter::new(self.config.clone())?
            .standard_values()
            .await?;
        let generation = Generation::from_probe(&probe);

        tracing::info!(
            host = self.config.host(),
            generation = %generation,
            "Bound device"
        );

        let record = self.record.filter(|record| {
            let usable = record.generation == generation && !record.groups.is_empty();
            if !usable {
                tracing::debug!(
                    recorded = %record.generation,
                    "Ignoring record, discovering again"
                );
            }
            usable
        });

        let adapter = Adapter::new(generation, self.config)?;

        let (groups, commands, tables) = match record {
            Some(record) => (record.groups, record.commands, record.tables),
            None => {
                let Discovery { groups, commands } = adapter.initialize().await?;
                (groups, commands, Vec::new())
            }
        };

        let tables = if tables.is_empty() {
            project_tables(&adapter, &groups)
        } else {
            tables
        };

        Ok(Device::new(adapter, groups, commands, tables))
    }

    /// Binds to `record` without contacting the device.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn resume(self, record: DeviceRecord) -> Result<Device> {
        let adapter = Adapter::new(record.generation, self.config)?;
        let tables = if record.tables.is_empty() {
            project_tables(&adapter, &record.groups)
        } else {
            record.tables
        };
        Ok(Device::new(adapter, record.groups, record.commands, tables))
    }
}

fn project_tables(adapter: &Adapter, groups: &[Arc<PropertyGroup>]) -> Vec<Table> {
    groups
        .iter()
        .find(|group| group.name() == STATUS_GROUP)
        .map(|status| adapter.project_tables(status.fields()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, EntityKind};
    use crate::field::{FieldType, PropertyField};
    use std::collections::BTreeSet;

    fn gen1_record() -> DeviceRecord {
        let fields = BTreeSet::from([
            PropertyField::new("status_meters_0_power", FieldType::Number),
            PropertyField::new("status_temperature", FieldType::Number),
        ]);
        DeviceRecord {
            generation: Generation::Gen1,
            groups: vec![Arc::new(PropertyGroup::new(
                "Status",
                "http://{provider_host}/status",
                "status",
                fields,
                0,
            ))],
            commands: vec![Command::for_entity(EntityKind::Relay, 0)],
            tables: Vec::new(),
        }
    }

    #[test]
    fn builder_new() {
        let builder = DeviceBuilder::new(HttpConfig::new("192.168.1.100"));
        assert!(builder.record().is_none());
    }

    #[test]
    fn builder_with_credentials() {
        let builder = DeviceBuilder::new(HttpConfig::new("192.168.1.100"))
            .with_credentials("admin", "secret");
        assert_eq!(builder.config.credentials(), Some(("admin", "secret")));
    }

    #[test]
    fn resume_projects_missing_tables() {
        let device = DeviceBuilder::new(HttpConfig::new("192.168.1.100"))
            .resume(gen1_record())
            .unwrap();

        assert_eq!(device.generation(), Generation::Gen1);
        assert_eq!(device.commands().len(), 1);
        let names: Vec<_> = device.tables().iter().map(Table::name).collect();
        assert_eq!(names, ["AC", "Service"]);
    }

    #[test]
    fn resume_keeps_recorded_tables() {
        let mut record = gen1_record();
        record.tables = vec![Table::new("AC")];

        let device = DeviceBuilder::new(HttpConfig::new("192.168.1.100"))
            .resume(record)
            .unwrap();

        assert_eq!(device.tables().len(), 1);
        assert!(device.tables()[0].columns().is_empty());
    }

    #[test]
    fn gen2_never_projects_tables() {
        let mut record = gen1_record();
        record.generation = Generation::Gen2;

        let device = DeviceBuilder::new(HttpConfig::new("192.168.1.100"))
            .resume(record)
            .unwrap();

        assert!(device.tables().is_empty());
    }
}

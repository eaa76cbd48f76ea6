// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `shelly_bridge` - Generation-agnostic control of Shelly devices over HTTP.
//!
//! Shelly devices come in two incompatible API generations: Gen1 with flat
//! endpoints such as `/settings` and `/relay/0?turn=on`, and Gen2 with RPC
//! methods such as `/rpc/shelly.GetConfig` and `/rpc/Switch.Set?id=0&on=true`.
//! This library probes a device once, binds to the right generation and then
//! offers a single interface to both.
//!
//! # Supported Features
//!
//! - **Generation detection**: one `GET /shelly`, bound for the device's lifetime
//! - **Capability discovery**: relays, lights, rollers, switches and covers
//!   inferred from configuration field names
//! - **Command catalog**: every entity with its on/off/toggle or
//!   open/close/position options as ready-to-send action strings
//! - **Polling**: per-endpoint snapshot caches with their own lifetimes
//! - **Meter tables**: Gen1 power meters laid out per phase
//! - **Connection test**: device name and model from the identifier table
//!
//! # Quick Start
//!
//! ```no_run
//! use shelly_bridge::{Device, Variables};
//!
//! #[tokio::main]
//! async fn main() -> shelly_bridge::Result<()> {
//!     let device = Device::http("192.168.1.100").build().await?;
//!     println!("Bound to {}", device.generation());
//!
//!     for command in device.commands() {
//!         println!("{} {}", command.label_key(), command.sort_index());
//!     }
//!
//!     let mut variables = Variables::new();
//!     device.poll(&mut variables).await?;
//!
//!     device.send_command("relay/0?turn=toggle").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Connection Test
//!
//! ```no_run
//! use shelly_bridge::identity::test_connection;
//! use shelly_bridge::protocol::HttpConfig;
//!
//! #[tokio::main]
//! async fn main() -> shelly_bridge::Result<()> {
//!     let identity = test_connection(HttpConfig::new("192.168.1.100")).await?;
//!     println!("{identity}"); // 'Kitchen' Shelly Plus 1PM
//!     Ok(())
//! }
//! ```

pub mod capabilities;
pub mod command;
mod device;
pub mod error;
pub mod field;
pub mod generation;
pub mod identity;
pub mod property;
pub mod protocol;
pub mod table;

pub use command::{Command, EntityKind, ValueText};
pub use device::{Device, DeviceBuilder, DeviceRecord};
pub use error::{DeviceError, Error, ProtocolError, Result};
pub use field::{FieldType, FieldValue, PropertyField, Snapshot, Variables};
pub use generation::{Adapter, Generation};
pub use identity::{DeviceIdentity, test_connection};
pub use property::{CacheEntry, PollSource, PropertyGroup};
pub use protocol::HttpConfig;
pub use table::Table;

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identification and connection testing.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::error::Result;
use crate::field::Snapshot;
use crate::generation::{GEN2_PROBE_KEY, Gen1Adapter, Generation};
use crate::protocol::HttpConfig;

/// Model label used for codes missing from the table.
pub const UNKNOWN_MODEL: &str = "unknown";

/// Probe key holding the Gen1 model code.
const GEN1_CODE_KEY: &str = "type";

/// Probe key holding the Gen2 device name.
const NAME_KEY: &str = "name";

static MODELS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // Gen1
        ("SHSW-1", "Shelly 1 Single Relay Switch"),
        ("SHSW-L", "Shelly 1L Single Relay Switch"),
        ("SHSW-PM", "Shelly Single Relay Switch with integrated Power Meter"),
        ("SHSW-21", "Shelly 2"),
        ("SHSW-25", "Shelly 2.5"),
        ("SHSW-44", "Shelly 4x Relay Switch"),
        ("SHDM-1", "Shelly Dimmer"),
        ("SHDM-2", "Shelly Dimmer2"),
        ("SHIX3-1", "Shelly ix3"),
        ("SHUNI-1", "Shelly UNI"),
        ("SHPLG2-1", "Shelly Plug"),
        ("SHPLG-S", "Shelly Plug-S"),
        ("SHEM", "Shelly EM with integrated Power Meters"),
        ("SHEM-3", "Shelly 3EM with 3 integrated Power Meter"),
        ("SHRGBW2", "Shelly RGBW2 Controller"),
        ("SHBLB-1", "Shelly Bulb"),
        ("SHBDUO-1", "Shelly Duo"),
        ("SHCB-1", "Shelly Duo Color G10"),
        ("SHVIN-1", "Shelly Vintage (White Mode)"),
        ("SHHT-1", "Shelly Sensor (temperature+humidity)"),
        ("SHWT-1", "Shelly Flood Sensor"),
        ("SHSM-1", "Shelly Smoke Sensor"),
        ("SHMOS-01", "Shelly Motion Sensor"),
        ("SHMOS-02", "Shelly Motion Sensor 2"),
        ("SHGS-1", "Shelly Gas Sensor"),
        ("SHDW-1", "Shelly Door/Window"),
        ("SHDW-2", "Shelly Door/Window 2"),
        ("SHBTN-1", "Shelly Button 1"),
        ("SHBTN-2", "Shelly Button 2"),
        ("SHSEN-1", "Shelly Motion and IR Controller"),
        ("SHTRV-01", "Shelly TRV"),
        // Plus
        ("SNSW-001X16EU", "Shelly Plus 1"),
        ("SNSW-001P16EU", "Shelly Plus 1PM"),
        ("SNSW-002P16EU", "Shelly Plus 2PM"),
        ("SNSW-102P16EU", "Shelly Plus 2PM"),
        ("SNPL-00112EU", "Shelly Plus Plug-S"),
        ("SNPL-00110IT", "Shelly Plus Plug-IT"),
        ("SNPL-00110UK", "Shelly Plus Plug-UK"),
        ("SNPL-00110US", "Shelly Plus Plug-US"),
        ("SNSN-0024X", "Shelly Plus i4 AC"),
        ("SNSN-0D24X", "Shelly Plus i4 DC"),
        ("SNSN-0013A", "Shelly Plus HT"),
        ("S3SN-0U12A", "Shelly Plus HT Gen3"),
        ("SNSN-0031Z", "Shelly Plus Smoke sensor"),
        ("SNDM-0013US", "Shelly Plus Wall Dimmer US"),
        ("SNDC-0D4P10WW", "Shelly Plus RGBW PM"),
        ("SAWD-0A1XX10EU1", "Shelly Plus Wall Display"),
        ("SNGW-BT01", "SHelly BLU Gateway"),
        // Mini
        ("SNSW-001X8EU", "Shelly Plus 1 Mini"),
        ("SNSW-001P8EU", "Shelly Plus 1 Mini"),
        ("S3SW-001P8EU", "Shelly Plus 1 Mini"),
        ("SNPM-001PCEU16", "Shelly Plus 1 Mini"),
        ("S3PM-001PCEU16", "Shelly Plus 1 Mini"),
        // Pro
        ("SPSW-001XE16EU", "Shelly Pro 1"),
        ("SPSW-101XE16EU", "Shelly Pro 1"),
        ("SPSW-201XE16EU", "Shelly Pro 1"),
        ("SPSW-001PE16EU", "Shelly Pro 1"),
        ("SPSW-101PE16EU", "Shelly Pro 1"),
        ("SPSW-201PE16EU", "Shelly Pro 1"),
        ("SPSW-002XE16EU", "Shelly Pro 2"),
        ("SPSW-102XE16EU", "Shelly Pro 2"),
        ("SPSW-202XE16EU", "Shelly Pro 2"),
        ("SPSW-002PE16EU", "Shelly Pro 2"),
        ("SPSW-102PE16EU", "Shelly Pro 2"),
        ("SPSW-202PE16EU", "Shelly Pro 2"),
        ("SPSW-003XE16EU", "Shelly Pro 3"),
        ("SPEM-003CEBEU", "Shelly Pro 3"),
        ("SPEM-002CEBEU50", "Shelly Pro EM50"),
        ("SPSW-004PE16EU", "Shelly Pro 4 PM"),
        ("SPSW-104PE16EU", "Shelly Pro 4 PM"),
        // BLU
        ("SBBT", "Shelly BLU Button 1"),
        ("SBDW", "Shelly BLU Door/Window"),
        ("SBMO", "Shelly BLU Motion"),
        ("SBHT", "Shelly BLU H&T"),
    ])
});

/// Returns the display name of a model code, or [`UNKNOWN_MODEL`].
///
/// # Examples
///
/// ```
/// use shelly_bridge::identity::model_name;
///
/// assert_eq!(model_name("SHSW-25"), "Shelly 2.5");
/// assert_eq!(model_name("XYZ-1"), "unknown");
/// ```
#[must_use]
pub fn model_name(code: &str) -> &'static str {
    MODELS.get(code).copied().unwrap_or(UNKNOWN_MODEL)
}

/// Who answered a connection test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// User-assigned device name; empty if none is set.
    pub name: String,
    /// Model code as reported by the device, e.g. `SHSW-1`.
    pub code: String,
    /// Display name of the model code.
    pub model: &'static str,
}

impl DeviceIdentity {
    fn new(name: String, code: String) -> Self {
        let model = model_name(&code);
        Self { name, code, model }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str(self.model)
        } else {
            write!(f, "'{}' {}", self.name, self.model)
        }
    }
}

/// Checks that a Shelly device answers at `config` and tells which one.
///
/// Works for both generations and does not create a [`Device`](crate::Device).
///
/// # Errors
///
/// Returns error if the device cannot be reached.
///
/// # Examples
///
/// ```no_run
/// use shelly_bridge::identity::test_connection;
/// use shelly_bridge::protocol::HttpConfig;
///
/// # async fn example() -> shelly_bridge::Result<()> {
/// let identity = test_connection(HttpConfig::new("192.168.1.100")).await?;
/// println!("Found {identity}");
/// # Ok(())
/// # }
/// ```
pub async fn test_connection(config: HttpConfig) -> Result<DeviceIdentity> {
    let adapter = Gen1Adapter::new(config)?;
    let probe = adapter.standard_values().await?;

    let identity = match Generation::from_probe(&probe) {
        Generation::Gen2 => DeviceIdentity::new(text(&probe, NAME_KEY), text(&probe, GEN2_PROBE_KEY)),
        Generation::Gen1 => DeviceIdentity::new(adapter.name().await?, text(&probe, GEN1_CODE_KEY)),
    };

    tracing::debug!(name = %identity.name, code = %identity.code, "Connection test succeeded");

    Ok(identity)
}

fn text(probe: &Snapshot, key: &str) -> String {
    probe.get(key).map(ToString::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(model_name("SHSW-1"), "Shelly 1 Single Relay Switch");
        assert_eq!(model_name("SNSW-001X16EU"), "Shelly Plus 1");
        assert_eq!(model_name("SPSW-201PE16EU"), "Shelly Pro 1");
        assert_eq!(model_name("S3PM-001PCEU16"), "Shelly Plus 1 Mini");
        assert_eq!(model_name("SBHT"), "Shelly BLU H&T");
    }

    #[test]
    fn unknown_code() {
        assert_eq!(model_name(""), UNKNOWN_MODEL);
        assert_eq!(model_name("shsw-1"), UNKNOWN_MODEL);
    }

    #[test]
    fn display_quotes_name() {
        let identity = DeviceIdentity::new("Kitchen".to_string(), "SHSW-25".to_string());
        assert_eq!(identity.to_string(), "'Kitchen' Shelly 2.5");
    }

    #[test]
    fn display_without_name() {
        let identity = DeviceIdentity::new(String::new(), "NOPE".to_string());
        assert_eq!(identity.model, "unknown");
        assert_eq!(identity.to_string(), "unknown");
    }
}

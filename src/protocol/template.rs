// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named placeholder substitution for endpoint templates.
//!
//! Endpoints are stored as templates such as `http://{provider_host}/settings`
//! so that discovered property groups survive a change of the device address.
//! The concrete URL is produced right before each request.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use reqwest::Url;

use crate::error::ProtocolError;

/// Matches `{name}` placeholders.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("valid placeholder regex"));

/// Replaces every `{name}` with its value from `values`.
///
/// Placeholders without a value are left untouched.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use shelly_bridge::protocol::replace_placeholders;
///
/// let values = HashMap::from([("provider_host".to_string(), "192.168.1.20".to_string())]);
/// assert_eq!(
///     replace_placeholders("http://{provider_host}/rpc/{method}", &values),
///     "http://192.168.1.20/rpc/{method}"
/// );
/// ```
#[must_use]
pub fn replace_placeholders(template: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Substitutes placeholders and parses the result as a URL.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidAddress`] if the resolved string is not a
/// valid URL.
pub fn resolve_url(template: &str, values: &HashMap<String, String>) -> Result<Url, ProtocolError> {
    let resolved = replace_placeholders(template, values);
    tracing::debug!(url = %resolved, "Resolved endpoint");
    Url::parse(&resolved).map_err(|e| ProtocolError::InvalidAddress(format!("{resolved}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> HashMap<String, String> {
        HashMap::from([
            ("provider_host".to_string(), "10.0.0.5:8080".to_string()),
            ("provider_port".to_string(), "8080".to_string()),
        ])
    }

    #[test]
    fn replaces_known_placeholders() {
        assert_eq!(
            replace_placeholders("http://{provider_host}/status", &values()),
            "http://10.0.0.5:8080/status"
        );
    }

    #[test]
    fn replaces_repeated_placeholders() {
        assert_eq!(
            replace_placeholders("{provider_port}-{provider_port}", &values()),
            "8080-8080"
        );
    }

    #[test]
    fn keeps_unknown_placeholders() {
        assert_eq!(
            replace_placeholders("http://{provider_host}/{unknown}", &values()),
            "http://10.0.0.5:8080/{unknown}"
        );
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(
            replace_placeholders("roller/0/go=to_pos&roller_pos=50", &values()),
            "roller/0/go=to_pos&roller_pos=50"
        );
    }

    #[test]
    fn resolve_url_keeps_query() {
        let url = resolve_url("http://{provider_host}/relay/0?turn=on", &values()).unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.5:8080/relay/0?turn=on");
    }

    #[test]
    fn resolve_url_rejects_unresolved_scheme() {
        let result = resolve_url("{provider_scheme}://{provider_host}/status", &HashMap::new());
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }
}

// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP communication with Shelly devices.
//!
//! Both device generations are plain HTTP `GET` APIs; they differ only in
//! their endpoint layout. Endpoints are kept as templates with named
//! placeholders and resolved against an [`HttpConfig`] right before each
//! request.
//!
//! - [`HttpConfig`]: connection settings and placeholder values
//! - [`HttpClient`]: snapshot fetches and fire-and-forget actions
//! - [`replace_placeholders`]: the template resolver

mod http;
mod template;

pub use http::{Credentials, HttpClient, HttpConfig};
pub use template::{replace_placeholders, resolve_url};

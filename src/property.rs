// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property groups and their snapshot caches.
//!
//! A [`PropertyGroup`] is one snapshot endpoint of a device (`/settings`,
//! `/rpc/sys.GetStatus`, ...) together with the fields discovered behind it.
//! Polling a group projects the values of those fields into the caller's
//! variables, reusing the last snapshot while it is younger than the group's
//! cache TTL.
//!
//! # Concurrency
//!
//! Each group owns its cache behind its own async mutex, held from the
//! freshness check until the fresh snapshot is stored. Concurrent polls of
//! one group therefore fetch at most once per TTL window, while different
//! groups never wait on each other. Only a successful fetch replaces the
//! snapshot: an error status or a poll future dropped mid-fetch leaves the
//! previous one in place.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::ProtocolError;
use crate::field::{PropertyField, Snapshot, Variables};
use crate::protocol::HttpClient;

/// Cached snapshot of one property group.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CacheEntry {
    /// Nothing fetched yet.
    #[default]
    Empty,
    /// Values of the last successful fetch.
    Snapshot {
        /// The fetched values.
        values: Snapshot,
        /// When the fetch completed.
        fetched_at: Instant,
    },
}

impl CacheEntry {
    /// Returns the cached values if they are still valid at `now`.
    ///
    /// Values go stale strictly after `ttl`; a zero TTL never caches.
    #[must_use]
    pub fn fresh(&self, ttl: Duration, now: Instant) -> Option<&Snapshot> {
        match self {
            Self::Snapshot { values, fetched_at }
                if !ttl.is_zero() && now.saturating_duration_since(*fetched_at) <= ttl =>
            {
                Some(values)
            }
            _ => None,
        }
    }
}

/// Where a poll took its values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollSource {
    /// The cached snapshot was still valid.
    Cache,
    /// A new snapshot was fetched from the device.
    Device,
    /// The device answered with an error status. The previous snapshot, if
    /// any, was projected and stays stale.
    Stale,
}

/// One cacheable snapshot endpoint of a device.
///
/// Serializing a group keeps its definition and drops the cache, so a
/// restored group fetches on its first poll.
#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyGroup {
    name: String,
    endpoint: String,
    prefix: String,
    fields: BTreeSet<PropertyField>,
    cache_ttl_secs: u64,
    #[serde(skip)]
    cache: Mutex<CacheEntry>,
}

impl PropertyGroup {
    /// Creates a group with an empty cache.
    ///
    /// # Arguments
    ///
    /// * `name` - Group name, e.g. `"Settings"`
    /// * `endpoint` - URL template, e.g. `"http://{provider_host}/settings"`
    /// * `prefix` - Prefix of the group's field names, e.g. `"settings"`
    /// * `fields` - Fields discovered behind the endpoint
    /// * `cache_ttl_secs` - Snapshot lifetime; `0` disables caching
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        prefix: impl Into<String>,
        fields: BTreeSet<PropertyField>,
        cache_ttl_secs: u64,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            prefix: prefix.into(),
            fields,
            cache_ttl_secs,
            cache: Mutex::new(CacheEntry::Empty),
        }
    }

    /// Seeds the cache with a snapshot fetched right now.
    #[must_use]
    pub fn with_snapshot(self, values: Snapshot) -> Self {
        Self {
            cache: Mutex::new(CacheEntry::Snapshot {
                values,
                fetched_at: Instant::now(),
            }),
            ..self
        }
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the endpoint template.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the field name prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the discovered fields.
    #[must_use]
    pub fn fields(&self) -> &BTreeSet<PropertyField> {
        &self.fields
    }

    /// Returns the cache lifetime.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Returns a copy of the current cache entry.
    pub async fn cache_entry(&self) -> CacheEntry {
        self.cache.lock().await.clone()
    }

    /// Projects fresh or cached values into `variables`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if a fetch is needed and fails at the
    /// transport level; the cache is left untouched in that case.
    pub async fn poll(
        &self,
        client: &HttpClient,
        variables: &mut Variables,
    ) -> Result<PollSource, ProtocolError> {
        let mut cache = self.cache.lock().await;

        if let Some(values) = cache.fresh(self.cache_ttl(), Instant::now()) {
            tracing::debug!(group = %self.name, "Using cached snapshot");
            self.project(values, variables);
            return Ok(PollSource::Cache);
        }

        let Some(values) = client.fetch_snapshot(&self.endpoint, &self.prefix).await? else {
            if let CacheEntry::Snapshot { values, .. } = &*cache {
                self.project(values, variables);
            }
            tracing::debug!(group = %self.name, "Keeping previous snapshot");
            return Ok(PollSource::Stale);
        };

        self.project(&values, variables);
        *cache = CacheEntry::Snapshot {
            values,
            fetched_at: Instant::now(),
        };

        Ok(PollSource::Device)
    }

    /// Binds the value of every declared field present in `values`.
    ///
    /// Declared fields missing from the snapshot produce no variable.
    pub fn project(&self, values: &Snapshot, variables: &mut Variables) {
        for field in &self.fields {
            if let Some(value) = values.get(field.name()) {
                variables.insert(field.name().to_string(), value.clone());
            }
        }
    }
}

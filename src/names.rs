//! # Name Directory
//!
//! Address-to-display-name resolution with caching.
//!
//! A sender address resolves to its first registered name via the host
//! API; an address with no registered names (or whose lookup fails) falls
//! back to a truncated form of the address itself. Both outcomes are
//! cached so each address costs at most one host request per login
//! session. Named senders also get a derived avatar resource URL.
//!
//! The directory is owned by the session and passed down explicitly; its
//! caches are cleared on logout.

use std::collections::HashMap;

use crate::api::HostApi;
use crate::render::links::resource_url;

/// Service type under which avatars are hosted.
const AVATAR_SERVICE: &str = "THUMBNAIL";
/// Resource identifier of a name's avatar.
const AVATAR_IDENTIFIER: &str = "avatar";

/// Cached address→name and name→avatar mappings.
#[derive(Debug, Default)]
pub struct NameDirectory {
    names: HashMap<String, String>,
    avatars: HashMap<String, String>,
}

impl NameDirectory {
    /// An empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// The display name for an address, resolving and caching on first
    /// sight. Lookup failures degrade to the truncated address and are
    /// cached the same way, so a flaky name service is not re-queried
    /// every refresh cycle.
    pub async fn display_name<A>(&mut self, api: &A, address: &str) -> String
    where
        A: HostApi + ?Sized,
    {
        if let Some(name) = self.names.get(address) {
            return name.clone();
        }

        let resolved = match api.get_names(address).await {
            Ok(names) => names.into_iter().next().map(|info| info.name),
            Err(err) => {
                tracing::warn!("name lookup for {address} failed: {err}");
                None
            }
        };

        let display = match resolved {
            Some(name) => {
                self.avatars.insert(
                    name.clone(),
                    resource_url(AVATAR_SERVICE, &name, AVATAR_IDENTIFIER),
                );
                name
            }
            None => truncate_address(address),
        };

        self.names.insert(address.to_string(), display.clone());
        display
    }

    /// The cached display name, if this address has been resolved.
    pub fn cached_name(&self, address: &str) -> Option<&str> {
        self.names.get(address).map(String::as_str)
    }

    /// The avatar resource URL for an address, present only for senders
    /// that resolved to a registered name.
    pub fn avatar_url(&self, address: &str) -> Option<&str> {
        let name = self.names.get(address)?;
        self.avatars.get(name).map(String::as_str)
    }

    /// Clears both caches. Called on logout.
    pub fn clear(&mut self) {
        self.names.clear();
        self.avatars.clear();
    }
}

/// Shortened display form of an address: first five characters, an
/// ellipsis, last five. Addresses too short to truncate pass through.
pub(crate) fn truncate_address(address: &str) -> String {
    if address.chars().count() <= 10 {
        return address.to_string();
    }
    let head: String = address.chars().take(5).collect();
    let tail: String = address.chars().rev().take(5).collect::<Vec<_>>().into_iter().rev().collect();
    format!("{head}...{tail}")
}

// ============================================================================
// TESTS
// ============================================================================

// SPDX-FileCopyrightText: The sharecard authors
// SPDX-License-Identifier: MPL-2.0

//! Publishing the encoded card as a revocable resource

use std::collections::HashMap;

use log::debug;
use percent_encoding::percent_encode;
use thiserror::Error;

use crate::{
    interact::{LinkSlot, PageBinding},
    vcard,
};

/// A revocation error
#[derive(Debug, Error)]
pub enum RevokeError {
    /// No resource is published under the given URL.
    #[error("unknown or already revoked resource")]
    Unknown,

    /// The host failed to release the resource.
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// Host seam for minting and releasing resource URLs.
///
/// Browser hosts back this with object URLs. [`MemoryUrlStore`] and
/// [`DataUrlStore`] cover tests and hosts without revocable URLs.
pub trait ObjectUrlStore {
    /// Wrap the given contents and return a URL that locates them.
    fn create(&mut self, media_type: &str, contents: &str) -> String;

    /// Release the resource behind the given URL.
    ///
    /// # Errors
    ///
    /// Returns a [`RevokeError`] if the URL is unknown, already revoked,
    /// or the host fails to release it.
    fn revoke(&mut self, url: &str) -> Result<(), RevokeError>;
}

mod encoding {
    use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

    /// <https://datatracker.ietf.org/doc/html/rfc3986#section-2.3>
    pub(super) const DATA_PAYLOAD: &AsciiSet = &NON_ALPHANUMERIC
        .remove(b'-')
        .remove(b'.')
        .remove(b'_')
        .remove(b'~');
}

/// Build a self-contained `data:` URL around the given contents.
///
/// Unlike an object URL a data URL borrows no host memory and never
/// needs to be revoked.
///
/// <https://datatracker.ietf.org/doc/html/rfc2397>
#[must_use]
pub fn data_url(media_type: &str, contents: &str) -> String {
    let payload = percent_encode(contents.as_bytes(), encoding::DATA_PAYLOAD);
    format!("data:{media_type};charset=utf-8,{payload}")
}

#[derive(Debug)]
struct StoredResource {
    media_type: String,
    contents: String,
}

/// In-memory [`ObjectUrlStore`] minting counted `memory:` URLs.
#[derive(Debug, Default)]
pub struct MemoryUrlStore {
    next_id: u64,
    live: HashMap<String, StoredResource>,
    revoked: u64,
}

impl MemoryUrlStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently live resources.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total number of resources created so far.
    #[must_use]
    pub const fn created_count(&self) -> u64 {
        self.next_id
    }

    /// Total number of successful revocations.
    #[must_use]
    pub const fn revoked_count(&self) -> u64 {
        self.revoked
    }

    /// Look up the contents behind a live URL.
    #[must_use]
    pub fn contents_of(&self, url: &str) -> Option<&str> {
        self.live.get(url).map(|stored| stored.contents.as_str())
    }

    /// Look up the media type behind a live URL.
    #[must_use]
    pub fn media_type_of(&self, url: &str) -> Option<&str> {
        self.live.get(url).map(|stored| stored.media_type.as_str())
    }
}

impl ObjectUrlStore for MemoryUrlStore {
    fn create(&mut self, media_type: &str, contents: &str) -> String {
        self.next_id += 1;
        let url = format!("memory:contact-card/{id}", id = self.next_id);
        self.live.insert(
            url.clone(),
            StoredResource {
                media_type: media_type.to_owned(),
                contents: contents.to_owned(),
            },
        );
        url
    }

    fn revoke(&mut self, url: &str) -> Result<(), RevokeError> {
        if self.live.remove(url).is_none() {
            return Err(RevokeError::Unknown);
        }
        self.revoked += 1;
        Ok(())
    }
}

/// [`ObjectUrlStore`] minting self-contained `data:` URLs.
///
/// Suits hosts without revocable object URLs. Revocation is a structural
/// no-op because the payload travels inside the URL itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlStore;

impl ObjectUrlStore for DataUrlStore {
    fn create(&mut self, media_type: &str, contents: &str) -> String {
        data_url(media_type, contents)
    }

    fn revoke(&mut self, _url: &str) -> Result<(), RevokeError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A revocable handle to the currently published card text
#[allow(clippy::module_name_repetitions)]
pub struct PublishedResource {
    url: String,
}

impl PublishedResource {
    /// The URL under which the resource is reachable.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Owns the single live resource slot and the registered link targets.
///
/// At most one resource is live at a time. Publishing revokes the
/// previous resource before the replacement is created.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct Publisher<S> {
    store: S,
    current: Option<PublishedResource>,
    links: Vec<LinkSlot>,
}

impl<S> Publisher<S>
where
    S: ObjectUrlStore,
{
    /// Create a publisher on top of the given store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            current: None,
            links: Vec::new(),
        }
    }

    /// Register a link slot to be pointed at each published resource.
    ///
    /// Registering the same slot again is a no-op.
    pub fn register_link(&mut self, slot: LinkSlot) {
        if !self.links.contains(&slot) {
            self.links.push(slot);
        }
    }

    /// The currently live resource, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&PublishedResource> {
        self.current.as_ref()
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Publish the given encoded card text.
    ///
    /// Any previously published resource is revoked first. After the new
    /// resource is installed every registered link slot on the page is
    /// pointed at it.
    pub fn publish<P>(&mut self, text: &str, page: &mut P) -> &PublishedResource
    where
        P: PageBinding,
    {
        debug_assert!(vcard::is_well_formed(text));
        self.revoke_current();
        let url = self.store.create(vcard::MEDIA_TYPE, text);
        debug!("published contact card at {url}");
        let resource = self.current.insert(PublishedResource { url });
        for slot in &self.links {
            page.set_link_url(*slot, &resource.url);
        }
        resource
    }

    /// Revoke the currently published resource, if any.
    ///
    /// Idempotent. Revocation failures are logged and swallowed; a
    /// resource that is already gone does not block replacement.
    pub fn revoke_current(&mut self) {
        let Some(resource) = self.current.take() else {
            return;
        };
        if let Err(err) = self.store.revoke(&resource.url) {
            debug!("ignoring revocation failure for {url}: {err}", url = resource.url);
        } else {
            debug!("revoked {url}", url = resource.url);
        }
    }
}

#[cfg(test)]
mod tests;

// SPDX-FileCopyrightText: The sharecard authors
// SPDX-License-Identifier: MPL-2.0

//! Shared test doubles for the store and page seams

#![allow(clippy::struct_excessive_bools)]

use std::{collections::HashMap, time::Duration};

use crate::{
    interact::{LinkSlot, NavigationError, PageBinding},
    publish::{ObjectUrlStore, RevokeError},
};

/// A store operation observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreOp {
    /// `create` returned the given URL.
    Created(String),

    /// `revoke` succeeded for the given URL.
    Revoked(String),

    /// `revoke` failed for the given URL.
    RevokeFailed(String),
}

/// Wraps a store and records the order of its operations.
#[derive(Debug, Default)]
pub(crate) struct RecordingStore<S> {
    pub(crate) inner: S,
    pub(crate) ops: Vec<StoreOp>,
}

impl<S: ObjectUrlStore> ObjectUrlStore for RecordingStore<S> {
    fn create(&mut self, media_type: &str, contents: &str) -> String {
        let url = self.inner.create(media_type, contents);
        self.ops.push(StoreOp::Created(url.clone()));
        url
    }

    fn revoke(&mut self, url: &str) -> Result<(), RevokeError> {
        let result = self.inner.revoke(url);
        let op = if result.is_ok() {
            StoreOp::Revoked(url.to_owned())
        } else {
            StoreOp::RevokeFailed(url.to_owned())
        };
        self.ops.push(op);
        result
    }
}

/// A page binding that records every effect and can simulate denied
/// navigation or missing elements.
#[derive(Debug)]
pub(crate) struct RecordingPage {
    pub(crate) link_urls: HashMap<LinkSlot, String>,
    pub(crate) download_filenames: HashMap<LinkSlot, String>,
    pub(crate) navigations: Vec<String>,
    pub(crate) opened_contexts: Vec<String>,
    pub(crate) deferred_hides: Vec<Duration>,
    pub(crate) scrolled_fragments: Vec<String>,
    pub(crate) preview_text: Option<String>,
    pub(crate) preview_visible: bool,
    pub(crate) deny_navigation: bool,
    pub(crate) deny_new_context: bool,
    pub(crate) has_preview_element: bool,
    pub(crate) known_fragments: Vec<String>,
}

impl Default for RecordingPage {
    fn default() -> Self {
        Self {
            link_urls: HashMap::new(),
            download_filenames: HashMap::new(),
            navigations: Vec::new(),
            opened_contexts: Vec::new(),
            deferred_hides: Vec::new(),
            scrolled_fragments: Vec::new(),
            preview_text: None,
            preview_visible: false,
            deny_navigation: false,
            deny_new_context: false,
            has_preview_element: true,
            known_fragments: Vec::new(),
        }
    }
}

impl PageBinding for RecordingPage {
    fn set_link_url(&mut self, slot: LinkSlot, url: &str) {
        self.link_urls.insert(slot, url.to_owned());
    }

    fn has_download_filename(&self, slot: LinkSlot) -> bool {
        self.download_filenames.contains_key(&slot)
    }

    fn set_download_filename(&mut self, slot: LinkSlot, filename: &str) {
        self.download_filenames.insert(slot, filename.to_owned());
    }

    fn navigate(&mut self, url: &str) -> Result<(), NavigationError> {
        self.navigations.push(url.to_owned());
        if self.deny_navigation {
            return Err(NavigationError::Blocked);
        }
        Ok(())
    }

    fn open_in_new_context(&mut self, url: &str) -> Result<(), NavigationError> {
        self.opened_contexts.push(url.to_owned());
        if self.deny_new_context {
            return Err(NavigationError::Blocked);
        }
        Ok(())
    }

    fn show_preview(&mut self, text: &str) {
        if !self.has_preview_element {
            return;
        }
        self.preview_text = Some(text.to_owned());
        self.preview_visible = true;
    }

    fn hide_preview(&mut self) {
        if !self.has_preview_element {
            return;
        }
        self.preview_visible = false;
    }

    fn hide_preview_after(&mut self, delay: Duration) {
        if !self.has_preview_element {
            return;
        }
        self.deferred_hides.push(delay);
        self.preview_visible = false;
    }

    fn scroll_to_fragment(&mut self, fragment: &str) -> bool {
        if !self.known_fragments.iter().any(|known| known == fragment) {
            return false;
        }
        self.scrolled_fragments.push(fragment.to_owned());
        true
    }
}

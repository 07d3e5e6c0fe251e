// SPDX-FileCopyrightText: The sharecard authors
// SPDX-License-Identifier: MPL-2.0

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(test), deny(clippy::panic_in_result_fn))]
#![cfg_attr(not(debug_assertions), deny(clippy::used_underscore_binding))]

//! Encode a personal contact card, publish it as a revocable resource,
//! and drive the page interactions around sharing it.
//!
//! The encoded text follows the output contract described in [`docs`].
//! Publishing and interaction handling stay host-independent behind the
//! [`publish::ObjectUrlStore`] and [`interact::PageBinding`] seams, so
//! the whole flow runs and tests without a browser.

pub mod card;

pub mod docs;

pub mod interact;

pub mod publish;

pub mod vcard;

pub use self::{
    card::{ContactCard, Email, EmailType, Phone, SocialProfile, TelType},
    interact::{
        Capabilities, ClickOutcome, Controller, DeviceClass, FixedCapabilities, LinkSlot,
        NavigationError, PageBinding, PreviewHit,
    },
    publish::{
        DataUrlStore, MemoryUrlStore, ObjectUrlStore, PublishedResource, Publisher, RevokeError,
    },
};

#[cfg(test)]
mod testkit;

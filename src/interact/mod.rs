// SPDX-FileCopyrightText: The sharecard authors
// SPDX-License-Identifier: MPL-2.0

//! Device-aware interaction handling around the published card

use std::time::Duration;

use log::debug;
use thiserror::Error;

use crate::{
    card::ContactCard,
    publish::{ObjectUrlStore, Publisher},
};

/// Delay between a click on the preview's download link and hiding the
/// preview, leaving the platform-native save action room to start.
pub const PREVIEW_CLOSE_DELAY: Duration = Duration::from_millis(600);

/// Host capability queries deciding between the mobile and desktop
/// flows.
pub trait Capabilities {
    /// Whether the host has a touch-capable input.
    fn supports_touch(&self) -> bool;

    /// Whether the viewport is narrow (phone-sized).
    fn is_narrow_viewport(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Fixed [`Capabilities`] answers
pub struct FixedCapabilities {
    /// Answer for [`Capabilities::supports_touch`]
    pub touch: bool,

    /// Answer for [`Capabilities::is_narrow_viewport`]
    pub narrow_viewport: bool,
}

impl Capabilities for FixedCapabilities {
    fn supports_touch(&self) -> bool {
        self.touch
    }

    fn is_narrow_viewport(&self) -> bool {
        self.narrow_viewport
    }
}

/// Interaction flow selected per click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// Touch-capable narrow-viewport host: navigate to import the card.
    Mobile,

    /// Everything else: let the link download the card.
    Desktop,
}

impl DeviceClass {
    /// Classify the host.
    ///
    /// Mobile requires both touch support and a narrow viewport. A
    /// touch-capable desktop or a narrow desktop window stays desktop.
    #[must_use]
    pub fn classify<C: Capabilities>(caps: &C) -> Self {
        if caps.supports_touch() && caps.is_narrow_viewport() {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Link elements the publisher keeps pointed at the live resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkSlot {
    /// The main "save contact" link
    PublishTrigger,

    /// The download link inside the preview
    PreviewDownload,
}

/// Where a click on the open preview landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewHit {
    /// The dimmed area around the content; dismisses the preview.
    Backdrop,

    /// The content itself; keeps the preview open.
    Content,
}

/// A navigation error
#[derive(Debug, Error)]
pub enum NavigationError {
    /// The host rejected the navigation or the new context.
    #[error("navigation blocked by the host")]
    Blocked,

    /// The host failed for another reason.
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// Host seam for the page effects the controller drives.
///
/// Real implementations talk to a document; every method degrades to a
/// no-op when its backing element is missing.
pub trait PageBinding {
    /// Point the link slot at the given URL.
    fn set_link_url(&mut self, slot: LinkSlot, url: &str);

    /// Whether the link slot already carries a download filename.
    fn has_download_filename(&self, slot: LinkSlot) -> bool;

    /// Attach a download filename to the link slot.
    fn set_download_filename(&mut self, slot: LinkSlot, filename: &str);

    /// Navigate the current context to the URL.
    ///
    /// # Errors
    ///
    /// Returns a [`NavigationError`] if the host rejects the navigation.
    fn navigate(&mut self, url: &str) -> Result<(), NavigationError>;

    /// Open the URL in a new context (tab or window).
    ///
    /// # Errors
    ///
    /// Returns a [`NavigationError`] if the host blocks the new context.
    fn open_in_new_context(&mut self, url: &str) -> Result<(), NavigationError>;

    /// Show the read-only preview with the given card text.
    fn show_preview(&mut self, text: &str);

    /// Hide the preview.
    fn hide_preview(&mut self);

    /// Hide the preview after the given delay.
    fn hide_preview_after(&mut self, delay: Duration);

    /// Scroll smoothly to the named fragment target.
    ///
    /// Returns `false` when no such target exists.
    fn scroll_to_fragment(&mut self, fragment: &str) -> bool;
}

/// How a click on the publish trigger was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Mobile flow: the resource was opened on the device and the
    /// preview was shown.
    OpenedWithPreview,

    /// Desktop flow with a modifier key held: only the preview was
    /// shown.
    PreviewOnly,

    /// Desktop flow: the link's default download proceeds.
    DownloadDelegated,
}

impl ClickOutcome {
    /// Whether the host must suppress the default link action.
    #[must_use]
    pub const fn suppresses_default(self) -> bool {
        !matches!(self, Self::DownloadDelegated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreviewState {
    Hidden,
    Shown,
}

/// Drives the publish and preview interactions of one page.
///
/// Owns the card, the publisher, the page binding, and the capability
/// queries, so the whole flow runs without a host document.
#[derive(Debug)]
pub struct Controller<S, P, C> {
    card: ContactCard,
    publisher: Publisher<S>,
    page: P,
    caps: C,
    preview: PreviewState,
}

impl<S, P, C> Controller<S, P, C>
where
    S: ObjectUrlStore,
    P: PageBinding,
    C: Capabilities,
{
    /// Create a controller around the given collaborators.
    #[must_use]
    pub const fn new(card: ContactCard, publisher: Publisher<S>, page: P, caps: C) -> Self {
        Self {
            card,
            publisher,
            page,
            caps,
            preview: PreviewState::Hidden,
        }
    }

    /// Publish the initial resource so the page links are live from the
    /// start.
    pub fn handle_page_load(&mut self) {
        self.republish();
    }

    /// Resolve a click on the publish trigger.
    ///
    /// The card is re-encoded and re-published on every click so the
    /// link targets always carry the freshest resource.
    pub fn handle_trigger_click(&mut self, modifier_held: bool) -> ClickOutcome {
        let (text, url) = self.republish();
        match DeviceClass::classify(&self.caps) {
            DeviceClass::Mobile => {
                self.open_on_device(&url);
                self.show_preview(&text);
                ClickOutcome::OpenedWithPreview
            }
            DeviceClass::Desktop if modifier_held => {
                self.show_preview(&text);
                ClickOutcome::PreviewOnly
            }
            DeviceClass::Desktop => {
                if !self.page.has_download_filename(LinkSlot::PublishTrigger) {
                    self.page.set_download_filename(
                        LinkSlot::PublishTrigger,
                        &self.card.download_filename(),
                    );
                }
                ClickOutcome::DownloadDelegated
            }
        }
    }

    /// Resolve a click on an internal `#fragment` anchor.
    ///
    /// Returns whether a scroll target was found. Only non-empty
    /// fragment references are forwarded to the page.
    pub fn handle_anchor_click(&mut self, href: &str) -> bool {
        match href.strip_prefix('#') {
            Some(fragment) if !fragment.is_empty() => self.page.scroll_to_fragment(fragment),
            _ => false,
        }
    }

    /// Hide the preview via one of its close affordances.
    pub fn handle_preview_close(&mut self) {
        self.hide_preview();
    }

    /// Resolve a click landing somewhere on the open preview surface.
    pub fn handle_preview_surface_click(&mut self, hit: PreviewHit) {
        if hit == PreviewHit::Backdrop {
            self.hide_preview();
        }
    }

    /// Resolve a click on the preview's download link.
    ///
    /// The link's default action performs the save. The preview is
    /// hidden after [`PREVIEW_CLOSE_DELAY`] so the save can start while
    /// it is still visible.
    pub fn handle_preview_download_click(&mut self) {
        if self.preview == PreviewState::Shown {
            self.page.hide_preview_after(PREVIEW_CLOSE_DELAY);
            self.preview = PreviewState::Hidden;
        }
    }

    /// Release the live resource on page teardown.
    pub fn handle_page_unload(&mut self) {
        self.publisher.revoke_current();
    }

    /// Whether the preview is currently shown.
    #[must_use]
    pub const fn preview_visible(&self) -> bool {
        matches!(self.preview, PreviewState::Shown)
    }

    /// The card being published.
    #[must_use]
    pub const fn card(&self) -> &ContactCard {
        &self.card
    }

    /// The publisher.
    #[must_use]
    pub const fn publisher(&self) -> &Publisher<S> {
        &self.publisher
    }

    /// The page binding.
    #[must_use]
    pub const fn page(&self) -> &P {
        &self.page
    }

    fn republish(&mut self) -> (String, String) {
        let text = self.card.encode();
        let url = self.publisher.publish(&text, &mut self.page).url().to_owned();
        (text, url)
    }

    /// Walk the fallback chain for opening the resource on the device:
    /// navigate, then a new context, then navigate once more.
    fn open_on_device(&mut self, url: &str) {
        if self.page.navigate(url).is_ok() {
            return;
        }
        if self.page.open_in_new_context(url).is_ok() {
            return;
        }
        if let Err(err) = self.page.navigate(url) {
            debug!("all attempts to open {url} failed: {err}");
        }
    }

    fn show_preview(&mut self, text: &str) {
        self.page.show_preview(text);
        self.preview = PreviewState::Shown;
    }

    fn hide_preview(&mut self) {
        if self.preview == PreviewState::Shown {
            self.page.hide_preview();
            self.preview = PreviewState::Hidden;
        }
    }
}

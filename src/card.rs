// SPDX-FileCopyrightText: The sharecard authors
// SPDX-License-Identifier: MPL-2.0

//! The contact card record and its encoding

use std::fmt;

use compact_str::{format_compact, CompactString};
use once_cell::sync::OnceCell;
use regex::Regex;
use time::{
    format_description::FormatItem,
    macros::{date, format_description},
    Date,
};

use crate::vcard;

/// Type of free-form text fields
pub type Text = CompactString;

/// Type of URI fields
pub type Uri = CompactString;

/// Type of `X-SOCIALPROFILE` service tokens
pub type Service = CompactString;

/// Check if the given text field is valid.
///
/// Text fields must not carry leading or trailing whitespace. An empty
/// text is valid and denotes an absent field.
#[must_use]
pub fn is_valid_text(text: &str) -> bool {
    text.trim() == text
}

const PHONE_NUMBER_REGEX_STR: &str = r"^\+?[0-9 ()./-]*[0-9][0-9 ()./-]*$";

static PHONE_NUMBER_REGEX: OnceCell<Regex> = OnceCell::new();

#[must_use]
fn phone_number_regex() -> &'static Regex {
    PHONE_NUMBER_REGEX.get_or_init(|| PHONE_NUMBER_REGEX_STR.parse().unwrap())
}

/// Check if the given phone number is dialable.
///
/// An empty number is valid and denotes an absent field.
#[must_use]
pub fn is_valid_phone_number(number: &str) -> bool {
    number.is_empty() || phone_number_regex().is_match(number)
}

const SERVICE_REGEX_STR: &str = r"^[a-z][a-z0-9-]*$";

static SERVICE_REGEX: OnceCell<Regex> = OnceCell::new();

#[must_use]
fn service_regex() -> &'static Regex {
    SERVICE_REGEX.get_or_init(|| SERVICE_REGEX_STR.parse().unwrap())
}

/// Check if the given service token is valid.
///
/// An empty token is valid and denotes a link without a structured
/// profile line.
#[must_use]
pub fn is_valid_service(service: &str) -> bool {
    service.is_empty() || service_regex().is_match(service)
}

/// TEL type parameter values.
///
/// <https://datatracker.ietf.org/doc/html/rfc2426#section-3.3.1>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelType {
    /// Cellular phone
    Cell,
    /// Voice line
    Voice,
    /// Home number
    Home,
    /// Work number
    Work,
    /// Fax machine
    Fax,
}

impl TelType {
    /// The parameter value as written into `TYPE=`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cell => "CELL",
            Self::Voice => "VOICE",
            Self::Home => "HOME",
            Self::Work => "WORK",
            Self::Fax => "FAX",
        }
    }
}

/// EMAIL type parameter values.
///
/// <https://datatracker.ietf.org/doc/html/rfc2426#section-3.3.2>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailType {
    /// Internet addressing
    Internet,
    /// Preferred address
    Pref,
}

impl EmailType {
    /// The parameter value as written into `TYPE=`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internet => "INTERNET",
            Self::Pref => "PREF",
        }
    }
}

fn type_param<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut values = values.into_iter().peekable();
    values.peek()?;
    Some(format!("TYPE={}", itertools::join(values, ",")))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A phone number with its type parameters
pub struct Phone {
    /// The dialable number
    pub number: Text,

    /// Type parameter values, in encoding order
    pub types: Vec<TelType>,
}

impl Phone {
    /// Check for a non-empty number.
    #[must_use]
    pub fn has_number(&self) -> bool {
        debug_assert!(is_valid_phone_number(&self.number));
        !self.number.is_empty()
    }

    /// Render the `TYPE=` parameter, e.g. `TYPE=CELL,VOICE`.
    ///
    /// Returns `None` when no types are set.
    #[must_use]
    pub fn type_param(&self) -> Option<String> {
        type_param(self.types.iter().copied().map(TelType::as_str))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// An email address with its type parameters
pub struct Email {
    /// The address
    pub address: Text,

    /// Type parameter values, in encoding order
    pub types: Vec<EmailType>,
}

impl Email {
    /// Check for a non-empty address.
    #[must_use]
    pub fn has_address(&self) -> bool {
        debug_assert!(is_valid_text(&self.address));
        !self.address.is_empty()
    }

    /// Render the `TYPE=` parameter, e.g. `TYPE=INTERNET`.
    ///
    /// Returns `None` when no types are set.
    #[must_use]
    pub fn type_param(&self) -> Option<String> {
        type_param(self.types.iter().copied().map(EmailType::as_str))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A social or media link carried by the card
pub struct SocialProfile {
    /// Human-readable label for the note line
    pub label: Text,

    /// Absolute link target
    pub url: Uri,

    /// `X-SOCIALPROFILE` service token; empty for note-only links
    pub service: Service,
}

impl SocialProfile {
    /// Create a note-only link without a structured profile line.
    #[must_use]
    pub fn plain(label: &str, url: &str) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            service: Service::default(),
        }
    }

    /// Create a link that is also emitted as a structured profile line.
    #[must_use]
    pub fn with_service(service: &str, label: &str, url: &str) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            service: service.into(),
        }
    }

    /// Check for a service token.
    #[must_use]
    pub fn has_service(&self) -> bool {
        debug_assert!(is_valid_service(&self.service));
        !self.service.is_empty()
    }

    /// The note line for this link.
    #[must_use]
    pub fn note_line(&self) -> String {
        format!("{label}: {url}", label = self.label, url = self.url)
    }

    /// Check if the profile is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid_text(&self.label)
            && !self.label.is_empty()
            && vcard::is_valid_uri(&self.url)
            && is_valid_service(&self.service)
    }
}

/// Filename used when the organization is empty.
const BARE_FILENAME: &str = "Contact.vcf";

/// Revision date of the built-in card.
const BUILTIN_REVISED: Date = date!(2024 - 11 - 03);

const REV_FORMAT: &[FormatItem<'static>] = format_description!("[year][month][day]T000000Z");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The personal/business record to be shared
///
/// Empty text fields denote absent properties and their lines are
/// omitted from the encoding. Only the full name is mandatory.
#[allow(clippy::module_name_repetitions)]
pub struct ContactCard {
    /// Formatted full name (`FN`)
    pub full_name: Text,

    /// Organization (`ORG`)
    pub org: Text,

    /// Job title or role summary (`TITLE`)
    pub title: Text,

    /// Phone number (`TEL`)
    pub phone: Phone,

    /// Email address (`EMAIL`)
    pub email: Email,

    /// Website (`URL`)
    pub website: Uri,

    /// Social and media links (`NOTE` and `X-SOCIALPROFILE`)
    pub socials: Vec<SocialProfile>,

    /// Free-text lines preceding the links in the note (`NOTE`)
    pub notes: Vec<Text>,

    /// Stable identity token (`X-ABUID`)
    pub uid: Text,

    /// Last revision date (`REV`); `None` omits the line
    pub revised: Option<Date>,
}

impl ContactCard {
    /// The built-in card published by the site.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            full_name: "Gaby Mrad".into(),
            org: "Arabnights".into(),
            title: "DJ; Digital Distribution; Microsoft BI Consultant".into(),
            phone: Phone {
                number: "+31644219300".into(),
                types: vec![TelType::Cell, TelType::Voice],
            },
            email: Email {
                address: "gaby.mrad@outlook.com".into(),
                types: vec![EmailType::Internet],
            },
            website: "https://www.thearabnights.com/".into(),
            socials: vec![
                SocialProfile::with_service(
                    "instagram",
                    "Instagram",
                    "https://www.instagram.com/gaby.mrad",
                ),
                SocialProfile::with_service("twitter", "X", "https://twitter.com/gabymrad"),
                SocialProfile::with_service(
                    "linkedin",
                    "LinkedIn",
                    "https://www.linkedin.com/in/gabymrad",
                ),
                SocialProfile::with_service(
                    "anghami",
                    "Anghami",
                    "https://open.anghami.com/uPY3w0T1XXb",
                ),
                SocialProfile::with_service(
                    "youtube",
                    "YouTube",
                    "https://youtube.com/@thearabnights",
                ),
                SocialProfile::plain("Business Channel", "https://www.thearabnights.com/channel"),
                SocialProfile::with_service(
                    "tiktok",
                    "TikTok",
                    "https://www.tiktok.com/@thearabnights",
                ),
                SocialProfile::plain("Radio1", "https://onlineradiobox.com/nl/arabnights/"),
                SocialProfile::plain("Radio2", "http://tun.in/se6UY"),
            ],
            notes: vec![],
            uid: "arabnights".into(),
            revised: Some(BUILTIN_REVISED),
        }
    }

    /// Check if the card is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_valid_text(&self.full_name)
            && !self.full_name.is_empty()
            && is_valid_text(&self.org)
            && is_valid_text(&self.title)
            && is_valid_phone_number(&self.phone.number)
            && is_valid_text(&self.email.address)
            && (self.website.is_empty() || vcard::is_valid_uri(&self.website))
            && self.socials.iter().all(SocialProfile::is_valid)
            && self.notes.iter().all(|note| is_valid_text(note))
            && is_valid_text(&self.uid)
    }

    /// Suggested filename for saving the card.
    #[must_use]
    pub fn download_filename(&self) -> Text {
        if self.org.is_empty() {
            BARE_FILENAME.into()
        } else {
            format_compact!("{org}-{BARE_FILENAME}", org = self.org)
        }
    }

    /// The logical note text: free-text lines followed by one line per
    /// link.
    ///
    /// Returns `None` when there is nothing to note.
    #[must_use]
    pub fn note_text(&self) -> Option<String> {
        if self.notes.is_empty() && self.socials.is_empty() {
            return None;
        }
        let lines = self
            .notes
            .iter()
            .map(ToString::to_string)
            .chain(self.socials.iter().map(SocialProfile::note_line));
        Some(itertools::join(lines, "\n"))
    }

    /// Encode the card as a single record.
    ///
    /// The card must be valid.
    ///
    /// # Errors
    ///
    /// Returns an [`fmt::Error`] if writing into the buffer fails.
    pub fn encode_into<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        debug_assert!(self.is_valid());
        vcard::write_raw_line(writer, vcard::BEGIN_MARKER)?;
        vcard::write_raw_line(writer, vcard::VERSION_TAG)?;
        vcard::write_text_property(writer, "FN", None, &self.full_name)?;
        // No family/given split is available. The full name occupies the
        // first component of N and the remaining components stay empty.
        let encoded_name = vcard::escape_text(&self.full_name);
        vcard::write_property(writer, "N", None, &format!("{encoded_name};;;;"))?;
        if !self.org.is_empty() {
            vcard::write_text_property(writer, "ORG", None, &self.org)?;
        }
        if !self.title.is_empty() {
            vcard::write_text_property(writer, "TITLE", None, &self.title)?;
        }
        if self.phone.has_number() {
            vcard::write_text_property(
                writer,
                "TEL",
                self.phone.type_param().as_deref(),
                &self.phone.number,
            )?;
        }
        if self.email.has_address() {
            vcard::write_text_property(
                writer,
                "EMAIL",
                self.email.type_param().as_deref(),
                &self.email.address,
            )?;
        }
        if !self.website.is_empty() {
            vcard::write_property(writer, "URL", None, &self.website)?;
        }
        if let Some(date) = self.revised {
            // Formatting a plain calendar date with this description
            // cannot fail.
            let stamp = date.format(REV_FORMAT).map_err(|_| fmt::Error)?;
            vcard::write_property(writer, "REV", None, &stamp)?;
        }
        if let Some(note) = self.note_text() {
            vcard::write_text_property(writer, "NOTE", None, &note)?;
        }
        for social in &self.socials {
            if social.has_service() {
                let param = format_compact!("type={service}", service = social.service);
                vcard::write_property(
                    writer,
                    "X-SOCIALPROFILE",
                    Some(param.as_str()),
                    &social.url,
                )?;
            }
        }
        if !self.uid.is_empty() {
            vcard::write_text_property(writer, "X-ABUID", None, &self.uid)?;
        }
        vcard::write_raw_line(writer, vcard::END_MARKER)
    }

    /// Encode the card as a string.
    ///
    /// The card must be valid.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContactCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.encode_into(f)
    }
}

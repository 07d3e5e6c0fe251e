// SPDX-FileCopyrightText: The sharecard authors
// SPDX-License-Identifier: MPL-2.0

use percent_encoding::percent_decode_str;
use url::Url;

use super::*;
use crate::{
    card::ContactCard,
    interact::LinkSlot,
    testkit::{RecordingPage, RecordingStore, StoreOp},
    vcard,
};

fn encoded_card() -> String {
    ContactCard::builtin().encode()
}

#[test]
fn first_publish_creates_without_revoking() {
    let mut publisher = Publisher::new(MemoryUrlStore::new());
    let mut page = RecordingPage::default();
    let text = encoded_card();
    let url = publisher.publish(&text, &mut page).url().to_owned();
    assert_eq!(1, publisher.store().live_count());
    assert_eq!(1, publisher.store().created_count());
    assert_eq!(0, publisher.store().revoked_count());
    assert_eq!(Some(text.as_str()), publisher.store().contents_of(&url));
    assert_eq!(Some(vcard::MEDIA_TYPE), publisher.store().media_type_of(&url));
}

#[test]
fn republish_revokes_the_previous_resource_first() {
    let mut publisher = Publisher::new(RecordingStore::<MemoryUrlStore>::default());
    let mut page = RecordingPage::default();
    let text = encoded_card();
    let first_url = publisher.publish(&text, &mut page).url().to_owned();
    let second_url = publisher.publish(&text, &mut page).url().to_owned();
    assert_ne!(first_url, second_url);
    let expected = [
        StoreOp::Created(first_url.clone()),
        StoreOp::Revoked(first_url),
        StoreOp::Created(second_url.clone()),
    ];
    assert_eq!(expected.as_slice(), publisher.store().ops.as_slice());
    assert_eq!(Some(second_url.as_str()), publisher.current().map(PublishedResource::url));
}

#[test]
fn registered_links_follow_each_publish() {
    let mut publisher = Publisher::new(MemoryUrlStore::new());
    publisher.register_link(LinkSlot::PublishTrigger);
    publisher.register_link(LinkSlot::PreviewDownload);
    publisher.register_link(LinkSlot::PublishTrigger);
    let mut page = RecordingPage::default();
    let text = encoded_card();
    let first_url = publisher.publish(&text, &mut page).url().to_owned();
    assert_eq!(Some(&first_url), page.link_urls.get(&LinkSlot::PublishTrigger));
    assert_eq!(Some(&first_url), page.link_urls.get(&LinkSlot::PreviewDownload));
    let second_url = publisher.publish(&text, &mut page).url().to_owned();
    assert_ne!(first_url, second_url);
    assert_eq!(Some(&second_url), page.link_urls.get(&LinkSlot::PublishTrigger));
    assert_eq!(Some(&second_url), page.link_urls.get(&LinkSlot::PreviewDownload));
}

#[test]
fn unregistered_links_stay_untouched() {
    let mut publisher = Publisher::new(MemoryUrlStore::new());
    publisher.register_link(LinkSlot::PublishTrigger);
    let mut page = RecordingPage::default();
    publisher.publish(&encoded_card(), &mut page);
    assert!(page.link_urls.contains_key(&LinkSlot::PublishTrigger));
    assert!(!page.link_urls.contains_key(&LinkSlot::PreviewDownload));
}

#[test]
fn repeated_publishing_keeps_a_single_resource_live() {
    let mut publisher = Publisher::new(MemoryUrlStore::new());
    let mut page = RecordingPage::default();
    let text = encoded_card();
    for _ in 0..5 {
        publisher.publish(&text, &mut page);
    }
    assert_eq!(1, publisher.store().live_count());
    assert_eq!(5, publisher.store().created_count());
    assert_eq!(4, publisher.store().revoked_count());
}

#[test]
fn revoke_current_is_idempotent() {
    let mut publisher = Publisher::new(MemoryUrlStore::new());
    let mut page = RecordingPage::default();
    publisher.publish(&encoded_card(), &mut page);
    publisher.revoke_current();
    publisher.revoke_current();
    assert_eq!(0, publisher.store().live_count());
    assert_eq!(1, publisher.store().revoked_count());
    assert!(publisher.current().is_none());
}

#[test]
fn revocation_failures_do_not_block_replacement() {
    struct FailingStore(MemoryUrlStore);

    impl ObjectUrlStore for FailingStore {
        fn create(&mut self, media_type: &str, contents: &str) -> String {
            self.0.create(media_type, contents)
        }

        fn revoke(&mut self, _url: &str) -> Result<(), RevokeError> {
            Err(RevokeError::Host(anyhow::anyhow!("host refused")))
        }
    }

    let mut publisher = Publisher::new(FailingStore(MemoryUrlStore::new()));
    let mut page = RecordingPage::default();
    let text = encoded_card();
    let first_url = publisher.publish(&text, &mut page).url().to_owned();
    let second_url = publisher.publish(&text, &mut page).url().to_owned();
    assert_ne!(first_url, second_url);
    assert_eq!(Some(second_url.as_str()), publisher.current().map(PublishedResource::url));
}

#[test]
fn data_urls_embed_the_payload() {
    let url = data_url(vcard::MEDIA_TYPE, "BEGIN:VCARD\r\nVERSION:3.0\r\nEND:VCARD\r\n");
    assert!(url.starts_with("data:text/vcard;charset=utf-8,"));
    // CRLF survives the trip in encoded form.
    assert!(url.contains("%0D%0A"));
    let parsed = Url::parse(&url).unwrap();
    assert_eq!("data", parsed.scheme());
}

#[test]
fn data_url_payload_roundtrips_through_percent_decoding() {
    let text = encoded_card();
    let url = data_url(vcard::MEDIA_TYPE, &text);
    let (_, payload) = url.split_once(',').unwrap();
    let decoded = percent_decode_str(payload).decode_utf8().unwrap();
    assert_eq!(text, decoded);
}

#[test]
fn data_url_store_never_fails_to_revoke() {
    let mut store = DataUrlStore;
    let url = store.create(vcard::MEDIA_TYPE, "payload");
    assert!(store.revoke(&url).is_ok());
    assert!(store.revoke("data:text/vcard,never-created").is_ok());
}

#[test]
fn memory_store_rejects_unknown_urls() {
    let mut store = MemoryUrlStore::new();
    let url = store.create(vcard::MEDIA_TYPE, "payload");
    assert!(matches!(store.revoke("memory:contact-card/0"), Err(RevokeError::Unknown)));
    assert!(store.revoke(&url).is_ok());
    assert!(matches!(store.revoke(&url), Err(RevokeError::Unknown)));
    assert!(store.contents_of(&url).is_none());
}

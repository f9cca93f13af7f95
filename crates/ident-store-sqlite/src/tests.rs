//! Integration tests for `SqliteStore`.

use std::collections::BTreeMap;

use ident_core::{
  contact::{Contact, ContactId, LinkPrecedence},
  identity::{IdentifyRequest, Identity},
  store::ContactStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn request(email: Option<&str>, phone_number: Option<&str>) -> IdentifyRequest {
  IdentifyRequest::new(email.map(str::to_owned), phone_number.map(str::to_owned))
    .unwrap()
}

async fn identify(
  s: &SqliteStore,
  email: Option<&str>,
  phone_number: Option<&str>,
) -> Identity {
  s.identify(request(email, phone_number)).await.unwrap()
}

/// Check the stored linkage invariants: every secondary points at a primary,
/// and contacts sharing an email or phone number share that primary.
fn assert_consistent_groups(contacts: &[Contact]) {
  let by_id: BTreeMap<ContactId, &Contact> =
    contacts.iter().map(|c| (c.id, c)).collect();

  let root = |c: &Contact| -> ContactId {
    match c.link_precedence {
      LinkPrecedence::Primary => {
        assert_eq!(c.linked_id, None, "primary {} has a link", c.id);
        c.id
      }
      LinkPrecedence::Secondary => {
        let target = c.linked_id.expect("secondary without link");
        assert!(
          by_id[&target].is_primary(),
          "contact {} links to non-primary {target}",
          c.id
        );
        target
      }
    }
  };

  let mut owner_of_email: BTreeMap<&str, ContactId> = BTreeMap::new();
  let mut owner_of_phone: BTreeMap<&str, ContactId> = BTreeMap::new();
  for c in contacts {
    let r = root(c);
    if let Some(email) = c.email.as_deref() {
      let owner = *owner_of_email.entry(email).or_insert(r);
      assert_eq!(owner, r, "email {email} spans two groups");
    }
    if let Some(phone) = c.phone_number.as_deref() {
      let owner = *owner_of_phone.entry(phone).or_insert(r);
      assert_eq!(owner, r, "phone {phone} spans two groups");
    }
  }

  for c in contacts.iter().filter(|c| !c.is_primary()) {
    let primary = by_id[&root(c)];
    assert!(
      primary.seniority() < c.seniority(),
      "primary {} is younger than member {}",
      primary.id,
      c.id
    );
  }
}

// ─── Identify ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn identify_creates_primary() {
  let s = store().await;

  let identity = identify(&s, Some("doc@hillvalley.edu"), Some("123456")).await;
  assert!(identity.secondary_contact_ids.is_empty());

  let stored = s
    .get_contact(identity.primary_contact_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.email.as_deref(), Some("doc@hillvalley.edu"));
  assert_eq!(stored.phone_number.as_deref(), Some("123456"));
  assert_eq!(stored.link_precedence, LinkPrecedence::Primary);
  assert_eq!(stored.linked_id, None);
  assert_eq!(stored.created_at, stored.updated_at);
}

#[tokio::test]
async fn resubmission_adds_no_rows() {
  let s = store().await;

  let first = identify(&s, Some("a@x.com"), Some("111")).await;
  let second = identify(&s, Some("a@x.com"), Some("111")).await;

  assert_eq!(first, second);
  assert_eq!(s.list_contacts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn novel_phone_is_recorded_as_secondary() {
  let s = store().await;

  let first = identify(&s, Some("lorraine@hillvalley.edu"), Some("123456")).await;
  let second = identify(&s, Some("lorraine@hillvalley.edu"), Some("999")).await;

  assert_eq!(second.primary_contact_id, first.primary_contact_id);
  assert_eq!(second.phone_numbers, ["123456", "999"]);
  assert_eq!(second.secondary_contact_ids.len(), 1);

  let added = s
    .get_contact(second.secondary_contact_ids[0])
    .await
    .unwrap()
    .unwrap();
  assert_eq!(added.email, None);
  assert_eq!(added.phone_number.as_deref(), Some("999"));
  assert_eq!(added.linked_id, Some(first.primary_contact_id));
}

#[tokio::test]
async fn two_primaries_merge_into_the_older() {
  let s = store().await;

  let a = identify(&s, Some("a@x.com"), Some("111")).await;
  let b = identify(&s, Some("b@x.com"), Some("222")).await;
  let merged = identify(&s, Some("a@x.com"), Some("222")).await;

  assert_eq!(merged.primary_contact_id, a.primary_contact_id);
  assert_eq!(merged.emails, ["a@x.com", "b@x.com"]);
  assert_eq!(merged.phone_numbers, ["111", "222"]);
  assert_eq!(merged.secondary_contact_ids, [b.primary_contact_id]);

  let demoted = s
    .get_contact(b.primary_contact_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(demoted.link_precedence, LinkPrecedence::Secondary);
  assert_eq!(demoted.linked_id, Some(a.primary_contact_id));
  assert!(demoted.updated_at > demoted.created_at);

  let all = s.list_contacts().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_consistent_groups(&all);
}

#[tokio::test]
async fn merge_repoints_secondaries_of_demoted_primary() {
  let s = store().await;

  let a = identify(&s, Some("a@x.com"), Some("111")).await;
  let b = identify(&s, Some("b@x.com"), Some("222")).await;
  let c = identify(&s, Some("c@x.com"), Some("222")).await;
  let c_id = c.secondary_contact_ids[0];

  let merged = identify(&s, Some("c@x.com"), Some("111")).await;

  assert_eq!(merged.primary_contact_id, a.primary_contact_id);
  assert_eq!(merged.secondary_contact_ids, [b.primary_contact_id, c_id]);

  let all = s.list_contacts().await.unwrap();
  assert_eq!(all.iter().filter(|c| c.is_primary()).count(), 1);
  assert_consistent_groups(&all);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_contact_missing_returns_none() {
  let s = store().await;
  assert!(s.get_contact(42).await.unwrap().is_none());
}

#[tokio::test]
async fn list_contacts_is_ordered_by_id() {
  let s = store().await;
  identify(&s, Some("a@x.com"), None).await;
  identify(&s, None, Some("222")).await;
  identify(&s, Some("a@x.com"), Some("222")).await;

  let ids: Vec<ContactId> =
    s.list_contacts().await.unwrap().iter().map(|c| c.id).collect();
  let mut sorted = ids.clone();
  sorted.sort();
  assert_eq!(ids, sorted);
  assert_eq!(ids.len(), 2);
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_reconciliation_rolls_back() {
  let s = store().await;

  let a = identify(&s, Some("a@x.com"), Some("111")).await;
  let b = identify(&s, Some("b@x.com"), Some("222")).await;
  let c = identify(&s, Some("c@x.com"), Some("222")).await;
  let c_id = c.secondary_contact_ids[0];

  // Fail the re-link of `c`, which comes after `b` has been demoted.
  s.conn
    .call(move |conn| {
      conn.execute_batch(&format!(
        "CREATE TRIGGER fail_relink BEFORE UPDATE ON contacts
         WHEN NEW.id = {c_id}
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;"
      ))?;
      Ok(())
    })
    .await
    .unwrap();

  let result = s.identify(request(Some("a@x.com"), Some("222"))).await;
  assert!(result.is_err());

  let b_after = s
    .get_contact(b.primary_contact_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(b_after.link_precedence, LinkPrecedence::Primary);
  assert_eq!(b_after.linked_id, None);

  let all = s.list_contacts().await.unwrap();
  assert_eq!(all.len(), 3);
  assert_eq!(
    all.iter().filter(|c| c.is_primary()).map(|c| c.id).collect::<Vec<_>>(),
    [a.primary_contact_id, b.primary_contact_id]
  );
  assert_consistent_groups(&all);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

/// Requests that chain ten phone numbers and ten emails into one identity
/// from both ends at once.
fn overlapping_requests() -> Vec<IdentifyRequest> {
  (0..10)
    .flat_map(|i| {
      let email = format!("user{i}@x.com");
      [
        request(Some(email.as_str()), Some(i.to_string().as_str())),
        request(Some(email.as_str()), Some((i + 1).to_string().as_str())),
      ]
    })
    .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_requests_keep_one_primary() {
  let s = store().await;

  let handles: Vec<_> = overlapping_requests()
    .into_iter()
    .rev()
    .map(|req| {
      let s = s.clone();
      tokio::spawn(async move { s.identify(req).await })
    })
    .collect();
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  let all = s.list_contacts().await.unwrap();
  assert_consistent_groups(&all);
  assert_eq!(all.iter().filter(|c| c.is_primary()).count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_connections_on_one_file_keep_one_primary() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ident.db");
  let first = SqliteStore::open(&path).await.unwrap();
  let second = SqliteStore::open(&path).await.unwrap();

  let handles: Vec<_> = overlapping_requests()
    .into_iter()
    .enumerate()
    .map(|(i, req)| {
      let s = if i % 2 == 0 { first.clone() } else { second.clone() };
      tokio::spawn(async move { s.identify(req).await })
    })
    .collect();
  for handle in handles {
    handle.await.unwrap().unwrap();
  }

  let all = first.list_contacts().await.unwrap();
  assert_consistent_groups(&all);
  assert_eq!(all.iter().filter(|c| c.is_primary()).count(), 1);

  let emails: std::collections::BTreeSet<_> =
    all.iter().filter_map(|c| c.email.clone()).collect();
  assert_eq!(emails.len(), 10);
}

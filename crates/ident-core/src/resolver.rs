//! [`IdentityResolver`] — reconciles an identify request against the stored
//! contacts.
//!
//! One call to [`IdentityResolver::resolve`] runs the whole algorithm:
//!
//! 1. look up contacts that share the request's email or phone number;
//! 2. with no match, create a fresh primary and stop;
//! 3. otherwise expand the matches to their connected group, elect the oldest
//!    member as primary and re-link every other member to it;
//! 4. record the request's email or phone as one new secondary if the group
//!    has not seen it yet;
//! 5. consolidate the group into an [`Identity`].
//!
//! The resolver performs no locking of its own. Callers that need the steps
//! to be atomic hand it a repository bound to a transaction.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
  contact::{Contact, ContactId, LinkPrecedence, Linkage, NewContact},
  identity::{IdentifyRequest, Identity},
  repository::ContactRepository,
};

/// A connected group keyed by contact id.
type Group = BTreeMap<ContactId, Contact>;

pub struct IdentityResolver<R> {
  repo: R,
}

impl<R: ContactRepository> IdentityResolver<R> {
  pub fn new(repo: R) -> Self { Self { repo } }

  pub fn into_inner(self) -> R { self.repo }

  /// Reconcile `request`, stamping every write with `now`.
  pub fn resolve(
    &mut self,
    request: &IdentifyRequest,
    now: DateTime<Utc>,
  ) -> Result<Identity, R::Error> {
    let matches = self
      .repo
      .find_by_email_or_phone(request.email(), request.phone_number())?;

    if matches.is_empty() {
      return self.create_primary(request, now);
    }

    let mut group = self.expand(matches)?;

    // Expansion keeps every direct match, so the group is never empty here.
    let Some(primary_id) = select_primary(&group) else {
      return self.create_primary(request, now);
    };

    self.normalize(&mut group, primary_id, now)?;

    if let Some(contact) =
      self.insert_novel(&group, primary_id, request, now)?
    {
      group.insert(contact.id, contact);
    }

    Ok(consolidate(&group, primary_id))
  }

  // ── Steps ───────────────────────────────────────────────────────────────

  fn create_primary(
    &mut self,
    request: &IdentifyRequest,
    now: DateTime<Utc>,
  ) -> Result<Identity, R::Error> {
    let new = NewContact::new(
      request.email().map(str::to_owned),
      request.phone_number().map(str::to_owned),
      Linkage::Primary,
      now,
    );
    let id = self.repo.insert(new.clone())?;
    info!(contact_id = id, "created primary contact");

    let group = Group::from([(id, new.into_contact(id))]);
    Ok(consolidate(&group, id))
  }

  /// Grow the direct matches into their connected group.
  ///
  /// Secondaries always point straight at a primary, so a single lookup over
  /// the matched ids and their primaries reaches every member.
  fn expand(&mut self, matches: Vec<Contact>) -> Result<Group, R::Error> {
    let mut frontier = BTreeSet::new();
    for contact in &matches {
      frontier.insert(contact.id);
      if contact.link_precedence == LinkPrecedence::Secondary
        && let Some(primary) = contact.linked_id
      {
        frontier.insert(primary);
      }
    }

    let related = self.repo.find_by_ids_or_linked_ids(&frontier)?;

    let mut group: Group = matches.into_iter().map(|c| (c.id, c)).collect();
    for contact in related {
      group.insert(contact.id, contact);
    }

    debug!(
      frontier = frontier.len(),
      group = group.len(),
      "expanded connected group"
    );
    Ok(group)
  }

  /// Re-link every member whose stored linkage differs from its target.
  fn normalize(
    &mut self,
    group: &mut Group,
    primary_id: ContactId,
    now: DateTime<Utc>,
  ) -> Result<(), R::Error> {
    for contact in group.values_mut() {
      let target = if contact.id == primary_id {
        Linkage::Primary
      } else {
        Linkage::Secondary(primary_id)
      };
      if contact.linkage() == Some(target) {
        continue;
      }

      if contact.is_primary() && target != Linkage::Primary {
        info!(
          contact_id = contact.id,
          primary_id, "demoting primary contact into an older group"
        );
      } else {
        debug!(contact_id = contact.id, primary_id, "re-linking contact");
      }

      self.repo.update_linkage(contact.id, target, now)?;
      contact.link_precedence = target.precedence();
      contact.linked_id = target.linked_id();
      contact.updated_at = now;
    }
    Ok(())
  }

  /// Insert one secondary carrying whichever request fields the group has not
  /// seen. Returns the stored contact, or `None` if nothing was novel.
  fn insert_novel(
    &mut self,
    group: &Group,
    primary_id: ContactId,
    request: &IdentifyRequest,
    now: DateTime<Utc>,
  ) -> Result<Option<Contact>, R::Error> {
    let known = KnownValues::collect(group, primary_id);

    let email = request.email().filter(|e| !known.has_email(e));
    let phone_number = request.phone_number().filter(|p| !known.has_phone(p));
    if email.is_none() && phone_number.is_none() {
      return Ok(None);
    }

    let new = NewContact::new(
      email.map(str::to_owned),
      phone_number.map(str::to_owned),
      Linkage::Secondary(primary_id),
      now,
    );
    let id = self.repo.insert(new.clone())?;
    info!(contact_id = id, primary_id, "recorded novel contact information");

    Ok(Some(new.into_contact(id)))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// The oldest member of the group, lowest id on a tie.
fn select_primary(group: &Group) -> Option<ContactId> {
  group.values().min_by_key(|c| c.seniority()).map(|c| c.id)
}

fn consolidate(group: &Group, primary_id: ContactId) -> Identity {
  let known = KnownValues::collect(group, primary_id);
  let secondary_contact_ids = group
    .values()
    .filter(|c| c.link_precedence == LinkPrecedence::Secondary)
    .map(|c| c.id)
    .collect();

  Identity {
    primary_contact_id: primary_id,
    emails: known.emails,
    phone_numbers: known.phone_numbers,
    secondary_contact_ids,
  }
}

/// Distinct emails and phone numbers of a group: the primary's first, then
/// the other members from oldest to newest.
struct KnownValues {
  emails:        Vec<String>,
  phone_numbers: Vec<String>,
}

impl KnownValues {
  fn collect(group: &Group, primary_id: ContactId) -> Self {
    let mut members: Vec<&Contact> = group.values().collect();
    members.sort_by_key(|c| (c.id != primary_id, c.seniority()));

    let mut known = Self { emails: Vec::new(), phone_numbers: Vec::new() };
    for contact in members {
      push_distinct(&mut known.emails, contact.email.as_deref());
      push_distinct(&mut known.phone_numbers, contact.phone_number.as_deref());
    }
    known
  }

  fn has_email(&self, email: &str) -> bool {
    self.emails.iter().any(|e| e == email)
  }

  fn has_phone(&self, phone_number: &str) -> bool {
    self.phone_numbers.iter().any(|p| p == phone_number)
  }
}

fn push_distinct(values: &mut Vec<String>, value: Option<&str>) {
  if let Some(value) = value
    && !values.iter().any(|v| v == value)
  {
    values.push(value.to_owned());
  }
}

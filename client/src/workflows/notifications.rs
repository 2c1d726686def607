use anyhow::Result;
use log::debug;

use shared::Ticket;

use crate::storage::MarkerStorage;

/// The newest volunteer reply for a parent plus its unread state.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyDigest {
    pub latest_reply: Option<Ticket>,
    pub has_unread: bool,
}

/// Derives the "has unread volunteer reply" badge from a ticket list and the
/// persisted last-viewed marker.
///
/// A qualifying reply is a closed ticket with a volunteer attached. The
/// newest one by creation time is the latest reply; it is unread until its
/// id is recorded as viewed. Re-deriving over unchanged inputs yields the
/// same answer.
pub struct TicketNotificationTracker<S: MarkerStorage> {
    storage: S,
}

impl<S: MarkerStorage> TicketNotificationTracker<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Compute the latest reply and unread flag for a parent's tickets.
    pub fn evaluate(&self, tickets: &[Ticket]) -> Result<ReplyDigest> {
        let mut replies: Vec<&Ticket> = tickets
            .iter()
            .filter(|ticket| ticket.has_volunteer_reply())
            .collect();
        replies.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let latest_reply = replies.first().map(|ticket| (*ticket).clone());
        let has_unread = match &latest_reply {
            None => false,
            Some(reply) => {
                let marker = self.storage.last_viewed_reply()?;
                marker.as_deref() != Some(reply.id.as_str())
            }
        };

        debug!(
            "Reply digest: latest={:?}, unread={}",
            latest_reply.as_ref().map(|t| t.id.as_str()),
            has_unread
        );
        Ok(ReplyDigest { latest_reply, has_unread })
    }

    /// Record a reply as viewed, clearing the unread badge for it.
    pub fn mark_viewed(&self, reply: &Ticket) -> Result<()> {
        self.storage.set_last_viewed_reply(&reply.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryMarkerStore;
    use chrono::{Duration, Utc};
    use shared::TicketStatus;

    fn reply(id: &str, hours_ago: i64) -> Ticket {
        Ticket {
            id: id.to_string(),
            parent_id: "p1".to_string(),
            parent_name: None,
            message: "Question".to_string(),
            status: TicketStatus::Closed,
            volunteer_id: Some("v1".to_string()),
            reply: Some("Answer".to_string()),
            created_at: Utc::now() - Duration::hours(hours_ago),
        }
    }

    fn open_ticket(id: &str) -> Ticket {
        Ticket {
            status: TicketStatus::Open,
            volunteer_id: None,
            reply: None,
            ..reply(id, 0)
        }
    }

    #[test]
    fn test_latest_reply_is_newest_closed_ticket_with_volunteer() {
        let tracker = TicketNotificationTracker::new(InMemoryMarkerStore::default());
        let tickets = vec![reply("t1", 5), reply("t2", 1), open_ticket("t3")];

        let digest = tracker.evaluate(&tickets).unwrap();
        assert_eq!(digest.latest_reply.as_ref().unwrap().id, "t2");
        assert!(digest.has_unread);
    }

    #[test]
    fn test_viewing_clears_the_unread_flag_idempotently() {
        let tracker = TicketNotificationTracker::new(InMemoryMarkerStore::default());
        let tickets = vec![reply("t1", 5), reply("t2", 1)];

        let digest = tracker.evaluate(&tickets).unwrap();
        assert!(digest.has_unread);

        tracker.mark_viewed(digest.latest_reply.as_ref().unwrap()).unwrap();
        let viewed = tracker.evaluate(&tickets).unwrap();
        assert!(!viewed.has_unread);

        // Unchanged inputs keep yielding the same answer.
        let again = tracker.evaluate(&tickets).unwrap();
        assert_eq!(again, viewed);
    }

    #[test]
    fn test_newer_reply_reinstates_the_badge() {
        let tracker = TicketNotificationTracker::new(InMemoryMarkerStore::default());
        let tickets = vec![reply("t1", 5)];
        let digest = tracker.evaluate(&tickets).unwrap();
        tracker.mark_viewed(digest.latest_reply.as_ref().unwrap()).unwrap();

        let with_newer = vec![reply("t1", 5), reply("t2", 1)];
        let digest = tracker.evaluate(&with_newer).unwrap();
        assert_eq!(digest.latest_reply.as_ref().unwrap().id, "t2");
        assert!(digest.has_unread);
    }

    #[test]
    fn test_no_qualifying_ticket_means_no_badge() {
        let tracker = TicketNotificationTracker::new(InMemoryMarkerStore::default());

        let digest = tracker.evaluate(&[]).unwrap();
        assert_eq!(digest.latest_reply, None);
        assert!(!digest.has_unread);

        // Open tickets and closed tickets without a volunteer do not count.
        let mut closed_without_volunteer = open_ticket("t1");
        closed_without_volunteer.status = TicketStatus::Closed;
        let digest = tracker
            .evaluate(&[open_ticket("t2"), closed_without_volunteer])
            .unwrap();
        assert_eq!(digest.latest_reply, None);
        assert!(!digest.has_unread);
    }
}

use log::{info, warn};
use thiserror::Error;

use shared::{CreateTicketRequest, MessageResponse, Ticket, TicketReplyRequest, TicketStatus};

use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::session::Session;

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Describe your concern before sending.")]
    EmptyMessage,
    #[error("Type a reply before sending.")]
    EmptyReply,
    #[error("Select a ticket to reply to first.")]
    NoTicketSelected,
    #[error("A message is already being sent.")]
    RequestOutstanding,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Parent-side ticket composer.
pub struct TicketComposer {
    api: ApiClient,
    session: Session,
    pub message: String,
    pub sending: bool,
    pub sent: bool,
    pub error: Option<String>,
}

impl TicketComposer {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            message: String::new(),
            sending: false,
            sent: false,
            error: None,
        }
    }

    /// Send the composed ticket. An empty message (after trimming) is
    /// blocked locally; on success the composer clears for the next ticket.
    pub async fn send(&mut self) -> Result<MessageResponse, TicketError> {
        if self.sending {
            return Err(TicketError::RequestOutstanding);
        }
        let message = self.message.trim().to_string();
        if message.is_empty() {
            return Err(TicketError::EmptyMessage);
        }

        self.sending = true;
        self.sent = false;
        self.error = None;
        let request = CreateTicketRequest {
            parent_id: self.session.user_id.clone(),
            message,
        };
        let result = self.api.create_ticket(&request).await;
        self.sending = false;

        match result {
            Ok(ack) => {
                info!("Ticket raised by parent {}", self.session.user_id);
                self.message.clear();
                self.sent = true;
                Ok(ack)
            }
            Err(error) => {
                warn!("Ticket creation failed: {}", error);
                self.error = Some(error.to_string());
                Err(error.into())
            }
        }
    }
}

/// Volunteer-side ticket inbox: the full ticket list plus the reply flow
/// for open tickets.
pub struct TicketInbox {
    api: ApiClient,
    session: Session,
    pub tickets: Vec<Ticket>,
    pub loading: bool,
    pub replying_to: Option<String>,
    pub reply_message: String,
    pub reply_sending: bool,
    pub error: Option<String>,
}

impl TicketInbox {
    pub fn new(api: ApiClient, session: Session) -> Self {
        Self {
            api,
            session,
            tickets: Vec::new(),
            loading: false,
            replying_to: None,
            reply_message: String::new(),
            reply_sending: false,
            error: None,
        }
    }

    /// Re-fetch the ticket list.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.loading = true;
        self.error = None;
        let result = self.api.all_tickets().await;
        self.loading = false;
        match result {
            Ok(tickets) => {
                self.tickets = tickets;
                Ok(())
            }
            Err(error) => {
                warn!("Ticket fetch failed: {}", error);
                self.tickets.clear();
                self.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    /// Tickets still waiting for a volunteer reply.
    pub fn open_tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.iter().filter(|t| t.status == TicketStatus::Open)
    }

    pub fn start_reply(&mut self, ticket_id: &str) {
        self.replying_to = Some(ticket_id.to_string());
        self.reply_message.clear();
    }

    pub fn cancel_reply(&mut self) {
        self.replying_to = None;
        self.reply_message.clear();
    }

    /// Send the reply for the selected ticket. The backend closes the ticket
    /// and records the reply together; on success the list is re-fetched so
    /// the ticket leaves the open set.
    pub async fn send_reply(&mut self) -> Result<MessageResponse, TicketError> {
        if self.reply_sending {
            return Err(TicketError::RequestOutstanding);
        }
        let ticket_id = self.replying_to.clone().ok_or(TicketError::NoTicketSelected)?;
        let reply = self.reply_message.trim().to_string();
        if reply.is_empty() {
            return Err(TicketError::EmptyReply);
        }

        self.reply_sending = true;
        self.error = None;
        let request = TicketReplyRequest {
            reply,
            volunteer_id: self.session.user_id.clone(),
        };
        let result = self.api.reply_to_ticket(&ticket_id, &request).await;
        self.reply_sending = false;

        match result {
            Ok(ack) => {
                info!("Replied to ticket {}", ticket_id);
                self.replying_to = None;
                self.reply_message.clear();
                if let Err(error) = self.refresh().await {
                    warn!("Ticket refresh after reply failed: {}", error);
                }
                Ok(ack)
            }
            Err(error) => {
                warn!("Ticket reply failed: {}", error);
                self.error = Some(error.to_string());
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_empty_ticket_message_is_blocked_locally() {
        let mut composer = TicketComposer::new(ApiClient::new(), Session::parent("p1", "Priya"));
        composer.message = "   ".to_string();
        assert!(matches!(composer.send().await, Err(TicketError::EmptyMessage)));
        assert!(!composer.sent);
    }

    #[tokio::test]
    async fn test_reply_requires_a_selected_ticket_and_text() {
        let mut inbox = TicketInbox::new(ApiClient::new(), Session::volunteer("v1", "Ravi"));
        assert!(matches!(inbox.send_reply().await, Err(TicketError::NoTicketSelected)));

        inbox.start_reply("t1");
        inbox.reply_message = "  ".to_string();
        assert!(matches!(inbox.send_reply().await, Err(TicketError::EmptyReply)));
    }

    #[test]
    fn test_open_tickets_filter() {
        let mut inbox = TicketInbox::new(ApiClient::new(), Session::volunteer("v1", "Ravi"));
        inbox.tickets = vec![
            Ticket {
                id: "t1".to_string(),
                parent_id: "p1".to_string(),
                parent_name: Some("Priya".to_string()),
                message: "Help".to_string(),
                status: TicketStatus::Open,
                volunteer_id: None,
                reply: None,
                created_at: Utc::now(),
            },
            Ticket {
                id: "t2".to_string(),
                parent_id: "p1".to_string(),
                parent_name: Some("Priya".to_string()),
                message: "Older question".to_string(),
                status: TicketStatus::Closed,
                volunteer_id: Some("v1".to_string()),
                reply: Some("Answered".to_string()),
                created_at: Utc::now(),
            },
        ];
        let open: Vec<_> = inbox.open_tickets().map(|t| t.id.as_str()).collect();
        assert_eq!(open, vec!["t1"]);
    }

    #[test]
    fn test_cancel_reply_clears_the_draft() {
        let mut inbox = TicketInbox::new(ApiClient::new(), Session::volunteer("v1", "Ravi"));
        inbox.start_reply("t1");
        inbox.reply_message = "draft".to_string();
        inbox.cancel_reply();
        assert_eq!(inbox.replying_to, None);
        assert!(inbox.reply_message.is_empty());
    }
}

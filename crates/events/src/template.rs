//! Plain-text rendering of account notifications.

use crate::bus::AccountEvent;

/// Fallback portal address when `CLIENT_URL` is unset.
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:3000";

const SIGNATURE: &str = "Best regards,\nJanConnect Team\nMinistry of Social Justice & Empowerment";

/// A message ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Render `event` into a subject and body. `client_url` is the portal base
/// used for the login link.
pub fn render(event: &AccountEvent, client_url: &str) -> RenderedMessage {
    let recipient = event.recipient();
    let (subject, body) = match event {
        AccountEvent::Approved { .. } => {
            let mut details = format!(
                "- Email: {}\n- Role: {}\n",
                recipient.email, recipient.role
            );
            if let Some(agency) = &recipient.agency {
                details.push_str(&format!("- Agency: {agency}\n"));
            }
            if let Some(state) = &recipient.state {
                details.push_str(&format!("- State: {state}\n"));
            }
            let login = format!("{}/login", client_url.trim_end_matches('/'));
            (
                "Your JanConnect Account Has Been Approved".to_string(),
                format!(
                    "Dear {},\n\n\
                     Your JanConnect account has been approved by the administrator.\n\n\
                     Account Details:\n{details}\n\
                     You can now log in to the JanConnect portal using your credentials:\n\
                     Login URL: {login}\n\n\
                     If you have any questions or need assistance, please contact the support team.\n\n\
                     {SIGNATURE}\n",
                    recipient.name
                ),
            )
        }
        AccountEvent::Rejected { reason, .. } => {
            let reason_line = reason
                .as_deref()
                .map(|r| format!("Reason: {r}\n\n"))
                .unwrap_or_default();
            (
                "JanConnect Account Registration Update".to_string(),
                format!(
                    "Dear {},\n\n\
                     We regret to inform you that your JanConnect account registration has not been approved.\n\n\
                     {reason_line}\
                     If you believe this is an error or would like more information, please contact the administrator.\n\n\
                     {SIGNATURE}\n",
                    recipient.name
                ),
            )
        }
    };

    RenderedMessage {
        to: recipient.email.clone(),
        subject,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::tests::recipient;

    #[test]
    fn approval_lists_details_and_login_link() {
        let msg = render(
            &AccountEvent::approved(recipient()),
            "https://janconnect.gov.in/",
        );
        assert_eq!(msg.to, "meera@example.org");
        assert!(msg.subject.contains("Approved"));
        assert!(msg.body.contains("- Role: Agency-User"));
        assert!(msg.body.contains("- Agency: Chennai Social Welfare Board"));
        assert!(!msg.body.contains("- State:"));
        assert!(msg.body.contains("https://janconnect.gov.in/login"));
    }

    #[test]
    fn rejection_includes_reason_when_given() {
        let msg = render(
            &AccountEvent::rejected(recipient(), Some("Invalid agency selected".into())),
            DEFAULT_CLIENT_URL,
        );
        assert!(msg.body.contains("Reason: Invalid agency selected"));

        let without = render(&AccountEvent::rejected(recipient(), None), DEFAULT_CLIENT_URL);
        assert!(!without.body.contains("Reason:"));
    }
}

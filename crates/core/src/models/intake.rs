use serde::{Deserialize, Serialize};

use crate::MAX_INTAKE_ATTACHMENTS;
use crate::errors::{BookingError, BookingResult};

/// Contact details carried through to the meeting invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Reference to a customer-uploaded attachment (upload itself is handled
/// elsewhere; only the reference travels with the booking).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub file_name: String,
    pub url: String,
}

/// Customer-supplied intake details, immutable once set on a draft.
///
/// The two consultation kinds share one schedule/payment state machine; the
/// tag only changes what the customer is asked up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntakePayload {
    Dermatology {
        contact: ContactInfo,
        skin_type: String,
        concerns: Vec<String>,
        current_routine: Option<String>,
        #[serde(default)]
        attachments: Vec<AttachmentRef>,
    },
    Creator {
        contact: ContactInfo,
        topic: String,
        goals: Option<String>,
        #[serde(default)]
        attachments: Vec<AttachmentRef>,
    },
}

impl IntakePayload {
    pub fn contact(&self) -> &ContactInfo {
        match self {
            IntakePayload::Dermatology { contact, .. } => contact,
            IntakePayload::Creator { contact, .. } => contact,
        }
    }

    pub fn attachments(&self) -> &[AttachmentRef] {
        match self {
            IntakePayload::Dermatology { attachments, .. } => attachments,
            IntakePayload::Creator { attachments, .. } => attachments,
        }
    }

    /// Rejects payloads that must never reach the store: missing contact
    /// email or more attachments than the fixed cap.
    pub fn validate(&self) -> BookingResult<()> {
        if self.contact().email.trim().is_empty() {
            return Err(BookingError::Validation(
                "Contact email is required".to_string(),
            ));
        }
        if self.attachments().len() > MAX_INTAKE_ATTACHMENTS {
            return Err(BookingError::Validation(format!(
                "At most {} attachments are allowed, got {}",
                MAX_INTAKE_ATTACHMENTS,
                self.attachments().len()
            )));
        }
        Ok(())
    }
}

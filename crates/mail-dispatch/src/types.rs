//! Dispatch request types.

use serde::{Deserialize, Serialize};

/// Subject of the email sent to the registrant.
pub const CONFIRMATION_SUBJECT: &str = "Your early access request has been received";

/// Subject of the admin alert for a new signup.
pub const NOTIFICATION_SUBJECT: &str = "New early access request";

/// Subject of the admin alert for a repeated signup.
pub const DUPLICATE_NOTIFICATION_SUBJECT: &str = "Repeated early access request";

/// Template the dispatch endpoint renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailKind {
    /// Admin alert.
    Notification,
    /// Receipt sent to the registrant.
    Confirmation,
}

/// Signup details rendered into the templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailData {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub phone: String,
    pub email: String,
}

/// Body posted to the dispatch endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchRequest<'a> {
    pub data: &'a EmailData,
    pub to: &'a str,
    #[serde(rename = "type")]
    pub kind: EmailKind,
    pub subject: &'a str,
}

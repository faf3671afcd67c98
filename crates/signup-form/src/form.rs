//! Form model: fields, validation and submission state.

use crate::phone::{format_phone, is_valid_phone, with_country_prefix};
use crate::types::SignupPayload;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid regex")
});

/// Whether `value` looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    if value.len() > MAX_EMAIL_LEN {
        return false;
    }
    match value.split_once('@') {
        Some((local, _)) if !local.is_empty() && local.len() <= MAX_LOCAL_PART_LEN => {
            EMAIL_PATTERN.is_match(value)
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Company,
    Email,
    Phone,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::FirstName,
        Field::LastName,
        Field::Company,
        Field::Email,
        Field::Phone,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::Company => "company",
            Field::Email => "email",
            Field::Phone => "phone",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    InvalidEmail,
    InvalidPhone,
}

/// Form-level outcome shown next to the submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormError {
    AlreadyRegistered,
    RecaptchaFailed,
    ServerError,
    TokenUnavailable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub value: String,
    pub touched: bool,
}

/// Observable submission state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    pub loading: bool,
    pub submitted: bool,
    pub form_errors: BTreeSet<FormError>,
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    first_name: FieldState,
    last_name: FieldState,
    company: FieldState,
    email: FieldState,
    phone: FieldState,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, field: Field) -> &FieldState {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Company => &self.company,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut FieldState {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Company => &mut self.company,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        &self.field(field).value
    }

    /// Set a field from user input. Phone input is routed through
    /// [`SignupForm::set_phone`].
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if field == Field::Phone {
            self.set_phone(&value);
            return;
        }
        let state = self.field_mut(field);
        state.value = value;
        state.touched = true;
    }

    /// Store the formatted phone number.
    ///
    /// Returns `true` when the stored value differs from `raw`, i.e. the
    /// input was rewritten and the view should show the new value. Writing
    /// back an already formatted value returns `false` and changes nothing,
    /// so a view echoing the rewrite does not trigger another pass.
    pub fn set_phone(&mut self, raw: &str) -> bool {
        let formatted = format_phone(raw);
        let rewritten = formatted != raw;
        self.phone.value = formatted;
        self.phone.touched = true;
        rewritten
    }

    pub fn mark_all_touched(&mut self) {
        for field in Field::ALL {
            self.field_mut(field).touched = true;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validation failure for one field, if any.
    pub fn error(&self, field: Field) -> Option<FieldError> {
        let value = self.value(field);
        if value.trim().is_empty() {
            return Some(FieldError::Required);
        }
        match field {
            Field::Email if !is_valid_email(value) => Some(FieldError::InvalidEmail),
            Field::Phone if !is_valid_phone(value) => Some(FieldError::InvalidPhone),
            _ => None,
        }
    }

    /// Errors the view should display: only for touched fields.
    pub fn visible_errors(&self) -> Vec<(Field, FieldError)> {
        Field::ALL
            .into_iter()
            .filter(|f| self.field(*f).touched)
            .filter_map(|f| self.error(f).map(|e| (f, e)))
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        Field::ALL.into_iter().all(|f| self.error(f).is_none())
    }

    /// Build the request payload, prefixing the phone with `country_prefix`.
    pub fn payload(&self, country_prefix: &str) -> SignupPayload {
        SignupPayload {
            first_name: self.first_name.value.clone(),
            last_name: self.last_name.value.clone(),
            company: self.company.value.clone(),
            email: self.email.value.clone(),
            phone: with_country_prefix(country_prefix, &self.phone.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> SignupForm {
        let mut form = SignupForm::new();
        form.set(Field::FirstName, "Jane");
        form.set(Field::LastName, "Doe");
        form.set(Field::Company, "Acme");
        form.set(Field::Email, "jane@acme.io");
        form.set(Field::Phone, "0898353650");
        form
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("jane@acme.io"));
        assert!(is_valid_email("jane.doe+news@mail.acme.io"));
        assert!(is_valid_email("jane@localhost"));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("@acme.io"));
        assert!(!is_valid_email("jane@acme..io"));
        assert!(!is_valid_email(&format!("{}@acme.io", "a".repeat(65))));
    }

    #[test]
    fn test_empty_form_is_invalid() {
        let form = SignupForm::new();
        assert!(!form.is_valid());
        for field in Field::ALL {
            assert_eq!(form.error(field), Some(FieldError::Required));
        }
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let mut form = SignupForm::new();
        assert!(form.visible_errors().is_empty());

        form.mark_all_touched();
        assert_eq!(form.visible_errors().len(), 5);
    }

    #[test]
    fn test_filled_form_is_valid() {
        let form = filled();
        assert!(form.is_valid());
        assert_eq!(form.value(Field::Phone), "898-353-650");
    }

    #[test]
    fn test_invalid_email_and_phone() {
        let mut form = filled();
        form.set(Field::Email, "not-an-email");
        form.set(Field::Phone, "8983");

        assert_eq!(form.error(Field::Email), Some(FieldError::InvalidEmail));
        assert_eq!(form.error(Field::Phone), Some(FieldError::InvalidPhone));
        assert!(!form.is_valid());
    }

    #[test]
    fn test_whitespace_is_required_error() {
        let mut form = filled();
        form.set(Field::Company, "   ");
        assert_eq!(form.error(Field::Company), Some(FieldError::Required));
    }

    #[test]
    fn test_set_phone_reports_rewrite() {
        let mut form = SignupForm::new();

        assert!(form.set_phone("0898353650"));
        assert_eq!(form.value(Field::Phone), "898-353-650");

        // Echoing the rewritten value back is a no-op.
        assert!(!form.set_phone("898-353-650"));
        assert_eq!(form.value(Field::Phone), "898-353-650");
    }

    #[test]
    fn test_payload_prefixes_phone() {
        let payload = filled().payload("+359");
        assert_eq!(payload.phone, "+359 898-353-650");
        assert_eq!(payload.email, "jane@acme.io");
        assert_eq!(payload.first_name, "Jane");
    }

    #[test]
    fn test_reset() {
        let mut form = filled();
        form.reset();
        assert_eq!(form.value(Field::FirstName), "");
        assert!(!form.field(Field::FirstName).touched);
    }
}

//! UI-agnostic signup form.
//!
//! [`SignupController`] owns the form model and drives one submission:
//! bot-check token, call to the signup endpoint and mapping of the reply
//! onto form-level errors. [`Analytics`] loads the tag script only while
//! the visitor has accepted cookies and reports successful signups as ad
//! conversions.

pub mod analytics;
pub mod api;
pub mod consent;
pub mod controller;
pub mod error;
pub mod form;
pub mod phone;
pub mod recaptcha;
pub mod script;
pub mod types;

pub use analytics::{Analytics, AnalyticsConfig, DataLayer, TagCommand, TagSink};
pub use api::{HttpSignupApi, SignupApi};
pub use consent::{ConsentManager, ConsentSnapshot, ConsentStore, MemoryConsentStore};
pub use controller::{ConversionTracker, SignupController, SubmitOutcome};
pub use error::{ApiError, ScriptError, TokenError};
pub use form::{Field, FieldError, FormError, SignupForm, SubmissionState};
pub use phone::{format_phone, is_valid_phone};
pub use recaptcha::{ChallengeRuntime, Platform, RecaptchaTokenSource, TokenProvider};
pub use script::{ScriptLoader, ScriptResource, ScriptStatus};
pub use types::{ProcessSignupRequest, SignupPayload, SignupResponse, SignupStatus};

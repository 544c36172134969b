//! User-facing messages for backend errors.
//!
//! Backend error bodies are matched against the business rules the console
//! knows about; anything else gets a generic message.

use serde_json::Value;

use crate::error::EngineError;

/// Shown when a backend error matches no known rule.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// An error response from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendError {
    /// HTTP status code.
    pub status: u16,
    /// Response body, JSON when the backend sent any.
    pub body: Value,
}

impl BackendError {
    /// Creates a backend error.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Converts the error into an engine error carrying the user-facing message.
    ///
    /// `pin_limit` is the pin board's configured limit, quoted in the
    /// pin-limit message.
    pub fn into_engine_error(self, pin_limit: usize) -> EngineError {
        EngineError::BackendRejected {
            status: self.status,
            message: user_message(self.status, &self.body, pin_limit),
        }
    }
}

/// A business rule the backend enforces and the console explains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BusinessRule {
    PinLimit,
    AccountHasProjects,
    ProjectNotDraft,
}

impl BusinessRule {
    fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "PIN_LIMIT_EXCEEDED" | "PIN_LIMIT_REACHED" | "MAX_PINNED_ITEMS" => Some(Self::PinLimit),
            "ACCOUNT_HAS_PROJECTS" | "ACCOUNT_HAS_ACTIVE_PROJECTS" => Some(Self::AccountHasProjects),
            "PROJECT_NOT_DRAFT" | "PROJECT_STATUS_NOT_DRAFT" => Some(Self::ProjectNotDraft),
            _ => None,
        }
    }

    /// Recognises a rule from free text. Each rule needs its subject and the
    /// constraint together, so unrelated errors naming one of the words fall
    /// through.
    fn from_text(text: &str) -> Option<Self> {
        let has = |needle: &str| text.contains(needle);
        let any = |needles: &[&str]| needles.iter().any(|needle| text.contains(needle));

        if has("pin") && any(&["more than", "limit", "maximum", "exceed"]) {
            Some(Self::PinLimit)
        } else if has("account")
            && has("project")
            && any(&["delet", "has project", "has active", "still has", "with project", "existing project"])
        {
            Some(Self::AccountHasProjects)
        } else if has("draft") && has("project") && any(&["delet", "status", "only"]) {
            Some(Self::ProjectNotDraft)
        } else {
            None
        }
    }

    fn message(self, pin_limit: usize) -> String {
        match self {
            Self::PinLimit => format!("You cannot pin more than {} items.", pin_limit),
            Self::AccountHasProjects => {
                "This account still has projects and cannot be deleted.".to_string()
            }
            Self::ProjectNotDraft => "Only projects in DRAFT status can be deleted.".to_string(),
        }
    }
}

/// Maps a backend error to the message shown to the user.
///
/// The body's `code` field is matched first; free text in `code`, `message`
/// and `error` is consulted only when the code is unknown.
///
/// # Example
///
/// ```
/// use invoice_engine::client::{GENERIC_ERROR_MESSAGE, user_message};
/// use serde_json::json;
///
/// let body = json!({ "message": "Only DRAFT projects can be deleted" });
/// assert_eq!(user_message(400, &body, 5), "Only projects in DRAFT status can be deleted.");
/// assert_eq!(user_message(409, &json!({ "code": "PIN_LIMIT_EXCEEDED" }), 3), "You cannot pin more than 3 items.");
/// assert_eq!(user_message(500, &json!({}), 5), GENERIC_ERROR_MESSAGE);
/// ```
pub fn user_message(status: u16, body: &Value, pin_limit: usize) -> String {
    let rule = error_code(body)
        .and_then(BusinessRule::from_code)
        .or_else(|| BusinessRule::from_text(&error_text(body).to_lowercase()));

    match rule {
        Some(rule) => rule.message(pin_limit),
        None if status == 404 => "The item no longer exists. Refresh and try again.".to_string(),
        None => GENERIC_ERROR_MESSAGE.to_string(),
    }
}

/// The machine-readable code, at the top level or under `error`.
fn error_code(body: &Value) -> Option<&str> {
    body.get("code")
        .or_else(|| body.get("error").and_then(|e| e.get("code")))
        .and_then(Value::as_str)
}

/// Collects the human-readable parts of an error body.
fn error_text(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        Value::Object(map) => ["code", "message", "error"]
            .iter()
            .filter_map(|field| map.get(*field))
            .map(error_text)
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

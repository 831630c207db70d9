//! Classification of raw EVC responses.
//!
//! The backend has no structured status codes: a call succeeded when the body has
//! the shape the caller expects for its verb. [`classify`] is therefore always
//! parameterised by an [`Expectation`]:
//!
//! | Expectation | Success body |
//! |-------------|--------------|
//! | [`Expectation::Integer`] | `ok: 42`, `ok: -3` |
//! | [`Expectation::Records`] | `ok: JSON follows {"data": [...]}` |
//! | [`Expectation::Sentinel`] | exactly the given literal, e.g. `ok: customer added` |
//! | [`Expectation::Flag`] | either the affirmative or the negative literal |
//!
//! Whatever the expectation, a non-200 status is a network failure and a body from
//! [`CREDENTIAL_ERRORS`] is a credential failure.

use serde_json::Value;

use crate::bag::PropertyBag;

/// Prefix of every successful body, separator included.
pub const OK_PREFIX: &str = "ok: ";

/// Prefix of every rejected body, separator included.
pub const FAIL_PREFIX: &str = "fail: ";

/// Prefix of bodies carrying a JSON document.
pub const JSON_FOLLOWS_PREFIX: &str = "ok: JSON follows ";

/// Bodies meaning the api id, user, password or verb were refused.
pub const CREDENTIAL_ERRORS: &[&str] = &[
    "fail: no api authorization",
    "fail: no user authorization",
    "fail: unknown verb",
    "fail: no verb",
];

/// The success shape a call site expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// `ok: <integer>`.
    Integer,
    /// `ok: JSON follows <document with a data array>`.
    Records,
    /// One exact literal.
    Sentinel(&'static str),
    /// A yes/no question answered by one of two exact literals.
    Flag {
        /// Body meaning "yes".
        affirmative: &'static str,
        /// Body meaning "no". It usually starts with `fail:` but is not a failure.
        negative: &'static str,
    },
}

/// What a successful response carried.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Value of an `ok: <integer>` body.
    Integer(i64),
    /// Entries of the `data` array.
    Records(Vec<PropertyBag>),
    /// Answer to a [`Expectation::Flag`] question.
    Flag(bool),
    /// The expected sentinel was received.
    Acknowledged,
}

/// Result of classifying a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The body had the expected shape.
    Success(Payload),
    /// The backend refused the credentials or the verb.
    CredentialFailure(String),
    /// The backend answered, but not with the expected shape.
    LogicFailure(String),
    /// The HTTP exchange itself failed.
    NetworkFailure(String),
}

/// A response together with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body exactly as received.
    pub body: String,
    /// Resolved outcome.
    pub outcome: Outcome,
}

impl ClassifiedResponse {
    /// Whether the outcome is a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }
}

/// Classify a raw `(status, body)` pair against what the caller expects.
#[must_use]
pub fn classify(status: u16, body: &str, expectation: Expectation) -> ClassifiedResponse {
    ClassifiedResponse {
        status,
        body: body.to_string(),
        outcome: resolve(status, body, expectation),
    }
}

fn resolve(status: u16, body: &str, expectation: Expectation) -> Outcome {
    if status != 200 {
        return Outcome::NetworkFailure(format!(
            "EVC API returned a response with code {status}"
        ));
    }

    let body = body.trim();

    if CREDENTIAL_ERRORS.iter().any(|known| *known == body) {
        return Outcome::CredentialFailure(body.to_string());
    }

    let matched = match expectation {
        Expectation::Records => body.strip_prefix(JSON_FOLLOWS_PREFIX).map(|json| {
            parse_records(json, body).map_or_else(Outcome::LogicFailure, |records| {
                Outcome::Success(Payload::Records(records))
            })
        }),
        Expectation::Integer => {
            parse_integer(body).map(|n| Outcome::Success(Payload::Integer(n)))
        }
        Expectation::Sentinel(expected) => {
            (body == expected).then_some(Outcome::Success(Payload::Acknowledged))
        }
        Expectation::Flag {
            affirmative,
            negative,
        } => {
            if body == affirmative {
                Some(Outcome::Success(Payload::Flag(true)))
            } else if body == negative {
                Some(Outcome::Success(Payload::Flag(false)))
            } else {
                None
            }
        }
    };

    matched.unwrap_or_else(|| {
        if body.starts_with(FAIL_PREFIX) {
            Outcome::LogicFailure(body.to_string())
        } else {
            Outcome::LogicFailure(format!("unexpected message: {body}"))
        }
    })
}

/// Value of an `ok: <integer>` body, sign allowed.
fn parse_integer(body: &str) -> Option<i64> {
    let rest = body.strip_prefix(OK_PREFIX)?.trim_start();
    let digits = rest.strip_prefix(['-', '+']).unwrap_or(rest);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    rest.parse().ok()
}

/// Entries of the `data` array of a JSON-follows document.
fn parse_records(json: &str, body: &str) -> Result<Vec<PropertyBag>, String> {
    let document: Value =
        serde_json::from_str(json).map_err(|_| format!("not a valid JSON: {body}"))?;

    let missing_data = || format!("does not contain data: {body}");

    document
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(missing_data)?
        .iter()
        .map(|entry| entry.as_object().cloned().ok_or_else(missing_data))
        .collect()
}

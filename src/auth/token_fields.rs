//! Token field extraction from backend responses
//!
//! The auth endpoints have shipped several spellings of the same fields
//! (`id_token`, `IdToken`, `access_token`, ...). Rather than probing ad hoc,
//! each value is looked up through a fixed preference list; the first field
//! that holds a usable string wins.

use serde_json::Value;

use crate::auth::credentials::{is_absence_marker, is_usable_token, CredentialPair};
use crate::error::{PantryError, Result};

/// Access-token field names, most preferred first.
pub const ACCESS_TOKEN_FIELDS: [&str; 4] = ["id_token", "IdToken", "access_token", "AccessToken"];

/// Refresh-token field names, most preferred first.
pub const REFRESH_TOKEN_FIELDS: [&str; 2] = ["refresh_token", "RefreshToken"];

/// User identifier field names, most preferred first.
pub const USER_ID_FIELDS: [&str; 4] = ["id", "user_id", "userId", "username"];

/// Returns the first field of `fields` whose value is a string accepted by
/// `accept`.
///
/// Fields that are missing, not strings, or rejected fall through to the
/// next candidate.
///
/// # Examples
///
/// ```
/// use pantrypal::auth::token_fields::{first_field, ACCESS_TOKEN_FIELDS};
/// use pantrypal::auth::credentials::is_usable_token;
/// use serde_json::json;
///
/// let body = json!({"id_token": null, "IdToken": "tok-2", "access_token": "tok-3"});
/// assert_eq!(first_field(&body, &ACCESS_TOKEN_FIELDS, is_usable_token), Some("tok-2"));
/// ```
pub fn first_field<'a>(body: &'a Value, fields: &[&str], accept: fn(&str) -> bool) -> Option<&'a str> {
    fields
        .iter()
        .filter_map(|name| body.get(*name).and_then(Value::as_str))
        .find(|value| accept(value))
}

/// Extracts the credential pair from a sign-in or refresh response body.
///
/// # Errors
///
/// Returns `PantryError::Authentication` when none of
/// [`ACCESS_TOKEN_FIELDS`] holds a usable token.
pub fn extract_credentials(body: &Value) -> Result<CredentialPair> {
    let access_token = first_field(body, &ACCESS_TOKEN_FIELDS, is_usable_token).ok_or_else(|| {
        PantryError::Authentication(format!(
            "response carries no usable access token (looked for {})",
            ACCESS_TOKEN_FIELDS.join(", ")
        ))
    })?;

    let refresh_token = first_field(body, &REFRESH_TOKEN_FIELDS, is_usable_token);

    Ok(CredentialPair {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
    })
}

/// Extracts the user identifier from a sign-in response body, if present.
pub fn extract_user_id(body: &Value) -> Option<String> {
    first_field(body, &USER_ID_FIELDS, |value| !is_absence_marker(value)).map(str::to_string)
}

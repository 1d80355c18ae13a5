use crate::AuthError;

/// Extract the credential from an `Authorization` header value.
///
/// The value must be exactly `Bearer <token>`: one space, the scheme spelled
/// with that exact case, and no further segments.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredential)?;
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::MalformedCredential),
    }
}

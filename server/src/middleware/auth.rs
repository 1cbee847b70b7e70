use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::config::AdminCredential;
use crate::models::AdminContext;
use crate::state::AppState;
use crate::utils::error::AppError;

/// Requires a configured admin bearer token and stores the matching
/// [`AdminContext`] in the request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::AuthError("Missing or invalid Authorization header".to_string()))?;

    let admin = authenticate(&state.config.admin_credentials, token)
        .ok_or_else(|| AppError::AuthError("Invalid admin token".to_string()))?;

    req.extensions_mut().insert(admin);
    Ok(next.run(req).await)
}

/// Compares against every credential so timing does not reveal which one matched.
fn authenticate(credentials: &[AdminCredential], token: &str) -> Option<AdminContext> {
    let mut matched = None;
    for credential in credentials {
        let equal: bool = credential.token.as_bytes().ct_eq(token.as_bytes()).into();
        if equal && matched.is_none() {
            matched = Some(AdminContext::new(credential.name.clone()));
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_admin_credentials;

    #[test]
    fn matches_named_credential() {
        let creds = parse_admin_credentials("alice:tok-a,bob:tok-b");
        assert_eq!(authenticate(&creds, "tok-b"), Some(AdminContext::new("bob")));
    }

    #[test]
    fn rejects_unknown_and_prefix_tokens() {
        let creds = parse_admin_credentials("alice:tok-a");
        assert_eq!(authenticate(&creds, "tok-"), None);
        assert_eq!(authenticate(&creds, "tok-ab"), None);
        assert_eq!(authenticate(&[], "tok-a"), None);
    }
}

//! Request locale negotiation: `?lang=` wins, then `Accept-Language`,
//! then the fallback language.

use axum::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use serde::Deserialize;
use std::convert::Infallible;

use crate::models::Locale;

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(negotiate(parts))
    }
}

fn negotiate(parts: &Parts) -> Locale {
    let from_query = Query::<LangQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.lang)
        .and_then(|lang| Locale::parse(&lang));

    from_query
        .or_else(|| {
            parts
                .headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok())
                .and_then(Locale::from_accept_language)
        })
        .unwrap_or_default()
}

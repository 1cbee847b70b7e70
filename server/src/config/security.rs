use axum::http::header::{
    CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

const PERMISSIONS_POLICY: &str = "permissions-policy";
const X_ROBOTS_TAG: &str = "x-robots-tag";

const NOSNIFF: &str = "nosniff";
const DENY: &str = "DENY";
const XSS_BLOCK: &str = "1; mode=block";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const CSP_API_VALUE: &str = "default-src 'none'; frame-ancestors 'none'";
const REFERRER_POLICY_VALUE: &str = "strict-origin-when-cross-origin";
const PERMISSIONS_POLICY_VALUE: &str = "geolocation=(), microphone=(), camera=()";
const NO_STORE: &str = "no-store";
const NO_REFERRER: &str = "no-referrer";
const NO_INDEX: &str = "noindex, nofollow";

/// Which routes a layer guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProfile {
    Standard,
    /// Admin pages must not be cached by shared proxies.
    Admin,
    /// The URL path itself is the credential: keep it out of referrers,
    /// caches and search indexes.
    PrivateLink,
}

impl HeaderProfile {
    fn extra_headers(self) -> Vec<(HeaderName, &'static str)> {
        match self {
            HeaderProfile::Standard => Vec::new(),
            HeaderProfile::Admin => vec![(CACHE_CONTROL, NO_STORE)],
            HeaderProfile::PrivateLink => vec![
                (CACHE_CONTROL, NO_STORE),
                (REFERRER_POLICY, NO_REFERRER),
                (HeaderName::from_static(X_ROBOTS_TAG), NO_INDEX),
            ],
        }
    }
}

/// Writes the security headers for `profile`.
///
/// Profile headers overwrite; baseline headers only fill gaps, so a narrower
/// layer nested inside a [`HeaderProfile::Standard`] one keeps its values.
pub fn apply_security_headers(headers: &mut HeaderMap, profile: HeaderProfile, include_hsts: bool) {
    for (name, value) in profile.extra_headers() {
        headers.insert(name, HeaderValue::from_static(value));
    }

    let baseline = [
        (X_CONTENT_TYPE_OPTIONS, NOSNIFF),
        (X_FRAME_OPTIONS, DENY),
        (X_XSS_PROTECTION, XSS_BLOCK),
        (CONTENT_SECURITY_POLICY, CSP_API_VALUE),
        (REFERRER_POLICY, REFERRER_POLICY_VALUE),
        (HeaderName::from_static(PERMISSIONS_POLICY), PERMISSIONS_POLICY_VALUE),
    ];
    for (name, value) in baseline {
        headers
            .entry(name)
            .or_insert_with(|| HeaderValue::from_static(value));
    }

    // Only in production (HTTPS environments)
    if include_hsts {
        headers
            .entry(STRICT_TRANSPORT_SECURITY)
            .or_insert_with(|| HeaderValue::from_static(HSTS_VALUE));
    }
}

#[derive(Debug, Clone)]
pub struct SecurityHeadersLayer {
    profile: HeaderProfile,
    include_hsts: bool,
}

impl SecurityHeadersLayer {
    pub fn new(profile: HeaderProfile, include_hsts: bool) -> Self {
        Self {
            profile,
            include_hsts,
        }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersService {
            inner,
            profile: self.profile,
            include_hsts: self.include_hsts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityHeadersService<S> {
    inner: S,
    profile: HeaderProfile,
    include_hsts: bool,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SecurityHeadersService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = SecurityHeadersFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        SecurityHeadersFuture {
            future: self.inner.call(request),
            profile: self.profile,
            include_hsts: self.include_hsts,
        }
    }
}

#[pin_project::pin_project]
pub struct SecurityHeadersFuture<F> {
    #[pin]
    future: F,
    profile: HeaderProfile,
    include_hsts: bool,
}

impl<F, ResBody, E> std::future::Future for SecurityHeadersFuture<F>
where
    F: std::future::Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: std::pin::Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.future.poll(cx) {
            Poll::Ready(Ok(mut response)) => {
                apply_security_headers(response.headers_mut(), *this.profile, *this.include_hsts);
                Poll::Ready(Ok(response))
            }
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_profile_sets_baseline_only() {
        let mut headers = HeaderMap::new();
        apply_security_headers(&mut headers, HeaderProfile::Standard, false);

        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], NOSNIFF);
        assert_eq!(headers[REFERRER_POLICY], REFERRER_POLICY_VALUE);
        assert!(headers.get(CACHE_CONTROL).is_none());
        assert!(headers.get(STRICT_TRANSPORT_SECURITY).is_none());
    }

    #[test]
    fn private_link_headers_survive_outer_standard_layer() {
        let mut headers = HeaderMap::new();
        apply_security_headers(&mut headers, HeaderProfile::PrivateLink, false);
        apply_security_headers(&mut headers, HeaderProfile::Standard, false);

        assert_eq!(headers[REFERRER_POLICY], NO_REFERRER);
        assert_eq!(headers[CACHE_CONTROL], NO_STORE);
        assert_eq!(headers[X_ROBOTS_TAG], NO_INDEX);
        assert_eq!(headers.get_all(REFERRER_POLICY).iter().count(), 1);
    }

    #[test]
    fn admin_profile_disables_caching() {
        let mut headers = HeaderMap::new();
        apply_security_headers(&mut headers, HeaderProfile::Admin, true);

        assert_eq!(headers[CACHE_CONTROL], NO_STORE);
        assert_eq!(headers[STRICT_TRANSPORT_SECURITY], HSTS_VALUE);
    }
}

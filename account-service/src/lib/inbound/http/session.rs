use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::response::IntoResponseParts;
use axum::response::ResponseParts;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::cookie::SameSite;

use crate::account::ports::SessionCookiePort;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "userToken";

const CLEAR_SITE_DATA: HeaderName = HeaderName::from_static("clear-site-data");

/// Attributes applied to every session cookie this service writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age: time::Duration,
}

impl CookieSettings {
    pub fn new(secure: bool, session_validity: chrono::Duration) -> Self {
        Self {
            secure,
            max_age: time::Duration::seconds(session_validity.num_seconds()),
        }
    }

    fn cookie(&self, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }
}

/// Per-request [`SessionCookiePort`] over the request's cookie jar.
///
/// Extract it in a handler, hand it to the account service, and return it as
/// part of the response so the cookie changes reach the client.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    jar: CookieJar,
    settings: CookieSettings,
    revalidate: bool,
}

impl SessionCookies {
    pub fn new(jar: CookieJar, settings: CookieSettings) -> Self {
        Self {
            jar,
            settings,
            revalidate: false,
        }
    }
}

impl SessionCookiePort for SessionCookies {
    fn get(&self) -> Option<String> {
        self.jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    }

    fn set(&mut self, token: &str) {
        let cookie = self
            .settings
            .cookie(token.to_string(), self.settings.max_age);
        self.jar = std::mem::take(&mut self.jar).add(cookie);
    }

    fn clear(&mut self) {
        let cookie = self.settings.cookie(String::new(), time::Duration::ZERO);
        self.jar = std::mem::take(&mut self.jar).add(cookie);
    }

    fn revalidate_views(&mut self) {
        self.revalidate = true;
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionCookies
where
    CookieSettings: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(
            CookieJar::from_headers(&parts.headers),
            CookieSettings::from_ref(state),
        ))
    }
}

impl IntoResponseParts for SessionCookies {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let mut res = self.jar.into_response_parts(res)?;
        if self.revalidate {
            res.headers_mut()
                .insert(CLEAR_SITE_DATA, HeaderValue::from_static("\"cache\""));
        }
        Ok(res)
    }
}

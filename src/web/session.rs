use axum::{
    extract::{Request, State},
    http::{header::SET_COOKIE, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use super::AppState;
use crate::session::{SessionHandle, SessionId};

pub const SESSION_COOKIE_NAME: &str = "study_buddy_session";

/// The caller's session, resolved from the session cookie
#[derive(Clone)]
pub struct CurrentSession {
    pub id: SessionId,
    pub handle: SessionHandle,
}

fn cookie(name: &str, value: &str, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{name}={value}; HttpOnly; Path=/; SameSite=Strict{secure}")
}

/// Cookie that makes the browser forget the session
pub(crate) fn expired_cookie(secure: bool) -> String {
    format!("{}; Max-Age=0", cookie(SESSION_COOKIE_NAME, "", secure))
}

/// Resolves (or starts) the session and sets the cookie on first contact.
pub(crate) async fn attach_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let requested = CookieJar::from_headers(req.headers())
        .get(SESSION_COOKIE_NAME)
        .and_then(|c| c.value().parse::<SessionId>().ok());

    let (id, handle) = state.sessions.get_or_create(requested).await;
    let is_new = requested != Some(id);
    req.extensions_mut().insert(CurrentSession { id, handle });

    let mut response = next.run(req).await;

    // a handler that already set the cookie (ending the session) wins
    if is_new && !response.headers().contains_key(SET_COOKIE) {
        let value = cookie(
            SESSION_COOKIE_NAME,
            &id.to_string(),
            state.config.server.secure_cookies,
        );
        match HeaderValue::from_str(&value) {
            Ok(header) => {
                response.headers_mut().append(SET_COOKIE, header);
            }
            Err(e) => tracing::error!("could not build session cookie: {e}"),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_attributes() {
        assert_eq!(
            cookie("s", "abc", false),
            "s=abc; HttpOnly; Path=/; SameSite=Strict"
        );
        assert!(cookie("s", "abc", true).ends_with("; Secure"));
    }

    #[test]
    fn test_expired_cookie_clears_value() {
        assert_eq!(
            expired_cookie(false),
            "study_buddy_session=; HttpOnly; Path=/; SameSite=Strict; Max-Age=0"
        );
    }
}

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub const SESSION_COOKIE: &str = "session";

pub fn session_cookie(token: String, ttl_secs: u64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(ttl_secs as i64))
        .build()
}

/// Cookie that, once added to a jar, expires the session on the client.
pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_value("");
    cookie.set_path("/");
    cookie.set_max_age(Duration::seconds(0));
    cookie
}

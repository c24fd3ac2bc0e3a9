//! One-shot status messages carried across a redirect.
//!
//! Mutating handlers set a `posts_flash` cookie holding a short code; the
//! listing page reads it, shows the message once and clears the cookie.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;

pub const FLASH_COOKIE: &str = "posts_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Created,
    Updated,
    Deleted,
}

impl Flash {
    pub fn code(&self) -> &'static str {
        match self {
            Flash::Created => "created",
            Flash::Updated => "updated",
            Flash::Deleted => "deleted",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "created" => Some(Flash::Created),
            "updated" => Some(Flash::Updated),
            "deleted" => Some(Flash::Deleted),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Flash::Created => "Post created successfully.",
            Flash::Updated => "Post updated successfully.",
            Flash::Deleted => "Post deleted successfully.",
        }
    }

    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, self.code())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish()
    }

    /// Flash pending on this request, if any; unknown codes are ignored
    pub fn from_request(req: &HttpRequest) -> Option<Self> {
        req.cookie(FLASH_COOKIE)
            .and_then(|cookie| Flash::from_code(cookie.value()))
    }
}

/// Cookie that expires the flash on the client
pub fn clear_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn codes_round_trip_to_messages() {
        for flash in [Flash::Created, Flash::Updated, Flash::Deleted] {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::Deleted.message(), "Post deleted successfully.");
        assert_eq!(Flash::from_code("<script>"), None);
    }

    #[test]
    fn reads_flash_from_request_cookie() {
        let req = TestRequest::default()
            .cookie(Flash::Updated.cookie())
            .to_http_request();
        assert_eq!(Flash::from_request(&req), Some(Flash::Updated));

        let bare = TestRequest::default().to_http_request();
        assert_eq!(Flash::from_request(&bare), None);
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_cookie();
        assert_eq!(cookie.name(), FLASH_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.max_age().is_some());
    }
}

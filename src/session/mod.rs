//! Session lifecycle for the judge site
//!
//! This module owns the authentication cookie: obtaining it through the
//! login form flow, handing out request headers, detecting expiry, and
//! surfacing silent cookie rotations to an operator.

mod manager;

pub use manager::{extract_session_cookie, Session, SessionManager, SESSION_COOKIE};

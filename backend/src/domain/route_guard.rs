//! Request-level access rules.
//!
//! The guard is a pure decision function; the HTTP middleware applies it to
//! every request and turns redirect decisions into `303 See Other` responses.

/// Path of the protected area.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";
/// Path of the registration page.
pub const REGISTER_PATH: &str = "/register";

/// Outcome of evaluating a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the request through.
    Allow,
    /// Anonymous request for a protected path.
    RedirectToLogin,
    /// Signed-in request for the login area.
    RedirectToDashboard,
}

impl GuardDecision {
    /// Redirect target, if the decision is a redirect.
    pub const fn location(self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

/// Classifies request paths into protected, login, and public areas.
///
/// # Examples
/// ```
/// use dashboard::domain::{GuardDecision, RouteGuard};
///
/// let guard = RouteGuard::default();
/// assert_eq!(guard.evaluate("/dashboard/invoices", false), GuardDecision::RedirectToLogin);
/// assert_eq!(guard.evaluate("/login", true), GuardDecision::RedirectToDashboard);
/// assert_eq!(guard.evaluate("/", false), GuardDecision::Allow);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

fn within(path: &str, root: &str) -> bool {
    path.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

impl RouteGuard {
    /// Whether `path` is in the protected dashboard area.
    pub fn is_protected(&self, path: &str) -> bool {
        within(path, DASHBOARD_PATH)
    }

    /// Whether `path` is a login or registration page.
    pub fn is_login_area(&self, path: &str) -> bool {
        within(path, LOGIN_PATH) || within(path, REGISTER_PATH)
    }

    /// Decide what to do with a request for `path`.
    pub fn evaluate(&self, path: &str, has_session: bool) -> GuardDecision {
        if self.is_protected(path) && !has_session {
            GuardDecision::RedirectToLogin
        } else if self.is_login_area(path) && has_session {
            GuardDecision::RedirectToDashboard
        } else {
            GuardDecision::Allow
        }
    }
}

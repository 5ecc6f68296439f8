//! Route resolution
//!
//! Maps roles to their areas and decides what any requested path turns into.
//! Public pages (`/login`, `/register`) render for anonymous users; each role
//! owns one area prefix; every other path (`/`, `/dashboard`, unknown) is
//! steered to the caller's landing route or to login, never to a not-found
//! page.

use crate::models::{Role, SessionState};

use super::guard::{authorize, Access};

/// Login page
pub const LOGIN_ROUTE: &str = "/login";

/// Registration page
pub const REGISTER_ROUTE: &str = "/register";

/// Sidebar entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
}

const fn link(label: &'static str, path: &'static str) -> NavLink {
    NavLink { label, path }
}

const STUDENT_LINKS: &[NavLink] = &[
    link("Profile", "/student"),
    link("Eligible Drives", "/student/eligible-drives"),
    link("Recommended", "/student/recommended"),
    link("My Applications", "/student/applications"),
    link("Interviews", "/student/interviews"),
];

const TPO_LINKS: &[NavLink] = &[
    link("Analytics", "/tpo"),
    link("Pending Approvals", "/tpo/pending"),
    link("Company Drives", "/tpo/drives"),
    link("Recruiters", "/tpo/recruiters"),
    link("Students", "/tpo/students"),
    link("Applications", "/tpo/applications"),
];

const RECRUITER_LINKS: &[NavLink] = &[
    link("Drive Overview", "/recruiter"),
    link("Eligible Students", "/recruiter/students"),
    link("Shortlisted", "/recruiter/shortlisted"),
    link("Interviews", "/recruiter/interviews"),
];

/// Landing route for a role
pub fn default_landing_route(role: Role) -> &'static str {
    match role {
        Role::Student => "/student",
        Role::Tpo => "/tpo",
        Role::Recruiter => "/recruiter",
    }
}

/// Sidebar links for a role
pub fn nav_links(role: Role) -> &'static [NavLink] {
    match role {
        Role::Student => STUDENT_LINKS,
        Role::Tpo => TPO_LINKS,
        Role::Recruiter => RECRUITER_LINKS,
    }
}

/// Strip query, fragment and trailing slashes
fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Role owning the area a path belongs to
pub fn area_role(path: &str) -> Option<Role> {
    let path = normalize(path);
    Role::ALL.into_iter().find(|role| {
        let prefix = default_landing_route(*role);
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Decide what happens when `path` is requested in `state`
pub fn resolve(path: &str, state: &SessionState) -> Access {
    let normalized = normalize(path);

    if let Some(role) = area_role(normalized) {
        return authorize(state, &[role]);
    }

    match state {
        SessionState::Restoring => Access::Pending,
        SessionState::Anonymous if normalized == LOGIN_ROUTE || normalized == REGISTER_ROUTE => {
            Access::Allow
        }
        SessionState::Anonymous => Access::RedirectToLogin,
        SessionState::Authenticated(session) => {
            Access::RedirectToOwnArea(default_landing_route(session.role()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::guard::test_support::authenticated;

    #[test]
    fn test_landing_routes() {
        assert_eq!(default_landing_route(Role::Student), "/student");
        assert_eq!(default_landing_route(Role::Tpo), "/tpo");
        assert_eq!(default_landing_route(Role::Recruiter), "/recruiter");
    }

    #[test]
    fn test_nav_links_stay_in_own_area() {
        for role in Role::ALL {
            let links = nav_links(role);
            assert!(!links.is_empty());
            assert_eq!(links[0].path, default_landing_route(role));
            assert!(links.iter().all(|l| area_role(l.path) == Some(role)));
        }
    }

    #[test]
    fn test_area_role() {
        assert_eq!(area_role("/tpo/pending"), Some(Role::Tpo));
        assert_eq!(area_role("/student/"), Some(Role::Student));
        assert_eq!(area_role("/recruiter?tab=1"), Some(Role::Recruiter));
        assert_eq!(area_role("/studentx"), None);
        assert_eq!(area_role("/"), None);
    }

    #[test]
    fn test_public_pages() {
        assert_eq!(resolve("/login", &SessionState::Anonymous), Access::Allow);
        assert_eq!(resolve("/register/", &SessionState::Anonymous), Access::Allow);
        assert_eq!(
            resolve("/login", &authenticated(Role::Tpo)),
            Access::RedirectToOwnArea("/tpo")
        );
    }

    #[test]
    fn test_catch_all() {
        for path in ["/", "/dashboard", "/no/such/page"] {
            assert_eq!(resolve(path, &SessionState::Anonymous), Access::RedirectToLogin);
            assert_eq!(resolve(path, &SessionState::Restoring), Access::Pending);
            assert_eq!(
                resolve(path, &authenticated(Role::Recruiter)),
                Access::RedirectToOwnArea("/recruiter")
            );
        }
    }

    #[test]
    fn test_student_cannot_reach_tpo_area() {
        assert_eq!(
            resolve("/tpo/pending", &authenticated(Role::Student)),
            Access::RedirectToOwnArea("/student")
        );
        assert_eq!(
            resolve("/student/applications", &authenticated(Role::Student)),
            Access::Allow
        );
    }
}

//! Route table of the console.

use crate::constants::LOGIN_ROUTE;

/// Per-route metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Screen label used for the page title.
    pub title: Option<&'static str>,
    /// Reachable without a session.
    pub public: bool,
}

/// A route and its nested children.
///
/// Child paths are relative to the parent; a child's metadata overrides its
/// parent's field by field when set.
#[derive(Debug, Clone, Copy)]
pub struct RouteRecord {
    pub name: Option<&'static str>,
    pub path: &'static str,
    pub meta: RouteMeta,
    pub children: &'static [RouteRecord],
}

const fn screen(name: &'static str, path: &'static str, title: &'static str) -> RouteRecord {
    RouteRecord {
        name: Some(name),
        path,
        meta: RouteMeta {
            title: Some(title),
            public: false,
        },
        children: &[],
    }
}

/// Every screen of the console: a public login route and a protected layout.
pub static ROUTES: &[RouteRecord] = &[
    RouteRecord {
        name: Some(LOGIN_ROUTE),
        path: "/login",
        meta: RouteMeta {
            title: Some("Login"),
            public: true,
        },
        children: &[],
    },
    RouteRecord {
        name: None,
        path: "/",
        meta: RouteMeta {
            title: None,
            public: false,
        },
        children: &[
            screen("dashboard", "", "Dashboard"),
            screen("scheduled-task", "scheduled-task", "Scheduled Tasks"),
            screen("sys-config", "sys-config", "System Config"),
            screen("llm-config", "llm-config", "LLM Config"),
            screen("llm-logs", "llm-logs", "LLM Call Logs"),
        ],
    },
];

/// A route resolved to its leaf, with metadata merged down the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedRoute {
    pub name: Option<&'static str>,
    pub meta: RouteMeta,
}

/// Find the leaf route for a normalized path (no query, no trailing slash).
pub fn match_path(path: &str) -> Option<MatchedRoute> {
    match_in(ROUTES, "", RouteMeta::default(), path)
}

fn match_in(
    records: &'static [RouteRecord],
    prefix: &str,
    inherited: RouteMeta,
    path: &str,
) -> Option<MatchedRoute> {
    records.iter().find_map(|record| {
        let full = join(prefix, record.path);
        let meta = RouteMeta {
            title: record.meta.title.or(inherited.title),
            public: record.meta.public || inherited.public,
        };

        if record.children.is_empty() {
            (full == path).then_some(MatchedRoute {
                name: record.name,
                meta,
            })
        } else {
            match_in(record.children, &full, meta, path)
        }
    })
}

fn join(prefix: &str, segment: &str) -> String {
    match (prefix, segment) {
        ("", s) => s.to_string(),
        (p, "") => p.to_string(),
        (p, s) if p.ends_with('/') => format!("{p}{s}"),
        (p, s) => format!("{p}/{s}"),
    }
}

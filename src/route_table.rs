use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::{
    guard,
    models::{GuardOutcome, MenuItem, Role, RouteMeta, RouteSummary, View},
};

/// RouteKind
///
/// What a matched entry does: render a view, or send the navigation elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteKind {
    View {
        view: View,
        name: Option<&'static str>,
        meta: RouteMeta,
    },
    Redirect {
        to: &'static str,
    },
}

/// RouteEntry
///
/// A path binding as declared in the table. Child paths are absolute, except the
/// empty child which stands for the parent's own path.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub kind: RouteKind,
    pub children: Vec<RouteEntry>,
}

impl RouteEntry {
    pub fn view(path: &'static str, view: View) -> Self {
        RouteEntry {
            path,
            kind: RouteKind::View { view, name: None, meta: RouteMeta::default() },
            children: Vec::new(),
        }
    }

    pub fn redirect(path: &'static str, to: &'static str) -> Self {
        RouteEntry { path, kind: RouteKind::Redirect { to }, children: Vec::new() }
    }

    pub fn named(mut self, route_name: &'static str) -> Self {
        if let RouteKind::View { name, .. } = &mut self.kind {
            *name = Some(route_name);
        }
        self
    }

    pub fn meta(mut self, route_meta: RouteMeta) -> Self {
        if let RouteKind::View { meta, .. } = &mut self.kind {
            *meta = route_meta;
        }
        self
    }

    pub fn children(mut self, children: Vec<RouteEntry>) -> Self {
        self.children = children;
        self
    }
}

/// RouteTableError
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("route path `{0}` is not absolute")]
    NotAbsolute(String),
    #[error("route path `{0}` is declared more than once")]
    DuplicatePath(String),
    #[error("redirect from `{from}` points at `{to}`, which matches no route")]
    DanglingRedirect { from: String, to: String },
    #[error("redirect chain starting at `{0}` loops")]
    RedirectLoop(String),
}

/// FlatRoute
///
/// A resolvable entry after nesting has been flattened away.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRoute {
    pub path: String,
    pub kind: RouteKind,
    pub layout: Option<View>,
}

impl FlatRoute {
    fn has_params(&self) -> bool {
        self.path.split('/').any(|segment| segment.starts_with(':'))
    }
}

/// Resolved
///
/// The single entry a request path resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    View {
        route: &'a FlatRoute,
        view: View,
        meta: RouteMeta,
        params: BTreeMap<String, String>,
    },
    Redirect {
        route: &'a FlatRoute,
        to: &'static str,
    },
}

/// RouteTable
///
/// The ordered, immutable set of navigation routes. Built once at startup and shared.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    flat: Vec<FlatRoute>,
}

impl RouteTable {
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        let mut flat = Vec::new();
        for entry in &entries {
            flatten(entry, None, None, &mut flat);
        }
        RouteTable { entries, flat }
    }

    /// The dashboard application's route configuration.
    pub fn canonical() -> Self {
        RouteTable::new(vec![
            RouteEntry::view("/login", View::Login),
            RouteEntry::view("/register", View::Register),
            RouteEntry::view("/face-registration", View::FaceRegistration),
            RouteEntry::view("/dashboard", View::Dashboard).children(vec![
                RouteEntry::redirect("", "/events"),
                RouteEntry::view("/events", View::Events).meta(RouteMeta::dashboard()),
                RouteEntry::view("/societies", View::Societies).meta(RouteMeta::dashboard()),
                RouteEntry::view("/attendance", View::Attendance).meta(RouteMeta::dashboard()),
                RouteEntry::view("/profile", View::Profile).meta(RouteMeta::dashboard()),
                RouteEntry::view("/admin", View::AdminPanel).meta(RouteMeta::admin()),
                RouteEntry::view("/user-management", View::UserManagement)
                    .meta(RouteMeta::admin().in_dashboard()),
                RouteEntry::view("/create-event", View::CreateEvent)
                    .named("CreateEvent")
                    .meta(RouteMeta::teacher().in_dashboard()),
                RouteEntry::view("/edit-event/:id", View::EditEvent)
                    .named("EditEvent")
                    .meta(RouteMeta::teacher().in_dashboard()),
                RouteEntry::view("/enrollments", View::EnrollmentManagement)
                    .meta(RouteMeta::teacher().in_dashboard()),
                RouteEntry::view("/teacher-enrollments", View::TeacherEnrollmentManagement)
                    .meta(RouteMeta::admin().in_dashboard()),
                RouteEntry::view("/teacher-events", View::TeacherEvents)
                    .meta(RouteMeta::teacher().in_dashboard()),
            ]),
            RouteEntry::redirect("/", "/login"),
        ])
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// All resolvable routes, in matching order.
    pub fn routes(&self) -> &[FlatRoute] {
        &self.flat
    }

    /// resolve
    ///
    /// Returns the first route matching `path` after normalization, or `None`.
    /// Relative paths never match.
    pub fn resolve(&self, path: &str) -> Option<Resolved<'_>> {
        let path = normalize_path(path);
        if !path.starts_with('/') {
            return None;
        }

        self.flat.iter().find_map(|route| {
            let params = match_path(&route.path, &path)?;
            Some(match &route.kind {
                RouteKind::View { view, meta, .. } => {
                    Resolved::View { route, view: *view, meta: *meta, params }
                }
                RouteKind::Redirect { to } => Resolved::Redirect { route, to: *to },
            })
        })
    }

    /// Looks a view route up by its declared name.
    pub fn find_by_name(&self, route_name: &str) -> Option<&FlatRoute> {
        self.flat.iter().find(|route| {
            matches!(&route.kind, RouteKind::View { name: Some(name), .. } if *name == route_name)
        })
    }

    /// validate
    ///
    /// Checks the table invariants: absolute unique paths and redirects that land on a route
    /// without looping.
    pub fn validate(&self) -> Result<(), RouteTableError> {
        check_absolute(&self.entries, false)?;

        let mut seen = HashSet::new();
        for route in &self.flat {
            // `/edit-event/:id` and `/Edit-Event/:slug` are the same pattern.
            let shape: Vec<String> = route
                .path
                .split('/')
                .map(|segment| {
                    if segment.starts_with(':') { ":".to_string() } else { segment.to_ascii_lowercase() }
                })
                .collect();
            if !seen.insert(shape) {
                return Err(RouteTableError::DuplicatePath(route.path.clone()));
            }
        }

        for route in &self.flat {
            let RouteKind::Redirect { .. } = route.kind else { continue };

            let mut current = route.path.clone();
            let mut visited = HashSet::new();
            while let Some(Resolved::Redirect { to, .. }) = self.resolve(&current) {
                if !visited.insert(current.clone()) {
                    return Err(RouteTableError::RedirectLoop(route.path.clone()));
                }
                if self.resolve(to).is_none() {
                    return Err(RouteTableError::DanglingRedirect {
                        from: current,
                        to: to.to_string(),
                    });
                }
                current = to.to_string();
            }
        }

        Ok(())
    }

    /// dashboard_menu
    ///
    /// The sidebar for a signed-in user: `inDashboard` views, in table order, that the guard
    /// would allow for `role`. Parameterized routes are skipped since they cannot be linked
    /// without an argument.
    pub fn dashboard_menu(&self, role: Option<Role>) -> Vec<MenuItem> {
        self.flat
            .iter()
            .filter(|route| !route.has_params())
            .filter_map(|route| match route.kind {
                RouteKind::View { view, meta, .. } if meta.in_dashboard => {
                    (guard::authorize(&meta, role) == GuardOutcome::Allow)
                        .then(|| MenuItem { path: route.path.clone(), view })
                }
                _ => None,
            })
            .collect()
    }

    /// The table in its wire form (`GET /routes`).
    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.flat
            .iter()
            .map(|route| match &route.kind {
                RouteKind::View { view, name, meta } => RouteSummary {
                    path: route.path.clone(),
                    view: Some(*view),
                    name: name.map(str::to_string),
                    meta: *meta,
                    redirect_to: None,
                    layout: route.layout,
                },
                RouteKind::Redirect { to } => RouteSummary {
                    path: route.path.clone(),
                    view: None,
                    name: None,
                    meta: RouteMeta::default(),
                    redirect_to: Some(to.to_string()),
                    layout: route.layout,
                },
            })
            .collect()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        RouteTable::canonical()
    }
}

/// normalize_path
///
/// Drops any query string or fragment, repeated slashes and trailing slashes.
/// The root stays `/`. Case is kept as typed.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let segments: Vec<&str> = path[..end].split('/').filter(|s| !s.is_empty()).collect();

    if path.starts_with('/') {
        format!("/{}", segments.join("/"))
    } else {
        segments.join("/")
    }
}

// Children are emitted before their parent, so an empty-path child takes the parent's path.
// A parent shadowed that way is not resolvable on its own.
fn flatten(entry: &RouteEntry, parent: Option<&str>, layout: Option<View>, out: &mut Vec<FlatRoute>) {
    let path = match (entry.path, parent) {
        ("", Some(parent)) => parent.to_string(),
        (child, Some(parent)) if !child.starts_with('/') => {
            format!("{}/{}", parent.trim_end_matches('/'), child)
        }
        (path, _) => path.to_string(),
    };

    let own_view = match entry.kind {
        RouteKind::View { view, .. } => Some(view),
        RouteKind::Redirect { .. } => None,
    };
    for child in &entry.children {
        flatten(child, Some(path.as_str()), own_view.or(layout), out);
    }

    let shadowed = entry.children.iter().any(|child| child.path.is_empty());
    if !shadowed {
        out.push(FlatRoute { path, kind: entry.kind.clone(), layout });
    }
}

// Top-level paths must start with `/`; nested ones too, except the empty child.
fn check_absolute(entries: &[RouteEntry], nested: bool) -> Result<(), RouteTableError> {
    for entry in entries {
        let allowed = entry.path.starts_with('/') || (nested && entry.path.is_empty());
        if !allowed {
            return Err(RouteTableError::NotAbsolute(entry.path.to_string()));
        }
        check_absolute(&entry.children, true)?;
    }
    Ok(())
}

// Segment-wise match; `:name` captures one non-empty segment as typed.
// Fixed segments compare case-insensitively.
fn match_path(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), (*actual).to_string());
            }
            None if expected.eq_ignore_ascii_case(actual) => {}
            None => return None,
        }
    }
    Some(params)
}

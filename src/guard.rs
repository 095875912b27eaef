use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error;

use crate::{
    auth::{CredentialProvider, decode_credential},
    models::{GuardOutcome, NavigationResponse, Role, RouteMeta, View},
    route_table::{Resolved, RouteTable, normalize_path},
};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Paths reachable without a stored credential.
pub const PUBLIC_PATHS: [&str; 2] = [LOGIN_PATH, REGISTER_PATH];

/// Upper bound on redirect entries followed in one navigation.
pub const DEFAULT_MAX_REDIRECTS: usize = 8;

/// GuardTarget
///
/// The destination of a navigation as the guard sees it: the resolved path and the
/// metadata of the entry it matched (empty for unmatched paths).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardTarget<'a> {
    pub path: &'a str,
    pub meta: RouteMeta,
}

/// evaluate
///
/// Decides one navigation attempt. Pure: the outcome depends only on the target and the
/// credential passed in.
///
/// A credential that does not decode is treated as absent, so a corrupt token behaves
/// exactly like a logged-out session.
pub fn evaluate(target: &GuardTarget<'_>, credential: Option<&str>) -> GuardOutcome {
    let auth_required = !PUBLIC_PATHS.contains(&target.path);

    let claims = credential.and_then(|token| match decode_credential(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::warn!(path = target.path, error = %e, "ignoring malformed credential");
            None
        }
    });

    let Some(claims) = claims else {
        if auth_required {
            tracing::debug!(path = target.path, "no credential, redirecting to login");
            return GuardOutcome::RedirectLogin;
        }
        return GuardOutcome::Allow;
    };

    let outcome = authorize(&target.meta, claims.role);
    if outcome != GuardOutcome::Allow {
        tracing::debug!(
            path = target.path,
            role = ?claims.role,
            "role does not satisfy route metadata, redirecting to dashboard"
        );
    }
    outcome
}

/// authorize
///
/// The role checks for a signed-in user, in fixed priority order. Only the first failing
/// check counts. No role implies another: an admin does not satisfy `requires_teacher`.
pub fn authorize(meta: &RouteMeta, role: Option<Role>) -> GuardOutcome {
    let denied = (meta.requires_admin && role != Some(Role::Admin))
        || (meta.requires_teacher && role != Some(Role::Teacher))
        || (meta.requires_student && role != Some(Role::Student));

    if denied {
        GuardOutcome::RedirectDashboard
    } else {
        GuardOutcome::Allow
    }
}

/// NavigationError
///
/// Failures of the transition itself, before the guard runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation path `{0}` is not absolute")]
    NotAbsolute(String),
    #[error("more than {limit} redirects while resolving `{path}`")]
    TooManyRedirects { path: String, limit: usize },
}

/// Navigation
///
/// A fully evaluated navigation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub requested: String,
    pub target: String,
    pub view: Option<View>,
    pub layout: Option<View>,
    pub params: BTreeMap<String, String>,
    pub outcome: GuardOutcome,
}

impl From<Navigation> for NavigationResponse {
    fn from(navigation: Navigation) -> Self {
        NavigationResponse {
            redirect_to: navigation.outcome.redirect_path().map(str::to_string),
            requested: navigation.requested,
            target: navigation.target,
            outcome: navigation.outcome,
            view: navigation.view,
            layout: navigation.layout,
            params: navigation.params,
        }
    }
}

/// Navigator
///
/// Runs a navigation end to end: resolve the path against the table, follow redirect
/// entries, read the credential from the injected provider, then evaluate the guard.
pub struct Navigator<P> {
    table: Arc<RouteTable>,
    credentials: P,
    max_redirects: usize,
}

impl<P: CredentialProvider> Navigator<P> {
    pub fn new(table: Arc<RouteTable>, credentials: P) -> Self {
        Navigator { table, credentials, max_redirects: DEFAULT_MAX_REDIRECTS }
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn credentials(&self) -> &P {
        &self.credentials
    }

    pub fn navigate(&self, path: &str) -> Result<Navigation, NavigationError> {
        if !path.starts_with('/') {
            return Err(NavigationError::NotAbsolute(path.to_string()));
        }

        let mut current = normalize_path(path);
        let mut hops = 0;

        let (view, layout, meta, params) = loop {
            match self.table.resolve(&current) {
                Some(Resolved::Redirect { to, .. }) => {
                    hops += 1;
                    if hops > self.max_redirects {
                        return Err(NavigationError::TooManyRedirects {
                            path: path.to_string(),
                            limit: self.max_redirects,
                        });
                    }
                    tracing::trace!(from = %current, to, "following redirect entry");
                    current = normalize_path(to);
                }
                Some(Resolved::View { route, view, meta, params }) => {
                    break (Some(view), route.layout, meta, params);
                }
                None => break (None, None, RouteMeta::default(), BTreeMap::new()),
            }
        };

        // Read on every navigation; never cached.
        let credential = self.credentials.credential();
        let outcome = evaluate(&GuardTarget { path: &current, meta }, credential.as_deref());

        Ok(Navigation {
            requested: path.to_string(),
            target: current,
            view,
            layout,
            params,
            outcome,
        })
    }
}

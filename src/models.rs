use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Navigation Vocabulary ---

/// Role
///
/// The RBAC value carried in the `role` claim of the stored credential.
/// Any other string in the claim is treated as "no role".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// Parses the raw claim value. Matching is exact, as the issuing backend writes lowercase.
    pub fn from_claim(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View
///
/// Identifies the page component a route renders. The frontend maps each
/// variant onto its own component; this crate never renders anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum View {
    Login,
    Register,
    FaceRegistration,
    Dashboard,
    Events,
    Societies,
    Attendance,
    Profile,
    AdminPanel,
    UserManagement,
    CreateEvent,
    EditEvent,
    EnrollmentManagement,
    TeacherEnrollmentManagement,
    TeacherEvents,
}

/// RouteMeta
///
/// Access-control and display flags attached to a route entry.
/// An unset flag means "no restriction of that kind".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteMeta {
    #[serde(default)]
    pub requires_admin: bool,
    #[serde(default)]
    pub requires_teacher: bool,
    #[serde(default)]
    pub requires_student: bool,
    // Display grouping: the entry is listed in the dashboard sidebar.
    #[serde(default)]
    pub in_dashboard: bool,
}

impl RouteMeta {
    pub fn admin() -> Self {
        Self { requires_admin: true, ..Self::default() }
    }

    pub fn teacher() -> Self {
        Self { requires_teacher: true, ..Self::default() }
    }

    pub fn student() -> Self {
        Self { requires_student: true, ..Self::default() }
    }

    pub fn dashboard() -> Self {
        Self { in_dashboard: true, ..Self::default() }
    }

    /// Marks an existing flag set as listed in the dashboard.
    pub fn in_dashboard(self) -> Self {
        Self { in_dashboard: true, ..self }
    }
}

/// GuardOutcome
///
/// The three possible results of a guarded navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum GuardOutcome {
    Allow,
    RedirectLogin,
    RedirectDashboard,
}

impl GuardOutcome {
    /// The continuation handed back to the router: `None` proceeds, `Some(path)` redirects.
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            GuardOutcome::Allow => None,
            GuardOutcome::RedirectLogin => Some(crate::guard::LOGIN_PATH),
            GuardOutcome::RedirectDashboard => Some(crate::guard::DASHBOARD_PATH),
        }
    }
}

// --- Response Payloads (Output Schemas) ---

/// RouteSummary
///
/// One resolvable entry of the route table as served by `GET /routes`.
/// Exactly one of `view` or `redirect_to` is set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteSummary {
    pub path: String,
    pub view: Option<View>,
    pub name: Option<String>,
    pub meta: RouteMeta,
    pub redirect_to: Option<String>,
    /// The layout view this entry is nested under, if any.
    pub layout: Option<View>,
}

/// NavigateQuery
///
/// Query parameters for `GET /navigate`.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NavigateQuery {
    /// The absolute path the client wants to navigate to.
    pub path: String,
}

/// NavigationResponse
///
/// The decision for one navigation attempt (`GET /navigate`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationResponse {
    /// The path exactly as requested.
    pub requested: String,
    /// The normalized path after following redirect entries.
    pub target: String,
    pub outcome: GuardOutcome,
    /// Where the client must go instead, when the outcome is not `allow`.
    pub redirect_to: Option<String>,
    /// The view rendered at `target`; `None` for unmatched paths.
    pub view: Option<View>,
    pub layout: Option<View>,
    pub params: BTreeMap<String, String>,
}

/// MenuItem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MenuItem {
    pub path: String,
    pub view: View,
}

/// MenuResponse
///
/// The dashboard sidebar for the caller (`GET /me/menu`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MenuResponse {
    pub role: Option<Role>,
    pub name: Option<String>,
    pub items: Vec<MenuItem>,
}

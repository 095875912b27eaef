use campus_nav::{
    Role, RouteMeta, RouteTable, View,
    models::MenuItem,
    route_table::{Resolved, RouteEntry, RouteKind, RouteTableError},
};

fn menu_paths(table: &RouteTable, role: Option<Role>) -> Vec<String> {
    table
        .dashboard_menu(role)
        .into_iter()
        .map(|MenuItem { path, .. }| path)
        .collect()
}

// --- Canonical Table ---

#[test]
fn test_canonical_table_is_valid() {
    assert_eq!(RouteTable::canonical().validate(), Ok(()));
}

#[test]
fn test_canonical_table_includes_full_route_set() {
    let table = RouteTable::canonical();
    for (path, view) in [
        ("/profile", View::Profile),
        ("/user-management", View::UserManagement),
        ("/edit-event/9", View::EditEvent),
        ("/face-registration", View::FaceRegistration),
        ("/teacher-enrollments", View::TeacherEnrollmentManagement),
    ] {
        match table.resolve(path) {
            Some(Resolved::View { view: resolved, .. }) => assert_eq!(resolved, view, "{path}"),
            other => panic!("{path} resolved to {other:?}"),
        }
    }
}

#[test]
fn test_nested_entries_match_by_absolute_path() {
    let table = RouteTable::canonical();
    let Some(Resolved::View { route, meta, .. }) = table.resolve("/teacher-events") else {
        panic!("/teacher-events did not resolve to a view");
    };
    assert_eq!(route.layout, Some(View::Dashboard));
    assert_eq!(meta, RouteMeta::teacher().in_dashboard());

    // Children do not inherit the layout prefix.
    assert!(table.resolve("/dashboard/teacher-events").is_none());
}

#[test]
fn test_root_and_dashboard_redirects() {
    let table = RouteTable::canonical();
    assert!(matches!(table.resolve("/"), Some(Resolved::Redirect { to: "/login", .. })));
    assert!(matches!(table.resolve("/dashboard"), Some(Resolved::Redirect { to: "/events", .. })));
    assert!(matches!(table.resolve("/dashboard/"), Some(Resolved::Redirect { to: "/events", .. })));
}

#[test]
fn test_resolve_ignores_query_and_trailing_slash() {
    let table = RouteTable::canonical();
    assert!(matches!(
        table.resolve("/events/?page=2#top"),
        Some(Resolved::View { view: View::Events, .. })
    ));
    assert!(table.resolve("events").is_none());
    assert!(table.resolve("/edit-event").is_none());
}

#[test]
fn test_find_by_name() {
    let table = RouteTable::canonical();
    assert_eq!(table.find_by_name("CreateEvent").map(|r| r.path.as_str()), Some("/create-event"));
    assert_eq!(table.find_by_name("EditEvent").map(|r| r.path.as_str()), Some("/edit-event/:id"));
    assert!(table.find_by_name("Events").is_none());
}

#[test]
fn test_summaries_mark_redirects_and_layouts() {
    let summaries = RouteTable::canonical().summaries();
    let root = summaries.iter().find(|s| s.path == "/").unwrap();
    assert_eq!(root.redirect_to.as_deref(), Some("/login"));
    assert_eq!(root.view, None);

    let admin = summaries.iter().find(|s| s.path == "/admin").unwrap();
    assert_eq!(admin.view, Some(View::AdminPanel));
    assert!(admin.meta.requires_admin);
    assert!(!admin.meta.in_dashboard);
    assert_eq!(admin.layout, Some(View::Dashboard));
}

// --- Dashboard Menu ---

#[test]
fn test_dashboard_menu_per_role() {
    let table = RouteTable::canonical();

    assert_eq!(
        menu_paths(&table, Some(Role::Student)),
        vec!["/events", "/societies", "/attendance", "/profile"]
    );
    assert_eq!(
        menu_paths(&table, Some(Role::Teacher)),
        vec!["/events", "/societies", "/attendance", "/profile", "/create-event", "/enrollments", "/teacher-events"]
    );
    assert_eq!(
        menu_paths(&table, Some(Role::Admin)),
        vec!["/events", "/societies", "/attendance", "/profile", "/user-management", "/teacher-enrollments"]
    );
    assert_eq!(menu_paths(&table, None), vec!["/events", "/societies", "/attendance", "/profile"]);
}

// --- Validation ---

#[test]
fn test_validate_rejects_duplicate_paths() {
    let table = RouteTable::new(vec![
        RouteEntry::view("/events", View::Events),
        RouteEntry::view("/dashboard", View::Dashboard)
            .children(vec![RouteEntry::view("/events", View::Societies)]),
    ]);
    assert_eq!(table.validate(), Err(RouteTableError::DuplicatePath("/events".to_string())));
}

#[test]
fn test_validate_treats_param_names_as_equivalent() {
    let table = RouteTable::new(vec![
        RouteEntry::view("/edit-event/:id", View::EditEvent),
        RouteEntry::view("/edit-event/:slug", View::EditEvent),
    ]);
    assert!(matches!(table.validate(), Err(RouteTableError::DuplicatePath(_))));
}

#[test]
fn test_validate_rejects_relative_paths() {
    let table = RouteTable::new(vec![
        RouteEntry::view("/dashboard", View::Dashboard)
            .children(vec![RouteEntry::view("events", View::Events)]),
    ]);
    assert_eq!(table.validate(), Err(RouteTableError::NotAbsolute("events".to_string())));
}

#[test]
fn test_validate_rejects_dangling_and_looping_redirects() {
    let dangling = RouteTable::new(vec![RouteEntry::redirect("/", "/missing")]);
    assert_eq!(
        dangling.validate(),
        Err(RouteTableError::DanglingRedirect { from: "/".to_string(), to: "/missing".to_string() })
    );

    let looping = RouteTable::new(vec![
        RouteEntry::redirect("/a", "/b"),
        RouteEntry::redirect("/b", "/a"),
    ]);
    assert_eq!(looping.validate(), Err(RouteTableError::RedirectLoop("/a".to_string())));
}

#[test]
fn test_builder_ignores_view_options_on_redirects() {
    let entry = RouteEntry::redirect("/", "/login").named("Root").meta(RouteMeta::admin());
    assert_eq!(entry.kind, RouteKind::Redirect { to: "/login" });
}

#[test]
fn test_resolve_ignores_case_of_fixed_segments() {
    let table = RouteTable::canonical();
    assert!(matches!(table.resolve("/Admin"), Some(Resolved::View { view: View::AdminPanel, .. })));
    assert!(matches!(table.resolve("/DASHBOARD"), Some(Resolved::Redirect { to: "/events", .. })));

    let Some(Resolved::View { view, params, .. }) = table.resolve("/Edit-Event/Ab12") else {
        panic!("/Edit-Event/Ab12 did not resolve to a view");
    };
    assert_eq!(view, View::EditEvent);
    assert_eq!(params.get("id").map(String::as_str), Some("Ab12"));
}

#[test]
fn test_resolve_collapses_repeated_slashes() {
    let table = RouteTable::canonical();
    assert!(matches!(table.resolve("//login"), Some(Resolved::View { view: View::Login, .. })));
    assert!(matches!(table.resolve("/edit-event//5"), Some(Resolved::View { view: View::EditEvent, .. })));
}

#[test]
fn test_validate_treats_case_variants_as_duplicates() {
    let table = RouteTable::new(vec![
        RouteEntry::view("/events", View::Events),
        RouteEntry::view("/Events", View::Societies),
    ]);
    assert_eq!(table.validate(), Err(RouteTableError::DuplicatePath("/Events".to_string())));
}

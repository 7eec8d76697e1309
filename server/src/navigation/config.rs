//! Navigation tree configuration.

use std::fs;

use anyhow::{Context, Result};
use bo_common::navigation::parse_navigation;
use bo_common::{NavItem, Permission};
use tracing::info;

use crate::config::Config;

/// Built-in navigation tree for the backoffice.
pub fn default_navigation() -> Vec<NavItem> {
    vec![
        NavItem::leaf("Dashboard", "/").with_icon("home"),
        NavItem::group(
            "People",
            "/hr",
            vec![
                NavItem::leaf("Employees", "/hr/employees").requires(Permission::EmployeeView),
                NavItem::leaf("New employee", "/hr/employees/new")
                    .requires(Permission::EmployeeCreate),
                NavItem::leaf("Positions", "/hr/positions").requires(Permission::PositionView),
                NavItem::leaf("Departments", "/hr/departments")
                    .requires(Permission::DepartmentView),
            ],
        )
        .with_icon("users")
        .requires(Permission::EmployeeView),
        NavItem::group(
            "Identity",
            "/identity",
            vec![
                NavItem::leaf("Users", "/identity/users").requires(Permission::UserView),
                NavItem::group(
                    "Roles",
                    "/identity/roles",
                    vec![NavItem::leaf("New role", "/identity/roles/new")
                        .requires(Permission::RoleCreate)],
                )
                .requires(Permission::RoleView),
                NavItem::leaf("Permissions", "/identity/permissions")
                    .requires(Permission::PermissionView),
            ],
        )
        .with_icon("shield")
        .requires_any(&[Permission::UserView, Permission::RoleView]),
        NavItem::group(
            "Scrum",
            "/scrum",
            vec![
                NavItem::leaf("Projects", "/scrum/projects").requires(Permission::ProjectView),
                NavItem::leaf("Sprints", "/scrum/sprints")
                    .requires_any(&[Permission::SprintView, Permission::SprintManage]),
                NavItem::leaf("Backlog", "/scrum/backlog").requires(Permission::BacklogView),
            ],
        )
        .with_icon("kanban")
        .requires(Permission::ProjectView),
        NavItem::leaf("My profile", "/profile").with_icon("user"),
    ]
}

/// Load the navigation tree named by `NAV_CONFIG_PATH`, or the built-in one.
pub fn load_navigation(config: &Config) -> Result<Vec<NavItem>> {
    let Some(path) = &config.nav_config_path else {
        return Ok(default_navigation());
    };

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read navigation config {}", path.display()))?;
    let items = parse_navigation(&json)
        .with_context(|| format!("Invalid navigation config {}", path.display()))?;

    info!(path = %path.display(), items = items.len(), "Loaded navigation config");
    Ok(items)
}

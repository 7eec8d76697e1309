//! Permission-aware navigation tree.
//!
//! The navigation tree is static configuration. Each request filters it
//! against the current user's [`PermissionSet`]:
//! - a node with no requirement is always visible
//! - a group stays visible when it is allowed itself or when at least one
//!   descendant survives filtering
//! - sibling order is preserved and nothing is deduplicated

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::permissions::{has_any_permission, PermissionSet};
use crate::types::User;

/// Access requirement declared on a navigation node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccessRequirement {
    /// Visible to everyone.
    #[default]
    None,
    /// The single code must be held.
    Permission(String),
    /// At least one of the codes must be held. An empty list denies.
    AnyOf(Vec<String>),
}

impl AccessRequirement {
    /// Evaluate the requirement against a permission set.
    #[must_use]
    pub fn is_satisfied_by(&self, granted: &PermissionSet) -> bool {
        match self {
            Self::None => true,
            Self::Permission(code) => granted.contains(code),
            Self::AnyOf(codes) => has_any_permission(granted, codes),
        }
    }
}

/// Whether a node carries children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavKind {
    /// A plain link.
    Leaf,
    /// A section with children. The list may be empty after filtering.
    Group(Vec<NavItem>),
}

/// A node in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawNavItem", into = "RawNavItem")]
pub struct NavItem {
    pub title: String,
    pub url: String,
    pub icon: Option<String>,
    pub requirement: AccessRequirement,
    pub kind: NavKind,
}

impl NavItem {
    /// A leaf link with no requirement.
    pub fn leaf(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            icon: None,
            requirement: AccessRequirement::None,
            kind: NavKind::Leaf,
        }
    }

    /// A group with the given children and no requirement.
    pub fn group(title: impl Into<String>, url: impl Into<String>, items: Vec<Self>) -> Self {
        Self {
            kind: NavKind::Group(items),
            ..Self::leaf(title, url)
        }
    }

    /// Require a single permission code.
    #[must_use]
    pub fn requires(mut self, code: impl AsRef<str>) -> Self {
        self.requirement = AccessRequirement::Permission(code.as_ref().to_string());
        self
    }

    /// Require any one of the given codes.
    #[must_use]
    pub fn requires_any<S: AsRef<str>>(mut self, codes: &[S]) -> Self {
        self.requirement =
            AccessRequirement::AnyOf(codes.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Children of a group, `None` for a leaf.
    #[must_use]
    pub fn items(&self) -> Option<&[Self]> {
        match &self.kind {
            NavKind::Leaf => None,
            NavKind::Group(items) => Some(items),
        }
    }

    /// URLs of this node and all descendants, depth-first.
    #[must_use]
    pub fn visible_urls(&self) -> Vec<&str> {
        let mut urls = vec![self.url.as_str()];
        if let Some(items) = self.items() {
            urls.extend(items.iter().flat_map(Self::visible_urls));
        }
        urls
    }
}

/// Parse a navigation tree from its JSON configuration.
pub fn parse_navigation(json: &str) -> Result<Vec<NavItem>> {
    Ok(serde_json::from_str(json)?)
}

/// Filter a navigation tree for a user.
#[must_use]
pub fn filter_navigation(items: &[NavItem], user: &User) -> Vec<NavItem> {
    filter_nav_items(items, &PermissionSet::from_user(user))
}

/// Filter a navigation tree against a permission set.
#[must_use]
pub fn filter_nav_items(items: &[NavItem], granted: &PermissionSet) -> Vec<NavItem> {
    items
        .iter()
        .filter_map(|item| filter_item(item, granted))
        .collect()
}

fn filter_item(item: &NavItem, granted: &PermissionSet) -> Option<NavItem> {
    // Children first: a restricted group survives through its visible descendants.
    let kind = match &item.kind {
        NavKind::Leaf => NavKind::Leaf,
        NavKind::Group(children) => NavKind::Group(filter_nav_items(children, granted)),
    };

    let allowed_self = item.requirement.is_satisfied_by(granted);
    let allowed_by_children = matches!(&kind, NavKind::Group(children) if !children.is_empty());

    if !(allowed_self || allowed_by_children) {
        tracing::trace!(url = %item.url, "navigation item hidden");
        return None;
    }

    Some(NavItem {
        title: item.title.clone(),
        url: item.url.clone(),
        icon: item.icon.clone(),
        requirement: item.requirement.clone(),
        kind,
    })
}

/// JSON shape of a navigation node.
///
/// `anyOf` wins over `permission` when both are present. A missing `items`
/// key is a leaf; an empty array is an empty group.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNavItem {
    title: String,
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    permission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    any_of: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Vec<NavItem>>,
}

impl From<RawNavItem> for NavItem {
    fn from(raw: RawNavItem) -> Self {
        let requirement = match (raw.any_of, raw.permission) {
            (Some(codes), _) => AccessRequirement::AnyOf(codes),
            (None, Some(code)) => AccessRequirement::Permission(code),
            (None, None) => AccessRequirement::None,
        };

        Self {
            title: raw.title,
            url: raw.url,
            icon: raw.icon,
            requirement,
            kind: raw.items.map_or(NavKind::Leaf, NavKind::Group),
        }
    }
}

impl From<NavItem> for RawNavItem {
    fn from(item: NavItem) -> Self {
        let (permission, any_of) = match item.requirement {
            AccessRequirement::None => (None, None),
            AccessRequirement::Permission(code) => (Some(code), None),
            AccessRequirement::AnyOf(codes) => (None, Some(codes)),
        };

        Self {
            title: item.title,
            url: item.url,
            icon: item.icon,
            permission,
            any_of,
            items: match item.kind {
                NavKind::Leaf => None,
                NavKind::Group(items) => Some(items),
            },
        }
    }
}

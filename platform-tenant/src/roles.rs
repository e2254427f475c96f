//! Tenant role hierarchy
//!
//! This module defines the role a user holds within a tenant, along with
//! the coarse permissions each role implies.

use serde::{Deserialize, Serialize};

/// User role within a tenant.
///
/// Roles are hierarchical, with each role inheriting the permissions of
/// lower roles. The hierarchy is: ReadOnly < Member < Admin < Owner
///
/// # Permission Model
///
/// - **ReadOnly**: Can view tenant resources only
/// - **Member**: Can record expenses and work in projects
/// - **Admin**: Can manage projects and seats
/// - **Owner**: Full tenant control including billing and tier changes
///
/// # Examples
///
/// ```
/// use platform_tenant::TenantRole;
///
/// let role = TenantRole::Member;
/// assert!(role.can_submit_expenses());
/// assert!(!role.can_manage_members());
///
/// let admin = TenantRole::Admin;
/// assert!(admin.can_manage_projects());
/// assert!(!admin.can_manage_billing());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TenantRole {
    /// Read-only access to tenant resources
    ReadOnly = 0,

    /// Can record expenses and work in projects
    Member = 1,

    /// Can manage projects and seats
    Admin = 2,

    /// Full tenant control
    Owner = 3,
}

impl TenantRole {
    /// Check if this role can record expenses.
    ///
    /// # Returns
    ///
    /// `true` for Member, Admin, and Owner roles
    pub fn can_submit_expenses(&self) -> bool {
        *self >= TenantRole::Member
    }

    /// Check if this role can manage projects.
    ///
    /// This includes creating, archiving, and configuring projects.
    ///
    /// # Returns
    ///
    /// `true` for Admin and Owner roles
    pub fn can_manage_projects(&self) -> bool {
        *self >= TenantRole::Admin
    }

    /// Check if this role can manage seats.
    ///
    /// This includes inviting, removing, and changing member roles.
    ///
    /// # Returns
    ///
    /// `true` for Admin and Owner roles
    pub fn can_manage_members(&self) -> bool {
        *self >= TenantRole::Admin
    }

    /// Check if this role can manage billing and tier changes.
    ///
    /// # Returns
    ///
    /// `true` only for Owner role
    pub fn can_manage_billing(&self) -> bool {
        *self >= TenantRole::Owner
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(TenantRole)` if valid, `None` otherwise. Callers mapping
    /// untrusted credential claims should fall back to the default
    /// (`ReadOnly`) when parsing fails, never to an elevated role.
    ///
    /// # Examples
    ///
    /// ```
    /// use platform_tenant::TenantRole;
    ///
    /// assert_eq!(TenantRole::parse("admin"), Some(TenantRole::Admin));
    /// assert_eq!(TenantRole::parse("OWNER"), Some(TenantRole::Owner));
    /// assert_eq!(TenantRole::parse("superuser"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "readonly" | "viewer" => Some(Self::ReadOnly),
            "member" | "user" => Some(Self::Member),
            "admin" => Some(Self::Admin),
            "owner" => Some(Self::Owner),
            _ => None,
        }
    }

    /// Get string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ReadOnly => "Read-only",
            Self::Member => "Member",
            Self::Admin => "Admin",
            Self::Owner => "Owner",
        }
    }
}

impl Default for TenantRole {
    fn default() -> Self {
        Self::ReadOnly
    }
}

//! Authentication and authorization tests
//!
//! Property-based and unit tests for:
//! - Role permission enforcement
//! - Permission key format
//! - Account field validation

use proptest::prelude::*;
use shared::{permission_key, validate_email, validate_password, Action, Resource, UserRole};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn role_strategy() -> impl Strategy<Value = UserRole> {
    (0usize..UserRole::ALL.len()).prop_map(|i| UserRole::ALL[i])
}

fn resource_strategy() -> impl Strategy<Value = Resource> {
    (0usize..Resource::ALL.len()).prop_map(|i| Resource::ALL[i])
}

fn action_strategy() -> impl Strategy<Value = Action> {
    (0usize..Action::ALL.len()).prop_map(|i| Action::ALL[i])
}

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{5,10}@[a-z]{3,8}\\.(com|in|co\\.in)"
}

/// Generate valid passwords (8+ chars)
fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%]{8,20}"
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Admin is granted every action on every resource
    #[test]
    fn test_admin_has_every_permission(
        resource in resource_strategy(),
        action in action_strategy(),
    ) {
        let permissions = UserRole::Admin.permissions();
        prop_assert!(permissions.contains(&permission_key(resource, action)));
    }

    /// Every permission a role carries is admin-grantable and well formed
    #[test]
    fn test_role_permissions_subset_of_admin(role in role_strategy()) {
        let admin = UserRole::Admin.permissions();
        for permission in role.permissions() {
            let parts: Vec<&str> = permission.split(':').collect();
            prop_assert_eq!(parts.len(), 2);
            prop_assert!(admin.contains(&permission));
        }
    }

    /// Permission keys are `resource:action` in lower case
    #[test]
    fn test_permission_key_format(
        resource in resource_strategy(),
        action in action_strategy(),
    ) {
        let key = permission_key(resource, action);
        prop_assert_eq!(key.clone(), format!("{}:{}", resource.as_str(), action.as_str()));
        prop_assert!(key.chars().all(|c| c.is_ascii_lowercase() || c == ':' || c == '_'));
    }

    /// Role names parse back to the same role
    #[test]
    fn test_role_name_round_trip(role in role_strategy()) {
        prop_assert_eq!(UserRole::parse(role.as_str()), Some(role));
    }

    /// No role lists the same permission twice
    #[test]
    fn test_role_permissions_unique(role in role_strategy()) {
        let mut permissions = role.permissions();
        let count = permissions.len();
        permissions.sort();
        permissions.dedup();
        prop_assert_eq!(permissions.len(), count);
    }

    #[test]
    fn test_password_strength(password in password_strategy()) {
        prop_assert!(validate_password(&password).is_ok());
    }

    #[test]
    fn test_email_format(email in email_strategy()) {
        prop_assert!(validate_email(&email).is_ok());
    }
}

// ============================================================================
// Role Permission Tests
// ============================================================================

#[cfg(test)]
mod role_permission_tests {
    use super::*;

    fn has(role: UserRole, resource: Resource, action: Action) -> bool {
        role.permissions().contains(&permission_key(resource, action))
    }

    #[test]
    fn test_admin_permission_count() {
        assert_eq!(
            UserRole::Admin.permissions().len(),
            Resource::ALL.len() * Action::ALL.len()
        );
    }

    #[test]
    fn test_only_admin_manages_users() {
        for role in UserRole::ALL {
            assert_eq!(
                has(role, Resource::User, Action::Create),
                role == UserRole::Admin,
                "{} user:create",
                role.as_str()
            );
        }
    }

    #[test]
    fn test_manager_permissions() {
        assert!(has(UserRole::Manager, Resource::Pos, Action::Approve));
        assert!(has(UserRole::Manager, Resource::Production, Action::Approve));
        assert!(has(UserRole::Manager, Resource::Accounting, Action::View));
        assert!(!has(UserRole::Manager, Resource::Accounting, Action::Create));
        assert!(!has(UserRole::Manager, Resource::Branch, Action::Create));
    }

    #[test]
    fn test_supervisor_approves_production() {
        assert!(has(UserRole::Supervisor, Resource::Production, Action::Approve));
        assert!(!has(UserRole::Supervisor, Resource::Pos, Action::View));
    }

    #[test]
    fn test_operator_cannot_approve_own_entries() {
        assert!(has(UserRole::Operator, Resource::Production, Action::Create));
        assert!(has(UserRole::Operator, Resource::Production, Action::Edit));
        assert!(!has(UserRole::Operator, Resource::Production, Action::Approve));
        assert!(!has(UserRole::Operator, Resource::Production, Action::Delete));
    }

    #[test]
    fn test_cashier_sells_but_cannot_refund() {
        assert!(has(UserRole::Cashier, Resource::Pos, Action::Create));
        assert!(!has(UserRole::Cashier, Resource::Pos, Action::Approve));
        assert!(!has(UserRole::Cashier, Resource::Accounting, Action::View));
        assert!(!has(UserRole::Cashier, Resource::Production, Action::View));
    }

    #[test]
    fn test_accountant_owns_books() {
        for action in [Action::View, Action::Create, Action::Edit, Action::Delete] {
            assert!(has(UserRole::Accountant, Resource::Accounting, action));
            assert!(has(UserRole::Accountant, Resource::Invoice, action));
        }
        assert!(!has(UserRole::Accountant, Resource::Production, Action::View));
    }

    #[test]
    fn test_permission_format() {
        assert_eq!(permission_key(Resource::Pos, Action::Approve), "pos:approve");
        assert_eq!(permission_key(Resource::Accounting, Action::View), "accounting:view");
    }

    #[test]
    fn test_unknown_role_name() {
        assert_eq!(UserRole::parse("OWNER"), None);
        assert_eq!(UserRole::parse("admin"), None);
    }
}

// ============================================================================
// Account Field Tests
// ============================================================================

#[cfg(test)]
mod account_field_tests {
    use super::*;

    #[test]
    fn test_short_password_rejected() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_email_rejections() {
        assert!(validate_email("plainaddress").is_err());
        assert!(validate_email("a@b").is_err());
    }
}

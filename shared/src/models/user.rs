//! User roles and permissions

use serde::{Deserialize, Serialize};

/// Role assigned to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Manager,
    Supervisor,
    Operator,
    Cashier,
    Accountant,
}

/// Resources that can be accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Branch,
    User,
    Employee,
    Attendance,
    Customer,
    Order,
    Production,
    Machine,
    Material,
    Store,
    Pos,
    Invoice,
    Accounting,
    Report,
}

/// Actions that can be performed on resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Approve,
}

impl Resource {
    pub const ALL: [Resource; 14] = [
        Resource::Branch,
        Resource::User,
        Resource::Employee,
        Resource::Attendance,
        Resource::Customer,
        Resource::Order,
        Resource::Production,
        Resource::Machine,
        Resource::Material,
        Resource::Store,
        Resource::Pos,
        Resource::Invoice,
        Resource::Accounting,
        Resource::Report,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Branch => "branch",
            Resource::User => "user",
            Resource::Employee => "employee",
            Resource::Attendance => "attendance",
            Resource::Customer => "customer",
            Resource::Order => "order",
            Resource::Production => "production",
            Resource::Machine => "machine",
            Resource::Material => "material",
            Resource::Store => "store",
            Resource::Pos => "pos",
            Resource::Invoice => "invoice",
            Resource::Accounting => "accounting",
            Resource::Report => "report",
        }
    }
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Approve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Approve => "approve",
        }
    }
}

/// Permission string carried in access tokens, e.g. `order:create`
pub fn permission_key(resource: Resource, action: Action) -> String {
    format!("{}:{}", resource.as_str(), action.as_str())
}

const CRUD: &[Action] = &[Action::View, Action::Create, Action::Edit, Action::Delete];
const VIEW: &[Action] = &[Action::View];
const VIEW_CREATE: &[Action] = &[Action::View, Action::Create];
const VIEW_CREATE_EDIT: &[Action] = &[Action::View, Action::Create, Action::Edit];
const VIEW_CREATE_APPROVE: &[Action] = &[Action::View, Action::Create, Action::Approve];
const ALL_ACTIONS: &[Action] = &Action::ALL;

impl UserRole {
    pub const ALL: [UserRole; 6] = [
        UserRole::Admin,
        UserRole::Manager,
        UserRole::Supervisor,
        UserRole::Operator,
        UserRole::Cashier,
        UserRole::Accountant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::Supervisor => "SUPERVISOR",
            UserRole::Operator => "OPERATOR",
            UserRole::Cashier => "CASHIER",
            UserRole::Accountant => "ACCOUNTANT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(UserRole::Admin),
            "MANAGER" => Some(UserRole::Manager),
            "SUPERVISOR" => Some(UserRole::Supervisor),
            "OPERATOR" => Some(UserRole::Operator),
            "CASHIER" => Some(UserRole::Cashier),
            "ACCOUNTANT" => Some(UserRole::Accountant),
            _ => None,
        }
    }

    /// Resource grants for the role
    pub fn grants(&self) -> Vec<(Resource, &'static [Action])> {
        match self {
            UserRole::Admin => Resource::ALL
                .iter()
                .map(|resource| (*resource, ALL_ACTIONS))
                .collect(),
            UserRole::Manager => vec![
                (Resource::Branch, VIEW),
                (Resource::Employee, CRUD),
                (Resource::Attendance, CRUD),
                (Resource::Customer, CRUD),
                (Resource::Order, CRUD),
                (Resource::Production, ALL_ACTIONS),
                (Resource::Machine, CRUD),
                (Resource::Material, CRUD),
                (Resource::Store, CRUD),
                (Resource::Pos, VIEW_CREATE_APPROVE),
                (Resource::Invoice, CRUD),
                (Resource::Accounting, VIEW),
                (Resource::Report, VIEW),
            ],
            UserRole::Supervisor => vec![
                (Resource::Attendance, VIEW_CREATE_EDIT),
                (Resource::Order, VIEW),
                (Resource::Production, ALL_ACTIONS),
                (Resource::Machine, VIEW_CREATE_EDIT),
                (Resource::Material, VIEW_CREATE),
                (Resource::Report, VIEW),
            ],
            UserRole::Operator => vec![
                (Resource::Order, VIEW),
                (Resource::Production, VIEW_CREATE_EDIT),
                (Resource::Machine, VIEW),
                (Resource::Material, VIEW),
            ],
            UserRole::Cashier => vec![
                (Resource::Customer, VIEW_CREATE),
                (Resource::Store, VIEW),
                (Resource::Pos, VIEW_CREATE),
            ],
            UserRole::Accountant => vec![
                (Resource::Customer, VIEW),
                (Resource::Order, VIEW),
                (Resource::Material, VIEW_CREATE_EDIT),
                (Resource::Pos, VIEW),
                (Resource::Invoice, CRUD),
                (Resource::Accounting, CRUD),
                (Resource::Report, VIEW),
            ],
        }
    }

    /// Flattened `resource:action` permission strings
    pub fn permissions(&self) -> Vec<String> {
        self.grants()
            .into_iter()
            .flat_map(|(resource, actions)| {
                actions.iter().map(move |action| permission_key(resource, *action))
            })
            .collect()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Known resources, actions and role names of the office application.
//!
//! The authoritative catalog lives in the backend; these names are what
//! navigation and action gates ask about.

pub mod resource {
    pub const AGENDA: &str = "agenda";
    pub const FINANCIAL: &str = "financial";
    pub const CATEGORIES: &str = "categories";
    pub const REPORTS: &str = "reports";
    pub const DOCUMENTS: &str = "documents";
    pub const USERS: &str = "users";
    pub const SETTINGS: &str = "settings";

    pub const ALL: &[&str] = &[
        AGENDA, FINANCIAL, CATEGORIES, REPORTS, DOCUMENTS, USERS, SETTINGS,
    ];
}

pub mod action {
    pub const VIEW: &str = "view";
    pub const CREATE: &str = "create";
    pub const EDIT: &str = "edit";
    pub const DELETE: &str = "delete";
    pub const APPROVE: &str = "approve";
    pub const MANAGE: &str = "manage";

    pub const ALL: &[&str] = &[VIEW, CREATE, EDIT, DELETE, APPROVE, MANAGE];
}

pub mod role {
    pub const ADMIN: &str = "admin";
    pub const CHEFE_GABINETE: &str = "chefe_gabinete";
    pub const ASSESSOR: &str = "assessor";
    pub const EQUIPE: &str = "equipe";

    pub const ALL: &[&str] = &[ADMIN, CHEFE_GABINETE, ASSESSOR, EQUIPE];
}

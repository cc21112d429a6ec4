use derive_more::Display;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Role {
    #[default]
    #[display("student")]
    Student,
    #[display("admin")]
    Admin,
}

/// Elevates the session to [`Role::Admin`] against a static shared secret.
#[derive(Debug, Clone)]
pub struct RoleGate {
    role: Role,
    secret: String,
}

impl RoleGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            role: Role::default(),
            secret: secret.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns whether the attempt matched. A failed attempt keeps the current role.
    pub fn login(&mut self, attempt: &str) -> bool {
        if attempt == self.secret {
            info!("Session elevated to admin");
            self.role = Role::Admin;
            true
        } else {
            warn!("Rejected admin login attempt");
            false
        }
    }

    pub fn logout(&mut self) {
        self.role = Role::Student;
    }
}

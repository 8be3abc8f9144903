//! services/api/src/adapters/directory.rs
//!
//! An in-memory member directory standing in for the identity provider.
//! Members are loaded once at startup and only read afterwards.

use lending_ledger_core::{ports::UserDirectory, User};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Vec<User>,
}

impl InMemoryUserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_user(&self, user_id: Uuid) -> Option<User> {
        self.users.find_user(user_id)
    }
}

//! In-memory providers for tests.
//!
//! `MemoryIdentity` and `MemoryStore` behave like the Firebase backends
//! (same error codes, same create/update preconditions) and count calls so
//! tests can assert that a flow never reached the backend.

mod memory;

pub use memory::{MemoryIdentity, MemoryStore};

use alumni_common::RegisterForm;

use crate::provider::{Account, AccountId};

pub fn test_account(id: &str, email: &str) -> Account {
    Account {
        id: AccountId::new(id),
        email: Some(email.to_string()),
    }
}

/// The registration used throughout the tests: Ana, graduated 2020.
pub fn ana_registration() -> RegisterForm {
    RegisterForm {
        name: "Ana".to_string(),
        email: "a@x.com".to_string(),
        password: "123456".to_string(),
        confirm_password: "123456".to_string(),
        academic_title: "Ing.".to_string(),
        graduation_year: "2020".to_string(),
    }
}

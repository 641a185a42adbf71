// Contact observers, one directory per ring

// Ring 0: Data Preparation
#[path = "0/load_existing.rs"]
pub mod load_existing;

// Ring 1: Input Validation
#[path = "1/input_validation.rs"]
pub mod input_validation;

// Ring 2: Security
#[path = "2/ownership.rs"]
pub mod ownership;

// Ring 3: Business
#[path = "3/email_conflict.rs"]
pub mod email_conflict;
#[path = "3/primary_phone.rs"]
pub mod primary_phone;

// Ring 5: Database
#[path = "5/contact_sql_executor.rs"]
pub mod contact_sql_executor;

pub use contact_sql_executor::ContactSqlExecutor;
pub use email_conflict::EmailConflictRule;
pub use input_validation::InputValidator;
pub use load_existing::LoadExistingContact;
pub use ownership::OwnershipGuard;
pub use primary_phone::PrimaryPhoneRule;

//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.
//!
//! Link tables (`expense_projects`, `project_partners`, `withdrawal_projects`) are the
//! explicit dependency edges the recalculation cascade walks.

pub mod expense;
pub mod expense_project;
pub mod partner;
pub mod project;
pub mod project_partner;
pub mod withdrawal;
pub mod withdrawal_project;

// Re-export specific types to avoid conflicts
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use expense_project::{
    Column as ExpenseProjectColumn, Entity as ExpenseProject, Model as ExpenseProjectModel,
};
pub use partner::{Column as PartnerColumn, Entity as Partner, Model as PartnerModel};
pub use project::{Column as ProjectColumn, Entity as Project, Model as ProjectModel};
pub use project_partner::{
    Column as ProjectPartnerColumn, Entity as ProjectPartner, Model as ProjectPartnerModel,
};
pub use withdrawal::{Column as WithdrawalColumn, Entity as Withdrawal, Model as WithdrawalModel};
pub use withdrawal_project::{
    Column as WithdrawalProjectColumn, Entity as WithdrawalProject,
    Model as WithdrawalProjectModel,
};

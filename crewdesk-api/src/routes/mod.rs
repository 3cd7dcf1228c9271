/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `companies`: Company registration and lookup
/// - `users`: People and the reporting tree
/// - `tasks`: Work items, status workflow, audit trail, comments
/// - `leave`: Vacation requests and balances
/// - `punches`: Time clock
pub mod companies;
pub mod health;
pub mod leave;
pub mod punches;
pub mod tasks;
pub mod users;

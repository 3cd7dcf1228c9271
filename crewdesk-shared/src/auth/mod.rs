/// Credential handling
///
/// CrewDesk has no session or token model; the only credential concern is
/// storing passwords hashed at rest.
pub mod password;

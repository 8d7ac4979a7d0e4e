/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage backend a request targets
/// Used by the engine, the executors, the audit log and undo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// Schemaless document collection (JSON file)
    #[default]
    Nosql,
    /// Relational table (SQLite)
    Sql,
}

impl DbType {
    /// Human-readable label for responses
    pub fn label(&self) -> &'static str {
        match self {
            DbType::Nosql => "Documents",
            DbType::Sql => "SQLite",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DbType::Nosql => "nosql",
            DbType::Sql => "sql",
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nosql" | "documents" => Ok(DbType::Nosql),
            "sql" | "sqlite" => Ok(DbType::Sql),
            other => Err(format!("unknown db type '{}' (expected nosql or sql)", other)),
        }
    }
}

/// Caller role. Only admins may mutate.
///
/// Names other than `Admin` and `Viewer` are kept verbatim so the request
/// still reaches the permission check and lands in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    #[default]
    Viewer,
    Other(String),
}

impl Role {
    pub fn can_mutate(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "Admin",
            Role::Viewer => "Viewer",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Admin" => Role::Admin,
            "Viewer" => Role::Viewer,
            _ => Role::Other(name),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    // Case-insensitive for the CLI; the server decides what an unknown name may do
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "viewer" => Role::Viewer,
            _ => Role::Other(s.to_string()),
        })
    }
}

/// Read or write request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Query,
    Mutation,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Query => "query",
            Mode::Mutation => "mutation",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "query" => Ok(Mode::Query),
            "mutation" => Ok(Mode::Mutation),
            other => Err(format!("unknown mode '{}' (expected query or mutation)", other)),
        }
    }
}

/// Request stages in execution order. A failure names the stage it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Permission,
    Generation,
    Execution,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Permission => "Permission",
            Stage::Generation => "Generation",
            Stage::Execution => "Execution",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_enums_use_wire_names() {
        assert_eq!(serde_json::to_value(DbType::Sql).unwrap(), "sql");
        assert_eq!(serde_json::to_value(Mode::Mutation).unwrap(), "mutation");
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "Admin");
        let role: Role = serde_json::from_str("\"Viewer\"").unwrap();
        assert!(!role.can_mutate());
    }

    #[test]
    fn unknown_role_names_deserialize_without_privileges() {
        let role: Role = serde_json::from_str("\"Manager\"").unwrap();
        assert_eq!(role, Role::Other("Manager".to_string()));
        assert!(!role.can_mutate());
        assert_eq!(role.as_str(), "Manager");
        assert_eq!(serde_json::to_value(&role).unwrap(), "Manager");

        // Wire names are exact; only the canonical spelling is privileged
        let lowercase: Role = serde_json::from_str("\"admin\"").unwrap();
        assert!(!lowercase.can_mutate());
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("SQL".parse::<DbType>().unwrap(), DbType::Sql);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Mutation".parse::<Mode>().unwrap(), Mode::Mutation);
        assert!("mongo".parse::<DbType>().is_err());
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Other("Manager".to_string()));
    }
}

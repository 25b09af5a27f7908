//! The catalog of logical monk operations.
//!
//! Each variant maps typed parameters to an argument vector and a timeout.
//! Structured parameters (filters, records, schema definitions) are encoded
//! as compact JSON in a single argument.

use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Default bound on a monk invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A logical monk operation.
#[derive(Debug, Clone, PartialEq)]
pub enum MonkCommand {
    ServerList,
    ServerAdd {
        name: String,
        endpoint: String,
        description: Option<String>,
    },
    ServerDelete(String),
    ServerUse(String),
    ServerCurrent,
    ServerPing(Option<String>),
    ServerPingAll,

    TenantList,
    TenantCreate(String),
    TenantDelete(String),
    TenantUse(String),
    TenantInit(String),

    AuthLogin {
        tenant: String,
        username: String,
        password: String,
    },
    AuthLogout,
    AuthStatus,
    AuthPing,
    AuthInfo,
    AuthExpires,
    AuthExpired,

    DataSelect {
        schema: String,
        filter: Option<Value>,
    },
    DataCreate {
        schema: String,
        record: Value,
    },
    DataUpdate {
        schema: String,
        id: String,
        record: Option<Value>,
    },
    DataDelete {
        schema: String,
        id: String,
    },

    MetaSelect(Option<String>),
    MetaCreate {
        schema: String,
        definition: Value,
    },
    MetaUpdate {
        schema: String,
        definition: Value,
    },
    MetaDelete(String),
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn is_empty_structure(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

impl MonkCommand {
    /// Builds the argument vector passed after the executable name.
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Self::ServerList => args(&["server", "list", "--json"]),
            Self::ServerAdd {
                name,
                endpoint,
                description,
            } => {
                let mut a = args(&["server", "add", name, endpoint]);
                if let Some(desc) = non_empty(description) {
                    a.push(desc.to_string());
                }
                a
            }
            Self::ServerDelete(name) => args(&["server", "delete", name]),
            Self::ServerUse(name) => args(&["server", "use", name]),
            Self::ServerCurrent => args(&["server", "current"]),
            Self::ServerPing(name) => {
                let mut a = args(&["server", "ping"]);
                if let Some(name) = non_empty(name) {
                    a.push(name.to_string());
                }
                a
            }
            Self::ServerPingAll => args(&["server", "ping-all"]),

            Self::TenantList => args(&["tenant", "list", "--json"]),
            Self::TenantCreate(name) => args(&["tenant", "create", name]),
            Self::TenantDelete(name) => args(&["tenant", "delete", name]),
            Self::TenantUse(name) => args(&["tenant", "use", name]),
            Self::TenantInit(name) => args(&["tenant", "init", name]),

            Self::AuthLogin {
                tenant,
                username,
                password,
            } => args(&["auth", "login", tenant, username, password]),
            Self::AuthLogout => args(&["auth", "logout"]),
            Self::AuthStatus => args(&["auth", "status", "--json"]),
            Self::AuthPing => args(&["auth", "ping", "--json"]),
            Self::AuthInfo => args(&["auth", "info", "--json"]),
            Self::AuthExpires => args(&["auth", "expires"]),
            Self::AuthExpired => args(&["auth", "expired"]),

            Self::DataSelect { schema, filter } => {
                let mut a = args(&["data", "select", schema]);
                if let Some(filter) = filter.as_ref().filter(|f| !is_empty_structure(f)) {
                    a.push("--filter".to_string());
                    a.push(filter.to_string());
                }
                a
            }
            Self::DataCreate { schema, record } => {
                args(&["data", "create", schema, &record.to_string()])
            }
            Self::DataUpdate { schema, id, record } => {
                let mut a = args(&["data", "update", schema, id]);
                if let Some(record) = record.as_ref().filter(|r| !is_empty_structure(r)) {
                    a.push(record.to_string());
                }
                a
            }
            Self::DataDelete { schema, id } => args(&["data", "delete", schema, id]),

            Self::MetaSelect(schema) => {
                let mut a = args(&["meta", "select"]);
                if let Some(schema) = non_empty(schema) {
                    a.push(schema.to_string());
                }
                a
            }
            Self::MetaCreate { schema, definition } => {
                args(&["meta", "create", schema, &definition.to_string()])
            }
            Self::MetaUpdate { schema, definition } => {
                args(&["meta", "update", schema, &definition.to_string()])
            }
            Self::MetaDelete(schema) => args(&["meta", "delete", schema]),
        }
    }

    /// Bound on how long this operation may run.
    pub fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }

    /// Structured parameter shown next to the command in the trace bar.
    pub fn trace_data(&self) -> Option<&Value> {
        match self {
            Self::DataSelect { filter, .. } => filter.as_ref(),
            Self::DataCreate { record, .. } => Some(record),
            Self::DataUpdate { record, .. } => record.as_ref(),
            Self::MetaCreate { definition, .. } | Self::MetaUpdate { definition, .. } => {
                Some(definition)
            }
            _ => None,
        }
    }

    /// Command line for display, with secrets masked.
    pub fn display_line(&self) -> String {
        match self {
            Self::AuthLogin {
                tenant, username, ..
            } => format!("auth login {tenant} {username} ********"),
            Self::DataSelect { schema, filter }
                if filter.as_ref().is_some_and(|f| !is_empty_structure(f)) =>
            {
                format!("data select {schema} --filter")
            }
            Self::DataCreate { schema, .. } => format!("data create {schema}"),
            Self::DataUpdate { schema, id, .. } => format!("data update {schema} {id}"),
            Self::MetaCreate { schema, .. } => format!("meta create {schema}"),
            Self::MetaUpdate { schema, .. } => format!("meta update {schema}"),
            _ => self.arguments().join(" "),
        }
    }

    /// Short name used in logs ("server list", "auth login", ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServerList => "server list",
            Self::ServerAdd { .. } => "server add",
            Self::ServerDelete(_) => "server delete",
            Self::ServerUse(_) => "server use",
            Self::ServerCurrent => "server current",
            Self::ServerPing(_) => "server ping",
            Self::ServerPingAll => "server ping-all",
            Self::TenantList => "tenant list",
            Self::TenantCreate(_) => "tenant create",
            Self::TenantDelete(_) => "tenant delete",
            Self::TenantUse(_) => "tenant use",
            Self::TenantInit(_) => "tenant init",
            Self::AuthLogin { .. } => "auth login",
            Self::AuthLogout => "auth logout",
            Self::AuthStatus => "auth status",
            Self::AuthPing => "auth ping",
            Self::AuthInfo => "auth info",
            Self::AuthExpires => "auth expires",
            Self::AuthExpired => "auth expired",
            Self::DataSelect { .. } => "data select",
            Self::DataCreate { .. } => "data create",
            Self::DataUpdate { .. } => "data update",
            Self::DataDelete { .. } => "data delete",
            Self::MetaSelect(_) => "meta select",
            Self::MetaCreate { .. } => "meta create",
            Self::MetaUpdate { .. } => "meta update",
            Self::MetaDelete(_) => "meta delete",
        }
    }
}

impl fmt::Display for MonkCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

//! Shared enumerations used by validators, list filters and SQL ordering

use serde::{Deserialize, Serialize};

/// Declares a string-backed enum with the allowed set kept next to the variants
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Exact, case-sensitive match against the allowed set
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn allowed() -> String {
                [$($text),+].join(", ")
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(
    /// Lifecycle of a client record
    ClientStatus {
        Lead => "lead",
        Active => "active",
        Inactive => "inactive",
    }
);

string_enum!(
    InvoiceStatus {
        Draft => "draft",
        Sent => "sent",
        Partial => "partial",
        Paid => "paid",
        Overdue => "overdue",
    }
);

string_enum!(
    ProjectStatus {
        Planned => "planned",
        Active => "active",
        Paused => "paused",
        Completed => "completed",
    }
);

string_enum!(
    /// Listing order: in_progress, todo, done
    TaskStatus {
        InProgress => "in_progress",
        Todo => "todo",
        Done => "done",
    }
);

string_enum!(
    /// Listing order: high, medium, low
    TaskPriority {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
);

impl InvoiceStatus {
    /// Statuses counted as awaiting payment on the dashboard
    pub const PENDING: &'static [InvoiceStatus] =
        &[InvoiceStatus::Sent, InvoiceStatus::Partial, InvoiceStatus::Overdue];
}

impl TaskStatus {
    pub const OPEN: &'static [TaskStatus] = &[TaskStatus::Todo, TaskStatus::InProgress];
}

/// Write mode a validator runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_exact_values() {
        assert_eq!(ClientStatus::parse("lead"), Some(ClientStatus::Lead));
        assert_eq!(ClientStatus::parse("Lead"), None);
        assert_eq!(TaskStatus::parse("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(InvoiceStatus::parse("cancelled"), None);
    }

    #[test]
    fn allowed_lists_every_value() {
        assert_eq!(ProjectStatus::allowed(), "planned, active, paused, completed");
        assert_eq!(TaskPriority::ALL.len(), 3);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}

use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        $(#[$meta])*
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Clinical cohort a patient belongs to. One cohort per workbook sheet.
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    PatientStatus {
        Active => "ACTIVE",
        Discharged => "DISCHARGED",
        WaitingAuth => "WAITING_AUTH",
        Headway => "HEADWAY",
    }
);

str_enum!(
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    AuditAction {
        Create => "CREATE",
        Update => "UPDATE",
        Delete => "DELETE",
        Import => "IMPORT",
        Export => "EXPORT",
    }
);

str_enum!(
    AuditEntity {
        Patient => "Patient",
        User => "User",
        MdtMeeting => "MDTMeeting",
        MdtMeetingItem => "MDTMeetingItem",
        Note => "Note",
        Task => "Task",
        Assignment => "Assignment",
        ClinicianAllowlist => "ClinicianAllowlist",
    }
);

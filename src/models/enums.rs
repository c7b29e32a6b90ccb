use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// `from_str` normalizes hyphens to underscores before matching, so the
/// legacy hyphenated wire form ("pre-booked", "no-show") parses to the
/// same variant as the current underscore form. Normalization happens
/// here, at the parse boundary, and nowhere else.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.replace('-', "_").as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = DatabaseError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(v: $name) -> &'static str {
                v.as_str()
            }
        }
    };
}

str_enum!(QueueStatus {
    PreBooked => "pre_booked",
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(PatientStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Intake => "intake",
    ReadyForProvider => "ready_for_provider",
    Provider => "provider",
    ReadyForDischarge => "ready_for_discharge",
    Discharged => "discharged",
    NoShow => "no_show",
    Cancelled => "cancelled",
    // Legacy vocabulary — still present in stored rows and accepted on input
    CheckedIn => "checked_in",
    InConsultation => "in_consultation",
    Completed => "completed",
});

impl PatientStatus {
    /// Statuses shown in the waiting-room column of the in-office view.
    pub fn is_waiting_room(&self) -> bool {
        matches!(
            self,
            Self::Intake | Self::ReadyForProvider | Self::CheckedIn
        )
    }

    /// Statuses shown in the in-call column of the in-office view.
    pub fn is_in_call(&self) -> bool {
        matches!(self, Self::Provider | Self::InConsultation)
    }
}

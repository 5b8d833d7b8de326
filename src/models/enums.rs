use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
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

str_enum!(IntakeStatus {
    Pending => "pending",
    InProgress => "in_progress",
    Complete => "complete",
    Flagged => "flagged",
});

str_enum!(IntakeStep {
    PersonalInfoComplete => "personal_info_complete",
    InsuranceVerified => "insurance_verified",
    MedicalHistoryComplete => "medical_history_complete",
    ConsentFormsSigned => "consent_forms_signed",
    IdVerified => "id_verified",
});

impl IntakeStep {
    /// Checklist order.
    pub const ALL: [IntakeStep; 5] = [
        IntakeStep::PersonalInfoComplete,
        IntakeStep::InsuranceVerified,
        IntakeStep::MedicalHistoryComplete,
        IntakeStep::ConsentFormsSigned,
        IntakeStep::IdVerified,
    ];

    /// Label shown to the operator for an outstanding step.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PersonalInfoComplete => "Personal Information",
            Self::InsuranceVerified => "Insurance Verification",
            Self::MedicalHistoryComplete => "Medical History",
            Self::ConsentFormsSigned => "Consent Forms",
            Self::IdVerified => "ID Verification",
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{IntakeStatus, IntakeStep};

/// One patient's pass through the intake checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub status: IntakeStatus,
    pub personal_info_complete: bool,
    pub insurance_verified: bool,
    pub medical_history_complete: bool,
    pub consent_forms_signed: bool,
    pub id_verified: bool,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub insurance_group_number: Option<String>,
    pub allergies: Option<String>,
    pub current_medications: Option<String>,
    pub medical_conditions: Option<String>,
    pub notes: Option<String>,
    pub flagged_reason: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Percentage of the checklist covered by `done` completed steps.
pub fn completion_percentage_of(done: usize) -> u8 {
    (100.0 * done as f64 / IntakeStep::ALL.len() as f64).round() as u8
}

impl IntakeRecord {
    /// Fresh record for a patient who just submitted the personal info form.
    pub fn start(patient_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            status: IntakeStatus::Pending,
            personal_info_complete: true,
            insurance_verified: false,
            medical_history_complete: false,
            consent_forms_signed: false,
            id_verified: false,
            insurance_provider: None,
            insurance_policy_number: None,
            insurance_group_number: None,
            allergies: None,
            current_medications: None,
            medical_conditions: None,
            notes: None,
            flagged_reason: None,
            started_at: Some(now),
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn step(&self, step: IntakeStep) -> bool {
        match step {
            IntakeStep::PersonalInfoComplete => self.personal_info_complete,
            IntakeStep::InsuranceVerified => self.insurance_verified,
            IntakeStep::MedicalHistoryComplete => self.medical_history_complete,
            IntakeStep::ConsentFormsSigned => self.consent_forms_signed,
            IntakeStep::IdVerified => self.id_verified,
        }
    }

    pub fn set_step(&mut self, step: IntakeStep, value: bool) {
        let slot = match step {
            IntakeStep::PersonalInfoComplete => &mut self.personal_info_complete,
            IntakeStep::InsuranceVerified => &mut self.insurance_verified,
            IntakeStep::MedicalHistoryComplete => &mut self.medical_history_complete,
            IntakeStep::ConsentFormsSigned => &mut self.consent_forms_signed,
            IntakeStep::IdVerified => &mut self.id_verified,
        };
        *slot = value;
    }

    pub fn completed_steps(&self) -> usize {
        IntakeStep::ALL.iter().filter(|s| self.step(**s)).count()
    }

    pub fn all_steps_complete(&self) -> bool {
        self.completed_steps() == IntakeStep::ALL.len()
    }

    /// Whole percent of checklist steps done: 0, 20, 40, 60, 80 or 100.
    pub fn completion_percentage(&self) -> u8 {
        completion_percentage_of(self.completed_steps())
    }

    /// Labels of the steps still outstanding, in checklist order.
    pub fn pending_steps(&self) -> Vec<&'static str> {
        IntakeStep::ALL
            .iter()
            .filter(|s| !self.step(**s))
            .map(|s| s.label())
            .collect()
    }

    /// Merge the fields carried by a step payload. Absent fields are kept.
    pub fn apply_payload(&mut self, payload: &StepPayload) {
        match payload {
            StepPayload::None => {}
            StepPayload::Insurance(data) => {
                merge(&mut self.insurance_provider, &data.provider);
                merge(&mut self.insurance_policy_number, &data.policy_number);
                merge(&mut self.insurance_group_number, &data.group_number);
            }
            StepPayload::MedicalHistory(data) => {
                merge(&mut self.allergies, &data.allergies);
                merge(&mut self.current_medications, &data.current_medications);
                merge(&mut self.medical_conditions, &data.medical_conditions);
            }
        }
    }

    /// Re-derive status after the step flags changed.
    ///
    /// Reaching 100% completes the intake from any status, flagged included,
    /// and stamps `completed_at` every time it happens. Short of that a
    /// flagged intake stays flagged. Losing a step on a complete intake
    /// drops it back to in progress.
    pub fn recompute_status(&mut self, now: DateTime<Utc>) {
        match self.status {
            _ if self.all_steps_complete() => {
                self.status = IntakeStatus::Complete;
                self.completed_at = Some(now);
            }
            IntakeStatus::Flagged => {}
            IntakeStatus::Complete => {
                self.status = IntakeStatus::InProgress;
                self.completed_at = None;
            }
            IntakeStatus::Pending if self.completion_percentage() > 0 => {
                self.status = IntakeStatus::InProgress;
            }
            IntakeStatus::Pending | IntakeStatus::InProgress => {}
        }
    }

    /// Mark for manual review. Step flags are left as they are.
    pub fn flag(&mut self, reason: String) {
        self.status = IntakeStatus::Flagged;
        self.flagged_reason = Some(reason);
    }
}

/// Row shown on the dashboard and patient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeSummary {
    pub intake_id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub status: IntakeStatus,
    pub completion_percentage: u8,
    pub flagged_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

fn merge(slot: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        *slot = Some(value.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsuranceData {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub group_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistoryData {
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub current_medications: Option<String>,
    #[serde(default)]
    pub medical_conditions: Option<String>,
}

/// Extra data submitted alongside a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepPayload {
    #[default]
    None,
    Insurance(InsuranceData),
    MedicalHistory(MedicalHistoryData),
}

impl StepPayload {
    /// The only step this payload may accompany, if any.
    pub fn owning_step(&self) -> Option<IntakeStep> {
        match self {
            StepPayload::None => None,
            StepPayload::Insurance(_) => Some(IntakeStep::InsuranceVerified),
            StepPayload::MedicalHistory(_) => Some(IntakeStep::MedicalHistoryComplete),
        }
    }

    pub fn fits(&self, step: IntakeStep) -> bool {
        self.owning_step().map_or(true, |owner| owner == step)
    }
}

//! JSON request and response bodies.
//!
//! These mirror the core record types but keep `gender`, `blood_type` and `age` loosely
//! typed, so a bad value reaches core validation and comes back as a 400 with a readable
//! message instead of a body-parsing rejection.

use hrs_core::{
    BloodType, Contact, Gender, Insurance, Medical, PatientError, PatientRecord,
    PatientRecordSummary, PatientResult,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ContactBody {
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MedicalBody {
    /// One of `A+`, `A-`, `B+`, `B-`, `AB+`, `AB-`, `O+`, `O-`.
    #[schema(example = "O+")]
    pub blood_type: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub conditions: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct InsuranceBody {
    pub provider: String,
    pub id: String,
}

/// A full patient record as sent and received over HTTP.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientBody {
    #[schema(example = "P1")]
    pub id: String,
    #[schema(example = "Alice")]
    pub name: String,
    /// Age in whole years, 0 to 120.
    pub age: i64,
    /// One of `Male`, `Female`, `Other`.
    #[schema(example = "Female")]
    pub gender: String,
    pub contact: ContactBody,
    pub medical: MedicalBody,
    pub insurance: InsuranceBody,
}

impl PatientBody {
    /// Converts the body into a core record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` for an unknown gender or blood type, or an age
    /// outside 0 to 120.
    pub fn into_record(self) -> PatientResult<PatientRecord> {
        let age = u8::try_from(self.age)
            .ok()
            .filter(|age| *age <= hrs_core::constants::MAX_AGE)
            .ok_or_else(|| {
                PatientError::Validation(format!(
                    "age must be between 0 and {}, got {}",
                    hrs_core::constants::MAX_AGE,
                    self.age
                ))
            })?;

        Ok(PatientRecord {
            id: self.id,
            name: self.name,
            age,
            gender: self.gender.parse::<Gender>()?,
            contact: Contact {
                phone: self.contact.phone,
                email: self.contact.email,
                address: self.contact.address,
            },
            medical: Medical {
                blood_type: self.medical.blood_type.parse::<BloodType>()?,
                allergies: self.medical.allergies,
                conditions: self.medical.conditions,
            },
            insurance: Insurance {
                provider: self.insurance.provider,
                id: self.insurance.id,
            },
        })
    }
}

impl From<PatientRecord> for PatientBody {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            age: i64::from(record.age),
            gender: record.gender.to_string(),
            contact: ContactBody {
                phone: record.contact.phone,
                email: record.contact.email,
                address: record.contact.address,
            },
            medical: MedicalBody {
                blood_type: record.medical.blood_type.to_string(),
                allergies: record.medical.allergies,
                conditions: record.medical.conditions,
            },
            insurance: InsuranceBody {
                provider: record.insurance.provider,
                id: record.insurance.id,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientSummary {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub gender: String,
}

impl From<PatientRecordSummary> for PatientSummary {
    fn from(summary: PatientRecordSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            age: i64::from(summary.age),
            gender: summary.gender.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientSummary>,
}

/// Acknowledgement for a successful create or update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientAckRes {
    pub id: String,
    pub name: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeletePatientRes {
    pub patient: PatientBody,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

//! The patient record schema.
//!
//! A [`PatientRecord`] is stored as a JSON document whose shape mirrors these structs
//! field for field:
//!
//! ```json
//! {
//!   "id": "P1", "name": "Alice", "age": 30, "gender": "Female",
//!   "contact":   { "phone": "", "email": "", "address": "" },
//!   "medical":   { "blood_type": "O+", "allergies": "", "conditions": "" },
//!   "insurance": { "provider": "", "id": "" }
//! }
//! ```
//!
//! The nested groups are always present. Their free-text fields are optional and default
//! to the empty string.

use crate::PatientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient gender as captured at registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = PatientError;

    /// Parses a gender label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                PatientError::Validation(format!(
                    "gender must be one of Male, Female, Other, got '{s}'"
                ))
            })
    }
}

/// ABO/Rh blood group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[default]
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = PatientError;

    /// Parses a blood type label such as `AB-`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        BloodType::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                PatientError::Validation(format!(
                    "blood_type must be one of A+, A-, B+, B-, AB+, AB-, O+, O-, got '{s}'"
                ))
            })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contact {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Medical {
    pub blood_type: BloodType,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub conditions: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Insurance {
    #[serde(default)]
    pub provider: String,
    /// Policy or member number issued by the provider.
    #[serde(default)]
    pub id: String,
}

/// A complete patient record.
///
/// `id` doubles as the document key and never changes once the record is created.
/// Updates supply the full record; there is no field-level patching.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub contact: Contact,
    pub medical: Medical,
    pub insurance: Insurance,
}

impl PatientRecord {
    /// A record with the given identity and every other field at its default.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn summary(&self) -> PatientRecordSummary {
        PatientRecordSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            age: self.age,
            gender: self.gender,
        }
    }
}

/// The columns shown when listing patients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecordSummary {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
}

//! Plain-text rendering of patient records for the terminal.

use hrs_core::{PatientRecord, PatientRecordSummary};
use std::fmt;

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Sectioned view of a full record.
///
/// Empty contact and insurance fields show as `N/A`; empty allergies and conditions show
/// as `None`.
pub struct PatientDetails<'a>(pub &'a PatientRecord);

impl fmt::Display for PatientDetails<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        writeln!(f, "Personal Information")?;
        writeln!(f, "  Name: {}", record.name)?;
        writeln!(f, "  ID: {}", record.id)?;
        writeln!(f, "  Age: {}", record.age)?;
        writeln!(f, "  Gender: {}", record.gender)?;

        let contact = &record.contact;
        writeln!(f, "\nContact Information")?;
        writeln!(f, "  Phone: {}", or_placeholder(&contact.phone, "N/A"))?;
        writeln!(f, "  Email: {}", or_placeholder(&contact.email, "N/A"))?;
        writeln!(f, "  Address: {}", or_placeholder(&contact.address, "N/A"))?;

        let medical = &record.medical;
        writeln!(f, "\nMedical Information")?;
        writeln!(f, "  Blood Type: {}", medical.blood_type)?;
        writeln!(f, "  Allergies: {}", or_placeholder(&medical.allergies, "None"))?;
        writeln!(
            f,
            "  Medical Conditions: {}",
            or_placeholder(&medical.conditions, "None")
        )?;

        let insurance = &record.insurance;
        writeln!(f, "\nInsurance Details")?;
        writeln!(f, "  Provider: {}", or_placeholder(&insurance.provider, "N/A"))?;
        writeln!(f, "  Insurance ID: {}", or_placeholder(&insurance.id, "N/A"))
    }
}

/// Table of patient summaries, one row per patient.
pub struct PatientTable(pub Vec<PatientRecordSummary>);

impl fmt::Display for PatientTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = &self.0;
        if rows.is_empty() {
            return writeln!(f, "No patients found in the database.");
        }

        let id_width = rows.iter().map(|r| r.id.len()).max().unwrap_or(0).max(2);
        let name_width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);

        writeln!(
            f,
            "{:<id_width$}  {:<name_width$}  {:>3}  Gender",
            "ID", "Name", "Age"
        )?;
        for row in rows {
            writeln!(
                f,
                "{:<id_width$}  {:<name_width$}  {:>3}  {}",
                row.id, row.name, row.age, row.gender
            )?;
        }
        Ok(())
    }
}

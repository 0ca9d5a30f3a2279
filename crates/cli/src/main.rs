use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hrs_core::{
    open_store, BloodType, CoreConfig, DocumentStore, Gender, PatientRecord, PatientRecordStore,
};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

use render::{PatientDetails, PatientTable};

#[derive(Parser)]
#[command(name = "hrs")]
#[command(about = "Health Record System CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new patient
    Add {
        /// Patient ID
        #[arg(long)]
        id: String,
        /// Full name
        #[arg(long)]
        name: String,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Show a patient record
    View {
        /// Patient ID
        id: String,
        /// Print the stored JSON instead of the formatted view
        #[arg(long)]
        raw: bool,
    },
    /// Replace a patient record, keeping fields not given on the command line
    Update {
        /// Patient ID
        id: String,
        /// Full name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Delete a patient record
    Delete {
        /// Patient ID
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        confirm: bool,
    },
    /// List all patients
    List,
}

/// Optional record fields shared by `add` and `update`.
#[derive(Args)]
struct RecordFields {
    /// Age in years (0-120)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=120))]
    age: Option<u8>,
    /// Male, Female or Other
    #[arg(long)]
    gender: Option<Gender>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    address: Option<String>,
    /// A+, A-, B+, B-, AB+, AB-, O+ or O-
    #[arg(long)]
    blood_type: Option<BloodType>,
    #[arg(long)]
    allergies: Option<String>,
    /// Existing medical conditions
    #[arg(long)]
    conditions: Option<String>,
    #[arg(long)]
    insurance_provider: Option<String>,
    #[arg(long)]
    insurance_id: Option<String>,
}

impl RecordFields {
    fn apply(self, record: &mut PatientRecord) {
        if let Some(age) = self.age {
            record.age = age;
        }
        if let Some(gender) = self.gender {
            record.gender = gender;
        }
        if let Some(phone) = self.phone {
            record.contact.phone = phone;
        }
        if let Some(email) = self.email {
            record.contact.email = email;
        }
        if let Some(address) = self.address {
            record.contact.address = address;
        }
        if let Some(blood_type) = self.blood_type {
            record.medical.blood_type = blood_type;
        }
        if let Some(allergies) = self.allergies {
            record.medical.allergies = allergies;
        }
        if let Some(conditions) = self.conditions {
            record.medical.conditions = conditions;
        }
        if let Some(provider) = self.insurance_provider {
            record.insurance.provider = provider;
        }
        if let Some(insurance_id) = self.insurance_id {
            record.insurance.id = insurance_id;
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hrs_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'hrs --help' for commands");
        return Ok(ExitCode::SUCCESS);
    };

    let cfg = CoreConfig::from_env_values(
        std::env::var("HRS_STORE").ok(),
        std::env::var("HRS_DATA_DIR").ok(),
        std::env::var("HRS_COLLECTION").ok(),
        std::env::var("HRS_CONFLICT_POLICY").ok(),
    )?;
    tracing::debug!(
        "store {:?}, collection {}, conflict policy {:?}",
        cfg.store_backend(),
        cfg.collection(),
        cfg.conflict_policy()
    );
    let store = PatientRecordStore::with_config(open_store(&cfg, true)?, &cfg);

    match run(&store, command) {
        Ok(output) => {
            print!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Runs one command against `store`, returning the text to print.
fn run<S: DocumentStore>(
    store: &PatientRecordStore<S>,
    command: Commands,
) -> anyhow::Result<String> {
    match command {
        Commands::Add { id, name, fields } => {
            let mut record = PatientRecord::new(id, name);
            fields.apply(&mut record);
            store
                .create(&record)
                .context("Error adding patient")?;
            Ok(format!("Patient {} added successfully!\n", record.name))
        }
        Commands::View { id, raw } => {
            let record = store
                .read(&id)
                .context("Error retrieving patient data")?;
            if raw {
                let mut json = serde_json::to_string_pretty(&record)?;
                json.push('\n');
                Ok(json)
            } else {
                Ok(PatientDetails(&record).to_string())
            }
        }
        Commands::Update { id, name, fields } => {
            let mut record = store
                .read(&id)
                .context("Error retrieving patient data")?;
            if let Some(name) = name {
                record.name = name;
            }
            fields.apply(&mut record);
            store
                .update(&id, &record)
                .context("Error updating patient")?;
            Ok(format!("Patient {} updated successfully!\n", record.name))
        }
        Commands::Delete { id, confirm } => {
            if !confirm {
                anyhow::bail!("Please confirm deletion by passing --confirm");
            }
            let removed = store.delete(&id).context("Error deleting patient")?;
            Ok(format!(
                "Patient {} (ID: {}) deleted successfully!\n",
                removed.name, removed.id
            ))
        }
        Commands::List => {
            let summaries = store.list().context("Error retrieving patients")?;
            Ok(PatientTable(summaries.collect()).to_string())
        }
    }
}

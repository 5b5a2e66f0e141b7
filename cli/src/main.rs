//! MediChat command-line front end.
//!
//! Every subcommand prints the JSON `ActionResponse` envelope and exits with
//! status 1 when `success` is false. Local input that cannot be read or
//! parsed is reported through the same envelope.
//!
//! Usage:
//!   medichat symptoms "dry cough and a mild fever since Monday"
//!   medichat --offline medicine Ibuprofen
//!   medichat skin ./mole.jpg
//!   medichat analytics patient.json --type cardiovascular
//!   medichat pharmacy products --category "First Aid"
//!   medichat pharmacy demo-checkout

mod offline;

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use medichat_config::MediChatConfig;
use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    outcome::ActionResponse,
};
use medichat_core::{gemini::GeminiClient, traits::LlmClient};
use medichat_flows::{
    flows::{
        ai_doctor, health_analytics, medical_summarizer, medicine_info, mental_health,
        prescription::{self, Gender, PatientRequest},
        skin_lesion, symptom_analyzer,
    },
    HealthAssistant,
};
use medichat_pharmacy::{
    account::Session,
    cart::{CartCommand, CartView},
    catalog::ProductQuery,
    order::{DeliveryAddress, Order},
    payment::{PaymentMethod, PaymentOrder, PaymentRequest},
    PharmacyStore,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// MediChat: AI health assistant and mock pharmacy.
#[derive(Parser)]
#[command(
    name = "medichat",
    about = "MediChat AI health assistant",
    long_about = "Runs MediChat's AI health features against Gemini (or canned replies with\n\
                  --offline) and drives the in-memory pharmacy."
)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Answer from canned replies instead of calling the model provider.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a free-text symptom description.
    Symptoms { description: String },
    /// Look up usage, dosage, side effects and precautions for a medicine.
    Medicine { name: String },
    /// Ask the AI doctor a question.
    Doctor { prompt: String },
    /// Triage a photo of a skin lesion.
    Skin { image: PathBuf },
    /// Generate a sample prescription.
    Prescription {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        /// Male, Female or Other.
        #[arg(long)]
        gender: String,
        symptoms: String,
    },
    /// Talk to the mental-health companion.
    Companion {
        prompt: String,
        /// An earlier message, oldest first. Repeat for more.
        #[arg(long = "history")]
        history: Vec<String>,
    },
    /// Summarize a medical topic with source links.
    Summarize { topic: String },
    /// Run health analytics on a patient-data JSON file.
    Analytics {
        patient: PathBuf,
        #[arg(long = "type", default_value = "comprehensive")]
        analysis_type: String,
    },
    /// Mock pharmacy operations.
    Pharmacy {
        #[command(subcommand)]
        command: PharmacyCommand,
    },
}

#[derive(Subcommand)]
enum PharmacyCommand {
    /// List catalog products.
    Products {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Log in as the demo user, fill the cart, check out and pay.
    DemoCheckout,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("medichat error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run one command. `Ok(success)` mirrors the printed envelope.
fn run(cli: Cli) -> MediChatResult<bool> {
    let Cli {
        config,
        offline,
        command,
    } = cli;

    let (flow_id, command) = match command {
        Command::Pharmacy { command } => return run_pharmacy(command),
        other => (flow_of(&other), other),
    };

    let config = match &config {
        Some(path) => MediChatConfig::from_file(path)?,
        None => MediChatConfig::default(),
    };
    let client: Box<dyn LlmClient> = if offline {
        Box::new(offline::llm_for(flow_id))
    } else {
        Box::new(GeminiClient::from_config(&config)?)
    };
    debug!(flow_id, client = client.name(), "running flow");
    let assistant = HealthAssistant::with_client(client, config);

    match command {
        Command::Symptoms { description } => print(&assistant.analyze_symptoms(&description)),
        Command::Medicine { name } => print(&assistant.medicine_info(&name)),
        Command::Doctor { prompt } => print(&assistant.talk_to_doctor(&prompt)),
        Command::Skin { image } => match image_data_uri(&image) {
            Ok(uri) => print(&assistant.analyze_skin_lesion(&uri)),
            Err(e) => reject(e),
        },
        Command::Prescription {
            name,
            age,
            gender,
            symptoms,
        } => {
            let gender: Gender = match gender.parse() {
                Ok(gender) => gender,
                Err(e) => return reject(e),
            };
            print(&assistant.generate_prescription(PatientRequest {
                name,
                age,
                gender,
                symptoms,
            }))
        }
        Command::Companion { prompt, history } => print(&assistant.talk_to_companion(&prompt, history)),
        Command::Summarize { topic } => print(&assistant.summarize_topic(&topic)),
        Command::Analytics {
            patient,
            analysis_type,
        } => {
            let patient_data = match read_patient(&patient) {
                Ok(patient_data) => patient_data,
                Err(e) => return reject(e),
            };
            print(&assistant.health_analytics(health_analytics::HealthAnalyticsInput {
                patient_data,
                analysis_type,
            }))
        }
        Command::Pharmacy { command } => run_pharmacy(command),
    }
}

fn flow_of(command: &Command) -> &'static str {
    match command {
        Command::Symptoms { .. } => symptom_analyzer::FLOW_ID,
        Command::Medicine { .. } => medicine_info::FLOW_ID,
        Command::Doctor { .. } => ai_doctor::FLOW_ID,
        Command::Skin { .. } => skin_lesion::FLOW_ID,
        Command::Prescription { .. } => prescription::FLOW_ID,
        Command::Companion { .. } => mental_health::FLOW_ID,
        Command::Summarize { .. } => medical_summarizer::FLOW_ID,
        Command::Analytics { .. } => health_analytics::FLOW_ID,
        Command::Pharmacy { .. } => "pharmacy",
    }
}

// ── Pharmacy ─────────────────────────────────────────────────────────────────

fn run_pharmacy(command: PharmacyCommand) -> MediChatResult<bool> {
    let store = PharmacyStore::seeded();
    match command {
        PharmacyCommand::Products { category, search } => {
            let products = store.list_products(&ProductQuery { category, search });
            print(&ActionResponse::ok(products))
        }
        PharmacyCommand::DemoCheckout => {
            let response = match demo_checkout(&store) {
                Ok(summary) => ActionResponse::ok(summary),
                Err(e) => ActionResponse::err(e.to_string()),
            };
            print(&response)
        }
    }
}

#[derive(Serialize)]
struct DemoCheckout {
    session: Session,
    cart: CartView,
    order: Order,
    payment: PaymentOrder,
}

fn demo_checkout(store: &PharmacyStore) -> MediChatResult<DemoCheckout> {
    let session = store.login("user@example.com", "password123")?;
    store.update_cart(CartCommand::add("1", 2))?;
    store.update_cart(CartCommand::add("4", 1))?;
    let cart = store.update_cart(CartCommand::add("6", 1))?;

    let order = store.checkout(
        &session.user.id,
        DeliveryAddress {
            street: "42 Elm Street".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            phone: session.user.phone.clone(),
        },
    )?;
    let payment = store.create_payment_order(PaymentRequest {
        amount: order.total_amount,
        currency: None,
        receipt: Some(order.id.clone()),
    })?;
    let payment = store.process_payment(&payment.id, PaymentMethod::Upi)?;
    let order = store.order(&order.id)?;

    Ok(DemoCheckout {
        session,
        cart,
        order,
        payment,
    })
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn print<T: Serialize>(response: &ActionResponse<T>) -> MediChatResult<bool> {
    let text = serde_json::to_string_pretty(response).map_err(|e| MediChatError::ResponseParsing {
        reason: format!("failed to render response: {}", e),
    })?;
    println!("{text}");
    Ok(response.success)
}

/// Print a failed envelope for input rejected before any flow ran.
fn reject(err: MediChatError) -> MediChatResult<bool> {
    print(&ActionResponse::<()>::err(err.to_string()))
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Read an image file into a base64 `data:` URI.
fn image_data_uri(path: &Path) -> MediChatResult<String> {
    let mime = mime_for(path).ok_or_else(|| {
        MediChatError::invalid("image", "Please upload a PNG, JPEG, WebP, GIF or HEIC image.")
    })?;
    let bytes = std::fs::read(path)
        .map_err(|e| MediChatError::invalid("image", format!("cannot read '{}': {}", path.display(), e)))?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

fn read_patient(path: &Path) -> MediChatResult<health_analytics::PatientData> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| MediChatError::invalid("patient", format!("cannot read '{}': {}", path.display(), e)))?;
    serde_json::from_str(&text)
        .map_err(|e| MediChatError::invalid("patient", format!("invalid patient JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use medichat_pharmacy::order::{OrderStatus, PaymentStatus};

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["medichat", "medicine", "Ibuprofen", "--offline"]).unwrap();
        assert!(cli.offline);
        assert_eq!(flow_of(&cli.command), medicine_info::FLOW_ID);
    }

    #[test]
    fn companion_history_repeats() {
        let cli = Cli::try_parse_from([
            "medichat", "companion", "hi", "--history", "one", "--history", "two",
        ])
        .unwrap();
        match cli.command {
            Command::Companion { history, .. } => assert_eq!(history, vec!["one", "two"]),
            _ => panic!("expected companion"),
        }
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for(Path::new("mole.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for(Path::new("scan.png")), Some("image/png"));
        assert_eq!(mime_for(Path::new("notes.txt")), None);
        assert_eq!(mime_for(Path::new("noext")), None);
    }

    #[test]
    fn demo_checkout_confirms_the_order() {
        let summary = demo_checkout(&PharmacyStore::seeded()).unwrap();
        assert_eq!(summary.order.status, OrderStatus::Confirmed);
        assert_eq!(summary.order.payment_status, PaymentStatus::Completed);
        // 2 x 8.99 + 15.00 + 9.99
        assert_eq!(summary.order.total_amount.to_string(), "42.97");
        assert_eq!(summary.payment.amount, 4297);
        assert!(summary.session.token.starts_with("mock-session-"));
    }

    #[test]
    fn bad_local_input_is_a_failed_envelope() {
        let cases: [&[&str]; 3] = [
            &[
                "medichat", "--offline", "prescription", "--name", "Sam Lee", "--age", "40",
                "--gender", "robot", "runny nose and sneezing",
            ],
            &["medichat", "--offline", "skin", "notes.txt"],
            &["medichat", "--offline", "analytics", "/nonexistent/patient.json"],
        ];
        for args in cases {
            let cli = Cli::try_parse_from(args).unwrap();
            assert!(!run(cli).unwrap(), "{args:?}");
        }
    }

    #[test]
    fn offline_run_succeeds() {
        let cli = Cli::try_parse_from(["medichat", "--offline", "doctor", "I feel dizzy"]).unwrap();
        assert!(run(cli).unwrap());
    }
}

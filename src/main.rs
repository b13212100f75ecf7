// consultation-desk CLI - drives the consultation pipeline from a terminal

use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use consultation_desk::filters::{self, Filters};
use consultation_desk::{
    export, CallStatus, Config, Consultation, ConsultationService, ConsultationStore,
    UpdateCallStatus,
};

#[derive(Parser)]
#[command(name = "consultation-desk")]
#[command(about = "Call-status tracker for study-abroad consultations", long_about = None)]
struct Cli {
    /// Bearer token for the consultation API (falls back to CONSULT_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Substring match on name or contact
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    district: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// Call status, e.g. NOT_CALLED or COMPLETED
    #[arg(long)]
    status: Option<CallStatus>,
    #[arg(long)]
    counsellor: Option<String>,
    #[arg(long)]
    interested_in: Option<String>,
    #[arg(long)]
    called_by: Option<String>,
    /// Exact submission day, e.g. 2026-08-01
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl FilterArgs {
    fn into_filters(self) -> Filters {
        let mut filters = Filters::default();
        // state first: picking a state resets the district
        filters.set_state(self.state);
        filters.search = self.search.unwrap_or_default();
        filters.district = self.district;
        filters.country = self.country;
        filters.call_status = self.status;
        filters.counsellor = self.counsellor;
        filters.interested_in = self.interested_in;
        filters.called_by = self.called_by;
        filters.date = self.date;
        filters
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and list consultations
    List {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 25)]
        per_page: usize,
    },
    /// Print the summary statistics the dashboard cards show
    Stats,
    /// Call report over an optional submission date range
    Report {
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
    /// Update the call status of one consultation
    Update {
        id: String,
        #[arg(long)]
        status: CallStatus,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long)]
        called_by: Option<String>,
        #[arg(long)]
        called_by_id: Option<String>,
    },
    /// Generate AI call notes for one consultation
    Notes { id: String },
    /// Export filtered consultations to an .xlsx file
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Output path; defaults to consultations_<date>.xlsx
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the admins/counselors who place calls
    Admins,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "consultation_desk=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.validate()?;

    let token = cli
        .token
        .or_else(|| config.api_token.clone())
        .context("no API token: pass --token or set CONSULT_API_TOKEN")?;

    let service = ConsultationService::new(&config)?;

    match cli.command {
        Commands::List {
            filters,
            page,
            per_page,
        } => {
            let store = load_store(&service, &token, filters.into_filters()).await?;
            let filtered = store.filtered();
            let (rows, total_pages) = filters::paginate(&filtered, page, per_page);

            println!(
                "Showing {} of {} consultations (page {}/{})",
                rows.len(),
                store.records().len(),
                page.min(total_pages.max(1)),
                total_pages.max(1)
            );
            for record in rows {
                print_row(record);
            }
        }
        Commands::Stats => {
            let store = load_store(&service, &token, Filters::default()).await?;
            let students = store.student_stats();
            let calls = store.call_stats();

            println!("Total students:  {}", students.total_students);
            println!("Avg NEET score:  {}", students.avg_neet_score);
            println!("New this month:  {}", students.new_this_month);
            println!("Top country:     {}", students.top_country);
            println!();
            println!(
                "Calls: {} total / {} completed / {} scheduled / {} not called / {} missed / {} dead leads / {} going abroad",
                calls.total_calls,
                calls.completed,
                calls.scheduled,
                calls.not_called,
                calls.missed,
                calls.dead_leads,
                calls.going_abroad
            );
            if !calls.unique_callers.is_empty() {
                println!("Callers: {}", calls.unique_callers.join(", "));
            }
        }
        Commands::Report {
            start_date,
            end_date,
        } => {
            let records = service
                .fetch_admin_consultations(&token, start_date, end_date)
                .await?;
            let mut store = ConsultationStore::new();
            let ticket = store.begin_fetch();
            store.commit_fetch(ticket, records);

            for record in store.records() {
                println!(
                    "{}  {:<20}  {:<18}  {}",
                    record.id,
                    record.name,
                    record.effective_status().label(),
                    record.called_by.as_deref().unwrap_or("Not called yet")
                );
            }
            let calls = store.call_stats();
            println!(
                "\n{} consultations, {} completed, {} distinct callers",
                calls.total_calls,
                calls.completed,
                calls.unique_callers.len()
            );
        }
        Commands::Update {
            id,
            status,
            notes,
            called_by,
            called_by_id,
        } => {
            let update = UpdateCallStatus {
                call_status: status,
                call_notes: notes,
                called_by: called_by.unwrap_or_default(),
                called_by_id: called_by_id.unwrap_or_default(),
            };
            let updated = service.update_call_status(&token, &id, &update).await?;
            println!(
                "{}: {} ({})",
                updated.id,
                updated.effective_status().label(),
                updated
                    .last_called_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never called".to_string())
            );
        }
        Commands::Notes { id } => {
            let records = service.fetch_all(&token).await?;
            let consultation = records
                .iter()
                .find(|r| r.id == id)
                .with_context(|| format!("no consultation with id {}", id))?;
            let notes = service.generate_ai_notes(&token, consultation).await?;
            println!("{}", notes);
        }
        Commands::Export {
            filters,
            start_date,
            end_date,
            out,
        } => {
            let records = if start_date.is_some() || end_date.is_some() {
                service
                    .fetch_admin_consultations(&token, start_date, end_date)
                    .await?
            } else {
                service.fetch_all(&token).await?
            };

            let mut store = ConsultationStore::new();
            let ticket = store.begin_fetch();
            store.commit_fetch(ticket, records);
            *store.filters_mut() = filters.into_filters();
            store.select_all_filtered();

            let bytes = export::export_xlsx(&store.selected_records())?;
            let path = out.unwrap_or_else(|| {
                PathBuf::from(export::export_filename(
                    "consultations",
                    start_date,
                    end_date,
                    Utc::now().date_naive(),
                ))
            });
            std::fs::write(&path, bytes)?;
            println!(
                "Exported {} consultations to {}",
                store.selection().len(),
                path.display()
            );
        }
        Commands::Admins => {
            let admins = service.fetch_admins(&token).await?;
            for admin in &admins {
                println!("{}  {}", admin.id, admin.display_name());
            }
            println!("{} admins", admins.len());
        }
    }

    Ok(())
}

async fn load_store(
    service: &ConsultationService,
    token: &str,
    filters: Filters,
) -> anyhow::Result<ConsultationStore> {
    let mut store = ConsultationStore::new();
    let ticket = store.begin_fetch();
    let records = service.fetch_all(token).await?;
    store.commit_fetch(ticket, records);
    *store.filters_mut() = filters;
    Ok(store)
}

fn print_row(record: &Consultation) {
    println!(
        "{}  {:<20}  {:<12}  {:<14}  {:<10}  {:<18}  {}",
        record.id,
        record.name,
        record.contact,
        record.state,
        record.neet_score.as_deref().unwrap_or("-"),
        record.display_country(),
        record.effective_status().label()
    );
}

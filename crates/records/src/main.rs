//! `counsel` -- console front end for the counseling records backend.
//!
//! Reads the persisted session and prints entity lists, upcoming
//! appointments and dashboard counts.
//!
//! # Environment variables
//!
//! | Variable                     | Default                     | Description                  |
//! |------------------------------|-----------------------------|------------------------------|
//! | `COUNSEL_API_URL`            | `http://localhost:8000/api` | Backend base URL             |
//! | `COUNSEL_TIMEOUT_SECS`       | `5`                         | Request timeout              |
//! | `COUNSEL_SESSION_FILE`       | `.counsel/session.json`     | Persisted token and role     |
//! | `RUST_LOG`                   | `counsel=info,...`          | Log filter                   |

use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use counsel_client::{ClientConfig, HttpClient, RecordApi, SessionStore};
use counsel_core::appointment::upcoming;
use counsel_core::catalog::{self, APPOINTMENTS};
use counsel_core::dashboard::{GradeFilter, ProblemCategory, RangePreset};
use counsel_records::dashboard::DashboardAggregator;
use counsel_records::table::{default_columns, RecordTable, TableView};
use counsel_records::AppContext;

#[derive(Parser)]
#[command(name = "counsel", version, about = "Student counseling records client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every entity schema.
    Schemas,
    /// Print the records of one entity.
    List {
        /// Cache key, e.g. `grade_one_records`.
        key: String,
    },
    /// Appointments from today on, in date and time order.
    Upcoming,
    /// Problem counts per category.
    Dashboard {
        /// Grade or year label; `All` when omitted.
        grade: Option<String>,
        #[arg(long, value_enum, default_value_t = Range::All)]
        range: Range,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Range {
    All,
    Quarterly,
    Yearly,
}

impl From<Range> for RangePreset {
    fn from(range: Range) -> Self {
        match range {
            Range::All => RangePreset::Custom,
            Range::Quarterly => RangePreset::Quarterly,
            Range::Yearly => RangePreset::Yearly,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "counsel=info,counsel_records=info,counsel_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Command::Schemas = cli.command {
        print_schemas();
        return;
    }

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    let session = match &config.session_file {
        Some(path) => SessionStore::load(path).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, path = %path.display(), "Failed to load session");
            std::process::exit(1);
        }),
        None => SessionStore::in_memory(),
    };
    if !session.is_signed_in().await {
        tracing::warn!("No saved session; requests are sent without a token");
    }

    let client = HttpClient::new(&config, session).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });
    tracing::info!(api_url = client.api_url(), "Starting counsel");

    let api: Arc<dyn RecordApi> = Arc::new(client);
    let ctx = AppContext::new(api);

    let ok = match cli.command {
        Command::Schemas => true,
        Command::List { key } => list(ctx, &key).await,
        Command::Upcoming => print_upcoming(&ctx).await,
        Command::Dashboard { grade, range } => dashboard(ctx, grade.as_deref(), range).await,
    };
    if !ok {
        std::process::exit(1);
    }
}

fn print_schemas() {
    for schema in catalog::catalog() {
        println!(
            "{:<28} /{}/  {} ({} fields, {} page(s))",
            schema.key,
            schema.endpoint,
            schema.title,
            schema.fields.len(),
            schema.pages,
        );
    }
}

async fn list(ctx: AppContext, key: &str) -> bool {
    let schema = match catalog::find(key) {
        Ok(schema) => schema,
        Err(e) => {
            tracing::error!(error = %e, "Unknown entity");
            return false;
        }
    };

    let mut table = RecordTable::new(ctx, schema, default_columns(schema));
    table.query_mut().settled().await;

    match table.view() {
        TableView::Rows(rows) => {
            let headers: Vec<_> = table.columns().iter().map(|c| c.header).collect();
            println!("id\t{}", headers.join("\t"));
            for row in &rows {
                let id = row.record.id.map(|id| id.to_string()).unwrap_or_default();
                println!("{id}\t{}", row.cells.join("\t"));
            }
            tracing::info!(entity = schema.key, count = rows.len(), "Listed records");
            true
        }
        TableView::Error(message) => {
            tracing::error!(entity = schema.key, %message, "Failed to list records");
            false
        }
        TableView::Loading | TableView::Fetching => false,
    }
}

async fn print_upcoming(ctx: &AppContext) -> bool {
    let records = match ctx.api.list(APPOINTMENTS.endpoint).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load appointments");
            return false;
        }
    };

    let today = Local::now().date_naive();
    for appt in upcoming(&records, today) {
        println!(
            "{}  {:<8} {:<10} {:<24} {:<20} {}",
            appt.date, appt.time, appt.sr_code, appt.name, appt.purpose, appt.status
        );
    }
    true
}

async fn dashboard(ctx: AppContext, grade: Option<&str>, range: Range) -> bool {
    let mut dashboard = DashboardAggregator::new(ctx);
    dashboard.set_grade(GradeFilter::parse(grade.unwrap_or_default()));
    dashboard.set_preset(range.into(), Local::now().date_naive());

    let report = dashboard.refresh().await;

    for slice in dashboard.pie() {
        println!("{:<20} {}", slice.category, slice.count);
    }
    for category in ProblemCategory::ALL {
        println!();
        println!("{}", category.label());
        for bucket in dashboard.bars(category) {
            println!("  {:<30} {}", bucket.label, bucket.count);
        }
    }

    report.is_complete()
}

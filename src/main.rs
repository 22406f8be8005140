use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ia_feature_sync::config::{self, HttpConfig};
use ia_feature_sync::models::ProjectVariant;
use ia_feature_sync::notify::OoNotifier;
use ia_feature_sync::ppm::PpmClient;
use ia_feature_sync::sync::FeatureSync;

#[derive(Parser)]
#[command(name = "iafs")]
#[command(about = "Keep IS PMO Features in step with their Impact Assessment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create Features for impacted domains that have none
    Create {
        /// PPM base URL, e.g. https://ppm.example.com/itg/
        base_url: String,
        username: String,
        password: String,
        assessment_id: String,
        project_id: String,
        project_name: String,
        /// Request type name of the IT project (or its short slug)
        project_request_type: String,
    },
    /// Refresh impacted systems on the project's Features
    Update {
        /// PPM base URL, e.g. https://ppm.example.com/itg/
        base_url: String,
        username: String,
        password: String,
        assessment_id: String,
        project_id: String,
        /// OO base URL; enables tracker notification together with the key
        oo_base_url: Option<String>,
        /// Pre-encoded basic credential for OO
        #[arg(requires = "oo_base_url")]
        oo_auth_key: Option<String>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "ia_feature_sync=info,iafs=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let http = HttpConfig::from_env();

    match cli.command {
        Commands::Create {
            base_url,
            username,
            password,
            assessment_id,
            project_id,
            project_name,
            project_request_type,
        } => {
            let variant: ProjectVariant = project_request_type.parse()?;
            tracing::info!(
                "Creating Features for assessment {} on project {} ({})",
                assessment_id,
                project_id,
                variant
            );

            let ppm = PpmClient::new(&base_url, username, password, &http)?;
            let outcome = FeatureSync::new(&ppm, &ppm, &base_url)
                .create_missing_features(&assessment_id, &project_id, &project_name, variant)
                .await
                .with_context(|| format!("create run for assessment {} failed", assessment_id))?;

            for feature in &outcome.created {
                tracing::info!("{}: Feature {}", feature.domain, feature.request_id);
            }
            tracing::info!("Created {} Feature(s)", outcome.created.len());
        }
        Commands::Update {
            base_url,
            username,
            password,
            assessment_id,
            project_id,
            oo_base_url,
            oo_auth_key,
        } => {
            tracing::info!(
                "Updating Features of project {} from assessment {}",
                project_id,
                assessment_id
            );

            let ppm = PpmClient::new(&base_url, username, password, &http)?;
            let notifier = match (oo_base_url, oo_auth_key) {
                (Some(url), Some(key)) => {
                    Some(OoNotifier::new(url, key, config::oo_flow_uuid(), &http)?)
                }
                (Some(_), None) => {
                    tracing::warn!("OO base URL given without an auth key, notification disabled");
                    None
                }
                _ => None,
            };

            let mut sync = FeatureSync::new(&ppm, &ppm, &base_url);
            if let Some(notifier) = &notifier {
                sync = sync.with_notifier(notifier);
            }
            let outcome = sync
                .update_features(&assessment_id, &project_id)
                .await
                .with_context(|| format!("update run for project {} failed", project_id))?;

            tracing::info!(
                "Updated {} Feature(s), notified {}",
                outcome.updated.len(),
                outcome.notified
            );
        }
    }

    Ok(())
}

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facegate::config;
use facegate::directory::{FileDirectory, UserDirectory, UserRecord};
use facegate::extractor::HistogramExtractor;
use facegate::service::FaceService;
use facegate::store::LocalFileStore;
use log::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "facegate")]
#[command(
    version,
    about = "Face check-in for residents - enrollment, verification and identification"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a user to the local directory
    AddUser {
        /// Display name of the new user
        name: String,
    },
    /// Enroll a face image for an existing user
    Enroll {
        /// User ID to enroll
        #[arg(short, long)]
        user: Uuid,
        /// Path to the face image
        image: PathBuf,
    },
    /// Verify a face image against one user's enrolled face
    Verify {
        /// User ID to verify
        #[arg(short, long)]
        user: Uuid,
        /// Path to the face image
        image: PathBuf,
    },
    /// Identify the enrolled user best matching a face image
    Identify {
        /// Path to the face image
        image: PathBuf,
    },
    /// Remove a user's enrolled face
    Purge {
        /// User ID to purge
        #[arg(short, long)]
        user: Uuid,
    },
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(None)?;

    match cli.command {
        Commands::AddUser { name } => add_user(&cfg, &name),
        Commands::Enroll { user, image } => enroll(&cfg, user, &image),
        Commands::Verify { user, image } => verify(&cfg, user, &image),
        Commands::Identify { image } => identify(&cfg, &image),
        Commands::Purge { user } => purge(&cfg, user),
        Commands::Config => open_config(),
    }
}

fn service(cfg: &config::Config) -> FaceService<FileDirectory, LocalFileStore, HistogramExtractor> {
    FaceService::new(
        FileDirectory::new(&cfg.data_dir),
        LocalFileStore::new(&cfg.data_dir),
        HistogramExtractor,
        cfg.threshold,
    )
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading image {}", path.display()))
}

fn add_user(cfg: &config::Config, name: &str) -> Result<()> {
    let directory = FileDirectory::new(&cfg.data_dir);
    let record = UserRecord::new(Uuid::new_v4(), name);
    let id = record.id;
    directory.save(record).context("Failed to save user record")?;

    info!("✓ User added: {} ({})", name, id);
    Ok(())
}

fn enroll(cfg: &config::Config, user: Uuid, image: &Path) -> Result<()> {
    info!("Enrolling user: {}", user);

    let image = read_image(image)?;
    let result = service(cfg).enroll(user, &image);

    if result.success {
        info!("✓ {}", result.message);
        Ok(())
    } else {
        anyhow::bail!("{}", result.message);
    }
}

fn verify(cfg: &config::Config, user: Uuid, image: &Path) -> Result<()> {
    info!("Verifying user: {}", user);

    let image = read_image(image)?;
    let result = service(cfg).verify(user, &image);

    info!(
        "Similarity: {:.3} (threshold: {:.3})",
        result.similarity, cfg.threshold
    );

    if result.verified {
        info!("✓ {}", result.message);
        Ok(())
    } else {
        anyhow::bail!("{}", result.message);
    }
}

fn identify(cfg: &config::Config, image: &Path) -> Result<()> {
    let image = read_image(image)?;
    let result = service(cfg).identify(Some(&image));

    info!("Best similarity: {:.3}", result.similarity);

    if result.identified {
        let name = result.full_name.unwrap_or_default();
        let id = result.user_id.map(|id| id.to_string()).unwrap_or_default();
        info!("✓ {} {} ({})", result.message, name, id);
        Ok(())
    } else {
        anyhow::bail!("{}", result.message);
    }
}

fn purge(cfg: &config::Config, user: Uuid) -> Result<()> {
    info!("Removing enrolled face for user: {}", user);

    let directory = FileDirectory::new(&cfg.data_dir);
    directory.purge(user).context("Failed to purge face data")?;

    info!("✓ Enrolled face removed for user: {}", user);
    Ok(())
}

fn open_config() -> Result<()> {
    let config_path = config::CONFIG_PATH.as_os_str();
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}

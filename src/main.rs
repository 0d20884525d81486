use clap::{Parser, Subcommand};
use gallery_sync::config::{self, SyncConfig};
use gallery_sync::event::{Notification, on_change_notification};
use gallery_sync::imaging::RustBackend;
use gallery_sync::storage::{Bucket, LocalBucket, S3Bucket};
use gallery_sync::sync::Synchronizer;
use gallery_sync::{output, trigger};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gallery-sync")]
#[command(about = "Keep an object-store photo gallery's thumbnails and album descriptors in sync")]
#[command(long_about = "\
Keep an object-store photo gallery's thumbnails and album descriptors in sync

The bucket is the data source. Every first-level folder under the gallery
prefix is an album; descriptors and the manifest are derived from it.

Bucket layout:

  images/gallery/
  ├── air_camera/                  # Album
  │   ├── meta.json                # Optional sidecar: title, caption, thumbnail
  │   ├── 01.jpg                   # Source image (jpg, jpeg, png, webp)
  │   └── thumbs/thumb_01.jpg      # Generated thumbnail (longer edge ≤ 800px)
  └── cover.jpg                    # Loose file, ignored
  configs/
  ├── air_camera.json              # Generated album descriptor
  └── manifest.json                # Generated list of album ids

Metadata resolution (first available wins):
  Title:       sidecar title → album name (air_camera → \"Air Camera\")
  Description: sidecar caption → empty
  Thumbnail:   sidecar URL or filename → empty

Run 'gallery-sync gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = "gallery.toml", global = true)]
    config: PathBuf,

    /// Use a local directory mirroring the bucket instead of S3
    #[arg(long, global = true)]
    local: Option<PathBuf>,

    /// Bucket name (overrides the config file)
    #[arg(long, global = true)]
    bucket: Option<String>,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sync every album, then rebuild the manifest
    Sync,
    /// Sync one album, then rebuild the manifest
    #[command(alias = "reprocess")]
    SyncAlbum {
        /// Album name (folder under the gallery prefix)
        album: String,
    },
    /// Rebuild the manifest from existing descriptors
    Manifest,
    /// Handle an object-created notification batch (JSON file, or - for stdin)
    HandleEvent {
        #[arg(default_value = "-")]
        input: String,
    },
    /// Copy one image per album onto itself to re-fire bucket notifications
    Trigger,
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut sync_config = config::load_config(&cli.config)?;
    if let Some(bucket) = &cli.bucket {
        sync_config.bucket = bucket.clone();
    }
    let store = open_bucket(&cli, &sync_config)?;
    let backend = RustBackend::new();
    let sync = Synchronizer::new(&sync_config, store.as_ref(), &backend);

    match &cli.command {
        Command::Sync => {
            let report = sync.sync_all()?;
            output::print_sync_report(&report);
        }
        Command::SyncAlbum { album } => {
            let report = sync.reprocess(album)?;
            output::print_sync_report(&report);
        }
        Command::Manifest => {
            let manifest = sync.rebuild_manifest()?;
            output::print_manifest(&manifest);
        }
        Command::HandleEvent { input } => {
            let body = read_input(input)?;
            let notification = Notification::from_slice(&body)?;
            let ack = on_change_notification(&sync, &notification)?;
            println!("{}", serde_json::to_string(&ack)?);
        }
        Command::Trigger => {
            let outcomes = trigger::touch_albums(store.as_ref(), &sync_config)?;
            output::print_touch_outcomes(&outcomes);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Default level from -v/-q; `RUST_LOG` wins when set.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,gallery_sync={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_bucket(
    cli: &Cli,
    sync_config: &SyncConfig,
) -> Result<Box<dyn Bucket>, Box<dyn std::error::Error>> {
    match &cli.local {
        Some(root) => Ok(Box::new(LocalBucket::new(root))),
        None => {
            if sync_config.bucket.is_empty() {
                return Err("no bucket configured: pass --bucket, set `bucket` in the config, or use --local".into());
            }
            Ok(Box::new(S3Bucket::connect(
                &sync_config.bucket,
                sync_config.region.as_deref(),
                sync_config.endpoint.as_deref(),
            )?))
        }
    }
}

fn read_input(input: &str) -> std::io::Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(input)
    }
}

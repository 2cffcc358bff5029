use clap::{Parser, Subcommand, ValueEnum};
use spotpin::config::{self, AppConfig};
use spotpin::geometry::LatLng;
use spotpin::imaging::{CompressSettings, RustBackend, compress_many};
use spotpin::ingest::{IngestPipeline, MemoryPreviewStore};
use spotpin::output::{self, CompressOutcome};
use spotpin::spot::{CarAccessibility, DEFAULT_RATING, SpotForm};
use spotpin::store::{FsObjectStore, JsonRecordStore, OrderBy, RecordStore};
use spotpin::types::ImageFile;
use spotpin::{naming, picker, submit};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "spotpin")]
#[command(about = "Compress, publish and manage street-speech spots")]
#[command(long_about = "\
Compress, publish and manage street-speech spots

Photos go through the same pipeline as the map's form: each picked file is
checked against the upload limits, compressed to fit the size budget, and
uploaded in order before the spot record is written.

Store layout:

  store/
  ├── spots.json                   # Spot records and their change history
  └── spots/                       # Uploaded images (<millis>-<name>)
      └── 1717000000000-a.jpg

Run 'spotpin gen-config' to generate a documented spotpin.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./spotpin.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Where spot records and uploaded images live.
#[derive(clap::Args, Clone)]
struct StoreArgs {
    /// Store directory
    #[arg(long, default_value = "store")]
    store_dir: PathBuf,
}

#[derive(clap::Args)]
struct PublishArgs {
    /// Image files or directories, in display order
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Spot name
    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    #[arg(long, allow_negative_numbers = true)]
    lng: f64,

    /// Election car access: allowed, brief_stop or not_allowed
    #[arg(long)]
    car: CarAccessibility,

    /// 1-10
    #[arg(long, default_value_t = DEFAULT_RATING)]
    rating: u8,

    /// Recommended hour (8-22); repeatable
    #[arg(long = "time")]
    times: Vec<u8>,

    /// Typical passer-by group; repeatable
    #[arg(long = "audience")]
    audience: Vec<String>,

    #[command(flatten)]
    store: StoreArgs,

    /// Print the stored spot as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListOrder {
    Newest,
    Oldest,
    Rating,
}

impl From<ListOrder> for OrderBy {
    fn from(order: ListOrder) -> Self {
        match order {
            ListOrder::Newest => OrderBy::CreatedDesc,
            ListOrder::Oldest => OrderBy::CreatedAsc,
            ListOrder::Rating => OrderBy::RatingDesc,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Compress images to the configured size budget
    Compress {
        /// Image files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output directory
        #[arg(long, default_value = "compressed")]
        out_dir: PathBuf,
    },
    /// Compress and upload images, then store a new spot
    Publish(PublishArgs),
    /// List stored spots
    List {
        #[command(flatten)]
        store: StoreArgs,

        #[arg(long, value_enum, default_value = "newest")]
        order: ListOrder,

        /// Print spots as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one spot with its change history
    Show {
        id: Uuid,

        #[command(flatten)]
        store: StoreArgs,
    },
    /// Delete a stored spot
    Delete {
        id: Uuid,

        #[command(flatten)]
        store: StoreArgs,
    },
    /// Validate the configuration
    Check,
    /// Print a stock spotpin.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Check => {
            let config = load_config(cli.config.as_deref())?;
            println!(
                "==> Config is valid (target {}KB, max {}x{}, {} worker(s))",
                config.compression.target_size_kb,
                config.compression.max_width,
                config.compression.max_height,
                config::effective_threads(&config.processing)
            );
        }
        Command::Compress { paths, out_dir } => {
            let config = load_config(cli.config.as_deref())?;
            compress_to_dir(&config, &paths, &out_dir)?;
        }
        Command::Publish(args) => {
            let config = load_config(cli.config.as_deref())?;
            publish(&config, args)?;
        }
        Command::List { store, order, json } => {
            let records = JsonRecordStore::open_in(&store.store_dir)?;
            let spots = records.list(order.into())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&spots)?);
            } else {
                output::print_spot_list(&spots);
            }
        }
        Command::Show { id, store } => {
            let records = JsonRecordStore::open_in(&store.store_dir)?;
            let spot = records.get(id)?;
            output::print_spot(&spot);
            output::print_history(&records.history(id)?);
        }
        Command::Delete { id, store } => {
            let mut records = JsonRecordStore::open_in(&store.store_dir)?;
            if let Err(e) = submit::delete_spot(id, &mut records) {
                log::error!("{}", e.user_message());
                return Err(e.into());
            }
            println!("==> Deleted {}", id);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: workers can be constrained down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn compress_to_dir(
    config: &AppConfig,
    paths: &[PathBuf],
    out_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let picked = picker::pick(paths, &config.upload)?;
    init_thread_pool(&config.processing);

    let files: Vec<ImageFile> = picked.accepted.iter().map(|p| p.file.clone()).collect();
    let compressed = compress_many(
        &RustBackend::new(),
        &files,
        &CompressSettings::from(&config.compression),
    )?;

    std::fs::create_dir_all(out_dir)?;
    let mut taken = HashSet::new();
    let mut outcomes = Vec::with_capacity(compressed.len());
    for (source, compressed) in picked.accepted.into_iter().zip(compressed) {
        let mut name = compressed.file.name.clone();
        let mut n = 1;
        while !taken.insert(name.clone()) {
            n += 1;
            name = naming::numbered(&compressed.file.name, n);
        }
        let target = out_dir.join(&name);
        std::fs::write(&target, &compressed.file.bytes)?;
        outcomes.push(CompressOutcome {
            source: source.path,
            original_size: source.file.size(),
            output: Some(target),
            compressed,
        });
    }

    output::print_compress_report(&outcomes, &picked.rejected);
    Ok(())
}

fn publish(config: &AppConfig, args: PublishArgs) -> Result<(), Box<dyn std::error::Error>> {
    let picked = picker::pick(&args.paths, &config.upload)?;
    for (name, rejection) in &picked.rejected {
        println!("Skipped {}", output::format_rejection(name, rejection));
    }
    init_thread_pool(&config.processing);

    let files: Vec<ImageFile> = picked.accepted.into_iter().map(|p| p.file).collect();
    let mut images = IngestPipeline::new(
        MemoryPreviewStore::new(),
        CompressSettings::from(&config.compression),
    );
    images.add_files(&RustBackend::new(), &files)?;

    let mut form = SpotForm {
        title: args.title,
        description: args.description,
        rating: args.rating,
        best_time: args.times,
        audience_attributes: args.audience,
        car_accessibility: Some(args.car),
        ..SpotForm::at(LatLng::new(args.lat, args.lng))
    };

    let objects = FsObjectStore::new(&args.store.store_dir, &config.upload);
    let mut records = JsonRecordStore::open_in(&args.store.store_dir)?;

    let spot = match submit::create_spot(&mut form, &mut images, &objects, &mut records) {
        Ok(spot) => spot,
        Err(e) => {
            log::error!("{}", e.user_message());
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&spot)?);
    } else {
        output::print_spot(&spot);
    }
    Ok(())
}

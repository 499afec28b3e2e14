//! Yolodex: a catalog for YOLO-style image datasets.
//!
//! Yolodex ingests dataset archives in one of two layouts and normalizes
//! them into flat class, image, and label records that can be browsed
//! afterwards:
//!
//! - **classification**: `<split>/<class>/<file>` directories, class ids
//!   assigned by sorted class name;
//! - **manifest-driven** (detect, segment, pose, ...): a `data.yaml` naming
//!   split image directories, with one `.txt` label file per image.
//!
//! # Modules
//!
//! - [`archive`]: read access to zip files, directories, and in-memory archives
//! - [`manifest`]: `data.yaml` parsing
//! - [`ingest`]: layout extractors, record assembly, and the upload flow
//! - [`record`]: catalog record types
//! - [`store`]: the persistence seam and its JSON-file implementation
//! - [`display`]: joins that turn stored records into display rows
//! - [`error`]: error types for yolodex operations

pub mod archive;
pub mod display;
pub mod error;
pub mod ingest;
pub mod manifest;
pub mod record;
pub mod store;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

pub use error::YolodexError;

use archive::DirArchive;
use display::{ClassCount, DatasetSummary, ImageWithLabels};
use ingest::UploadRequest;
use record::{ClassId, DatasetId, ImageSet, TaskKind};
use store::{JsonStore, Store};

/// The yolodex CLI application.
#[derive(Parser)]
#[command(name = "yolodex")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Catalog file holding every ingested dataset.
    #[arg(long, env = "YOLODEX_STORE", default_value = "yolodex.json", global = true)]
    store: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Ingest a dataset archive (.zip) or an unpacked dataset directory.
    Ingest(IngestArgs),
    /// List all datasets with class and image counts.
    List(ListArgs),
    /// Show one dataset, including its manifest metadata.
    Show(ShowArgs),
    /// List the classes of a dataset with label counts for one split.
    Classes(ClassesArgs),
    /// List the images of one split with their labels.
    Images(ImagesArgs),
}

/// Arguments for the ingest subcommand.
#[derive(clap::Args)]
struct IngestArgs {
    /// Zip archive or directory to ingest.
    input: PathBuf,

    /// Dataset task ('classify' reads class directories; anything else reads data.yaml).
    #[arg(long, default_value = "detect")]
    task: String,

    /// Display name (defaults to the input file name).
    #[arg(long)]
    name: Option<String>,

    /// Free-form description.
    #[arg(long, default_value = "")]
    description: String,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the list subcommand.
#[derive(clap::Args)]
struct ListArgs {
    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the show subcommand.
#[derive(clap::Args)]
struct ShowArgs {
    /// Dataset id as printed by 'ingest' or 'list'.
    id: String,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the classes subcommand.
#[derive(clap::Args)]
struct ClassesArgs {
    /// Dataset id as printed by 'ingest' or 'list'.
    id: String,

    /// Image set to count labels in ('train', 'val', or 'test').
    #[arg(long, default_value = "train")]
    set: String,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the images subcommand.
#[derive(clap::Args)]
struct ImagesArgs {
    /// Dataset id as printed by 'ingest' or 'list'.
    id: String,

    /// Image set to list ('train', 'val', or 'test').
    #[arg(long, default_value = "train")]
    set: String,

    /// Only show images with at least one label of this class id.
    #[arg(long, default_value = "")]
    class: String,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(raw: &str) -> Result<Self, YolodexError> {
        match raw {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(YolodexError::UnsupportedOutput(format!(
                "'{}' (supported: text, json)",
                other
            ))),
        }
    }
}

/// Run the yolodex CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), YolodexError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Ingest(args)) => run_ingest(&cli.store, args),
        Some(Commands::List(args)) => run_list(&cli.store, args),
        Some(Commands::Show(args)) => run_show(&cli.store, args),
        Some(Commands::Classes(args)) => run_classes(&cli.store, args),
        Some(Commands::Images(args)) => run_images(&cli.store, args),
        None => {
            println!("yolodex {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("A catalog for YOLO-style image datasets.");
            println!();
            println!("Run 'yolodex --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the ingest subcommand.
fn run_ingest(store_path: &Path, args: IngestArgs) -> Result<(), YolodexError> {
    let output = OutputFormat::parse(&args.output)?;
    let mut store = JsonStore::open(store_path)?;

    let name = args.name.unwrap_or_else(|| {
        args.input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let request = UploadRequest {
        task: TaskKind::from(args.task.as_str()),
        name,
        description: args.description,
        upload_time: None,
    };

    let report = if args.input.is_dir() {
        let mut archive = DirArchive::open(&args.input)?;
        let size = archive.total_size();
        ingest::upload_from(&mut store, &mut archive, size, request)?
    } else {
        let bytes = fs::read(&args.input)?;
        ingest::upload(&mut store, bytes, request)?
    };

    match output {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            print!("{}", report);
            Ok(())
        }
    }
}

/// Execute the list subcommand.
fn run_list(store_path: &Path, args: ListArgs) -> Result<(), YolodexError> {
    let output = OutputFormat::parse(&args.output)?;
    let store = JsonStore::open(store_path)?;
    let summaries = display::datasets_view(&store)?;

    match output {
        OutputFormat::Json => print_json(&summaries),
        OutputFormat::Text => {
            if summaries.is_empty() {
                println!("No datasets.");
            }
            for summary in &summaries {
                print_summary_line(summary);
            }
            Ok(())
        }
    }
}

/// Execute the show subcommand.
fn run_show(store_path: &Path, args: ShowArgs) -> Result<(), YolodexError> {
    let output = OutputFormat::parse(&args.output)?;
    let store = JsonStore::open(store_path)?;
    let summary = display::dataset_view(&store, &DatasetId::new(args.id))?;

    match output {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Text => {
            println!("Dataset {}", summary.id);
            println!("  name:        {}", summary.name);
            println!("  task:        {}", summary.task);
            println!("  description: {}", summary.description);
            println!("  uploaded:    {}", summary.upload_time.format("%Y-%m-%d %H:%M:%S"));
            println!("  size:        {}", summary.dataset_size);
            println!("  classes:     {}", summary.classes_count);
            println!("  images:      {}", summary.images_count);
            if let Some(extra) = &summary.extra_data {
                for set in ImageSet::ALL {
                    let dir = match set {
                        ImageSet::Train => &extra.train,
                        ImageSet::Val => &extra.val,
                        ImageSet::Test => &extra.test,
                    };
                    if let Some(dir) = dir {
                        println!("  {:<12} {}", format!("{}:", set), dir);
                    }
                }
                if let Some(download) = &extra.download {
                    println!("  download:    {}", yaml_inline(download));
                }
                if let Some(kpt_shape) = &extra.kpt_shape {
                    println!("  kpt_shape:   {}", yaml_inline(kpt_shape));
                }
            }
            Ok(())
        }
    }
}

/// Execute the classes subcommand.
fn run_classes(store_path: &Path, args: ClassesArgs) -> Result<(), YolodexError> {
    let output = OutputFormat::parse(&args.output)?;
    let set = parse_image_set(&args.set)?;
    let store = JsonStore::open(store_path)?;
    let id = require_dataset(&store, args.id)?;
    let counts = display::classes_view(&store, &id, set)?;

    match output {
        OutputFormat::Json => print_json(&counts),
        OutputFormat::Text => {
            print_class_counts(&counts, set);
            Ok(())
        }
    }
}

/// Execute the images subcommand.
fn run_images(store_path: &Path, args: ImagesArgs) -> Result<(), YolodexError> {
    let output = OutputFormat::parse(&args.output)?;
    let set = parse_image_set(&args.set)?;
    let class_filter = match args.class.trim() {
        "" => None,
        raw => Some(ClassId::parse(raw)),
    };

    let store = JsonStore::open(store_path)?;
    let id = require_dataset(&store, args.id)?;
    let rows = display::images_view(&store, &id, set, class_filter.as_ref())?;

    match output {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Text => {
            print_images(&rows);
            Ok(())
        }
    }
}

fn parse_image_set(raw: &str) -> Result<ImageSet, YolodexError> {
    raw.parse::<ImageSet>().map_err(YolodexError::InvalidArgument)
}

fn require_dataset(store: &JsonStore, raw_id: String) -> Result<DatasetId, YolodexError> {
    let id = DatasetId::new(raw_id);
    match store.dataset(&id)? {
        Some(_) => Ok(id),
        None => Err(YolodexError::DatasetNotFound { id }),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), YolodexError> {
    let text = serde_json::to_string_pretty(value).map_err(YolodexError::JsonOutput)?;
    println!("{}", text);
    Ok(())
}

fn print_summary_line(summary: &DatasetSummary) {
    println!(
        "{}  {:<8}  {}  ({} classes, {} images, {}, uploaded {})",
        summary.id,
        summary.task.as_str(),
        summary.name,
        summary.classes_count,
        summary.images_count,
        summary.dataset_size,
        summary.upload_time.format("%Y-%m-%d %H:%M:%S")
    );
}

fn print_class_counts(counts: &[ClassCount], set: ImageSet) {
    if counts.is_empty() {
        println!("No classes.");
        return;
    }
    println!("Labels per class in '{}':", set);
    for class in counts {
        println!("  {:>4}  {:<24} {}", class.class_id, class.class_name, class.count);
    }
}

fn print_images(rows: &[ImageWithLabels]) {
    if rows.is_empty() {
        println!("No images.");
        return;
    }
    for row in rows {
        if row.label_names.is_empty() {
            println!("{}  (unlabeled)", row.image_name);
        } else {
            println!(
                "{}  [{}]  {} label(s)",
                row.image_name,
                row.label_names,
                row.label_data.len()
            );
        }
    }
}

fn yaml_inline(value: &serde_yaml::Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value))
}

use clap::{Args, Parser, Subcommand};
use picsite::cancel::CancelToken;
use picsite::config::{self, StorageOptions, StorageTarget};
use picsite::generate::Generator;
use picsite::imaging::RustBackend;
use picsite::output;
use picsite::site::SiteBundle;
use picsite::storage::{Backend, LocalBackend, RemoteBackend, S3Store, StoreError};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

/// Where the gallery lives. Give `--root`, or `--access` with `--bucket`.
#[derive(Args, Clone)]
struct StorageArgs {
    /// Local site directory (originals under pics/original/<album>/)
    #[arg(long)]
    root: Option<PathBuf>,

    /// S3 credentials as ACCESS_KEY_ID:SECRET_ACCESS_KEY
    #[arg(long)]
    access: Option<String>,

    /// Bucket holding the site (originals under pics/original/<album>/)
    #[arg(long)]
    bucket: Option<String>,

    /// S3-compatible endpoint [default: https://gateway.storjshare.io]
    #[arg(long)]
    endpoint: Option<String>,

    /// S3 region [default: global]
    #[arg(long)]
    region: Option<String>,
}

impl From<StorageArgs> for StorageOptions {
    fn from(args: StorageArgs) -> Self {
        StorageOptions {
            root: args.root,
            access: args.access,
            bucket: args.bucket,
            endpoint: args.endpoint,
            region: args.region,
        }
    }
}

#[derive(Parser)]
#[command(name = "picsite")]
#[command(about = "Static photo gallery generator for local folders and S3 buckets")]
#[command(long_about = "\
Static photo gallery generator for local folders and S3 buckets

Each directory (or key prefix) under pics/original/ is an album. The
generator writes resized copies and HTML pages next to the originals, on the
same storage:

  pics/original/<album>/<picture>          your photos (input)
  pics/resized/360x225/<album>/<picture>   thumbnails
  pics/resized/1200x750/<album>/<picture>  large versions (750px high)
  assets/homepage/, assets/album/          stylesheets and scripts
  <album>/index.html                       album pages
  index.html                               homepage

Hidden files (leading '.') and empty albums are skipped. Albums and pictures
are sorted by name; the first picture is the album cover.

Run 'picsite gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Gallery config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory replacing the built-in templates and assets
    #[arg(long, global = true)]
    site_template: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize all pictures and render the site
    Generate(StorageArgs),
    /// List the albums and pictures a run would process, without writing
    Check {
        #[command(flatten)]
        storage: StorageArgs,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(err.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Generate(storage) => {
            let config = config::load_config(cli.config.as_deref())?;
            let target = StorageOptions::from(storage).resolve()?;
            let custom_site;
            let site = match cli.site_template.as_deref() {
                Some(dir) => {
                    custom_site = SiteBundle::from_dir(dir)?;
                    &custom_site
                }
                None => SiteBundle::builtin(),
            };
            let backend = open_backend(target)?;

            let cancel = CancelToken::new();
            cancel_on_ctrl_c(cancel.clone());

            let (tx, rx) = mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_generate_event(&event);
                }
            });
            let images = RustBackend::new();
            let result = Generator::new(backend.as_ref(), &images, site, &config)
                .with_cancel(cancel)
                .with_events(tx)
                .generate();
            // the generator (and its sender) is gone, so the printer drains and exits
            let _ = printer.join();

            let summary = result?;
            println!("==> Generated {}", summary);
        }
        Command::Check { storage, json } => {
            let target = StorageOptions::from(storage).resolve()?;
            describe_target(&target);
            let backend = open_backend(target)?;
            let albums = backend.get_albums(&CancelToken::new())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&albums)?);
            } else {
                output::print_album_listing(&albums);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn open_backend(target: StorageTarget) -> Result<Box<dyn Backend>, StoreError> {
    let backend: Box<dyn Backend> = match target {
        StorageTarget::Local { root } => Box::new(LocalBackend::new(root)),
        StorageTarget::Remote(settings) => {
            Box::new(RemoteBackend::new(S3Store::connect(&settings)?))
        }
    };
    Ok(backend)
}

fn describe_target(target: &StorageTarget) {
    match target {
        StorageTarget::Local { root } => eprintln!("==> Checking {}", root.display()),
        StorageTarget::Remote(settings) => eprintln!(
            "==> Checking s3://{} at {}",
            settings.bucket, settings.endpoint
        ),
    }
}

/// Fire `cancel` on the first Ctrl-C. The run then stops at its next I/O step.
fn cancel_on_ctrl_c(cancel: CancelToken) {
    std::thread::spawn(move || {
        let Ok(runtime) = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        else {
            return;
        };
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Interrupted, stopping after the current step...");
                cancel.cancel();
            }
        });
    });
}

/// Print an error and its whole source chain to stderr.
fn report(err: &dyn Error) {
    eprintln!("error: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

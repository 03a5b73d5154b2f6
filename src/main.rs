#[macro_use]
extern crate log;

use std::env::current_dir;
use std::error::Error;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;

use clap::{crate_description, crate_version, Arg, Command};
use colored::*;
use tokio::sync::{mpsc, watch, Mutex};

use mathpro::document::configuration::{Config, CONFIG_FILE};
use mathpro::document::session::{debounce, Commit, Session};
use mathpro::document::store::Store;
use mathpro::document::{Document, DEFAULT_DOCUMENT};
use mathpro::fonts::loader::{load_font, FontStatus};
use mathpro::layout::Layout;
use mathpro::math::MathResolver;
use mathpro::Error as MError;

/// How often the input file is checked for changes.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

macro_rules! unwrap {
    ($e: expr, $error: expr) => {
        match $e {
            Some(e) => e,
            None => return Err(Box::new($error)),
        }
    };
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("cannot start the runtime: {}", e);
            exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run()) {
        error!("{}", e);
        exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("mathpro")
        .version(crate_version!())
        .about(crate_description!())
        .subcommand(
            Command::new("init")
                .about("Creates a new default notebook")
                .arg(Arg::new("TITLE").required(false)),
        )
        .subcommand(Command::new("build").about("Builds the notebook into a pdf"))
        .subcommand(
            Command::new("watch").about("Builds the notebook again each time its text changes"),
        )
        .subcommand_required(true)
        .get_matches();

    match matches.subcommand() {
        Some(("init", init)) => {
            let mut current_dir = unwrap!(current_dir().ok(), MError::CannotReadCurrentDir);
            let current_dir_name = current_dir.clone();
            let current_dir_name =
                unwrap!(current_dir_name.file_name(), MError::CannotReadCurrentDir);
            let current_dir_name = unwrap!(current_dir_name.to_str(), MError::CannotReadCurrentDir);

            let title = match init.get_one::<String>("TITLE") {
                // If a title was given, we will create a directory for the notebook
                Some(title) => {
                    current_dir.push(title);
                    title.as_str()
                }

                // If no title was given, use current_dir_name
                None => current_dir_name,
            };

            create_dir_all(&current_dir)?;

            let config = Config::with_title(title);
            config.save(current_dir.join(CONFIG_FILE))?;

            let mut file = File::create(current_dir.join(&config.input))?;
            file.write_all(DEFAULT_DOCUMENT.as_bytes())?;

            println!(
                "{} notebook \"{}\" in {}",
                "Created".bold().green(),
                title,
                current_dir.display()
            );
        }

        Some(("build", _)) => {
            let (root, config) = find_config()?;
            let mut session = open_session(&root, &config).await?;
            let text = session.initial_text(root.join(&config.input));

            let commit = session.commit(text).await;
            report(&commit);
            write_pdf(&commit.layout, &root, &config)?;
        }

        Some(("watch", _)) => {
            let (root, config) = find_config()?;
            let session = open_session(&root, &config).await?;
            let input = root.join(&config.input);
            let text = session.initial_text(&input);

            tokio::spawn(write_layouts(session.subscribe(), root, config.clone()));

            let (tx, rx) = mpsc::channel(16);
            tx.send(text.clone()).await?;
            tokio::spawn(poll_edits(input.clone(), text, tx));
            println!("{} {}", "Watching".bold().blue(), input.display());

            let session = Mutex::new(session);
            debounce(rx, config.debounce(), |text| {
                let session = &session;
                async move {
                    let commit = session.lock().await.commit(text).await;
                    report(&commit);
                }
            })
            .await;
        }

        _ => (),
    }

    Ok(())
}

/// Looks for the configuration file from the current directory and reads it.
fn find_config() -> Result<(PathBuf, Config), Box<dyn Error>> {
    let current_dir = unwrap!(current_dir().ok(), MError::CannotReadCurrentDir);
    let config_path = Config::find(current_dir)?;
    let config = Config::load(&config_path)?;
    let root = unwrap!(config_path.parent(), MError::NoConfigFile).to_path_buf();
    Ok((root, config))
}

/// Loads the font and prepares the math renderer.
async fn open_session(
    root: &Path,
    config: &Config,
) -> Result<Session<impl MathResolver>, Box<dyn Error>> {
    let resolver = config.math_resolver();
    match &resolver {
        Some(resolver) if resolver.is_ready() => (),
        Some(resolver) => warn!("{} was not found, math will be left empty", resolver.program()),
        None => info!("no math renderer configured"),
    }

    println!("{}", FontStatus::Loading.to_string().dimmed());
    let (font, status) = load_font(&config.font_source(root), resolver.is_ready()).await;
    match &status {
        FontStatus::Ready { .. } => println!("{}", status.to_string().bold().green()),
        _ => println!("{}", status.to_string().bold().red()),
    }

    let font = font.map(Arc::new);
    let resolver = resolver.map(|r| r.with_font(font.clone()));

    let store = Store::open(root)?;
    Ok(Session::new(store, resolver, config.grid())
        .with_font(font)
        .with_color(config.color)
        .with_path(&config.input))
}

/// Prints the warnings of a commit.
fn report(commit: &Commit) {
    if !commit.warnings.is_empty() {
        eprint!("{}", commit.warnings);
    }
}

/// Writes a layout into the output pdf.
fn write_pdf(layout: &Layout, root: &Path, config: &Config) -> Result<(), Box<dyn Error>> {
    let mut document = Document::new(&config.title, config.page_width, config.page_height)?;
    document.render(layout);
    document.save(root.join(&config.output))?;

    println!(
        "{} {} ({} pages)",
        "Written".bold().green(),
        config.output,
        layout.pages.len()
    );
    Ok(())
}

/// Writes the pdf again each time the session publishes a layout.
async fn write_layouts(
    mut layouts: watch::Receiver<Option<Arc<Layout>>>,
    root: PathBuf,
    config: Config,
) {
    while layouts.changed().await.is_ok() {
        let layout = layouts.borrow_and_update().clone();
        if let Some(layout) = layout {
            if let Err(e) = write_pdf(&layout, &root, &config) {
                error!("{}", e);
            }
        }
    }
}

/// Sends the content of a file each time it changes.
async fn poll_edits(path: PathBuf, mut last: String, edits: mpsc::Sender<String>) {
    let mut interval = tokio::time::interval(POLL_INTERVAL);

    loop {
        interval.tick().await;

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) => {
                trace!("cannot read {}: {}", path.display(), e);
                continue;
            }
        };

        if text != last {
            last = text.clone();
            if edits.send(text).await.is_err() {
                return;
            }
        }
    }
}

use clap::Parser;
use lectern::{
    App, Config, HttpTranslator, LibraryStore, PageSize, ReadingSession, store::BookmarkRepository,
    ui,
};
use std::fs::{self, OpenOptions};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "A terminal reader for plain-text books")]
struct Cli {
    /// Book to open; added to the library if it is not there yet
    book: Option<PathBuf>,

    /// Title to record when adding the book (defaults to the file name)
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    author: Option<String>,

    /// Lines per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Library database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory holding config.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Do not translate selections
    #[arg(long)]
    no_translate: bool,
}

fn init_logging(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| format!("Failed to initialise logging: {}", e))?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let dirs = Config::project_dirs()?;
    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(|| dirs.config_dir().to_path_buf());
    let mut config = Config::load(&config_dir)?;
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }
    let page_size: PageSize = config.page_size()?;

    let data_dir = dirs.data_dir();
    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config.resolve_log_file(data_dir));
    init_logging(&log_file)?;
    ui::install_panic_hook();

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| config.resolve_database_path(data_dir));
    let library = Rc::new(
        LibraryStore::open(&db_path).map_err(|e| format!("Failed to open library: {}", e))?,
    );
    info!("Library at {:?}, page size {}", db_path, page_size.get());

    let bookmarks: Rc<dyn BookmarkRepository> = library.clone();
    let mut session = ReadingSession::new(page_size, bookmarks);

    let translations = if config.translation.enabled && !cli.no_translate {
        let translation = &config.translation;
        match HttpTranslator::new(
            translation.endpoint.clone(),
            translation.api_key.clone(),
            translation.timeout(),
        ) {
            Ok(translator) => Some(session.enable_translation(
                Arc::new(translator),
                &translation.source_lang,
                &translation.target_lang,
            )),
            Err(err) => {
                warn!("Translation disabled: {}", err);
                None
            }
        }
    } else {
        None
    };

    let mut app = App::new(library, session, translations);

    if let Some(path) = &cli.book {
        if let Err(err) = app.open_file(path, cli.title.clone(), cli.author.clone()) {
            app.show_error(format!("Could not open {}: {}", path.display(), err));
        }
    }

    match panic::catch_unwind(AssertUnwindSafe(|| app.run())) {
        Ok(result) => result.map_err(|e| -> Box<dyn std::error::Error> { Box::new(e) })?,
        Err(_) => {
            let _ = ui::restore_terminal();
            eprintln!("lectern crashed, see {} for details", log_file.display());
            process::exit(101);
        }
    }

    Ok(())
}

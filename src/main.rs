use cipher_lab::{
    app::{App, Control},
    app_dirs::AppDirs,
    cipher,
    config::{ConfigStore, FileConfigStore},
    engine::ScorePolicy,
    history::HistoryLog,
    util::format_clock,
    level::Catalog,
    results::ResultsReport,
    runtime::{CrosstermEventSource, LabEvent, Runner},
    store::{KeyValueStore, MemoryStore, SqliteStore},
    TICK_RATE_MS,
};
use clap::{error::ErrorKind, ArgGroup, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

/// terminal forensics lab: crack caesar-shifted evidence files against the clock
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Decrypt a suspect's evidence files one at a time. Each file has a countdown, a cap on wrong answers, and hints that cost points and time. Results are kept for the dashboard and can be exported as an incident report."
)]
#[clap(group(ArgGroup::new("transform").args(["decrypt", "encrypt"])))]
pub struct Cli {
    /// load levels from a JSON catalog instead of the built-in investigation
    #[clap(short = 'l', long)]
    levels: Option<PathBuf>,

    /// progress database to use
    #[clap(long)]
    db: Option<PathBuf>,

    /// keep results in memory only
    #[clap(long)]
    ephemeral: bool,

    /// let hint penalties push the score below zero
    #[clap(long)]
    allow_negative_score: bool,

    /// seconds before a concluded or skipped file moves on (0 waits for enter)
    #[clap(long)]
    auto_advance: Option<u32>,

    /// decrypt TEXT and exit; prints every shift unless --shift is given
    #[clap(short = 'd', long, value_name = "TEXT")]
    decrypt: Option<String>,

    /// encrypt TEXT with --shift and exit, for writing level catalogs
    #[clap(short = 'e', long, value_name = "TEXT", requires = "shift")]
    encrypt: Option<String>,

    /// shift to use with --decrypt or --encrypt
    #[clap(short = 's', long, allow_hyphen_values = true, requires = "transform")]
    shift: Option<i32>,

    /// print the last saved incident report and exit
    #[clap(long)]
    report: bool,

    /// write the last saved incident report to PATH and exit
    #[clap(long, value_name = "PATH")]
    export_report: Option<PathBuf>,

    /// list the levels of the catalog and exit
    #[clap(long)]
    list_levels: bool,

    /// print the log of finished sessions and exit
    #[clap(long)]
    history: bool,

    /// write the effective settings to the config file and exit
    #[clap(long)]
    write_config: bool,
}

impl Cli {
    fn open_store(&self) -> Box<dyn KeyValueStore> {
        if self.ephemeral {
            return Box::new(MemoryStore::new());
        }
        let opened = match &self.db {
            Some(path) => SqliteStore::open(path),
            None => SqliteStore::new(),
        };
        match opened {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("[STORE] falling back to memory: {e}");
                Box::new(MemoryStore::new())
            }
        }
    }

    fn load_catalog(&self) -> Result<Catalog, Box<dyn Error>> {
        let catalog = match &self.levels {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::builtin()?,
        };
        Ok(catalog)
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().filter_or("CIPHER_LAB_LOG", "warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if let Some(text) = &cli.decrypt {
        match cli.shift {
            Some(shift) => println!("{}", cipher::decrypt(text, shift)),
            None => {
                for (shift, candidate) in cipher::candidates(text) {
                    println!("{shift:>2}  {candidate}");
                }
            }
        }
        return Ok(());
    }

    if let (Some(text), Some(shift)) = (&cli.encrypt, cli.shift) {
        println!("{}", cipher::encrypt(text, shift));
        return Ok(());
    }

    if cli.history {
        let rows = match HistoryLog::new() {
            Some(log) => log.read_all()?,
            None => Vec::new(),
        };
        if rows.is_empty() {
            println!("No sessions recorded");
        }
        for row in rows {
            println!(
                "{}  {:<12} {:>2}/{:<2} {:>5}pts {:>6}  {} hints",
                row.date,
                row.catalog,
                row.decrypted,
                row.levels,
                row.score,
                format_clock(row.total_secs),
                row.hints
            );
        }
        return Ok(());
    }

    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if cli.allow_negative_score {
        config.score_policy = ScorePolicy::AllowNegative;
    }
    if let Some(secs) = cli.auto_advance {
        config.auto_advance_secs = secs;
        config.skip_advance_secs = secs;
    }

    if cli.write_config {
        config_store.save(&config)?;
        println!("Settings written to {}", config_store.path().display());
        return Ok(());
    }

    if cli.report || cli.export_report.is_some() {
        let store = cli.open_store();
        let Some(report) = ResultsReport::load(store.as_ref(), &config) else {
            println!("No results found");
            return Ok(());
        };
        match &cli.export_report {
            Some(path) => {
                report.export(path)?;
                println!("Report written to {}", path.display());
            }
            None => println!("{}", report.incident_report()),
        }
        return Ok(());
    }

    let catalog = cli.load_catalog()?;

    if cli.list_levels {
        for level in &catalog.levels {
            let shift = catalog
                .solvable_shift(level)
                .map_or_else(|| "?".to_string(), |k| k.to_string());
            println!(
                "{:>2}  {:<32} {:>4}s {:>3}pts  shift {:>2}  {}",
                level.id,
                level.title,
                level.time_limit_secs,
                level.base_points,
                shift,
                level.ciphertext
            );
        }
        println!("max score {}", catalog.max_score());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = cli.open_store();
    let history = if cli.ephemeral {
        None
    } else {
        HistoryLog::new()
    };
    let mut app = App::new(catalog, config, store, history);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let step = runner.step();
        app.on_tick(step.elapsed);

        match step.event {
            LabEvent::Tick | LabEvent::Resize => {}
            LabEvent::Key(key) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

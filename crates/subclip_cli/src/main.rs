//! subclip - command line front end
//!
//! Inspects and converts SRT files, looks up cues, edits display
//! preferences, plays subtitles against a simulated clock and browses the
//! demo catalog.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use subclip_core::catalog::{
    artist_index, format_views, AppContext, CatalogBackend, DashboardMetrics, LibraryQuery,
    SortOrder,
};
use subclip_core::config::ConfigManager;
use subclip_core::logging::{init_tracing, init_tracing_with_file, LogLevel, WorkerGuard};
use subclip_core::player::preferences::load_preferences;
use subclip_core::player::{
    format_offset, spawn_poller, DisplayMode, JsonPreferenceStore, PlaybackController,
    PlaybackSession, PlayerCommand, PreferencePatch, SessionOptions, SimulatedPlayer,
    SubtitleSynchronizer,
};
use subclip_core::subtitles::{
    export_file, format_clock, import_file, parse_clock, parse_srt_time, CueResolver, SrtParse,
};

#[derive(Parser, Debug)]
#[command(name = "subclip", version, about = "Subtitle sync and clip catalog tools")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize an SRT file
    Inspect {
        file: PathBuf,
        /// Print the parsed track as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite an SRT file with clean numbering
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Shift every cue by this many milliseconds
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        shift_ms: i64,
        /// Order cues by start time
        #[arg(long)]
        sort: bool,
    },
    /// Show the cue active at a playback time
    CueAt {
        file: PathBuf,
        /// Seconds, MM:SS.mmm or HH:MM:SS,mmm
        time: String,
        /// Sync offset in seconds
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset: f64,
    },
    /// Show or change subtitle display preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Play subtitles against a simulated clock, printing each change
    Play {
        file: PathBuf,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset: f64,
        /// Start in fullscreen display mode
        #[arg(long)]
        fullscreen: bool,
        /// Start position in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,
    },
    /// Browse published clips
    Library {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        /// recent, popular or title
        #[arg(long, default_value = "recent")]
        sort: SortOrder,
        /// List artists instead of clips
        #[arg(long)]
        artists: bool,
    },
    /// Catalog summary figures
    Dashboard {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PrefsAction {
    /// Print preferences for both display modes
    Show,
    /// Update preferences for one mode
    Set {
        /// normal or fullscreen
        #[arg(long, default_value = "normal")]
        mode: DisplayMode,
        #[arg(long)]
        font_size: Option<u32>,
        #[arg(long)]
        bottom_offset: Option<f64>,
        /// #RGB or #RRGGBB, shared by both modes
        #[arg(long)]
        color: Option<String>,
    },
}

fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "subclip")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".config").join("subclip.toml"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = ConfigManager::new(&config_path);
    if let Err(e) = config.load_or_create() {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
    }

    let _log_guard = init_logging(&config, cli.verbose);
    tracing::debug!("subclip {} using {}", subclip_core::version(), config_path.display());

    match cli.command {
        Command::Inspect { file, json } => inspect(&config, &file, json),
        Command::Convert {
            input,
            output,
            shift_ms,
            sort,
        } => convert(&config, &input, &output, shift_ms, sort),
        Command::CueAt { file, time, offset } => cue_at(&config, &file, &time, offset),
        Command::Prefs { action } => prefs(&config, action),
        Command::Play {
            file,
            offset,
            fullscreen,
            from,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start runtime")?;
            runtime.block_on(play(&config, &file, offset, fullscreen, from))
        }
        Command::Library {
            search,
            artist,
            sort,
            artists,
        } => library(&config, search, artist, sort, artists),
        Command::Dashboard { json } => dashboard(&config, json),
    }
}

fn init_logging(config: &ConfigManager, verbose: bool) -> Option<WorkerGuard> {
    let settings = &config.settings().logging;
    let level = if verbose { LogLevel::Debug } else { settings.level };

    if settings.file_logging {
        match init_tracing_with_file(level, config.logs_folder()) {
            Ok(guard) => return Some(guard),
            Err(e) => eprintln!("Warning: File logging unavailable: {}", e),
        }
    }
    init_tracing(level);
    None
}

fn load(config: &ConfigManager, file: &Path) -> Result<SrtParse> {
    let parsed = import_file(file, config.settings().import.max_file_bytes)
        .with_context(|| format!("Failed to import {}", file.display()))?;
    for issue in &parsed.skipped {
        tracing::warn!("{}: skipped block: {}", file.display(), issue);
    }
    Ok(parsed)
}

fn inspect(config: &ConfigManager, file: &Path, json: bool) -> Result<()> {
    let parsed = load(config, file)?;
    let track = &parsed.track;

    if json {
        println!("{}", serde_json::to_string_pretty(track)?);
        return Ok(());
    }

    println!("File:      {}", file.display());
    println!("Cues:      {}", track.len());
    println!("Duration:  {}", format_clock(track.duration_ms()));
    println!("Malformed: {}", track.malformed_count());
    println!("Skipped:   {}", parsed.skipped.len());
    println!("Sorted:    {}", if track.is_sorted_by_start() { "yes" } else { "no" });
    Ok(())
}

fn convert(config: &ConfigManager, input: &Path, output: &Path, shift_ms: i64, sort: bool) -> Result<()> {
    let mut track = load(config, input)?.track;
    if track.is_empty() {
        bail!("{} contains no readable cues", input.display());
    }
    if shift_ms != 0 {
        track.shift_all(shift_ms);
    }
    if sort {
        track.sort_by_time();
    }
    export_file(&track, output).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} cues to {}", track.len(), output.display());
    Ok(())
}

/// Accept plain seconds, the in-app clock form or an SRT timestamp.
fn parse_time(input: &str) -> Result<f64> {
    let input = input.trim();
    if let Ok(secs) = input.parse::<f64>() {
        if secs.is_finite() {
            return Ok(secs);
        }
    }
    if let Ok(ms) = parse_clock(input) {
        return Ok(ms as f64 / 1000.0);
    }
    if let Some(ms) = parse_srt_time(input) {
        return Ok(ms as f64 / 1000.0);
    }
    bail!("Unrecognized time '{}'", input)
}

fn cue_at(config: &ConfigManager, file: &Path, time: &str, offset: f64) -> Result<()> {
    let raw = parse_time(time)?;
    let mut resolver = CueResolver::with_track(load(config, file)?.track);
    resolver.set_offset(offset);

    match resolver.evaluate(raw) {
        Some(cue) => println!(
            "[{} --> {}] {}",
            format_clock(cue.start_ms),
            format_clock(cue.end_ms),
            cue.text
        ),
        None => println!("(no subtitle at {:.3}s, offset {})", raw, format_offset(offset)),
    }
    Ok(())
}

fn prefs(config: &ConfigManager, action: PrefsAction) -> Result<()> {
    let store = JsonPreferenceStore::open(config.preferences_path());

    match action {
        PrefsAction::Show => {
            for mode in [DisplayMode::Normal, DisplayMode::Fullscreen] {
                let p = load_preferences(&store, mode);
                println!(
                    "{:<10} font {}px, bottom {}%, color {}",
                    mode.as_str(), p.font_size_px, p.bottom_offset_percent, p.color_hex
                );
            }
        }
        PrefsAction::Set {
            mode,
            font_size,
            bottom_offset,
            color,
        } => {
            let patch = PreferencePatch {
                font_size_px: font_size,
                bottom_offset_percent: bottom_offset,
                color_hex: color,
            };
            if patch.is_empty() {
                bail!("Nothing to change: pass --font-size, --bottom-offset or --color");
            }
            let mut sync = SubtitleSynchronizer::new(Box::new(store));
            let p = sync.set_preferences(mode, patch);
            println!(
                "{}: font {}px, bottom {}%, color {}",
                mode, p.font_size_px, p.bottom_offset_percent, p.color_hex
            );
        }
    }
    Ok(())
}

async fn play(config: &ConfigManager, file: &Path, offset: f64, fullscreen: bool, from: f64) -> Result<()> {
    let track = load(config, file)?.track;
    if track.is_empty() {
        bail!("{} contains no readable cues", file.display());
    }
    let settings = config.settings();
    let duration = track.duration_ms() as f64 / 1000.0 + 1.0;

    let mut sync = SubtitleSynchronizer::new(Box::new(JsonPreferenceStore::open(
        config.preferences_path(),
    )));
    sync.set_track(track);

    let mut player = SimulatedPlayer::new(duration);
    if fullscreen {
        player.request_fullscreen()?;
    }

    let mut session = PlaybackSession::new(player, sync, SessionOptions::from(&settings.player));
    session.apply(PlayerCommand::SetOffset(offset))?;
    if from > 0.0 {
        session.apply(PlayerCommand::Seek(from))?;
    }

    let handle = spawn_poller(session, Duration::from_millis(settings.player.poll_interval_ms));
    let mut frames = handle.frames();
    handle.send(PlayerCommand::Play).await?;
    println!("Playing {} ({:.1}s), offset {}", file.display(), duration, format_offset(offset));

    let mut shown: Option<String> = None;
    loop {
        if frames.changed().await.is_err() {
            break;
        }
        let frame = frames.borrow_and_update().clone();
        if frame.cue_id != shown {
            let at = frame.clock.map_or(0.0, |c| c.current_time);
            match frame.cue_text.as_deref() {
                Some(text) => println!("{:>9.3}s  {}", at, text.replace('\n', " / ")),
                None => println!("{:>9.3}s  -", at),
            }
            shown = frame.cue_id.clone();
        }
        if frame.clock.is_some_and(|c| c.has_ended) {
            break;
        }
    }

    handle.shutdown().await;
    println!("Done");
    Ok(())
}

fn library(
    config: &ConfigManager,
    search: Option<String>,
    artist: Option<String>,
    sort: SortOrder,
    artists: bool,
) -> Result<()> {
    let ctx = AppContext::from_settings(&config.settings().backend);
    let clips = ctx.backend().list_clips()?;

    if artists {
        for entry in artist_index(&clips) {
            println!("{:<30} {}", entry.name, entry.clip_count);
        }
        return Ok(());
    }

    let query = LibraryQuery {
        search,
        artist,
        sort,
    };
    let results = query.apply(&clips);
    if results.is_empty() {
        println!("No clips found");
    }
    for clip in results {
        println!("{:<30} {:<20} {:>8} views", clip.title, clip.artist, format_views(clip.views));
    }
    Ok(())
}

fn dashboard(config: &ConfigManager, json: bool) -> Result<()> {
    let ctx = AppContext::from_settings(&config.settings().backend);
    let backend = ctx.backend();
    let metrics = DashboardMetrics::compute(
        &backend.list_clips()?,
        &backend.list_comments(None)?,
        &backend.list_submissions()?,
        &backend.list_requests()?,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!(
        "Clips:       {} ({} published, {} drafts)",
        metrics.total_clips, metrics.published_clips, metrics.draft_clips
    );
    println!("Views:       {}", format_views(metrics.total_views));
    println!(
        "Comments:    {} ({} awaiting review)",
        metrics.total_comments, metrics.pending_comments
    );
    if let Some(rating) = metrics.average_rating {
        println!("Rating:      {:.1} / 5", rating);
    }
    println!("Submissions: {} pending", metrics.pending_submissions);
    println!("Requests:    {} open", metrics.open_requests);
    println!("Most viewed:");
    for clip in &metrics.top_clips {
        println!("  {:<30} {:>8}", clip.title, format_views(clip.views));
    }
    Ok(())
}

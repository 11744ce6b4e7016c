use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;
use dialoguer::{Input, theme::ColorfulTheme};
use log::{debug, info};
use vidcat_config::{
    get_config_value, load_config, open_in_editor, resolve_db_path, resolve_simple_output,
    set_config_value,
};
use vidcat_core::{NewVideo, RecordError, VidcatError, VidcatResult};
use vidcat_store::{VideoRecord, VideoStore};
use vidcat_youtube::{embed_url, validate_and_extract};

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a video to the catalog
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List all videos, ordered by name
    List {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Search videos by name
    Search {
        term: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check URLs without storing anything
    Check {
        #[arg(long)]
        input: Option<String>,
        #[arg(value_name = "URL")]
        urls: Vec<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Open config file in editor
    Edit,
}

#[derive(Args, Debug, Default)]
struct OutputArgs {
    /// One line per video: id and name
    #[arg(long)]
    simple: bool,
    /// Print videos as a JSON array
    #[arg(long, conflicts_with = "simple")]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    Simple,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "vidcat")]
#[command(version, about = "Catalog of YouTube videos", long_about = None)]
struct Cli {
    /// Path to the video database
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli).await {
        report_error(&err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

async fn run(cli: Cli) -> VidcatResult<()> {
    match cli.command {
        Commands::Config { action } => handle_config_command(action),
        Commands::Check { input, urls } => run_check(input.as_deref(), urls),
        Commands::Add { name, url, notes } => {
            let video = gather_new_video(name, url, notes)?;
            let store = open_store(cli.db).await?;
            let record = store.add_video(&video).await?;
            println!(
                "{} Added {} ({})",
                style("✓").green(),
                style(record.name()).bold(),
                record.video_id()
            );
            Ok(())
        }
        Commands::List { output } => {
            let mode = resolve_output_mode(&output)?;
            let store = open_store(cli.db).await?;
            let videos = store.list_all().await?;
            print_videos(&videos, mode)
        }
        Commands::Search { term, output } => {
            let mode = resolve_output_mode(&output)?;
            let store = open_store(cli.db).await?;
            let videos = store.search(&term).await?;
            print_videos(&videos, mode)
        }
    }
}

async fn open_store(explicit: Option<PathBuf>) -> VidcatResult<VideoStore> {
    let config = load_config()?;
    let path = resolve_db_path(&config, explicit.as_deref())?;
    info!("using database {path:?}");
    VideoStore::open(path).await
}

fn report_error(err: &VidcatError) {
    match err.as_record() {
        Some(record) => {
            debug!("rejected: {record}");
            eprintln!("{} {}", style("Error:").red(), record.user_message());
            if matches!(record, RecordError::InvalidUrl(_)) {
                eprintln!("Please check the data entered.");
            }
        }
        None => eprintln!("{} {err}", style("Error:").red()),
    }
}

fn gather_new_video(
    name: Option<String>,
    url: Option<String>,
    notes: Option<String>,
) -> VidcatResult<NewVideo> {
    let interactive = (name.is_none() || url.is_none()) && io::stdin().is_terminal();
    if !interactive {
        return Ok(NewVideo::new(
            name.unwrap_or_default(),
            url.unwrap_or_default(),
            notes.unwrap_or_default(),
        ));
    }

    let name = match name {
        Some(name) => name,
        None => prompt("Name", false)?,
    };
    let url = match url {
        Some(url) => url,
        None => prompt("YouTube URL", false)?,
    };
    let notes = match notes {
        Some(notes) => notes,
        None => prompt("Notes (optional, press Enter to skip)", true)?,
    };
    Ok(NewVideo::new(name, url, notes))
}

fn prompt(label: &str, allow_empty: bool) -> VidcatResult<String> {
    Input::with_theme(&ColorfulTheme::default())
        .with_prompt(label)
        .allow_empty(allow_empty)
        .interact_text()
        .map_err(|err| VidcatError::InvalidInput(format!("prompt failed: {err}")))
}

fn resolve_output_mode(output: &OutputArgs) -> VidcatResult<OutputMode> {
    if output.json {
        return Ok(OutputMode::Json);
    }
    let config = load_config()?;
    let simple = output.simple || resolve_simple_output(&config).unwrap_or(false);
    Ok(if simple {
        OutputMode::Simple
    } else {
        OutputMode::Full
    })
}

fn video_count_label(count: usize) -> String {
    match count {
        0 => "No videos".to_string(),
        1 => "1 video".to_string(),
        n => format!("{n} videos"),
    }
}

fn print_videos(videos: &[VideoRecord], mode: OutputMode) -> VidcatResult<()> {
    match mode {
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(videos)
                .map_err(|err| VidcatError::InvalidInput(format!("failed to encode json: {err}")))?;
            println!("{json}");
        }
        OutputMode::Simple => {
            for video in videos {
                println!("{}", simple_line(video));
            }
        }
        OutputMode::Full => {
            println!("{}", style(video_count_label(videos.len())).bold());
            for video in videos {
                println!();
                print_video(video);
            }
        }
    }
    Ok(())
}

fn simple_line(video: &VideoRecord) -> String {
    format!("{}\t{}", video.video_id(), video.name())
}

fn print_video(video: &VideoRecord) {
    println!("{}", style(video.name()).cyan().bold());
    println!("  {} {}", style("URL:").dim(), video.url());
    if !video.notes().is_empty() {
        println!("  {} {}", style("Notes:").dim(), video.notes());
    }
    println!("  {} {}", style("Embed:").dim(), embed_url(video.video_id()));
}

fn handle_config_command(action: ConfigAction) -> VidcatResult<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = load_config()?;
            match get_config_value(&config, &key) {
                Some(v) => println!("{} = {}", key, v),
                None => println!("{} = <null>", key),
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            set_config_value(&key, &value)?;
            println!("{} Set {} = {}", style("✓").green(), key, value);
            Ok(())
        }
        ConfigAction::List => {
            let config = load_config()?;
            println!("Current configuration:");
            println!("\n[storage]");
            println!(
                "db_path = {}",
                config.storage.db_path.as_deref().unwrap_or("<null>")
            );
            println!("\n[output]");
            println!("simple = {}", config.output.simple.unwrap_or(false));
            Ok(())
        }
        ConfigAction::Edit => open_in_editor(),
    }
}

fn run_check(input: Option<&str>, urls: Vec<String>) -> VidcatResult<()> {
    let urls = gather_urls(input, urls)?;
    if urls.is_empty() {
        return Err(VidcatError::InvalidInput("no input URLs provided".to_string()));
    }

    let mut valid = 0usize;
    let mut invalid = 0usize;
    for url in &urls {
        match validate_and_extract(url) {
            Ok(video_id) => {
                valid += 1;
                println!("{url} -> {video_id}");
            }
            Err(reason) => {
                invalid += 1;
                eprintln!("{} {url}: {reason}", style("Invalid").red());
            }
        }
    }

    print_summary(urls.len(), valid, invalid);
    Ok(())
}

fn gather_urls(input: Option<&str>, mut urls: Vec<String>) -> VidcatResult<Vec<String>> {
    if let Some(path) = input {
        let content = fs::read_to_string(path)
            .map_err(|err| VidcatError::InvalidInput(format!("failed to read input file: {err}")))?;
        urls.extend(parse_lines(&content));
    }

    if urls.is_empty() && !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|err| VidcatError::InvalidInput(format!("failed to read stdin: {err}")))?;
        urls.extend(parse_lines(&buffer));
    }

    Ok(urls)
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_string())
        .collect()
}

fn print_summary(total: usize, valid: usize, invalid: usize) {
    println!(
        "{} Total: {} | Valid: {} | Invalid: {}",
        style("Summary:").bold(),
        total,
        valid,
        invalid
    );
}

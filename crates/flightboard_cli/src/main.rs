mod config;

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use flightboard_render::{
    open_display, DisplaySink, FlightMessage, FrameComposer, SimulatorSink, TextLayout,
};
use image::{ImageOutputFormat, RgbImage};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use walkdir::WalkDir;

use config::{BackendChoice, BoardConfig, MessageFile};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compose and play flight arrival boards on small LED panels")]
struct Cli {
    /// Board configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the display backend from the configuration
    #[arg(long, value_enum, global = true)]
    backend: Option<BackendChoice>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print one composed frame to stdout
    Preview(PreviewArgs),
    /// Compose a message and write it through the simulator
    Render(RenderArgs),
    /// Export every frame of a message as numbered PNG files
    Frames(FramesArgs),
    /// Publish messages to the configured display
    Play(PlayArgs),
}

#[derive(Parser, Debug, Clone)]
struct MessageArgs {
    /// Origin airport code shown top left
    #[arg(long, default_value = "")]
    origin: String,
    /// Flight number shown top right
    #[arg(long, default_value = "")]
    flight: String,
    /// Origin city
    #[arg(long, default_value = "")]
    city: String,
    /// Aircraft type
    #[arg(long, default_value = "")]
    aircraft: String,
    /// Arrival delay in seconds; negative when early
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    delay: i64,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    message: MessageArgs,
    /// Index of the frame to print
    #[arg(long, default_value_t = 0)]
    frame: usize,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    message: MessageArgs,
    /// Output directory, overriding the configured one
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    message: MessageArgs,
    /// Output directory for frame files
    #[arg(short, long)]
    out_dir: PathBuf,
    /// Draw round LED dots instead of raw panel pixels
    #[arg(long, default_value_t = false)]
    dots: bool,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Directory of message files, played in path order
    #[arg(long)]
    messages: Option<PathBuf>,
    #[command(flatten)]
    message: MessageArgs,
    /// Seconds between published messages
    #[arg(long, default_value_t = 5.0)]
    interval: f32,
    /// Number of passes over the message list
    #[arg(long, default_value_t = 1)]
    cycles: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = BoardConfig::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.display.backend = backend;
    }

    match cli.command {
        Commands::Preview(args) => preview(&config, args),
        Commands::Render(args) => render(&config, args),
        Commands::Frames(args) => frames(&config, args),
        Commands::Play(args) => play(&config, args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn composer(config: &BoardConfig) -> FrameComposer<'static> {
    FrameComposer::new(TextLayout::default(), config.geometry(), config.gradient())
}

fn preview(config: &BoardConfig, args: PreviewArgs) -> Result<()> {
    let message = args.message.to_message();
    let sequence = composer(config).compose(&message);
    let Some(frame) = sequence.frame(args.frame) else {
        bail!("frame {} out of range, message has {} frames", args.frame, sequence.len());
    };

    for row in frame.rows() {
        println!("{}", row);
    }
    info!("frame {}/{}", args.frame + 1, sequence.len());
    Ok(())
}

fn render(config: &BoardConfig, args: RenderArgs) -> Result<()> {
    let mut settings = config.display_settings().simulator;
    if let Some(out_dir) = args.out_dir {
        settings.output_dir = out_dir;
    }

    let message = args.message.to_message();
    let sequence = composer(config).compose(&message);
    let mut sink = SimulatorSink::new(settings).context("failed to prepare simulator output")?;
    sink.show(sequence.into_frames(), &message.metadata())
        .with_context(|| format!("failed to render flight {:?}", message.flight_number))?;

    if let Some(path) = sink.last_artifact() {
        println!("{}", path.display());
    }
    Ok(())
}

fn frames(config: &BoardConfig, args: FramesArgs) -> Result<()> {
    let mut settings = config.display_settings().simulator;
    settings.output_dir = args.out_dir.clone();
    let sink = SimulatorSink::new(settings)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;

    let message = args.message.to_message();
    let sequence = composer(config).compose(&message);
    let progress = ProgressBar::new(sequence.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames",
        )?
        .progress_chars("=> "),
    );

    for (index, frame) in sequence.iter().enumerate() {
        let frame_path = args.out_dir.join(format!("frame_{:04}.png", index));
        if args.dots {
            write_png(&sink.render_dots(frame), &frame_path)?;
        } else {
            write_png(frame.image(), &frame_path)?;
        }
        progress.inc(1);
    }

    progress.finish_with_message(format!("Frames written to {:?}", args.out_dir));
    Ok(())
}

fn write_png(image: &RgbImage, path: &Path) -> Result<()> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageOutputFormat::Png)
        .with_context(|| format!("failed to encode {:?}", path))?;
    fs::write(path, bytes.into_inner()).with_context(|| format!("failed to write {:?}", path))
}

fn play(config: &BoardConfig, args: PlayArgs) -> Result<()> {
    let messages = match &args.messages {
        Some(dir) => load_messages(dir)?,
        None => vec![args.message.to_message()],
    };
    let interval = Duration::try_from_secs_f32(args.interval.max(0.0))
        .with_context(|| format!("invalid interval {}", args.interval))?;

    let composer = composer(config);
    let mut sink = open_display(&config.display_settings(), config.timing())
        .context("failed to open display")?;
    sink.start().context("failed to start display")?;

    let played = publish_all(sink.as_mut(), &composer, &messages, interval, args.cycles);
    let stopped = sink.stop().context("failed to stop display");
    played?;
    stopped
}

fn publish_all(
    sink: &mut dyn DisplaySink,
    composer: &FrameComposer<'_>,
    messages: &[FlightMessage],
    interval: Duration,
    cycles: u32,
) -> Result<()> {
    let mut previous: Option<&FlightMessage> = None;
    for cycle in 0..cycles {
        debug!("starting cycle {}/{}", cycle + 1, cycles);
        for message in messages {
            if previous == Some(message) {
                info!("no update for {}, display remains the same", message.flight_number);
            } else {
                let sequence = composer.compose(message);
                info!("showing {} ({} frames)", message.flight_number, sequence.len());
                sink.show(sequence.into_frames(), &message.metadata())
                    .with_context(|| format!("failed to show {:?}", message.flight_number))?;
                previous = Some(message);
            }
            thread::sleep(interval);
        }

        sink.clear().context("failed to clear display")?;
        previous = None;
    }
    Ok(())
}

fn load_messages(dir: &Path) -> Result<Vec<FlightMessage>> {
    let mut entries: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml")))
        .collect();
    entries.sort();
    if entries.is_empty() {
        bail!("no message files found in {:?}", dir);
    }

    entries.iter().map(|path| MessageFile::load(path)).collect()
}

impl MessageArgs {
    fn to_message(&self) -> FlightMessage {
        FlightMessage::new(
            self.origin.clone(),
            self.flight.clone(),
            self.city.clone(),
            self.aircraft.clone(),
            self.delay,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_delay_parses() {
        let cli = Cli::try_parse_from([
            "flightboard",
            "preview",
            "--flight",
            "BA123",
            "--city",
            "LOS ANGELES",
            "--delay",
            "-1800",
        ])
        .unwrap();

        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        let message = args.message.to_message();
        assert_eq!(message.delay_secs, -1800);
        assert_eq!(message.city, "LOS ANGELES");
        assert_eq!(args.frame, 0);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "flightboard",
            "play",
            "--messages",
            "arrivals",
            "--backend",
            "simulator",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(cli.backend, Some(BackendChoice::Simulator));
        assert!(cli.verbose);
        let Commands::Play(args) = cli.command else {
            panic!("expected play");
        };
        assert_eq!(args.messages, Some(PathBuf::from("arrivals")));
        assert_eq!(args.cycles, 1);
    }

    #[test]
    fn messages_load_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.toml"), "flight_number = \"EZY2\"\ndelay_secs = 60")
            .unwrap();
        std::fs::write(dir.path().join("a.toml"), "flight_number = \"BA1\"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let messages = load_messages(dir.path()).unwrap();
        let flights: Vec<&str> =
            messages.iter().map(|message| message.flight_number.as_str()).collect();
        assert_eq!(flights, ["BA1", "EZY2"]);
        assert_eq!(messages[1].delay_secs, 60);
    }

    #[cfg(unix)]
    #[test]
    fn frame_write_errors_surface() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_0000.png");
        std::os::unix::fs::symlink("/dev/full", &path).unwrap();

        assert!(write_png(&RgbImage::new(4, 4), &path).is_err());
        write_png(&RgbImage::new(4, 4), &dir.path().join("ok.png")).unwrap();
        assert!(image::open(dir.path().join("ok.png")).is_ok());
    }

    #[test]
    fn empty_message_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_messages(dir.path()).is_err());
    }

    #[test]
    fn duplicate_messages_are_published_once_per_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let settings = flightboard_render::SimulatorSettings {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let mut sink = SimulatorSink::new(settings).unwrap();
        let message = FlightMessage::new("LHR", "BA1", "PARIS", "A320", 0);
        let composer = FrameComposer::default();

        publish_all(&mut sink, &composer, &[message.clone(), message], Duration::ZERO, 2)
            .unwrap();
        assert_eq!(
            sink.last_artifact(),
            Some(dir.path().join("flight_display_BA1.png").as_path())
        );
    }
}

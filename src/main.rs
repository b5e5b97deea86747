use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use you_or_me::config::{self, Overrides};
use you_or_me::menu::{self, DialoguerPrompter};
use you_or_me::voice::{AudioCapture, AudioPlayback, calculate_energy};
use you_or_me::{
    AudioVoice, Config, ConsoleVoice, CredentialStore, FavoritesStore, QuestionClient, Session,
    VoiceIo,
};

/// You or Me? - voice party game with AI-generated questions
#[derive(Parser)]
#[command(name = "youorme", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Type answers and read questions instead of using the mic and speakers
    #[arg(long)]
    typed: bool,

    /// Where the API key is stored
    #[arg(long, env = "YOUORME_CREDENTIAL_FILE")]
    credential_file: Option<PathBuf>,

    /// Where favorite questions are stored
    #[arg(long, env = "YOUORME_FAVORITES_FILE")]
    favorites_file: Option<PathBuf>,

    /// Settings file
    #[arg(long, env = "YOUORME_SETTINGS", default_value = config::file::DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Who is more likely to sing in the shower?")]
        text: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Quiet by default so log lines stay out of the game's way
    let filter = match cli.verbose {
        0 => "warn",
        1 => "warn,you_or_me=info",
        2 => "info,you_or_me=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(
        &cli.settings,
        Overrides {
            credential_file: cli.credential_file,
            favorites_file: cli.favorites_file,
            typed: cli.typed,
        },
    );
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker().await,
            Command::TestTts { text } => test_tts(&config, &text).await,
        };
    }

    let questions = QuestionClient::new(&config.question)?;
    let voice: Box<dyn VoiceIo> = if config.voice.typed {
        Box::new(ConsoleVoice::new())
    } else {
        Box::new(AudioVoice::from_config(&config.voice)?)
    };

    tracing::info!(
        credential_file = %config.credential_file.display(),
        favorites_file = %config.favorites_file.display(),
        typed = config.voice.typed,
        "starting game"
    );

    let mut session = Session::new(
        Box::new(questions),
        voice,
        CredentialStore::new(&config.credential_file),
        FavoritesStore::new(&config.favorites_file),
    )
    .with_listen_timing(config.voice.listen_timeout, config.voice.calibration);

    menu::run(&mut session, &mut DialoguerPrompter).await;
    Ok(())
}

/// Show a live level meter for the default microphone
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    println!("Sample rate: {} Hz", capture.sample_rate());
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_energy(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check that your mic is plugged in and not muted.");

    Ok(())
}

/// Play a short tone on the default output
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let sample_rate = 24000_u32;
    let frequency = 440.0_f32;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..sample_rate * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    println!("Playing {} samples at {sample_rate} Hz...", samples.len());

    tokio::task::spawn_blocking(move || AudioPlayback::new()?.play_samples(samples, sample_rate))
        .await??;

    println!("\nIf you heard the tone, your speakers are working!");
    Ok(())
}

/// Speak `text` with the configured TTS provider
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let mut voice = AudioVoice::from_config(&config.voice)?;
    voice.speak(text).await;

    println!("Done. If the text was printed instead of heard, run with -vv for details.");
    Ok(())
}

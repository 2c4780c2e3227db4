use echomuse::batch::{read_lines, render_lines};
use echomuse::inspect::inspect_directory;
use echomuse::decode::read_pcm_file;
use echomuse::{build_wav, AppConfig, AudioFormat, GeminiSpeech, Studio, Voice};
use indicatif::ProgressBar;
use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) -> String {
    format!(
        "Usage:\n  \
         To speak:          {0} speak <voice> <text> [output_dir]\n  \
         To wrap raw PCM:   {0} wrap <input.pcm|input.b64> <output_wav> [sample_rate] [channels] [bits]\n  \
         To process batch:  {0} batch <lines_file> <output_dir> [voice]\n  \
         To inspect:        {0} inspect <wav_directory> <metadata_output_file>\n  \
         To list voices:    {0} voices",
        program
    )
}

fn studio(config: &AppConfig) -> Result<Studio<GeminiSpeech>, Box<dyn Error>> {
    let source = GeminiSpeech::new(&config.speech, config.api_key())?;
    Ok(Studio::new(source, config))
}

fn speak(
    config: &AppConfig,
    voice: &str,
    text: &str,
    output_dir: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let voice: Voice = voice.parse()?;
    let output_dir = output_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.output.directory.clone());
    fs::create_dir_all(&output_dir)?;

    let mut studio = studio(config)?;
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Generating with {}...", voice));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    let generated = studio.generate(text, voice);
    spinner.finish_and_clear();

    let item = generated?;
    info!("[{}] {}: {}", item.time_label(), item.voice, item.text);
    let path = studio.save(&item, &output_dir)?;
    if let Some(wav) = studio.audio(&item) {
        info!(
            "{} ({}, {:.2}s, {} bytes)",
            path.display(),
            wav.mime_type(),
            wav.duration_secs(),
            wav.len()
        );
    }
    println!("{}", path.display());
    Ok(())
}

fn parse_or<T: std::str::FromStr>(arg: Option<&String>, default: T) -> Result<T, Box<dyn Error>>
where
    T::Err: Error + 'static,
{
    match arg {
        Some(value) => Ok(value.parse()?),
        None => Ok(default),
    }
}

fn wrap(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    args: &[String],
) -> Result<(), Box<dyn Error>> {
    let format = AudioFormat::new(
        parse_or(args.first(), config.audio.sample_rate)?,
        parse_or(args.get(1), config.audio.num_channels)?,
        parse_or(args.get(2), config.audio.bits_per_sample)?,
    );

    let pcm = read_pcm_file(input)?;
    let wav = build_wav(&pcm, &format)?;
    fs::write(output, wav.bytes())?;
    info!(
        "Wrote {} ({}, {:.2}s)",
        output.display(),
        format,
        wav.duration_secs()
    );
    Ok(())
}

fn batch(
    config: &AppConfig,
    lines_file: &Path,
    output_dir: &Path,
    voice: Option<&String>,
) -> Result<(), Box<dyn Error>> {
    let voice: Voice = match voice {
        Some(name) => name.parse()?,
        None => Voice::default(),
    };
    let lines = read_lines(lines_file)?;
    let studio = studio(config)?;

    let outcomes = render_lines(
        &studio,
        &lines,
        voice,
        output_dir,
        &config.output.file_prefix,
        ProgressBar::new(lines.len() as u64),
    )?;

    let failed: Vec<usize> = outcomes
        .iter()
        .filter(|outcome| outcome.result.is_err())
        .map(|outcome| outcome.line)
        .collect();
    if !failed.is_empty() {
        return Err(Box::from(format!("lines {:?} failed", failed)));
    }
    Ok(())
}

fn voices() {
    for voice in Voice::ALL {
        println!("{:<8} {:<7} {}", voice, voice.gender(), voice.description());
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("echomuse");

    if args.len() < 2 {
        eprintln!("{}", usage(program));
        std::process::exit(1);
    }

    let config = AppConfig::load()?;
    let command = &args[1];

    match command.as_str() {
        "speak" => {
            if args.len() < 4 {
                eprintln!("Usage: {} speak <voice> <text> [output_dir]", program);
                std::process::exit(1);
            }
            speak(&config, &args[2], &args[3], args.get(4).map(String::as_str))?;
        }
        "wrap" => {
            if args.len() < 4 {
                eprintln!(
                    "Usage: {} wrap <input.pcm|input.b64> <output_wav> [sample_rate] [channels] [bits]",
                    program
                );
                std::process::exit(1);
            }
            wrap(&config, Path::new(&args[2]), Path::new(&args[3]), &args[4..])?;
        }
        "batch" => {
            if args.len() < 4 {
                eprintln!("Usage: {} batch <lines_file> <output_dir> [voice]", program);
                std::process::exit(1);
            }
            batch(&config, Path::new(&args[2]), Path::new(&args[3]), args.get(4))?;
        }
        "inspect" => {
            if args.len() < 4 {
                eprintln!(
                    "Usage: {} inspect <wav_directory> <metadata_output_file>",
                    program
                );
                std::process::exit(1);
            }
            let report = inspect_directory(Path::new(&args[2]), Path::new(&args[3]))?;
            info!(
                "{} written, {} already present, {} unreadable",
                report.written, report.skipped, report.unreadable
            );
        }
        "voices" => voices(),
        _ => {
            eprintln!("Unknown command: {}\n{}", command, usage(program));
            std::process::exit(1);
        }
    }

    Ok(())
}

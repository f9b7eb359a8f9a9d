//! echo-tts-cli: Echo-TTS 语音合成命令行工具
//!
//! Usage:
//!   echo-tts-cli synthesize --text <text> (--speaker-url <url> | --voice-id <id> | --speaker-file <path>) [options]
//!   echo-tts-cli warmup                          Wake the service
//!   echo-tts-cli health                          Show service health
//!   echo-tts-cli info                            Show service information
//!   echo-tts-cli voices [<id>]                   List voices, or show one (voice-id contract)

use anyhow::{anyhow, bail, Context};
use echo_tts_client::{
    ApiVersion, AuthScheme, BodyEncoding, Error, SynthesisRequest, TtsClient, TtsClientBuilder,
};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(2);
    }

    let command = args[1].as_str();
    let rest = &args[2..];
    let outcome = match command {
        "synthesize" | "tts" => cmd_synthesize(rest).await,
        "warmup" => cmd_warmup(rest).await,
        "health" => cmd_health(rest).await,
        "info" => cmd_info(rest).await,
        "voices" => cmd_voices(rest).await,
        "version" | "--version" | "-V" => {
            println!("echo-tts-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = outcome {
        match e.downcast_ref::<Error>() {
            Some(client_err) => eprintln!("Error [{}]: {e:#}", client_err.code()),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"echo-tts-cli: Echo-TTS 命令行工具

USAGE:
    echo-tts-cli <COMMAND> [OPTIONS]

COMMANDS:
    synthesize                  Generate speech and write it to a WAV file
    warmup                      Wake the service to avoid a cold start
    health                      Show service health
    info                        Show service information
    voices [<id>]               List registered voices, or show one
    version                     Show version information
    help                        Show this help message

SYNTHESIZE OPTIONS:
    --text <text>               Text to speak (prefixed with "[S1] " unless tagged)
    --speaker-url <url>         Reference audio URL (speaker-url contract)
    --voice-id <id>             Registered voice id (voice-id contract)
    --speaker-file <path>       Reference audio sent inline
    --steps <n>                 Diffusion steps
    --seed <n>                  RNG seed
    --guidance <x>              cfg_scale_speaker / speaker_kv_scale
    --preset <name>             Preset name (voice-id contract)
    --out <path>                Output file (default: output.wav)

COMMON OPTIONS:
    --config <path>             YAML configuration file
    --base-url <url>            Service base URL
    --api-version <v>           speaker-url | voice-id
    --auth <scheme>             bearer | api-key-header
    --timeout <secs>            Request timeout override
    --prefix <path>             Endpoint path prefix, e.g. /api
    --multipart                 Send the request as multipart form data

ENVIRONMENT:
    API_KEY                     Service API key
    ECHO_TTS_BASE_URL           Service base URL
    ECHO_TTS_API_VERSION        speaker-url | voice-id
    RUST_LOG                    Log filter, e.g. echo_tts_client=debug"#
    );
}

fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// Flags that take no value.
const SWITCHES: &[&str] = &["--multipart"];

/// First argument that is neither a flag nor a flag's value.
fn first_positional(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if !SWITCHES.contains(&arg.as_str()) {
                iter.next();
            }
            continue;
        }
        return Some(arg);
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn parse_flag<T>(args: &[String], name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match flag_value(args, name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("invalid value for {name}: '{raw}' ({e})")),
        None => Ok(None),
    }
}

fn build_client(args: &[String]) -> anyhow::Result<TtsClient> {
    let mut builder = match flag_value(args, "--config") {
        Some(path) => TtsClientBuilder::from_yaml_file(&path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => TtsClientBuilder::from_env()?,
    };
    if let Some(url) = flag_value(args, "--base-url") {
        builder = builder.base_url(url);
    }
    if let Some(version) = parse_flag::<ApiVersion>(args, "--api-version")? {
        builder = builder.api_version(version);
    }
    if let Some(scheme) = parse_flag::<AuthScheme>(args, "--auth")? {
        builder = builder.auth_scheme(scheme);
    }
    if let Some(secs) = parse_flag::<u64>(args, "--timeout")? {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(prefix) = flag_value(args, "--prefix") {
        builder = builder.path_prefix(prefix);
    }
    if has_flag(args, "--multipart") {
        builder = builder.body_encoding(BodyEncoding::Multipart);
    }
    Ok(builder.build()?)
}

fn parse_synthesis_request(args: &[String]) -> anyhow::Result<SynthesisRequest> {
    let text = flag_value(args, "--text").ok_or_else(|| anyhow!("--text is required"))?;
    let mut request = SynthesisRequest::new(text);
    if let Some(url) = flag_value(args, "--speaker-url") {
        request = request.with_speaker_audio_url(url);
    }
    if let Some(id) = flag_value(args, "--voice-id") {
        request = request.with_voice_id(id);
    }
    if let Some(path) = flag_value(args, "--speaker-file") {
        let audio = std::fs::read(&path).with_context(|| format!("reading {path}"))?;
        request = request.with_speaker_audio(audio);
    }
    if let Some(steps) = parse_flag::<u32>(args, "--steps")? {
        request = request.with_num_steps(steps);
    }
    if let Some(seed) = parse_flag::<i64>(args, "--seed")? {
        request = request.with_rng_seed(seed);
    }
    if let Some(scale) = parse_flag::<f64>(args, "--guidance")? {
        request = request.with_guidance_scale(scale);
    }
    if let Some(preset) = flag_value(args, "--preset") {
        request = request.with_preset_name(preset);
    }
    Ok(request)
}

async fn cmd_synthesize(args: &[String]) -> anyhow::Result<()> {
    let request = parse_synthesis_request(args)?;
    let client = build_client(args)?;
    let out = PathBuf::from(flag_value(args, "--out").unwrap_or_else(|| "output.wav".into()));

    let audio = client.synthesize(&request).await?;
    std::fs::write(&out, &audio.data).with_context(|| format!("writing {}", out.display()))?;
    println!(
        "Wrote {} bytes ({}) to {}",
        audio.len(),
        audio.format.mime_type(),
        out.display()
    );
    Ok(())
}

async fn cmd_warmup(args: &[String]) -> anyhow::Result<()> {
    let client = build_client(args)?;
    let start = std::time::Instant::now();
    client.warmup().await?;
    println!("Service warm ({:.1}s)", start.elapsed().as_secs_f64());
    Ok(())
}

async fn cmd_health(args: &[String]) -> anyhow::Result<()> {
    let client = build_client(args)?;
    let health = client.health().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    if !health.is_healthy() {
        bail!("service reported status '{}'", health.status);
    }
    Ok(())
}

async fn cmd_info(args: &[String]) -> anyhow::Result<()> {
    let client = build_client(args)?;
    let info = client.info().await?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

async fn cmd_voices(args: &[String]) -> anyhow::Result<()> {
    let client = build_client(args)?;
    match first_positional(args) {
        Some(id) => {
            let voice = client.get_voice(id).await?;
            println!("{}", serde_json::to_string_pretty(&voice)?);
        }
        None => {
            let list = client.list_voices().await?;
            if let Some(note) = &list.note {
                println!("Note: {note}");
            }
            if list.voices.is_empty() {
                println!("No voices registered.");
            }
            for voice in &list.voices {
                println!(
                    "{:<20} {:<24} {}",
                    voice.id,
                    voice.display_name(),
                    voice.created_at.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

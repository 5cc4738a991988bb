//! Wordwise CLI
//!
//! 扫描网页中可见的直接文本元素，并按 CEFR 等级或机器翻译进行注释。

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wordwise::config::{get_user_config, CefrLevel, FileConfigRepository};
use wordwise::env::{self as wenv, EnvConfig};
use wordwise::llm::{LlmCaller, LlmCallerConfig, VOCABULARY_SYSTEM_PROMPT};
use wordwise::monitor::ViewportConfig;
use wordwise::translation::{TranslateOptions, Translator, TranslatorConfig};
use wordwise::{annotate_document, scan_document, AnnotateOptions, AnnotationMode, Annotator};

#[derive(Parser)]
#[command(name = "wordwise")]
#[command(about = "Visible-text monitoring and CEFR-aware page annotation", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print visible direct-text elements for every scroll step
    Scan {
        file: PathBuf,

        /// Emit one JSON object per step
        #[arg(long)]
        json: bool,

        /// Document encoding
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,
    },

    /// Annotate a document and write the result
    Annotate {
        file: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Annotation mode (vocabulary, translate)
        #[arg(short, long, default_value = "vocabulary")]
        mode: AnnotationMode,

        /// Override the configured CEFR level
        #[arg(long)]
        cefr: Option<CefrLevel>,

        /// Configuration file path
        #[arg(short, long, env = "WORDWISE_CONFIG")]
        config: Option<PathBuf>,

        /// Document encoding
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,
    },

    /// Translate a piece of text
    Translate {
        text: String,

        /// Source language
        #[arg(long)]
        from: Option<String>,

        /// Target language
        #[arg(long)]
        to: Option<String>,
    },

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print environment variable documentation
    EnvDocs,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the resolved user configuration
    Show {
        #[arg(short, long, env = "WORDWISE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Write an example configuration file
    Init {
        #[arg(default_value = "wordwise.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan {
            file,
            json,
            encoding,
        } => {
            let input = fs::read(&file)?;
            let options = annotate_options(encoding)?;
            let steps = scan_document(&input, &options)?;

            let mut stdout = io::stdout().lock();
            for step in &steps {
                if json {
                    writeln!(stdout, "{}", serde_json::to_string(step)?)?;
                } else {
                    writeln!(stdout, "# step {} (scroll_top = {})", step.step, step.scroll_top)?;
                    for visible in &step.visible {
                        writeln!(stdout, "<{}> {}", visible.tag, visible.text)?;
                    }
                }
            }
        }
        Commands::Annotate {
            file,
            output,
            mode,
            cefr,
            config,
            encoding,
        } => {
            let input = fs::read(&file)?;
            let repository = open_repository(config);
            let mut user_config = get_user_config(&repository).await?;
            if let Some(cefr) = cefr {
                user_config.cefr = cefr;
            }

            let annotator = match mode {
                AnnotationMode::Vocabulary => {
                    let caller = LlmCaller::new(LlmCallerConfig::from_user_config(
                        &user_config,
                        VOCABULARY_SYSTEM_PROMPT,
                    ))?;
                    Annotator::vocabulary(caller, user_config.cefr)
                }
                AnnotationMode::Translate => {
                    let translator = Translator::google(translator_config())?;
                    let options = TranslateOptions::from(translator.config());
                    Annotator::translate(translator, options)
                }
            };

            let options = annotate_options(encoding)?;
            let (document, report) = annotate_document(&input, &options, &annotator).await?;

            match output {
                Some(path) => fs::write(&path, &document)?,
                None => io::stdout().lock().write_all(&document)?,
            }
            eprintln!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Translate { text, from, to } => {
            let translator = Translator::google(translator_config())?;
            let mut options = TranslateOptions::from(translator.config());
            if let Some(from) = from {
                options.source_lang = from;
            }
            if let Some(to) = to {
                options.target_lang = to;
            }

            println!("{}", translator.translate(&text, &options).await?);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show { config } => {
                let repository = open_repository(config);
                let user_config = get_user_config(&repository).await?;
                println!("# {}", repository.path().display());
                println!("{}", toml::to_string_pretty(&user_config.redacted())?);
                EnvConfig::from_env()?.print_summary();
            }
            ConfigCommands::Init { path, force } => {
                if path.exists() && !force {
                    return Err(format!(
                        "{} already exists, use --force to overwrite",
                        path.display()
                    )
                    .into());
                }
                FileConfigRepository::generate_example_config(&path)?;
                println!("Example configuration written to {}", path.display());
            }
        },
        Commands::EnvDocs => {
            print!("{}", wenv::generate_env_docs());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    use wenv::EnvVar;

    let level = if verbose {
        "debug".to_string()
    } else {
        wenv::core::LogLevel::get().unwrap_or_else(|_| "info".to_string())
    };
    let no_color = wenv::core::NoColor::get().unwrap_or(false);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_ansi(!no_color)
        .without_time()
        .init();
}

fn open_repository(path: Option<PathBuf>) -> FileConfigRepository {
    match path {
        Some(path) => FileConfigRepository::new(path),
        None => FileConfigRepository::discover(),
    }
}

fn translator_config() -> TranslatorConfig {
    let mut config = TranslatorConfig::default();
    config.apply_env_overrides();
    config
}

fn annotate_options(encoding: String) -> Result<AnnotateOptions, Box<dyn Error>> {
    let env = EnvConfig::from_env()?;
    Ok(AnnotateOptions {
        encoding,
        viewport: ViewportConfig {
            height: env.viewport_height,
            line_height: env.line_height,
            chars_per_line: env.chars_per_line,
        },
        max_scroll_steps: None,
    })
}


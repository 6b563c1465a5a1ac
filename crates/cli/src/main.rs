use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use llamaid_assistant::{ask_or_fallback, AssistantConfig, OllamaAssistant};
use llamaid_core::annotate::render_marked;
use llamaid_core::config::{keyword_tables_from_path, overlap_policy_from_env_value};
use llamaid_core::query::{append_fragment, compose_query, Vitals};
use llamaid_core::{CaseSummary, CoreConfig, TextEngine, PRESET_QUERIES};

#[derive(Parser)]
#[command(name = "llamaid")]
#[command(about = "LLaMAid ambulance assistant CLI")]
struct Cli {
    /// Overlap policy: drop-intersecting or leftmost-first
    #[arg(long, global = true, env = "LLAMAID_OVERLAP_POLICY")]
    overlap_policy: Option<String>,
    /// YAML file overriding the urgency keyword tables
    #[arg(long, global = true, env = "LLAMAID_KEYWORDS_FILE")]
    keywords: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct InputArgs {
    /// Input text as a literal string. Conflicts with --input.
    #[arg(long = "text", value_name = "TEXT", conflicts_with = "input")]
    text: Option<String>,
    /// Path to input text file. Use '-' to read from stdin.
    #[arg(long = "input", short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,
}

#[derive(Args, Default)]
struct VitalsArgs {
    /// Heart rate (bpm)
    #[arg(long)]
    hr: Option<String>,
    /// Systolic blood pressure (mmHg)
    #[arg(long)]
    systolic: Option<String>,
    /// Diastolic blood pressure (mmHg)
    #[arg(long)]
    diastolic: Option<String>,
    /// Respiratory rate (per minute)
    #[arg(long)]
    rr: Option<String>,
    /// Oxygen saturation (%)
    #[arg(long)]
    spo2: Option<String>,
    /// Patient age (years)
    #[arg(long)]
    age: Option<String>,
    /// Patient gender
    #[arg(long)]
    gender: Option<String>,
    /// Known allergies
    #[arg(long)]
    allergies: Option<String>,
}

impl From<VitalsArgs> for Vitals {
    fn from(args: VitalsArgs) -> Self {
        Vitals {
            hr: args.hr,
            systolic: args.systolic,
            diastolic: args.diastolic,
            rr: args.rr,
            spo2: args.spo2,
            age: args.age,
            gender: args.gender,
            allergies: args.allergies,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Highlight urgency keywords in a response
    Annotate {
        #[command(flatten)]
        input: InputArgs,
        /// Print annotated lines as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify a response and print its SBAR case summary
    Classify {
        #[command(flatten)]
        input: InputArgs,
        /// Print scenario and summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the SBAR export block for a response
    Export {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Highlight urgency keywords in each section of an exported SBAR block
    Review {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Send a query to the assistant and print the highlighted answer
    Ask {
        /// Query text
        query: String,
        /// Dictated fragments appended to the query
        #[arg(long = "dictated", value_name = "TEXT")]
        dictated: Vec<String>,
        #[command(flatten)]
        vitals: VitalsArgs,
        /// Also print the SBAR export block
        #[arg(long)]
        sbar: bool,
    },
    /// List preset queries
    Presets,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = CoreConfig::new(
        overlap_policy_from_env_value(cli.overlap_policy)?,
        keyword_tables_from_path(cli.keywords)?,
    );
    let engine = TextEngine::new(&cfg)?;

    match cli.command {
        Some(Commands::Annotate { input, json }) => {
            let text = read_input_text(&input)?;
            let lines = engine.annotate(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                println!("{}", render_marked(&lines));
            }
        }
        Some(Commands::Classify { input, json }) => {
            let text = read_input_text(&input)?;
            let (scenario, summary) = engine.classify(&text);
            if json {
                let value = serde_json::json!({ "scenario": scenario, "summary": summary });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Scenario: {}\n", scenario);
                println!("{}", summary.export());
            }
        }
        Some(Commands::Export { input }) => {
            let text = read_input_text(&input)?;
            println!("{}", engine.export_summary(&text));
        }
        Some(Commands::Review { input }) => {
            let text = read_input_text(&input)?;
            let summary = CaseSummary::parse_export(&text)?;
            for (header, value) in [
                ("Situation", &summary.situation),
                ("Background", &summary.background),
                ("Assessment", &summary.assessment),
                ("Recommendation", &summary.recommendation),
            ] {
                println!("== {} ==", header);
                println!("{}\n", render_marked(&engine.annotate(value)));
            }
        }
        Some(Commands::Ask {
            query,
            dictated,
            vitals,
            sbar,
        }) => {
            let query = dictated
                .iter()
                .fold(query, |acc, fragment| append_fragment(&acc, fragment));
            let vitals = Vitals::from(vitals);
            let prompt = compose_query(&query, Some(&vitals)).context("Query cannot be empty")?;

            let assistant = OllamaAssistant::new(AssistantConfig::from_env_values(
                std::env::var("LLAMAID_ASSISTANT_URL").ok(),
                std::env::var("LLAMAID_MODEL").ok(),
                std::env::var("LLAMAID_ASSISTANT_TIMEOUT_MS").ok(),
            )?)?;
            let response = ask_or_fallback(&assistant, &prompt).await;

            println!("{}", render_marked(&engine.annotate(&response)));
            if sbar {
                println!("\n{}", engine.export_summary(&response));
            }
        }
        Some(Commands::Presets) => {
            for preset in PRESET_QUERIES {
                println!("{}", preset);
            }
        }
        None => {
            println!("Use 'llamaid --help' for commands");
        }
    }

    Ok(())
}

fn read_input_text(args: &InputArgs) -> Result<String> {
    if let Some(literal) = &args.text {
        return Ok(literal.to_string());
    }

    match &args.input {
        Some(path) if path.as_path() == Path::new("-") => read_stdin(),
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            if std::io::stdin().is_terminal() {
                anyhow::bail!("No input provided. Use --text, --input, or pipe text via stdin.");
            }
            read_stdin()
        }
    }
}

// Empty input is valid: it annotates to one empty line and classifies as generic.
fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn literal_text_wins() {
        let args = InputArgs {
            text: Some("urgent".into()),
            input: None,
        };
        assert_eq!(read_input_text(&args).unwrap(), "urgent");
    }

    #[test]
    fn parses_ask_with_vitals() {
        let cli = Cli::try_parse_from([
            "llamaid",
            "ask",
            "Chest pain",
            "--dictated",
            "and dizziness",
            "--hr",
            "110",
            "--sbar",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Ask {
                query,
                dictated,
                vitals,
                sbar,
            }) => {
                assert_eq!(query, "Chest pain");
                assert_eq!(dictated, vec!["and dizziness"]);
                assert_eq!(vitals.hr.as_deref(), Some("110"));
                assert!(sbar);
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn text_and_input_conflict() {
        let result = Cli::try_parse_from([
            "llamaid", "annotate", "--text", "x", "--input", "file.txt",
        ]);
        assert!(result.is_err());
    }
}

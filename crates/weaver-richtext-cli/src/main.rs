use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use weaver_richtext::{
    EditorAction, EditorConfig, EditorState, StyleKind, apply_style, check_coherence,
    execute_action, parse, serialize, split_into_columns,
};

#[derive(Parser)]
#[command(version, about = "Inspect and edit weaver rich-text markup", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to an editor config file (JSON)
    #[arg(long, global = true, env = "RICHTEXT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse markup and print it in canonical form
    Parse {
        /// Markup, or `-` to read stdin
        markup: String,

        /// Print the document tree as JSON
        #[arg(long)]
        json: bool,

        /// Print only the raw text
        #[arg(long, conflicts_with = "json")]
        raw: bool,
    },
    /// Toggle a style over a character range
    Apply {
        /// Markup, or `-` to read stdin
        markup: String,

        /// Style tag name: b, i, u, +1 or -1
        #[arg(value_parser = parse_style, allow_hyphen_values = true)]
        style: StyleKind,

        /// First char of the range
        start: usize,

        /// Char after the end of the range
        end: usize,
    },
    /// Split markup into columns of roughly equal word count
    Columns {
        /// Markup, or `-` to read stdin
        markup: String,

        /// Number of columns
        count: usize,
    },
    /// Replay a JSON array of editor actions and print the final markup
    Replay {
        /// Action log file, or `-` to read stdin
        log: String,

        /// Markup the field starts with
        #[arg(long, default_value = "")]
        markup: String,
    },
}

fn main() -> Result<()> {
    init_miette()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse { markup, json, raw } => {
            let doc = parse(&read_arg(markup)?);
            if config.check_coherence {
                check_coherence(&doc)?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&doc).into_diagnostic()?);
            } else if raw {
                println!("{}", doc.raw_text());
            } else {
                println!("{}", serialize(&doc));
            }
        }
        Commands::Apply {
            markup,
            style,
            start,
            end,
        } => {
            let doc = apply_style(&parse(&read_arg(markup)?), start, end, style)?;
            println!("{}", serialize(&doc));
        }
        Commands::Columns { markup, count } => {
            for column in split_into_columns(&parse(&read_arg(markup)?), count)? {
                println!("{}", serialize(&column));
            }
        }
        Commands::Replay { log, markup } => {
            let source = if log == "-" {
                read_stdin()?
            } else {
                std::fs::read_to_string(&log)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Failed to read action log {log}"))?
            };
            let actions: Vec<EditorAction> = serde_json::from_str(&source)
                .into_diagnostic()
                .wrap_err("Action log must be a JSON array of editor actions")?;

            let mut state = EditorState::from_markup(&markup, config);
            for (step, action) in actions.iter().enumerate() {
                let changed = execute_action(&mut state, action)
                    .wrap_err_with(|| format!("Action {step} ({action:?}) failed"))?;
                tracing::info!(step, changed, markup = %state.markup(), "replayed action");
            }
            println!("{}", state.markup());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    let source = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&source)
        .into_diagnostic()
        .wrap_err_with(|| format!("Invalid config {}", path.display()))
}

/// Markup argument, with `-` meaning stdin.
fn read_arg(markup: String) -> Result<String> {
    if markup == "-" {
        let mut text = read_stdin()?;
        // Drop the newline a shell pipe adds.
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    } else {
        Ok(markup)
    }
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .into_diagnostic()?;
    Ok(text)
}

fn parse_style(name: &str) -> std::result::Result<StyleKind, String> {
    StyleKind::from_tag_name(name).ok_or_else(|| {
        let known: Vec<_> = StyleKind::ALL.iter().map(|k| k.tag_name()).collect();
        format!("unknown style `{name}`, expected one of {}", known.join(", "))
    })
}

fn init_miette() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_style_accepts_tag_names() {
        assert_eq!(parse_style("b"), Ok(StyleKind::Bold));
        assert_eq!(parse_style("-1"), Ok(StyleKind::SizeDown));
        assert!(parse_style("bold").unwrap_err().contains("+1"));
    }

    #[test]
    fn test_cli_parses_negative_style() {
        let cli = Cli::try_parse_from(["richtext", "apply", "abc", "-1", "0", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Apply {
                style: StyleKind::SizeDown,
                start: 0,
                end: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        assert_eq!(load_config(None).unwrap(), EditorConfig::default());
    }
}

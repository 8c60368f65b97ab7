//! Composition root: wires capture, extraction, and the session together
//! behind the CLI commands.

use std::io::{BufRead, Write};

use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::Value;

use crate::capture::{ChannelCaptureSource, FragmentSender, TranscriptFragment};
use crate::config::Config;
use crate::extract::{Extractor, GeminiExtractor};
use crate::schema::{FIELD_LABELS, IntakeRecord, field_label};
use crate::session::{IntakeSession, SessionState};

/// One-shot extraction: one transcript in, the record as JSON out.
///
/// Prints the record to stdout and, unless quiet, a missing-fields
/// summary to stderr.
pub async fn run_extract(config: Config, transcript: &str, quiet: bool) -> Result<()> {
    let extractor = GeminiExtractor::from_config(&config.extraction)?;
    let record = extractor.extract(transcript).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);

    if !quiet {
        let missing = crate::schema::missing_fields(&record);
        if missing.is_empty() {
            eprintln!("{}", "All required fields present".green());
        } else {
            eprintln!(
                "{} {}",
                "Still missing:".yellow(),
                missing
                    .iter()
                    .map(|f| field_label(f))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    Ok(())
}

/// Interactive intake session over stdin.
///
/// The operator drives the session with colon commands; any other line
/// typed while recording is fed to the session as settled speech. On
/// submit the finished record is printed to stdout as JSON.
pub async fn run_intake(config: Config, quiet: bool) -> Result<()> {
    let extractor = GeminiExtractor::from_config(&config.extraction)?;
    let (capture, sender) = ChannelCaptureSource::new(config.capture.device.clone());
    let mut session = IntakeSession::new(capture, extractor);

    if !quiet {
        eprintln!("{}", "rapidvoice intake session".bold());
        eprintln!("Commands: :record  :stop  :show  :missing  :submit  :reset  :quit");
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if !quiet {
            let state = format!("[{:?}]", session.state());
            eprint!("{} ", state.dimmed());
            std::io::stderr().flush()?;
        }

        let Some(line) = lines.next() else { break };
        let line = line?;
        let trimmed = line.trim();

        match trimmed {
            "" => continue,
            ":record" => match session.start_recording() {
                Ok(()) => {
                    if !quiet {
                        eprintln!("Recording. Type what the caller says, then :stop");
                    }
                }
                Err(e) => eprintln!("{} {}", "error:".red(), e),
            },
            ":stop" => match session.stop_and_extract().await {
                Ok(()) => {
                    if !quiet {
                        eprintln!("{}", format_record(session.record()));
                        eprintln!("{}", format_missing(&session.missing()));
                    }
                }
                Err(e) => eprintln!("{} {}", "error:".red(), e),
            },
            ":show" => eprintln!("{}", format_record(session.record())),
            ":missing" => eprintln!("{}", format_missing(&session.missing())),
            ":submit" => match session.submit() {
                Ok(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    if !quiet {
                        eprintln!("{}", "Record submitted".green());
                    }
                    break;
                }
                Err(e) => eprintln!("{} {}", "error:".red(), e),
            },
            ":reset" => {
                session.reset();
                if !quiet {
                    eprintln!("Session reset");
                }
            }
            ":quit" => break,
            _ if session.state() == SessionState::Recording => {
                feed_speech(&sender, trimmed);
            }
            _ => {
                eprintln!(
                    "{} not recording; use :record first, or a :command",
                    "hint:".yellow()
                );
            }
        }
    }

    Ok(())
}

fn feed_speech(sender: &FragmentSender, text: &str) {
    sender.send(TranscriptFragment::settled(text));
}

/// Print the field catalogue, required first.
pub fn run_fields(all: bool) {
    println!("{}", "Required fields:".bold());
    for name in crate::schema::REQUIRED_FIELDS {
        println!("  {:<42} {}", name, field_label(name).dimmed());
    }
    if all {
        println!();
        println!("{}", "Optional fields:".bold());
        for (path, label) in FIELD_LABELS {
            if !crate::schema::REQUIRED_FIELDS.contains(path) {
                println!("  {:<42} {}", path, label.dimmed());
            }
        }
    }
}

/// Render the accumulated record for review, one labelled line per
/// present field, in schema order.
pub fn format_record(record: &IntakeRecord) -> String {
    let value = match serde_json::to_value(record) {
        Ok(v) => v,
        Err(_) => return String::new(),
    };

    let mut out = String::new();
    for (path, label) in FIELD_LABELS {
        if let Some(field) = resolve_path(&value, path) {
            out.push_str(&format!("  {:<24} {}\n", label, format_value(field)));
        }
    }
    if out.is_empty() {
        "  (no fields captured yet)\n".to_string()
    } else {
        out
    }
}

fn format_missing(missing: &[&'static str]) -> String {
    if missing.is_empty() {
        "All required fields present; :submit to finish".to_string()
    } else {
        format!(
            "Still missing: {}",
            missing
                .iter()
                .map(|f| field_label(f))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

/// Follow a dotted path into a JSON value.
fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(format_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

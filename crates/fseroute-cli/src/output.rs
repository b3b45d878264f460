//! Output formatting for job listings and route searches.
//!
//! Text output keeps the tab-separated leg lines exactly as the library
//! renders them; headings and the footer are styled with the terminal
//! palette. Warnings about dropped branches go to a separate writer so they
//! never mix with results.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use fseroute_lib::{JobsSummary, RenderMode, SearchSummary};

use crate::terminal::{format_with_separators, ColorPalette};

/// Output formats accepted by `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated lines with a short heading.
    #[default]
    Text,
    /// Markdown list, handy for notes and forum posts.
    Markdown,
    /// Pretty-printed JSON document.
    Json,
}

/// Write any serializable summary as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::other)?;
    out.write_all(b"\n")
}

/// Render the legs departing one airport.
pub fn write_jobs<W: Write>(
    out: &mut W,
    summary: &JobsSummary,
    format: OutputFormat,
    palette: ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, summary),
        OutputFormat::Text | OutputFormat::Markdown => {
            let name = summary
                .airport_name
                .as_deref()
                .map(|name| format!(" ({name})"))
                .unwrap_or_default();
            if summary.legs.is_empty() {
                return writeln!(out, "No jobs departing {}{name}.", summary.airport);
            }
            writeln!(
                out,
                "{}Best legs departing {}{name}:{}",
                palette.heading, summary.airport, palette.reset
            )?;
            write!(out, "{}", summary.render_plain())
        }
    }
}

/// Render the routes found by a search.
pub fn write_search<W: Write>(
    out: &mut W,
    summary: &SearchSummary,
    format: OutputFormat,
    palette: ColorPalette,
) -> io::Result<()> {
    let steps = summary.params.steps;
    match format {
        OutputFormat::Json => return write_json(out, summary),
        _ if summary.routes.is_empty() => {
            return writeln!(
                out,
                "No {steps}-leg routes found from {}; only {} of {steps} legs could be extended.",
                summary.start, summary.steps_completed
            );
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "{}Best {steps}-leg routes from {}:{}\n",
                palette.heading, summary.start, palette.reset
            )?;
            write!(out, "{}", summary.render(RenderMode::PlainText))?;
        }
        OutputFormat::Markdown => write!(out, "{}", summary.render(RenderMode::Markdown))?,
    }

    if let Some(best) = summary.routes.first() {
        writeln!(
            out,
            "{}Best route pays {}${}{}{} over {} nm ({} job queries).{}",
            palette.muted,
            palette.money,
            format_with_separators(best.value),
            palette.reset,
            palette.muted,
            best.length_nm,
            summary.queries,
            palette.reset
        )?;
    }
    Ok(())
}

/// Report branches that were dropped because their airport's feed failed.
pub fn write_failures<W: Write>(
    err: &mut W,
    summary: &SearchSummary,
    palette: ColorPalette,
) -> io::Result<()> {
    for failure in &summary.failures {
        writeln!(
            err,
            "{}warning:{} dropped routes ending at {} before leg {}: {}",
            palette.warning, palette.reset, failure.airport, failure.step, failure.message
        )?;
    }
    Ok(())
}

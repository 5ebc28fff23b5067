use std::io::Write;

use owo_colors::OwoColorize;
use topicsift_core::{Importance, Topic};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn importance_label(importance: Importance, color: ColorMode) -> String {
    let label = format!("[{}]", importance.as_str().to_uppercase());
    if !color.enabled() {
        return label;
    }
    match importance {
        Importance::High => label.red().bold().to_string(),
        Importance::Medium => label.yellow().to_string(),
        Importance::Low => label.dimmed().to_string(),
    }
}

/// Print the topic list as a human-readable report.
pub fn print_topics(w: &mut dyn Write, topics: &[Topic], color: ColorMode) -> std::io::Result<()> {
    for (i, topic) in topics.iter().enumerate() {
        let label = importance_label(topic.importance, color);
        if color.enabled() {
            writeln!(w, "{}. {} {}", i + 1, topic.title.bold(), label)?;
            writeln!(w, "   {}", format!("({})", topic.id).dimmed())?;
        } else {
            writeln!(w, "{}. {} {}", i + 1, topic.title, label)?;
            writeln!(w, "   ({})", topic.id)?;
        }
        if !topic.goal.is_empty() {
            writeln!(w, "   Goal: {}", topic.goal)?;
        }
        for item in &topic.contents {
            writeln!(w, "   - {}", item)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Print the one-line summary after extraction.
pub fn print_summary(
    w: &mut dyn Write,
    file_name: &str,
    topics: &[Topic],
    color: ColorMode,
) -> std::io::Result<()> {
    let count = |level: Importance| topics.iter().filter(|t| t.importance == level).count();
    let items: usize = topics.iter().map(|t| t.contents.len()).sum();
    let line = format!(
        "{}: {} topics ({} high, {} medium, {} low), {} content items",
        file_name,
        topics.len(),
        count(Importance::High),
        count(Importance::Medium),
        count(Importance::Low),
        items
    );
    if color.enabled() {
        writeln!(w, "{}", line.green())
    } else {
        writeln!(w, "{}", line)
    }
}

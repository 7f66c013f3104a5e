//! Markdown digest renderer
//!
//! Builds the push-message body: a header with the report time, one
//! block per note with counters, signed deltas, averages and markers,
//! an aggregate ideas section, and an archive footer. Pure string
//! assembly; the chart image is attached by the caller.

use crate::analysis::{NoteAnalysis, NoteIdeas, ANOMALY_WINDOW_DAYS};
use crate::storage::types::{DailySnapshot, NoteKey, TIME_FORMAT};
use std::path::Path;

/// Push-message title, fixed across runs
pub const PUSH_TITLE: &str = "📊 Daily Note Report";

/// Render the markdown digest for one day's run.
///
/// `analyses` is expected in snapshot order with one entry per note;
/// `ideas` holds the replication ideas generated this run, matched to
/// notes by title.
pub fn render_digest(
    snapshot: &DailySnapshot,
    analyses: &[NoteAnalysis],
    ideas: &[NoteIdeas],
    archive_path: &Path,
) -> String {
    let mut parts = vec![
        "## 📅 Report time".to_string(),
        snapshot.timestamp.format(TIME_FORMAT).to_string(),
        String::new(),
        "## 📌 Today's notes".to_string(),
    ];

    if analyses.is_empty() {
        parts.push(String::new());
        parts.push("No notes in today's input.".to_string());
    }

    for analysis in analyses {
        parts.push(String::new());
        parts.push(note_heading(analysis));
        parts.push(format!(
            "- 👍 {} ({:+}) ⭐ {} ({:+}) 💬 {} ({:+})",
            analysis.note.likes,
            analysis.delta_likes,
            analysis.note.collects,
            analysis.delta_collects,
            analysis.note.comments,
            analysis.delta_comments,
        ));

        for (window, average) in &analysis.moving_averages {
            parts.push(format!("- avg likes ({}d): {:.1}", window, average));
        }

        if analysis.is_anomalous {
            match analysis.moving_averages.get(&ANOMALY_WINDOW_DAYS) {
                Some(average) => parts.push(format!(
                    "- 🚨 Spike: {} likes vs {:.1} 7-day average",
                    analysis.note.likes, average
                )),
                None => parts.push("- 🚨 Like spike vs the 7-day average".to_string()),
            }
        }

        if let Some(note_ideas) = ideas
            .iter()
            .find(|i| NoteKey::from_title(&i.title).matches(&analysis.note))
        {
            for suggestion in &note_ideas.suggestions {
                parts.push(format!("- 💡 {}", suggestion));
            }
        }
    }

    if !ideas.is_empty() {
        parts.push(String::new());
        parts.push("## 💡 Replication ideas".to_string());
        for note_ideas in ideas {
            parts.push(String::new());
            parts.push(format!("### {}", note_ideas.title));
            for suggestion in &note_ideas.suggestions {
                parts.push(format!("- {}", suggestion));
            }
        }
    }

    parts.push(String::new());
    parts.push(format!("✅ Snapshot archived to {}", archive_path.display()));

    parts.join("\n")
}

fn note_heading(analysis: &NoteAnalysis) -> String {
    let mut heading = format!("### {}", analysis.note.title);
    if let Some(rank) = analysis.rank {
        heading.push_str(&format!(" (#{})", rank));
    }
    if analysis.is_top_of_day() {
        heading.push_str(" 🏆");
    }
    if analysis.is_anomalous {
        heading.push_str(" 🚨");
    }
    heading
}

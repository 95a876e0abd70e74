//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use moments_core::Moment;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single moment
    pub fn print_moment(&self, moment: &Moment) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", moment.id);
                println!("Date:        {}", moment.formatted_timestamp());
                println!(
                    "Emotion:     {} {:.2}",
                    emotion_bar(moment.emotion, 20),
                    moment.emotion
                );
                println!("Photos:      {}", moment.images.len());
                println!();
                println!("{}", moment.description);
            }
            OutputFormat::Json => {
                println!("{}", pretty(&moment_summary(moment)));
            }
            OutputFormat::Quiet => {
                println!("{}", moment.id);
            }
        }
    }

    /// Print a list of moments
    pub fn print_moments(&self, moments: &[Moment]) {
        match self.format {
            OutputFormat::Human => {
                if moments.is_empty() {
                    println!("No moments yet.");
                    return;
                }
                for moment in moments {
                    let photos = if moment.images.is_empty() {
                        String::new()
                    } else {
                        format!(" [{} photo(s)]", moment.images.len())
                    };
                    println!(
                        "{} | {} | {} | {}{}",
                        short_id(moment),
                        moment.timestamp.format("%Y-%m-%d %H:%M"),
                        emotion_bar(moment.emotion, 10),
                        truncate_line(&moment.description, 45),
                        photos
                    );
                }
                println!("\n{} moment(s)", moments.len());
            }
            OutputFormat::Json => {
                let summaries: Vec<_> = moments.iter().map(moment_summary).collect();
                println!("{}", pretty(&serde_json::Value::Array(summaries)));
            }
            OutputFormat::Quiet => {
                for moment in moments {
                    println!("{}", moment.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr (suppressed in quiet mode)
    pub fn warning(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

/// JSON view of a moment without the photo bytes
pub fn moment_summary(moment: &Moment) -> serde_json::Value {
    serde_json::json!({
        "id": moment.id,
        "date": moment.timestamp,
        "description": moment.description,
        "emotion": moment.emotion,
        "image_count": moment.images.len(),
    })
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// First eight characters of the id
pub fn short_id(moment: &Moment) -> String {
    moment.id.to_string()[..8].to_string()
}

/// Text gauge for an emotion score, e.g. `[#####-----]`
///
/// Scores outside [0, 1] fill the gauge to the nearest end.
pub fn emotion_bar(emotion: f64, width: usize) -> String {
    let filled = if emotion.is_finite() {
        (emotion.clamp(0.0, 1.0) * width as f64).round() as usize
    } else {
        0
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}

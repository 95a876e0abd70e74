//! Status command handler

use anyhow::Result;

use moments_core::{Config, MomentStore};

use crate::output::{emotion_bar, Output, OutputFormat};

/// Summary of the journal contents
#[derive(Debug, Default, PartialEq)]
pub struct JournalStats {
    pub moments: usize,
    pub photos: usize,
    pub average_emotion: Option<f64>,
    pub first: Option<String>,
    pub last: Option<String>,
}

impl JournalStats {
    pub fn collect(store: &MomentStore) -> Self {
        let moments = store.moments();
        if moments.is_empty() {
            return Self::default();
        }

        let finite: Vec<f64> = moments
            .iter()
            .map(|m| m.emotion)
            .filter(|e| e.is_finite())
            .collect();
        let average_emotion = if finite.is_empty() {
            None
        } else {
            Some(finite.iter().sum::<f64>() / finite.len() as f64)
        };

        let first = moments.iter().min_by_key(|m| m.timestamp);
        let last = moments.iter().max_by_key(|m| m.timestamp);

        Self {
            moments: moments.len(),
            photos: moments.iter().map(|m| m.images.len()).sum(),
            average_emotion,
            first: first.map(|m| m.formatted_timestamp()),
            last: last.map(|m| m.formatted_timestamp()),
        }
    }
}

/// Show status information
pub fn show(store: &MomentStore, config: &Config, output: &Output) -> Result<()> {
    let stats = JournalStats::collect(store);
    let store_path = config.store_path();
    let store_size = std::fs::metadata(&store_path).map(|m| m.len()).unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "store_path": store_path,
                    "store_size": store_size,
                    "moments": stats.moments,
                    "photos": stats.photos,
                    "average_emotion": stats.average_emotion,
                    "first": stats.first,
                    "last": stats.last,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", stats.moments);
        }
        OutputFormat::Human => {
            println!("Moments Status");
            println!("==============");
            println!();
            println!("Storage:");
            println!("  File: {}", store_path.display());
            println!("  Size: {} bytes", store_size);
            println!();
            println!("Journal:");
            println!("  Moments: {}", stats.moments);
            println!("  Photos:  {}", stats.photos);
            if let Some(avg) = stats.average_emotion {
                println!("  Mood:    {} {:.2}", emotion_bar(avg, 20), avg);
            }
            if let (Some(first), Some(last)) = (&stats.first, &stats.last) {
                println!("  Span:    {} to {}", first, last);
            }
        }
    }

    Ok(())
}

//! Moment command handlers
//!
//! The CLI is the presentation layer: it enforces the non-empty
//! description rule and the [0, 1] emotion range before anything reaches
//! the store.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{bail, Result};
use uuid::Uuid;

use moments_core::{Moment, MomentStore};

use crate::editor::{confirm, edit_description};
use crate::output::{short_id, Output};
use crate::photos::load_photos;

/// Record a new moment
pub fn add(
    store: &mut MomentStore,
    description: Option<String>,
    emotion: f64,
    images: Vec<PathBuf>,
    output: &Output,
) -> Result<()> {
    let description = match description {
        Some(d) => d,
        None => edit_description("")?,
    };
    let description = require_description(&description)?;

    let photos = load_photos(&images, output);
    let moment = store.add(description, photos, emotion);

    output.success(&format!(
        "Added moment {} ({} photo(s))",
        short_id(&moment),
        moment.images.len()
    ));
    Ok(())
}

/// List moments, newest first
pub fn list(store: &MomentStore, limit: Option<usize>, output: &Output) -> Result<()> {
    let mut moments = store.newest_first();
    if let Some(limit) = limit {
        moments.truncate(limit);
    }
    output.print_moments(&moments);
    Ok(())
}

/// Show one moment
pub fn show(store: &MomentStore, id: String, output: &Output) -> Result<()> {
    let id = parse_moment_id(&id, store)?;
    if let Some(moment) = store.get(id) {
        output.print_moment(moment);
    }
    Ok(())
}

/// Changes requested for an existing moment
pub struct EditRequest {
    pub description: Option<String>,
    pub emotion: Option<f64>,
    pub add_images: Vec<PathBuf>,
    pub clear_images: bool,
}

impl EditRequest {
    fn touches_anything(&self) -> bool {
        self.description.is_some()
            || self.emotion.is_some()
            || !self.add_images.is_empty()
            || self.clear_images
    }
}

/// Edit a moment
///
/// Builds the full replacement record from the current one and the
/// requested changes, then hands it to the store. With no changes given
/// the description is opened in the editor.
pub fn edit(
    store: &mut MomentStore,
    id: String,
    request: EditRequest,
    output: &Output,
) -> Result<()> {
    let id = parse_moment_id(&id, store)?;
    let Some(current) = store.get(id) else {
        bail!("No moment found matching: {}", id);
    };

    let replacement = build_replacement(current, &request, output)?;

    if !store.update(&replacement) {
        bail!("Moment {} disappeared before it could be updated", id);
    }

    output.success(&format!("Updated moment {}", short_id(&replacement)));
    Ok(())
}

fn build_replacement(current: &Moment, request: &EditRequest, output: &Output) -> Result<Moment> {
    let mut replacement = current.clone();

    let description = match (&request.description, request.touches_anything()) {
        (Some(d), _) => d.clone(),
        (None, true) => current.description.clone(),
        (None, false) => edit_description(&current.description)?,
    };
    replacement.description = require_description(&description)?.to_string();

    if let Some(emotion) = request.emotion {
        replacement.emotion = emotion;
    }

    if request.clear_images {
        replacement.images.clear();
    }
    replacement
        .images
        .extend(load_photos(&request.add_images, output));

    Ok(replacement)
}

/// Delete one or more moments
pub fn delete(store: &mut MomentStore, ids: Vec<String>, yes: bool, output: &Output) -> Result<()> {
    let mut targets = HashSet::new();
    for id in &ids {
        targets.insert(parse_moment_id(id, store)?);
    }

    if !yes && output.should_prompt() {
        for id in &targets {
            if let Some(moment) = store.get(*id) {
                println!(
                    "Delete: {} - {} {}",
                    short_id(moment),
                    moment.formatted_timestamp(),
                    moment.description.lines().next().unwrap_or("")
                );
            }
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = store.delete_matching(&targets);
    output.success(&format!("Deleted {} moment(s)", removed));
    Ok(())
}

/// Reject blank descriptions, returning the trimmed text
pub fn require_description(description: &str) -> Result<&str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        bail!("Description cannot be empty");
    }
    Ok(trimmed)
}

/// Parse an emotion score from the command line
pub fn parse_emotion(value: &str) -> Result<f64, String> {
    let emotion: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !(0.0..=1.0).contains(&emotion) {
        return Err(format!("emotion must be between 0.0 and 1.0, got {}", emotion));
    }
    Ok(emotion)
}

/// Parse a moment ID (supports full UUID or prefix)
fn parse_moment_id(id: &str, store: &MomentStore) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        if store.get(uuid).is_some() {
            return Ok(uuid);
        }
        bail!("No moment found matching: {}", id);
    }

    let matches: Vec<_> = store
        .moments()
        .iter()
        .filter(|m| m.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No moment found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple moments match '{}':", id);
            for moment in &matches {
                eprintln!("  {} - {}", moment.id, moment.formatted_timestamp());
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use moments_core::MemoryKeyValueStore;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    fn store() -> MomentStore {
        MomentStore::new(MemoryKeyValueStore::new(), "moments")
    }

    #[test]
    fn test_require_description() {
        assert_eq!(require_description("  hello  ").unwrap(), "hello");
        assert!(require_description("").is_err());
        assert!(require_description(" \n\t ").is_err());
    }

    #[test]
    fn test_parse_emotion() {
        assert_eq!(parse_emotion("0.8").unwrap(), 0.8);
        assert_eq!(parse_emotion("0").unwrap(), 0.0);
        assert_eq!(parse_emotion("1").unwrap(), 1.0);
        assert!(parse_emotion("1.01").is_err());
        assert!(parse_emotion("-0.2").is_err());
        assert!(parse_emotion("happy").is_err());
        assert!(parse_emotion("NaN").is_err());
    }

    #[test]
    fn test_add_with_description() {
        let mut store = store();
        add(&mut store, Some("Sunny day".into()), 0.8, Vec::new(), &quiet()).unwrap();

        assert_eq!(store.len(), 1);
        let moment = &store.moments()[0];
        assert_eq!(moment.description, "Sunny day");
        assert_eq!(moment.emotion, 0.8);
        assert!(moment.images.is_empty());
    }

    #[test]
    fn test_add_rejects_blank_description() {
        let mut store = store();
        assert!(add(&mut store, Some("   ".into()), 0.5, Vec::new(), &quiet()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_parse_moment_id_prefix() {
        let mut store = store();
        let moment = store.add("prefix", Vec::new(), 0.5);
        let full = moment.id.to_string();

        assert_eq!(parse_moment_id(&full, &store).unwrap(), moment.id);
        assert_eq!(parse_moment_id(&full[..8], &store).unwrap(), moment.id);
        assert!(parse_moment_id("zzzz", &store).is_err());
        assert!(parse_moment_id(&Uuid::new_v4().to_string(), &store).is_err());
    }

    #[test]
    fn test_edit_replaces_fields() {
        let mut store = store();
        let moment = store.add("before", vec![vec![1]], 0.2);

        let request = EditRequest {
            description: Some("after".into()),
            emotion: Some(0.9),
            add_images: Vec::new(),
            clear_images: true,
        };
        edit(&mut store, moment.id.to_string(), request, &quiet()).unwrap();

        let updated = store.get(moment.id).unwrap();
        assert_eq!(updated.description, "after");
        assert_eq!(updated.emotion, 0.9);
        assert!(updated.images.is_empty());
        assert_eq!(updated.timestamp, moment.timestamp);
    }

    #[test]
    fn test_edit_keeps_description_when_only_emotion_changes() {
        let mut store = store();
        let moment = store.add("unchanged text", Vec::new(), 0.2);

        let request = EditRequest {
            description: None,
            emotion: Some(0.6),
            add_images: Vec::new(),
            clear_images: false,
        };
        edit(&mut store, moment.id.to_string(), request, &quiet()).unwrap();

        let updated = store.get(moment.id).unwrap();
        assert_eq!(updated.description, "unchanged text");
        assert_eq!(updated.emotion, 0.6);
    }

    #[test]
    fn test_delete_with_yes() {
        let mut store = store();
        let keep = store.add("keep", Vec::new(), 0.5);
        let drop_a = store.add("drop a", Vec::new(), 0.5);
        let drop_b = store.add("drop b", Vec::new(), 0.5);

        delete(
            &mut store,
            vec![drop_a.id.to_string(), drop_b.id.to_string()[..8].to_string()],
            true,
            &quiet(),
        )
        .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.moments()[0].id, keep.id);
    }
}

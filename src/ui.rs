// UI layer: the single annotate flow plus the line formats printed for each
// annotation category. Output goes through `impl Write` so tests can capture
// it; the spinner only ever draws on stderr.

use crate::api::{
    AnnotateImageRequest, AnnotateImageResponse, Annotator, BatchAnnotateImagesRequest,
    EntityAnnotation, FaceAnnotation,
};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Read `file`, send it to `annotator` and print every category's results
/// to `out`.
pub fn run<A, W>(file: &Path, annotator: &A, out: &mut W) -> Result<()>
where
    A: Annotator + ?Sized,
    W: Write,
{
    let bytes = std::fs::read(file)
        .with_context(|| format!("failed to read image file {}", file.display()))?;
    debug!("read {} bytes from {}", bytes.len(), file.display());

    let batch: BatchAnnotateImagesRequest = AnnotateImageRequest::for_image(&bytes).into();

    let spinner = spinner("Annotating...")?;
    let result = annotator.annotate(&batch);
    spinner.finish_and_clear();
    let resp = result?;

    let name = file.display().to_string();
    for entry in &resp.responses {
        if let Some(status) = &entry.error {
            match &status.status {
                Some(kind) => bail!(
                    "Annotation failed for {}: {} ({}, code {})",
                    name,
                    status.message,
                    kind,
                    status.code
                ),
                None => bail!(
                    "Annotation failed for {}: {} (code {})",
                    name,
                    status.message,
                    status.code
                ),
            }
        }
        print_response(out, &name, entry)?;
    }
    Ok(())
}

/// Print one image's annotations in the fixed order label, face, logo,
/// landmark, text.
pub fn print_response<W: Write>(
    out: &mut W,
    file: &str,
    resp: &AnnotateImageResponse,
) -> Result<()> {
    print_entities(out, file, &resp.label_annotations, "Label", "label")?;

    if resp.face_annotations.is_empty() {
        writeln!(out, "Not found face: {}", file)?;
    }
    for face in &resp.face_annotations {
        writeln!(out, "{}", face_line(face))?;
    }

    print_entities(out, file, &resp.logo_annotations, "Logo", "logo")?;
    print_entities(out, file, &resp.landmark_annotations, "Landmark", "landmark")?;
    // Text results reuse the "Label" tag.
    print_entities(out, file, &resp.text_annotations, "Label", "text")?;
    Ok(())
}

fn print_entities<W: Write>(
    out: &mut W,
    file: &str,
    annotations: &[EntityAnnotation],
    tag: &str,
    category: &str,
) -> Result<()> {
    if annotations.is_empty() {
        writeln!(out, "Not found {}: {}", category, file)?;
    }
    for ann in annotations {
        writeln!(out, "{}", entity_line(tag, ann))?;
    }
    Ok(())
}

/// `Found MID: <mid>\tScore: <score> \t<tag>: <description>`, score with six
/// decimals.
pub fn entity_line(tag: &str, ann: &EntityAnnotation) -> String {
    format!(
        "Found MID: {}\tScore: {:.6} \t{}: {}",
        ann.mid, ann.score, tag, ann.description
    )
}

pub fn face_line(face: &FaceAnnotation) -> String {
    format!(
        "Found Anger: {}\tJoy: {} \tSorrow: {}, Surprise: {}",
        face.anger_likelihood,
        face.joy_likelihood,
        face.sorrow_likelihood,
        face.surprise_likelihood
    )
}

fn spinner(msg: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

//! Core PDF merging implementation.
//!
//! The first readable input becomes the base document. Every later input is
//! renumbered past the base's highest object id, its objects are moved over,
//! and its pages are hung off the base page tree root in their original order.
//! Inputs that are empty or cannot be decoded are skipped; the merge only
//! fails when nothing at all could be folded in.

use chrono::{DateTime, Local};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};

use crate::context::RunContext;
use crate::discovery::InputFile;
use crate::error::{PdfMailError, Result};
use crate::io::{PdfReader, PdfWriter};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// The document a successful merge wrote.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MergedOutput {
    /// Where the merged PDF lives.
    pub path: PathBuf,
    /// When the run named it.
    pub created_at: DateTime<Local>,
    /// Number of inputs whose pages were folded in.
    pub source_count: usize,
}

impl MergedOutput {
    /// File name of the output.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Why an input contributed no pages.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum SkipReason {
    /// The file was zero bytes long.
    EmptyFile,
    /// The file decoded but holds no pages.
    NoPages,
    /// The file could not be decoded.
    Corrupt(String),
}

/// An input left out of the merge.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedInput {
    /// The input.
    pub file: InputFile,
    /// Why it was left out.
    pub reason: SkipReason,
}

/// Outcome of a successful merge.
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// The output document.
    pub output: MergedOutput,
    /// Pages in the output.
    pub total_pages: usize,
    /// Inputs that contributed nothing.
    pub skipped: Vec<SkippedInput>,
    /// False in dry-run mode, where `output.path` is only the would-be name.
    pub written: bool,
}

/// Name of the merged file for a run started at `at`.
pub fn output_file_name(at: DateTime<Local>) -> String {
    format!("merged_{}.pdf", at.format("%Y%m%d_%H%M%S"))
}

/// PDF merger that combines multiple documents.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    /// Reader for loading PDFs.
    reader: PdfReader,

    /// Writer for the output.
    writer: PdfWriter,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `files`, in order, into a new file inside `merged_dir`.
    ///
    /// Empty and unreadable inputs are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PdfMailError::MergeProducedEmptyOutput`] if no page was
    /// collected (nothing is written then) and [`PdfMailError::FailedToWrite`]
    /// if the output cannot be saved.
    pub async fn merge(
        &self,
        files: &[InputFile],
        merged_dir: &Path,
        ctx: &RunContext<'_>,
    ) -> Result<MergeReport> {
        let mut merged: Option<Document> = None;
        let mut skipped = Vec::new();
        let mut source_count = 0;

        for file in files {
            match self.fold_in(&mut merged, file, ctx).await {
                Ok(pages) => {
                    source_count += 1;
                    ctx.log
                        .info(&format!("Added: {} ({pages} pages)", file.name));
                }
                Err(reason) => {
                    skipped.push(SkippedInput {
                        file: file.clone(),
                        reason,
                    });
                }
            }
        }

        let document = merged.ok_or(PdfMailError::MergeProducedEmptyOutput)?;
        let total_pages = document.get_pages().len();
        if total_pages == 0 {
            return Err(PdfMailError::MergeProducedEmptyOutput);
        }

        let created_at = ctx.clock.now();
        let output = MergedOutput {
            path: merged_dir.join(output_file_name(created_at)),
            created_at,
            source_count,
        };

        if ctx.dry_run {
            return Ok(MergeReport {
                output,
                total_pages,
                skipped,
                written: false,
            });
        }

        let stats = self.writer.save(finish(document), &output.path).await?;
        ctx.log.info(&format!(
            "Merged {source_count} of {} files into {} ({total_pages} pages, {} bytes, {:.2}s)",
            files.len(),
            output.file_name(),
            stats.file_size,
            stats.write_time.as_secs_f64()
        ));

        Ok(MergeReport {
            output,
            total_pages,
            skipped,
            written: true,
        })
    }

    /// Load one input and append its pages. Per-file policy: log and skip.
    async fn fold_in(
        &self,
        merged: &mut Option<Document>,
        file: &InputFile,
        ctx: &RunContext<'_>,
    ) -> std::result::Result<usize, SkipReason> {
        if self.reader.file_size(&file.path).await == Some(0) {
            ctx.log
                .warn(&format!("Skipping empty file: {}", file.name));
            return Err(SkipReason::EmptyFile);
        }

        let corrupt = |err: PdfMailError| {
            ctx.log.error(&format!("{}: {err}", err.kind()));
            SkipReason::Corrupt(err.to_string())
        };

        let loaded = self.reader.load(&file.path).await.map_err(corrupt)?;
        ctx.log.debug(&format!(
            "Loaded {} in {:.2}s",
            file.name,
            loaded.load_time.as_secs_f64()
        ));
        if loaded.page_count == 0 {
            ctx.log
                .warn(&format!("Skipping {}: document has no pages", file.name));
            return Err(SkipReason::NoPages);
        }

        match merged {
            None => {
                page_root(&loaded.document)
                    .map_err(|e| corrupt(PdfMailError::corrupt(file.path.clone(), e.to_string())))?;
                *merged = Some(loaded.document);
            }
            Some(base) => {
                append_document(base, loaded.document)
                    .map_err(|e| corrupt(PdfMailError::corrupt(file.path.clone(), e.to_string())))?;
            }
        }

        Ok(loaded.page_count)
    }
}

/// Object id of the root `Pages` node of `doc`.
fn page_root(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| PdfMailError::other(format!("Failed to get pages reference: {e}")))
}

/// Append every page of `doc` to `merged`, keeping their order.
///
/// `merged` is only touched once `doc` has been fully prepared, so a failure
/// leaves it as it was.
fn append_document(merged: &mut Document, mut doc: Document) -> Result<usize> {
    let root_id = page_root(merged)?;
    // Attributes the base root would hand down to pages hung under it.
    let shadowed: Vec<&[u8]> = {
        let root = merged
            .get_dictionary(root_id)
            .map_err(|e| PdfMailError::other(format!("Failed to get pages object: {e}")))?;
        INHERITABLE.into_iter().filter(|key| root.has(key)).collect()
    };

    doc.renumber_objects_with(merged.max_id + 1);
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for &page_id in &page_ids {
        let inherited = inherited_attributes(&doc, page_id);
        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfMailError::other(format!("Failed to get page object: {e}")))?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        for &key in &shadowed {
            if !page.has(key) {
                let value = default_attribute(key, page);
                page.set(key.to_vec(), value);
            }
        }
        page.set("Parent", root_id);
    }

    merged.objects.extend(doc.objects);
    merged.max_id = merged
        .objects
        .keys()
        .map(|(id, _)| *id)
        .max()
        .unwrap_or(merged.max_id);

    let root = merged
        .get_object_mut(root_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfMailError::other(format!("Failed to get pages object: {e}")))?;
    append_kids(root, &page_ids)?;

    Ok(page_ids.len())
}

/// Attributes `page_id` inherits from its ancestors but does not set itself.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    // Bounded walk: malformed trees can be cyclic.
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if depth > 32 {
            break;
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE {
            let already = page.has(key) || found.iter().any(|(k, _)| k.as_slice() == key);
            if !already && let Ok(value) = node.get(key) {
                found.push((key.to_vec(), value.clone()));
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    found
}

/// Value a page gets for an inheritable `key` its own tree never set.
///
/// `MediaBox` is expected before `CropBox` so the crop falls back to the
/// page's own media box.
fn default_attribute(key: &[u8], page: &Dictionary) -> Object {
    let letter = || Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]);
    match key {
        b"Rotate" => Object::Integer(0),
        b"MediaBox" => letter(),
        b"CropBox" => page.get(b"MediaBox").cloned().unwrap_or_else(|_| letter()),
        _ => Object::Dictionary(Dictionary::new()),
    }
}

/// Push `page_ids` onto a `Pages` node and bump its `Count`.
fn append_kids(root: &mut Dictionary, page_ids: &[ObjectId]) -> Result<()> {
    let kids = root
        .get_mut(b"Kids")
        .and_then(Object::as_array_mut)
        .map_err(|_| PdfMailError::other("Pages dictionary missing Kids array"))?;
    kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));

    let current_count = root.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    root.set("Count", Object::Integer(current_count + page_ids.len() as i64));

    Ok(())
}

/// Drop objects left unreachable by the merge and renumber densely.
fn finish(mut document: Document) -> Document {
    document.prune_objects();
    document.renumber_objects();
    document
}

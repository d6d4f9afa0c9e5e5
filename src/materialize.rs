//! Template tree materialization.
//!
//! Walks the canonical template and produces a fully substituted mirror of it
//! at a destination path.
//!
//! ## Classification
//!
//! Every file is either **text** (substituted) or **binary** (copied
//! byte-for-byte):
//!
//! 1. Known binary extensions (`png`, `woff2`, …) → binary.
//! 2. Known text extensions (`tsx`, `json`, `css`, …) → text.
//! 3. Anything else is sniffed: a NUL byte in the first 8 KiB or invalid
//!    UTF-8 → binary, otherwise text.
//!
//! A file with a text extension that turns out not to be UTF-8 is copied as
//! binary rather than failing the run.
//!
//! ## Output Rules
//!
//! - The destination must be absent or empty. A populated destination is
//!   refused before anything is written; regenerating means targeting a
//!   fresh directory.
//! - Symlinks are followed and written as regular files holding the target's
//!   content. Generated sites never contain links.
//! - Permissions (including the executable bit) are copied from the source.
//! - Names in the exclusion list are skipped at any depth; the generator's
//!   own `sitesmith.toml` is skipped at the template root.
//!
//! ## Parallelism
//!
//! Directories are created up front, then files are processed on the rayon
//! pool. No file depends on another. Written-file records and unresolved
//! tokens are collected through mutex-guarded accumulators. The first I/O
//! error stops the walk; the error carries everything written before it so
//! the caller can clean up.

use crate::config::{SETTINGS_FILENAME, TemplateSettings};
use crate::substitute::{scan_tokens, substitute};
use crate::tokens::TokenMap;
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

const TEXT_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "json", "jsonc", "css", "scss", "sass",
    "less", "html", "htm", "md", "mdx", "txt", "svg", "xml", "yml", "yaml", "toml", "env", "vue",
    "svelte", "astro", "php", "webmanifest", "csv", "sh",
];

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "avif", "ico", "bmp", "tif", "tiff", "woff", "woff2",
    "ttf", "otf", "eot", "pdf", "mp4", "webm", "mov", "mp3", "wav", "ogg", "zip", "gz", "tar",
    "wasm",
];

/// How many leading bytes are inspected when sniffing an unknown file.
const SNIFF_LEN: usize = 8192;

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("template root is not a directory: {0}")]
    SourceNotDirectory(PathBuf),
    #[error("destination already exists and is not empty: {0}")]
    DestinationNotEmpty(PathBuf),
    #[error("cannot traverse template: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl MaterializeError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| MaterializeError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A failed materialization together with whatever was written before it.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct MaterializeFailure {
    pub error: MaterializeError,
    pub partial: Materialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Binary,
}

/// One file written to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    /// Path relative to the destination root.
    pub path: PathBuf,
    pub kind: FileKind,
    pub bytes: u64,
    /// SHA-256 of the written content, hex. Empty when a failed write left
    /// something that could not be hashed.
    pub sha256: String,
}

/// Outcome of a materialization.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Materialized {
    /// Written files, sorted by path.
    pub files: Vec<WrittenFile>,
    /// Unresolved placeholder names per text file (relative path).
    pub unresolved: BTreeMap<PathBuf, BTreeSet<String>>,
}

impl Materialized {
    /// Every unresolved placeholder across all files.
    pub fn unresolved_tokens(&self) -> BTreeSet<String> {
        self.unresolved.values().flatten().cloned().collect()
    }
}

/// Progress notifications, sent as files are written.
#[derive(Debug, Clone)]
pub enum MaterializeEvent {
    Started { files: usize },
    FileWritten {
        path: PathBuf,
        kind: FileKind,
        unresolved: usize,
    },
}

/// Traversal rules for one run.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub exclude: Vec<String>,
    pub text_extensions: Vec<String>,
    pub binary_extensions: Vec<String>,
}

impl WalkOptions {
    pub fn from_settings(settings: &TemplateSettings) -> Self {
        Self {
            exclude: settings.exclude.clone(),
            text_extensions: settings.text_extensions.clone(),
            binary_extensions: settings.binary_extensions.clone(),
        }
    }

    fn classify_by_extension(&self, path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        let matches = |list: &[&str], extra: &[String]| {
            list.contains(&ext.as_str()) || extra.iter().any(|e| e.eq_ignore_ascii_case(&ext))
        };
        if matches(BINARY_EXTENSIONS, &self.binary_extensions) {
            Some(FileKind::Binary)
        } else if matches(TEXT_EXTENSIONS, &self.text_extensions) {
            Some(FileKind::Text)
        } else {
            None
        }
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if entry.depth() == 1 && name == SETTINGS_FILENAME {
            return true;
        }
        self.exclude.iter().any(|e| *e == name)
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::from_settings(&TemplateSettings::default())
    }
}

/// Materialize `source_root` into `dest_root`, substituting text files.
pub fn materialize(
    source_root: &Path,
    dest_root: &Path,
    tokens: &TokenMap,
    options: &WalkOptions,
    progress: Option<Sender<MaterializeEvent>>,
) -> Result<Materialized, MaterializeFailure> {
    let fail = |error| MaterializeFailure {
        error,
        partial: Materialized::default(),
    };

    if !source_root.is_dir() {
        return Err(fail(MaterializeError::SourceNotDirectory(
            source_root.to_path_buf(),
        )));
    }
    if !destination_is_free(dest_root).map_err(|e| fail(MaterializeError::io(dest_root)(e)))? {
        return Err(fail(MaterializeError::DestinationNotEmpty(
            dest_root.to_path_buf(),
        )));
    }

    let (dirs, files) = collect_entries(source_root, options).map_err(fail)?;

    fs::create_dir_all(dest_root).map_err(|e| fail(MaterializeError::io(dest_root)(e)))?;
    for rel in &dirs {
        let target = dest_root.join(rel);
        fs::create_dir_all(&target).map_err(|e| fail(MaterializeError::io(&target)(e)))?;
    }

    if let Some(tx) = &progress {
        let _ = tx.send(MaterializeEvent::Started { files: files.len() });
    }
    tracing::debug!(
        dirs = dirs.len(),
        files = files.len(),
        "materializing template"
    );

    let written = Mutex::new(Vec::with_capacity(files.len()));
    let unresolved = Mutex::new(BTreeMap::new());

    let result = files.par_iter().try_for_each(|rel| {
        let outcome = match materialize_file(source_root, dest_root, rel, tokens, options) {
            Ok(outcome) => outcome,
            Err(FileFailure { error, written: Some(file) }) => {
                lock(&written).push(file);
                return Err(error);
            }
            Err(FileFailure { error, written: None }) => return Err(error),
        };
        tracing::debug!(
            path = %rel.display(),
            kind = ?outcome.file.kind,
            unresolved = outcome.unresolved.len(),
            "wrote file"
        );
        if let Some(tx) = &progress {
            let _ = tx.send(MaterializeEvent::FileWritten {
                path: rel.clone(),
                kind: outcome.file.kind,
                unresolved: outcome.unresolved.len(),
            });
        }
        if !outcome.unresolved.is_empty() {
            lock(&unresolved).insert(rel.clone(), outcome.unresolved);
        }
        lock(&written).push(outcome.file);
        Ok(())
    });

    let mut files_written = written.into_inner().unwrap_or_else(|e| e.into_inner());
    files_written.sort_by(|a, b| a.path.cmp(&b.path));
    let materialized = Materialized {
        files: files_written,
        unresolved: unresolved.into_inner().unwrap_or_else(|e| e.into_inner()),
    };

    match result {
        Ok(()) => Ok(materialized),
        Err(error) => Err(MaterializeFailure {
            error,
            partial: materialized,
        }),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// True when `dest` does not exist or is an empty directory.
fn destination_is_free(dest: &Path) -> std::io::Result<bool> {
    if !dest.exists() {
        return Ok(true);
    }
    if !dest.is_dir() {
        return Ok(false);
    }
    Ok(fs::read_dir(dest)?.next().is_none())
}

/// Relative directory and file paths under `root`, in name order.
fn collect_entries(
    root: &Path,
    options: &WalkOptions,
) -> Result<(Vec<PathBuf>, Vec<PathBuf>), MaterializeError> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !options.is_excluded(e));
    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.path().to_path_buf());
        if entry.file_type().is_dir() {
            dirs.push(rel);
        } else {
            files.push(rel);
        }
    }
    Ok((dirs, files))
}

struct FileOutcome {
    file: WrittenFile,
    unresolved: BTreeSet<String>,
}

/// A per-file error, with the destination entry when one was left on disk.
struct FileFailure {
    error: MaterializeError,
    written: Option<WrittenFile>,
}

impl From<MaterializeError> for FileFailure {
    fn from(error: MaterializeError) -> Self {
        Self {
            error,
            written: None,
        }
    }
}

fn materialize_file(
    source_root: &Path,
    dest_root: &Path,
    rel: &Path,
    tokens: &TokenMap,
    options: &WalkOptions,
) -> Result<FileOutcome, FileFailure> {
    let src = source_root.join(rel);
    let dest = dest_root.join(rel);

    let bytes = fs::read(&src).map_err(MaterializeError::io(&src))?;
    let permissions = fs::metadata(&src)
        .map_err(MaterializeError::io(&src))?
        .permissions();

    let kind = options
        .classify_by_extension(rel)
        .unwrap_or_else(|| sniff(&bytes));

    let (kind, output, unresolved) = match kind {
        FileKind::Text => match String::from_utf8(bytes) {
            Ok(text) => {
                let sub = substitute(&text, tokens);
                (FileKind::Text, sub.content.into_bytes(), sub.unresolved)
            }
            Err(e) => (FileKind::Binary, e.into_bytes(), BTreeSet::new()),
        },
        FileKind::Binary => (FileKind::Binary, bytes, BTreeSet::new()),
    };

    let file = write_output(&dest, rel, kind, &output, permissions)?;
    Ok(FileOutcome { file, unresolved })
}

/// Write `output` to `dest` and apply `permissions`.
///
/// A failure after `dest` came into existence still reports the entry, as
/// found on disk, so the caller's file list matches what was left behind.
fn write_output(
    dest: &Path,
    rel: &Path,
    kind: FileKind,
    output: &[u8],
    permissions: fs::Permissions,
) -> Result<WrittenFile, FileFailure> {
    if let Err(e) = fs::write(dest, output) {
        return Err(FileFailure {
            error: MaterializeError::io(dest)(e),
            written: on_disk(dest, rel, kind),
        });
    }
    let file = WrittenFile {
        path: rel.to_path_buf(),
        kind,
        bytes: output.len() as u64,
        sha256: format!("{:x}", Sha256::digest(output)),
    };
    if let Err(e) = fs::set_permissions(dest, permissions) {
        return Err(FileFailure {
            error: MaterializeError::io(dest)(e),
            written: Some(file),
        });
    }
    Ok(file)
}

/// Describe whatever a failed write left at `dest`.
fn on_disk(dest: &Path, rel: &Path, kind: FileKind) -> Option<WrittenFile> {
    let metadata = fs::metadata(dest).ok()?;
    let sha256 = if metadata.is_file() {
        hash_file(dest).unwrap_or_default()
    } else {
        String::new()
    };
    Some(WrittenFile {
        path: rel.to_path_buf(),
        kind,
        bytes: metadata.len(),
        sha256,
    })
}

/// Classify content with no recognised extension.
fn sniff(bytes: &[u8]) -> FileKind {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    if head.contains(&0) || std::str::from_utf8(bytes).is_err() {
        FileKind::Binary
    } else {
        FileKind::Text
    }
}

/// Placeholder names referenced by each text file of a template, without
/// writing anything. Files with no placeholders are omitted.
pub fn scan_template(
    source_root: &Path,
    options: &WalkOptions,
) -> Result<BTreeMap<PathBuf, BTreeSet<String>>, MaterializeError> {
    if !source_root.is_dir() {
        return Err(MaterializeError::SourceNotDirectory(
            source_root.to_path_buf(),
        ));
    }
    let (_, files) = collect_entries(source_root, options)?;
    let mut found = BTreeMap::new();
    for rel in files {
        let path = source_root.join(&rel);
        let bytes = fs::read(&path).map_err(MaterializeError::io(&path))?;
        let kind = options
            .classify_by_extension(&rel)
            .unwrap_or_else(|| sniff(&bytes));
        if kind == FileKind::Binary {
            continue;
        }
        if let Ok(text) = std::str::from_utf8(&bytes) {
            let names = scan_tokens(text);
            if !names.is_empty() {
                found.insert(rel, names);
            }
        }
    }
    Ok(found)
}

/// SHA-256 of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

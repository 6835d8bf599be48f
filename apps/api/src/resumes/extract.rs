//! Text Extractor — plain text from uploaded PDF and word-processor files.

use std::path::Path;

use docx_rs::{
    DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild, Table,
    TableCellContent, TableChild, TableRowChild,
};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unable to extract text from PDF: {0}")]
    Pdf(String),

    #[error("Unable to extract text from DOCX: {0}")]
    Docx(String),

    #[error("Unsupported file type. Only PDF and DOCX are allowed.")]
    UnsupportedType,

    #[error("The uploaded file contains no text.")]
    NoText,

    #[error("Unable to extract text: the document could not be parsed")]
    Unreadable,
}

/// Extractor selected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    WordProcessor,
}

impl DocumentKind {
    /// `doc` is routed to the DOCX reader; legacy binary files fail there.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" | "doc" => Some(DocumentKind::WordProcessor),
            _ => None,
        }
    }
}

/// Lower-cased text after the last `.`, or `None` when the name has no dot.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// Reads `path` and returns its text. Blocking; call from `spawn_blocking`.
///
/// An all-whitespace result is reported as `ExtractError::NoText`, separate from
/// open/parse failures.
pub fn extract_text(path: &Path, kind: DocumentKind) -> Result<String, ExtractError> {
    let text = match kind {
        DocumentKind::Pdf => {
            info!(path = %path.display(), "Extracting text from PDF");
            extract_pdf(path)
        }
        DocumentKind::WordProcessor => {
            info!(path = %path.display(), "Extracting text from DOCX");
            extract_docx(path)
        }
    }
    .inspect_err(|e| error!(path = %path.display(), "Failed to read document: {e}"))?;

    if text.trim().is_empty() {
        return Err(ExtractError::NoText);
    }
    Ok(text)
}

fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    let text =
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(join_pages(&text))
}

/// Pages arrive separated by form feeds; keep the non-empty ones, one per line.
fn join_pages(text: &str) -> String {
    text.split('\x0C')
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_docx(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Docx(e.to_string()))?;
    docx_text(&bytes)
}

/// Non-empty paragraphs first, then non-empty table cells, one per line.
pub(crate) fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut paragraphs = Vec::new();
    let mut cells = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(para) => paragraphs.push(paragraph_text(para)),
            DocumentChild::Table(table) => collect_cells(table, &mut cells),
            _ => {}
        }
    }

    Ok(paragraphs
        .into_iter()
        .chain(cells)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    push_paragraph_children(&para.children, &mut text);
    text
}

/// Runs nested in hyperlinks and tracked insertions count as paragraph text.
fn push_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, out),
            ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let InsertChild::Run(run) = child {
                        push_run(run, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// Blank paragraphs inside a cell stay as blank lines; only fully empty cells are skipped.
fn collect_cells(table: &Table, out: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            let text = cell
                .children
                .iter()
                .filter_map(|content| match content {
                    TableCellContent::Paragraph(para) => Some(paragraph_text(para)),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n");
            out.push(text);
        }
    }
}

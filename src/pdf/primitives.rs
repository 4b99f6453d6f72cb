//! Page-level PDF primitives built on `lopdf`
//!
//! Both page removal and merge rebuild a fresh document from a selection of
//! source pages. Pages are re-parented under one new page tree, so any
//! attribute they inherited from the old tree is copied onto the page first.

use super::PdfError;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// The header may be preceded by junk, but only within the first KiB
const HEADER_WINDOW: usize = 1024;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in hostile files
const MAX_TREE_DEPTH: usize = 64;

/// Serialized document plus the number of pages it holds
#[derive(Debug)]
pub struct Assembled {
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

pub fn has_pdf_header(content: &[u8]) -> bool {
    let window = &content[..content.len().min(HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Parse `content`. A document may legitimately have no pages once its
/// last page has been removed.
pub fn parse(content: &[u8]) -> Result<Document, PdfError> {
    if !has_pdf_header(content) {
        return Err(PdfError::NotPdf(
            "Please send a valid PDF document.".to_string(),
        ));
    }
    Ok(Document::load_mem(content)?)
}

pub fn page_count(content: &[u8]) -> Result<u32, PdfError> {
    let doc = parse(content)?;
    count_pages(&doc)
}

/// New document with every page except `page` (1-indexed), order preserved
pub fn remove_page(content: &[u8], page: u32) -> Result<Assembled, PdfError> {
    let doc = parse(content)?;
    let page_count = count_pages(&doc)?;
    if page == 0 || page > page_count {
        return Err(PdfError::OutOfRange { page, page_count });
    }
    let keep: Vec<u32> = (1..=page_count).filter(|&n| n != page).collect();
    assemble(vec![(doc, keep)])
}

/// Concatenate `sources` in order, each keeping its own page order
pub fn merge(sources: &[Vec<u8>]) -> Result<Assembled, PdfError> {
    if sources.len() < 2 {
        return Err(PdfError::TooFewDocuments {
            count: sources.len(),
        });
    }
    let mut parts = Vec::with_capacity(sources.len());
    for content in sources {
        let doc = parse(content)?;
        let all: Vec<u32> = (1..=count_pages(&doc)?).collect();
        parts.push((doc, all));
    }
    assemble(parts)
}

fn count_pages(doc: &Document) -> Result<u32, PdfError> {
    u32::try_from(doc.get_pages().len())
        .map_err(|_| PdfError::Malformed("too many pages".to_string()))
}

/// Build one document from `(source, page numbers)` pairs, in order
fn assemble(parts: Vec<(Document, Vec<u32>)>) -> Result<Assembled, PdfError> {
    let mut output = Document::with_version("1.5");
    let mut next_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();

    for (mut doc, selected) in parts {
        // Give every source a disjoint id range before mixing objects
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        let page_ids = doc.get_pages();
        for number in selected {
            let page_id = *page_ids.get(&number).ok_or_else(|| {
                PdfError::Malformed(format!("page {number} missing from page tree"))
            })?;
            pages.push((page_id, flattened_page(&doc, page_id)?));
        }

        for (id, object) in doc.objects {
            match object.type_name().unwrap_or("") {
                "Catalog" | "Pages" | "Page" | "Outlines" | "Outline" => {}
                _ => {
                    output.objects.insert(id, object);
                }
            }
        }
    }

    output.max_id = next_id - 1;
    let pages_id = output.new_object_id();
    let page_count = u32::try_from(pages.len())
        .map_err(|_| PdfError::Malformed("too many pages".to_string()))?;

    let mut kids = Vec::with_capacity(pages.len());
    for (id, mut page) in pages {
        page.set("Parent", Object::Reference(pages_id));
        output.objects.insert(id, Object::Dictionary(page));
        kids.push(Object::Reference(id));
    }

    output.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(i64::from(page_count))),
        ])),
    );
    let catalog_id = output.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    output.trailer.set("Root", Object::Reference(catalog_id));

    // Drops whatever only the removed pages referenced
    output.prune_objects();
    output.renumber_objects();

    let mut bytes = Vec::new();
    output
        .save_to(&mut bytes)
        .map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(Assembled { bytes, page_count })
}

/// Copy of the page dictionary with inherited attributes made explicit
fn flattened_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary, PdfError> {
    let mut page = doc.get_dictionary(page_id)?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    let mut depth = 0;
    while let Some(parent_id) = parent {
        if depth == MAX_TREE_DEPTH {
            return Err(PdfError::Malformed("page tree is too deep".to_string()));
        }
        let Ok(node) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    Ok(page)
}

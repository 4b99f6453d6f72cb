//! In-process PDF fixtures for tests
//!
//! Every page draws its marker string, so tests can read back which
//! original pages ended up in a result and in what order.

use lopdf::{Dictionary, Document, Object, Stream};

/// Build a PDF with one page per marker. `Resources` and `MediaBox` live on
/// the page tree node so pages depend on inheritance.
pub fn sample_pdf(markers: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let mut kids = Vec::with_capacity(markers.len());
    for marker in markers {
        let content = format!("BT /F1 24 Tf 72 720 Td ({marker}) Tj ET");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let count = i64::try_from(kids.len()).unwrap();
    let fonts = Dictionary::from_iter([("F1", Object::Reference(font_id))]);
    let resources = Dictionary::from_iter([("Font", Object::Dictionary(fonts))]);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
            ("Resources", Object::Dictionary(resources)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
        ])),
    );

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output).unwrap();
    output
}

/// Marker of every page, in page order
pub fn page_markers(content: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(content).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let raw = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&raw).into_owned();
            text.split_once('(')
                .and_then(|(_, rest)| rest.split_once(')'))
                .map(|(marker, _)| marker.to_string())
                .unwrap_or_default()
        })
        .collect()
}

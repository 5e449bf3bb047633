//! Shared helpers for integration tests

#![allow(dead_code, unused_imports)]

pub use pdf_compare_store::pdf::testing::{fake_encrypted_pdf, fake_pdf, FakeBackend};

/// Build a small but real PDF with one Helvetica text line per page.
/// An empty string produces a page with no text.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let page_count = pages.len();
    // 1: catalog, 2: pages, 3: font, then (page, content) pairs
    let object_count = 3 + 2 * page_count;
    let page_id = |i: usize| 4 + 2 * i;
    let content_id = |i: usize| 5 + 2 * i;

    let mut objects: Vec<String> = Vec::with_capacity(object_count);
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", page_id(i))).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        page_count
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    for (i, text) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            content_id(i)
        ));
        let stream = if text.is_empty() {
            String::new()
        } else {
            let escaped = text
                .replace('\\', "\\\\")
                .replace('(', "\\(")
                .replace(')', "\\)");
            format!("BT /F1 24 Tf 72 700 Td ({}) Tj ET", escaped)
        };
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(object_count);
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", object_count + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            object_count + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

/// Password-protect a PDF with qpdf (AES-256)
pub fn encrypt_pdf(data: &[u8], password: &str) -> Vec<u8> {
    use qpdf::{EncryptionParams, EncryptionParamsR6, PrintPermission, QPdf};

    let qpdf = QPdf::read_from_memory(data).expect("Failed to read PDF with qpdf");
    let encryption = EncryptionParams::R6(EncryptionParamsR6 {
        user_password: password.to_string(),
        owner_password: password.to_string(),
        allow_accessibility: true,
        allow_extract: true,
        allow_assemble: true,
        allow_annotate_and_form: true,
        allow_form_filling: true,
        allow_modify_other: true,
        allow_print: PrintPermission::Full,
        encrypt_metadata: true,
    });

    let mut writer = qpdf.writer();
    writer
        .preserve_encryption(false)
        .encryption_params(encryption);
    writer.write_to_memory().expect("Failed to encrypt PDF")
}

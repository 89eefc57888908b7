#![no_main]

//! Fuzz target for bridging diverged replicas.
//!
//! Two replicas share a prefix of edits, then each applies its own edits.
//! Bridging either log onto the other must reproduce the other's text, and
//! captured offsets must always land inside the target document.

use libfuzzer_sys::fuzz_target;
use ot_rebase::core::Operation;
use ot_rebase::doc::{Document, MutableDocument, TextDocument};
use ot_rebase::rebase::try_bridge;

fn play(doc: &mut TextDocument, chunk: &[u8]) {
    let len = doc.len();
    let at = chunk[0] as usize % (len + 1);
    let delete = (chunk[1] as usize % 3).min(len - at);
    let deleted: String = doc.text().chars().skip(at).take(delete).collect();
    let inserted: String = "xyz".chars().take(chunk[2] as usize % 4).collect();
    let operation = Operation::replace(at, &deleted, &inserted, len);
    doc.edit(operation);
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let shared = data[0] as usize % 8;
    let mut chunks = data[1..].chunks_exact(3);

    let mut left = TextDocument::with_text("seed");
    for chunk in chunks.by_ref().take(shared) {
        play(&mut left, chunk);
    }
    let mut right = left.clone();
    let cursor = left.capture_offset(left.len(), left.timestamp()).unwrap();

    for (n, chunk) in chunks.enumerate() {
        if n % 2 == 0 {
            play(&mut left, chunk);
        } else {
            play(&mut right, chunk);
        }
    }

    let forward = try_bridge(left.edits(), right.edits()).unwrap();
    assert_eq!(forward.apply(left.text()), right.text());
    let backward = try_bridge(right.edits(), left.edits()).unwrap();
    assert_eq!(backward.apply(right.text()), left.text());

    let offset = cursor.rebase_or_none(&right).unwrap();
    assert!(offset <= right.len());
});

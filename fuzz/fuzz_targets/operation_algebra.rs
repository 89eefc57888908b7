#![no_main]

//! Fuzz target for the operation algebra.
//!
//! Two operations are decoded against the same base text. Composition must
//! agree with sequential application, inversion must undo, and transforming
//! each operation past the other must converge.

use libfuzzer_sys::fuzz_target;
use ot_rebase::core::{Op, Operation, Sticky};

/// Decodes an operation over `text`. Each 2-byte chunk is one component:
/// the first byte picks retain, delete or insert, the second its size.
fn decode(text: &str, data: &[u8]) -> Operation {
    let chars: Vec<char> = text.chars().collect();
    let mut at = 0;
    let mut ops = Vec::new();
    for chunk in data.chunks_exact(2) {
        let n = (chunk[1] % 5) as usize;
        match chunk[0] % 3 {
            0 => {
                let n = n.min(chars.len() - at);
                if n > 0 {
                    ops.push(Op::Retain(n));
                    at += n;
                }
            }
            1 => {
                let n = n.min(chars.len() - at);
                if n > 0 {
                    ops.push(Op::Replace {
                        delete: chars[at..at + n].iter().collect(),
                        insert: String::new(),
                    });
                    at += n;
                }
            }
            _ => ops.push(Op::Replace {
                delete: String::new(),
                insert: std::iter::repeat_n('ż', n.max(1)).collect(),
            }),
        }
    }
    if at < chars.len() {
        ops.push(Op::Retain(chars.len() - at));
    }
    Operation::from_ops(ops)
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let text: String = "abcdefghijklmnop".chars().take(data[0] as usize % 16).collect();
    let rest = &data[2..];
    let (first, second) = rest.split_at(data[1] as usize % (rest.len() + 1));

    let a = decode(&text, first);
    let b = decode(&text, second);

    let after_a = a.apply(&text);
    assert_eq!(a.invert().apply(&after_a), text);

    let a_then_b = decode(&after_a, second);
    assert_eq!(
        a.compose(&a_then_b).apply(&text),
        a_then_b.apply(&after_a)
    );

    let left = a.transform(&b, Sticky::Left).apply(&b.apply(&text));
    let right = b.transform(&a, Sticky::Right).apply(&after_a);
    assert_eq!(left, right);

    assert_eq!(a.normalize_hard().apply(&text), after_a);
});

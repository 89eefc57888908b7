//! A naive, simple oracle implementation for differential testing.
//!
//! Text is a flat tape of chars with position markers sitting between them.
//! Every edit rewrites the tape directly, so marker movement follows from
//! where the markers physically end up rather than from any offset
//! arithmetic.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Collapses to the start of replaced text.
    Left,
    /// Collapses to the end of replaced text.
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Char(char),
    Marker { id: usize, side: Side },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NaiveText {
    slots: Vec<Slot>,
    markers: usize,
    history: Vec<String>,
}

impl NaiveText {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            markers: 0,
            history: vec![String::new()],
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut naive = Self::new();
        naive.replace(0, 0, text);
        naive
    }

    pub fn text(&self) -> String {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Char(ch) => Some(*ch),
                Slot::Marker { .. } => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Char(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of edits applied so far.
    pub fn version(&self) -> usize {
        self.history.len() - 1
    }

    /// Text as it was after `version` edits.
    pub fn text_at(&self, version: usize) -> &str {
        &self.history[version]
    }

    /// Places a marker in the gap before char `offset`.
    pub fn add_marker(&mut self, offset: usize, side: Side) -> usize {
        let id = self.markers;
        self.markers += 1;
        let index = self.gap_start(offset);
        self.slots.insert(index, Slot::Marker { id, side });
        id
    }

    pub fn marker(&self, id: usize) -> Option<usize> {
        let mut chars = 0;
        for slot in &self.slots {
            match slot {
                Slot::Char(_) => chars += 1,
                Slot::Marker { id: marker, .. } if *marker == id => return Some(chars),
                Slot::Marker { .. } => {}
            }
        }
        None
    }

    /// Replaces `delete_len` chars at `at` with `insert`.
    ///
    /// Markers in the gap at `at` or between deleted chars are swept up and
    /// put back on their side of the inserted text. Markers in the gap right
    /// after the last deleted char stay after the edit.
    pub fn replace(&mut self, at: usize, delete_len: usize, insert: &str) {
        assert!(at + delete_len <= self.len(), "replace out of bounds");
        let start = self.gap_start(at);
        let mut end = start;
        let mut deleted = 0;
        while end < self.slots.len() {
            match self.slots[end] {
                Slot::Char(_) if deleted == delete_len => break,
                Slot::Char(_) => deleted += 1,
                Slot::Marker { .. } if deleted == delete_len && delete_len > 0 => break,
                Slot::Marker { .. } => {}
            }
            end += 1;
        }

        let swept: Vec<Slot> = self.slots.drain(start..end).collect();
        let mut replacement: Vec<Slot> = swept
            .iter()
            .filter(|slot| matches!(slot, Slot::Marker { side: Side::Left, .. }))
            .cloned()
            .collect();
        replacement.extend(insert.chars().map(Slot::Char));
        replacement.extend(
            swept
                .iter()
                .filter(|slot| matches!(slot, Slot::Marker { side: Side::Right, .. }))
                .cloned(),
        );
        self.slots.splice(start..start, replacement);
        self.history.push(self.text());
    }

    /// Slot index of the first slot in the gap before char `offset`.
    fn gap_start(&self, offset: usize) -> usize {
        let mut chars = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            if chars == offset {
                return index;
            }
            if let Slot::Char(_) = slot {
                chars += 1;
            }
        }
        assert_eq!(chars, offset, "offset past end of text");
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_follow_their_side() {
        let mut text = NaiveText::from_text("abc");
        let left = text.add_marker(1, Side::Left);
        let right = text.add_marker(1, Side::Right);
        text.replace(1, 0, "XY");
        assert_eq!(text.text(), "aXYbc");
        assert_eq!(text.marker(left), Some(1));
        assert_eq!(text.marker(right), Some(3));
    }

    #[test]
    fn marker_after_deletion_stays_after() {
        let mut text = NaiveText::from_text("abcd");
        let marker = text.add_marker(3, Side::Left);
        text.replace(1, 2, "Z");
        assert_eq!(text.text(), "aZd");
        assert_eq!(text.marker(marker), Some(2));
        assert_eq!(text.text_at(1), "abcd");
        assert_eq!(text.version(), 2);
    }
}

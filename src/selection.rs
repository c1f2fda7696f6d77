use unicode_segmentation::UnicodeSegmentation;

/// Position inside the visible page: line offset and grapheme column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextPoint {
    pub line: usize,
    pub column: usize,
}

impl TextPoint {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Text picked out of a page along with the page line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedText {
    pub text: String,
    pub line_offset: usize,
}

/// An in-progress selection between an anchor and a moving head.
/// Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    anchor: TextPoint,
    head: TextPoint,
}

impl Selection {
    pub fn new(at: TextPoint) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    pub fn head(&self) -> TextPoint {
        self.head
    }

    pub fn extend_to(&mut self, point: TextPoint) {
        self.head = point;
    }

    pub fn ordered(&self) -> (TextPoint, TextPoint) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    pub fn contains(&self, point: TextPoint) -> bool {
        let (start, end) = self.ordered();
        start <= point && point <= end
    }

    /// Moves the head by whole lines and graphemes, staying inside `lines`.
    pub fn move_head(&mut self, lines: &[String], dy: isize, dx: isize) {
        if lines.is_empty() {
            return;
        }
        let line = self
            .head
            .line
            .saturating_add_signed(dy)
            .min(lines.len() - 1);
        let width = lines[line].graphemes(true).count();
        let column = self
            .head
            .column
            .saturating_add_signed(dx)
            .min(width.saturating_sub(1));
        self.head = TextPoint::new(line, column);
    }

    /// Extracts the selected text from the page lines. Lines beyond the page
    /// and columns beyond a line's end are clipped. Leading lines that add
    /// only whitespace are dropped, so `line_offset` points at the first line
    /// with selected words.
    pub fn extract(&self, lines: &[String]) -> Option<SelectedText> {
        let (start, end) = self.ordered();
        if start.line >= lines.len() {
            return None;
        }
        let last_line = end.line.min(lines.len() - 1);

        let mut parts = Vec::new();
        for (offset, line) in lines[start.line..=last_line].iter().enumerate() {
            let index = start.line + offset;
            let from = if index == start.line { start.column } else { 0 };
            let to = if index == end.line {
                end.column.saturating_add(1)
            } else {
                usize::MAX
            };
            let piece: String = line
                .graphemes(true)
                .skip(from)
                .take(to.saturating_sub(from))
                .collect();
            parts.push((index, piece));
        }

        let first = parts
            .iter()
            .position(|(_, piece)| !piece.trim().is_empty())
            .unwrap_or(0);
        let line_offset = parts[first].0;
        let text = parts[first..]
            .iter()
            .map(|(_, piece)| piece.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Some(SelectedText { text, line_offset })
    }
}

use miette::SourceSpan;

/// Source range attached to every syntax node. Lines and columns are
/// 1-based; `start_pos`/`end_pos` are byte offsets into the source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub start_pos: usize,
    pub end_pos: usize,
}

impl Span {
    pub fn new(
        (start_line, start_column): (usize, usize),
        (end_line, end_column): (usize, usize),
        (start_pos, end_pos): (usize, usize),
    ) -> Self {
        Self {
            start_line,
            end_line,
            start_column,
            end_column,
            start_pos,
            end_pos,
        }
    }

    pub fn len(&self) -> usize {
        self.end_pos.saturating_sub(self.start_pos)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        let (start_line, start_column) = (self.start_line, self.start_column)
            .min((other.start_line, other.start_column));
        let (end_line, end_column) =
            (self.end_line, self.end_column).max((other.end_line, other.end_column));
        Span {
            start_line,
            end_line,
            start_column,
            end_column,
            start_pos: self.start_pos.min(other.start_pos),
            end_pos: self.end_pos.max(other.end_pos),
        }
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        (span.start_pos, span.len()).into()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

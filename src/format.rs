/// Byte-level layout of the input: `<key><delimiter><value><separator>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat {
    pub delimiter: u8,
    pub line_separator: u8,
    /// Lines starting with this byte are ignored. `None` disables comments.
    pub comment_marker: Option<u8>,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            line_separator: b'\n',
            comment_marker: Some(b'#'),
        }
    }
}

impl LineFormat {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_line_separator(mut self, separator: u8) -> Self {
        self.line_separator = separator;
        self
    }

    pub fn with_comment_marker(mut self, marker: Option<u8>) -> Self {
        self.comment_marker = marker;
        self
    }

    #[inline]
    pub(crate) fn is_comment(&self, line: &[u8]) -> bool {
        match (self.comment_marker, line.first()) {
            (Some(marker), Some(&first)) => marker == first,
            _ => false,
        }
    }
}

/// One entry mapping an assembled address back to the source line that
/// produced it, used by tools that want to annotate disassembly or runtime
/// panics with original source positions.
#[derive(Clone, Debug)]
pub struct SourceMapItem {
    pub section: String,
    pub offset: u32,
    pub row: usize,
    pub col: usize,
}

#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    pub items: Vec<SourceMapItem>,
}

impl SourceMap {
    pub fn push(&mut self, section: impl Into<String>, offset: u32, row: usize, col: usize) {
        self.items.push(SourceMapItem {
            section: section.into(),
            offset,
            row,
            col,
        });
    }

    pub fn lookup(&self, section: &str, offset: u32) -> Option<&SourceMapItem> {
        self.items
            .iter()
            .filter(|i| i.section == section && i.offset <= offset)
            .max_by_key(|i| i.offset)
    }

    /// Renders one line per entry as `section+offset row:col`, in the order
    /// entries were pushed. Meant for a sidecar `.map` file next to an
    /// assembled image, not for round-tripping back into a `SourceMap`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            out.push_str(&format!(
                "{}+0x{:x} {}:{}\n",
                item.section, item.offset, item.row, item.col
            ));
        }
        out
    }
}

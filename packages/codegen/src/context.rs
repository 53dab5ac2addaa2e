use std::cell::RefCell;
use std::rc::Rc;

/// Output buffer with indentation tracking, shared by every emitter
#[derive(Debug, Clone)]
pub struct CodeWriter {
    buffer: Rc<RefCell<String>>,
    indent_level: Rc<RefCell<usize>>,
    indent_unit: &'static str,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::with_indent("  ")
    }

    pub fn with_indent(indent_unit: &'static str) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(String::new())),
            indent_level: Rc::new(RefCell::new(0)),
            indent_unit,
        }
    }

    pub fn add(&self, text: &str) {
        self.buffer.borrow_mut().push_str(text);
    }

    pub fn add_line(&self, text: &str) {
        if text.is_empty() {
            self.add("\n");
            return;
        }
        self.add_indented(text);
        self.add("\n");
    }

    /// Add several lines; a line ending in `{`, `[` or `(` indents the
    /// following lines until the matching closer
    pub fn add_block<S: AsRef<str>>(&self, lines: &[S]) {
        for line in lines {
            let line = line.as_ref().trim();
            if line.starts_with(['}', ']', ')']) {
                self.dedent();
            }
            self.add_line(line);
            if line.ends_with(['{', '[', '(']) {
                self.indent();
            }
        }
    }

    pub fn add_indented(&self, text: &str) {
        let indent = self.indent_unit.repeat(*self.indent_level.borrow());
        let mut buffer = self.buffer.borrow_mut();
        buffer.push_str(&indent);
        buffer.push_str(text);
    }

    pub fn indent(&self) {
        *self.indent_level.borrow_mut() += 1;
    }

    pub fn dedent(&self) {
        let mut level = self.indent_level.borrow_mut();
        if *level > 0 {
            *level -= 1;
        }
    }

    pub fn get_output(&self) -> String {
        self.buffer.borrow().clone()
    }

    /// Writer with its own buffer that shares this one's indentation
    pub fn with_new_buffer(&self) -> Self {
        Self {
            buffer: Rc::new(RefCell::new(String::new())),
            indent_level: self.indent_level.clone(),
            indent_unit: self.indent_unit,
        }
    }

    pub fn merge_buffer(&self, other: &CodeWriter) {
        let other = other.buffer.borrow().clone();
        self.buffer.borrow_mut().push_str(&other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_indentation() {
        let writer = CodeWriter::new();
        writer.add_block(&["useEffect(() => {", "load();", "}, [value]);"]);
        assert_eq!(
            writer.get_output(),
            "useEffect(() => {\n  load();\n}, [value]);\n"
        );
    }

    #[test]
    fn test_merge_shares_indent() {
        let writer = CodeWriter::new();
        writer.indent();
        let inner = writer.with_new_buffer();
        inner.add_line("return null;");
        writer.merge_buffer(&inner);
        assert_eq!(writer.get_output(), "  return null;\n");
    }
}

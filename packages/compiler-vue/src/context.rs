use voltron_codegen::{CodeWriter, PageIr};

/// Options for Vue compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Emit `<script setup lang="ts">` with typed refs
    pub use_typescript: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            use_typescript: true,
        }
    }
}

/// Compilation context for one single-file component
pub struct CompilerContext<'a> {
    pub writer: CodeWriter,
    pub ir: &'a PageIr,
    pub options: CompileOptions,
}

impl<'a> CompilerContext<'a> {
    pub fn new(ir: &'a PageIr, options: CompileOptions) -> Self {
        Self {
            writer: CodeWriter::new(),
            ir,
            options,
        }
    }

    pub fn add(&self, text: &str) {
        self.writer.add(text);
    }

    pub fn add_line(&self, text: &str) {
        self.writer.add_line(text);
    }

    pub fn indent(&self) {
        self.writer.indent();
    }

    pub fn dedent(&self) {
        self.writer.dedent();
    }

    pub fn get_output(&self) -> String {
        self.writer.get_output()
    }

    pub fn type_param(&self, annotation: &str) -> String {
        if self.options.use_typescript {
            format!("<{}>", annotation)
        } else {
            String::new()
        }
    }
}

use voltron_codegen::{CodeWriter, PageIr};

/// Options for React compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Whether to emit TypeScript type annotations
    pub use_typescript: bool,
    /// Move state and memo declarations into a companion `store.ts`
    pub extract_store: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            use_typescript: true,
            extract_store: false,
        }
    }
}

/// Compilation context for one page
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

    /// Context writing to a fresh buffer, for companion modules
    pub fn with_new_buffer(&self) -> Self {
        Self {
            writer: CodeWriter::new(),
            ir: self.ir,
            options: self.options.clone(),
        }
    }

    /// `<T>` when emitting TypeScript
    pub fn type_param(&self, annotation: &str) -> String {
        if self.options.use_typescript {
            format!("<{}>", annotation)
        } else {
            String::new()
        }
    }
}

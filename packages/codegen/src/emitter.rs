use crate::error::{CodegenError, CodegenResult, CodegenWarning};
use crate::ir::PageIr;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Framework a page is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    React,
    Vue,
}

impl Target {
    pub fn all() -> [Target; 2] {
        [Target::React, Target::Vue]
    }

    /// File name of the generated page module
    pub fn file_name(&self, use_typescript: bool) -> &'static str {
        match (self, use_typescript) {
            (Target::React, true) => "index.tsx",
            (Target::React, false) => "index.jsx",
            (Target::Vue, _) => "index.vue",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::React => write!(f, "react"),
            Target::Vue => write!(f, "vue"),
        }
    }
}

impl FromStr for Target {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "react" => Ok(Target::React),
            "vue" => Ok(Target::Vue),
            other => Err(CodegenError::UnknownTarget(other.to_string())),
        }
    }
}

/// Generated files for one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitOutput {
    /// Page module source
    pub source: String,
    /// Companion store module, when the target extracts one
    pub store: Option<String>,
    pub warnings: Vec<CodegenWarning>,
}

/// Renders a [`PageIr`] as source text for one framework
pub trait Emitter {
    fn target(&self) -> Target;

    fn emit(&self, ir: &PageIr) -> CodegenResult<EmitOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parsing() {
        assert_eq!("React".parse::<Target>().unwrap(), Target::React);
        assert_eq!(Target::Vue.to_string(), "vue");
        assert!("svelte".parse::<Target>().is_err());
        assert_eq!(Target::React.file_name(true), "index.tsx");
    }
}

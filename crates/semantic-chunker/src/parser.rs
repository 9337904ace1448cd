use crate::adapter::{adapter_for, normalize, NodeAdapter};
use crate::error::{ChunkerError, Result};
use crate::language::Language;
use crate::node::SyntaxTree;
use tree_sitter::Parser;

/// Tree-sitter front end producing normalized syntax trees
pub struct SourceParser {
    parser: Parser,
    adapter: Box<dyn NodeAdapter>,
}

impl SourceParser {
    /// Create a parser for a language with a syntax adapter
    pub fn new(language: Language) -> Result<Self> {
        let adapter = adapter_for(language)
            .ok_or_else(|| ChunkerError::unsupported_language(language.as_str()))?;

        let ts_language = language.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| ChunkerError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self { parser, adapter })
    }

    pub fn language(&self) -> Language {
        self.adapter.language()
    }

    /// Parse source text into a normalized tree.
    ///
    /// Syntax errors do not fail the call; they mark the returned tree as malformed.
    pub fn parse(&mut self, content: &str) -> Result<SyntaxTree> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| ChunkerError::parse("Failed to parse source code"))?;

        Ok(normalize(self.adapter.as_ref(), &tree, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_language() {
        assert!(matches!(
            SourceParser::new(Language::Java),
            Err(ChunkerError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_parse_keeps_source_length() {
        let mut parser = SourceParser::new(Language::Python).unwrap();
        let source = "def f():\n    return 1\n";
        let tree = parser.parse(source).unwrap();
        assert_eq!(tree.source_len(), source.len());
        assert_eq!(tree.language(), Language::Python);
        assert!(tree.malformed().is_none());
        assert_eq!(parser.language(), Language::Python);
    }
}

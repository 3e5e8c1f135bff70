use crate::attribute::{node_text, parse_attribute, RawAttribute};
use crate::error::{Result, SourceError};
use crate::uses::expand_use;
use std::collections::HashMap;
use tree_sitter::{Node, Parser};

/// Compiler and tooling attributes that never carry annotation meaning
const LANGUAGE_ATTRIBUTES: &[&str] = &[
    "allow",
    "automatically_derived",
    "cfg",
    "cfg_attr",
    "deny",
    "derive",
    "doc",
    "expect",
    "forbid",
    "inline",
    "must_use",
    "non_exhaustive",
    "repr",
    "warn",
];

/// Declarations extracted from one Rust source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSource {
    /// `use` bindings: local name → full path segments
    pub imports: HashMap<String, Vec<String>>,

    /// Top-level structs and enums in file order
    pub entities: Vec<ParsedEntity>,
}

impl ParsedSource {
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&ParsedEntity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    fn entity_mut(&mut self, name: &str) -> Option<&mut ParsedEntity> {
        self.entities.iter_mut().find(|entity| entity.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntity {
    pub name: String,
    pub attributes: Vec<RawAttribute>,

    /// `pub` methods of inherent impl blocks, in declaration order
    pub operations: Vec<ParsedOperation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedOperation {
    pub name: String,
    pub attributes: Vec<RawAttribute>,
}

/// Tree-sitter analyzer reading entity declarations from Rust code
pub struct SourceAnalyzer {
    parser: Parser,
}

impl SourceAnalyzer {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| SourceError::tree_sitter(format!("Failed to set language: {e}")))?;
        Ok(Self { parser })
    }

    /// Parse `content` and collect its entities, operations and imports
    pub fn analyze(&mut self, content: &str) -> Result<ParsedSource> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| SourceError::parse("Failed to parse source code"))?;
        let root = tree.root_node();

        let mut parsed = ParsedSource::default();
        let mut impls = Vec::new();
        let mut pending = Vec::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "attribute_item" => {
                    if let Some(attribute) = Self::outer_attribute(content, child) {
                        pending.push(attribute);
                    }
                    continue;
                }
                "line_comment" | "block_comment" => continue,
                "use_declaration" => {
                    if let Some(argument) = child.child_by_field_name("argument") {
                        expand_use(node_text(content, argument), &mut parsed.imports);
                    }
                }
                "struct_item" | "enum_item" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        parsed.entities.push(ParsedEntity {
                            name: node_text(content, name).to_string(),
                            attributes: std::mem::take(&mut pending),
                            operations: Vec::new(),
                        });
                    }
                }
                "impl_item" => impls.push(child),
                _ => {}
            }
            pending.clear();
        }

        // impl blocks may precede the type they extend
        for impl_node in impls {
            let Some(target) = Self::inherent_target(content, impl_node) else {
                continue;
            };
            let operations = Self::public_methods(content, impl_node);
            match parsed.entity_mut(target) {
                Some(entity) => entity.operations.extend(operations),
                None => log::debug!("impl for {target} has no matching entity in this file"),
            }
        }

        Ok(parsed)
    }

    /// Attribute of an `attribute_item`, unless it is a language attribute
    fn outer_attribute(content: &str, item: Node) -> Option<RawAttribute> {
        let mut cursor = item.walk();
        let node = item
            .named_children(&mut cursor)
            .find(|n| n.kind() == "attribute")?;
        let attribute = parse_attribute(content, node)?;
        if attribute.is_single_segment() && LANGUAGE_ATTRIBUTES.contains(&attribute.path[0].as_str()) {
            return None;
        }
        Some(attribute)
    }

    /// Name of the type an inherent `impl` extends; `None` for trait impls
    fn inherent_target<'c>(content: &'c str, impl_node: Node) -> Option<&'c str> {
        if impl_node.child_by_field_name("trait").is_some() {
            return None;
        }
        let mut ty = impl_node.child_by_field_name("type")?;
        if ty.kind() == "generic_type" {
            ty = ty.child_by_field_name("type")?;
        }
        (ty.kind() == "type_identifier").then(|| node_text(content, ty))
    }

    fn public_methods(content: &str, impl_node: Node) -> Vec<ParsedOperation> {
        let mut operations = Vec::new();
        let Some(body) = impl_node.child_by_field_name("body") else {
            return operations;
        };

        let mut pending = Vec::new();
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            match child.kind() {
                "attribute_item" => {
                    if let Some(attribute) = Self::outer_attribute(content, child) {
                        pending.push(attribute);
                    }
                    continue;
                }
                "line_comment" | "block_comment" => continue,
                "function_item" if Self::is_public(content, child) => {
                    if let Some(name) = child.child_by_field_name("name") {
                        operations.push(ParsedOperation {
                            name: node_text(content, name).to_string(),
                            attributes: std::mem::take(&mut pending),
                        });
                    }
                }
                _ => {}
            }
            pending.clear();
        }
        operations
    }

    /// Plain `pub` only; `pub(crate)` and friends are not public operations
    fn is_public(content: &str, function: Node) -> bool {
        let mut cursor = function.walk();
        let visible = function
            .children(&mut cursor)
            .find(|n| n.kind() == "visibility_modifier")
            .is_some_and(|n| node_text(content, n) == "pub");
        visible
    }
}

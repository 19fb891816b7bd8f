//! Resolved configuration text
//!
//! Walks the tree depth-first in declared order. A leaf bound to an
//! environment variable gets its default line followed by a `${?VAR}`
//! override line, so the variable wins when it is set.

use crate::models::{Branch, GenerationOptions, Leaf, Node};

use super::escaping::{hocon_key, hocon_value};
use super::origin_note;

/// Generates the configuration file for one specification
pub struct ConfigTextGenerator<'a> {
    options: &'a GenerationOptions,
}

impl<'a> ConfigTextGenerator<'a> {
    pub fn new(options: &'a GenerationOptions) -> Self {
        Self { options }
    }

    /// Render the whole file; `origin` names the specification in the header
    pub fn generate(&self, root: &Branch, origin: &str) -> String {
        let mut out = String::new();
        out.push_str("## ");
        out.push_str(&origin_note(origin));
        out.push_str("\n\n");
        self.write_branch(&mut out, root, 0);
        out
    }

    fn write_branch(&self, out: &mut String, branch: &Branch, depth: usize) {
        let indent = self.options.config_indent.repeat(depth);
        for entry in branch.entries() {
            for line in &entry.doc {
                out.push_str(&indent);
                out.push('#');
                if !line.is_empty() {
                    out.push(' ');
                    out.push_str(line);
                }
                out.push('\n');
            }

            let key = hocon_key(&entry.key);
            match &entry.node {
                Node::Branch(child) => {
                    out.push_str(&format!("{}{} {{\n", indent, key));
                    self.write_branch(out, child, depth + 1);
                    out.push_str(&format!("{}}}\n", indent));
                }
                Node::Leaf(leaf) => write_leaf(out, &indent, &key, leaf),
            }
        }
    }
}

fn write_leaf(out: &mut String, indent: &str, key: &str, leaf: &Leaf) {
    match (&leaf.default, &leaf.env_var) {
        (Some(default), _) => {
            out.push_str(&format!("{}{} = {}\n", indent, key, hocon_value(default)));
        }
        (None, Some(_)) => {}
        (None, None) => {
            let presence = if leaf.optional { "optional" } else { "required" };
            out.push_str(&format!("{}# {} = <{} {}>\n", indent, key, presence, leaf.ty));
        }
    }

    if let Some(var) = &leaf.env_var {
        out.push_str(&format!("{}{} = ${{?{}}}\n", indent, key, var));
    }
}

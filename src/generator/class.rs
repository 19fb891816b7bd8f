//! Java class generation
//!
//! The tree is first lowered into [`TypeDecl`]s, which is where every naming
//! conflict is detected. Rendering a lowered type cannot fail.

use std::collections::HashMap;

use crate::error::GenerationError;
use crate::models::{
    Branch, ClassStyle, GenerationOptions, Leaf, LeafType, ListElement, Node, SpecUnit,
};

use super::escaping::{escape_javadoc, field_name, is_java_identifier, is_java_package, type_name};
use super::{origin_note, GENERATOR_NAME};

const INDENT: &str = "  ";

/// Appended to the key of a list whose elements are objects
const LIST_ELEMENT_SUFFIX: &str = "Element";

/// Generates the Java class for one configuration unit
pub struct ClassGenerator<'a> {
    options: &'a GenerationOptions,
}

impl<'a> ClassGenerator<'a> {
    pub fn new(options: &'a GenerationOptions) -> Self {
        Self { options }
    }

    /// Render the compilation unit for `unit`.
    ///
    /// Fails when the class name or package is not legal Java, or when keys
    /// of one branch collapse onto the same identifier.
    pub fn generate(&self, root: &Branch, unit: &SpecUnit) -> Result<String, GenerationError> {
        if !is_java_identifier(&unit.class_name) {
            return Err(GenerationError::InvalidIdentifier {
                what: "class name",
                value: unit.class_name.clone(),
            });
        }
        if !is_java_package(&unit.package) {
            return Err(GenerationError::InvalidIdentifier {
                what: "package name",
                value: unit.package.clone(),
            });
        }

        let mut lowering = Lowering {
            options: self.options,
            enclosing: Vec::new(),
        };
        let decl = lowering.lower_branch(unit.class_name.clone(), Vec::new(), root, "")?;

        let mut w = JavaWriter::default();
        w.line(&format!("/* {} */", origin_note(&unit.spec_file_name())));
        if !unit.package.is_empty() {
            w.line(&format!("package {};", unit.package));
        }
        w.blank();
        self.render_type(&mut w, &decl, true);
        Ok(w.out)
    }

    fn render_type(&self, w: &mut JavaWriter, decl: &TypeDecl, top_level: bool) {
        match self.options.class_style {
            ClassStyle::Record => self.render_record(w, decl, top_level),
            ClassStyle::Fields | ClassStyle::Getters => self.render_class(w, decl, top_level),
        }
    }

    fn render_annotation(&self, w: &mut JavaWriter, top_level: bool) {
        if top_level && self.options.generated_annotation {
            w.line(&format!("@jakarta.annotation.Generated(\"{}\")", GENERATOR_NAME));
        }
    }

    fn render_class(&self, w: &mut JavaWriter, decl: &TypeDecl, top_level: bool) {
        let getters = self.options.class_style == ClassStyle::Getters;

        w.javadoc(&decl.doc);
        self.render_annotation(w, top_level);
        let keyword = if top_level { "public class" } else { "public static class" };
        w.line(&format!("{} {} {{", keyword, decl.name));
        w.depth += 1;

        let visibility = if getters { "private final" } else { "public final" };
        for member in &decl.members {
            if !getters {
                w.javadoc(&member.doc);
            }
            w.line(&format!("{} {} {};", visibility, member.java_type, member.field));
        }
        if !decl.members.is_empty() {
            w.blank();
        }

        let params: Vec<String> = decl
            .members
            .iter()
            .map(|m| format!("{} {}", m.java_type, m.field))
            .collect();
        w.line(&format!("public {}({}) {{", decl.name, params.join(", ")));
        w.depth += 1;
        for member in &decl.members {
            w.line(&format!("this.{0} = {0};", member.field));
        }
        w.depth -= 1;
        w.line("}");

        if getters {
            for member in &decl.members {
                w.blank();
                w.javadoc(&member.doc);
                w.line(&format!("public {} {}() {{", member.java_type, member.accessor()));
                w.depth += 1;
                w.line(&format!("return {};", member.field));
                w.depth -= 1;
                w.line("}");
            }
        }

        for nested in &decl.nested {
            w.blank();
            self.render_type(w, nested, false);
        }

        w.depth -= 1;
        w.line("}");
    }

    fn render_record(&self, w: &mut JavaWriter, decl: &TypeDecl, top_level: bool) {
        let mut doc = decl.doc.clone();
        let params: Vec<String> = decl
            .members
            .iter()
            .filter(|m| !m.doc.is_empty())
            .map(|m| format!("@param {} {}", m.field, m.doc.join(" ")))
            .collect();
        if !params.is_empty() {
            if !doc.is_empty() {
                doc.push(String::new());
            }
            doc.extend(params);
        }

        w.javadoc(&doc);
        self.render_annotation(w, top_level);
        w.line(&format!("public record {}(", decl.name));
        w.depth += 1;
        let last = decl.members.len().saturating_sub(1);
        for (i, member) in decl.members.iter().enumerate() {
            let comma = if i < last { "," } else { "" };
            w.line(&format!("{} {}{}", member.java_type, member.field, comma));
        }
        w.depth -= 1;
        w.line(") {");

        w.depth += 1;
        for (i, nested) in decl.nested.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            self.render_type(w, nested, false);
        }
        w.depth -= 1;
        w.line("}");
    }
}

/// A Java type about to be rendered
struct TypeDecl {
    name: String,
    doc: Vec<String>,
    members: Vec<Member>,
    nested: Vec<TypeDecl>,
}

struct Member {
    field: String,
    java_type: String,
    doc: Vec<String>,
}

impl Member {
    /// `getUri` for most types, `isEnabled` for a primitive boolean
    fn accessor(&self) -> String {
        let prefix = if self.java_type == "boolean" { "is" } else { "get" };
        let mut chars = self.field.chars();
        match chars.next() {
            Some(first) => format!("{}{}{}", prefix, first.to_ascii_uppercase(), chars.as_str()),
            None => prefix.to_string(),
        }
    }
}

struct Lowering<'a> {
    options: &'a GenerationOptions,
    /// Names of the types currently being lowered, outermost first
    enclosing: Vec<String>,
}

impl Lowering<'_> {
    fn lower_branch(
        &mut self,
        name: String,
        doc: Vec<String>,
        branch: &Branch,
        path: &str,
    ) -> Result<TypeDecl, GenerationError> {
        if self.enclosing.contains(&name) {
            return Err(GenerationError::NestedNameClash {
                name,
                path: path.to_string(),
            });
        }

        self.enclosing.push(name.clone());
        let lowered = self.lower_members(branch, path);
        self.enclosing.pop();

        let (members, nested) = lowered?;
        Ok(TypeDecl {
            name,
            doc,
            members,
            nested,
        })
    }

    fn lower_members(
        &mut self,
        branch: &Branch,
        path: &str,
    ) -> Result<(Vec<Member>, Vec<TypeDecl>), GenerationError> {
        let mut scope = Scope::new(path);
        let mut members = Vec::with_capacity(branch.len());
        let mut nested = Vec::new();

        for entry in branch.entries() {
            let child_path = if path.is_empty() {
                entry.key.clone()
            } else {
                format!("{}.{}", path, entry.key)
            };

            let field = field_name(&entry.key);
            scope.claim_field(&field, &entry.key)?;

            let java_type = match &entry.node {
                Node::Branch(child) => {
                    let name = type_name(&entry.key);
                    scope.claim_type(&name, &entry.key)?;
                    nested.push(self.lower_branch(
                        name.clone(),
                        entry.doc.clone(),
                        child,
                        &child_path,
                    )?);
                    name
                }
                Node::Leaf(leaf) => {
                    let mut site = LeafSite {
                        key: &entry.key,
                        path: &child_path,
                        scope: &mut scope,
                        nested: &mut nested,
                    };
                    self.leaf_type(leaf, &mut site)?
                }
            };

            members.push(Member {
                field,
                java_type,
                doc: entry.doc.clone(),
            });
        }

        Ok((members, nested))
    }

    fn leaf_type(&mut self, leaf: &Leaf, site: &mut LeafSite<'_>) -> Result<String, GenerationError> {
        let base = self.value_type(&leaf.ty, site)?;
        let ty = if leaf.optional && self.options.use_optionals {
            format!("java.util.Optional<{}>", boxed(&base))
        } else if leaf.optional && leaf.default.is_none() {
            boxed(&base)
        } else {
            base
        };
        Ok(ty)
    }

    fn value_type(&mut self, ty: &LeafType, site: &mut LeafSite<'_>) -> Result<String, GenerationError> {
        let java = match ty {
            LeafType::String => "java.lang.String".to_string(),
            LeafType::Integer => "int".to_string(),
            LeafType::Long => "long".to_string(),
            LeafType::Boolean => "boolean".to_string(),
            LeafType::Duration { .. } if self.options.use_durations => {
                "java.time.Duration".to_string()
            }
            LeafType::Duration { .. } => "long".to_string(),
            LeafType::Any => "java.lang.Object".to_string(),
            LeafType::List { element } => {
                let inner = match element.as_ref() {
                    ListElement::Scalar(scalar) => self.value_type(scalar, site)?,
                    ListElement::Object(object) => {
                        let name = format!("{}{}", type_name(site.key), LIST_ELEMENT_SUFFIX);
                        site.scope.claim_type(&name, site.key)?;
                        let decl = self.lower_branch(name.clone(), Vec::new(), object, site.path)?;
                        site.nested.push(decl);
                        name
                    }
                };
                format!("java.util.List<{}>", boxed(&inner))
            }
        };
        Ok(java)
    }
}

/// Where a leaf sits while its type is being lowered
struct LeafSite<'s> {
    key: &'s str,
    path: &'s str,
    scope: &'s mut Scope,
    nested: &'s mut Vec<TypeDecl>,
}

/// Identifiers already taken inside one branch, mapped to the key that took them
struct Scope {
    label: String,
    fields: HashMap<String, String>,
    types: HashMap<String, String>,
}

impl Scope {
    fn new(path: &str) -> Self {
        let label = if path.is_empty() {
            "the root object".to_string()
        } else {
            format!("'{}'", path)
        };
        Self {
            label,
            fields: HashMap::new(),
            types: HashMap::new(),
        }
    }

    fn claim_field(&mut self, ident: &str, key: &str) -> Result<(), GenerationError> {
        claim(&mut self.fields, &self.label, ident, key)
    }

    fn claim_type(&mut self, ident: &str, key: &str) -> Result<(), GenerationError> {
        claim(&mut self.types, &self.label, ident, key)
    }
}

fn claim(
    taken: &mut HashMap<String, String>,
    label: &str,
    ident: &str,
    key: &str,
) -> Result<(), GenerationError> {
    if let Some(first) = taken.get(ident) {
        return Err(GenerationError::IdentifierCollision {
            scope: label.to_string(),
            first: first.clone(),
            second: key.to_string(),
            ident: ident.to_string(),
        });
    }
    taken.insert(ident.to_string(), key.to_string());
    Ok(())
}

/// Reference type for a primitive, for use in generics and nullable slots
fn boxed(java_type: &str) -> String {
    match java_type {
        "int" => "java.lang.Integer",
        "long" => "java.lang.Long",
        "boolean" => "java.lang.Boolean",
        other => other,
    }
    .to_string()
}

#[derive(Default)]
struct JavaWriter {
    out: String,
    depth: usize,
}

impl JavaWriter {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn javadoc(&mut self, doc: &[String]) {
        match doc {
            [] => {}
            [single] => self.line(&format!("/** {} */", escape_javadoc(single))),
            lines => {
                self.line("/**");
                for line in lines {
                    if line.is_empty() {
                        self.line(" *");
                    } else {
                        self.line(&format!(" * {}", escape_javadoc(line)));
                    }
                }
                self.line(" */");
            }
        }
    }
}

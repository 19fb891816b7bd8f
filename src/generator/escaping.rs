//! Context-aware escaping for the generated artifacts
//!
//! Keys and literals from a specification end up in two very different
//! places: HOCON config text and Java source. Each needs its own quoting.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "record", "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this",
    "throw", "throws", "transient", "true", "try", "var", "void", "volatile", "while", "yield",
];

/// Escape a string for a Java string literal body
///
/// Escapes: backslash, double quotes, newlines, carriage returns, tabs
pub fn escape_java(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Text safe to place inside a `/** ... */` block
pub fn escape_javadoc(s: &str) -> String {
    s.replace("*/", "*&#47;")
}

/// Render a default literal as a HOCON value.
///
/// Literals are written verbatim unless they would be cut short or change
/// meaning as an unquoted HOCON value; those are emitted as quoted strings.
pub fn hocon_value(s: &str) -> String {
    let needs_quoting = s.is_empty()
        || s.starts_with(char::is_whitespace)
        || s.ends_with(char::is_whitespace)
        || s.contains([
            '"', '{', '}', '[', ']', ',', '#', '\\', '$', '=', '+', '?', '!', '@', '*', '&', '^',
            '`', '\n', '\r', '\t',
        ]);

    if needs_quoting {
        format!("\"{}\"", escape_java(s))
    } else {
        s.to_string()
    }
}

/// Render a key for HOCON, quoting it when it is not a plain word
pub fn hocon_key(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if plain {
        key.to_string()
    } else {
        format!("\"{}\"", escape_java(key))
    }
}

pub fn is_java_keyword(word: &str) -> bool {
    JAVA_KEYWORDS.contains(&word)
}

/// A legal Java identifier (ASCII subset)
pub fn is_java_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$');
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !is_java_keyword(word)
        && word != "_"
}

/// A dotted Java package name; the empty string is the default package
pub fn is_java_package(package: &str) -> bool {
    package.is_empty() || package.split('.').all(is_java_identifier)
}

fn sanitize(ident: String) -> String {
    let mut ident: String = ident
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_java_keyword(&ident) || ident == "_" {
        ident.push('_');
    }
    ident
}

/// Field name for a key: `max-pool-size` becomes `maxPoolSize`
pub fn field_name(key: &str) -> String {
    sanitize(key.to_lower_camel_case())
}

/// Nested type name for a key: `http-server` becomes `HttpServer`
pub fn type_name(key: &str) -> String {
    sanitize(key.to_upper_camel_case())
}

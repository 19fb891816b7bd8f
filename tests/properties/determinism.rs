//! Property tests for output stability.

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use tscfg_build::{
    parse_spec, ClassGenerator, ClassStyle, ConfigTextGenerator, GenerationOptions, SpecUnit,
};

fn unit() -> SpecUnit {
    SpecUnit {
        name: "application".to_string(),
        spec_path: PathBuf::from("src/tscfg/application.spec.conf"),
        config_path: PathBuf::from("src/tscfg/application.conf"),
        package: "com.example".to_string(),
        class_name: "ApplicationConfig".to_string(),
    }
}

fn leaf_value() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "\"string | hello\"",
        "\"int?\"",
        "\"duration:ms | 250\"",
        "[ \"string\" ]",
        "false",
        "3",
    ])
}

/// A two-level spec: a few branches, each holding a few leaves
fn nested_spec() -> impl Strategy<Value = String> {
    proptest::collection::btree_map(
        "b[a-z]{0,5}",
        proptest::collection::btree_map("l[a-z]{0,5}", leaf_value(), 1..=4),
        1..=4,
    )
    .prop_map(|branches| {
        let mut source = String::new();
        for (branch, leaves) in branches {
            source.push_str(&format!("# The {} group\n{} {{\n", branch, branch));
            for (leaf, value) in leaves {
                source.push_str(&format!("  {} = {}\n", leaf, value));
            }
            source.push_str("}\n");
        }
        source
    })
}

fn class_style() -> impl Strategy<Value = ClassStyle> {
    prop::sample::select(vec![ClassStyle::Fields, ClassStyle::Getters, ClassStyle::Record])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Generating twice from the same spec yields identical output.
    #[test]
    fn property_generation_is_deterministic(source in nested_spec(), style in class_style()) {
        let options = GenerationOptions {
            class_style: style,
            ..GenerationOptions::default()
        };
        let first = parse_spec(&source, Path::new("application.spec.conf")).unwrap();
        let second = parse_spec(&source, Path::new("application.spec.conf")).unwrap();
        prop_assert_eq!(&first, &second);

        let generator = ClassGenerator::new(&options);
        let class_a = generator.generate(&first.root, &unit()).unwrap();
        let class_b = generator.generate(&second.root, &unit()).unwrap();
        prop_assert_eq!(class_a, class_b);

        let text = ConfigTextGenerator::new(&options);
        prop_assert_eq!(
            text.generate(&first.root, "application.spec.conf"),
            text.generate(&second.root, "application.spec.conf")
        );
    }

    /// PROPERTY: The indent setting only changes leading whitespace.
    #[test]
    fn property_indent_only_changes_leading_whitespace(
        source in nested_spec(),
        width in 1usize..=8,
    ) {
        let spec = parse_spec(&source, Path::new("application.spec.conf")).unwrap();
        let two = GenerationOptions::default();
        let wide = GenerationOptions {
            config_indent: " ".repeat(width),
            ..GenerationOptions::default()
        };

        let a = ConfigTextGenerator::new(&two).generate(&spec.root, "application.spec.conf");
        let b = ConfigTextGenerator::new(&wide).generate(&spec.root, "application.spec.conf");

        let trimmed = |s: &str| s.lines().map(|l| l.trim_start().to_string()).collect::<Vec<_>>();
        prop_assert_eq!(trimmed(&a), trimmed(&b));
    }

    /// PROPERTY: Every top-level branch becomes a nested type of the class.
    #[test]
    fn property_every_branch_becomes_nested_type(source in nested_spec()) {
        let spec = parse_spec(&source, Path::new("application.spec.conf")).unwrap();
        let options = GenerationOptions::default();

        let java = ClassGenerator::new(&options).generate(&spec.root, &unit()).unwrap();

        for entry in spec.root.entries() {
            let ty = tscfg_build::generator::escaping::type_name(&entry.key);
            let decl = format!("public static class {} {{", ty);
            prop_assert!(java.contains(&decl), "missing {:?}", decl);
        }
    }
}

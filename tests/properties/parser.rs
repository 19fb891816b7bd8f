//! Property tests for specification parsing.

use std::path::Path;

use proptest::prelude::*;

use tscfg_build::parse_spec;

/// Values the parser must accept, each with the type it should resolve to
fn typed_value() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop::sample::select(vec![
        ("\"string | hello\"", "string"),
        ("\"int | 42\"", "int"),
        ("\"long\"", "long"),
        ("\"boolean?\"", "boolean"),
        ("\"duration | 10s\"", "duration"),
        ("true", "boolean"),
        ("7", "int"),
    ])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: `parse_spec` never panics on arbitrary input.
    #[test]
    fn property_parse_spec_never_panics(source in "(?s).{0,256}") {
        let _ = parse_spec(&source, Path::new("fuzz.spec.conf"));
    }

    /// PROPERTY: `parse_spec` never panics on input built from spec syntax.
    #[test]
    fn property_parse_spec_never_panics_on_spec_tokens(
        tokens in proptest::collection::vec(
            prop::sample::select(vec![
                "a", "b", "{", "}", "[", "]", "=", ":", ",", "\n", "\"", "|",
                "?", "#", "#@envvar X", "\"int | 1\"", "\"string\"", " ",
            ]),
            0..=48,
        )
    ) {
        let source: String = tokens.concat();
        let _ = parse_spec(&source, Path::new("fuzz.spec.conf"));
    }

    /// PROPERTY: Every declared key survives parsing, in declared order.
    #[test]
    fn property_flat_spec_keeps_keys_in_order(
        keys in proptest::collection::btree_set("k[a-z]{0,6}", 1..=8),
        values in proptest::collection::vec(typed_value(), 8),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let source: String = keys
            .iter()
            .zip(&values)
            .map(|(key, (value, _))| format!("{} = {}\n", key, value))
            .collect();

        let spec = parse_spec(&source, Path::new("flat.spec.conf")).unwrap();

        let parsed: Vec<&str> = spec.root.entries().iter().map(|e| e.key.as_str()).collect();
        prop_assert_eq!(parsed, keys.iter().map(String::as_str).collect::<Vec<_>>());
        for (key, (_, ty)) in keys.iter().zip(&values) {
            let leaf = spec.root.leaf(key).unwrap();
            prop_assert_eq!(leaf.ty.to_string(), *ty);
        }
    }

    /// PROPERTY: Each `#@envvar` pragma binds exactly the leaf that follows it.
    #[test]
    fn property_envvar_binds_following_leaf(
        keys in proptest::collection::btree_set("k[a-z]{0,6}", 1..=6),
        bound in proptest::collection::vec(any::<bool>(), 6),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut source = String::from("group {\n");
        for (key, bind) in keys.iter().zip(&bound) {
            if *bind {
                source.push_str(&format!("  #@envvar {}\n", key.to_uppercase()));
            }
            source.push_str(&format!("  {} = \"string | x\"\n", key));
        }
        source.push_str("}\n");

        let spec = parse_spec(&source, Path::new("env.spec.conf")).unwrap();

        let expected: Vec<(String, String)> = keys
            .iter()
            .zip(&bound)
            .filter(|(_, bind)| **bind)
            .map(|(key, _)| (format!("group.{}", key), key.to_uppercase()))
            .collect();
        let actual: Vec<(String, String)> = spec
            .env_bindings
            .iter()
            .map(|b| (b.path.clone(), b.name.clone()))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}

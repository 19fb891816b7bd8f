//! Property tests for identifier derivation.

use proptest::prelude::*;

use tscfg_build::generator::escaping::{field_name, is_java_identifier, type_name};
use tscfg_build::naming::default_class_name;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Any spec path yields a class name Java accepts.
    #[test]
    fn property_default_class_name_is_java_identifier(path in "(?s).{0,64}") {
        let name = default_class_name(&path);
        prop_assert!(is_java_identifier(&name), "{:?} -> {:?}", path, name);
        prop_assert!(name.ends_with("Config"));
    }

    /// PROPERTY: Directories and extra extensions never leak into the class name.
    #[test]
    fn property_default_class_name_uses_last_segment_stem(
        dirs in proptest::collection::vec("[a-z]{1,8}", 0..=4),
        stem in "[a-z][a-z0-9]{0,10}",
    ) {
        let mut path = dirs.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(&stem);
        path.push_str(".spec.conf");

        let mut expected = stem.clone();
        expected[..1].make_ascii_uppercase();
        expected.push_str("Config");
        prop_assert_eq!(default_class_name(&path), expected);
    }

    /// PROPERTY: Any key maps to a legal field name and a legal type name.
    #[test]
    fn property_key_identifiers_are_legal(key in "(?s).{0,32}") {
        let field = field_name(&key);
        let ty = type_name(&key);
        prop_assert!(is_java_identifier(&field), "{:?} -> {:?}", key, field);
        prop_assert!(is_java_identifier(&ty), "{:?} -> {:?}", key, ty);
    }
}

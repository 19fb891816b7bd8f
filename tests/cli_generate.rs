//! `tscfg-build generate` end to end

mod common;

use common::*;

#[test]
fn generate_default_unit_without_manifest() {
    let env = TestEnv::builder().with_spec("application", API_SPEC).build();

    let result = env.run(&["generate"]);

    assert!(result.is_success(), "{}", result.combined_output());
    assert_generated!(env, APPLICATION_CONF);
    assert_generated!(
        env,
        "build/generated/sources/tscfg/java/ApplicationConfig.java"
    );

    let conf = env.read_file(APPLICATION_CONF);
    assert!(conf.contains("  uri = http://localhost:8080\n  uri = ${?API_URI}\n"));
    assert_output_contains!(result, "Done: 2 written, 0 unchanged");
}

#[test]
fn generate_two_units_with_packages() {
    let env = TestEnv::builder()
        .with_manifest(TWO_UNIT_MANIFEST)
        .with_spec("application", API_SPEC)
        .with_spec("second", SECOND_SPEC)
        .build();

    let result = env.run(&["generate"]);

    assert!(result.is_success(), "{}", result.combined_output());
    assert_generated!(env, APPLICATION_CLASS);
    assert_generated!(
        env,
        "build/generated/sources/tscfg/java/com/example/third/SecondConfig.java"
    );
    assert_generated!(env, "src/tscfg/second.conf");

    let second = env.read_file(
        "build/generated/sources/tscfg/java/com/example/third/SecondConfig.java",
    );
    assert!(second.contains("package com.example.third;"));
    assert!(second.contains("public class SecondConfig {"));
    assert!(second.contains("public final java.time.Duration timeout;"));
}

#[test]
fn generate_is_idempotent() {
    let env = TestEnv::builder().with_spec("application", API_SPEC).build();

    assert!(env.run(&["generate"]).is_success());
    let conf_before = env.read_file(APPLICATION_CONF);
    let mtime_before = env.modified(APPLICATION_CONF);
    std::thread::sleep(std::time::Duration::from_millis(20));

    let result = env.run(&["generate"]);

    assert!(result.is_success());
    assert_output_contains!(result, "Done: 0 written, 2 unchanged");
    assert_eq!(env.read_file(APPLICATION_CONF), conf_before);
    assert_eq!(env.modified(APPLICATION_CONF), mtime_before);
}

#[test]
fn generate_replaces_corrupt_output() {
    let env = TestEnv::builder().with_spec("application", API_SPEC).build();
    std::fs::create_dir_all(env.project_path("src/tscfg")).unwrap();
    std::fs::write(env.project_path(APPLICATION_CONF), [0xff, 0xfe, 0x00]).unwrap();

    let result = env.run(&["generate"]);

    assert!(result.is_success(), "{}", result.combined_output());
    assert!(env.read_file(APPLICATION_CONF).contains("uri = ${?API_URI}"));
}

#[test]
fn generate_records_flag() {
    let env = TestEnv::builder()
        .with_manifest("package = \"com.example\"\n")
        .with_spec("application", API_SPEC)
        .build();

    let result = env.run(&["generate", "--records"]);

    assert!(result.is_success(), "{}", result.combined_output());
    let class = env.read_file(APPLICATION_CLASS);
    assert!(class.contains("public record ApplicationConfig("));
    assert!(!class.contains("getUri()"));
}

#[test]
fn generate_getters_from_manifest() {
    let env = TestEnv::builder()
        .with_manifest("package = \"com.example\"\n\n[options]\ngetters = true\n")
        .with_spec("application", API_SPEC)
        .build();

    assert!(env.run(&["generate"]).is_success());

    let class = env.read_file(APPLICATION_CLASS);
    assert!(class.contains("public class ApplicationConfig {"));
    assert!(class.contains("getUri()"));
}

#[test]
fn generate_without_config_file() {
    let env = TestEnv::builder().with_spec("application", API_SPEC).build();

    let result = env.run(&["generate", "--no-config-file"]);

    assert!(result.is_success());
    assert_not_generated!(env, APPLICATION_CONF);
}

#[test]
fn generate_indent_flag() {
    let env = TestEnv::builder().with_spec("application", API_SPEC).build();

    assert!(env.run(&["generate", "--indent", "    "]).is_success());

    assert!(env
        .read_file(APPLICATION_CONF)
        .contains("    uri = ${?API_URI}\n"));
}

#[test]
fn generate_into_main_sources() {
    let env = TestEnv::builder()
        .with_manifest("[options]\noutput_in_generated_sources = false\n")
        .with_spec("application", API_SPEC)
        .build();

    assert!(env.run(&["generate"]).is_success());

    assert_generated!(env, "src/main/java/ApplicationConfig.java");
}

#[test]
fn generate_env_override_package() {
    let env = TestEnv::builder().with_spec("application", API_SPEC).build();

    let result = env.run_with_env(&["generate"], &[("TSCFG_PACKAGE", "com.example")]);

    assert!(result.is_success(), "{}", result.combined_output());
    assert_generated!(env, APPLICATION_CLASS);
}

#[test]
fn generate_fails_on_bad_type_with_location() {
    let env = TestEnv::builder()
        .with_spec("application", "a {\n  b = \"strng | x\"\n}\n")
        .build();

    let result = env.run(&["generate"]);

    assert!(!result.is_success());
    assert_output_contains!(result, "unit 'application'");
    assert_output_contains!(result, "2:7: unknown type 'strng'");
    assert_not_generated!(env, APPLICATION_CONF);
}

#[test]
fn generate_rejects_runaway_nesting() {
    let spec = format!("{}x = 1\n{}", "a {".repeat(2000), "}".repeat(2000));
    let env = TestEnv::builder().with_spec("application", &spec).build();

    let result = env.run(&["generate"]);

    assert_eq!(result.exit_code, 1, "{}", result.combined_output());
    assert_output_contains!(result, "unit 'application'");
    assert_output_contains!(result, "nesting deeper than 128 levels");
    assert_not_generated!(env, APPLICATION_CONF);
}

#[test]
fn generate_fails_on_missing_spec() {
    let env = TestEnv::builder().build();

    let result = env.run(&["generate"]);

    assert!(!result.is_success());
    assert_output_contains!(result, "application.spec.conf");
}

#[test]
fn generate_warns_on_unknown_manifest_key() {
    let env = TestEnv::builder()
        .with_manifest("[options]\nrecord = true\n")
        .with_spec("application", API_SPEC)
        .build();

    let result = env.run(&["generate"]);

    assert!(result.is_success());
    assert!(result.stderr.contains("did you mean 'records'?"));
}

#[test]
fn generate_json_events() {
    let env = TestEnv::builder().with_spec("application", API_SPEC).build();

    let result = env.run(&["--json", "generate"]);

    assert!(result.is_success(), "{}", result.combined_output());
    let events = result.json_lines();
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| e["event"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "unit_started",
            "file_written",
            "file_written",
            "unit_finished",
            "complete"
        ]
    );
    assert!(events[1]["hash"].as_str().unwrap().starts_with("sha256:"));
}

//! Test fixtures - reusable content constants for tests.

/// The default `application` unit: one nested branch bound to an env var
pub const API_SPEC: &str = r#"# Configuration for API calls
api {
  # The URI of the API
  #@envvar API_URI
  uri: "string | http://localhost:8080",
}
"#;

/// A second unit with inferred literals and a required leaf
pub const SECOND_SPEC: &str = r#"server {
  port = 8080
  host = "string"
  timeout = "duration | 30s"
  debug = false
}
"#;

/// Two units, the second with its own package
pub const TWO_UNIT_MANIFEST: &str = r#"package = "com.example"

[[units]]
name = "application"

[[units]]
name = "second"
package = "com.example.third"
"#;

/// Class file of the default unit with the `com.example` package
pub const APPLICATION_CLASS: &str =
    "build/generated/sources/tscfg/java/com/example/ApplicationConfig.java";

/// Config file of the default unit
pub const APPLICATION_CONF: &str = "src/tscfg/application.conf";

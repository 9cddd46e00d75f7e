use std::io::Write;

use super::*;

#[test]
fn defaults_describe_a_local_remote_setup() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.content.source, ContentSourceKind::Remote);
    assert_eq!(settings.content.environment, "master");
    assert_eq!(settings.content.post_content_type, "personalBlog");
    assert_eq!(settings.content.project_content_type, "personalProjects");
    assert_eq!(settings.content.request_timeout, Duration::from_secs(30));
    assert_eq!(settings.email.from, "onboarding@resend.dev");
    assert_eq!(settings.cache.list_ttl_seconds.get(), 60);
    assert_eq!(settings.cache.post_ttl_seconds.get(), 300);
    assert!(settings.cache.enabled);
    assert!(settings.cache.serve_stale);
    assert_eq!(settings.cache.max_entries.get(), 512);
    assert_eq!(settings.logging.format, LogFormat::Compact);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.content.source = Some(ContentSourceKind::Remote);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        content: ContentOverrides {
            source: Some(ContentSourceKind::Memory),
            ..Default::default()
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.content.source, ContentSourceKind::Memory);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.logging.format, LogFormat::Json);
}

#[test]
fn blank_credentials_are_treated_as_missing() {
    let mut raw = RawSettings::default();
    raw.content.space_id = Some("  ".into());
    raw.content.environment = Some(String::new());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.content.space_id, None);
    assert_eq!(settings.content.environment, "master");
}

#[test]
fn proxy_source_requires_proxy_url() {
    let mut raw = RawSettings::default();
    raw.content.source = Some(ContentSourceKind::Proxy);

    let err = Settings::from_raw(raw).expect_err("proxy without url");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "content.proxy_url",
            ..
        }
    ));
}

#[test]
fn zero_ttl_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.list_ttl_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero ttl");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.list_ttl_seconds",
            ..
        }
    ));
}

#[test]
fn invalid_log_level_is_reported() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".into());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn zero_cache_capacity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.max_entries = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero capacity");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.max_entries",
            ..
        }
    ));
}

#[test]
fn config_file_is_layered_under_cli() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config");
    writeln!(
        file,
        r#"
[content]
source = "memory"

[cache]
list_ttl_seconds = 15

[site]
public_url = "https://portfolio.example.com"
"#
    )
    .expect("write config");

    let cli = CliArgs {
        config_file: Some(file.path().to_path_buf()),
        command: Some(Command::Serve(Box::new(ServeArgs {
            overrides: ServeOverrides {
                cache_enabled: Some(false),
                ..Default::default()
            },
        }))),
    };

    let settings = load(&cli).expect("settings load");
    assert_eq!(settings.content.source, ContentSourceKind::Memory);
    assert_eq!(settings.cache.list_ttl_seconds.get(), 15);
    assert!(!settings.cache.enabled);
    assert_eq!(
        settings.site.public_url.as_str(),
        "https://portfolio.example.com/"
    );
}

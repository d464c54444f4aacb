use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert!(settings.database.url.is_none());
    assert_eq!(settings.database.max_connections.get(), 8);
    assert_eq!(settings.auth.session_ttl, time::Duration::hours(720));
    assert!(!settings.auth.secure_cookie);
    assert!(!settings.render.allow_raw_html);
    assert_eq!(settings.rate_limit.window_seconds.get(), 60);
    assert_eq!(settings.rate_limit.max_requests.get(), 10);
}

#[test]
fn blank_database_url_is_treated_as_missing() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn zero_values_are_rejected() {
    let mut raw = RawSettings::default();
    raw.rate_limit.max_requests = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero max requests");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "rate_limit.max_requests",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.auth.session_ttl_hours = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero ttl");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "auth.session_ttl_hours",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.auth.session_ttl_hours = Some(u64::MAX);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn invalid_log_level_is_reported() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(err.to_string().contains("logging.level"));
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

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn cli_can_allow_raw_html() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        render_allow_raw_html: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.render.allow_raw_html);
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["quillpost"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "quillpost",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--log-json",
        "true",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.log_json, Some(true));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_create_admin_arguments() {
    let args = CliArgs::parse_from([
        "quillpost",
        "create-admin",
        "--database-url",
        "postgres://example",
        "--email",
        "admin@example.com",
        "--password",
        "hunter22",
    ]);

    match args.command.expect("create-admin command") {
        Command::CreateAdmin(admin) => {
            assert_eq!(
                admin.database.database_url.as_deref(),
                Some("postgres://example")
            );
            assert_eq!(admin.email.as_deref(), Some("admin@example.com"));
            assert_eq!(admin.password.as_deref(), Some("hunter22"));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn create_admin_database_override_applies() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("postgres://from-file".to_string());
    raw.apply_database_override(&DatabaseOverride {
        database_url: Some("postgres://from-cli".to_string()),
    });
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.database.url.as_deref(), Some("postgres://from-cli"));
}

//! Unit tests for the crate error enumeration.

use shellfence::SessionError;

/// Every variant renders with its area prefix.
#[test]
fn display_formats_carry_area_prefixes() {
    let cases = [
        (SessionError::Closed("cmd".into()), "closed session: cmd"),
        (SessionError::Spawn("no sh".into()), "spawn: no sh"),
        (
            SessionError::CommandWrite("pipe full".into()),
            "command write: pipe full",
        ),
        (
            SessionError::StreamRead("pipe burst".into()),
            "stream read: pipe burst",
        ),
        (SessionError::Timeout("5s".into()), "timeout: 5s"),
        (SessionError::Config("bad".into()), "config: bad"),
        (SessionError::Io("denied".into()), "io: denied"),
    ];

    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

/// Raw I/O errors convert into the `Io` variant.
#[test]
fn io_error_converts_to_io_variant() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = SessionError::from(io);

    assert!(
        matches!(err, SessionError::Io(ref msg) if msg.contains("denied")),
        "expected SessionError::Io carrying the message, got: {err:?}"
    );
}

/// TOML parse errors convert into the `Config` variant.
#[test]
fn toml_error_converts_to_config_variant() {
    let parse_err =
        toml::from_str::<shellfence::SessionConfig>("profile = [").expect_err("must not parse");
    let err = SessionError::from(parse_err);

    assert!(
        matches!(err, SessionError::Config(ref msg) if msg.contains("invalid config")),
        "expected SessionError::Config, got: {err:?}"
    );
}

/// The error type boxes as a standard error object.
#[test]
fn coerces_to_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(SessionError::Timeout("1s".into()));
    assert!(err.to_string().starts_with("timeout:"));
}

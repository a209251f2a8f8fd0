//! Declaration table invariants, checked through the public API.

use destripe_config::config::schema::{lookup, DefaultValue, ParamKind, STAT_CHOICES};
use destripe_config::config::{validate_schema, DestripeConfig, ParamValue, PARAMETERS};

#[test]
fn test_every_default_is_legal() {
    assert_eq!(validate_schema(PARAMETERS), Ok(()));
    for decl in PARAMETERS {
        assert!(decl.accepts(&decl.default.to_value()), "{}", decl.name);
    }
}

#[test]
fn test_declared_table() {
    let expected = [
        ("input", ParamKind::String, DefaultValue::Str("")),
        ("suffix", ParamKind::String, DefaultValue::Str("")),
        ("stat", ParamKind::Choice, DefaultValue::Choice("pmode1")),
        ("maxiter", ParamKind::Integer, DefaultValue::Int(15)),
        ("sigrej", ParamKind::FloatOrNone, DefaultValue::OptFloat(Some(2.0))),
        ("lower", ParamKind::FloatOrNone, DefaultValue::OptFloat(None)),
        ("upper", ParamKind::FloatOrNone, DefaultValue::OptFloat(None)),
        ("binwidth", ParamKind::Float, DefaultValue::Float(0.1)),
        ("mask1", ParamKind::String, DefaultValue::Str("")),
        ("mask2", ParamKind::String, DefaultValue::Str("")),
        ("dqbits", ParamKind::String, DefaultValue::Str("")),
        ("rpt_clean", ParamKind::Integer, DefaultValue::Int(0)),
        ("atol", ParamKind::FloatOrNone, DefaultValue::OptFloat(Some(0.01))),
        ("clobber", ParamKind::Boolean, DefaultValue::Bool(false)),
        ("verbose", ParamKind::Boolean, DefaultValue::Bool(true)),
    ];

    assert_eq!(PARAMETERS.len(), expected.len());
    for (decl, (name, kind, default)) in PARAMETERS.iter().zip(expected) {
        assert_eq!(decl.name, name);
        assert_eq!(decl.kind, kind, "{name}");
        assert_eq!(decl.default, default, "{name}");
        assert!(!decl.description.is_empty(), "{name}");
    }
}

#[test]
fn test_stat_allowed_values() {
    let stat = lookup("stat").unwrap();
    assert_eq!(stat.allowed, STAT_CHOICES);
    assert!(stat.allowed.contains(&"pmode1"));
    for decl in PARAMETERS.iter().filter(|d| d.kind != ParamKind::Choice) {
        assert!(decl.allowed.is_empty(), "{}", decl.name);
    }
}

#[test]
fn test_typed_defaults_match_table() {
    let config = DestripeConfig::default();
    for (name, value) in config.values() {
        let decl = lookup(name).unwrap();
        assert_eq!(value, decl.default.to_value(), "{name}");
    }
}

#[test]
fn test_optional_floats_accept_none_or_number() {
    for name in ["lower", "upper", "sigrej", "atol"] {
        let decl = lookup(name).unwrap();
        assert_eq!(decl.parse_raw("none"), Some(ParamValue::OptFloat(None)), "{name}");
        assert_eq!(decl.parse_raw("1.5"), Some(ParamValue::OptFloat(Some(1.5))), "{name}");
        assert_eq!(decl.parse_raw("abc"), None, "{name}");
    }
}

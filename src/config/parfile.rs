//! TEAL-style `.cfg` parameter files.
//!
//! ```text
//! # acs_destripe parameters
//! _task_name_ = acs_destripe
//! input = "j8c0a1011_flt.fits"
//! stat = "median"
//! lower = None
//! clobber = False
//! ```
//!
//! One `name = value` entry per line. `#` starts a comment outside quotes. The optional
//! `_task_name_` entry must name this task.
//!
//! Unquoted values are trimmed. Values quoted with `"` or `'` are kept verbatim, except for
//! the escapes `\\`, `\"`, `\'`, `\n` and `\r`; any other backslash is literal.

use std::collections::HashSet;

use crate::config::loader::{apply_override, ConfigError};
use crate::config::schema::{DestripeConfig, ParamValue};
use crate::TASK_NAME;

/// Key carrying the task name in TEAL parameter files.
pub const TASK_KEY: &str = "_task_name_";

/// Parse a `.cfg` parameter file. Parameters not mentioned keep their defaults.
pub fn parse(content: &str) -> Result<DestripeConfig, ConfigError> {
    let mut config = DestripeConfig::default();
    let mut seen = HashSet::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line = idx + 1;
        let err = |message: String| ConfigError::ParFile { line, message };

        let text = raw_line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        if text.starts_with('[') {
            return Err(err("sections are not supported".to_string()));
        }

        let (key, rest) = text
            .split_once('=')
            .ok_or_else(|| err("expected `name = value`".to_string()))?;
        let key = key.trim();
        let value = parse_value(rest).map_err(|msg| err(msg.to_string()))?;
        let value = value.as_str();

        if key == TASK_KEY {
            if value != TASK_NAME {
                return Err(ConfigError::TaskMismatch {
                    found: value.to_string(),
                });
            }
            continue;
        }

        if !seen.insert(key) {
            return Err(err(format!("duplicate parameter `{key}`")));
        }

        apply_override(&mut config, key, value).map_err(|e| err(e.to_string()))?;
    }

    Ok(config)
}

/// Render a full parameter set, including the task name line.
pub fn render(config: &DestripeConfig) -> String {
    let mut out = format!("# {TASK_NAME} parameters\n{TASK_KEY} = {TASK_NAME}\n");
    for (name, value) in config.values() {
        out.push_str(name);
        out.push_str(" = ");
        out.push_str(&render_value(&value));
        out.push('\n');
    }
    out
}

fn render_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Str(s) | ParamValue::Choice(s) => quote(s),
        ParamValue::Bool(true) => "True".to_string(),
        ParamValue::Bool(false) => "False".to_string(),
        ParamValue::OptFloat(None) => "None".to_string(),
        other => other.to_string(),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Value part of a line (everything after the first `=`), without its trailing comment.
fn parse_value(rest: &str) -> Result<String, &'static str> {
    let rest = rest.trim_start();
    let mut chars = rest.chars();
    let quote = match chars.next() {
        Some(q @ ('"' | '\'')) => q,
        _ => {
            let value = rest.split_once('#').map_or(rest, |(value, _)| value);
            return Ok(value.trim().to_string());
        }
    };

    let mut value = String::new();
    loop {
        match chars.next() {
            None => return Err("unterminated quoted value"),
            Some(c) if c == quote => break,
            Some('\\') => match chars.next() {
                Some(c @ ('\\' | '"' | '\'')) => value.push(c),
                Some('n') => value.push('\n'),
                Some('r') => value.push('\r'),
                Some(c) => {
                    value.push('\\');
                    value.push(c);
                }
                None => return Err("unterminated quoted value"),
            },
            Some(c) => value.push(c),
        }
    }

    let trailing = chars.as_str().trim_start();
    if !trailing.is_empty() && !trailing.starts_with('#') {
        return Err("unexpected text after quoted value");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Statistic;

    #[test]
    fn test_parse_teal_file() {
        let content = r#"
# generated by TEAL
_task_name_ = acs_destripe
input = "j8c0a1011_flt.fits"   # science image
stat = median
sigrej = None
lower = -50
clobber = True
dqbits = '4+16'
"#;
        let config = parse(content).unwrap();
        assert_eq!(config.input, "j8c0a1011_flt.fits");
        assert_eq!(config.stat, Statistic::Median);
        assert_eq!(config.sigrej, None);
        assert_eq!(config.lower, Some(-50.0));
        assert!(config.clobber);
        assert_eq!(config.dqbits, "4+16");
        assert_eq!(config.maxiter, 15);
    }

    #[test]
    fn test_hash_inside_quotes_is_kept() {
        let config = parse("mask1 = \"mask#1.fits\" # trailing\n").unwrap();
        assert_eq!(config.mask1, "mask#1.fits");
    }

    #[test]
    fn test_rejects_other_task() {
        let err = parse("_task_name_ = acs_destripe_plus\n").unwrap_err();
        assert!(matches!(err, ConfigError::TaskMismatch { .. }));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse("maxiter = 10\nmaxiter = 12\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParFile { line: 2, .. }));

        let err = parse("\nstat = biweight\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParFile { line: 2, .. }));

        let err = parse("input = \"open\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParFile { line: 1, .. }));

        let err = parse("[acs_destripe]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParFile { line: 1, .. }));

        let err = parse("verbose\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParFile { line: 1, .. }));
    }

    #[test]
    fn test_quoted_values_kept_verbatim() {
        let config = parse("input = \" j8c0a1011_flt.fits \"\nmask1 = 'C:\\masks\\a.fits'\n")
            .unwrap();
        assert_eq!(config.input, " j8c0a1011_flt.fits ");
        assert_eq!(config.mask1, "C:\\masks\\a.fits");

        let err = parse("mask2 = \"a.fits\" b.fits\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParFile { line: 1, .. }));
    }

    #[test]
    fn test_awkward_strings_read_back() {
        let mut config = DestripeConfig::default();
        config.mask1 = "a'#\"b".to_string();
        config.mask2 = "dir\\sub\\m.fits".to_string();
        config.input = " j8c0a1011_flt.fits".to_string();
        config.dqbits = "4\n16".to_string();

        let text = render(&config);
        assert!(text.contains("mask1 = \"a'#\\\"b\"\n"));
        assert_eq!(parse(&text).unwrap(), config);
    }

    #[test]
    fn test_render_reads_back() {
        let mut config = DestripeConfig::default();
        config.suffix = "strp".to_string();
        config.upper = Some(4000.0);
        config.atol = None;
        config.verbose = false;

        let text = render(&config);
        assert!(text.contains("_task_name_ = acs_destripe\n"));
        assert!(text.contains("atol = None\n"));
        assert!(text.contains("verbose = False\n"));
        assert_eq!(parse(&text).unwrap(), config);
    }
}

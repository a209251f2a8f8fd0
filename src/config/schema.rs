//! Parameter schema for the `acs_destripe` task.
//!
//! Two views of the same parameter set live here:
//! - [`PARAMETERS`], the static declaration table (names, kinds, defaults, help text)
//! - [`DestripeConfig`], the typed configuration handed to the task
//!
//! [`DestripeConfig::get`] and [`DestripeConfig::set`] bridge the two by parameter name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;
use crate::config::parfile;
use crate::dqbits::{DqBits, DqBitsError};
use crate::input::InputSpec;

/// Literal accepted (case-insensitively) for an unset float-or-none parameter.
pub const NONE_LITERAL: &str = "none";

/// Allowed values of the `stat` parameter, in declaration order.
pub const STAT_CHOICES: &[&str] = &["pmode1", "pmode2", "mean", "median", "mode", "midpt"];

/// Kind of value a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    /// A float, or unset.
    FloatOrNone,
    Float,
    Boolean,
    /// One of a fixed set of strings.
    Choice,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::FloatOrNone => "float-or-none",
            ParamKind::Float => "float",
            ParamKind::Boolean => "boolean",
            ParamKind::Choice => "enumerated-option",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    OptFloat(Option<f64>),
    Bool(bool),
    Choice(String),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Str(_) => ParamKind::String,
            ParamValue::Int(_) => ParamKind::Integer,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::OptFloat(_) => ParamKind::FloatOrNone,
            ParamValue::Bool(_) => ParamKind::Boolean,
            ParamValue::Choice(_) => ParamKind::Choice,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) | ParamValue::Choice(s) => f.write_str(s),
            ParamValue::Int(i) => write!(f, "{i}"),
            // Debug keeps the decimal point on whole floats ("2.0", not "2").
            ParamValue::Float(x) | ParamValue::OptFloat(Some(x)) => write!(f, "{x:?}"),
            ParamValue::OptFloat(None) => f.write_str(NONE_LITERAL),
            ParamValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Default value of a declaration. `'static` counterpart of [`ParamValue`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Float(f64),
    OptFloat(Option<f64>),
    Bool(bool),
    Choice(&'static str),
}

impl DefaultValue {
    pub fn to_value(self) -> ParamValue {
        match self {
            DefaultValue::Str(s) => ParamValue::Str(s.to_string()),
            DefaultValue::Int(i) => ParamValue::Int(i),
            DefaultValue::Float(x) => ParamValue::Float(x),
            DefaultValue::OptFloat(x) => ParamValue::OptFloat(x),
            DefaultValue::Bool(b) => ParamValue::Bool(b),
            DefaultValue::Choice(s) => ParamValue::Choice(s.to_string()),
        }
    }
}

/// Declaration of a single task parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamDecl {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: DefaultValue,
    /// Non-empty only for [`ParamKind::Choice`].
    pub allowed: &'static [&'static str],
    pub description: &'static str,
}

impl ParamDecl {
    /// Parse a raw textual value (override or parameter-file entry) according to the kind.
    ///
    /// String values are taken verbatim; other kinds ignore surrounding whitespace.
    /// Returns `None` when the text is not a legal value of this parameter.
    pub fn parse_raw(&self, raw: &str) -> Option<ParamValue> {
        let text = raw.trim();
        match self.kind {
            ParamKind::String => Some(ParamValue::Str(raw.to_string())),
            ParamKind::Integer => text.parse().ok().map(ParamValue::Int),
            ParamKind::FloatOrNone => {
                if text.is_empty() || is_none_literal(text) {
                    Some(ParamValue::OptFloat(None))
                } else {
                    text.parse().ok().map(|x| ParamValue::OptFloat(Some(x)))
                }
            }
            ParamKind::Float => text.parse().ok().map(ParamValue::Float),
            ParamKind::Boolean => parse_bool(text).map(ParamValue::Bool),
            ParamKind::Choice => self
                .allowed
                .contains(&text)
                .then(|| ParamValue::Choice(text.to_string())),
        }
    }

    /// Whether `value` is a legal value of this parameter.
    ///
    /// Integers are legal for float parameters and plain strings for option parameters,
    /// matching what [`DestripeConfig::set`] stores.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match (self.kind, value) {
            (ParamKind::Choice, ParamValue::Choice(s) | ParamValue::Str(s)) => {
                self.allowed.contains(&s.as_str())
            }
            (ParamKind::Integer, ParamValue::Int(i)) => u32::try_from(*i).is_ok(),
            (ParamKind::Float, ParamValue::Float(_) | ParamValue::Int(_)) => true,
            (
                ParamKind::FloatOrNone,
                ParamValue::OptFloat(_) | ParamValue::Float(_) | ParamValue::Int(_),
            ) => true,
            (ParamKind::String, ParamValue::Str(_)) => true,
            (ParamKind::Boolean, ParamValue::Bool(_)) => true,
            _ => false,
        }
    }

    /// Human-readable description of what the parameter accepts.
    pub fn expected(&self) -> String {
        match self.kind {
            ParamKind::Choice => format!("one of {}", self.allowed.join(", ")),
            ParamKind::FloatOrNone => format!("a float or `{NONE_LITERAL}`"),
            ParamKind::Integer => "an integer".to_string(),
            ParamKind::Float => "a float".to_string(),
            ParamKind::Boolean => "a boolean".to_string(),
            ParamKind::String => "a string".to_string(),
        }
    }
}

pub fn is_none_literal(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(NONE_LITERAL)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// The `acs_destripe` parameter declarations, in display order.
pub static PARAMETERS: &[ParamDecl] = &[
    ParamDecl {
        name: "input",
        kind: ParamKind::String,
        default: DefaultValue::Str(""),
        allowed: &[],
        description: "Input file name, file-name suffix, comma-separated list, or @list file",
    },
    ParamDecl {
        name: "suffix",
        kind: ParamKind::String,
        default: DefaultValue::Str(""),
        allowed: &[],
        description: "Suffix appended to input root names to form output names",
    },
    ParamDecl {
        name: "stat",
        kind: ParamKind::Choice,
        default: DefaultValue::Choice("pmode1"),
        allowed: STAT_CHOICES,
        description: "Statistic used to compute the background of each image row",
    },
    ParamDecl {
        name: "maxiter",
        kind: ParamKind::Integer,
        default: DefaultValue::Int(15),
        allowed: &[],
        description: "Maximum number of sigma-clipping iterations",
    },
    ParamDecl {
        name: "sigrej",
        kind: ParamKind::FloatOrNone,
        default: DefaultValue::OptFloat(Some(2.0)),
        allowed: &[],
        description: "Sigma-clipping level in units of standard deviation \
                      (none disables clipping)",
    },
    ParamDecl {
        name: "lower",
        kind: ParamKind::FloatOrNone,
        default: DefaultValue::OptFloat(None),
        allowed: &[],
        description: "Lower limit of usable data values (none means unbounded)",
    },
    ParamDecl {
        name: "upper",
        kind: ParamKind::FloatOrNone,
        default: DefaultValue::OptFloat(None),
        allowed: &[],
        description: "Upper limit of usable data values (none means unbounded)",
    },
    ParamDecl {
        name: "binwidth",
        kind: ParamKind::Float,
        default: DefaultValue::Float(0.1),
        allowed: &[],
        description: "Histogram bin width for mode-based statistics, in units of sigma",
    },
    ParamDecl {
        name: "mask1",
        kind: ParamKind::String,
        default: DefaultValue::Str(""),
        allowed: &[],
        description: "Mask image for science extension 1 (empty for none)",
    },
    ParamDecl {
        name: "mask2",
        kind: ParamKind::String,
        default: DefaultValue::Str(""),
        allowed: &[],
        description: "Mask image for science extension 2 (empty for none)",
    },
    ParamDecl {
        name: "dqbits",
        kind: ParamKind::String,
        default: DefaultValue::Str(""),
        allowed: &[],
        description: "DQ bit flags to treat as good pixels: integer, '+'/',' list, \
                      '~' to invert, empty to ignore DQ",
    },
    ParamDecl {
        name: "rpt_clean",
        kind: ParamKind::Integer,
        default: DefaultValue::Int(0),
        allowed: &[],
        description: "Number of additional cleaning passes on the already destriped image",
    },
    ParamDecl {
        name: "atol",
        kind: ParamKind::FloatOrNone,
        default: DefaultValue::OptFloat(Some(0.01)),
        allowed: &[],
        description: "Stop repeat cleaning once stripe corrections fall below this value \
                      (none runs every pass)",
    },
    ParamDecl {
        name: "clobber",
        kind: ParamKind::Boolean,
        default: DefaultValue::Bool(false),
        allowed: &[],
        description: "Overwrite existing output files",
    },
    ParamDecl {
        name: "verbose",
        kind: ParamKind::Boolean,
        default: DefaultValue::Bool(true),
        allowed: &[],
        description: "Print informational messages",
    },
];

/// Look up a declaration by parameter name.
pub fn lookup(name: &str) -> Option<&'static ParamDecl> {
    PARAMETERS.iter().find(|decl| decl.name == name)
}

/// Background statistic used per image row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// Pearson mode estimate, `2.5 * median - 1.5 * mean`.
    #[default]
    Pmode1,
    /// Pearson mode estimate, `3.5 * median - 2.5 * mean`.
    Pmode2,
    Mean,
    Median,
    /// Histogram mode; bin width set by `binwidth`.
    Mode,
    /// Histogram estimate of the median.
    Midpt,
}

impl Statistic {
    pub const ALL: [Statistic; 6] = [
        Statistic::Pmode1,
        Statistic::Pmode2,
        Statistic::Mean,
        Statistic::Median,
        Statistic::Mode,
        Statistic::Midpt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Pmode1 => "pmode1",
            Statistic::Pmode2 => "pmode2",
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Mode => "mode",
            Statistic::Midpt => "midpt",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| {
                format!("unknown statistic `{s}`, expected one of {}", STAT_CHOICES.join(", "))
            })
    }
}

/// Resolved `acs_destripe` parameters.
///
/// Missing fields take their declared defaults; unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DestripeConfig {
    pub input: String,
    pub suffix: String,
    pub stat: Statistic,
    pub maxiter: u32,
    #[serde(with = "none_float")]
    pub sigrej: Option<f64>,
    #[serde(with = "none_float")]
    pub lower: Option<f64>,
    #[serde(with = "none_float")]
    pub upper: Option<f64>,
    pub binwidth: f64,
    pub mask1: String,
    pub mask2: String,
    pub dqbits: String,
    pub rpt_clean: u32,
    #[serde(with = "none_float")]
    pub atol: Option<f64>,
    pub clobber: bool,
    pub verbose: bool,
}

impl Default for DestripeConfig {
    fn default() -> Self {
        Self {
            input: String::new(),
            suffix: String::new(),
            stat: Statistic::Pmode1,
            maxiter: 15,
            sigrej: Some(2.0),
            lower: None,
            upper: None,
            binwidth: 0.1,
            mask1: String::new(),
            mask2: String::new(),
            dqbits: String::new(),
            rpt_clean: 0,
            atol: Some(0.01),
            clobber: false,
            verbose: true,
        }
    }
}

impl DestripeConfig {
    /// Current value of a parameter, or `None` for an unknown name.
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        let value = match name {
            "input" => ParamValue::Str(self.input.clone()),
            "suffix" => ParamValue::Str(self.suffix.clone()),
            "stat" => ParamValue::Choice(self.stat.as_str().to_string()),
            "maxiter" => ParamValue::Int(i64::from(self.maxiter)),
            "sigrej" => ParamValue::OptFloat(self.sigrej),
            "lower" => ParamValue::OptFloat(self.lower),
            "upper" => ParamValue::OptFloat(self.upper),
            "binwidth" => ParamValue::Float(self.binwidth),
            "mask1" => ParamValue::Str(self.mask1.clone()),
            "mask2" => ParamValue::Str(self.mask2.clone()),
            "dqbits" => ParamValue::Str(self.dqbits.clone()),
            "rpt_clean" => ParamValue::Int(i64::from(self.rpt_clean)),
            "atol" => ParamValue::OptFloat(self.atol),
            "clobber" => ParamValue::Bool(self.clobber),
            "verbose" => ParamValue::Bool(self.verbose),
            _ => return None,
        };
        Some(value)
    }

    /// Set a parameter by name.
    ///
    /// Integers are accepted for float parameters. Anything else that does not match the
    /// declared kind is rejected with [`ConfigError::InvalidValue`].
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ConfigError> {
        let decl = lookup(name).ok_or_else(|| ConfigError::UnknownParameter(name.to_string()))?;
        let invalid = || ConfigError::invalid(decl, &value.to_string());
        if !decl.accepts(&value) {
            return Err(invalid());
        }

        match (decl.name, &value) {
            ("input", ParamValue::Str(s)) => self.input = s.clone(),
            ("suffix", ParamValue::Str(s)) => self.suffix = s.clone(),
            ("mask1", ParamValue::Str(s)) => self.mask1 = s.clone(),
            ("mask2", ParamValue::Str(s)) => self.mask2 = s.clone(),
            ("dqbits", ParamValue::Str(s)) => self.dqbits = s.clone(),
            ("stat", ParamValue::Choice(s) | ParamValue::Str(s)) => {
                self.stat = s.parse().map_err(|_| invalid())?;
            }
            ("maxiter", ParamValue::Int(i)) => {
                self.maxiter = u32::try_from(*i).map_err(|_| invalid())?;
            }
            ("rpt_clean", ParamValue::Int(i)) => {
                self.rpt_clean = u32::try_from(*i).map_err(|_| invalid())?;
            }
            ("binwidth", ParamValue::Float(x)) => self.binwidth = *x,
            ("binwidth", ParamValue::Int(i)) => self.binwidth = *i as f64,
            ("sigrej" | "lower" | "upper" | "atol", _) => {
                let x = match &value {
                    ParamValue::OptFloat(x) => *x,
                    ParamValue::Float(x) => Some(*x),
                    ParamValue::Int(i) => Some(*i as f64),
                    _ => return Err(invalid()),
                };
                match decl.name {
                    "sigrej" => self.sigrej = x,
                    "lower" => self.lower = x,
                    "upper" => self.upper = x,
                    _ => self.atol = x,
                }
            }
            ("clobber", ParamValue::Bool(b)) => self.clobber = *b,
            ("verbose", ParamValue::Bool(b)) => self.verbose = *b,
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// All parameter values in declaration order.
    pub fn values(&self) -> Vec<(&'static str, ParamValue)> {
        PARAMETERS
            .iter()
            .filter_map(|decl| self.get(decl.name).map(|value| (decl.name, value)))
            .collect()
    }

    /// Parsed form of the `dqbits` parameter.
    pub fn dq_bits(&self) -> Result<DqBits, DqBitsError> {
        DqBits::parse(&self.dqbits)
    }

    /// Classified form of the `input` parameter.
    pub fn input_spec(&self) -> InputSpec {
        InputSpec::parse(&self.input)
    }

    /// Render as a TOML parameter file.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Render as pretty-printed JSON, with unset float-or-none parameters as `null`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_value(self)?;
        if let serde_json::Value::Object(map) = &mut json {
            for (name, value) in self.values() {
                if value == ParamValue::OptFloat(None) {
                    map.insert(name.to_string(), serde_json::Value::Null);
                }
            }
        }
        serde_json::to_string_pretty(&json)
    }

    /// Render as a TEAL-style `.cfg` parameter file.
    pub fn to_parfile(&self) -> String {
        parfile::render(self)
    }
}

/// Serde adapter for float-or-none fields.
///
/// Accepts numbers, numeric strings, `"none"` (any case), the empty string, and null.
/// `None` is written as `"none"` since TOML has no null.
mod none_float {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(x) => serializer.serialize_f64(*x),
            None => serializer.serialize_str(super::NONE_LITERAL),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NoneFloatVisitor)
    }

    struct NoneFloatVisitor;

    impl<'de> Visitor<'de> for NoneFloatVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "a number or \"{}\"", super::NONE_LITERAL)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let text = v.trim();
            if text.is_empty() || super::is_none_literal(text) {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }
}

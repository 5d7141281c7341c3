//! Typed argument binding for console commands.
//!
//! Commands declare their parameters as [`ParamSpec`]s. [`bind`] turns the
//! raw argument text of a command line into [`CommandArgs`] holding one
//! [`ArgValue`] per declared parameter.

use std::fmt;

use super::tokenizer::{get_remainder, tokenize};

/// Semantic type of a declared command parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Free text, passed through verbatim.
    Text,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// `true/false`, `1/0`, `on/off`, `yes/no`, `y/n`.
    Bool,
    /// One of a fixed set of names, matched ignoring case.
    Enum(EnumKind),
    /// A value that may be left out.
    Optional(Box<ParamKind>),
    /// A declared type the binder has no conversion for.
    Unsupported(&'static str),
}

/// Names of an enumeration parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumKind {
    /// Type name shown in error messages and usage strings.
    pub name: &'static str,
    /// Member names, in declaration order.
    pub variants: &'static [&'static str],
}

impl ParamKind {
    /// Create an enumeration kind.
    pub fn enumeration(name: &'static str, variants: &'static [&'static str]) -> Self {
        ParamKind::Enum(EnumKind { name, variants })
    }

    /// Wrap a kind as optional.
    pub fn optional(inner: ParamKind) -> Self {
        ParamKind::Optional(Box::new(inner))
    }

    /// Whether a value of this kind may be absent.
    pub fn is_optional(&self) -> bool {
        matches!(self, ParamKind::Optional(_))
    }

    /// Whether [`bind`] can convert tokens to this kind.
    pub fn is_bindable(&self) -> bool {
        match self {
            ParamKind::Optional(inner) => !inner.is_optional() && inner.is_bindable(),
            ParamKind::Enum(kind) => !kind.variants.is_empty(),
            ParamKind::Unsupported(_) => false,
            _ => true,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Text => f.write_str("text"),
            ParamKind::I8 => f.write_str("i8"),
            ParamKind::I16 => f.write_str("i16"),
            ParamKind::I32 => f.write_str("i32"),
            ParamKind::I64 => f.write_str("i64"),
            ParamKind::U8 => f.write_str("u8"),
            ParamKind::U16 => f.write_str("u16"),
            ParamKind::U32 => f.write_str("u32"),
            ParamKind::U64 => f.write_str("u64"),
            ParamKind::F32 => f.write_str("f32"),
            ParamKind::F64 => f.write_str("f64"),
            ParamKind::Bool => f.write_str("bool"),
            ParamKind::Enum(kind) => f.write_str(kind.name),
            ParamKind::Optional(inner) => write!(f, "{inner}?"),
            ParamKind::Unsupported(name) => f.write_str(name),
        }
    }
}

/// A bound argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Text(String),
    /// Any signed integer width.
    Int(i64),
    /// Any unsigned integer width.
    UInt(u64),
    /// `f32` or `f64`.
    Float(f64),
    Bool(bool),
    Enum {
        index: usize,
        name: &'static str,
    },
    /// An optional parameter that was left out.
    Absent,
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Text(s) => f.write_str(s),
            ArgValue::Int(v) => write!(f, "{v}"),
            ArgValue::UInt(v) => write!(f, "{v}"),
            ArgValue::Float(v) => write!(f, "{v}"),
            ArgValue::Bool(v) => write!(f, "{v}"),
            ArgValue::Enum { name, .. } => f.write_str(name),
            ArgValue::Absent => f.write_str("(none)"),
        }
    }
}

/// A declared command parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name, used in error messages.
    pub name: String,
    pub kind: ParamKind,
    /// Value used when no token is left for this parameter.
    pub default: Option<ArgValue>,
}

impl ParamSpec {
    /// Create a parameter without a default.
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Text)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::I32)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::F32)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Bool)
    }

    /// Create an optional parameter of the given kind.
    pub fn optional(name: impl Into<String>, kind: ParamKind) -> Self {
        Self::new(name, ParamKind::optional(kind))
    }

    /// Set the default value.
    pub fn default_value(mut self, value: ArgValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Usage string: `<name>` when required, `[name]` when it can be left out.
    pub fn usage(&self) -> String {
        if self.default.is_some() || self.kind.is_optional() {
            format!("[{}:{}]", self.name, self.kind)
        } else {
            format!("<{}:{}>", self.name, self.kind)
        }
    }
}

/// Error produced while binding arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The command declares no parameters but tokens were given.
    NoArgumentsExpected,
    /// A required parameter had no token and no default.
    MissingArgument(String),
    /// Tokens were left after every parameter was bound.
    TooManyArguments,
    /// A token could not be converted to the declared type.
    InvalidValue {
        param: String,
        expected: String,
        value: String,
    },
    /// The declared type has no conversion. Registration should have
    /// rejected the command.
    Unsupported(String),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::NoArgumentsExpected => write!(f, "takes no arguments"),
            BindError::MissingArgument(name) => write!(f, "missing argument: {}", name),
            BindError::TooManyArguments => write!(f, "too many arguments"),
            BindError::InvalidValue {
                param,
                expected,
                value,
            } => write!(f, "expected {} for '{}', got '{}'", expected, param, value),
            BindError::Unsupported(kind) => {
                write!(f, "internal error: parameter type '{}' cannot be bound", kind)
            }
        }
    }
}

impl std::error::Error for BindError {}

/// Arguments bound for one command invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    raw: String,
    names: Vec<String>,
    values: Vec<ArgValue>,
}

impl CommandArgs {
    /// Create arguments from already bound values.
    pub fn new(raw: impl Into<String>, names: Vec<String>, values: Vec<ArgValue>) -> Self {
        Self {
            raw: raw.into(),
            names,
            values,
        }
    }

    /// The raw argument text the values were bound from.
    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by position.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.values.get(index)
    }

    /// Get a value by parameter name.
    pub fn named(&self, name: &str) -> Option<&ArgValue> {
        let index = self.names.iter().position(|n| n == name)?;
        self.values.get(index)
    }

    /// Get a text value. `None` when absent or not text.
    pub fn text(&self, index: usize) -> Option<&str> {
        match self.get(index)? {
            ArgValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get an integer value, converting unsigned values that fit.
    pub fn int(&self, index: usize) -> Option<i64> {
        match self.get(index)? {
            ArgValue::Int(v) => Some(*v),
            ArgValue::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Get an unsigned value, converting non-negative signed values.
    pub fn uint(&self, index: usize) -> Option<u64> {
        match self.get(index)? {
            ArgValue::UInt(v) => Some(*v),
            ArgValue::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn float(&self, index: usize) -> Option<f64> {
        match self.get(index)? {
            ArgValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn bool(&self, index: usize) -> Option<bool> {
        match self.get(index)? {
            ArgValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the index of an enumeration value within its member list.
    pub fn enum_index(&self, index: usize) -> Option<usize> {
        match self.get(index)? {
            ArgValue::Enum { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Whether the value at `index` is an absent optional (or missing).
    pub fn is_absent(&self, index: usize) -> bool {
        matches!(self.get(index), None | Some(ArgValue::Absent))
    }

    /// Iterate over the bound values.
    pub fn iter(&self) -> impl Iterator<Item = &ArgValue> {
        self.values.iter()
    }
}

/// Check whether every declared parameter can be bound.
///
/// Used at registration time; commands failing this check are not registered.
pub fn can_bind_parameters(params: &[ParamSpec]) -> bool {
    params.iter().all(|param| param.kind.is_bindable())
}

/// Bind raw argument text to the declared parameters.
///
/// Parameters are bound positionally. A trailing [`ParamKind::Text`]
/// parameter takes the whole unconsumed remainder instead of a single token,
/// and binds to empty text when nothing is left.
/// When tokens run out, declared defaults are used, then optionals become
/// [`ArgValue::Absent`]; anything else is a missing argument.
///
/// # Examples
///
/// ```
/// use bevy_dev_console::core::{bind, ArgValue, ParamKind, ParamSpec};
///
/// let params = [ParamSpec::text("name"), ParamSpec::text("message")];
/// let args = bind("bob hello there", &params).unwrap();
/// assert_eq!(args.text(0), Some("bob"));
/// assert_eq!(args.text(1), Some("hello there"));
///
/// let params = [ParamSpec::int("x"), ParamSpec::optional("y", ParamKind::F32)];
/// let args = bind("5", &params).unwrap();
/// assert_eq!(args.int(0), Some(5));
/// assert_eq!(args.get(1), Some(&ArgValue::Absent));
/// ```
pub fn bind(raw: &str, params: &[ParamSpec]) -> Result<CommandArgs, BindError> {
    let tokens = tokenize(raw);
    let names = params.iter().map(|p| p.name.clone()).collect();

    if params.is_empty() {
        return if tokens.is_empty() {
            Ok(CommandArgs::new(raw, names, Vec::new()))
        } else {
            Err(BindError::NoArgumentsExpected)
        };
    }

    let last = params.len() - 1;
    let mut values = Vec::with_capacity(params.len());
    let mut next = 0;

    for (i, param) in params.iter().enumerate() {
        if i == last && param.kind == ParamKind::Text {
            values.push(ArgValue::Text(get_remainder(raw, &tokens, next)));
            next = tokens.len();
            continue;
        }

        match tokens.get(next) {
            Some(token) => {
                values.push(convert(&param.name, &param.kind, token)?);
                next += 1;
            }
            None => values.push(missing_value(param)?),
        }
    }

    if next < tokens.len() {
        return Err(BindError::TooManyArguments);
    }

    Ok(CommandArgs::new(raw, names, values))
}

fn missing_value(param: &ParamSpec) -> Result<ArgValue, BindError> {
    if let Some(default) = &param.default {
        return Ok(default.clone());
    }
    if param.kind.is_optional() {
        return Ok(ArgValue::Absent);
    }
    Err(BindError::MissingArgument(param.name.clone()))
}

/// Convert one token to the declared kind.
fn convert(name: &str, kind: &ParamKind, token: &str) -> Result<ArgValue, BindError> {
    let value = match kind {
        ParamKind::Text => Some(ArgValue::Text(token.to_string())),
        ParamKind::Optional(inner) => {
            if token.is_empty() {
                return Ok(ArgValue::Absent);
            }
            return convert(name, inner, token);
        }
        ParamKind::I8 => parse_int::<i8>(token),
        ParamKind::I16 => parse_int::<i16>(token),
        ParamKind::I32 => parse_int::<i32>(token),
        ParamKind::I64 => parse_int::<i64>(token),
        ParamKind::U8 => parse_uint::<u8>(token),
        ParamKind::U16 => parse_uint::<u16>(token),
        ParamKind::U32 => parse_uint::<u32>(token),
        ParamKind::U64 => parse_uint::<u64>(token),
        ParamKind::F32 => strip_thousands(token)
            .parse::<f32>()
            .ok()
            .map(|v| ArgValue::Float(f64::from(v))),
        ParamKind::F64 => strip_thousands(token)
            .parse::<f64>()
            .ok()
            .map(ArgValue::Float),
        ParamKind::Bool => parse_bool(token).map(ArgValue::Bool),
        ParamKind::Enum(kind) => parse_enum(kind, token),
        ParamKind::Unsupported(type_name) => {
            return Err(BindError::Unsupported(type_name.to_string()));
        }
    };

    value.ok_or_else(|| BindError::InvalidValue {
        param: name.to_string(),
        expected: kind.to_string(),
        value: token.to_string(),
    })
}

fn parse_int<T>(token: &str) -> Option<ArgValue>
where
    T: std::str::FromStr + Into<i64>,
{
    token.parse::<T>().ok().map(|v| ArgValue::Int(v.into()))
}

fn parse_uint<T>(token: &str) -> Option<ArgValue>
where
    T: std::str::FromStr + Into<u64>,
{
    token.parse::<T>().ok().map(|v| ArgValue::UInt(v.into()))
}

/// Floats accept `,` as a thousands separator (`1,000.5`).
fn strip_thousands(token: &str) -> String {
    token.replace(',', "")
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" | "y" => Some(true),
        "false" | "0" | "off" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Match a member name ignoring case, or a member index.
fn parse_enum(kind: &EnumKind, token: &str) -> Option<ArgValue> {
    let index = kind
        .variants
        .iter()
        .position(|variant| variant.eq_ignore_ascii_case(token))
        .or_else(|| {
            token
                .parse::<usize>()
                .ok()
                .filter(|&i| i < kind.variants.len())
        })?;

    Some(ArgValue::Enum {
        index,
        name: kind.variants[index],
    })
}

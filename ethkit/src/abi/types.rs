//! ABI parameter types and the type-string parser.

use core::fmt;
use core::str::FromStr;

use ethkit_common::WORD_SIZE;

use super::AbiError;

/// Deepest tuple/array nesting accepted in a type.
pub const MAX_TYPE_DEPTH: usize = 32;

/// Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Unsigned integer (bits: 8-256, must be multiple of 8).
    Uint(u16),
    /// Signed integer (bits: 8-256, must be multiple of 8).
    Int(u16),
    /// Address (20 bytes).
    Address,
    /// Boolean.
    Bool,
    /// Fixed-size bytes (1-32).
    FixedBytes(usize),
    /// Dynamic bytes.
    Bytes,
    /// Dynamic string.
    String,
    /// Fixed-size array.
    FixedArray(Box<ParamType>, usize),
    /// Dynamic-size array.
    DynamicArray(Box<ParamType>),
    /// Tuple (struct).
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Parses a type string such as `uint8[3][]` or `(uint256,string)[]`.
    ///
    /// Tuple and array nesting is limited to [`MAX_TYPE_DEPTH`] levels.
    pub fn parse(s: &str) -> Result<Self, AbiError> {
        let ty = parse_at(s, 0)?;
        ty.head_size()?;
        Ok(ty)
    }

    /// Parses a JSON descriptor type where `tuple` takes its fields from `components`.
    pub fn parse_with_components(
        ty: &str,
        components: Option<Vec<ParamType>>,
    ) -> Result<Self, AbiError> {
        let ty = ty.trim();
        match ty.strip_prefix("tuple") {
            Some(suffix) => {
                let fields = components.ok_or_else(|| {
                    AbiError::UnknownType(format!("{ty} without components"))
                })?;
                let tuple = apply_array_suffix(ParamType::Tuple(fields), suffix, ty, 0)?;
                tuple.validate()?;
                Ok(tuple)
            }
            None => ParamType::parse(ty),
        }
    }

    /// Checks a type built in code: integer widths, fixed-bytes lengths,
    /// non-empty fixed arrays, nesting depth and a representable head size.
    ///
    /// Types from [`ParamType::parse`] always pass.
    pub fn validate(&self) -> Result<(), AbiError> {
        self.validate_at(0)?;
        self.head_size().map(|_| ())
    }

    fn validate_at(&self, depth: usize) -> Result<(), AbiError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(AbiError::NestingTooDeep {
                max: MAX_TYPE_DEPTH,
            });
        }
        let unknown = || AbiError::UnknownType(self.to_string());
        match self {
            ParamType::Uint(bits) | ParamType::Int(bits) => {
                if !(8..=256).contains(bits) || bits % 8 != 0 {
                    return Err(unknown());
                }
            }
            ParamType::FixedBytes(len) => {
                if !(1..=32).contains(len) {
                    return Err(unknown());
                }
            }
            ParamType::FixedArray(inner, len) => {
                if *len == 0 {
                    return Err(unknown());
                }
                inner.validate_at(depth + 1)?;
            }
            ParamType::DynamicArray(inner) => inner.validate_at(depth + 1)?,
            ParamType::Tuple(types) => {
                for ty in types {
                    ty.validate_at(depth + 1)?;
                }
            }
            ParamType::Address | ParamType::Bool | ParamType::Bytes | ParamType::String => {}
        }
        Ok(())
    }

    /// Returns true if this type is dynamic (requires offset indirection).
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::DynamicArray(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Returns true if the encoding has a fixed size known from the type alone.
    #[inline]
    pub fn is_static(&self) -> bool {
        !self.is_dynamic()
    }

    /// Returns true for single-word elementary types.
    pub fn is_elementary(&self) -> bool {
        matches!(
            self,
            ParamType::Uint(_)
                | ParamType::Int(_)
                | ParamType::Address
                | ParamType::Bool
                | ParamType::FixedBytes(_)
        )
    }

    /// Returns the head size in bytes: the inline size of a static type,
    /// or one offset word for a dynamic one.
    pub fn head_size(&self) -> Result<usize, AbiError> {
        if self.is_dynamic() {
            return Ok(WORD_SIZE);
        }
        let too_large = || AbiError::TypeTooLarge(self.to_string());
        match self {
            ParamType::FixedArray(inner, len) => {
                inner.head_size()?.checked_mul(*len).ok_or_else(too_large)
            }
            ParamType::Tuple(types) => types.iter().try_fold(0usize, |acc, t| {
                acc.checked_add(t.head_size()?).ok_or_else(too_large)
            }),
            _ => Ok(WORD_SIZE),
        }
    }

    /// Renders the canonical form used in signatures.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Address => write!(f, "address"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::FixedBytes(len) => write!(f, "bytes{len}"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::String => write!(f, "string"),
            ParamType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            ParamType::DynamicArray(inner) => write!(f, "{inner}[]"),
            ParamType::Tuple(types) => {
                write!(f, "(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamType::parse(s)
    }
}

fn parse_at(s: &str, depth: usize) -> Result<ParamType, AbiError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(AbiError::NestingTooDeep {
            max: MAX_TYPE_DEPTH,
        });
    }
    let s = s.trim();
    let (base, suffix) = split_base(s)?;
    let base = if base.starts_with('(') {
        let inner = &base[1..base.len() - 1];
        let fields = split_top_level(inner)?
            .into_iter()
            .map(|field| parse_at(field, depth + 1))
            .collect::<Result<Vec<_>, _>>()?;
        ParamType::Tuple(fields)
    } else {
        parse_elementary(base)?
    };
    apply_array_suffix(base, suffix, s, depth)
}

/// Splits `s` into its base type and trailing `[..]` suffixes.
fn split_base(s: &str) -> Result<(&str, &str), AbiError> {
    if s.starts_with('(') {
        let mut depth = 0usize;
        for (i, c) in s.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok((&s[..=i], &s[i + 1..]));
                    }
                }
                _ => {}
            }
        }
        return Err(AbiError::UnknownType(s.to_string()));
    }
    match s.find('[') {
        Some(idx) => Ok((&s[..idx], &s[idx..])),
        None => Ok((s, "")),
    }
}

/// Wraps `base` in one array layer per `[N]` or `[]` group, left to right.
/// Each layer counts as one nesting level on top of `depth`.
fn apply_array_suffix(
    mut base: ParamType,
    mut suffix: &str,
    full: &str,
    mut depth: usize,
) -> Result<ParamType, AbiError> {
    let unknown = || AbiError::UnknownType(full.to_string());
    while !suffix.is_empty() {
        depth += 1;
        if depth > MAX_TYPE_DEPTH {
            return Err(AbiError::NestingTooDeep {
                max: MAX_TYPE_DEPTH,
            });
        }
        let rest = suffix.strip_prefix('[').ok_or_else(unknown)?;
        let close = rest.find(']').ok_or_else(unknown)?;
        let size = &rest[..close];
        base = if size.is_empty() {
            ParamType::DynamicArray(Box::new(base))
        } else {
            let len = parse_decimal(size).ok_or_else(unknown)?;
            if len == 0 {
                return Err(unknown());
            }
            ParamType::FixedArray(Box::new(base), len)
        };
        suffix = &rest[close + 1..];
    }
    Ok(base)
}

/// Splits a tuple body on commas that are not nested inside parentheses.
fn split_top_level(inner: &str) -> Result<Vec<&str>, AbiError> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| AbiError::UnknownType(inner.to_string()))?;
            }
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&inner[start..]);
    Ok(parts)
}

fn parse_elementary(s: &str) -> Result<ParamType, AbiError> {
    let unknown = || AbiError::UnknownType(s.to_string());
    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        "byte" => return Ok(ParamType::FixedBytes(1)),
        "uint" => return Ok(ParamType::Uint(256)),
        "int" => return Ok(ParamType::Int(256)),
        _ => {}
    }

    if let Some(bits) = s.strip_prefix("uint") {
        return parse_bits(bits).map(ParamType::Uint).ok_or_else(unknown);
    }
    if let Some(bits) = s.strip_prefix("int") {
        return parse_bits(bits).map(ParamType::Int).ok_or_else(unknown);
    }
    if let Some(len) = s.strip_prefix("bytes") {
        return match parse_decimal(len) {
            Some(n @ 1..=32) => Ok(ParamType::FixedBytes(n)),
            _ => Err(unknown()),
        };
    }
    Err(unknown())
}

fn parse_bits(s: &str) -> Option<u16> {
    let bits = parse_decimal(s)?;
    if (8..=256).contains(&bits) && bits % 8 == 0 {
        Some(bits as u16)
    } else {
        None
    }
}

/// Parses plain ASCII digits with no sign and no leading zero.
fn parse_decimal(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0')) {
        return None;
    }
    s.parse().ok()
}

// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::error::{RegTreeError, Result};
use crate::provider::RegistryProvider;
use crate::string::{
    multi_utf16le_to_strings, string_to_utf16le, strings_to_multi_utf16le, utf16le_to_string,
};
use ::byteorder::{BigEndian, ByteOrder, LittleEndian};
use core::mem;
use enumn::N;
use tracing::trace;

/// Possible data types of a registry value.
///
/// Only some of them can be decoded into a [`Value`], see [`ValueType::is_supported`].
#[derive(Clone, Copy, Debug, Eq, N, PartialEq)]
#[repr(u32)]
pub enum ValueType {
    RegNone = 0x0000_0000,
    RegSZ = 0x0000_0001,
    RegExpandSZ = 0x0000_0002,
    RegBinary = 0x0000_0003,
    RegDWord = 0x0000_0004,
    RegDWordBigEndian = 0x0000_0005,
    RegLink = 0x0000_0006,
    RegMultiSZ = 0x0000_0007,
    RegResourceList = 0x0000_0008,
    RegFullResourceDescriptor = 0x0000_0009,
    RegResourceRequirementsList = 0x0000_000a,
    RegQWord = 0x0000_000b,
}

impl ValueType {
    /// Returns whether values of this type can be decoded into a [`Value`] and written from one.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            Self::RegNone
                | Self::RegSZ
                | Self::RegExpandSZ
                | Self::RegBinary
                | Self::RegDWord
                | Self::RegQWord
                | Self::RegMultiSZ
        )
    }
}

/// Decoded data of a registry value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// `REG_NONE`: the value exists, but carries no typed data.
    None,
    /// `REG_SZ`
    String(String),
    /// `REG_EXPAND_SZ`, with all environment placeholders already expanded when decoded.
    ExpandString(String),
    /// `REG_DWORD` or `REG_QWORD`
    Integer(u64),
    /// `REG_BINARY`
    Binary(Vec<u8>),
    /// `REG_MULTI_SZ`
    MultiString(Vec<String>),
}

impl Value {
    /// Returns a short description of this variant for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::String(_) => "string",
            Self::ExpandString(_) => "expandable string",
            Self::Integer(_) => "integer",
            Self::Binary(_) => "binary",
            Self::MultiString(_) => "multi-string",
        }
    }

    /// Returns the string if this is a [`Value::String`] or [`Value::ExpandString`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::ExpandString(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this is a [`Value::Integer`].
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// A registry value as stored: its name, data type code, and raw data bytes.
///
/// The data type is kept as the raw `u32` code, because a store may contain codes
/// that have no [`ValueType`] counterpart.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawValue {
    name: String,
    data_type: u32,
    data: Vec<u8>,
}

impl RawValue {
    pub fn new(name: impl Into<String>, data_type: u32, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data_type,
            data,
        }
    }

    /// Encodes `value` as raw data of type `value_type`.
    ///
    /// The variant of `value` must fit `value_type`, otherwise [`RegTreeError::TypeMismatch`]
    /// is returned.
    pub fn encode(name: impl Into<String>, value: &Value, value_type: ValueType) -> Result<Self> {
        let name = name.into();

        if !value_type.is_supported() {
            return Err(RegTreeError::UnsupportedType {
                name,
                actual: value_type as u32,
            });
        }

        let data = match (value_type, value) {
            (ValueType::RegNone, Value::None) => Vec::new(),
            (ValueType::RegSZ, Value::String(s))
            | (ValueType::RegExpandSZ, Value::String(s))
            | (ValueType::RegSZ, Value::ExpandString(s))
            | (ValueType::RegExpandSZ, Value::ExpandString(s)) => {
                // Decoding stops at the first NUL character.
                if s.contains('\0') {
                    return Err(RegTreeError::InvalidArgument {
                        reason: "REG_SZ and REG_EXPAND_SZ data must not contain NUL characters",
                    });
                }

                string_to_utf16le(s)
            }
            (ValueType::RegDWord, Value::Integer(n)) if *n <= u64::from(u32::MAX) => {
                let mut data = vec![0; mem::size_of::<u32>()];
                LittleEndian::write_u32(&mut data, *n as u32);
                data
            }
            (ValueType::RegQWord, Value::Integer(n)) => {
                let mut data = vec![0; mem::size_of::<u64>()];
                LittleEndian::write_u64(&mut data, *n);
                data
            }
            (ValueType::RegBinary, Value::Binary(bytes)) => bytes.clone(),
            (ValueType::RegMultiSZ, Value::MultiString(strings)) => {
                // An empty string would terminate the list prematurely.
                if strings.iter().any(|s| s.is_empty() || s.contains('\0')) {
                    return Err(RegTreeError::InvalidArgument {
                        reason: "REG_MULTI_SZ entries must be non-empty \
                                 and must not contain NUL characters",
                    });
                }

                strings_to_multi_utf16le(strings)
            }
            (expected, value) => {
                return Err(RegTreeError::TypeMismatch {
                    name,
                    expected,
                    actual: value.kind(),
                });
            }
        };

        Ok(Self {
            name,
            data_type: value_type as u32,
            data,
        })
    }

    /// Returns the name of this value (empty for the default value of a key).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw data bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw data type code.
    pub fn data_type_code(&self) -> u32 {
        self.data_type
    }

    /// Returns the data type of this value.
    pub fn data_type(&self) -> Result<ValueType> {
        ValueType::n(self.data_type).ok_or_else(|| self.unsupported())
    }

    /// Checks if this is a `REG_SZ` or `REG_EXPAND_SZ` value
    /// and returns the data as a [`String`] in that case.
    ///
    /// Placeholders of `REG_EXPAND_SZ` data are not expanded here.
    pub fn string_data(&self) -> Result<String> {
        self.expect_type(&[ValueType::RegSZ, ValueType::RegExpandSZ])?;
        utf16le_to_string(&self.data).map_err(|reason| self.decode_error(reason))
    }

    /// Checks if this is a `REG_DWORD` or `REG_DWORD_BIG_ENDIAN` value
    /// and returns the data as a [`u32`] in that case.
    pub fn dword_data(&self) -> Result<u32> {
        let data_type =
            self.expect_type(&[ValueType::RegDWord, ValueType::RegDWordBigEndian])?;

        // DWORD data must be exactly 4 bytes long.
        if self.data.len() != mem::size_of::<u32>() {
            return Err(self.decode_error("DWORD data must be exactly 4 bytes long"));
        }

        if data_type == ValueType::RegDWordBigEndian {
            Ok(BigEndian::read_u32(&self.data))
        } else {
            Ok(LittleEndian::read_u32(&self.data))
        }
    }

    /// Checks if this is a `REG_QWORD` value and returns the data as a [`u64`] in that case.
    pub fn qword_data(&self) -> Result<u64> {
        self.expect_type(&[ValueType::RegQWord])?;

        // QWORD data must be exactly 8 bytes long.
        if self.data.len() != mem::size_of::<u64>() {
            return Err(self.decode_error("QWORD data must be exactly 8 bytes long"));
        }

        Ok(LittleEndian::read_u64(&self.data))
    }

    /// Returns the data of a `REG_DWORD` or `REG_QWORD` value widened to a [`u64`].
    pub fn integer_data(&self) -> Result<u64> {
        match self.expect_type(&[ValueType::RegDWord, ValueType::RegQWord])? {
            ValueType::RegDWord => self.dword_data().map(u64::from),
            _ => self.qword_data(),
        }
    }

    /// Checks if this is a `REG_BINARY` value and returns a copy of its data in that case.
    pub fn binary_data(&self) -> Result<Vec<u8>> {
        self.expect_type(&[ValueType::RegBinary])?;
        Ok(self.data.clone())
    }

    /// Checks if this is a `REG_MULTI_SZ` value
    /// and returns the data as a [`Vec`] of [`String`]s in that case.
    pub fn multi_string_data(&self) -> Result<Vec<String>> {
        self.expect_type(&[ValueType::RegMultiSZ])?;
        multi_utf16le_to_strings(&self.data).map_err(|reason| self.decode_error(reason))
    }

    fn expect_type(&self, expected: &'static [ValueType]) -> Result<ValueType> {
        let data_type = self.data_type()?;

        if expected.contains(&data_type) {
            Ok(data_type)
        } else {
            Err(self.decode_error(&format!(
                "expected one of the data types {:?}, but found {:?}",
                expected, data_type
            )))
        }
    }

    fn decode_error(&self, reason: &str) -> RegTreeError {
        RegTreeError::Decode {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }

    fn unsupported(&self) -> RegTreeError {
        RegTreeError::UnsupportedType {
            name: self.name.clone(),
            actual: self.data_type,
        }
    }
}

/// Reads the value `name` through `handle` and decodes it according to its data type.
///
/// `REG_NONE` values decode to [`Value::None`].
/// `REG_EXPAND_SZ` values are expanded through [`RegistryProvider::expand_string`].
/// Data types for which [`ValueType::is_supported`] is false fail with
/// [`RegTreeError::UnsupportedType`].
pub fn decode_value<P>(provider: &P, handle: &P::Handle, name: &str) -> Result<Value>
where
    P: RegistryProvider,
{
    let raw = provider.read_raw_value(handle, name)?;
    let value = decode_raw_value(provider, &raw)?;
    trace!(value_name = name, kind = value.kind(), "decoded value");
    Ok(value)
}

pub(crate) fn decode_raw_value<P>(provider: &P, raw: &RawValue) -> Result<Value>
where
    P: RegistryProvider,
{
    match raw.data_type()? {
        ValueType::RegNone => Ok(Value::None),
        ValueType::RegSZ => raw.string_data().map(Value::String),
        ValueType::RegExpandSZ => {
            let text = raw.string_data()?;
            let expanded = provider
                .expand_string(&text)
                .map_err(|e| raw.decode_error(&e.to_string()))?;
            Ok(Value::ExpandString(expanded))
        }
        ValueType::RegDWord | ValueType::RegQWord => raw.integer_data().map(Value::Integer),
        ValueType::RegBinary => raw.binary_data().map(Value::Binary),
        ValueType::RegMultiSZ => raw.multi_string_data().map(Value::MultiString),
        _ => Err(raw.unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn test_data() {
        // Encode values of all data types we support and prove that we correctly
        // read their data.
        let key_value =
            RawValue::encode("reg-sz", &Value::String("sz-test".into()), ValueType::RegSZ)
                .unwrap();
        assert_eq!(key_value.data_type().unwrap(), ValueType::RegSZ);
        assert_eq!(key_value.string_data().unwrap(), "sz-test");

        let key_value = RawValue::new(
            "reg-sz-without-terminating-nul",
            ValueType::RegSZ as u32,
            "sz-test".encode_utf16().flat_map(u16::to_le_bytes).collect(),
        );
        assert_eq!(key_value.string_data().unwrap(), "sz-test");

        let key_value = RawValue::encode(
            "reg-multi-sz",
            &Value::MultiString(vec!["multi-sz-test".into(), "line2".into()]),
            ValueType::RegMultiSZ,
        )
        .unwrap();
        assert_eq!(
            key_value.multi_string_data().unwrap(),
            vec!["multi-sz-test", "line2"]
        );

        let key_value =
            RawValue::encode("dword", &Value::Integer(42), ValueType::RegDWord).unwrap();
        assert_eq!(key_value.data(), &[42, 0, 0, 0]);
        assert_eq!(key_value.dword_data().unwrap(), 42);
        assert_eq!(key_value.integer_data().unwrap(), 42);

        // The same bytes interpreted as a big-endian value yield 42 << 24.
        let key_value = RawValue::new(
            "dword-big-endian",
            ValueType::RegDWordBigEndian as u32,
            vec![42, 0, 0, 0],
        );
        assert_eq!(key_value.dword_data().unwrap(), 42 << 24);

        let key_value =
            RawValue::encode("qword", &Value::Integer(u64::MAX), ValueType::RegQWord).unwrap();
        assert_eq!(key_value.qword_data().unwrap(), u64::MAX);

        let key_value =
            RawValue::encode("binary", &Value::Binary(vec![1, 2, 3, 4, 5]), ValueType::RegBinary)
                .unwrap();
        assert_eq!(key_value.binary_data().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_data_size_checks() {
        let key_value = RawValue::new("short-dword", ValueType::RegDWord as u32, vec![1, 2, 3]);
        assert!(matches!(
            key_value.dword_data(),
            Err(RegTreeError::Decode { name, .. }) if name == "short-dword"
        ));

        let key_value = RawValue::new("long-qword", ValueType::RegQWord as u32, vec![0; 9]);
        assert!(matches!(key_value.qword_data(), Err(RegTreeError::Decode { .. })));

        let key_value = RawValue::new("odd-sz", ValueType::RegSZ as u32, vec![0x41, 0x00, 0x42]);
        assert!(matches!(key_value.string_data(), Err(RegTreeError::Decode { .. })));

        // Asking for the wrong kind of data is a decoding error as well.
        let key_value = RawValue::new("binary", ValueType::RegBinary as u32, vec![1]);
        assert!(matches!(key_value.string_data(), Err(RegTreeError::Decode { .. })));
    }

    #[test]
    fn test_unknown_data_type() {
        let key_value = RawValue::new("strange", 0x1234, vec![]);
        assert_eq!(
            key_value.data_type(),
            Err(RegTreeError::UnsupportedType {
                name: "strange".into(),
                actual: 0x1234
            })
        );
        assert!(!ValueType::RegLink.is_supported());
        assert!(ValueType::RegQWord.is_supported());
    }

    #[test]
    fn test_encode_type_mismatch() {
        assert!(matches!(
            RawValue::encode("v", &Value::Integer(1), ValueType::RegSZ),
            Err(RegTreeError::TypeMismatch {
                expected: ValueType::RegSZ,
                actual: "integer",
                ..
            })
        ));

        // A DWORD cannot hold more than 32 bits.
        assert!(matches!(
            RawValue::encode("v", &Value::Integer(u64::from(u32::MAX) + 1), ValueType::RegDWord),
            Err(RegTreeError::TypeMismatch { .. })
        ));

        assert!(matches!(
            RawValue::encode("v", &Value::MultiString(vec![String::new()]), ValueType::RegMultiSZ),
            Err(RegTreeError::InvalidArgument { .. })
        ));

        // An embedded NUL would silently truncate the string when reading it back.
        assert!(matches!(
            RawValue::encode("v", &Value::String("a\0b".into()), ValueType::RegSZ),
            Err(RegTreeError::InvalidArgument { .. })
        ));
        assert!(matches!(
            RawValue::encode("v", &Value::String("%TEMP%\0x".into()), ValueType::RegExpandSZ),
            Err(RegTreeError::InvalidArgument { .. })
        ));

        assert!(matches!(
            RawValue::encode("v", &Value::Binary(vec![]), ValueType::RegLink),
            Err(RegTreeError::UnsupportedType { actual: 6, .. })
        ));
    }
}

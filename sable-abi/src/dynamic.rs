//! The dynamic codec: walk a resolved type against an untyped value.
//!
//! Values are [`serde_json::Value`]s (object key order is preserved, which
//! keeps struct fields in declaration order across a decode/encode round
//! trip). Both directions share the same precedence: descend aliases, apply
//! the optional / binary-extension / array modifiers, then dispatch on the
//! node kind.

use std::rc::Rc;

use sable_codec::{Decode, Decoder, Encode, Encoder};
use sable_primitives::{Asset, ExtendedAsset, Name, Symbol, SymbolCode, TimePoint, TimePointSec};
use serde_json::Value;
use tracing::trace;

use crate::resolver::{Abi, Builtin, ResolvedType, TypeKind};
use crate::Error;

/// Everything below this nesting depth is considered hostile input.
const MAX_DEPTH: usize = 128;

impl Abi {
    /// Encode an untyped value as `type_name` into fresh wire bytes.
    pub fn encode_value(&self, type_name: &str, value: &Value) -> Result<Vec<u8>, Error> {
        let node = self.resolve(type_name)?;
        let mut e = Encoder::new();
        encode_node(&node, value, &mut e, type_name, 0)?;
        Ok(e.into_bytes())
    }

    /// Decode wire bytes as `type_name` into an untyped value.
    pub fn decode_value(&self, type_name: &str, bytes: &[u8]) -> Result<Value, Error> {
        let node = self.resolve(type_name)?;
        let mut d = Decoder::new(bytes);
        let value = decode_node(&node, &mut d, type_name, 0)?;
        if d.remaining() > 0 {
            return Err(sable_codec::Error::TrailingBytes(d.remaining()).into());
        }
        Ok(value)
    }
}

fn mismatch(expected: impl Into<String>, value: &Value, path: &str) -> Error {
    Error::InvalidValue {
        expected: expected.into(),
        value: serde_json::to_string(value).unwrap_or_else(|_| "<opaque>".into()),
        path: path.to_string(),
    }
}

fn check_depth(depth: usize) -> Result<usize, Error> {
    if depth >= MAX_DEPTH {
        return Err(Error::MaxDepthExceeded);
    }
    Ok(depth + 1)
}

pub(crate) fn encode_node(
    node: &Rc<ResolvedType>,
    value: &Value,
    e: &mut Encoder,
    path: &str,
    depth: usize,
) -> Result<(), Error> {
    let depth = check_depth(depth)?;

    if node.is_extension && value.is_null() {
        // trailing absent extension emits nothing; the struct walk has
        // already verified it really is trailing
        return Ok(());
    }

    if node.is_optional {
        if value.is_null() {
            e.bool(false);
            return Ok(());
        }
        e.bool(true);
    }

    if node.is_array {
        let items = value.as_array().ok_or_else(|| mismatch(format!("{}[]", node.name), value, path))?;
        e.varuint32(items.len() as u32);
        for (i, item) in items.iter().enumerate() {
            encode_base(node, item, e, &format!("{path}[{i}]"), depth)?;
        }
        return Ok(());
    }

    encode_base(node, value, e, path, depth)
}

fn encode_base(
    node: &Rc<ResolvedType>,
    value: &Value,
    e: &mut Encoder,
    path: &str,
    depth: usize,
) -> Result<(), Error> {
    match &*node.kind.borrow() {
        TypeKind::Unresolved => Err(Error::TypeNotEncodable(node.name.clone())),
        TypeKind::Alias(target) => encode_node(target, value, e, path, depth),
        TypeKind::Builtin(builtin) => encode_builtin(*builtin, value, e, path),
        TypeKind::Struct(fields) => {
            let object = value
                .as_object()
                .ok_or_else(|| mismatch(&node.name, value, path))?;
            for (i, (field_name, field_node)) in fields.iter().enumerate() {
                let field_value = object.get(field_name).unwrap_or(&Value::Null);
                if field_node.is_extension && field_value.is_null() {
                    // only a trailing run of absent extensions may vanish
                    let trailing_absent = fields[i..].iter().all(|(n, f)| {
                        f.is_extension && object.get(n).unwrap_or(&Value::Null).is_null()
                    });
                    if trailing_absent {
                        break;
                    }
                    return Err(mismatch(
                        &field_node.full_name,
                        field_value,
                        &format!("{path}.{field_name}"),
                    ));
                }
                encode_node(
                    field_node,
                    field_value,
                    e,
                    &format!("{path}.{field_name}"),
                    depth,
                )?;
            }
            Ok(())
        }
        TypeKind::Variant(alternatives) => {
            let (label, inner) = match value.as_array().map(|a| a.as_slice()) {
                Some([Value::String(label), inner]) => (label, inner),
                _ => return Err(mismatch("[\"type\", value] pair", value, path)),
            };
            let index = alternatives
                .iter()
                .position(|alt| alt.full_name == *label)
                .ok_or_else(|| Error::UnknownVariant(label.clone()))?;
            e.varuint32(index as u32);
            encode_node(&alternatives[index], inner, e, path, depth)
        }
    }
}

fn encode_builtin(builtin: Builtin, value: &Value, e: &mut Encoder, path: &str) -> Result<(), Error> {
    macro_rules! parse_string {
        ($ty:ty, $expected:literal) => {{
            let s = value
                .as_str()
                .ok_or_else(|| mismatch($expected, value, path))?;
            let parsed: $ty = s.parse().map_err(|_| mismatch($expected, value, path))?;
            parsed
        }};
    }

    match builtin {
        Builtin::Bool => match value {
            Value::Bool(b) => e.bool(*b),
            // legacy servers sometimes emit 0/1
            Value::Number(n) if n.as_u64() == Some(0) => e.bool(false),
            Value::Number(n) if n.as_u64() == Some(1) => e.bool(true),
            _ => return Err(mismatch("bool", value, path)),
        },
        Builtin::Int8 => e.i8(int_from(value, path, "int8")?),
        Builtin::Int16 => e.i16(int_from(value, path, "int16")?),
        Builtin::Int32 => e.i32(int_from(value, path, "int32")?),
        Builtin::Int64 => {
            let v: i64 = match value {
                Value::String(s) => s.parse().map_err(|_| mismatch("int64", value, path))?,
                _ => int_from(value, path, "int64")?,
            };
            e.i64(v);
        }
        Builtin::Uint8 => e.u8(uint_from(value, path, "uint8")?),
        Builtin::Uint16 => e.u16(uint_from(value, path, "uint16")?),
        Builtin::Uint32 => e.u32(uint_from(value, path, "uint32")?),
        Builtin::Uint64 => {
            let v: u64 = match value {
                Value::String(s) => s.parse().map_err(|_| mismatch("uint64", value, path))?,
                _ => uint_from(value, path, "uint64")?,
            };
            e.u64(v);
        }
        Builtin::Varint32 => e.varint32(int_from(value, path, "varint32")?),
        Builtin::Varuint32 => e.varuint32(uint_from(value, path, "varuint32")?),
        Builtin::Float32 => e.f32(float_from(value, path, "float32")? as f32),
        Builtin::Float64 => e.f64(float_from(value, path, "float64")?),
        Builtin::String => {
            let s = value.as_str().ok_or_else(|| mismatch("string", value, path))?;
            e.str(s);
        }
        Builtin::Bytes => {
            let s = value.as_str().ok_or_else(|| mismatch("bytes", value, path))?;
            let raw = hex::decode(s).map_err(|_| mismatch("hex string", value, path))?;
            e.blob(&raw);
        }
        Builtin::Name => {
            let s = value.as_str().ok_or_else(|| mismatch("name", value, path))?;
            e.u64(Name::new(s).raw());
        }
        Builtin::Asset => e.raw(&sable_codec::to_vec(&parse_string!(Asset, "asset"))),
        Builtin::ExtendedAsset => {
            let object = value
                .as_object()
                .ok_or_else(|| mismatch("extended_asset", value, path))?;
            let quantity = object.get("quantity").unwrap_or(&Value::Null);
            let contract = object.get("contract").unwrap_or(&Value::Null);
            encode_builtin(Builtin::Asset, quantity, e, &format!("{path}.quantity"))?;
            encode_builtin(Builtin::Name, contract, e, &format!("{path}.contract"))?;
        }
        Builtin::Symbol => e.u64(parse_string!(Symbol, "symbol").raw()),
        Builtin::SymbolCode => e.u64(parse_string!(SymbolCode, "symbol_code").raw()),
        Builtin::Checksum160 => {
            e.raw(parse_string!(sable_crypto::hash::Checksum160, "checksum160").as_ref())
        }
        Builtin::Checksum256 => {
            e.raw(parse_string!(sable_crypto::hash::Checksum256, "checksum256").as_ref())
        }
        Builtin::Checksum512 => {
            e.raw(parse_string!(sable_crypto::hash::Checksum512, "checksum512").as_ref())
        }
        Builtin::PublicKey => {
            parse_string!(sable_crypto::key::PublicKey, "public_key").encode(e)
        }
        Builtin::Signature => parse_string!(sable_crypto::key::Signature, "signature").encode(e),
        Builtin::TimePoint => parse_string!(TimePoint, "time_point").encode(e),
        Builtin::TimePointSec => parse_string!(TimePointSec, "time_point_sec").encode(e),
    }
    Ok(())
}

fn int_from<T: TryFrom<i64>>(value: &Value, path: &str, expected: &str) -> Result<T, Error> {
    value
        .as_i64()
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| mismatch(expected, value, path))
}

fn uint_from<T: TryFrom<u64>>(value: &Value, path: &str, expected: &str) -> Result<T, Error> {
    value
        .as_u64()
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| mismatch(expected, value, path))
}

fn float_from(value: &Value, path: &str, expected: &str) -> Result<f64, Error> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch(expected, value, path)),
        Value::String(s) => s.parse().map_err(|_| mismatch(expected, value, path)),
        _ => Err(mismatch(expected, value, path)),
    }
}

pub(crate) fn decode_node(
    node: &Rc<ResolvedType>,
    d: &mut Decoder,
    path: &str,
    depth: usize,
) -> Result<Value, Error> {
    let depth = check_depth(depth)?;

    if node.is_extension && d.remaining() == 0 {
        // the stream ending is how an absent extension encodes
        return Ok(Value::Null);
    }

    if node.is_optional {
        if !d.bool()? {
            return Ok(Value::Null);
        }
    }

    if node.is_array {
        let len = d.varuint32()? as usize;
        trace!(len, path, "decoding array");
        let mut items = Vec::with_capacity(len.min(4096));
        for i in 0..len {
            items.push(decode_base(node, d, &format!("{path}[{i}]"), depth)?);
        }
        return Ok(Value::Array(items));
    }

    decode_base(node, d, path, depth)
}

fn decode_base(
    node: &Rc<ResolvedType>,
    d: &mut Decoder,
    path: &str,
    depth: usize,
) -> Result<Value, Error> {
    match &*node.kind.borrow() {
        TypeKind::Unresolved => Err(Error::UnknownType(node.name.clone())),
        TypeKind::Alias(target) => decode_node(target, d, path, depth),
        TypeKind::Builtin(builtin) => decode_builtin(*builtin, d),
        TypeKind::Struct(fields) => {
            let mut object = serde_json::Map::with_capacity(fields.len());
            for (field_name, field_node) in fields {
                let value = decode_node(field_node, d, &format!("{path}.{field_name}"), depth)?;
                object.insert(field_name.clone(), value);
            }
            Ok(Value::Object(object))
        }
        TypeKind::Variant(alternatives) => {
            let index = d.varuint32()? as usize;
            let alt = alternatives
                .get(index)
                .ok_or_else(|| Error::UnknownVariant(index.to_string()))?;
            let inner = decode_node(alt, d, path, depth)?;
            Ok(Value::Array(vec![
                Value::String(alt.full_name.clone()),
                inner,
            ]))
        }
    }
}

fn decode_builtin(builtin: Builtin, d: &mut Decoder) -> Result<Value, Error> {
    Ok(match builtin {
        Builtin::Bool => Value::Bool(d.bool()?),
        Builtin::Int8 => d.i8()?.into(),
        Builtin::Int16 => d.i16()?.into(),
        Builtin::Int32 => d.i32()?.into(),
        Builtin::Int64 => {
            let v = d.i64()?;
            // past 32 bits the canonical JSON form switches to a string
            if v.unsigned_abs() > u32::MAX as u64 {
                Value::String(v.to_string())
            } else {
                v.into()
            }
        }
        Builtin::Uint8 => d.u8()?.into(),
        Builtin::Uint16 => d.u16()?.into(),
        Builtin::Uint32 => d.u32()?.into(),
        Builtin::Uint64 => {
            let v = d.u64()?;
            if v > u32::MAX as u64 {
                Value::String(v.to_string())
            } else {
                v.into()
            }
        }
        Builtin::Varint32 => d.varint32()?.into(),
        Builtin::Varuint32 => d.varuint32()?.into(),
        Builtin::Float32 => Value::String(d.f32()?.to_string()),
        Builtin::Float64 => Value::String(d.f64()?.to_string()),
        Builtin::String => Value::String(d.str()?),
        Builtin::Bytes => Value::String(hex::encode(d.blob()?)),
        Builtin::Name => Value::String(Name::from_raw(d.u64()?).to_string()),
        Builtin::Asset => Value::String(Asset::decode(d)?.to_string()),
        Builtin::ExtendedAsset => {
            let ea = ExtendedAsset {
                quantity: Asset::decode(d)?,
                contract: Name::from_raw(d.u64()?),
            };
            serde_json::to_value(ea)?
        }
        Builtin::Symbol => Value::String(Symbol::from_raw(d.u64()?).to_string()),
        Builtin::SymbolCode => Value::String(SymbolCode::from_raw(d.u64()?).to_string()),
        Builtin::Checksum160 => {
            Value::String(sable_crypto::hash::Checksum160::decode(d)?.to_string())
        }
        Builtin::Checksum256 => {
            Value::String(sable_crypto::hash::Checksum256::decode(d)?.to_string())
        }
        Builtin::Checksum512 => {
            Value::String(sable_crypto::hash::Checksum512::decode(d)?.to_string())
        }
        Builtin::PublicKey => {
            Value::String(sable_crypto::key::PublicKey::decode(d)?.to_string())
        }
        Builtin::Signature => {
            Value::String(sable_crypto::key::Signature::decode(d)?.to_string())
        }
        Builtin::TimePoint => Value::String(TimePoint::decode(d)?.to_string()),
        Builtin::TimePointSec => Value::String(TimePointSec::decode(d)?.to_string()),
    })
}

//! Resolution of ABI type names into a codec-ready type graph.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::def::{AbiDef, StructDef};
use crate::Error;

/// The builtin leaf types the dynamic codec knows natively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Varint32,
    Varuint32,
    Float32,
    Float64,
    String,
    Bytes,
    Name,
    Asset,
    ExtendedAsset,
    Symbol,
    SymbolCode,
    Checksum160,
    Checksum256,
    Checksum512,
    PublicKey,
    Signature,
    TimePoint,
    TimePointSec,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        Some(match name {
            "bool" => Builtin::Bool,
            "int8" => Builtin::Int8,
            "int16" => Builtin::Int16,
            "int32" => Builtin::Int32,
            "int64" => Builtin::Int64,
            "uint8" => Builtin::Uint8,
            "uint16" => Builtin::Uint16,
            "uint32" => Builtin::Uint32,
            "uint64" => Builtin::Uint64,
            "varint32" => Builtin::Varint32,
            "varuint32" => Builtin::Varuint32,
            "float32" => Builtin::Float32,
            "float64" => Builtin::Float64,
            "string" => Builtin::String,
            "bytes" => Builtin::Bytes,
            "name" => Builtin::Name,
            "asset" => Builtin::Asset,
            "extended_asset" => Builtin::ExtendedAsset,
            "symbol" => Builtin::Symbol,
            "symbol_code" => Builtin::SymbolCode,
            "checksum160" => Builtin::Checksum160,
            "checksum256" => Builtin::Checksum256,
            "checksum512" => Builtin::Checksum512,
            "public_key" => Builtin::PublicKey,
            "signature" => Builtin::Signature,
            "time_point" => Builtin::TimePoint,
            "time_point_sec" => Builtin::TimePointSec,
            _ => return None,
        })
    }
}

/// What a resolved node turned out to be.
#[derive(Debug)]
pub enum TypeKind {
    /// No definition matched; encoding or decoding against it fails.
    Unresolved,
    Builtin(Builtin),
    /// Typedef target, or the prior resolution when an alias cycle was cut.
    Alias(Rc<ResolvedType>),
    /// Fields in encoding order, base struct fields already prepended.
    Struct(Vec<(String, Rc<ResolvedType>)>),
    /// Alternatives in tag order.
    Variant(Vec<Rc<ResolvedType>>),
}

/// A node of the resolved type graph.
///
/// The three suffix flags come off the type name right-to-left:
/// `thing[]?$` is an optional array of `thing` carried as a binary
/// extension.
#[derive(Debug)]
pub struct ResolvedType {
    /// Name with the suffixes stripped.
    pub name: String,
    /// Name as written in the ABI, suffixes included; variants label their
    /// alternatives with this.
    pub full_name: String,
    pub is_array: bool,
    pub is_optional: bool,
    pub is_extension: bool,
    pub kind: RefCell<TypeKind>,
}

fn strip_suffixes(full: &str) -> (&str, bool, bool, bool) {
    let mut name = full;
    let mut extension = false;
    let mut optional = false;
    let mut array = false;
    if let Some(rest) = name.strip_suffix('$') {
        extension = true;
        name = rest;
    }
    if let Some(rest) = name.strip_suffix('?') {
        optional = true;
        name = rest;
    }
    if let Some(rest) = name.strip_suffix("[]") {
        array = true;
        name = rest;
    }
    (name, array, optional, extension)
}

/// A parsed ABI plus the machinery to resolve its type names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abi {
    pub def: AbiDef,
}

impl Abi {
    pub fn from_def(def: AbiDef) -> Self {
        Abi { def }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(Abi {
            def: serde_json::from_str(json)?,
        })
    }

    pub fn from_bin(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Abi {
            def: sable_codec::from_slice(bytes)?,
        })
    }

    pub fn to_bin(&self) -> Vec<u8> {
        sable_codec::to_vec(&self.def)
    }

    /// The argument type declared for an action, if any.
    pub fn action_type(&self, action: sable_primitives::Name) -> Option<&str> {
        self.def
            .actions
            .iter()
            .find(|a| a.name == action)
            .map(|a| a.type_name.as_str())
    }

    /// Resolve a type name into a graph node.
    ///
    /// Unknown names still produce a node (so that error reporting can name
    /// them); using such a node fails with [`Error::UnknownType`]. Only a
    /// circular struct inheritance chain fails here.
    pub fn resolve(&self, type_name: &str) -> Result<Rc<ResolvedType>, Error> {
        let mut seen = HashMap::new();
        self.resolve_inner(type_name, &mut seen)
    }

    fn resolve_inner(
        &self,
        full_name: &str,
        seen: &mut HashMap<String, Rc<ResolvedType>>,
    ) -> Result<Rc<ResolvedType>, Error> {
        let (name, is_array, is_optional, is_extension) = strip_suffixes(full_name);

        if let Some(prior) = seen.get(name) {
            // cycle cut: alias to the first resolution of this name
            return Ok(Rc::new(ResolvedType {
                name: name.to_string(),
                full_name: full_name.to_string(),
                is_array,
                is_optional,
                is_extension,
                kind: RefCell::new(TypeKind::Alias(prior.clone())),
            }));
        }

        let node = Rc::new(ResolvedType {
            name: name.to_string(),
            full_name: full_name.to_string(),
            is_array,
            is_optional,
            is_extension,
            kind: RefCell::new(TypeKind::Unresolved),
        });
        seen.insert(name.to_string(), node.clone());

        let kind = if let Some(td) = self.def.types.iter().find(|t| t.new_type_name == name) {
            TypeKind::Alias(self.resolve_inner(&td.target, seen)?)
        } else if let Some(sd) = self.def.structs.iter().find(|s| s.name == name) {
            let mut ancestry = vec![sd.name.clone()];
            TypeKind::Struct(self.struct_fields(sd, seen, &mut ancestry)?)
        } else if let Some(vd) = self.def.variants.iter().find(|v| v.name == name) {
            let alternatives = vd
                .types
                .iter()
                .map(|t| self.resolve_inner(t, seen))
                .collect::<Result<Vec<_>, _>>()?;
            TypeKind::Variant(alternatives)
        } else if let Some(builtin) = Builtin::from_name(name) {
            TypeKind::Builtin(builtin)
        } else {
            trace!(type_name = name, "no definition matched");
            TypeKind::Unresolved
        };
        *node.kind.borrow_mut() = kind;
        Ok(node)
    }

    fn struct_fields(
        &self,
        sd: &StructDef,
        seen: &mut HashMap<String, Rc<ResolvedType>>,
        ancestry: &mut Vec<String>,
    ) -> Result<Vec<(String, Rc<ResolvedType>)>, Error> {
        let mut fields = Vec::with_capacity(sd.fields.len());
        if !sd.base.is_empty() {
            if ancestry.iter().any(|n| *n == sd.base) {
                return Err(Error::CircularReference(sd.base.clone()));
            }
            let base = self
                .def
                .structs
                .iter()
                .find(|s| s.name == sd.base)
                .ok_or_else(|| Error::UnknownType(sd.base.clone()))?;
            ancestry.push(base.name.clone());
            fields.extend(self.struct_fields(base, seen, ancestry)?);
            ancestry.pop();
        }
        for field in &sd.fields {
            fields.push((field.name.clone(), self.resolve_inner(&field.type_name, seen)?));
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def::{FieldDef, TypeDef, VariantDef};

    fn abi_with(def: AbiDef) -> Abi {
        Abi::from_def(def)
    }

    #[test]
    fn suffix_stripping_order() {
        assert_eq!(strip_suffixes("thing"), ("thing", false, false, false));
        assert_eq!(strip_suffixes("thing[]"), ("thing", true, false, false));
        assert_eq!(strip_suffixes("thing?"), ("thing", false, true, false));
        assert_eq!(strip_suffixes("thing[]?$"), ("thing", true, true, true));
        // the order is fixed, a '?' before '[]' does not strip
        assert_eq!(strip_suffixes("thing?[]"), ("thing?", true, false, false));
    }

    #[test]
    fn builtins_resolve() {
        let abi = abi_with(AbiDef::default());
        let node = abi.resolve("uint64").unwrap();
        assert!(matches!(
            *node.kind.borrow(),
            TypeKind::Builtin(Builtin::Uint64)
        ));
    }

    #[test]
    fn typedefs_chain() {
        let abi = abi_with(AbiDef {
            types: vec![
                TypeDef {
                    new_type_name: "quantity".into(),
                    target: "amount".into(),
                },
                TypeDef {
                    new_type_name: "amount".into(),
                    target: "asset".into(),
                },
            ],
            ..Default::default()
        });
        let node = abi.resolve("quantity").unwrap();
        let kind = node.kind.borrow();
        let TypeKind::Alias(target) = &*kind else {
            panic!("expected alias");
        };
        assert_eq!(target.name, "amount");
    }

    #[test]
    fn alias_cycle_terminates() {
        let abi = abi_with(AbiDef {
            types: vec![
                TypeDef {
                    new_type_name: "a".into(),
                    target: "b".into(),
                },
                TypeDef {
                    new_type_name: "b".into(),
                    target: "a".into(),
                },
            ],
            ..Default::default()
        });
        let node = abi.resolve("a").unwrap();
        // a -> b -> alias back to the first resolution of a
        let kind_a = node.kind.borrow();
        let TypeKind::Alias(b) = &*kind_a else {
            panic!("expected alias");
        };
        let kind_b = b.kind.borrow();
        let TypeKind::Alias(back) = &*kind_b else {
            panic!("expected alias");
        };
        assert!(Rc::ptr_eq(back, &node) || back.name == "a");
    }

    #[test]
    fn struct_base_fields_are_prepended() {
        let abi = abi_with(AbiDef {
            structs: vec![
                StructDef {
                    name: "header".into(),
                    base: "".into(),
                    fields: vec![FieldDef {
                        name: "id".into(),
                        type_name: "uint64".into(),
                    }],
                },
                StructDef {
                    name: "record".into(),
                    base: "header".into(),
                    fields: vec![FieldDef {
                        name: "note".into(),
                        type_name: "string".into(),
                    }],
                },
            ],
            ..Default::default()
        });
        let node = abi.resolve("record").unwrap();
        let kind = node.kind.borrow();
        let TypeKind::Struct(fields) = &*kind else {
            panic!("expected struct");
        };
        let names: Vec<_> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["id", "note"]);
    }

    #[test]
    fn struct_base_cycle_is_an_error() {
        let abi = abi_with(AbiDef {
            structs: vec![
                StructDef {
                    name: "a".into(),
                    base: "b".into(),
                    fields: vec![],
                },
                StructDef {
                    name: "b".into(),
                    base: "a".into(),
                    fields: vec![],
                },
            ],
            ..Default::default()
        });
        assert!(matches!(
            abi.resolve("a"),
            Err(Error::CircularReference(_))
        ));
    }

    #[test]
    fn variant_alternatives_resolve_in_order() {
        let abi = abi_with(AbiDef {
            variants: vec![VariantDef {
                name: "id".into(),
                types: vec!["uint64".into(), "name".into()],
            }],
            ..Default::default()
        });
        let node = abi.resolve("id").unwrap();
        let kind = node.kind.borrow();
        let TypeKind::Variant(alts) = &*kind else {
            panic!("expected variant");
        };
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0].full_name, "uint64");
        assert_eq!(alts[1].full_name, "name");
    }

    #[test]
    fn unknown_names_stay_unresolved() {
        let abi = abi_with(AbiDef::default());
        let node = abi.resolve("no_such_type").unwrap();
        assert!(matches!(*node.kind.borrow(), TypeKind::Unresolved));
    }
}

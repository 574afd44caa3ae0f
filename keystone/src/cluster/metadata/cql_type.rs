//! Parsing of CQL type names found in schema rows and ordering of user defined
//! types by their dependencies.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

use keystone_cql::identifier::CqlIdentifier;
use keystone_cql::utils::parse::{ParseErrorCause, ParseResult, ParserState};

use super::{CollectionType, ColumnType, NativeType, PerTable, UserDefinedType};
use crate::errors::{MissingUserDefinedType, SchemaParseError};

/// A column type whose user defined types are referred to by name only.
/// Becomes a [ColumnType] once the definitions of the keyspace are known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PreColumnType {
    Native(NativeType),
    Collection {
        frozen: bool,
        typ: PreCollectionType,
    },
    Tuple(Vec<PreColumnType>),
    Vector {
        typ: Box<PreColumnType>,
        dimensions: u16,
    },
    UserDefinedType {
        frozen: bool,
        name: String,
    },
}

impl PreColumnType {
    pub(crate) fn into_cql_type(
        self,
        keyspace_name: &str,
        keyspace_udts: &PerTable<Arc<UserDefinedType>>,
    ) -> Result<ColumnType, MissingUserDefinedType> {
        match self {
            PreColumnType::Native(n) => Ok(ColumnType::Native(n)),
            PreColumnType::Collection { frozen, typ: type_ } => type_
                .into_collection_type(keyspace_name, keyspace_udts)
                .map(|inner| ColumnType::Collection { frozen, typ: inner }),
            PreColumnType::Tuple(t) => t
                .into_iter()
                .map(|t| t.into_cql_type(keyspace_name, keyspace_udts))
                .collect::<Result<Vec<ColumnType>, MissingUserDefinedType>>()
                .map(ColumnType::Tuple),
            PreColumnType::Vector {
                typ: type_,
                dimensions,
            } => type_
                .into_cql_type(keyspace_name, keyspace_udts)
                .map(|inner| ColumnType::Vector {
                    typ: Box::new(inner),
                    dimensions,
                }),
            PreColumnType::UserDefinedType { frozen, name } => {
                let Some(definition) = keyspace_udts.get(&name) else {
                    return Err(MissingUserDefinedType {
                        name,
                        keyspace: keyspace_name.to_owned(),
                    });
                };
                Ok(ColumnType::UserDefinedType {
                    frozen,
                    definition: definition.clone(),
                })
            }
        }
    }

    /// Calls `what` with the name of every user defined type this type refers to.
    fn for_each_referenced_udt(&self, what: &mut impl FnMut(&str)) {
        match self {
            PreColumnType::Native(_) => (),
            PreColumnType::Collection { typ: type_, .. } => match type_ {
                PreCollectionType::List(t) | PreCollectionType::Set(t) => {
                    t.for_each_referenced_udt(what)
                }
                PreCollectionType::Map(t1, t2) => {
                    t1.for_each_referenced_udt(what);
                    t2.for_each_referenced_udt(what);
                }
            },
            PreColumnType::Tuple(types) => types
                .iter()
                .for_each(|type_| type_.for_each_referenced_udt(what)),
            PreColumnType::Vector { typ: type_, .. } => type_.for_each_referenced_udt(what),
            PreColumnType::UserDefinedType { name, .. } => what(name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PreCollectionType {
    List(Box<PreColumnType>),
    Map(Box<PreColumnType>, Box<PreColumnType>),
    Set(Box<PreColumnType>),
}

impl PreCollectionType {
    fn into_collection_type(
        self,
        keyspace_name: &str,
        keyspace_udts: &PerTable<Arc<UserDefinedType>>,
    ) -> Result<CollectionType, MissingUserDefinedType> {
        match self {
            PreCollectionType::List(t) => t
                .into_cql_type(keyspace_name, keyspace_udts)
                .map(|inner| CollectionType::List(Box::new(inner))),
            PreCollectionType::Map(tk, tv) => Ok(CollectionType::Map(
                Box::new(tk.into_cql_type(keyspace_name, keyspace_udts)?),
                Box::new(tv.into_cql_type(keyspace_name, keyspace_udts)?),
            )),
            PreCollectionType::Set(t) => t
                .into_cql_type(keyspace_name, keyspace_udts)
                .map(|inner| CollectionType::Set(Box::new(inner))),
        }
    }
}

pub(crate) fn map_string_to_cql_type(typ: &str) -> Result<PreColumnType, SchemaParseError> {
    match parse_cql_type(ParserState::new(typ)) {
        Err(err) => Err(SchemaParseError::InvalidCqlType {
            typ: typ.to_string(),
            position: err.calculate_position(typ).unwrap_or(0),
            reason: err.get_cause().to_string(),
        }),
        Ok((_, p)) if !p.is_at_eof() => Err(SchemaParseError::InvalidCqlType {
            typ: typ.to_string(),
            position: p.calculate_position(typ).unwrap_or(0),
            reason: "leftover characters".to_string(),
        }),
        Ok((typ, _)) => Ok(typ),
    }
}

fn parse_cql_type(p: ParserState<'_>) -> ParseResult<(PreColumnType, ParserState<'_>)> {
    if let Ok(p) = p.accept("frozen<") {
        let (inner_type, p) = parse_cql_type(p)?;
        let p = p.accept(">")?;

        Ok((freeze_type(inner_type), p))
    } else if let Ok(p) = p.accept("map<") {
        let (key, p) = parse_cql_type(p)?;
        let p = p.accept(",")?.skip_white();
        let (value, p) = parse_cql_type(p)?;
        let p = p.accept(">")?;

        let typ = PreColumnType::Collection {
            frozen: false,
            typ: PreCollectionType::Map(Box::new(key), Box::new(value)),
        };

        Ok((typ, p))
    } else if let Ok(p) = p.accept("list<") {
        let (inner_type, p) = parse_cql_type(p)?;
        let p = p.accept(">")?;

        let typ = PreColumnType::Collection {
            frozen: false,
            typ: PreCollectionType::List(Box::new(inner_type)),
        };

        Ok((typ, p))
    } else if let Ok(p) = p.accept("set<") {
        let (inner_type, p) = parse_cql_type(p)?;
        let p = p.accept(">")?;

        let typ = PreColumnType::Collection {
            frozen: false,
            typ: PreCollectionType::Set(Box::new(inner_type)),
        };

        Ok((typ, p))
    } else if let Ok(p) = p.accept("tuple<") {
        let mut types = Vec::new();
        let p = p.parse_while(|p| {
            let (inner_type, p) = parse_cql_type(p)?;
            types.push(inner_type);

            if let Ok(p) = p.accept(",") {
                Ok((true, p.skip_white()))
            } else if let Ok(p) = p.accept(">") {
                Ok((false, p))
            } else {
                Err(p.error(ParseErrorCause::Other("expected \",\" or \">\"")))
            }
        })?;

        Ok((PreColumnType::Tuple(types), p))
    } else if let Ok(p) = p.accept("vector<") {
        let (inner_type, p) = parse_cql_type(p)?;

        let p = p.skip_white().accept(",")?.skip_white();
        let (dimensions, p) = p.parse_u16()?;
        let p = p.skip_white().accept(">")?;

        let typ = PreColumnType::Vector {
            typ: Box::new(inner_type),
            dimensions,
        };

        Ok((typ, p))
    } else if let Ok((typ, p)) = parse_native_type(p) {
        Ok((PreColumnType::Native(typ), p))
    } else if let Ok((name, p)) = parse_user_defined_type(p) {
        let typ = PreColumnType::UserDefinedType { frozen: false, name };
        Ok((typ, p))
    } else {
        Err(p.error(ParseErrorCause::Other("invalid cql type")))
    }
}

fn parse_native_type(p: ParserState) -> ParseResult<(NativeType, ParserState)> {
    let (tok, new_p) = p.take_while(|c| c.is_alphanumeric() || c == '_');
    match NativeType::from_cql_name(tok) {
        Some(typ) => Ok((typ, new_p)),
        None => Err(p.error(ParseErrorCause::Other("invalid native type"))),
    }
}

fn parse_user_defined_type(p: ParserState) -> ParseResult<(String, ParserState)> {
    // Case-sensitive names come double-quoted.
    if p.peek() == Some('"') {
        let (quoted, p) = p.take_cql_value()?;
        let name = CqlIdentifier::from_cql(quoted);
        return Ok((name.as_internal().to_owned(), p));
    }
    // Dots are accepted here because the names may be fully qualified.
    let (tok, p) = p.take_while(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '$');
    if tok.is_empty() {
        return Err(p.error(ParseErrorCause::Other("invalid user defined type")));
    }
    Ok((tok.to_owned(), p))
}

fn freeze_type(typ: PreColumnType) -> PreColumnType {
    match typ {
        PreColumnType::Collection { typ: type_, .. } => PreColumnType::Collection {
            frozen: true,
            typ: type_,
        },
        PreColumnType::UserDefinedType { name, .. } => {
            PreColumnType::UserDefinedType { frozen: true, name }
        }
        other => other,
    }
}

/// A user defined type as read from a `system_schema.types` row,
/// with field types parsed but not yet resolved.
#[derive(Debug)]
pub(crate) struct UdtDefinition {
    pub(crate) keyspace_name: String,
    pub(crate) type_name: String,
    pub(crate) field_names: Vec<String>,
    pub(crate) field_types: Vec<PreColumnType>,
}

impl UdtDefinition {
    pub(crate) fn parse(
        keyspace_name: String,
        type_name: String,
        field_names: Vec<String>,
        field_types: &[String],
    ) -> Result<Self, SchemaParseError> {
        let field_types = field_types
            .iter()
            .map(|type_| map_string_to_cql_type(type_))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            keyspace_name,
            type_name,
            field_names,
            field_types,
        })
    }
}

/// Orders the definitions so that every type comes after all the types it refers to.
///
/// References to types missing from `udts` are ignored here; they are reported
/// when the definitions are resolved.
pub(crate) fn topo_sort_udts(udts: &mut Vec<UdtDefinition>) -> Result<(), SchemaParseError> {
    // Build an indegree map: for each node in the graph, how many directly depending types it has.
    let mut indegs = udts
        .drain(..)
        .map(|def| {
            (
                (def.keyspace_name.clone(), def.type_name.clone()),
                (def, Cell::new(0u32)),
            )
        })
        .collect::<HashMap<_, _>>();

    // For each node in the graph...
    for (def, _) in indegs.values() {
        let mut increment_referred_udts = |type_name: &str| {
            let deg = indegs
                .get(&(def.keyspace_name.clone(), type_name.to_string()))
                .map(|(_, count)| count);

            if let Some(deg_cell) = deg {
                deg_cell.set(deg_cell.get() + 1);
            }
        };

        // For each type referred by the node...
        for field_type in def.field_types.iter() {
            field_type.for_each_referenced_udt(&mut increment_referred_udts);
        }
    }

    let mut sorted = Vec::with_capacity(indegs.len());
    let mut next_idx = 0;

    // Schedule keys that had an initial indeg of 0
    for (key, _) in indegs.iter().filter(|(_, (_, deg))| deg.get() == 0) {
        sorted.push(key);
    }

    while let Some(key @ (keyspace, _type_name)) = sorted.get(next_idx).copied() {
        next_idx += 1;
        // Decrement the counters of all UDTs that this UDT depends upon
        // and then schedule them if their counter drops to 0
        let mut decrement_referred_udts = |type_name: &str| {
            let key_value = indegs.get_key_value(&(keyspace.clone(), type_name.to_string()));

            if let Some((ref_key, (_, cnt))) = key_value {
                let new_cnt = cnt.get() - 1;
                cnt.set(new_cnt);
                if new_cnt == 0 {
                    sorted.push(ref_key);
                }
            }
        };

        let Some((def, _)) = indegs.get(key) else {
            continue;
        };
        for field_type in def.field_types.iter() {
            field_type.for_each_referenced_udt(&mut decrement_referred_udts);
        }
    }

    if sorted.len() < indegs.len() {
        // Some UDTs could not become leaves in the graph, which implies cycles.
        return Err(SchemaParseError::CircularTypeDependency);
    }

    let owned_sorted = sorted.into_iter().cloned().collect::<Vec<_>>();
    for key in owned_sorted.into_iter().rev() {
        if let Some((def, _)) = indegs.remove(&key) {
            udts.push(def);
        }
    }

    Ok(())
}

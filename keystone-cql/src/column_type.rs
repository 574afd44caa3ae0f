//! CQL type model: the server-side types that codecs are bound to
//! and that schema metadata describes columns with.

use std::fmt;
use std::sync::Arc;

/// A CQL native (non-composite) type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NativeType {
    Ascii,
    Boolean,
    Blob,
    Counter,
    Date,
    Decimal,
    Double,
    Duration,
    Float,
    Int,
    BigInt,
    Text,
    Timestamp,
    Inet,
    SmallInt,
    TinyInt,
    Time,
    Timeuuid,
    Uuid,
    Varint,
}

impl NativeType {
    /// Name of the type as it appears in CQL statements and in `system_schema`.
    pub fn cql_name(self) -> &'static str {
        match self {
            NativeType::Ascii => "ascii",
            NativeType::Boolean => "boolean",
            NativeType::Blob => "blob",
            NativeType::Counter => "counter",
            NativeType::Date => "date",
            NativeType::Decimal => "decimal",
            NativeType::Double => "double",
            NativeType::Duration => "duration",
            NativeType::Float => "float",
            NativeType::Int => "int",
            NativeType::BigInt => "bigint",
            NativeType::Text => "text",
            NativeType::Timestamp => "timestamp",
            NativeType::Inet => "inet",
            NativeType::SmallInt => "smallint",
            NativeType::TinyInt => "tinyint",
            NativeType::Time => "time",
            NativeType::Timeuuid => "timeuuid",
            NativeType::Uuid => "uuid",
            NativeType::Varint => "varint",
        }
    }

    /// Inverse of [NativeType::cql_name].
    pub fn from_cql_name(name: &str) -> Option<Self> {
        let typ = match name {
            "ascii" => NativeType::Ascii,
            "boolean" => NativeType::Boolean,
            "blob" => NativeType::Blob,
            "counter" => NativeType::Counter,
            "date" => NativeType::Date,
            "decimal" => NativeType::Decimal,
            "double" => NativeType::Double,
            "duration" => NativeType::Duration,
            "float" => NativeType::Float,
            "int" => NativeType::Int,
            "bigint" => NativeType::BigInt,
            "text" | "varchar" => NativeType::Text,
            "timestamp" => NativeType::Timestamp,
            "inet" => NativeType::Inet,
            "smallint" => NativeType::SmallInt,
            "tinyint" => NativeType::TinyInt,
            "time" => NativeType::Time,
            "timeuuid" => NativeType::Timeuuid,
            "uuid" => NativeType::Uuid,
            "varint" => NativeType::Varint,
            _ => return None,
        };
        Some(typ)
    }
}

/// A CQL collection type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CollectionType {
    List(Box<ColumnType>),
    Map(Box<ColumnType>, Box<ColumnType>),
    Set(Box<ColumnType>),
}

/// A definition of a user defined type, shared between all the columns
/// (and other UDTs) that refer to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDefinedType {
    pub name: String,
    pub keyspace: String,
    pub field_types: Vec<(String, ColumnType)>,
}

/// A CQL type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ColumnType {
    Native(NativeType),
    Collection {
        frozen: bool,
        typ: CollectionType,
    },
    Vector {
        typ: Box<ColumnType>,
        dimensions: u16,
    },
    UserDefinedType {
        frozen: bool,
        definition: Arc<UserDefinedType>,
    },
    Tuple(Vec<ColumnType>),
}

impl ColumnType {
    /// `list<elem>`, not frozen.
    pub fn list_of(elem: ColumnType) -> Self {
        ColumnType::Collection {
            frozen: false,
            typ: CollectionType::List(Box::new(elem)),
        }
    }

    /// `set<elem>`, not frozen.
    pub fn set_of(elem: ColumnType) -> Self {
        ColumnType::Collection {
            frozen: false,
            typ: CollectionType::Set(Box::new(elem)),
        }
    }

    /// `map<key, value>`, not frozen.
    pub fn map_of(key: ColumnType, value: ColumnType) -> Self {
        ColumnType::Collection {
            frozen: false,
            typ: CollectionType::Map(Box::new(key), Box::new(value)),
        }
    }

    /// Returns true if the type is a frozen collection or a frozen UDT.
    pub fn is_frozen(&self) -> bool {
        match self {
            ColumnType::Collection { frozen, .. } => *frozen,
            ColumnType::UserDefinedType { frozen, .. } => *frozen,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_frozen(
            f: &mut fmt::Formatter<'_>,
            frozen: bool,
            inner: impl fmt::Display,
        ) -> fmt::Result {
            if frozen {
                write!(f, "frozen<{}>", inner)
            } else {
                write!(f, "{}", inner)
            }
        }

        match self {
            ColumnType::Native(n) => f.write_str(n.cql_name()),
            ColumnType::Collection { frozen, typ } => write_frozen(f, *frozen, typ),
            ColumnType::Vector { typ, dimensions } => write!(f, "vector<{}, {}>", typ, dimensions),
            ColumnType::UserDefinedType { frozen, definition } => write_frozen(
                f,
                *frozen,
                format_args!("{}.{}", definition.keyspace, definition.name),
            ),
            ColumnType::Tuple(types) => {
                f.write_str("tuple<")?;
                for (i, typ) in types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", typ)?;
                }
                f.write_str(">")
            }
        }
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionType::List(elem) => write!(f, "list<{}>", elem),
            CollectionType::Set(elem) => write!(f, "set<{}>", elem),
            CollectionType::Map(key, value) => write!(f, "map<{}, {}>", key, value),
        }
    }
}

//! CQL identifiers: names of keyspaces, tables, columns, types and graph labels.

use std::fmt;

/// Keywords that cannot be used as unquoted identifiers.
const RESERVED_KEYWORDS: &[&str] = &[
    "add",
    "allow",
    "alter",
    "and",
    "apply",
    "asc",
    "authorize",
    "batch",
    "begin",
    "by",
    "columnfamily",
    "create",
    "delete",
    "desc",
    "describe",
    "drop",
    "entries",
    "execute",
    "from",
    "full",
    "grant",
    "if",
    "in",
    "index",
    "infinity",
    "insert",
    "into",
    "is",
    "keyspace",
    "limit",
    "materialized",
    "mbean",
    "mbeans",
    "modify",
    "nan",
    "norecursive",
    "not",
    "null",
    "of",
    "on",
    "or",
    "order",
    "primary",
    "rename",
    "replace",
    "revoke",
    "schema",
    "select",
    "set",
    "table",
    "to",
    "token",
    "truncate",
    "unlogged",
    "unset",
    "update",
    "use",
    "using",
    "view",
    "where",
    "with",
];

/// The name of a CQL object.
///
/// The name is kept in its internal form, exactly as the server stores it
/// (case-sensitive, unquoted). [CqlIdentifier::as_cql] renders it the way it
/// must appear in a statement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CqlIdentifier {
    internal: String,
}

impl CqlIdentifier {
    /// Creates an identifier from its internal (server-side) form.
    pub fn from_internal(internal: impl Into<String>) -> Self {
        Self {
            internal: internal.into(),
        }
    }

    /// Creates an identifier from the form it has in a CQL statement:
    /// a double-quoted name is taken verbatim (with `""` unescaped),
    /// an unquoted name is case-insensitive and thus lowercased.
    pub fn from_cql(cql: &str) -> Self {
        let internal = match cql
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .filter(|_| cql.len() >= 2)
        {
            Some(quoted) => quoted.replace("\"\"", "\""),
            None => cql.to_lowercase(),
        };
        Self { internal }
    }

    pub fn as_internal(&self) -> &str {
        &self.internal
    }

    /// Renders the identifier for use in a CQL statement.
    ///
    /// With `pretty` set, the identifier is quoted only if it has to be:
    /// when it is not a lowercase alphanumeric name starting with a letter,
    /// or when it is a reserved keyword. Otherwise, it is always quoted.
    pub fn as_cql(&self, pretty: bool) -> String {
        if pretty && !needs_double_quotes(&self.internal) {
            self.internal.clone()
        } else {
            format!("\"{}\"", self.internal.replace('"', "\"\""))
        }
    }
}

fn needs_double_quotes(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some('a'..='z') => (),
        _ => return true,
    }
    if !chars.all(|c| matches!(c, 'a'..='z' | '0'..='9' | '_')) {
        return true;
    }
    RESERVED_KEYWORDS.binary_search(&s).is_ok()
}

impl fmt::Display for CqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_cql(true))
    }
}

impl From<&str> for CqlIdentifier {
    fn from(internal: &str) -> Self {
        Self::from_internal(internal)
    }
}

impl From<String> for CqlIdentifier {
    fn from(internal: String) -> Self {
        Self::from_internal(internal)
    }
}

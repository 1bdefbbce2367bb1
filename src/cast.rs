//! The CAST compatibility table.
//!
//! MySQL's `CAST` accepts a much smaller set of target types than it has
//! column types, so every store type has to be folded onto one of the
//! keywords CAST understands. The table is an ordered list: a store type is
//! matched by prefix against each entry in turn and the *first* entry with a
//! matching prefix wins, even when a later entry has a longer match.
use std::borrow::Cow;

use crate::{
    capabilities::CapabilityProvider,
    error::{Error, Result},
};

pub const SIGNED: &str = "signed";
pub const UNSIGNED: &str = "unsigned";
/// Target used in place of `double`/`float` on servers that cannot cast to them.
pub const DECIMAL_WORKAROUND: &str = "decimal(65,30)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastMapping {
    pub keyword: &'static str,
    /// Lower-case store type prefixes folded onto `keyword`.
    pub store_type_prefixes: &'static [&'static str],
}

impl CastMapping {
    pub const fn new(keyword: &'static str, store_type_prefixes: &'static [&'static str]) -> Self {
        Self {
            keyword,
            store_type_prefixes,
        }
    }

    /// `store_type_lower` must already be lower-cased.
    pub fn matches(&self, store_type_lower: &str) -> bool {
        self.store_type_prefixes
            .iter()
            .any(|prefix| store_type_lower.starts_with(prefix))
    }
}

// Order matters: "datetime" must be tried before "date" and "timestamp"
//  before "time", because matching is by prefix.
pub const MYSQL_CAST_MAPPINGS: &[CastMapping] = &[
    CastMapping::new(
        SIGNED,
        &["tinyint", "smallint", "mediumint", "int", "bigint", "bit"],
    ),
    CastMapping::new(DECIMAL_WORKAROUND, &["decimal"]),
    CastMapping::new("double", &["double"]),
    CastMapping::new("float", &["float"]),
    CastMapping::new(
        "binary",
        &["binary", "varbinary", "tinyblob", "blob", "mediumblob", "longblob"],
    ),
    CastMapping::new("datetime(6)", &["datetime(6)"]),
    CastMapping::new("datetime", &["datetime"]),
    CastMapping::new("date", &["date"]),
    CastMapping::new("timestamp(6)", &["timestamp(6)"]),
    CastMapping::new("timestamp", &["timestamp"]),
    CastMapping::new("time(6)", &["time(6)"]),
    CastMapping::new("time", &["time"]),
    CastMapping::new("json", &["json"]),
    CastMapping::new(
        "char",
        &["char", "varchar", "text", "tinytext", "mediumtext", "longtext"],
    ),
    CastMapping::new("nchar", &["nchar", "nvarchar"]),
];

/// The resolved target of one CAST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastTarget {
    pub keyword: &'static str,
    /// The server cannot cast to the requested floating point type: the value
    ///  is cast to [`DECIMAL_WORKAROUND`] and has to be turned back into a
    ///  floating point value by the caller.
    pub decimal_workaround: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastTable {
    entries: Cow<'static, [CastMapping]>,
}

impl Default for CastTable {
    fn default() -> Self {
        Self::mysql()
    }
}

impl CastTable {
    pub const fn mysql() -> Self {
        Self {
            entries: Cow::Borrowed(MYSQL_CAST_MAPPINGS),
        }
    }

    pub fn new(entries: Vec<CastMapping>) -> Self {
        Self {
            entries: Cow::Owned(entries),
        }
    }

    /// Appends `mapping` after every existing entry, so it only applies to
    ///  store types nothing earlier matched.
    pub fn with_mapping(mut self, mapping: CastMapping) -> Self {
        self.entries.to_mut().push(mapping);
        self
    }

    pub fn entries(&self) -> &[CastMapping] {
        &self.entries
    }

    /// First-match lookup; `store_type_lower` must already be lower-cased.
    pub fn lookup(&self, store_type_lower: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|mapping| mapping.matches(store_type_lower))
            .map(|mapping| mapping.keyword)
    }

    /// Resolves the CAST keyword for `store_type`, applying the unsigned
    ///  substitution and the floating point workaround for servers without
    ///  native support.
    pub fn resolve(
        &self,
        store_type: &str,
        capabilities: &impl CapabilityProvider,
    ) -> Result<CastTarget> {
        let store_type_lower = store_type.to_lowercase();
        let mut keyword = self
            .lookup(&store_type_lower)
            .ok_or_else(|| Error::UnsupportedCast {
                store_type: store_type.to_string(),
            })?;

        if keyword == SIGNED && store_type_lower.contains("unsigned") {
            keyword = UNSIGNED;
        }

        let unsupported = (keyword.starts_with("double") && !capabilities.supports_double_cast())
            || (keyword.starts_with("float") && !capabilities.supports_float_cast());
        if unsupported {
            tracing::debug!(
                target: "mysql_expr",
                store_type,
                requested = keyword,
                "server cannot CAST to floating point, casting through {DECIMAL_WORKAROUND}"
            );
            return Ok(CastTarget {
                keyword: DECIMAL_WORKAROUND,
                decimal_workaround: true,
            });
        }

        Ok(CastTarget {
            keyword,
            decimal_workaround: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::capabilities::Capabilities;

    fn keyword(store_type: &str) -> Result<&'static str> {
        CastTable::mysql()
            .resolve(store_type, &Capabilities::all())
            .map(|t| t.keyword)
    }

    #[test]
    fn integers_cast_to_signed() {
        assert_eq!(keyword("int"), Ok("signed"));
        assert_eq!(keyword("bigint"), Ok("signed"));
        assert_eq!(keyword("tinyint"), Ok("signed"));
        assert_eq!(keyword("TINYINT(1)"), Ok("signed"));
        assert_eq!(keyword("bit(1)"), Ok("signed"));
    }

    #[test]
    fn unsigned_integers_cast_to_unsigned() {
        assert_eq!(keyword("int unsigned"), Ok("unsigned"));
        assert_eq!(keyword("BIGINT UNSIGNED"), Ok("unsigned"));
    }

    #[test]
    fn unsigned_only_applies_to_signed() {
        // decimal is declared before anything that would care about "unsigned"
        assert_eq!(keyword("decimal unsigned"), Ok("decimal(65,30)"));
    }

    #[test]
    fn decimals_widen() {
        assert_eq!(keyword("decimal(10,2)"), Ok("decimal(65,30)"));
    }

    #[test]
    fn temporal_types_respect_declaration_order() {
        assert_eq!(keyword("datetime(6)"), Ok("datetime(6)"));
        assert_eq!(keyword("datetime"), Ok("datetime"));
        assert_eq!(keyword("datetime(3)"), Ok("datetime"));
        assert_eq!(keyword("date"), Ok("date"));
        assert_eq!(keyword("timestamp"), Ok("timestamp"));
        assert_eq!(keyword("time(6)"), Ok("time(6)"));
        assert_eq!(keyword("time"), Ok("time"));
    }

    #[test]
    fn strings_and_binaries() {
        assert_eq!(keyword("varchar(255)"), Ok("char"));
        assert_eq!(keyword("longtext"), Ok("char"));
        assert_eq!(keyword("nvarchar(10)"), Ok("nchar"));
        assert_eq!(keyword("varbinary(16)"), Ok("binary"));
        assert_eq!(keyword("json"), Ok("json"));
    }

    #[test]
    fn unknown_types_fail_with_the_given_name() {
        assert_eq!(
            keyword("Geometry"),
            Err(Error::UnsupportedCast {
                store_type: "Geometry".into()
            })
        );
        assert!(keyword("").is_err());
    }

    #[test]
    fn floating_point_workaround_follows_capabilities() {
        let table = CastTable::mysql();
        let old = Capabilities::none();
        assert_eq!(
            table.resolve("double", &old),
            Ok(CastTarget {
                keyword: DECIMAL_WORKAROUND,
                decimal_workaround: true
            })
        );
        assert_eq!(
            table.resolve("float", &old),
            Ok(CastTarget {
                keyword: DECIMAL_WORKAROUND,
                decimal_workaround: true
            })
        );

        let doubles_only = Capabilities {
            supports_double_cast: true,
            supports_float_cast: false,
        };
        assert_eq!(
            table.resolve("double", &doubles_only).map(|t| t.keyword),
            Ok("double")
        );
        assert!(table.resolve("float", &doubles_only).unwrap().decimal_workaround);

        // an explicit decimal never triggers the workaround
        assert!(!table.resolve("decimal(18,4)", &old).unwrap().decimal_workaround);
    }

    #[test]
    fn appended_mappings_have_lowest_priority() {
        let table = CastTable::mysql()
            .with_mapping(CastMapping::new("char", &["enum", "set"]))
            .with_mapping(CastMapping::new("binary", &["int"]));
        assert_eq!(table.lookup("enum('a','b')"), Some("char"));
        assert_eq!(table.lookup("int"), Some("signed"));
        assert_eq!(table.entries().len(), MYSQL_CAST_MAPPINGS.len() + 2);
    }

    #[test]
    fn earlier_shorter_prefix_beats_later_longer_one() {
        let table = CastTable::new(vec![
            CastMapping::new("a", &["date"]),
            CastMapping::new("b", &["datetime"]),
        ]);
        assert_eq!(table.lookup("datetime"), Some("a"));
        assert_eq!(table.lookup("datetime(6)"), Some("a"));
    }

    static PREFIXES: &[&str] = &["int", "decimal", "double", "date", "char", "time"];

    /// Each pair is a prefix followed by a longer store type starting with it.
    static NESTED_PREFIXES: &[(&str, &str)] = &[
        ("date", "datetime"),
        ("time", "timestamp"),
        ("int", "integer"),
        ("char", "character"),
        ("dec", "decimal"),
        ("bit", "bit varying"),
    ];

    proptest! {
        #[test]
        fn first_declared_entry_wins(
            first in 0..PREFIXES.len(),
            second in 0..PREFIXES.len(),
            suffix in "[a-z0-9(), ]{0,8}",
        ) {
            // Both entries carry the same prefix: whatever comes first is chosen.
            let prefix = PREFIXES[first];
            let prefixes: &'static [&'static str] = std::slice::from_ref(&PREFIXES[first]);
            let other: &'static [&'static str] = std::slice::from_ref(&PREFIXES[second]);
            let table = CastTable::new(vec![
                CastMapping::new("first", prefixes),
                CastMapping::new("second", other),
            ]);
            let store_type = format!("{prefix}{suffix}");
            prop_assert_eq!(table.lookup(&store_type), Some("first"));
        }

        #[test]
        fn longer_later_prefix_never_wins(
            pair in 0..NESTED_PREFIXES.len(),
            suffix in "[a-z0-9(), ]{0,8}",
        ) {
            let (short, long) = &NESTED_PREFIXES[pair];
            let table = CastTable::new(vec![
                CastMapping::new("first", std::slice::from_ref(short)),
                CastMapping::new("second", std::slice::from_ref(long)),
            ]);
            let store_type = format!("{long}{suffix}");
            prop_assert_eq!(table.lookup(&store_type), Some("first"));
        }

        #[test]
        fn lookup_matches_a_linear_scan(store_type in "[a-z]{1,10}(\\([0-9]\\))?( unsigned)?") {
            let expected = MYSQL_CAST_MAPPINGS
                .iter()
                .find(|m| m.store_type_prefixes.iter().any(|p| store_type.starts_with(p)))
                .map(|m| m.keyword);
            prop_assert_eq!(CastTable::mysql().lookup(&store_type), expected);
        }

        #[test]
        fn resolution_ignores_case(store_type in "(INT|Decimal|DateTime|VarChar|JSON)[A-Z(0-9)]{0,4}") {
            let table = CastTable::mysql();
            prop_assert_eq!(
                table.resolve(&store_type, &Capabilities::all()),
                table.resolve(&store_type.to_lowercase(), &Capabilities::all())
            );
        }
    }
}

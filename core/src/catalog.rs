//! Mechanical translation of catalog function arguments into SQL against
//! `sys.*` system views (spec §4.7). Every function here returns SQL text;
//! the caller executes it through the normal statement path so the result
//! is a standard fetchable result set.

use crate::type_info::SqlType;

/// Escapes a LIKE pattern argument for inline use in a single-quoted SQL
/// string literal. An empty pattern means "match everything" per spec
/// §4.7, which we translate to the `%` wildcard.
fn like_literal(pattern: Option<&str>) -> String {
    let pattern = match pattern {
        None | Some("") => "%",
        Some(p) => p,
    };
    pattern.replace('\'', "''")
}

/// Builds a `CASE` expression translating a `sys.types`-style type name
/// column into the ODBC `SqlDataType` code this driver reports everywhere
/// else (spec §9 open question (b)): catalog rows must never leak
/// `system_type_id`, the server's internal type id, through `DATA_TYPE` /
/// `SQL_DATA_TYPE`. `sys.types` carries no TDS wire type, only this name,
/// so the mapping runs off the name rather than `type_info::SqlType::from_tds`.
fn data_type_case_sql(name_expr: &str) -> String {
    let arm = |name: &str, sql_type: SqlType| {
        format!("WHEN '{name}' THEN {}", sql_type.sql_data_type() as i16)
    };
    let arms = [
        arm("bit", SqlType::Bit),
        arm("tinyint", SqlType::TinyInt),
        arm("smallint", SqlType::SmallInt),
        arm("int", SqlType::Integer),
        arm("bigint", SqlType::BigInt),
        arm("real", SqlType::Real),
        arm("float", SqlType::Float),
        arm("decimal", SqlType::Decimal),
        arm("numeric", SqlType::Numeric),
        arm("date", SqlType::Date),
        arm("time", SqlType::Time),
        arm("datetime", SqlType::Timestamp),
        arm("datetime2", SqlType::Timestamp),
        arm("smalldatetime", SqlType::Timestamp),
        arm("datetimeoffset", SqlType::Timestamp),
        arm("char", SqlType::Char),
        arm("nchar", SqlType::Char),
        arm("varchar", SqlType::VarChar),
        arm("nvarchar", SqlType::WVarChar),
        arm("text", SqlType::LongVarChar),
        arm("ntext", SqlType::LongVarChar),
        arm("binary", SqlType::Binary),
        arm("varbinary", SqlType::VarBinary),
        arm("image", SqlType::LongVarBinary),
        arm("uniqueidentifier", SqlType::Guid),
    ]
    .join(" ");
    let fallback = SqlType::WVarChar.sql_data_type() as i16;
    format!("(CASE {name_expr} {arms} ELSE {fallback} END)")
}

#[derive(Debug, Clone, Copy)]
pub enum CatalogQuery {
    Tables,
    Columns,
    PrimaryKeys,
    Statistics,
    ForeignKeys,
    SpecialColumns,
    TypeInfo,
    Procedures,
}

impl CatalogQuery {
    pub fn build_sql(
        self,
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
        column: Option<&str>,
    ) -> String {
        let schema_lit = like_literal(schema);
        let table_lit = like_literal(table);
        let column_lit = like_literal(column);
        let _ = catalog; // single-database sessions: catalog is always the current database
        let data_type = data_type_case_sql("ty.name");
        let data_type_bare = data_type_case_sql("name");

        match self {
            CatalogQuery::Tables => format!(
                "SELECT DB_NAME() AS TABLE_CAT, s.name AS TABLE_SCHEM, t.name AS TABLE_NAME, \
                 'TABLE' AS TABLE_TYPE, CAST(NULL AS VARCHAR(254)) AS REMARKS \
                 FROM sys.tables t JOIN sys.schemas s ON t.schema_id = s.schema_id \
                 WHERE s.name LIKE '{schema_lit}' AND t.name LIKE '{table_lit}' \
                 ORDER BY TABLE_SCHEM, TABLE_NAME"
            ),
            CatalogQuery::Columns => format!(
                "SELECT DB_NAME() AS TABLE_CAT, s.name AS TABLE_SCHEM, t.name AS TABLE_NAME, \
                 c.name AS COLUMN_NAME, {data_type} AS DATA_TYPE, ty.name AS TYPE_NAME, \
                 c.max_length AS COLUMN_SIZE, c.max_length AS BUFFER_LENGTH, \
                 c.scale AS DECIMAL_DIGITS, 10 AS NUM_PREC_RADIX, \
                 CASE WHEN c.is_nullable = 1 THEN 1 ELSE 0 END AS NULLABLE, \
                 CAST(NULL AS VARCHAR(254)) AS REMARKS, c.column_id AS ORDINAL_POSITION, \
                 CASE WHEN c.is_nullable = 1 THEN 'YES' ELSE 'NO' END AS IS_NULLABLE \
                 FROM sys.columns c \
                 JOIN sys.tables t ON c.object_id = t.object_id \
                 JOIN sys.schemas s ON t.schema_id = s.schema_id \
                 JOIN sys.types ty ON c.user_type_id = ty.user_type_id \
                 WHERE s.name LIKE '{schema_lit}' AND t.name LIKE '{table_lit}' \
                 AND c.name LIKE '{column_lit}' \
                 ORDER BY TABLE_SCHEM, TABLE_NAME, ORDINAL_POSITION"
            ),
            CatalogQuery::PrimaryKeys => format!(
                "SELECT DB_NAME() AS TABLE_CAT, s.name AS TABLE_SCHEM, t.name AS TABLE_NAME, \
                 c.name AS COLUMN_NAME, ic.key_ordinal AS KEY_SEQ, kc.name AS PK_NAME \
                 FROM sys.key_constraints kc \
                 JOIN sys.tables t ON kc.parent_object_id = t.object_id \
                 JOIN sys.schemas s ON t.schema_id = s.schema_id \
                 JOIN sys.index_columns ic ON ic.object_id = t.object_id AND ic.index_id = kc.unique_index_id \
                 JOIN sys.columns c ON c.object_id = t.object_id AND c.column_id = ic.column_id \
                 WHERE kc.type = 'PK' AND s.name LIKE '{schema_lit}' AND t.name LIKE '{table_lit}' \
                 ORDER BY ic.key_ordinal"
            ),
            CatalogQuery::Statistics => format!(
                "SELECT DB_NAME() AS TABLE_CAT, s.name AS TABLE_SCHEM, t.name AS TABLE_NAME, \
                 CASE WHEN i.is_unique = 0 THEN 1 ELSE 0 END AS NON_UNIQUE, \
                 DB_NAME() AS INDEX_QUALIFIER, i.name AS INDEX_NAME, \
                 CASE WHEN i.type = 1 THEN 1 ELSE 3 END AS TYPE, \
                 ic.key_ordinal AS ORDINAL_POSITION, c.name AS COLUMN_NAME, \
                 CASE WHEN ic.is_descending_key = 1 THEN 'D' ELSE 'A' END AS ASC_OR_DESC, \
                 0 AS CARDINALITY, 0 AS PAGES, CAST(NULL AS VARCHAR(128)) AS FILTER_CONDITION \
                 FROM sys.indexes i \
                 JOIN sys.tables t ON i.object_id = t.object_id \
                 JOIN sys.schemas s ON t.schema_id = s.schema_id \
                 JOIN sys.index_columns ic ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
                 JOIN sys.columns c ON c.object_id = t.object_id AND c.column_id = ic.column_id \
                 WHERE s.name LIKE '{schema_lit}' AND t.name LIKE '{table_lit}' AND i.index_id > 0 \
                 ORDER BY NON_UNIQUE, TYPE, INDEX_NAME, ORDINAL_POSITION"
            ),
            CatalogQuery::ForeignKeys => format!(
                "SELECT DB_NAME() AS PKTABLE_CAT, ps.name AS PKTABLE_SCHEM, pt.name AS PKTABLE_NAME, \
                 pc.name AS PKCOLUMN_NAME, DB_NAME() AS FKTABLE_CAT, fs.name AS FKTABLE_SCHEM, \
                 ft.name AS FKTABLE_NAME, fc.name AS FKCOLUMN_NAME, fkc.constraint_column_id AS KEY_SEQ, \
                 fk.update_referential_action AS UPDATE_RULE, fk.delete_referential_action AS DELETE_RULE, \
                 fk.name AS FK_NAME, pk.name AS PK_NAME \
                 FROM sys.foreign_keys fk \
                 JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id \
                 JOIN sys.tables ft ON fk.parent_object_id = ft.object_id \
                 JOIN sys.schemas fs ON ft.schema_id = fs.schema_id \
                 JOIN sys.columns fc ON fc.object_id = ft.object_id AND fc.column_id = fkc.parent_column_id \
                 JOIN sys.tables pt ON fk.referenced_object_id = pt.object_id \
                 JOIN sys.schemas ps ON pt.schema_id = ps.schema_id \
                 JOIN sys.columns pc ON pc.object_id = pt.object_id AND pc.column_id = fkc.referenced_column_id \
                 JOIN sys.key_constraints pk ON pk.parent_object_id = pt.object_id AND pk.type = 'PK' \
                 WHERE fs.name LIKE '{schema_lit}' AND ft.name LIKE '{table_lit}' \
                 ORDER BY FKTABLE_NAME, KEY_SEQ"
            ),
            CatalogQuery::SpecialColumns => format!(
                "SELECT 1 AS SCOPE, c.name AS COLUMN_NAME, {data_type} AS DATA_TYPE, \
                 ty.name AS TYPE_NAME, c.max_length AS COLUMN_SIZE, c.max_length AS BUFFER_LENGTH, \
                 c.scale AS DECIMAL_DIGITS, 1 AS PSEUDO_COLUMN \
                 FROM sys.index_columns ic \
                 JOIN sys.indexes i ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
                 JOIN sys.tables t ON t.object_id = i.object_id \
                 JOIN sys.schemas s ON t.schema_id = s.schema_id \
                 JOIN sys.columns c ON c.object_id = t.object_id AND c.column_id = ic.column_id \
                 JOIN sys.types ty ON c.user_type_id = ty.user_type_id \
                 WHERE i.is_primary_key = 1 AND s.name LIKE '{schema_lit}' AND t.name LIKE '{table_lit}' \
                 ORDER BY ic.key_ordinal"
            ),
            CatalogQuery::TypeInfo => format!(
                "SELECT name AS TYPE_NAME, {data_type_bare} AS DATA_TYPE, max_length AS COLUMN_SIZE, \
                 CAST(NULL AS VARCHAR(1)) AS LITERAL_PREFIX, CAST(NULL AS VARCHAR(1)) AS LITERAL_SUFFIX, \
                 CAST(NULL AS VARCHAR(1)) AS CREATE_PARAMS, 1 AS NULLABLE, 0 AS CASE_SENSITIVE, \
                 3 AS SEARCHABLE, 0 AS UNSIGNED_ATTRIBUTE, 0 AS FIXED_PREC_SCALE, 0 AS AUTO_UNIQUE_VALUE, \
                 name AS LOCAL_TYPE_NAME, 0 AS MINIMUM_SCALE, scale AS MAXIMUM_SCALE, \
                 {data_type_bare} AS SQL_DATA_TYPE, CAST(NULL AS SMALLINT) AS SQL_DATETIME_SUB, 10 AS NUM_PREC_RADIX \
                 FROM sys.types ORDER BY system_type_id"
            ),
            // Procedures always returns an empty result set (spec §4.7).
            CatalogQuery::Procedures => "SELECT NULL AS PROCEDURE_CAT WHERE 1 = 0".to_string(),
        }
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn empty_patterns_become_wildcards() {
        let sql = CatalogQuery::Tables.build_sql(None, Some(""), None, None);
        assert!(sql.contains("LIKE '%'"));
    }

    #[test]
    fn single_quotes_in_pattern_are_escaped() {
        assert_eq!(like_literal(Some("o'brien")), "o''brien");
    }

    #[test]
    fn procedures_query_has_no_columns_of_substance() {
        let sql = CatalogQuery::Procedures.build_sql(None, None, None, None);
        assert!(sql.contains("WHERE 1 = 0"));
    }

    #[test]
    fn columns_data_type_is_odbc_sql_type_code_not_system_type_id() {
        // Open question (b): DATA_TYPE/SQL_DATA_TYPE must report the ODBC
        // SqlDataType code, never sys.types.system_type_id verbatim.
        let sql = CatalogQuery::Columns.build_sql(None, None, None, None);
        assert!(!sql.contains("ty.system_type_id"));
        assert!(sql.contains("WHEN 'int' THEN 4"));
        assert!(sql.contains("WHEN 'nvarchar' THEN -9"));
    }

    #[test]
    fn type_info_data_type_is_odbc_sql_type_code_not_system_type_id() {
        let sql = CatalogQuery::TypeInfo.build_sql(None, None, None, None);
        assert!(!sql.contains("system_type_id AS DATA_TYPE"));
        assert!(!sql.contains("system_type_id AS SQL_DATA_TYPE"));
        assert!(sql.contains("WHEN 'bit' THEN -7"));
    }

    #[test]
    fn foreign_keys_reads_rules_from_server_metadata_not_hardcoded() {
        // Open question (c): rules come from sys.foreign_keys columns, never
        // a literal CASCADE/NO ACTION constant baked into the query text.
        let sql = CatalogQuery::ForeignKeys.build_sql(None, None, None, None);
        assert!(sql.contains("fk.update_referential_action"));
        assert!(sql.contains("fk.delete_referential_action"));
        assert!(!sql.to_uppercase().contains("CASCADE"));
    }
}

use crate::type_info::{SqlType, TypeInfo};
use odbc_sys::{Nullability, SqlDataType};

/// Metadata for one column of a materialized result set. Used to answer
/// `SQLDescribeCol` / `SQLColAttribute` and to pick a default C type during
/// retrieval.
#[derive(Clone, Debug)]
pub struct ColumnMetadata {
    pub base_col_name: String,
    pub base_table_name: String,
    pub catalog_name: String,
    pub col_name: String,
    pub label: String,
    pub table_name: String,
    pub sql_type: SqlDataType,
    pub non_concise_type: SqlDataType,
    pub display_size: Option<u32>,
    pub octet_length: Option<u32>,
    pub precision: Option<u16>,
    pub scale: Option<i16>,
    pub nullability: Nullability,
    pub is_searchable: bool,
    pub is_unsigned: bool,
    pub is_updatable: bool,
}

impl ColumnMetadata {
    pub fn new(col_name: String, sql_type: SqlType, nullable: bool) -> ColumnMetadata {
        let info = TypeInfo::for_sql_type(sql_type);
        ColumnMetadata {
            // TDS result-set metadata carries no base table/catalog info
            // for ad hoc queries; these stay empty the way SQLDescribeCol
            // expects when a column isn't traceable to a single base table.
            base_col_name: String::new(),
            base_table_name: String::new(),
            catalog_name: String::new(),
            label: col_name.clone(),
            table_name: String::new(),
            col_name,
            sql_type: sql_type.sql_data_type(),
            non_concise_type: match sql_type.sql_data_type() {
                SqlDataType::TIMESTAMP => SqlDataType::DATETIME,
                other => other,
            },
            display_size: Some(info.column_size),
            octet_length: Some(info.column_size),
            precision: Some(info.column_size as u16),
            scale: Some(info.decimal_digits),
            nullability: if nullable {
                Nullability::NULLABLE
            } else {
                Nullability::NO_NULLS
            },
            is_searchable: true,
            is_unsigned: info.unsigned,
            is_updatable: false,
        }
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn new_sets_display_size_from_type_info() {
        let md = ColumnMetadata::new("id".to_string(), SqlType::Integer, false);
        assert_eq!(md.col_name, "id");
        assert_eq!(md.nullability, Nullability::NO_NULLS);
        assert_eq!(md.display_size, Some(10));
    }

    #[test]
    fn nullable_flag_round_trips_into_nullability() {
        let md = ColumnMetadata::new("name".to_string(), SqlType::WVarChar, true);
        assert_eq!(md.nullability, Nullability::NULLABLE);
    }
}

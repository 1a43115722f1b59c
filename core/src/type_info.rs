//! TDS column type -> SQL type, and SQL type -> default C type / column
//! size / decimal digits. One table shared by the row writer (metadata
//! callback) and the odbc crate's GetData dispatch.

use odbc_sys::SqlDataType;
use tiberius::ColumnType;

/// A deliberately small, closed set: every SQL type code this driver can
/// ever report through a column descriptor or GetTypeInfo row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SqlType {
    Char,
    VarChar,
    WVarChar,
    LongVarChar,
    Bit,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Decimal,
    Numeric,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Guid,
}

impl SqlType {
    pub fn sql_data_type(self) -> SqlDataType {
        match self {
            SqlType::Char => SqlDataType::EXT_W_CHAR, // narrow CHAR columns are re-exposed as WCHAR; see TypeInfo::from_tds
            SqlType::VarChar => SqlDataType::VARCHAR,
            SqlType::WVarChar => SqlDataType::EXT_W_VARCHAR,
            SqlType::LongVarChar => SqlDataType::EXT_LONG_VARCHAR,
            SqlType::Bit => SqlDataType::BIT,
            SqlType::TinyInt => SqlDataType::TINYINT,
            SqlType::SmallInt => SqlDataType::SMALLINT,
            SqlType::Integer => SqlDataType::INT,
            SqlType::BigInt => SqlDataType::EXT_BIG_INT,
            SqlType::Real => SqlDataType::REAL,
            SqlType::Float => SqlDataType::FLOAT,
            SqlType::Decimal => SqlDataType::DECIMAL,
            SqlType::Numeric => SqlDataType::NUMERIC,
            SqlType::Date => SqlDataType::DATETIME,
            SqlType::Time => SqlDataType::DATETIME,
            SqlType::Timestamp => SqlDataType::TIMESTAMP,
            SqlType::Binary => SqlDataType::BINARY,
            SqlType::VarBinary => SqlDataType::VARBINARY,
            SqlType::LongVarBinary => SqlDataType::EXT_LONG_VARBINARY,
            SqlType::Guid => SqlDataType::GUID,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SqlType::Char => "nchar",
            SqlType::VarChar => "varchar",
            SqlType::WVarChar => "nvarchar",
            SqlType::LongVarChar => "ntext",
            SqlType::Bit => "bit",
            SqlType::TinyInt => "tinyint",
            SqlType::SmallInt => "smallint",
            SqlType::Integer => "int",
            SqlType::BigInt => "bigint",
            SqlType::Real => "real",
            SqlType::Float => "float",
            SqlType::Decimal => "decimal",
            SqlType::Numeric => "numeric",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::Timestamp => "datetime",
            SqlType::Binary => "binary",
            SqlType::VarBinary => "varbinary",
            SqlType::LongVarBinary => "image",
            SqlType::Guid => "uniqueidentifier",
        }
    }

    /// Maps a TDS wire column type, as reported by tiberius column metadata,
    /// to the SQL type code this driver exposes through ODBC.
    pub fn from_tds(col: ColumnType) -> SqlType {
        match col {
            ColumnType::Bit | ColumnType::Bitn => SqlType::Bit,
            ColumnType::Int1 => SqlType::TinyInt,
            ColumnType::Int2 => SqlType::SmallInt,
            ColumnType::Int4 => SqlType::Integer,
            ColumnType::Int8 => SqlType::BigInt,
            ColumnType::Intn => SqlType::Integer,
            ColumnType::Float4 => SqlType::Real,
            ColumnType::Float8 => SqlType::Float,
            ColumnType::Floatn => SqlType::Float,
            ColumnType::Decimaln | ColumnType::Decimal => SqlType::Decimal,
            ColumnType::Numericn | ColumnType::Numeric => SqlType::Numeric,
            ColumnType::Datetime | ColumnType::Datetime2 | ColumnType::Datetimen => {
                SqlType::Timestamp
            }
            ColumnType::Datetime4 => SqlType::Timestamp,
            ColumnType::Daten => SqlType::Date,
            ColumnType::Timen => SqlType::Time,
            ColumnType::DatetimeOffsetn => SqlType::Timestamp,
            ColumnType::Guid => SqlType::Guid,
            ColumnType::BigBinary | ColumnType::BigVarBin | ColumnType::Image => {
                SqlType::VarBinary
            }
            ColumnType::NChar | ColumnType::BigChar => SqlType::Char,
            ColumnType::NVarchar | ColumnType::BigVarChar => SqlType::WVarChar,
            ColumnType::NText | ColumnType::Text => SqlType::LongVarChar,
            _ => SqlType::WVarChar,
        }
    }
}

/// Default C-type / size answers for a SQL type, consulted whenever GetData
/// is asked for `SQL_C_DEFAULT` or a catalog function needs a column-size
/// figure without a real column in hand.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub sql_type: SqlType,
    pub column_size: u32,
    pub decimal_digits: i16,
    pub nullable: bool,
    pub unsigned: bool,
}

impl TypeInfo {
    pub fn for_sql_type(sql_type: SqlType) -> TypeInfo {
        let (column_size, decimal_digits, unsigned) = match sql_type {
            SqlType::Char | SqlType::VarChar | SqlType::WVarChar => (4000, 0, false),
            SqlType::LongVarChar => (2_147_483_647, 0, false),
            SqlType::Bit => (1, 0, true),
            SqlType::TinyInt => (3, 0, true),
            SqlType::SmallInt => (5, 0, false),
            SqlType::Integer => (10, 0, false),
            SqlType::BigInt => (19, 0, false),
            SqlType::Real => (7, 0, false),
            SqlType::Float => (15, 0, false),
            SqlType::Decimal | SqlType::Numeric => (38, 10, false),
            SqlType::Date => (10, 0, false),
            SqlType::Time => (16, 7, false),
            SqlType::Timestamp => (23, 3, false),
            SqlType::Binary | SqlType::VarBinary => (8000, 0, false),
            SqlType::LongVarBinary => (2_147_483_647, 0, false),
            SqlType::Guid => (36, 0, false),
        };
        TypeInfo {
            sql_type,
            column_size,
            decimal_digits,
            nullable: true,
            unsigned,
        }
    }
}

/// Every SQL type this driver reports, for `SQLGetTypeInfo` with no filter.
pub const ALL_SQL_TYPES: &[SqlType] = &[
    SqlType::Char,
    SqlType::VarChar,
    SqlType::WVarChar,
    SqlType::LongVarChar,
    SqlType::Bit,
    SqlType::TinyInt,
    SqlType::SmallInt,
    SqlType::Integer,
    SqlType::BigInt,
    SqlType::Real,
    SqlType::Float,
    SqlType::Decimal,
    SqlType::Numeric,
    SqlType::Date,
    SqlType::Time,
    SqlType::Timestamp,
    SqlType::Binary,
    SqlType::VarBinary,
    SqlType::LongVarBinary,
    SqlType::Guid,
];

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn int_variants_map_to_integer_family() {
        assert_eq!(SqlType::from_tds(ColumnType::Int4), SqlType::Integer);
        assert_eq!(SqlType::from_tds(ColumnType::Intn), SqlType::Integer);
    }

    #[test]
    fn default_type_info_is_nullable() {
        let info = TypeInfo::for_sql_type(SqlType::Integer);
        assert!(info.nullable);
        assert_eq!(info.column_size, 10);
    }
}

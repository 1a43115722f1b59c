//! SQLSTATE codes and other string constants shared between the core TDS
//! layer and the ODBC C API layer. Keeping them in one leaf crate means both
//! sides agree on spelling without introducing a dependency cycle.

pub const VENDOR_IDENTIFIER: &str = "Furball";
pub const DRIVER_NAME: &str = "Furball ODBC Driver";
pub const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");
// DBMS name reported by SQLGetInfo; the driver only ever talks to one kind
// of server.
pub const DBMS_NAME: &str = "Microsoft SQL Server";

// SQLSTATEs, grouped by class as described in the driver's error taxonomy.

// 01xxx - warnings
pub const RIGHT_TRUNCATED: &str = "01004";
pub const OPTION_CHANGED: &str = "01S02";

// 07xxx - dynamic SQL error
pub const INVALID_DESCRIPTOR_INDEX: &str = "07009";

// 08xxx - connection exception
pub const UNABLE_TO_CONNECT: &str = "08001";
pub const CONNECTION_NOT_OPEN: &str = "08003";

// IM002 - no default driver / DSN not found, also used for malformed
// connection strings since both mean "we couldn't get a connection out of
// what you gave us".
pub const DSN_NOT_FOUND: &str = "IM002";

// 22xxx - data exception
pub const DATA_EXCEPTION: &str = "22000";
pub const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";
pub const INVALID_CHARACTER_VALUE: &str = "22018";

// 23xxx - integrity constraint violation
pub const INTEGRITY_CONSTRAINT_VIOLATION: &str = "23000";

// 24xxx - invalid cursor state
pub const INVALID_CURSOR_STATE: &str = "24000";

// 42xxx - syntax error or access rule violation
pub const SYNTAX_ERROR: &str = "42000";
pub const TABLE_OR_VIEW_NOT_FOUND: &str = "42S02";

// HYxxx - general/driver errors
pub const GENERAL_ERROR: &str = "HY000";
pub const INVALID_ATTR_VALUE: &str = "HY024";
pub const FUNCTION_SEQUENCE_ERROR: &str = "HY010";
pub const INVALID_ATTR_IDENTIFIER: &str = "HY092";
pub const UNSUPPORTED_FIELD_DESCRIPTOR: &str = "HY091";
pub const NOT_IMPLEMENTED: &str = "HYC00";
pub const TIMEOUT_EXPIRED: &str = "HYT00";

// IMxxx - driver manager related
pub const NO_DSN_OR_DRIVER: &str = "IM007";

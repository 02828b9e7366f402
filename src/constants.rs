//! Format constants for PIRATA ASCII files
//!
//! Line prefixes, flag column limits, timestamp patterns and the column
//! names used in decoded tables. These are part of the file format and are
//! not configurable.

// =============================================================================
// Header Line Prefixes
// =============================================================================

/// File-scope site line
pub const LOCATION_PREFIX: &str = "Location:";

/// File-scope units line (also carries the missing-value clause)
pub const UNITS_PREFIX: &str = "Units:";

/// Block time-range line
pub const TIME_PREFIX: &str = "Time:";

/// Block index-range line (used instead of `Time:` by some files)
pub const INDEX_PREFIX: &str = "Index:";

/// Block depth line for subsurface variables
pub const DEPTH_PREFIX: &str = "Depth";

/// Block height line for meteorological variables
pub const HEIGHT_PREFIX: &str = "Height";

/// Separator between the depth/height label and its values
pub const DEPTH_VALUES_MARKER: &str = "(M):";

/// Column-name line, also the terminator of every block header
pub const COLUMN_LINE_PREFIX: &str = "YYYYMMDD HHMM";

// =============================================================================
// Units Line Clauses
// =============================================================================

/// Fragment keyword carrying the unit declaration
pub const UNITS_KEYWORD: &str = "Units";

/// Text that precedes the declared unit in the units fragment
pub const UNITS_VALUE_MARKER: &str = "Units: ";

/// Fragment keyword marking precipitation files, whose sentinel sits in the units fragment
pub const PRECIPITATION_KEYWORD: &str = "Precipitation";

/// Fragment keyword carrying the missing-value sentinel
pub const MISSING_KEYWORD: &str = "missing";

/// Separator between the sentinel and the `missing` keyword
pub const MISSING_ASSIGNMENT: char = '=';

// =============================================================================
// Flag Columns
// =============================================================================

/// Base strings of the quality, source and instrument-id flag columns
pub const FLAG_COLUMN_BASES: &[&str] = &["Q", "S", "ID"];

/// Maximum repetition of a flag base in a column name (`Q` .. `QQQ...Q`)
pub const FLAG_REPEAT_LIMIT: usize = 25;

// =============================================================================
// Data Rows and Output Columns
// =============================================================================

/// Number of leading date/time columns, which carry no depth suffix
pub const TIMESTAMP_COLUMN_COUNT: usize = 2;

/// Pattern of the combined date and time tokens
pub const ROW_DATETIME_FORMAT: &str = "%Y%m%d %H%M";

/// Name of the time key column in decoded tables
pub const DATETIME_COLUMN: &str = "datetime";

// =============================================================================
// File Names
// =============================================================================

/// Extensions of PIRATA ASCII files, compressed or not
pub const ASCII_EXTENSIONS: &[&str] = &[".ascii", ".ascii.gz"];

/// gzip magic bytes
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

//! Batch processing tests
//!
//! Exercise the complete read, decode and merge pipeline over small PIRATA
//! files written to temporary directories.


use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Two-block daily temperature file for station 0N 23W
pub const TEMPERATURE_DAILY: &str = "\
Location:  0N  23W   1 Jan 2020 to  4 Jan 2020 (index 1 to 4, 4 times)
Units: DEG.C, -9.999 = missing
 Time: 1200  1 Jan 2020 to 1200  2 Jan 2020 (index 1 to 2, 2 times)
 Depth (M):      1     10 QUALITY
 YYYYMMDD HHMM   T      T  QQ
 20200101 1200 25.10 24.80 11
 20200102 1200 25.20 -9.999 15
 Time: 1200  3 Jan 2020 to 1200  4 Jan 2020 (index 3 to 4, 2 times)
 Depth (M):      1 QUALITY
 YYYYMMDD HHMM   T Q
 20200103 1200 25.30 1
 20200104 1200 25.40 1
";

/// Daily salinity file for station 0N 23W, overlapping the temperature record
pub const SALINITY_DAILY: &str = "\
Location:  0N  23W   2 Jan 2020 to  5 Jan 2020 (index 1 to 2, 2 times)
Units: PSU, -9.999 = missing
 Time: 1200  2 Jan 2020 to 1200  5 Jan 2020 (index 1 to 2, 2 times)
 Depth (M):      1 QUALITY SOURCE
 YYYYMMDD HHMM  SAL Q S
 20200102 1200 35.10 2 1
 20200105 1200 35.20 2 1
";

/// Daily wind file for station 8N 38W
pub const WIND_DAILY: &str = "\
Location:  8N  38W   1 Jan 2020 to  1 Jan 2020 (index 1 to 1, 1 times)
Units: M/S, DEG, -99.9 = missing
 Time: 1200  1 Jan 2020 to 1200  1 Jan 2020 (index 1 to 1, 1 times)
 Height (M):    4    4 QUALITY SOURCE
 YYYYMMDD HHMM WSPD WDIR QQ SS
 20200101 1200  6.2 95.0 22 11
";

pub fn write_plain(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

pub fn write_gzip(dir: &Path, name: &str, text: &str) -> PathBuf {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    let path = dir.join(name);
    fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}

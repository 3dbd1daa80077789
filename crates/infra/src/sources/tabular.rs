use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use prodintel_core::SourceRecord;

use crate::normalizer::KeyNormalizer;
use crate::sources::LoadError;

/// Parse headered CSV into normalized records.
///
/// Rows shorter than the header simply lack the trailing keys.
pub fn parse_csv<R: Read>(reader: R, normalizer: &KeyNormalizer) -> Result<Vec<SourceRecord>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let pairs = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h, Some(v.to_string())));
        records.push(normalizer.normalize(pairs));
    }
    Ok(records)
}

/// Read a CSV file from disk. A missing file is an error.
pub fn read_csv_file(path: &Path, normalizer: &KeyNormalizer) -> Result<Vec<SourceRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_csv(file, normalizer).map_err(|source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), rows = records.len(), "csv source loaded");
    Ok(records)
}

/// CSV export of a generated corpus.
///
/// Written once per training run for auditing and reproducibility; nothing
/// in the service reads it back. Columns: `distancia_cm` (float) and
/// `nivel_risco` (integer code), with a header row.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::{Corpus, FEATURE_NAME, LABEL_NAME, RiskError};

/// Writes the corpus as CSV to any writer.
pub fn write_csv_to<W: Write>(corpus: &Corpus, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "{},{}", FEATURE_NAME, LABEL_NAME)?;
    for sample in corpus {
        writeln!(writer, "{},{}", sample.distance_cm, sample.level.code())?;
    }
    writer.flush()
}

/// Writes the corpus as CSV to `path`, replacing any existing file.
pub fn write_csv(corpus: &Corpus, path: &Path) -> Result<(), RiskError> {
    let file = File::create(path).map_err(|e| {
        RiskError::ArtifactWrite(format!("cannot create dataset {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    write_csv_to(corpus, &mut writer).map_err(|e| {
        RiskError::ArtifactWrite(format!("cannot write dataset {}: {}", path.display(), e))
    })
}

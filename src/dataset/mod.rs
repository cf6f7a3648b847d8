/// Labeled dataset production for the training phase.
///
/// Submodules:
/// - `synthetic` — seeded band-wise corpus generator.
/// - `export` — CSV audit export of a generated corpus.

pub mod export;
pub mod synthetic;

pub use export::{write_csv, write_csv_to};
pub use synthetic::{generate, Band, CorpusSpec};

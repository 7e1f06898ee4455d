//! JSON file import and export of raw designs.
//!
//! A thin shell over the value-based loader and extractor, so whole
//! designs survive process restarts. The canonical encoding is the
//! `RawDesign` tree serialized as pretty-printed JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use atelier_error::{Error, ErrorKind};
use log::debug;

use crate::raw::RawDesign;

/// Writes raw designs to a JSON file.
pub struct Export {
    target: PathBuf,
}

impl Export {
    /// Creates an export towards the target path.
    pub fn new(target: PathBuf) -> Self {
        Export { target }
    }

    /// Writes the raw design.
    pub fn write(&self, raw: &RawDesign) -> Result<(), Error> {
        let file = File::create(&self.target).map_err(|error| ErrorKind::Loader.because(error))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, raw)
            .map_err(|error| ErrorKind::Loader.because(error))?;
        debug!("exported design to {}", self.target.display());
        Ok(())
    }
}

/// Reads raw designs from a JSON file.
pub struct Import {
    source: PathBuf,
}

impl Import {
    /// Creates an import from the source path.
    pub fn new(source: PathBuf) -> Self {
        Import { source }
    }

    /// Reads the raw design.
    pub fn read(&self) -> Result<RawDesign, Error> {
        let file = File::open(&self.source).map_err(|error| ErrorKind::Loader.because(error))?;
        let reader = BufReader::new(file);
        let raw = serde_json::from_reader(reader)
            .map_err(|error| ErrorKind::Loader.because(error))?;
        debug!("imported design from {}", self.source.display());
        Ok(raw)
    }
}

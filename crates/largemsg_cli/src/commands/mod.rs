//! CLI command implementations.

pub mod decode;
pub mod encode;
pub mod inspect;
pub mod purge;

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Reads the whole input file, or stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path),
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Writes `data` to the output file, or stdout when no path is given.
pub fn write_output(path: Option<&Path>, data: &[u8]) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, data),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()
        }
    }
}

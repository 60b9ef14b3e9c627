use {
    crate::error::{self, Result},
    snafu::prelude::*,
    std::{
        fs::{self, File, OpenOptions},
        io::{ErrorKind, Read, Write},
        path::Path,
    },
};

/// Creates `path` and writes `header` at its start. Fails if the file exists.
pub(crate) fn create_with_header(path: &Path, header: &[u8]) -> Result<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return error::FileExistsSnafu { path }.fail()
        }
        Err(e) => return Err(e).context(error::IoSnafu { path }),
    };

    file.write_all(header).context(error::IoSnafu { path })?;
    file.sync_all().context(error::IoSnafu { path })
}

/// Opens an existing file for reading and writing and reads its first `len` bytes.
pub(crate) fn open_with_header(path: &Path, len: usize) -> Result<(File, Vec<u8>)> {
    let mut file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return error::FileNotFoundSnafu { path }.fail()
        }
        Err(e) => return Err(e).context(error::IoSnafu { path }),
    };

    let mut header = vec![0u8; len];
    file.read_exact(&mut header).context(error::IoSnafu { path })?;

    Ok((file, header))
}

pub(crate) fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => error::FileNotFoundSnafu { path }.fail(),
        Err(e) => Err(e).context(error::IoSnafu { path }),
    }
}

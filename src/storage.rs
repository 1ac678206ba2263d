use ufmt_macros::uDebug;

/// Abstraction for the removable storage holding the programs.
///
/// The engine treats a program as a sequential byte source; there is no
/// seeking. File handles are plain values owned by the caller and must be
/// given back through [Storage::close]; [Session] makes sure that happens.
pub trait Storage {
    /// Handle to an open file.
    type File;

    /// Returns `true` once the device has been initialized and can be used.
    ///
    /// Implementations may retry their initialization on every call.
    fn is_ready(&mut self) -> bool;

    /// Opens a file in the program directory for reading.
    fn open(&mut self, name: &str) -> Result<Self::File, Error>;

    /// Returns the number of bytes left to read from `file`.
    fn remaining(&mut self, file: &Self::File) -> u32;

    /// Reads the next byte from `file`.
    ///
    /// Returns `Ok(None)` at the end of the data. A device failure is an
    /// error, never an early end.
    fn read_byte(&mut self, file: &mut Self::File) -> Result<Option<u8>, Error>;

    /// Releases `file`.
    fn close(&mut self, file: Self::File);

    /// Calls `visit` once for every entry of the program directory.
    fn list_dir<F>(&mut self, visit: F) -> Result<(), Error>
    where
        F: FnMut(&DirEntry);
}

/// An entry of the program directory.
#[derive(Debug, Clone, Copy)]
pub struct DirEntry<'a> {
    pub name: &'a str,
    pub is_dir: bool,
    pub size: u32,
}

/// Errors reported by a [Storage].
#[derive(Debug, uDebug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The device has not been initialized (or has gone away).
    NotReady,
    /// The requested file does not exist.
    NotFound,
    /// Any other device or filesystem failure.
    Io,
}

/// An open program.
///
/// The file is closed when the session is dropped, so every way out of a
/// transmission releases it.
pub struct Session<'s, S: Storage> {
    storage: &'s mut S,
    file: Option<S::File>,
}
impl<'s, S: Storage> Session<'s, S> {
    /// Opens `name` on `storage`.
    pub fn open(storage: &'s mut S, name: &str) -> Result<Self, Error> {
        let file = storage.open(name)?;
        Ok(Self {
            storage,
            file: Some(file),
        })
    }

    /// Returns `true` while there is data left to read.
    pub fn has_more(&mut self) -> bool {
        match self.file.as_ref() {
            None => false,
            Some(file) => self.storage.remaining(file) > 0,
        }
    }

    /// Reads the next byte, or `None` at the end of the data.
    pub fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        match self.file.as_mut() {
            None => Ok(None),
            Some(file) => self.storage.read_byte(file),
        }
    }
}
impl<S: Storage> Drop for Session<'_, S> {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            self.storage.close(file);
        }
    }
}

#[cfg(test)]
pub use test::TestStorage;

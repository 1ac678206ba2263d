use ufmt::uWrite;
use ufmt_macros::uDebug;

use crate::storage::{self, Storage};

/// Longest program name the catalog can hold.
pub const PROGRAM_ID_LEN: usize = 24;

/// Name of a program on storage.
pub type ProgramId = heapless::String<PROGRAM_ID_LEN>;

/// The set of programs discovered at startup.
///
/// Ordinary programs are kept in discovery order, bounded at `N`. The
/// initialization program is kept apart and never takes part in random
/// selection.
///
/// # Type Parameters
///
/// - `N`: maximum number of ordinary programs.
pub struct Catalog<const N: usize> {
    entries: heapless::Vec<ProgramId, N>,
    initialization: Option<ProgramId>,
}
impl<const N: usize> Catalog<N> {
    /// Creates a new, empty catalog.
    pub fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
            initialization: None,
        }
    }

    /// Appends an ordinary program.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: if the entry was appended.
    /// - `Err(Error::Overflow)`: if the catalog was already full. The entry
    ///   has still been stored, by overwriting the last slot.
    /// - `Err(Error::NameTooLong)`: if the name does not fit in a
    ///   [ProgramId]. Nothing was stored.
    pub fn add_entry(&mut self, name: &str) -> Result<(), Error> {
        let id = program_id(name)?;
        match self.entries.push(id) {
            Ok(()) => Ok(()),
            Err(id) => match self.entries.last_mut() {
                Some(last) => {
                    *last = id;
                    Err(Error::Overflow)
                }
                // Only reachable with a zero-capacity catalog.
                None => Err(Error::Overflow),
            },
        }
    }

    /// Records the initialization program.
    ///
    /// If one was already recorded the new one wins.
    ///
    /// # Returns
    ///
    /// - `Ok(replaced)`: `replaced` is `true` if an earlier initialization
    ///   program was discarded.
    /// - `Err(Error::NameTooLong)`: if the name does not fit.
    pub fn mark_initialization_entry(
        &mut self,
        name: &str,
    ) -> Result<bool, Error> {
        let id = program_id(name)?;
        Ok(self.initialization.replace(id).is_some())
    }

    /// Returns the number of ordinary programs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no ordinary programs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the ordinary program at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|id| id.as_str())
    }

    /// Returns the initialization program, if one was found.
    pub fn initialization_entry(&self) -> Option<&str> {
        self.initialization.as_ref().map(|id| id.as_str())
    }

    /// Fills the catalog from the program directory of `storage`.
    ///
    /// Directories are skipped. Names starting with `init_prefix` go to the
    /// initialization slot, everything else is appended. Each entry, and each
    /// problem, is reported on `log`.
    ///
    /// # Returns
    ///
    /// The number of ordinary programs in the catalog afterwards.
    pub fn discover<S, W>(
        &mut self,
        storage: &mut S,
        init_prefix: &str,
        log: &mut W,
    ) -> Result<usize, storage::Error>
    where
        S: Storage,
        W: uWrite,
    {
        storage.list_dir(|entry| {
            if entry.is_dir {
                return;
            }
            if is_initialization_name(entry.name, init_prefix) {
                match self.mark_initialization_entry(entry.name) {
                    Ok(false) => {
                        info!(log, "Init program: {}", entry.name)
                    }
                    Ok(true) => warn!(
                        log,
                        "Init program replaced by {}", entry.name
                    ),
                    Err(err) => {
                        error!(log, "Skipped {}: {:?}", entry.name, err)
                    }
                }
            } else {
                match self.add_entry(entry.name) {
                    Ok(()) => info!(
                        log,
                        "Pattern {}: {} ({} bytes)",
                        self.len(),
                        entry.name,
                        entry.size
                    ),
                    Err(Error::Overflow) => warn!(
                        log,
                        "Catalog full; {} replaced the last entry", entry.name
                    ),
                    Err(err) => {
                        error!(log, "Skipped {}: {:?}", entry.name, err)
                    }
                }
            }
        })?;
        Ok(self.len())
    }
}

impl<const N: usize> Default for Catalog<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `true` if `name` follows the initialization-program naming
/// convention: it begins with `prefix`, ignoring ASCII case.
pub fn is_initialization_name(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.as_bytes()[..prefix.len()]
            .eq_ignore_ascii_case(prefix.as_bytes())
}

fn program_id(name: &str) -> Result<ProgramId, Error> {
    let mut id = ProgramId::new();
    id.push_str(name).map_err(|_| Error::NameTooLong)?;
    Ok(id)
}

/// Possible errors when adding to the catalog.
#[derive(Debug, uDebug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The catalog was full; the last slot was overwritten.
    Overflow,
    /// The name is longer than [PROGRAM_ID_LEN].
    NameTooLong,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::log::TestLog;
    use crate::storage::TestStorage;
    use proptest::collection;
    use proptest::prelude::*;

    #[test]
    fn test_add_in_discovery_order() {
        let mut catalog: Catalog<4> = Catalog::new();
        assert!(catalog.is_empty());
        assert_eq!(Ok(()), catalog.add_entry("a.gc"));
        assert_eq!(Ok(()), catalog.add_entry("b.gc"));
        assert_eq!(2, catalog.len());
        assert_eq!(Some("a.gc"), catalog.get(0));
        assert_eq!(Some("b.gc"), catalog.get(1));
        assert_eq!(None, catalog.get(2));
    }

    #[test]
    fn test_overflow_overwrites_last_slot() {
        let mut catalog: Catalog<2> = Catalog::new();
        catalog.add_entry("a.gc").unwrap();
        catalog.add_entry("b.gc").unwrap();
        assert_eq!(Err(Error::Overflow), catalog.add_entry("c.gc"));
        assert_eq!(Err(Error::Overflow), catalog.add_entry("d.gc"));
        assert_eq!(2, catalog.len());
        assert_eq!(Some("a.gc"), catalog.get(0));
        assert_eq!(Some("d.gc"), catalog.get(1));
    }

    #[test]
    fn test_name_too_long() {
        let mut catalog: Catalog<2> = Catalog::new();
        let long = "x".repeat(PROGRAM_ID_LEN + 1);
        assert_eq!(Err(Error::NameTooLong), catalog.add_entry(&long));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_initialization_last_wins() {
        let mut catalog: Catalog<2> = Catalog::new();
        assert_eq!(None, catalog.initialization_entry());
        assert_eq!(Ok(false), catalog.mark_initialization_entry("home.gc"));
        assert_eq!(Ok(true), catalog.mark_initialization_entry("home.nc"));
        assert_eq!(Some("home.nc"), catalog.initialization_entry());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_initialization_name() {
        assert!(is_initialization_name("home.gc", "home."));
        assert!(is_initialization_name("HOME.GC", "home."));
        assert!(!is_initialization_name("homer.gc", "home."));
        assert!(!is_initialization_name("home", "home."));
        assert!(!is_initialization_name("a.gc", "home."));
    }

    #[test]
    fn test_discover() {
        let mut storage = TestStorage::new()
            .with_dir("SYSTEM~1")
            .with_file("A.GC", b"G0 X1\n")
            .with_file("HOME.GC", b"G28\n")
            .with_file("B.GC", b"G0 X2\n");
        let mut log = TestLog::new();
        let mut catalog: Catalog<8> = Catalog::new();

        let count = catalog.discover(&mut storage, "home.", &mut log);

        assert_eq!(Ok(2), count);
        assert_eq!(Some("A.GC"), catalog.get(0));
        assert_eq!(Some("B.GC"), catalog.get(1));
        assert_eq!(Some("HOME.GC"), catalog.initialization_entry());
        assert!(log.contains("INFO: Pattern 1: A.GC (6 bytes)"));
        assert!(log.contains("INFO: Init program: HOME.GC"));
        assert!(!log.contains("SYSTEM~1"));
    }

    #[test]
    fn test_discover_reports_overflow_and_duplicates() {
        let mut storage = TestStorage::new()
            .with_file("a", b"")
            .with_file("b", b"")
            .with_file("home.1", b"")
            .with_file("c", b"")
            .with_file("home.2", b"");
        let mut log = TestLog::new();
        let mut catalog: Catalog<2> = Catalog::new();

        assert_eq!(Ok(2), catalog.discover(&mut storage, "home.", &mut log));
        assert_eq!(Some("c"), catalog.get(1));
        assert_eq!(Some("home.2"), catalog.initialization_entry());
        assert!(log.contains("WARN: Catalog full; c replaced the last entry"));
        assert!(log.contains("WARN: Init program replaced by home.2"));
    }

    proptest! {
        #[test]
        fn test_bounded_len(names in collection::vec("[a-z]{1,8}", 0..32)) {
            let mut catalog: Catalog<8> = Catalog::new();
            for name in names.iter() {
                let _ = catalog.add_entry(name);
            }
            prop_assert_eq!(names.len().min(8), catalog.len());
            if let Some(last) = names.last() {
                prop_assert_eq!(
                    Some(last.as_str()),
                    catalog.get(catalog.len() - 1)
                );
            }
        }
    }
}

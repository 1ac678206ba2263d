use embedded_hal::{delay::DelayNs, spi::SpiDevice};
use embedded_sdmmc::{
    Mode, RawDirectory, RawFile, SdCard, ShortFileName, TimeSource, Timestamp,
    VolumeIdx, VolumeManager,
};
use patternfeed::storage::{self, DirEntry};

/// Size of the read-ahead buffer of each open file.
const READ_AHEAD: usize = 32;

/// FAT-formatted SD card on SPI. Programs live in the root directory of the
/// first partition.
pub struct SdStorage<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    volumes: VolumeManager<SdCard<SPI, DELAY>, NoClock>,
    root: Option<RawDirectory>,
}
impl<SPI, DELAY> SdStorage<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    /// Creates a new `SdStorage`. The card is not touched until
    /// [patternfeed::Storage::is_ready] is called.
    pub fn new(card: SdCard<SPI, DELAY>) -> Self {
        Self {
            volumes: VolumeManager::new(card, NoClock),
            root: None,
        }
    }
}

/// An open program, with its read-ahead buffer.
pub struct SdFile {
    raw: RawFile,
    buffer: [u8; READ_AHEAD],
    len: usize,
    pos: usize,
}

impl<SPI, DELAY> patternfeed::Storage for SdStorage<SPI, DELAY>
where
    SPI: SpiDevice<u8>,
    DELAY: DelayNs,
{
    type File = SdFile;

    fn is_ready(&mut self) -> bool {
        if self.root.is_some() {
            return true;
        }

        let card = self.volumes.device();
        if card.num_bytes().is_err() {
            // Start from scratch on the next attempt.
            card.mark_card_uninit();
            return false;
        }
        let Ok(volume) = self.volumes.open_raw_volume(VolumeIdx(0)) else {
            return false;
        };
        match self.volumes.open_root_dir(volume) {
            Ok(root) => {
                self.root = Some(root);
                true
            }
            Err(_) => {
                let _ = self.volumes.close_volume(volume);
                false
            }
        }
    }

    fn open(&mut self, name: &str) -> Result<SdFile, storage::Error> {
        let root = self.root.ok_or(storage::Error::NotReady)?;
        let raw = self
            .volumes
            .open_file_in_dir(root, name, Mode::ReadOnly)
            .map_err(map_error)?;
        Ok(SdFile {
            raw,
            buffer: [0; READ_AHEAD],
            len: 0,
            pos: 0,
        })
    }

    fn remaining(&mut self, file: &SdFile) -> u32 {
        let length = self.volumes.file_length(file.raw).unwrap_or(0);
        let offset = self.volumes.file_offset(file.raw).unwrap_or(length);
        let buffered = (file.len - file.pos) as u32;
        length.saturating_sub(offset) + buffered
    }

    fn read_byte(
        &mut self,
        file: &mut SdFile,
    ) -> Result<Option<u8>, storage::Error> {
        if file.pos >= file.len {
            file.len = self
                .volumes
                .read(file.raw, &mut file.buffer)
                .map_err(map_error)?;
            file.pos = 0;
        }
        let byte = file.buffer[..file.len].get(file.pos).copied();
        if byte.is_some() {
            file.pos += 1;
        }
        Ok(byte)
    }

    fn close(&mut self, file: SdFile) {
        let _ = self.volumes.close_file(file.raw);
    }

    fn list_dir<F>(&mut self, mut visit: F) -> Result<(), storage::Error>
    where
        F: FnMut(&DirEntry),
    {
        let root = self.root.ok_or(storage::Error::NotReady)?;
        self.volumes
            .iterate_dir(root, |entry| {
                if entry.attributes.is_volume() {
                    return;
                }
                let name = short_name(&entry.name);
                visit(&DirEntry {
                    name: &name,
                    is_dir: entry.attributes.is_directory(),
                    size: entry.size,
                });
            })
            .map_err(map_error)
    }
}

/// Renders an 8.3 name as `BASE.EXT`.
fn short_name(name: &ShortFileName) -> heapless::String<12> {
    let mut out = heapless::String::new();
    for &c in name.base_name() {
        let _ = out.push(c as char);
    }
    let extension = name.extension();
    if !extension.is_empty() {
        let _ = out.push('.');
        for &c in extension {
            let _ = out.push(c as char);
        }
    }
    out
}

fn map_error<E: core::fmt::Debug>(err: embedded_sdmmc::Error<E>) -> storage::Error {
    match err {
        embedded_sdmmc::Error::NotFound => storage::Error::NotFound,
        _ => storage::Error::Io,
    }
}

/// The feeder has no real-time clock, and never writes to the card.
pub struct NoClock;

impl TimeSource for NoClock {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

//! Persisted tempo
//!
//! The tempo lives in a single byte of non-volatile storage. On the host that
//! storage is an EEPROM image file: [`EEPROM_SIZE`] bytes, erased to 0xFF,
//! with the tempo at [`EEPROM_BPM_ADDR`].

use crate::config::{EEPROM_BPM_ADDR, EEPROM_SIZE};
use crate::tempo::Tempo;
use log::{debug, info, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const ERASED: u8 = 0xFF;

pub trait BpmStore {
    /// The stored byte, or `None` when nothing was ever written.
    fn load(&mut self) -> io::Result<Option<u8>>;
    fn store(&mut self, bpm: u8) -> io::Result<()>;
}

/// Tempo to use at power-on. Anything but a stored in-range value gives the
/// default.
pub fn initial_tempo(store: &mut dyn BpmStore) -> Tempo {
    match store.load() {
        Ok(Some(byte)) => match Tempo::new(u16::from(byte)) {
            Some(tempo) => {
                info!("Restored stored tempo {}", tempo);
                tempo
            }
            None => {
                warn!("Stored tempo byte {} out of range, using default", byte);
                Tempo::default()
            }
        },
        Ok(None) => {
            info!("No stored tempo, using default {}", Tempo::default());
            Tempo::default()
        }
        Err(e) => {
            warn!("Unable to read stored tempo: {}", e);
            Tempo::default()
        }
    }
}

/// Writes `tempo` unless the store already holds it.
pub fn commit_tempo(store: &mut dyn BpmStore, tempo: Tempo) -> io::Result<bool> {
    if let Ok(Some(current)) = store.load() {
        if current == tempo.bpm() {
            debug!("Stored tempo already {}", tempo);
            return Ok(false);
        }
    }
    store.store(tempo.bpm())?;
    info!("Stored tempo {}", tempo);
    Ok(true)
}

#[derive(Debug)]
pub struct EepromFile {
    path: PathBuf,
    address: usize,
}

impl EepromFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EepromFile {
            path: path.into(),
            address: EEPROM_BPM_ADDR,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates an erased image if none exists yet.
    fn ensure_image(&self) -> io::Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&self.path, vec![ERASED; EEPROM_SIZE])?;
        debug!("Created erased EEPROM image at {}", self.path.display());
        Ok(())
    }
}

impl BpmStore for EepromFile {
    fn load(&mut self) -> io::Result<Option<u8>> {
        let mut file = match OpenOptions::new().read(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        file.seek(SeekFrom::Start(self.address as u64))?;
        let mut byte = [ERASED; 1];
        match file.read_exact(&mut byte) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }
        Ok((byte[0] != ERASED).then_some(byte[0]))
    }

    fn store(&mut self, bpm: u8) -> io::Result<()> {
        self.ensure_image()?;
        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        file.seek(SeekFrom::Start(self.address as u64))?;
        file.write_all(&[bpm])?;
        file.sync_data()
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    cell: Option<u8>,
    writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_byte(byte: u8) -> Self {
        MemoryStore {
            cell: Some(byte),
            writes: 0,
        }
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl BpmStore for MemoryStore {
    fn load(&mut self) -> io::Result<Option<u8>> {
        Ok(self.cell)
    }

    fn store(&mut self, bpm: u8) -> io::Result<()> {
        self.cell = Some(bpm);
        self.writes += 1;
        Ok(())
    }
}

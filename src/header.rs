use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::Serialize;

use crate::{
    config::PsidConfig,
    errors::{PsidError, PsidResult},
    traits::{PsidParser, PsidWriter},
    utils::{le_u16_prefix, read_text_field, write_text_field, PSID_MAGIC, TEXT_FIELD_LEN},
};

/// Header size and canonical data offset of a v1 file
pub const V1_DATA_OFFSET: u16 = 0x76;
/// Header size and canonical data offset of a v2 file
pub const V2_DATA_OFFSET: u16 = 0x7C;
/// 65535 bytes of C64 memory plus the optional embedded load address
pub const MAX_DATA_LEN: usize = 0x10001;

/// magic + version
const IDENT_LEN: usize = 6;
/// magic + version + dataOffset
const PREFIX_LEN: usize = 8;

/// PSID v1/v2NG header plus the payload it describes
///
/// Fields that only exist from version 2 on are `None` for version 1 headers.
/// The struct is mutated through the named accessors in `fields`, the flag and
/// speed helpers, and `validate()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PsidHeader {
    pub(crate) version: u16,
    pub(crate) data_offset: u16,
    pub(crate) load_address: u16,
    pub(crate) init_address: u16,
    pub(crate) play_address: u16,
    pub(crate) songs: u16,
    pub(crate) start_song: u16,
    pub(crate) speed: u32,
    pub(crate) name: String,
    pub(crate) author: String,
    pub(crate) copyright: String,

    // v2 only
    pub(crate) flags: Option<u16>,
    pub(crate) start_page: Option<u8>,
    pub(crate) page_length: Option<u8>,
    pub(crate) reserved: Option<u16>,

    pub(crate) padding: Vec<u8>,
    pub(crate) data: Vec<u8>,

    pub(crate) file_name: Option<String>,
    #[serde(skip)]
    pub(crate) config: PsidConfig,
}

impl Default for PsidHeader {
    fn default() -> Self {
        Self::with_config(PsidConfig::default())
    }
}

impl PsidHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh v2 header with the given behaviour switches
    pub fn with_config(config: PsidConfig) -> Self {
        Self {
            version: 2,
            data_offset: V2_DATA_OFFSET,
            load_address: 0,
            init_address: 0,
            play_address: 0,
            songs: 1,
            start_song: 1,
            speed: 0,
            name: String::new(),
            author: String::new(),
            copyright: String::new(),
            flags: Some(0),
            start_page: Some(0),
            page_length: Some(0),
            reserved: Some(0),
            padding: Vec::new(),
            data: Vec::new(),
            file_name: None,
            config,
        }
    }

    /// Decode a PSID file from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> PsidResult<Self> {
        let mut header = Self::default();
        header.read_path(path)?;
        Ok(header)
    }

    /// Decode the file at `path` into this header and remember the path.
    /// On failure the header is reset to defaults.
    pub fn read_path<P: AsRef<Path>>(&mut self, path: P) -> PsidResult<()> {
        let path_str = path.as_ref().display().to_string();
        let result = File::open(path.as_ref())
            .map_err(|e| PsidError::from(e).with_path(&path_str))
            .and_then(|file| {
                Self::decode(&mut BufReader::new(file), self.config)
                    .map_err(|e| e.with_path(&path_str))
            });
        self.finish_decode(result)?;
        self.file_name = Some(path_str);
        Ok(())
    }

    /// Decode from an already open source, starting at its beginning.
    /// `file_name` is left as it was.
    pub fn read_from<R: Read + Seek>(&mut self, reader: &mut R) -> PsidResult<()> {
        let result = reader
            .seek(SeekFrom::Start(0))
            .map_err(PsidError::from)
            .and_then(|_| Self::decode(reader, self.config));
        self.finish_decode(result)
    }

    fn finish_decode(&mut self, result: PsidResult<PsidHeader>) -> PsidResult<()> {
        match result {
            Ok(mut header) => {
                header.file_name = self.file_name.take();
                *self = header;
                Ok(())
            }
            Err(e) => {
                *self = Self::with_config(self.config);
                Err(e)
            }
        }
    }

    /// Single forward pass over the source
    fn decode<R: Read>(reader: &mut R, config: PsidConfig) -> PsidResult<PsidHeader> {
        let mut prefix = [0u8; PREFIX_LEN];
        let read = read_full(reader, &mut prefix[..IDENT_LEN])?;
        if read < IDENT_LEN {
            return Err(PsidError::TruncatedHeader {
                expected: PREFIX_LEN,
                actual: read,
            });
        }

        if prefix[0..4] != PSID_MAGIC {
            return Err(PsidError::InvalidFormat {
                reason: format!(
                    "expected magic 'PSID', found '{}'",
                    String::from_utf8_lossy(&prefix[0..4])
                ),
            });
        }

        let version = BigEndian::read_u16(&prefix[4..6]);
        let fixed_len = match version {
            1 => V1_DATA_OFFSET,
            2 => V2_DATA_OFFSET,
            _ => {
                return Err(PsidError::InvalidFormat {
                    reason: format!("unsupported version {}", version),
                })
            }
        };

        let read = read_full(reader, &mut prefix[IDENT_LEN..])?;
        if read < PREFIX_LEN - IDENT_LEN {
            return Err(PsidError::TruncatedHeader {
                expected: PREFIX_LEN,
                actual: IDENT_LEN + read,
            });
        }
        let data_offset = BigEndian::read_u16(&prefix[6..8]);
        if data_offset < fixed_len {
            return Err(PsidError::InvalidFormat {
                reason: format!(
                    "data offset 0x{:04X} is inside the version {} header (0x{:04X} bytes)",
                    data_offset, version, fixed_len
                ),
            });
        }

        let mut region = vec![0u8; data_offset as usize - PREFIX_LEN];
        let read = read_full(reader, &mut region)?;
        if read < region.len() {
            return Err(PsidError::TruncatedHeader {
                expected: data_offset as usize,
                actual: PREFIX_LEN + read,
            });
        }

        // 0x08
        let mut fields = &region[..];
        let mut header = PsidHeader {
            version,
            data_offset,
            load_address: fields.read_u16::<BigEndian>()?,
            init_address: fields.read_u16::<BigEndian>()?,
            play_address: fields.read_u16::<BigEndian>()?,
            songs: fields.read_u16::<BigEndian>()?,
            start_song: fields.read_u16::<BigEndian>()?,
            speed: fields.read_u32::<BigEndian>()?,
            name: read_text(&mut fields)?,
            author: read_text(&mut fields)?,
            copyright: read_text(&mut fields)?,
            flags: None,
            start_page: None,
            page_length: None,
            reserved: None,
            padding: Vec::new(),
            data: Vec::new(),
            file_name: None,
            config,
        };

        // 0x76
        if version == 2 {
            header.flags = Some(fields.read_u16::<BigEndian>()?);
            header.start_page = Some(fields.read_u8()?);
            header.page_length = Some(fields.read_u8()?);
            header.reserved = Some(fields.read_u16::<BigEndian>()?);
        }
        header.padding = fields.to_vec();

        reader
            .take(MAX_DATA_LEN as u64)
            .read_to_end(&mut header.data)?;

        if config.strict_payload && header.load_address == 0 && header.data.len() < 2 {
            return Err(PsidError::TruncatedPayload {
                expected: 2,
                actual: header.data.len(),
            });
        }

        Ok(header)
    }

    /// Encode to an owned buffer, validating first when configured to
    pub fn encode(&mut self) -> PsidResult<Vec<u8>> {
        if self.config.validate_on_write {
            self.validate();
        }
        self.to_vec()
    }

    /// Encode into any sink, validating first when configured to
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> PsidResult<()> {
        let encoded = self.encode()?;
        writer.write_all(&encoded)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the file to `path` and remember the path
    pub fn write_path<P: AsRef<Path>>(&mut self, path: P) -> PsidResult<()> {
        let path_str = path.as_ref().display().to_string();
        let file =
            File::create(path.as_ref()).map_err(|e| PsidError::from(e).with_path(&path_str))?;
        self.write_to(&mut BufWriter::new(file))
            .map_err(|e| e.with_path(&path_str))?;
        self.file_name = Some(path_str);
        Ok(())
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn data_offset(&self) -> u16 {
        self.data_offset
    }

    pub fn load_address(&self) -> u16 {
        self.load_address
    }

    pub fn init_address(&self) -> u16 {
        self.init_address
    }

    pub fn play_address(&self) -> u16 {
        self.play_address
    }

    pub fn songs(&self) -> u16 {
        self.songs
    }

    pub fn start_song(&self) -> u16 {
        self.start_song
    }

    /// Raw speed word, see `song_speed` for the per-song view
    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn copyright(&self) -> &str {
        &self.copyright
    }

    pub fn flags(&self) -> Option<u16> {
        self.flags
    }

    pub fn start_page(&self) -> Option<u8> {
        self.start_page
    }

    pub fn page_length(&self) -> Option<u8> {
        self.page_length
    }

    pub fn reserved(&self) -> Option<u16> {
        self.reserved
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn padding(&self) -> &[u8] {
        &self.padding
    }

    /// Path of the last successful path-based read or write
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Number of bytes the encoder produces for the current state
    pub fn file_size(&self) -> usize {
        self.fixed_header_len() + self.padding.len() + self.data.len()
    }

    /// Load address, falling back to the one embedded in the payload
    pub fn real_load_address(&self) -> u16 {
        if self.load_address != 0 {
            self.load_address
        } else {
            le_u16_prefix(&self.data)
        }
    }

    pub fn config(&self) -> PsidConfig {
        self.config
    }

    pub fn set_validate_on_write(&mut self, enabled: bool) {
        self.config.validate_on_write = enabled;
    }

    pub(crate) fn fixed_header_len(&self) -> usize {
        if self.version == 1 {
            V1_DATA_OFFSET as usize
        } else {
            V2_DATA_OFFSET as usize
        }
    }
}

impl PsidParser for PsidHeader {
    /// Decode from an in-memory buffer, consuming what was read
    fn from_bytes(data: &mut Bytes) -> PsidResult<Self> {
        Self::decode(&mut (&mut *data).reader(), PsidConfig::default())
    }
}

impl PsidWriter for PsidHeader {
    /// Serialize as-is for the stored version, without validation
    fn to_bytes(&self, buffer: &mut BytesMut) -> PsidResult<()> {
        buffer.put_slice(&PSID_MAGIC);
        buffer.put_u16(self.version);
        buffer.put_u16(self.data_offset);

        // 0x08
        buffer.put_u16(self.load_address);
        buffer.put_u16(self.init_address);
        buffer.put_u16(self.play_address);
        buffer.put_u16(self.songs);
        buffer.put_u16(self.start_song);
        buffer.put_u32(self.speed);

        // 0x16
        write_text_field(buffer, &self.name);
        write_text_field(buffer, &self.author);
        write_text_field(buffer, &self.copyright);

        // 0x76
        if self.version >= 2 {
            buffer.put_u16(self.flags.unwrap_or(0));
            buffer.put_u8(self.start_page.unwrap_or(0));
            buffer.put_u8(self.page_length.unwrap_or(0));
            buffer.put_u16(self.reserved.unwrap_or(0));
        }

        buffer.put_slice(&self.padding);
        buffer.put_slice(&self.data);
        Ok(())
    }
}

/// Fill `buf` as far as the source allows, returning how much was read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> PsidResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

fn read_text(fields: &mut &[u8]) -> PsidResult<String> {
    let mut raw = [0u8; TEXT_FIELD_LEN];
    fields.read_exact(&mut raw)?;
    Ok(read_text_field(&raw))
}

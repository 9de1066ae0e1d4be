use std::{fmt, str::FromStr};

use phf::phf_map;
use serde::Serialize;

use crate::{
    errors::{PsidError, PsidResult},
    header::{PsidHeader, MAX_DATA_LEN, V1_DATA_OFFSET, V2_DATA_OFFSET},
};

/// Every value reachable through the named accessor API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Version,
    DataOffset,
    LoadAddress,
    InitAddress,
    PlayAddress,
    Songs,
    StartSong,
    Speed,
    Name,
    Author,
    Copyright,
    Flags,
    StartPage,
    PageLength,
    Reserved,
    Data,
    Padding,
    FileName,
    FileSize,
    RealLoadAddress,
}

static FIELD_NAMES: phf::Map<&'static str, Field> = phf_map! {
    "version" => Field::Version,
    "dataOffset" => Field::DataOffset,
    "loadAddress" => Field::LoadAddress,
    "initAddress" => Field::InitAddress,
    "playAddress" => Field::PlayAddress,
    "songs" => Field::Songs,
    "startSong" => Field::StartSong,
    "speed" => Field::Speed,
    "name" => Field::Name,
    "author" => Field::Author,
    "copyright" => Field::Copyright,
    "flags" => Field::Flags,
    "startPage" => Field::StartPage,
    "pageLength" => Field::PageLength,
    "reserved" => Field::Reserved,
    "data" => Field::Data,
    "padding" => Field::Padding,
    "fileName" => Field::FileName,
    "fileSize" => Field::FileSize,
    "realLoadAddress" => Field::RealLoadAddress,
};

impl Field {
    /// Header layout order, derived fields last
    pub const ALL: [Field; 20] = [
        Field::Version,
        Field::DataOffset,
        Field::LoadAddress,
        Field::InitAddress,
        Field::PlayAddress,
        Field::Songs,
        Field::StartSong,
        Field::Speed,
        Field::Name,
        Field::Author,
        Field::Copyright,
        Field::Flags,
        Field::StartPage,
        Field::PageLength,
        Field::Reserved,
        Field::Data,
        Field::Padding,
        Field::FileName,
        Field::FileSize,
        Field::RealLoadAddress,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Version => "version",
            Field::DataOffset => "dataOffset",
            Field::LoadAddress => "loadAddress",
            Field::InitAddress => "initAddress",
            Field::PlayAddress => "playAddress",
            Field::Songs => "songs",
            Field::StartSong => "startSong",
            Field::Speed => "speed",
            Field::Name => "name",
            Field::Author => "author",
            Field::Copyright => "copyright",
            Field::Flags => "flags",
            Field::StartPage => "startPage",
            Field::PageLength => "pageLength",
            Field::Reserved => "reserved",
            Field::Data => "data",
            Field::Padding => "padding",
            Field::FileName => "fileName",
            Field::FileSize => "fileSize",
            Field::RealLoadAddress => "realLoadAddress",
        }
    }

    /// Computed or layout-managed, never assigned directly
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            Field::Padding | Field::FileName | Field::FileSize | Field::RealLoadAddress
        )
    }

    /// Only present in version 2 headers
    pub fn requires_v2(self) -> bool {
        matches!(
            self,
            Field::Flags | Field::StartPage | Field::PageLength | Field::Reserved
        )
    }
}

impl FromStr for Field {
    type Err = PsidError;

    fn from_str(name: &str) -> PsidResult<Self> {
        FIELD_NAMES
            .get(name)
            .copied()
            .ok_or_else(|| PsidError::UnknownField {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Names accepted by `get` and `set`, in header layout order
pub fn field_names() -> Vec<&'static str> {
    Field::ALL.iter().map(|field| field.name()).collect()
}

/// Value carried through the named accessors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// v2-only field on a v1 header, or an unset file name
    Absent,
    Number(u32),
    Text(String),
    Bytes(Vec<u8>),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<u32> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

impl From<u8> for FieldValue {
    fn from(value: u8) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<u16> for FieldValue {
    fn from(value: u16) -> Self {
        FieldValue::Number(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        FieldValue::Bytes(value)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(value: &[u8]) -> Self {
        FieldValue::Bytes(value.to_vec())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Absent, Into::into)
    }
}

/// Version and data offset requested within one batch
#[derive(Debug, Default)]
struct LayoutChange {
    version: Option<u16>,
    data_offset: Option<u16>,
}

impl LayoutChange {
    fn is_requested(&self) -> bool {
        self.version.is_some() || self.data_offset.is_some()
    }
}

impl PsidHeader {
    /// Read a field by its registry name
    pub fn get(&self, name: &str) -> PsidResult<FieldValue> {
        Ok(self.get_field(name.parse()?))
    }

    pub fn get_field(&self, field: Field) -> FieldValue {
        match field {
            Field::Version => self.version.into(),
            Field::DataOffset => self.data_offset.into(),
            Field::LoadAddress => self.load_address.into(),
            Field::InitAddress => self.init_address.into(),
            Field::PlayAddress => self.play_address.into(),
            Field::Songs => self.songs.into(),
            Field::StartSong => self.start_song.into(),
            Field::Speed => self.speed.into(),
            Field::Name => self.name.trim_end_matches('\0').into(),
            Field::Author => self.author.trim_end_matches('\0').into(),
            Field::Copyright => self.copyright.trim_end_matches('\0').into(),
            Field::Flags => self.flags.into(),
            Field::StartPage => self.start_page.into(),
            Field::PageLength => self.page_length.into(),
            Field::Reserved => self.reserved.into(),
            Field::Data => self.data.clone().into(),
            Field::Padding => self.padding.clone().into(),
            Field::FileName => self.file_name.clone().into(),
            Field::FileSize => (self.file_size() as u32).into(),
            Field::RealLoadAddress => self.real_load_address().into(),
        }
    }

    /// Apply a batch of named assignments.
    ///
    /// Version and data offset changes are applied first, together, so that
    /// v2-only fields in the same batch see the new version. Every other pair
    /// is checked and applied on its own; rejected pairs are skipped and
    /// their errors returned.
    #[must_use = "rejected assignments are only reported through the returned errors"]
    pub fn set<'a, I>(&mut self, changes: I) -> Vec<PsidError>
    where
        I: IntoIterator<Item = (&'a str, FieldValue)>,
    {
        let mut errors = Vec::new();
        let mut layout = LayoutChange::default();
        let mut assignments = Vec::new();

        for (name, value) in changes {
            let field = match name.parse::<Field>() {
                Ok(field) => field,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            let result = match field {
                Field::Version => number::<u16>(field, &value).and_then(|version| {
                    if version == 1 || version == 2 {
                        layout.version = Some(version);
                        Ok(())
                    } else {
                        Err(PsidError::invalid_value(
                            field.name(),
                            format!("version must be 1 or 2, got {}", version),
                        ))
                    }
                }),
                Field::DataOffset => number::<u16>(field, &value).map(|offset| {
                    layout.data_offset = Some(offset);
                }),
                _ => {
                    assignments.push((field, value));
                    Ok(())
                }
            };
            if let Err(e) = result {
                errors.push(e);
            }
        }

        if layout.is_requested() {
            self.apply_layout(layout);
        }

        for (field, value) in assignments {
            if let Err(e) = self.assign(field, value) {
                errors.push(e);
            }
        }

        errors
    }

    /// Single-field form of `set`
    pub fn set_field(&mut self, field: Field, value: FieldValue) -> PsidResult<()> {
        match self.set([(field.name(), value)]).into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn apply_layout(&mut self, layout: LayoutChange) {
        match layout.version.unwrap_or(self.version) {
            1 => {
                self.version = 1;
                self.data_offset = V1_DATA_OFFSET;
                self.flags = None;
                self.start_page = None;
                self.page_length = None;
                self.reserved = None;
                self.padding.clear();
            }
            _ => {
                self.version = 2;
                self.flags.get_or_insert(0);
                self.start_page.get_or_insert(0);
                self.page_length.get_or_insert(0);
                self.reserved.get_or_insert(0);

                let offset = layout.data_offset.unwrap_or(self.data_offset);
                if offset < V2_DATA_OFFSET {
                    self.data_offset = V2_DATA_OFFSET;
                    self.padding.clear();
                } else {
                    self.data_offset = offset;
                    self.padding
                        .resize((offset - V2_DATA_OFFSET) as usize, 0);
                }
            }
        }
    }

    fn assign(&mut self, field: Field, value: FieldValue) -> PsidResult<()> {
        if field.is_read_only() {
            return Err(PsidError::ReadOnlyField {
                field: field.name().to_string(),
            });
        }
        if field.requires_v2() && self.version < 2 {
            return Err(PsidError::VersionMismatch {
                field: field.name().to_string(),
                version: self.version,
                required: 2,
            });
        }

        match field {
            Field::LoadAddress => self.load_address = number(field, &value)?,
            Field::InitAddress => self.init_address = number(field, &value)?,
            Field::PlayAddress => self.play_address = number(field, &value)?,
            Field::Songs => self.songs = number(field, &value)?,
            Field::StartSong => self.start_song = number(field, &value)?,
            Field::Speed => self.speed = number(field, &value)?,
            Field::Name => self.name = text(field, value)?,
            Field::Author => self.author = text(field, value)?,
            Field::Copyright => self.copyright = text(field, value)?,
            Field::Flags => self.flags = Some(number(field, &value)?),
            Field::StartPage => self.start_page = Some(number(field, &value)?),
            Field::PageLength => self.page_length = Some(number(field, &value)?),
            Field::Reserved => self.reserved = Some(number(field, &value)?),
            Field::Data => {
                let data = match value {
                    FieldValue::Bytes(data) => data,
                    other => return Err(wrong_kind(field, "bytes", &other)),
                };
                if data.len() > MAX_DATA_LEN {
                    return Err(PsidError::invalid_value(
                        field.name(),
                        format!("{} bytes exceeds the {} byte limit", data.len(), MAX_DATA_LEN),
                    ));
                }
                self.data = data;
            }
            Field::Version
            | Field::DataOffset
            | Field::Padding
            | Field::FileName
            | Field::FileSize
            | Field::RealLoadAddress => unreachable!("handled before assignment"),
        }
        Ok(())
    }
}

fn number<T: TryFrom<u32>>(field: Field, value: &FieldValue) -> PsidResult<T> {
    let n = value
        .as_number()
        .ok_or_else(|| wrong_kind(field, "a number", value))?;
    T::try_from(n).map_err(|_| {
        PsidError::invalid_value(
            field.name(),
            format!("{} does not fit in {} bytes", n, std::mem::size_of::<T>()),
        )
    })
}

fn text(field: Field, value: FieldValue) -> PsidResult<String> {
    match value {
        FieldValue::Text(text) => Ok(text),
        other => Err(wrong_kind(field, "text", &other)),
    }
}

fn wrong_kind(field: Field, expected: &str, found: &FieldValue) -> PsidError {
    PsidError::invalid_value(field.name(), format!("expected {}, got {:?}", expected, found))
}

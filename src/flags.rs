use std::fmt;

use phf::phf_map;
use serde::Serialize;

use crate::{
    errors::{PsidError, PsidResult},
    header::PsidHeader,
    utils::{get_bits, set_bits},
};

// (offset, width) of each known group in the v2 flags word
const MUS_PLAYER: (u32, u32) = (0, 1);
const PLAY_SID_SPECIFIC: (u32, u32) = (1, 1);
const CLOCK: (u32, u32) = (2, 2);
const SID_MODEL: (u32, u32) = (4, 2);

/// Video standard the tune was written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Clock {
    Unknown = 0,
    Pal = 1,
    Ntsc = 2,
    Either = 3,
}

/// SID chip revision the tune was written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum SidModel {
    Unknown = 0,
    Mos6581 = 1,
    Mos8580 = 2,
    Either = 3,
}

static CLOCK_ALIASES: phf::Map<&'static str, Clock> = phf_map! {
    "unknown" => Clock::Unknown,
    "none" => Clock::Unknown,
    "neither" => Clock::Unknown,
    "pal" => Clock::Pal,
    "ntsc" => Clock::Ntsc,
    "any" => Clock::Either,
    "both" => Clock::Either,
    "either" => Clock::Either,
};

static SID_MODEL_ALIASES: phf::Map<&'static str, SidModel> = phf_map! {
    "unknown" => SidModel::Unknown,
    "none" => SidModel::Unknown,
    "neither" => SidModel::Unknown,
    "6581" => SidModel::Mos6581,
    "8580" => SidModel::Mos8580,
    "any" => SidModel::Either,
    "both" => SidModel::Either,
    "either" => SidModel::Either,
};

impl Clock {
    pub fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0 => Clock::Unknown,
            1 => Clock::Pal,
            2 => Clock::Ntsc,
            _ => Clock::Either,
        }
    }

    /// Case-insensitive lookup of the accepted aliases
    pub fn from_name(name: &str) -> Option<Self> {
        CLOCK_ALIASES.get(name.to_ascii_lowercase().as_str()).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Clock::Unknown => "UNKNOWN",
            Clock::Pal => "PAL",
            Clock::Ntsc => "NTSC",
            Clock::Either => "EITHER",
        }
    }
}

impl SidModel {
    pub fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0 => SidModel::Unknown,
            1 => SidModel::Mos6581,
            2 => SidModel::Mos8580,
            _ => SidModel::Either,
        }
    }

    /// Case-insensitive lookup of the accepted aliases
    pub fn from_name(name: &str) -> Option<Self> {
        SID_MODEL_ALIASES
            .get(name.to_ascii_lowercase().as_str())
            .copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            SidModel::Unknown => "UNKNOWN",
            SidModel::Mos6581 => "6581",
            SidModel::Mos8580 => "8580",
            SidModel::Either => "EITHER",
        }
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for SidModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Flags word assembled from the four known groups only
pub(crate) fn known_flags(mus_player: bool, play_sid: bool, clock: Clock, model: SidModel) -> u16 {
    let mut flags = 0;
    flags = set_bits(flags, MUS_PLAYER.0, MUS_PLAYER.1, mus_player as u16);
    flags = set_bits(flags, PLAY_SID_SPECIFIC.0, PLAY_SID_SPECIFIC.1, play_sid as u16);
    flags = set_bits(flags, CLOCK.0, CLOCK.1, clock as u16);
    set_bits(flags, SID_MODEL.0, SID_MODEL.1, model as u16)
}

impl PsidHeader {
    /// Whether the payload needs the Compute!'s Sidplayer MUS driver.
    /// `None` for version 1 headers.
    pub fn mus_player(&self) -> Option<bool> {
        self.flag_group(MUS_PLAYER).map(|bit| bit == 1)
    }

    pub fn set_mus_player(&mut self, value: u8) -> PsidResult<()> {
        self.set_flag_group("musPlayer", MUS_PLAYER, value)
    }

    /// Whether the tune relies on PlaySID-only behaviour
    pub fn play_sid_specific(&self) -> Option<bool> {
        self.flag_group(PLAY_SID_SPECIFIC).map(|bit| bit == 1)
    }

    pub fn set_play_sid_specific(&mut self, value: u8) -> PsidResult<()> {
        self.set_flag_group("playSIDSpecific", PLAY_SID_SPECIFIC, value)
    }

    pub fn clock(&self) -> Option<Clock> {
        self.flag_group(CLOCK).map(Clock::from_bits)
    }

    pub fn set_clock(&mut self, value: u8) -> PsidResult<()> {
        self.set_flag_group("clock", CLOCK, value)
    }

    pub fn clock_name(&self) -> Option<&'static str> {
        self.clock().map(Clock::name)
    }

    pub fn set_clock_by_name(&mut self, name: &str) -> PsidResult<()> {
        let clock = Clock::from_name(name).ok_or_else(|| {
            PsidError::invalid_value("clock", format!("unrecognised clock '{}'", name))
        })?;
        self.set_clock(clock as u8)
    }

    pub fn sid_model(&self) -> Option<SidModel> {
        self.flag_group(SID_MODEL).map(SidModel::from_bits)
    }

    pub fn set_sid_model(&mut self, value: u8) -> PsidResult<()> {
        self.set_flag_group("sidModel", SID_MODEL, value)
    }

    pub fn sid_model_name(&self) -> Option<&'static str> {
        self.sid_model().map(SidModel::name)
    }

    pub fn set_sid_model_by_name(&mut self, name: &str) -> PsidResult<()> {
        let model = SidModel::from_name(name).ok_or_else(|| {
            PsidError::invalid_value("sidModel", format!("unrecognised SID model '{}'", name))
        })?;
        self.set_sid_model(model as u8)
    }

    fn flag_group(&self, (offset, width): (u32, u32)) -> Option<u16> {
        self.flags.map(|flags| get_bits(flags, offset, width))
    }

    fn set_flag_group(&mut self, field: &str, (offset, width): (u32, u32), value: u8) -> PsidResult<()> {
        let flags = self.flags.ok_or_else(|| PsidError::VersionMismatch {
            field: field.to_string(),
            version: self.version,
            required: 2,
        })?;
        if u32::from(value) >= 1 << width {
            return Err(PsidError::invalid_value(
                field,
                format!("{} does not fit in {} bit(s)", value, width),
            ));
        }
        self.flags = Some(set_bits(flags, offset, width, value.into()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;

    fn v1_header() -> PsidHeader {
        let mut header = PsidHeader::new();
        header.set_field(Field::Version, 1u16.into()).unwrap();
        header
    }

    #[test]
    fn test_getters_absent_on_v1() {
        let header = v1_header();
        assert_eq!(header.mus_player(), None);
        assert_eq!(header.play_sid_specific(), None);
        assert_eq!(header.clock(), None);
        assert_eq!(header.clock_name(), None);
        assert_eq!(header.sid_model(), None);
    }

    #[test]
    fn test_setters_fail_on_v1() {
        let mut header = v1_header();
        assert!(matches!(header.set_clock(1), Err(PsidError::VersionMismatch { .. })));
        assert!(matches!(header.set_mus_player(1), Err(PsidError::VersionMismatch { .. })));
        assert!(matches!(
            header.set_sid_model_by_name("6581"),
            Err(PsidError::VersionMismatch { .. })
        ));
        assert_eq!(header.flags(), None);
    }

    #[test]
    fn test_set_groups_leave_other_bits() {
        let mut header = PsidHeader::new();
        header.flags = Some(0xFFC0);

        header.set_mus_player(1).unwrap();
        header.set_play_sid_specific(1).unwrap();
        header.set_clock(2).unwrap();
        header.set_sid_model(1).unwrap();
        assert_eq!(header.flags(), Some(0xFFC0 | 0b01_10_1_1));

        header.set_clock(1).unwrap();
        header.set_mus_player(0).unwrap();
        assert_eq!(header.flags(), Some(0xFFC0 | 0b01_01_1_0));
        assert_eq!(header.mus_player(), Some(false));
        assert_eq!(header.play_sid_specific(), Some(true));
        assert_eq!(header.clock(), Some(Clock::Pal));
        assert_eq!(header.sid_model(), Some(SidModel::Mos6581));
    }

    #[test]
    fn test_out_of_width_values() {
        let mut header = PsidHeader::new();
        assert!(matches!(header.set_mus_player(2), Err(PsidError::InvalidValue { .. })));
        assert!(matches!(header.set_clock(4), Err(PsidError::InvalidValue { .. })));
        assert!(matches!(header.set_sid_model(255), Err(PsidError::InvalidValue { .. })));
        assert_eq!(header.flags(), Some(0));
    }

    #[test]
    fn test_clock_by_name() {
        let mut header = PsidHeader::new();
        header.set_clock_by_name("pal").unwrap();
        assert_eq!(header.clock().map(|c| c as u8), Some(1));

        header.set_clock_by_name("NTSC").unwrap();
        assert_eq!(header.clock_name(), Some("NTSC"));

        for (alias, expected) in [
            ("None", Clock::Unknown),
            ("neither", Clock::Unknown),
            ("UNKNOWN", Clock::Unknown),
            ("any", Clock::Either),
            ("Both", Clock::Either),
            ("either", Clock::Either),
        ] {
            header.set_clock_by_name(alias).unwrap();
            assert_eq!(header.clock(), Some(expected), "alias {}", alias);
        }

        assert!(matches!(
            header.set_clock_by_name("secam"),
            Err(PsidError::InvalidValue { .. })
        ));
        assert_eq!(header.clock(), Some(Clock::Either));
    }

    #[test]
    fn test_sid_model_by_name() {
        let mut header = PsidHeader::new();
        header.set_sid_model_by_name("8580").unwrap();
        assert_eq!(header.sid_model(), Some(SidModel::Mos8580));
        assert_eq!(header.sid_model_name(), Some("8580"));

        header.set_sid_model_by_name("EITHER").unwrap();
        assert_eq!(header.sid_model_name(), Some("EITHER"));

        assert!(header.set_sid_model_by_name("6582").is_err());
    }

    #[test]
    fn test_known_flags() {
        assert_eq!(known_flags(false, false, Clock::Unknown, SidModel::Unknown), 0);
        assert_eq!(known_flags(true, true, Clock::Either, SidModel::Either), 0x3F);
        assert_eq!(known_flags(false, false, Clock::Ntsc, SidModel::Mos6581), 0x18);
    }
}

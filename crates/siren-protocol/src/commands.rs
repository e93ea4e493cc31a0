//! Command opcode table shared with the siren controller firmware.
//!
//! Opcode values are fixed by the controllers and non-contiguous: the
//! main block runs 0x01..=0x28, the preset-LED block sits at 0x30..=0x33
//! and the system-info probe at 0x40. Names follow the installation's
//! vocabulary (Boucle = loop, Sourdine = damper, Trompe = horn, ...).

/// One-byte command identifier, first payload byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    AskSynchro = 0x01,
    NewList = 0x02,
    Boucle = 0x03,
    Start = 0x04,
    IsSynchro = 0x05,
    Stop = 0x06,
    SeqSelected = 0x07,
    Reset = 0x08,
    Reverse = 0x09,
    SetSpeed = 0x0A,
    Transpo = 0x0B,
    Pchiit = 0x0C,
    Automating = 0x0D,
    Sirenium = 0x0E,
    Volume = 0x0F,
    VoletActif = 0x10,
    Mute = 0x11,
    MidiIn = 0x12,
    Synchro = 0x13,
    SetKeb = 0x14,
    SetVolet = 0x15,
    Sourdine = 0x16,
    PatchSourd = 0x17,
    Led = 0x18,
    LedTrompe = 0x19,
    Voiture = 0x1A,
    TrompeVol = 0x1B,
    TrompeLesli = 0x1C,
    TrompeOnOff = 0x1D,
    TrompePoint0 = 0x1E,
    VolumeGene = 0x1F,
    ReponseSire = 0x20,
    TramPresence = 0x21,
    RecvSt = 0x22,
    SirSelect = 0x23,
    DefRet = 0x24,
    Tourelle = 0x25,
    IsSirenium = 0x26,
    SetClicLat = 0x27,
    SetClicBoucle = 0x28,
    SetPresetLed1 = 0x30,
    SetPresetLed2 = 0x31,
    SetPresetLed3 = 0x32,
    SetPresetLed4 = 0x33,
    GetSystemInfo = 0x40,
}

impl Command {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x01 => Some(Self::AskSynchro),
            0x02 => Some(Self::NewList),
            0x03 => Some(Self::Boucle),
            0x04 => Some(Self::Start),
            0x05 => Some(Self::IsSynchro),
            0x06 => Some(Self::Stop),
            0x07 => Some(Self::SeqSelected),
            0x08 => Some(Self::Reset),
            0x09 => Some(Self::Reverse),
            0x0A => Some(Self::SetSpeed),
            0x0B => Some(Self::Transpo),
            0x0C => Some(Self::Pchiit),
            0x0D => Some(Self::Automating),
            0x0E => Some(Self::Sirenium),
            0x0F => Some(Self::Volume),
            0x10 => Some(Self::VoletActif),
            0x11 => Some(Self::Mute),
            0x12 => Some(Self::MidiIn),
            0x13 => Some(Self::Synchro),
            0x14 => Some(Self::SetKeb),
            0x15 => Some(Self::SetVolet),
            0x16 => Some(Self::Sourdine),
            0x17 => Some(Self::PatchSourd),
            0x18 => Some(Self::Led),
            0x19 => Some(Self::LedTrompe),
            0x1A => Some(Self::Voiture),
            0x1B => Some(Self::TrompeVol),
            0x1C => Some(Self::TrompeLesli),
            0x1D => Some(Self::TrompeOnOff),
            0x1E => Some(Self::TrompePoint0),
            0x1F => Some(Self::VolumeGene),
            0x20 => Some(Self::ReponseSire),
            0x21 => Some(Self::TramPresence),
            0x22 => Some(Self::RecvSt),
            0x23 => Some(Self::SirSelect),
            0x24 => Some(Self::DefRet),
            0x25 => Some(Self::Tourelle),
            0x26 => Some(Self::IsSirenium),
            0x27 => Some(Self::SetClicLat),
            0x28 => Some(Self::SetClicBoucle),
            0x30 => Some(Self::SetPresetLed1),
            0x31 => Some(Self::SetPresetLed2),
            0x32 => Some(Self::SetPresetLed3),
            0x33 => Some(Self::SetPresetLed4),
            0x40 => Some(Self::GetSystemInfo),
            _ => None,
        }
    }
}

//! Static registry of the 13 physical units of the installation.
//!
//! One control host, one handheld clicker, seven siren towers, two
//! vehicles and two pavilions. Addresses, display labels, filesystem
//! paths and credentials are fixed attributes of the deployed hardware,
//! so the registry is a set of pure lookup functions with no state.

/// Identifier of one physical unit. Wire value is the enum discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MachineId {
    ControlHost = 0,
    Clicker = 1,
    Siren1 = 2,
    Siren2 = 3,
    Siren3 = 4,
    Siren4 = 5,
    Siren5 = 6,
    Siren6 = 7,
    Siren7 = 8,
    CarA = 9,
    CarB = 10,
    Pavilion1 = 11,
    Pavilion2 = 12,
}

/// Username/password pair for the SSH/FTP file-transfer tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub username: &'static str,
    pub password: &'static str,
}

impl MachineId {
    pub const COUNT: usize = 13;

    /// All machines in identifier order, for UI list population.
    pub const ALL: [MachineId; Self::COUNT] = [
        Self::ControlHost,
        Self::Clicker,
        Self::Siren1,
        Self::Siren2,
        Self::Siren3,
        Self::Siren4,
        Self::Siren5,
        Self::Siren6,
        Self::Siren7,
        Self::CarA,
        Self::CarB,
        Self::Pavilion1,
        Self::Pavilion2,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::ControlHost),
            1 => Some(Self::Clicker),
            2 => Some(Self::Siren1),
            3 => Some(Self::Siren2),
            4 => Some(Self::Siren3),
            5 => Some(Self::Siren4),
            6 => Some(Self::Siren5),
            7 => Some(Self::Siren6),
            8 => Some(Self::Siren7),
            9 => Some(Self::CarA),
            10 => Some(Self::CarB),
            11 => Some(Self::Pavilion1),
            12 => Some(Self::Pavilion2),
            _ => None,
        }
    }

    /// Legacy constructor: anything outside the table maps to the
    /// control host. Deployed remote units rely on this fallback, so it
    /// stays available, but only under this explicit name.
    pub fn from_u8_or_default(v: u8) -> Self {
        Self::from_u8(v).unwrap_or(Self::ControlHost)
    }

    /// Whether a raw value lies within the identifier table.
    pub fn is_valid(v: u8) -> bool {
        (v as usize) < Self::COUNT
    }

    /// Dotted-quad address on the installation LAN.
    pub fn address(self) -> &'static str {
        match self {
            Self::ControlHost => "192.168.1.101",
            Self::Clicker => "192.168.1.104",
            Self::Siren1 => "192.168.1.11",
            Self::Siren2 => "192.168.1.12",
            Self::Siren3 => "192.168.1.13",
            Self::Siren4 => "192.168.1.14",
            Self::Siren5 => "192.168.1.15",
            Self::Siren6 => "192.168.1.16",
            Self::Siren7 => "192.168.1.17",
            Self::CarA => "192.168.1.50",
            Self::CarB => "192.168.1.51",
            Self::Pavilion1 => "192.168.1.52",
            Self::Pavilion2 => "192.168.1.53",
        }
    }

    /// Display label, as shown on the operator consoles.
    pub fn name(self) -> &'static str {
        match self {
            Self::ControlHost => "Linux Maître",
            Self::Clicker => "Raspberry Clic",
            Self::Siren1 => "Sirène S1",
            Self::Siren2 => "Sirène S2",
            Self::Siren3 => "Sirène S3",
            Self::Siren4 => "Sirène S4",
            Self::Siren5 => "Sirène S5",
            Self::Siren6 => "Sirène S6",
            Self::Siren7 => "Sirène S7",
            Self::CarA => "Voiture A",
            Self::CarB => "Voiture B",
            Self::Pavilion1 => "Pavillon 1",
            Self::Pavilion2 => "Pavillon 2",
        }
    }

    /// Directory holding MIDI compositions on the unit.
    pub fn midi_path(self) -> &'static str {
        match self {
            Self::Clicker => "/home/pi/mecaviv/compositions/",
            _ => "/mnt/disk/home/guest/WorkSpaceSirenes/Midi/",
        }
    }

    /// Directory holding playlists on the unit.
    pub fn playlist_path(self) -> &'static str {
        match self {
            Self::Clicker => "/home/pi/mecaviv/compositions/",
            _ => "/mnt/disk/home/guest/WorkSpaceSirenes/liste_de_lecture/",
        }
    }

    /// File recording the last loaded playlist.
    pub fn last_list_path(self) -> &'static str {
        match self {
            Self::Clicker => "/home/pi/mecaviv/derniere_liste",
            _ => "/mnt/disk/home/guest/WorkSpaceSirenes/derniere_liste",
        }
    }

    pub fn ssh_credentials(self) -> Credentials {
        match self {
            Self::Clicker => Credentials {
                username: "pi",
                password: "raspberry",
            },
            _ => Credentials {
                username: "root",
                password: "",
            },
        }
    }

    pub fn ftp_credentials(self) -> Credentials {
        match self {
            Self::Clicker => Credentials {
                username: "pi",
                password: "raspberry",
            },
            _ => Credentials {
                username: "guest",
                password: "guest",
            },
        }
    }
}

/// All machine addresses in identifier order.
pub fn all_addresses() -> Vec<&'static str> {
    MachineId::ALL.iter().map(|m| m.address()).collect()
}

/// All machine display labels in identifier order.
pub fn all_names() -> Vec<&'static str> {
    MachineId::ALL.iter().map(|m| m.name()).collect()
}

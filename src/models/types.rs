//! Integer enumerations stored in node headers and payloads.

use std::fmt;

use crate::recognized::{RawEnum, Recognized};

macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $raw:ty {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl RawEnum for $name {
            type Raw = $raw;

            fn from_raw(raw: $raw) -> Option<Self> {
                match raw {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn raw(self) -> $raw {
                self as $raw
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $($name::$variant => stringify!($variant),)+
                };
                f.write_str(name)
            }
        }
    };
}

raw_enum! {
    /// Type tag found in the second word of a node header.
    pub enum NodeType: i32 {
        /// Groups children, no payload of its own.
        Separator = 0,
        /// Faces of a mesh as indices into sibling tables.
        FaceList = 1,
        Transform = 2,
        VertexPosition = 3,
        Translation = 4,
        Rotation = 5,
        Scale = 6,
        /// Refers to a texture defined elsewhere by name.
        TextureReferenceByName = 7,
        Def = 8,
        Material = 9,
        MaterialBinding = 10,
        VertexNormal = 11,
        VertexNormalBinding = 12,
        TextureVertex = 13,
        TextureVertexBinding = 14,
        QuadMesh = 15,
        FaceSet = 16,
        TriangleStripSet = 17,
        Group = 18,
        BaseColour = 19,
        Texture = 20,
        MeshLod = 21,
        Hardpoint = 22,
        /// Rotation pivot of a moving part.
        RotationInfo = 23,
        /// Chooses one child per skin.
        SkinSelector = 24,
        PartDescriptor = 25,
        EngineGlow = 28,
    }
}

raw_enum! {
    /// Texture sub-type, the word that follows the texture type tag.
    pub enum TextureMinor: i32 {
        Texture = 0,
        TextureWithAlpha = 1,
    }
}

raw_enum! {
    /// What a hardpoint mounts: a weapon, a hangar door, a docking point or
    /// the cockpit eye point.
    pub enum HardpointType: u32 {
        None = 0,
        RebelLaser = 1,
        TurboRebelLaser = 2,
        EmpireLaser = 3,
        TurboEmpireLaser = 4,
        IonCannon = 5,
        TurboIonCannon = 6,
        Torpedo = 7,
        Missile = 8,
        SuperRebelLaser = 9,
        SuperEmpireLaser = 10,
        SuperIonCannon = 11,
        SuperTorpedo = 12,
        SuperMissile = 13,
        DumbBomb = 14,
        FiredBomb = 15,
        Magpulse = 16,
        TurboMagpulse = 17,
        SuperMagpulse = 18,
        NewWeapon1 = 19,
        NewWeapon2 = 20,
        NewWeapon3 = 21,
        NewWeapon4 = 22,
        NewWeapon5 = 23,
        NewWeapon6 = 24,
        InsideHangar = 25,
        OutsideHangar = 26,
        DockFromBig = 27,
        DockFromSmall = 28,
        DockToBig = 29,
        DockToSmall = 30,
        Cockpit = 31,
    }
}

raw_enum! {
    /// Role of a model part, used by damage and targeting logic.
    pub enum PartType: u32 {
        DefaultType = 0,
        MainHull = 1,
        Wing = 2,
        Fuselage = 3,
        GunTurret = 4,
        SmallGun = 5,
        Engine = 6,
        Bridge = 7,
        ShieldGen = 8,
        EnergyGen = 9,
        Launcher = 10,
        CommSys = 11,
        BeamSys = 12,
        CommandBeam = 13,
        DockingPlat = 14,
        LandingPlat = 15,
        Hangar = 16,
        CargoPod = 17,
        MiscHull = 18,
        Antenna = 19,
        RotWing = 20,
        RotGunTurret = 21,
        RotLauncher = 22,
        RotCommSys = 23,
        RotBeamSys = 24,
        RotCommandBeam = 25,
        Custom1 = 26,
        Custom2 = 27,
        Custom3 = 28,
        Custom4 = 29,
        Custom5 = 30,
        Custom6 = 31,
    }
}

pub type RecognizedHardpoint = Recognized<HardpointType, u32>;
pub type RecognizedPart = Recognized<PartType, u32>;
pub type RecognizedMinor = Recognized<TextureMinor, i32>;

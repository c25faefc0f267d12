//! Bit sets decoded from the OutGauge status word and dashboard light masks.
//!
//! Senders disagree on a handful of bits. Live for Speed reports the shift and
//! ctrl keys in the status word and the pit speed limiter / "any signal" lights,
//! BeamNG.drive never sets them. One layout is compiled in per build: the full
//! layout by default, the reduced one with the `beamng-layout` feature. Bits that
//! have no name in the compiled layout are ignored on decode.

use bitflags::bitflags;
use std::fmt;

/// Bit layout compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagLayout {
    /// Live for Speed layout, including key flags and pit/any-signal lights.
    Full,
    /// BeamNG.drive layout without key flags and pit/any-signal lights.
    Reduced,
}

/// Layout used by [`StatusFlags`] and [`DashLights`] in this build.
#[cfg(not(feature = "beamng-layout"))]
pub const FLAG_LAYOUT: FlagLayout = FlagLayout::Full;
/// Layout used by [`StatusFlags`] and [`DashLights`] in this build.
#[cfg(feature = "beamng-layout")]
pub const FLAG_LAYOUT: FlagLayout = FlagLayout::Reduced;

bitflags! {
    /// Flags carried in the 16-bit status word at offset 8.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StatusFlags: u16 {
        /// Shift key held
        #[cfg(not(feature = "beamng-layout"))]
        const SHIFT_KEY = 1 << 0;
        /// Ctrl key held
        #[cfg(not(feature = "beamng-layout"))]
        const CTRL_KEY  = 1 << 1;
        /// Show the turbo gauge
        const TURBO     = 1 << 13;
        /// User prefers km over miles
        const KM        = 1 << 14;
        /// User prefers bar over psi
        const BAR       = 1 << 15;
    }
}

bitflags! {
    /// Dashboard lights.
    ///
    /// The same mapping is used for the mask of lights the car has and the
    /// mask of lights currently lit.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DashLights: u32 {
        /// Shift light
        const SHIFT            = 1 << 0;
        /// Full beam
        const FULL_BEAM        = 1 << 1;
        /// Handbrake
        const HANDBRAKE        = 1 << 2;
        /// Pit speed limiter
        #[cfg(not(feature = "beamng-layout"))]
        const PIT_SPEED        = 1 << 3;
        /// Traction control active or switched off
        const TRACTION_CONTROL = 1 << 4;
        /// Left turn signal
        const SIGNAL_LEFT      = 1 << 5;
        /// Right turn signal
        const SIGNAL_RIGHT     = 1 << 6;
        /// Shared turn signal
        #[cfg(not(feature = "beamng-layout"))]
        const SIGNAL_ANY       = 1 << 7;
        /// Oil pressure warning
        const OIL_WARNING      = 1 << 8;
        /// Battery warning
        const BATTERY          = 1 << 9;
        /// ABS active or switched off
        const ABS              = 1 << 10;
    }
}

impl StatusFlags {
    /// Expands the raw status word. Unnamed bits are dropped.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self::from_bits_truncate(raw)
    }

    #[must_use]
    pub const fn turbo(self) -> bool {
        self.contains(Self::TURBO)
    }

    #[must_use]
    pub const fn km(self) -> bool {
        self.contains(Self::KM)
    }

    #[must_use]
    pub const fn bar(self) -> bool {
        self.contains(Self::BAR)
    }
}

impl DashLights {
    /// Expands a raw light mask. Unnamed bits are dropped.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }
}

/// Writes the set names separated by `|`, or `-` when empty.
fn write_names<I>(f: &mut fmt::Formatter<'_>, names: I) -> fmt::Result
where
    I: Iterator<Item = &'static str>,
{
    let mut any = false;
    for name in names {
        if any {
            f.write_str("|")?;
        }
        f.write_str(name)?;
        any = true;
    }
    if !any {
        f.write_str("-")?;
    }
    Ok(())
}

impl fmt::Display for StatusFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_names(f, self.iter_names().map(|(name, _)| name))
    }
}

impl fmt::Display for DashLights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_names(f, self.iter_names().map(|(name, _)| name))
    }
}

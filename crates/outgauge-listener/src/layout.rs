//! Byte layout of the 96-byte OutGauge packet.
//!
//! Every field is addressed through an explicit offset range. The struct is
//! dense (no alignment padding) and all multi-byte values are little-endian.
//!
//! | Offset | Size | Field       |
//! |--------|------|-------------|
//! | 0      | 4    | time (ms)   |
//! | 4      | 4    | car         |
//! | 8      | 2    | flags       |
//! | 10     | 1    | gear        |
//! | 11     | 1    | plid        |
//! | 12     | 4    | speed       |
//! | 16     | 4    | rpm         |
//! | 20     | 4    | turbo       |
//! | 24     | 4    | engTemp     |
//! | 28     | 4    | fuel        |
//! | 32     | 4    | oilPressure |
//! | 36     | 4    | oilTemp     |
//! | 40     | 4    | dashLights  |
//! | 44     | 4    | showLights  |
//! | 48     | 4    | throttle    |
//! | 52     | 4    | brake       |
//! | 56     | 4    | clutch      |
//! | 60     | 16   | display1    |
//! | 76     | 16   | display2    |
//! | 92     | 4    | id          |

use std::ops::Range;

/// Size of one OutGauge datagram, including the trailing `id` field.
pub const PACKET_SIZE: usize = 96;

pub const TIME: Range<usize> = 0..4;
pub const CAR: Range<usize> = 4..8;
pub const FLAGS: Range<usize> = 8..10;
pub const GEAR: usize = 10;
pub const PLAYER_ID: usize = 11;
pub const SPEED: Range<usize> = 12..16;
pub const RPM: Range<usize> = 16..20;
pub const TURBO: Range<usize> = 20..24;
pub const ENGINE_TEMP: Range<usize> = 24..28;
pub const FUEL: Range<usize> = 28..32;
pub const OIL_PRESSURE: Range<usize> = 32..36;
pub const OIL_TEMP: Range<usize> = 36..40;
pub const DASH_LIGHTS: Range<usize> = 40..44;
pub const SHOW_LIGHTS: Range<usize> = 44..48;
pub const THROTTLE: Range<usize> = 48..52;
pub const BRAKE: Range<usize> = 52..56;
pub const CLUTCH: Range<usize> = 56..60;
pub const DISPLAY1: Range<usize> = 60..76;
pub const DISPLAY2: Range<usize> = 76..92;
pub const ID: Range<usize> = 92..96;

/// Width of the `car` tag.
pub const CAR_LEN: usize = 4;
/// Width of each display text field.
pub const DISPLAY_LEN: usize = 16;

static_assertions::const_assert_eq!(ID.end, PACKET_SIZE);
static_assertions::const_assert_eq!(FLAGS.start, CAR.end);
static_assertions::const_assert_eq!(SPEED.start, PLAYER_ID + 1);
static_assertions::const_assert_eq!(DISPLAY1.end - DISPLAY1.start, DISPLAY_LEN);
static_assertions::const_assert_eq!(DISPLAY2.start, DISPLAY1.end);
static_assertions::const_assert_eq!(ID.start, DISPLAY2.end);

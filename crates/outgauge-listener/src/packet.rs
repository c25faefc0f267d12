//! OutGauge wire decoder.
//!
//! [`decode`] turns exactly [`PACKET_SIZE`] bytes into a [`TelemetryRecord`].
//! Fields are read by explicit offset, little-endian, so host struct layout
//! never matters.

use crate::error::DecodeError;
use crate::flags::{DashLights, StatusFlags};
use crate::layout::{self, CAR_LEN, DISPLAY_LEN, PACKET_SIZE};
use std::borrow::Cow;
use std::ops::Range;

/// One decoded OutGauge sample.
///
/// Values are reported as the sender wrote them; floats are not filtered.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetryRecord {
    /// Sender time in milliseconds (BeamNG always sends 0)
    pub time_ms: u32,
    /// Car or sender tag, not NUL terminated
    pub car: [u8; CAR_LEN],
    pub flags: StatusFlags,
    /// 0 = reverse, 1 = neutral, 2 = first gear, …
    pub gear: u8,
    /// Unique player id
    pub player_id: u8,
    /// m/s
    pub speed: f32,
    pub rpm: f32,
    /// bar
    pub turbo: f32,
    /// Celsius
    pub engine_temp: f32,
    /// 0 to 1
    pub fuel: f32,
    /// bar
    pub oil_pressure: f32,
    /// Celsius
    pub oil_temp: f32,
    /// Lights this car has on its dash
    pub available_lights: DashLights,
    /// Lights currently lit
    pub active_lights: DashLights,
    /// 0 to 1
    pub throttle: f32,
    /// 0 to 1
    pub brake: f32,
    /// 0 to 1
    pub clutch: f32,
    /// Usually fuel
    pub display1: [u8; DISPLAY_LEN],
    /// Usually settings
    pub display2: [u8; DISPLAY_LEN],
    /// Only set when the sender has an OutGauge ID configured
    pub external_id: i32,
}

/// Decodes one OutGauge datagram.
///
/// # Errors
///
/// Returns [`DecodeError::InvalidLength`] unless `bytes` is exactly
/// [`PACKET_SIZE`] long.
pub fn decode(bytes: &[u8]) -> Result<TelemetryRecord, DecodeError> {
    if bytes.len() != PACKET_SIZE {
        return Err(DecodeError::InvalidLength {
            expected: PACKET_SIZE,
            actual: bytes.len(),
        });
    }

    let reader = PacketReader::new(bytes);
    Ok(TelemetryRecord {
        time_ms: reader.read_u32("time", layout::TIME)?,
        car: reader.read_array("car", layout::CAR)?,
        flags: StatusFlags::from_raw(reader.read_u16("flags", layout::FLAGS)?),
        gear: reader.read_u8("gear", layout::GEAR)?,
        player_id: reader.read_u8("plid", layout::PLAYER_ID)?,
        speed: reader.read_f32("speed", layout::SPEED)?,
        rpm: reader.read_f32("rpm", layout::RPM)?,
        turbo: reader.read_f32("turbo", layout::TURBO)?,
        engine_temp: reader.read_f32("engTemp", layout::ENGINE_TEMP)?,
        fuel: reader.read_f32("fuel", layout::FUEL)?,
        oil_pressure: reader.read_f32("oilPressure", layout::OIL_PRESSURE)?,
        oil_temp: reader.read_f32("oilTemp", layout::OIL_TEMP)?,
        available_lights: DashLights::from_raw(reader.read_u32("dashLights", layout::DASH_LIGHTS)?),
        active_lights: DashLights::from_raw(reader.read_u32("showLights", layout::SHOW_LIGHTS)?),
        throttle: reader.read_f32("throttle", layout::THROTTLE)?,
        brake: reader.read_f32("brake", layout::BRAKE)?,
        clutch: reader.read_f32("clutch", layout::CLUTCH)?,
        display1: reader.read_array("display1", layout::DISPLAY1)?,
        display2: reader.read_array("display2", layout::DISPLAY2)?,
        external_id: reader.read_i32("id", layout::ID)?,
    })
}

impl TelemetryRecord {
    /// Same as [`decode`].
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        decode(bytes)
    }

    /// Car tag with trailing NULs removed.
    pub fn car_name(&self) -> Cow<'_, str> {
        text_field(&self.car)
    }

    pub fn display1_text(&self) -> Cow<'_, str> {
        text_field(&self.display1)
    }

    pub fn display2_text(&self) -> Cow<'_, str> {
        text_field(&self.display2)
    }

    /// Gear as shown on a dash: `R`, `N`, `1`, `2`, …
    pub fn gear_label(&self) -> Cow<'static, str> {
        match self.gear {
            0 => Cow::Borrowed("R"),
            1 => Cow::Borrowed("N"),
            g => Cow::Owned((u16::from(g) - 1).to_string()),
        }
    }

    /// Gear with reverse as -1, neutral as 0 and forward gears from 1.
    ///
    /// Raw gears above 128 saturate at `i8::MAX`.
    pub fn normalized_gear(&self) -> i8 {
        match self.gear {
            0 => -1,
            g => i8::try_from(g - 1).unwrap_or(i8::MAX),
        }
    }

    pub fn speed_kmh(&self) -> f32 {
        self.speed * 3.6
    }

    pub fn speed_mph(&self) -> f32 {
        self.speed * 2.237
    }
}

impl TryFrom<&[u8]> for TelemetryRecord {
    type Error = DecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        decode(bytes)
    }
}

fn text_field(raw: &[u8]) -> Cow<'_, str> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(raw.get(..end).unwrap_or_default())
}

/// Bounds-checked little-endian field reader.
struct PacketReader<'a> {
    bytes: &'a [u8],
}

impl<'a> PacketReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn read_array<const N: usize>(
        &self,
        field: &'static str,
        range: Range<usize>,
    ) -> Result<[u8; N], DecodeError> {
        let offset = range.start;
        self.bytes
            .get(range)
            .and_then(|b| <[u8; N]>::try_from(b).ok())
            .ok_or(DecodeError::Truncated { field, offset })
    }

    fn read_u8(&self, field: &'static str, offset: usize) -> Result<u8, DecodeError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(DecodeError::Truncated { field, offset })
    }

    fn read_u16(&self, field: &'static str, range: Range<usize>) -> Result<u16, DecodeError> {
        self.read_array(field, range).map(u16::from_le_bytes)
    }

    fn read_u32(&self, field: &'static str, range: Range<usize>) -> Result<u32, DecodeError> {
        self.read_array(field, range).map(u32::from_le_bytes)
    }

    fn read_i32(&self, field: &'static str, range: Range<usize>) -> Result<i32, DecodeError> {
        self.read_array(field, range).map(i32::from_le_bytes)
    }

    fn read_f32(&self, field: &'static str, range: Range<usize>) -> Result<f32, DecodeError> {
        self.read_array(field, range).map(f32::from_le_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    const TURBO_BIT: u16 = 1 << 13;
    const HANDBRAKE_BIT: u32 = 1 << 2;

    fn put(data: &mut [u8], range: Range<usize>, bytes: &[u8]) {
        if let Some(dst) = data.get_mut(range) {
            dst.copy_from_slice(bytes);
        }
    }

    fn make_packet(gear: u8, speed: f32, rpm: f32, flags: u16, show_lights: u32) -> Vec<u8> {
        let mut data = vec![0u8; PACKET_SIZE];
        put(&mut data, layout::FLAGS, &flags.to_le_bytes());
        put(&mut data, layout::GEAR..layout::GEAR + 1, &[gear]);
        put(&mut data, layout::SPEED, &speed.to_le_bytes());
        put(&mut data, layout::RPM, &rpm.to_le_bytes());
        put(&mut data, layout::SHOW_LIGHTS, &show_lights.to_le_bytes());
        data
    }

    #[test]
    fn decodes_dash_sample() -> TestResult {
        let data = make_packet(2, 27.7, 3500.0, TURBO_BIT, HANDBRAKE_BIT);
        let record = decode(&data)?;

        assert_eq!(record.gear, 2);
        assert!((record.speed - 27.7).abs() < 1e-5);
        assert!((record.rpm - 3500.0).abs() < 1e-3);
        assert_eq!(record.flags, StatusFlags::TURBO);
        assert_eq!(record.active_lights, DashLights::HANDBRAKE);
        assert!(record.available_lights.is_empty());
        Ok(())
    }

    #[test]
    fn decodes_every_field_at_its_offset() -> TestResult {
        let mut data = vec![0u8; PACKET_SIZE];
        put(&mut data, layout::TIME, &1234u32.to_le_bytes());
        put(&mut data, layout::CAR, b"beam");
        put(&mut data, layout::FLAGS, &(1u16 << 14).to_le_bytes());
        put(&mut data, layout::GEAR..layout::GEAR + 1, &[4]);
        put(&mut data, layout::PLAYER_ID..layout::PLAYER_ID + 1, &[9]);
        put(&mut data, layout::SPEED, &1.5f32.to_le_bytes());
        put(&mut data, layout::RPM, &2.5f32.to_le_bytes());
        put(&mut data, layout::TURBO, &3.5f32.to_le_bytes());
        put(&mut data, layout::ENGINE_TEMP, &4.5f32.to_le_bytes());
        put(&mut data, layout::FUEL, &0.25f32.to_le_bytes());
        put(&mut data, layout::OIL_PRESSURE, &5.5f32.to_le_bytes());
        put(&mut data, layout::OIL_TEMP, &6.5f32.to_le_bytes());
        put(&mut data, layout::DASH_LIGHTS, &0x0000_0707u32.to_le_bytes());
        put(&mut data, layout::SHOW_LIGHTS, &0x0000_0400u32.to_le_bytes());
        put(&mut data, layout::THROTTLE, &0.75f32.to_le_bytes());
        put(&mut data, layout::BRAKE, &0.125f32.to_le_bytes());
        put(&mut data, layout::CLUTCH, &0.0625f32.to_le_bytes());
        put(&mut data, layout::DISPLAY1, b"Fuel 42%\0\0\0\0\0\0\0\0");
        put(&mut data, layout::DISPLAY2, b"Brake bias 56\0\0\0");
        put(&mut data, layout::ID, &(-7i32).to_le_bytes());

        let record = decode(&data)?;
        assert_eq!(record.time_ms, 1234);
        assert_eq!(&record.car, b"beam");
        assert_eq!(record.car_name(), "beam");
        assert_eq!(record.flags, StatusFlags::KM);
        assert_eq!(record.gear, 4);
        assert_eq!(record.player_id, 9);
        assert_eq!(record.speed.to_bits(), 1.5f32.to_bits());
        assert_eq!(record.rpm.to_bits(), 2.5f32.to_bits());
        assert_eq!(record.turbo.to_bits(), 3.5f32.to_bits());
        assert_eq!(record.engine_temp.to_bits(), 4.5f32.to_bits());
        assert_eq!(record.fuel.to_bits(), 0.25f32.to_bits());
        assert_eq!(record.oil_pressure.to_bits(), 5.5f32.to_bits());
        assert_eq!(record.oil_temp.to_bits(), 6.5f32.to_bits());
        assert_eq!(
            record.available_lights,
            DashLights::SHIFT
                | DashLights::FULL_BEAM
                | DashLights::HANDBRAKE
                | DashLights::OIL_WARNING
                | DashLights::BATTERY
                | DashLights::ABS
        );
        assert_eq!(record.active_lights, DashLights::ABS);
        assert_eq!(record.throttle.to_bits(), 0.75f32.to_bits());
        assert_eq!(record.brake.to_bits(), 0.125f32.to_bits());
        assert_eq!(record.clutch.to_bits(), 0.0625f32.to_bits());
        assert_eq!(record.display1_text(), "Fuel 42%");
        assert_eq!(record.display2_text(), "Brake bias 56");
        assert_eq!(record.external_id, -7);
        Ok(())
    }

    #[test]
    fn rejects_short_packet() {
        let data = vec![0u8; PACKET_SIZE - 1];
        assert_eq!(
            decode(&data),
            Err(DecodeError::InvalidLength {
                expected: PACKET_SIZE,
                actual: PACKET_SIZE - 1
            })
        );
    }

    #[test]
    fn rejects_oversized_packet() {
        let data = vec![0u8; PACKET_SIZE + 1];
        assert!(decode(&data).is_err());
    }

    #[test]
    fn rejects_empty_packet() {
        assert!(decode(&[]).is_err());
    }

    #[test]
    fn try_from_matches_decode() -> TestResult {
        let data = make_packet(3, 10.0, 2000.0, 0, 0);
        let record = TelemetryRecord::try_from(data.as_slice())?;
        assert_eq!(record, decode(&data)?);
        Ok(())
    }

    #[test]
    fn gear_labels() -> TestResult {
        let labels: Vec<String> = (0u8..5)
            .map(|gear| {
                decode(&make_packet(gear, 0.0, 0.0, 0, 0)).map(|r| r.gear_label().into_owned())
            })
            .collect::<Result<_, _>>()?;
        assert_eq!(labels, ["R", "N", "1", "2", "3"]);
        Ok(())
    }

    #[test]
    fn normalized_gear_encoding() -> TestResult {
        let reverse = decode(&make_packet(0, 0.0, 0.0, 0, 0))?;
        let neutral = decode(&make_packet(1, 0.0, 0.0, 0, 0))?;
        let first = decode(&make_packet(2, 0.0, 0.0, 0, 0))?;
        let absurd = decode(&make_packet(u8::MAX, 0.0, 0.0, 0, 0))?;
        assert_eq!(reverse.normalized_gear(), -1);
        assert_eq!(neutral.normalized_gear(), 0);
        assert_eq!(first.normalized_gear(), 1);
        assert_eq!(absurd.normalized_gear(), i8::MAX);
        Ok(())
    }

    #[test]
    fn car_name_without_padding() -> TestResult {
        let mut data = make_packet(1, 0.0, 0.0, 0, 0);
        put(&mut data, layout::CAR, b"XR\0\0");
        assert_eq!(decode(&data)?.car_name(), "XR");
        Ok(())
    }

    #[test]
    fn speed_unit_conversions() -> TestResult {
        let record = decode(&make_packet(2, 10.0, 0.0, 0, 0))?;
        assert!((record.speed_kmh() - 36.0).abs() < 1e-4);
        assert!((record.speed_mph() - 22.37).abs() < 1e-3);
        Ok(())
    }

    proptest! {
        #[test]
        fn decode_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode(&data);
        }

        #[test]
        fn wrong_length_always_errors(len in 0usize..512) {
            prop_assume!(len != PACKET_SIZE);
            let data = vec![0u8; len];
            prop_assert!(decode(&data).is_err());
        }

        #[test]
        fn full_length_always_decodes(
            data in proptest::collection::vec(any::<u8>(), PACKET_SIZE..=PACKET_SIZE),
        ) {
            prop_assert!(decode(&data).is_ok());
        }

        #[test]
        fn scalar_fields_survive_decoding(
            time in any::<u32>(),
            gear in any::<u8>(),
            plid in any::<u8>(),
            speed in any::<f32>(),
            rpm in any::<f32>(),
            id in any::<i32>(),
        ) {
            let mut data = vec![0u8; PACKET_SIZE];
            put(&mut data, layout::TIME, &time.to_le_bytes());
            put(&mut data, layout::GEAR..layout::GEAR + 1, &[gear]);
            put(&mut data, layout::PLAYER_ID..layout::PLAYER_ID + 1, &[plid]);
            put(&mut data, layout::SPEED, &speed.to_le_bytes());
            put(&mut data, layout::RPM, &rpm.to_le_bytes());
            put(&mut data, layout::ID, &id.to_le_bytes());

            let record = decode(&data).map_err(|e| TestCaseError::fail(format!("{e:?}")))?;
            prop_assert_eq!(record.time_ms, time);
            prop_assert_eq!(record.gear, gear);
            prop_assert_eq!(record.player_id, plid);
            prop_assert_eq!(record.speed.to_bits(), speed.to_bits());
            prop_assert_eq!(record.rpm.to_bits(), rpm.to_bits());
            prop_assert_eq!(record.external_id, id);
        }
    }
}

// src/common/registers.rs

/// SEN0322 register map.
///
/// The sensor exposes a tiny command set: writing `0x00` to `CollectPhase`
/// arms continuous collection, and a read addressed at `OxygenData` returns
/// a three-byte frame (high byte, low byte, trailing byte).
///
/// ```rust
/// use sen0322::common::Register;
/// assert_eq!(Register::OxygenData.addr(), 0x03);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    CollectPhase = 0x01,
    JudgePhase = 0x02,
    OxygenData = 0x03,
}

impl Register {
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Value written to `CollectPhase` at setup.
pub const COLLECT_START: u8 = 0x00;

/// Length of the frame returned from `OxygenData`.
pub const OXYGEN_FRAME_LEN: usize = 3;

//! Probe indices, one per physical temperature channel on the device.

use std::fmt;

use crate::error::ValidationError;

/// Number of probe channels exposed by the device.
pub const PROBE_COUNT: usize = 4;

/// A probe channel, indexed 0–3 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeId(u8);

impl ProbeId {
    /// All probes in wire order.
    pub const ALL: [ProbeId; PROBE_COUNT] = [ProbeId(0), ProbeId(1), ProbeId(2), ProbeId(3)];

    /// Wire index of the probe (0-based).
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Human label shown on the dashboard (`Probe 1` for index 0).
    #[must_use]
    pub fn label(self) -> String {
        format!("Probe {}", self.0 + 1)
    }

    /// Parse a 1-based probe number as typed by a user.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidProbe`] when `number` is not in `1..=4`.
    pub fn from_number(number: usize) -> Result<Self, ValidationError> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::try_from(idx).ok())
            .ok_or(ValidationError::InvalidProbe(number))
    }
}

impl TryFrom<usize> for ProbeId {
    type Error = ValidationError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u8::try_from(index)
            .ok()
            .filter(|idx| usize::from(*idx) < PROBE_COUNT)
            .map(ProbeId)
            .ok_or(ValidationError::InvalidProbe(index))
    }
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_indices_below_probe_count() {
        for idx in 0..PROBE_COUNT {
            assert_eq!(ProbeId::try_from(idx).unwrap().index(), idx);
        }
    }

    #[test]
    fn should_reject_index_four() {
        assert_eq!(
            ProbeId::try_from(4),
            Err(ValidationError::InvalidProbe(4))
        );
    }

    #[test]
    fn should_label_probes_from_one() {
        assert_eq!(ProbeId::ALL[0].label(), "Probe 1");
        assert_eq!(ProbeId::ALL[3].label(), "Probe 4");
    }

    #[test]
    fn should_parse_one_based_numbers() {
        assert_eq!(ProbeId::from_number(1).unwrap(), ProbeId::ALL[0]);
        assert_eq!(ProbeId::from_number(4).unwrap(), ProbeId::ALL[3]);
        assert_eq!(
            ProbeId::from_number(0),
            Err(ValidationError::InvalidProbe(0))
        );
        assert!(ProbeId::from_number(5).is_err());
    }
}

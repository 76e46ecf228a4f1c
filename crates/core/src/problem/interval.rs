/// Conventional names for the interval sizes the trainer generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalName {
    MinorSecond,
    MajorSecond,
    MinorThird,
    MajorThird,
    PerfectFourth,
    Tritone,
    PerfectFifth,
    MinorSixth,
    MajorSixth,
    MinorSeventh,
    MajorSeventh,
    Octave,
}

impl IntervalName {
    pub const ALL: [IntervalName; 12] = [
        Self::MinorSecond,
        Self::MajorSecond,
        Self::MinorThird,
        Self::MajorThird,
        Self::PerfectFourth,
        Self::Tritone,
        Self::PerfectFifth,
        Self::MinorSixth,
        Self::MajorSixth,
        Self::MinorSeventh,
        Self::MajorSeventh,
        Self::Octave,
    ];

    /// Name for a size in semitones (1-12).
    pub fn from_semitones(size: u8) -> Option<Self> {
        match size {
            1..=12 => Some(Self::ALL[size as usize - 1]),
            _ => None,
        }
    }

    pub fn semitones(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Self::MinorSecond => "m2",
            Self::MajorSecond => "M2",
            Self::MinorThird => "m3",
            Self::MajorThird => "M3",
            Self::PerfectFourth => "P4",
            Self::Tritone => "TT",
            Self::PerfectFifth => "P5",
            Self::MinorSixth => "m6",
            Self::MajorSixth => "M6",
            Self::MinorSeventh => "m7",
            Self::MajorSeventh => "M7",
            Self::Octave => "P8",
        }
    }
}

impl std::fmt::Display for IntervalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MinorSecond => "minor second",
            Self::MajorSecond => "major second",
            Self::MinorThird => "minor third",
            Self::MajorThird => "major third",
            Self::PerfectFourth => "perfect fourth",
            Self::Tritone => "tritone",
            Self::PerfectFifth => "perfect fifth",
            Self::MinorSixth => "minor sixth",
            Self::MajorSixth => "major sixth",
            Self::MinorSeventh => "minor seventh",
            Self::MajorSeventh => "major seventh",
            Self::Octave => "octave",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semitone_mapping() {
        assert_eq!(IntervalName::from_semitones(0), None);
        assert_eq!(IntervalName::from_semitones(13), None);
        assert_eq!(
            IntervalName::from_semitones(7),
            Some(IntervalName::PerfectFifth)
        );
        for size in 1..=12 {
            let name = IntervalName::from_semitones(size).unwrap();
            assert_eq!(name.semitones(), size);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(IntervalName::Tritone.short_name(), "TT");
        assert_eq!(IntervalName::Octave.to_string(), "octave");
    }
}

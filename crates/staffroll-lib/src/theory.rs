use crate::Scale;

/// Maps pitches to staff rows. Rows count scale degrees upwards; a pitch between two degrees
/// lands on a fractional row.
pub trait PitchRows {
    fn row_for_pitch(&self, pitch: i32, scale: &Scale, tonic_pitch: i32) -> f32;
}

/// Seven rows per octave with C0 (MIDI 0) at row 0, so middle C sits on row 35.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiatonicRows;

impl DiatonicRows {
    // row of each pitch class within an octave, sharps share the row of the natural below
    const PITCH_CLASS_ROWS: [i32; 12] = [0, 0, 1, 1, 2, 3, 3, 4, 4, 5, 5, 6];
}

impl PitchRows for DiatonicRows {
    fn row_for_pitch(&self, pitch: i32, scale: &Scale, tonic_pitch: i32) -> f32 {
        let tonic_row = tonic_pitch.div_euclid(12) * 7
            + Self::PITCH_CLASS_ROWS[tonic_pitch.rem_euclid(12) as usize];

        if scale.degrees.is_empty() {
            return tonic_row as f32;
        }

        let relative = pitch - tonic_pitch;
        let octave = relative.div_euclid(12);
        let semitones = relative.rem_euclid(12) as u8;

        let degree = scale
            .degrees
            .iter()
            .rposition(|&d| d <= semitones)
            .unwrap_or(0);
        let row = tonic_row + octave * scale.degrees.len() as i32 + degree as i32;

        if scale.degrees[degree] == semitones {
            row as f32
        } else {
            row as f32 + 0.5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DiatonicRows, PitchRows};
    use crate::Scale;

    #[test]
    fn test_c_major_rows() {
        let rows = DiatonicRows;
        let major = Scale::major();
        assert_eq!(rows.row_for_pitch(60, &major, 60), 35.0);
        assert_eq!(rows.row_for_pitch(64, &major, 60), 37.0);
        assert_eq!(rows.row_for_pitch(72, &major, 60), 42.0);
        assert_eq!(rows.row_for_pitch(61, &major, 60), 35.5);
        assert_eq!(rows.row_for_pitch(59, &major, 60), 34.0);
    }

    #[test]
    fn test_other_tonic() {
        let rows = DiatonicRows;
        // D major, F# is the third degree
        assert_eq!(rows.row_for_pitch(66, &Scale::major(), 62), 38.0);
    }
}

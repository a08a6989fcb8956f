//! MIDI pitch values and note-name parsing.

use core::fmt;
use core::str::FromStr;

/// Pitch names used when formatting, sharps only.
const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// A MIDI note number (0-127, where 60 = C4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note(pub u8);

impl Note {
    /// Middle C.
    pub const C4: Note = Note(60);
    /// Concert A.
    pub const A4: Note = Note(69);

    /// Create a note from octave and semitone (0-11), C4 = 60.
    ///
    /// Returns `None` when the result falls outside 0-127.
    pub const fn from_octave_semitone(octave: i8, semitone: i8) -> Option<Self> {
        let value = 12 + octave as i16 * 12 + semitone as i16;
        if value < 0 || value > 127 {
            None
        } else {
            Some(Note(value as u8))
        }
    }

    /// Octave number, C4 = octave 4. MIDI note 0 is octave -1.
    pub const fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// Semitone within the octave (0 = C).
    pub const fn semitone(self) -> u8 {
        self.0 % 12
    }

    /// Raw MIDI note number.
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl From<u8> for Note {
    fn from(n: u8) -> Self {
        Note(n & 0x7F)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NAMES[self.semitone() as usize], self.octave())
    }
}

/// Error returned when a note name cannot be parsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NoteParseError {
    #[error("empty note name")]
    Empty,
    #[error("unknown note letter '{0}'")]
    InvalidLetter(char),
    #[error("missing or malformed octave")]
    InvalidOctave,
    #[error("note {0} is outside the MIDI range 0-127")]
    OutOfRange(i16),
}

impl FromStr for Note {
    type Err = NoteParseError;

    /// Parse names like `C4`, `F#3`, `Bb3`, `C-1`.
    ///
    /// `H` is accepted as an alias for `B` (German notation).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars.next().ok_or(NoteParseError::Empty)?;
        let mut semitone: i16 = match letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' | 'H' => 11,
            other => return Err(NoteParseError::InvalidLetter(other)),
        };

        let rest = &s[letter.len_utf8()..];
        let octave_str = match rest.as_bytes().first() {
            Some(b'#') => {
                semitone += 1;
                &rest[1..]
            }
            Some(b'b') => {
                semitone -= 1;
                &rest[1..]
            }
            _ => rest,
        };

        let octave: i16 = octave_str
            .parse::<i8>()
            .map_err(|_| NoteParseError::InvalidOctave)?
            .into();

        let value = 12 + octave * 12 + semitone;
        if !(0..=127).contains(&value) {
            return Err(NoteParseError::OutOfRange(value));
        }
        Ok(Note(value as u8))
    }
}

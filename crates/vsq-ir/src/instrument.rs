//! General MIDI level 1 instrument set.

macro_rules! general_midi {
    ($($name:ident),* $(,)?) => {
        /// A General MIDI 1 program (0-127), selected with a program change.
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum Instrument {
            #[default]
            $($name),*
        }

        impl Instrument {
            /// Every program, indexed by program number.
            pub const ALL: [Instrument; 128] = [$(Instrument::$name),*];
        }
    };
}

general_midi! {
    AcousticGrandPiano, BrightAcousticPiano, ElectricGrandPiano, HonkyTonkPiano,
    ElectricPiano1, ElectricPiano2, Harpsichord, Clavinet,
    Celesta, Glockenspiel, MusicBox, Vibraphone, Marimba, Xylophone, TubularBells, Dulcimer,
    DrawbarOrgan, PercussiveOrgan, RockOrgan, ChurchOrgan, ReedOrgan, Accordion, Harmonica, TangoAccordion,
    AcousticGuitarNylon, AcousticGuitarSteel, ElectricGuitarJazz, ElectricGuitarClean,
    ElectricGuitarMuted, OverdrivenGuitar, DistortionGuitar, GuitarHarmonics,
    AcousticBass, ElectricBassFinger, ElectricBassPick, FretlessBass,
    SlapBass1, SlapBass2, SynthBass1, SynthBass2,
    Violin, Viola, Cello, Contrabass, TremoloStrings, PizzicatoStrings, OrchestralHarp, Timpani,
    StringEnsemble1, StringEnsemble2, SynthStrings1, SynthStrings2,
    ChoirAahs, VoiceOohs, SynthVoice, OrchestraHit,
    Trumpet, Trombone, Tuba, MutedTrumpet, FrenchHorn, BrassSection, SynthBrass1, SynthBrass2,
    SopranoSax, AltoSax, TenorSax, BaritoneSax, Oboe, EnglishHorn, Bassoon, Clarinet,
    Piccolo, Flute, Recorder, PanFlute, BlownBottle, Shakuhachi, Whistle, Ocarina,
    Lead1Square, Lead2Sawtooth, Lead3Calliope, Lead4Chiff,
    Lead5Charang, Lead6Voice, Lead7Fifths, Lead8BassLead,
    Pad1NewAge, Pad2Warm, Pad3Polysynth, Pad4Choir, Pad5Bowed, Pad6Metallic, Pad7Halo, Pad8Sweep,
    Fx1Rain, Fx2Soundtrack, Fx3Crystal, Fx4Atmosphere,
    Fx5Brightness, Fx6Goblins, Fx7Echoes, Fx8SciFi,
    Sitar, Banjo, Shamisen, Koto, Kalimba, Bagpipe, Fiddle, Shanai,
    TinkleBell, Agogo, SteelDrums, Woodblock, TaikoDrum, MelodicTom, SynthDrum, ReverseCymbal,
    GuitarFretNoise, BreathNoise, Seashore, BirdTweet, TelephoneRing, Helicopter, Applause, Gunshot,
}

impl Instrument {
    /// Look up an instrument by program number. Values above 127 are masked
    /// to seven bits, as the device does with data bytes.
    pub const fn from_program(program: u8) -> Self {
        Self::ALL[(program & 0x7F) as usize]
    }

    /// Program number sent in the program change message.
    pub const fn program(self) -> u8 {
        self as u8
    }
}

impl From<Instrument> for u8 {
    fn from(inst: Instrument) -> u8 {
        inst.program()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_numbers_follow_general_midi() {
        assert_eq!(Instrument::AcousticGrandPiano.program(), 0);
        assert_eq!(Instrument::Marimba.program(), 12);
        assert_eq!(Instrument::Violin.program(), 40);
        assert_eq!(Instrument::Gunshot.program(), 127);
    }

    #[test]
    fn from_program_round_trips_table() {
        for (i, inst) in Instrument::ALL.iter().enumerate() {
            assert_eq!(inst.program() as usize, i);
        }
        assert_eq!(Instrument::from_program(73), Instrument::Flute);
        assert_eq!(Instrument::from_program(128), Instrument::AcousticGrandPiano);
    }
}

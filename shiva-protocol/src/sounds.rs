//! General MIDI percussion names the board can be told to play.

/// Drum name to MIDI note, in note order.
pub const DRUMS: [(&str, i64); 61] = [
    ("High Q (GM2)", 27),
    ("Slap (GM2)", 28),
    ("Scratch Push (GM2)", 29),
    ("Scratch Pull (GM2)", 30),
    ("Sticks (GM2)", 31),
    ("Square Click (GM2)", 32),
    ("Metronome Click (GM2)", 33),
    ("Metronome Bell (GM2)", 34),
    ("Bass Drum 2", 35),
    ("Bass Drum 1", 36),
    ("Side Stick", 37),
    ("Snare Drum 1", 38),
    ("Hand Clap", 39),
    ("Snare Drum 2", 40),
    ("Low Tom 2", 41),
    ("Closed Hi-hat", 42),
    ("Low Tom 1", 43),
    ("Pedal Hi-hat", 44),
    ("Mid Tom 2", 45),
    ("Open Hi-hat", 46),
    ("Mid Tom 1", 47),
    ("High Tom 2", 48),
    ("Crash Cymbal 1", 49),
    ("High Tom 1", 50),
    ("Ride Cymbal 1", 51),
    ("Chinese Cymbal", 52),
    ("Ride Bell", 53),
    ("Tambourine", 54),
    ("Splash Cymbal", 55),
    ("Cowbell", 56),
    ("Crash Cymbal 2", 57),
    ("Vibra Slap", 58),
    ("Ride Cymbal 2", 59),
    ("High Bongo", 60),
    ("Low Bongo", 61),
    ("Mute High Conga", 62),
    ("Open High Conga", 63),
    ("Low Conga", 64),
    ("High Timbale", 65),
    ("Low Timbale", 66),
    ("High Agogo", 67),
    ("Low Agogo", 68),
    ("Cabasa", 69),
    ("Maracas", 70),
    ("Short Whistle", 71),
    ("Long Whistle", 72),
    ("Short Guiro", 73),
    ("Long Guiro", 74),
    ("Claves", 75),
    ("High Wood Block", 76),
    ("Low Wood Block", 77),
    ("Mute Cuica", 78),
    ("Open Cuica", 79),
    ("Mute Triangle", 80),
    ("Open Triangle", 81),
    ("Shaker (GM2)", 82),
    ("Jingle Bell (GM2)", 83),
    ("Belltree (GM2)", 84),
    ("Castanets (GM2)", 85),
    ("Mute Surdo (GM2)", 86),
    ("Open Surdo (GM2)", 87),
];

pub const DEFAULT_SOUND: &str = "Crash Cymbal 1";

/// MIDI note for a drum name. Names are matched exactly.
pub fn lookup(name: &str) -> Option<i64> {
    DRUMS
        .iter()
        .find(|(drum, _)| *drum == name)
        .map(|&(_, code)| code)
}

/// Drum name for a MIDI note, if the note is a percussion sound.
pub fn name_of(code: i64) -> Option<&'static str> {
    DRUMS
        .iter()
        .find(|&&(_, note)| note == code)
        .map(|&(drum, _)| drum)
}

pub mod consensus;
pub mod consonant;
pub mod extractor;
pub mod frequency;
pub mod hierarchy;
pub mod location;
pub mod merge;
pub mod ordering;
pub mod script;
pub mod tone;
pub mod transcription;
pub mod vowel;

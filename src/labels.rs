//! Bilingual label table for the animal classifier.
//!
//! The two tables are index-aligned with the model's output vector: the
//! Italian names follow the original training dataset order, the English
//! names are the display translation. Alignment with the model output width
//! is asserted at startup, not assumed.

/// Number of classes the model was trained on.
pub const NUM_CLASSES: usize = 10;

/// Italian class names in training dataset order.
pub const CLASS_LABELS_IT: [&str; NUM_CLASSES] = [
    "cane",
    "cavallo",
    "elefante",
    "farfalla",
    "gallina",
    "gatto",
    "mucca",
    "pecora",
    "ragno",
    "scoiattolo",
];

/// English class names, index-aligned with [`CLASS_LABELS_IT`].
pub const CLASS_LABELS_EN: [&str; NUM_CLASSES] = [
    "dog",
    "horse",
    "elephant",
    "butterfly",
    "chicken",
    "cat",
    "cow",
    "sheep",
    "spider",
    "squirrel",
];

/// Looks up the (Italian, English) label pair for a class index.
pub fn label_pair(class_id: usize) -> Option<(&'static str, &'static str)> {
    match (CLASS_LABELS_IT.get(class_id), CLASS_LABELS_EN.get(class_id)) {
        (Some(&it), Some(&en)) => Some((it, en)),
        _ => None,
    }
}

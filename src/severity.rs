/// Level names understood by the severity table, paired with their
/// OpenTelemetry severity numbers.
const SEVERITY_NUMBERS: [(&str, u8); 6] = [
    ("debug", 5),
    ("info", 9),
    ("warning", 13),
    ("error", 17),
    ("emerg", 21),
    ("alert", 21),
];

/// Map a level name to its severity number.
///
/// Unknown levels yield `None`; the level text itself is still carried on
/// the record as `severity_text`.
pub fn severity_number(level: &str) -> Option<u8> {
    SEVERITY_NUMBERS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, number)| *number)
}

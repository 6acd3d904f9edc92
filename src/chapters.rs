pub const UNKNOWN_CHAPTER_NUMBER: u32 = 99;
pub const UNKNOWN_CHAPTER_NAME: &str = "Unknown chapter";

/// Ordered prefix table for the 21-chapter ICD-10-CM structure. Two-character
/// prefixes are listed alongside single characters; lookup tries the longest
/// applicable prefix first, so e.g. D0-D4 land in Neoplasms while D5-D8 land
/// in blood/immune diseases.
const PREFIX_TABLE: &[(&str, u32, &str)] = &[
    ("A", 1, "Certain infectious and parasitic diseases"),
    ("B", 1, "Certain infectious and parasitic diseases"),
    ("C", 2, "Neoplasms"),
    ("D0", 2, "Neoplasms"),
    ("D1", 2, "Neoplasms"),
    ("D2", 2, "Neoplasms"),
    ("D3", 2, "Neoplasms"),
    ("D4", 2, "Neoplasms"),
    ("D5", 3, "Diseases of the blood and immune system"),
    ("D6", 3, "Diseases of the blood and immune system"),
    ("D7", 3, "Diseases of the blood and immune system"),
    ("D8", 3, "Diseases of the blood and immune system"),
    ("E", 4, "Endocrine, nutritional and metabolic diseases"),
    ("F", 5, "Mental and behavioral disorders"),
    ("G", 6, "Diseases of the nervous system"),
    ("H0", 7, "Diseases of the eye and adnexa"),
    ("H1", 7, "Diseases of the eye and adnexa"),
    ("H2", 7, "Diseases of the eye and adnexa"),
    ("H3", 7, "Diseases of the eye and adnexa"),
    ("H4", 7, "Diseases of the eye and adnexa"),
    ("H5", 7, "Diseases of the eye and adnexa"),
    ("H6", 8, "Diseases of the ear and mastoid process"),
    ("H7", 8, "Diseases of the ear and mastoid process"),
    ("H8", 8, "Diseases of the ear and mastoid process"),
    ("H9", 8, "Diseases of the ear and mastoid process"),
    ("I", 9, "Diseases of the circulatory system"),
    ("J", 10, "Diseases of the respiratory system"),
    ("K", 11, "Diseases of the digestive system"),
    ("L", 12, "Diseases of the skin and subcutaneous tissue"),
    ("M", 13, "Diseases of the musculoskeletal system"),
    ("N", 14, "Diseases of the genitourinary system"),
    ("O", 15, "Pregnancy, childbirth and the puerperium"),
    ("P", 16, "Certain conditions originating in the perinatal period"),
    ("Q", 17, "Congenital malformations and chromosomal abnormalities"),
    ("R", 18, "Symptoms, signs and abnormal findings"),
    ("S", 19, "Injury, poisoning and external causes"),
    ("T", 19, "Injury, poisoning and external causes"),
    ("V", 20, "External causes of morbidity"),
    ("W", 20, "External causes of morbidity"),
    ("X", 20, "External causes of morbidity"),
    ("Y", 20, "External causes of morbidity"),
    ("Z", 21, "Factors influencing health status"),
];

fn lookup(prefix: &str) -> Option<(u32, &'static str)> {
    PREFIX_TABLE
        .iter()
        .find(|(table_prefix, _, _)| *table_prefix == prefix)
        .map(|(_, number, name)| (*number, *name))
}

/// Map a code to its chapter by leading characters: the two-character prefix
/// is tried first, then the first character alone. Classification never fails
/// hard; unmatched prefixes yield the unknown-chapter sentinel.
pub fn classify(code: &str) -> (u32, &'static str) {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() >= 2 {
        let two: String = chars[..2].iter().collect();
        if let Some(hit) = lookup(&two) {
            return hit;
        }
    }
    if let Some(first) = chars.first() {
        if let Some(hit) = lookup(&first.to_string()) {
            return hit;
        }
    }
    (UNKNOWN_CHAPTER_NUMBER, UNKNOWN_CHAPTER_NAME)
}

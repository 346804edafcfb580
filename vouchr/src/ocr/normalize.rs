/// Map a letter OCR commonly confuses with a digit to that digit.
fn confusable_digit(c: char) -> Option<char> {
    match c {
        'O' | 'o' => Some('0'),
        'Z' | 'z' => Some('2'),
        'S' | 's' => Some('5'),
        'A' | 'a' => Some('4'),
        'B' | 'b' => Some('8'),
        'E' | 'e' => Some('3'),
        'G' | 'g' => Some('9'),
        'I' | 'i' | 'L' | 'l' => Some('1'),
        'T' | 't' => Some('7'),
        _ => None,
    }
}

/// Reduce recognized text to the digits of a voucher serial.
///
/// Non-alphanumeric characters are dropped, confusable letters are mapped
/// through [`confusable_digit`], and any letter left unmapped is dropped too.
/// The result contains only `0`-`9` and may be empty.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| confusable_digit(c).unwrap_or(c))
        .filter(char::is_ascii_digit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_confusable_letters() {
        assert_eq!(normalize_digits("O8A1"), "0841");
        assert_eq!(normalize_digits("zSeGtIl"), "2539711");
        assert_eq!(normalize_digits("oBe"), "083");
    }

    #[test]
    fn test_strips_whitespace_and_punctuation() {
        assert_eq!(normalize_digits("1 2 3"), "123");
        assert_eq!(normalize_digits(" 12-34.56\n78 "), "12345678");
    }

    #[test]
    fn test_drops_unmapped_letters() {
        assert_eq!(normalize_digits("X9Y8W"), "98");
        assert_eq!(normalize_digits("hello"), "3110");
    }

    #[test]
    fn test_non_ascii_is_dropped() {
        assert_eq!(normalize_digits("١٢٣ 4Ö5"), "45");
        assert_eq!(normalize_digits("ＯＯ7"), "7");
    }

    #[test]
    fn test_empty_and_noise_only() {
        assert_eq!(normalize_digits(""), "");
        assert_eq!(normalize_digits("--- !!! ???"), "");
        assert_eq!(normalize_digits("kmnxyw"), "");
        assert_eq!(normalize_digits("xyz"), "2");
    }

    #[test]
    fn test_output_is_digits_only_and_idempotent() {
        let samples = [
            "O8A1",
            "SN: 4451-ZZ09 / batch#7",
            "voucher\tcode\r\n0000",
            "¿qué? ŁÓDŹ 12",
            "πρ 3.14159",
            "",
        ];
        for sample in samples {
            let once = normalize_digits(sample);
            assert!(
                once.chars().all(|c| c.is_ascii_digit()),
                "non-digit output {once:?} for {sample:?}"
            );
            assert_eq!(normalize_digits(&once), once);
        }
    }
}

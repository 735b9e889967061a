//! HTML entity decoding for verse text
//!
//! Some translations ship verse text with HTML entities (`&quot;`, `&#39;`,
//! `&eacute;`). Unknown or malformed entities are kept verbatim.

/// Longest entity body we try to decode (`&` and `;` excluded)
const MAX_ENTITY_LEN: usize = 10;

/// Replace HTML entities in `text` with the characters they stand for
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];

        let decoded = tail
            .find(';')
            .filter(|&end| end > 0 && end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_entity(&tail[..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if entity.starts_with('#') {
        return decode_numeric_entity(entity);
    }

    let c = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "aacute" => 'á',
        "eacute" => 'é',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "Aacute" => 'Á',
        "Eacute" => 'É',
        "Iacute" => 'Í',
        "Oacute" => 'Ó',
        "Uacute" => 'Ú',
        "agrave" => 'à',
        "egrave" => 'è',
        "igrave" => 'ì',
        "ograve" => 'ò',
        "ugrave" => 'ù',
        "acirc" => 'â',
        "ecirc" => 'ê',
        "ocirc" => 'ô',
        "atilde" => 'ã',
        "otilde" => 'õ',
        "ntilde" => 'ñ',
        "ccedil" => 'ç',
        "auml" => 'ä',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "Auml" => 'Ä',
        "Ouml" => 'Ö',
        "Uuml" => 'Ü',
        "szlig" => 'ß',
        "iexcl" => '¡',
        "iquest" => '¿',
        _ => return None,
    };
    Some(c)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let body = entity.strip_prefix('#')?;
    let value = match body.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.parse::<u32>().ok()?,
    };
    char::from_u32(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(unescape("In the beginning"), "In the beginning");
    }

    #[test]
    fn test_named_entities() {
        assert_eq!(unescape("&quot;Let there be light&quot;"), "\"Let there be light\"");
        assert_eq!(unescape("salt &amp; light"), "salt & light");
        assert_eq!(unescape("Jos&eacute;"), "José");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(unescape("Lord&#39;s"), "Lord's");
        assert_eq!(unescape("&#x2014;"), "\u{2014}");
        assert_eq!(unescape("&#X41;"), "A");
    }

    #[test]
    fn test_unknown_and_malformed_entities_kept() {
        assert_eq!(unescape("&bogus;"), "&bogus;");
        assert_eq!(unescape("a & b"), "a & b");
        assert_eq!(unescape("trailing &"), "trailing &");
        assert_eq!(unescape("&;"), "&;");
        assert_eq!(unescape("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn test_multibyte_text_around_entities() {
        assert_eq!(unescape("Синодальный &amp; перевод"), "Синодальный & перевод");
    }
}

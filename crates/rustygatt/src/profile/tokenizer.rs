//! Splitting declaration lines into fields

use crate::gatt::Field;

/// Split a declaration line on commas.
///
/// Commas inside double quotes do not split. Each field is trimmed of
/// whitespace; a field that starts with a quote is marked as quoted, loses
/// one pair of surrounding quotes, and has `""` unescaped to `"`.
pub fn tokenize(line: &str) -> Vec<Field> {
    let mut raw = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => raw.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    raw.push(current);

    raw.iter().map(|part| field(part.trim())).collect()
}

/// Strip one pair of surrounding quotes and unescape `""` inside them
fn field(part: &str) -> Field {
    let Some(inner) = part.strip_prefix('"') else {
        return Field::new(part);
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    Field::quoted(inner.replace("\"\"", "\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        let fields = tokenize("CHARACTERISTIC, 2A00, READ | WRITE, 01 02");
        let texts: Vec<_> = fields.iter().map(|f| f.as_str()).collect();
        assert_eq!(texts, vec!["CHARACTERISTIC", "2A00", "READ | WRITE", "01 02"]);
        assert!(fields.iter().all(|f| !f.quoted));
    }

    #[test]
    fn test_quoted_comma_is_preserved() {
        let fields = tokenize("CHARACTERISTIC, 2A00, READ, \"Hello, World\", name");
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[3], Field::quoted("Hello, World"));
        assert_eq!(fields[4], Field::new("name"));
    }

    #[test]
    fn test_doubled_quotes_are_unescaped() {
        let fields = tokenize("CHARACTERISTIC, 2A00, READ, \"say \"\"hi\"\"\"");
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[3], Field::quoted("say \"hi\""));

        let fields = tokenize("CHARACTERISTIC_USER_DESCRIPTION, READ, \"\"\"a, b\"\"\"");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[2], Field::quoted("\"a, b\""));
    }

    #[test]
    fn test_empty_fields() {
        let fields = tokenize("CHARACTERISTIC_USER_DESCRIPTION, , \"\"");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1], Field::new(""));
        assert_eq!(fields[2], Field::quoted(""));
    }
}

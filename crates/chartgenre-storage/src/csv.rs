// SPDX-License-Identifier: GPL-3.0-or-later

//! Minimal quote-aware CSV encoding. Artist credits routinely contain
//! commas and quotes, so fields are quoted and doubled per RFC 4180.

/// Encode one record, quoting fields only when they need it.
pub fn encode_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| encode_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parse a whole CSV document into records of fields. Quoted fields may
/// contain commas, escaped quotes, and newlines; CRLF line ends are
/// accepted.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                pending = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                pending = true;
            }
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                pending = false;
            }
            _ => {
                field.push(c);
                pending = true;
            }
        }
    }
    if pending || !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_stay_unquoted() {
        assert_eq!(encode_record(&["abba", "1982"]), "abba,1982");
    }

    #[test]
    fn commas_and_quotes_are_escaped() {
        assert_eq!(
            encode_record(&["earth, wind & fire", "say \"hi\""]),
            "\"earth, wind & fire\",\"say \"\"hi\"\"\""
        );
    }

    #[test]
    fn parse_handles_quoted_commas_and_escapes() {
        let rows = parse("artist,year\n\"earth, wind & fire\",1975\n\"say \"\"hi\"\"\",\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["earth, wind & fire", "1975"]);
        assert_eq!(rows[2], vec!["say \"hi\"", ""]);
    }

    #[test]
    fn parse_handles_crlf_and_missing_trailing_newline() {
        let rows = parse("a,b\r\nc,d");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn roundtrip_preserves_awkward_fields() {
        let fields = ["a,b", "c\"d", "line\nbreak", "plain"];
        let encoded = encode_record(&fields);
        let parsed = parse(&encoded);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], fields.to_vec());
    }

    #[test]
    fn empty_input_parses_to_no_records() {
        assert!(parse("").is_empty());
    }
}

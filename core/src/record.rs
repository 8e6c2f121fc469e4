/// Field separator inside a serialized record line. Fields must not contain
/// it; no escaping is defined.
pub const SEP: char = '\x03';

/// One normalized document before it is assigned a doc_id: the unit of the
/// line-oriented record file written by the parser and consumed by the
/// indexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    pub content: String,
    pub url: String,
}

impl Record {
    /// Serialize as one line: `title \x03 content \x03 url`. The trailing
    /// newline is the record separator and is written by the caller.
    pub fn to_line(&self) -> String {
        format!("{}{SEP}{}{SEP}{}", self.title, self.content, self.url)
    }

    /// Parse one line. Lines that do not split into exactly three fields are
    /// rejected.
    pub fn parse_line(line: &str) -> Option<Record> {
        let mut fields = line.split(SEP);
        let title = fields.next()?;
        let content = fields.next()?;
        let url = fields.next()?;
        if fields.next().is_some() {
            return None;
        }
        Some(Record {
            title: title.to_string(),
            content: content.to_string(),
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_three_fields() {
        let rec = Record {
            title: "Hello World".into(),
            content: "This is hello content".into(),
            url: "http://x/y".into(),
        };
        let line = rec.to_line();
        assert_eq!(Record::parse_line(&line), Some(rec));
    }

    #[test]
    fn rejects_wrong_field_counts() {
        assert!(Record::parse_line("title only").is_none());
        assert!(Record::parse_line("title\x03content").is_none());
        assert!(Record::parse_line("a\x03b\x03c\x03d").is_none());
    }

    #[test]
    fn empty_fields_are_still_three_fields() {
        let rec = Record::parse_line("\x03\x03").unwrap();
        assert_eq!(rec.title, "");
        assert_eq!(rec.content, "");
        assert_eq!(rec.url, "");
    }
}

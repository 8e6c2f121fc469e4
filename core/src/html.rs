use std::path::Path;

use crate::record::Record;

const TITLE_OPEN: &str = "<title>";
const TITLE_CLOSE: &str = "</title>";

/// Text extracted strictly between the first `<title>` and the first
/// `</title>`. `None` when either marker is missing or the close sits before
/// the end of the open marker; the caller must skip the document rather than
/// substitute a default.
pub fn extract_title(raw: &str) -> Option<String> {
    let begin = raw.find(TITLE_OPEN)? + TITLE_OPEN.len();
    let end = raw.find(TITLE_CLOSE)?;
    if begin > end {
        return None;
    }
    Some(raw[begin..end].to_string())
}

enum State {
    InTag,
    InText,
}

/// Strip markup with a two-state scan. The scan starts inside a tag, so any
/// bytes before the first `>` are treated as markup. Newlines in text are
/// rewritten to a single space; `\n` is reserved as the record separator in
/// the serialized form. Unbalanced markup has no error state, the scan just
/// ends in whichever state it is in.
pub fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut state = State::InTag;
    for c in raw.chars() {
        match state {
            State::InTag => {
                if c == '>' {
                    state = State::InText;
                }
            }
            State::InText => match c {
                '<' => state = State::InTag,
                '\n' => out.push(' '),
                _ => out.push(c),
            },
        }
    }
    out
}

/// Map a file path under `source_root` to its public URL: `base_url` plus the
/// path suffix. Pure concatenation, no reachability check.
pub fn derive_url(path: &Path, source_root: &Path, base_url: &str) -> String {
    let tail = path.strip_prefix(source_root).unwrap_or(path);
    format!("{}/{}", base_url.trim_end_matches('/'), tail.display())
}

/// Normalize one raw HTML document into a record. `None` exactly when no
/// usable title was found. Newlines inside the title are folded to spaces so
/// no field can break the line-oriented record format.
pub fn normalize(raw: &str, path: &Path, source_root: &Path, base_url: &str) -> Option<Record> {
    let title = extract_title(raw)?.replace('\n', " ");
    let content = strip_tags(raw);
    let url = derive_url(path, source_root, base_url);
    Some(Record { title, content, url })
}

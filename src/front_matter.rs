use serde_yaml::{Mapping, Value};

use crate::{error::FrontMatterError, fields::kind};

const FENCE: &str = "---";

/// A content document split into its raw front matter and body.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Document {
    pub front_matter: Mapping,
    pub body: String,
}

/// Splits `source` into the YAML between the leading `---` fences and the rest of the text.
/// Returns `None` when the document does not open with a fence.
pub fn split(source: &str) -> Result<Option<(&str, &str)>, FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(rest) = strip_fence_line(source) else {
        return Ok(None);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if is_fence(line) {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok(Some((yaml, body)));
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

fn strip_fence_line(source: &str) -> Option<&str> {
    let (first, rest) = match source.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (source, ""),
    };
    is_fence(first).then_some(rest)
}

/// Exactly `---`, ignoring only the line ending.
fn is_fence(line: &str) -> bool {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line) == FENCE
}

pub fn parse(source: &str) -> Result<Document, FrontMatterError> {
    let source = source.replace("\r\n", "\n");
    let Some((yaml, body)) = split(&source)? else {
        return Ok(Document {
            front_matter: Mapping::new(),
            body: source.strip_prefix('\u{feff}').unwrap_or(&source).to_string(),
        });
    };

    let value: Value =
        serde_yaml::from_str(yaml).map_err(|err| FrontMatterError::Yaml(err.to_string()))?;
    let front_matter = match value {
        Value::Null => Mapping::new(),
        Value::Mapping(mapping) => mapping,
        other => return Err(FrontMatterError::NotAMapping(kind(&other))),
    };

    Ok(Document {
        front_matter,
        body: body.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn splits_front_matter_and_body() {
        let doc = parse("---\ntitle: Hello\ntags: [a]\n---\n# Body\n\ntext\n").unwrap();
        assert_eq!(doc.front_matter.get("title"), Some(&Value::from("Hello")));
        assert_eq!(doc.body, "# Body\n\ntext\n");
    }

    #[test]
    fn windows_line_endings_and_bom() {
        let doc = parse("\u{feff}---\r\ntitle: Hello\r\n---\r\nbody\r\n").unwrap();
        assert_eq!(doc.front_matter.get("title"), Some(&Value::from("Hello")));
        assert_eq!(doc.body, "body\n");
    }

    #[test]
    fn no_front_matter() {
        let doc = parse("just text\n---\n").unwrap();
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.body, "just text\n---\n");
    }

    #[test]
    fn empty_front_matter() {
        let doc = parse("---\n---\nbody").unwrap();
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn fence_at_end_of_file() {
        let doc = parse("---\ndraft: true\n---").unwrap();
        assert_eq!(doc.front_matter.get("draft"), Some(&Value::Bool(true)));
        assert_eq!(doc.body, "");
    }

    #[test]
    fn dashes_inside_values_do_not_close() {
        let (yaml, body) = split("---\ntitle: a --- b\n---\nrest").unwrap().unwrap();
        assert_eq!(yaml, "title: a --- b\n");
        assert_eq!(body, "rest");
    }

    #[test]
    fn fence_with_trailing_spaces_is_not_a_fence() {
        let doc = parse("--- \ntitle: a\n---\n").unwrap();
        assert!(doc.front_matter.is_empty());
        assert_eq!(doc.body, "--- \ntitle: a\n---\n");

        assert_eq!(
            parse("---\ntitle: a\n---  \nbody\n"),
            Err(FrontMatterError::Unterminated)
        );
        assert_eq!(
            split("---\r\ntitle: a\r\n---\r\nbody"),
            Ok(Some(("title: a\r\n", "body")))
        );
    }

    #[test]
    fn unterminated() {
        assert_eq!(
            parse("---\ntitle: a\n"),
            Err(FrontMatterError::Unterminated)
        );
    }

    #[test]
    fn not_a_mapping() {
        assert_eq!(
            parse("---\n- a\n- b\n---\n"),
            Err(FrontMatterError::NotAMapping("sequence"))
        );
    }

    #[test]
    fn invalid_yaml() {
        assert!(matches!(
            parse("---\ntitle: [unclosed\n---\n"),
            Err(FrontMatterError::Yaml(_))
        ));
    }
}

/// Filename <-> tag encoding
///
/// A tagged filename is a run of `@tag ` tokens followed by the base name,
/// e.g. `"@Cat @Dog pic.jpg"`. These functions are pure; the stores build
/// every new filename through them.
use crate::error::{RenamerError, Result};

/// Marker that opens an encoded tag token
pub const TAG_PREFIX: &str = "@";

/// Separator that closes an encoded tag token
pub const TAG_SEPARATOR: &str = " ";

/// Encode a single tag as it appears in a filename
pub fn encode_tag(tag: &str) -> String {
    format!("{TAG_PREFIX}{tag}{TAG_SEPARATOR}")
}

/// Encode an ordered tag sequence into a filename prefix
pub fn encode_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter().map(|t| encode_tag(t.as_ref())).collect()
}

/// Extract candidate tag names from a filename, in order of appearance.
///
/// Every whitespace-delimited token that starts with the marker counts as a
/// tag; everything else belongs to the base name. Import and revert go
/// through `leading_tags` instead, which only reads the tag prefix.
pub fn decode_name(filename: &str) -> Vec<String> {
    filename
        .split_whitespace()
        .filter_map(|token| token.strip_prefix(TAG_PREFIX))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tags encoded at the front of a filename, in order.
///
/// Unlike `decode_name` this stops at the first token that is not a valid,
/// not yet seen tag, so `encode_tags(&leading_tags(n))` is always a prefix
/// of `n`.
pub fn leading_tags(filename: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut rest = filename;

    while let Some(token_and_rest) = rest.strip_prefix(TAG_PREFIX) {
        let Some((token, remainder)) = token_and_rest.split_once(TAG_SEPARATOR) else {
            break;
        };
        if validate_tag_name(token).is_err() || tags.iter().any(|t| t == token) {
            break;
        }
        tags.push(token.to_string());
        rest = remainder;
    }
    tags
}

/// Remove the first encoded occurrence of `tag` from `name`
pub fn strip_tag(name: &str, tag: &str) -> String {
    name.replacen(&encode_tag(tag), "", 1)
}

/// The name with the encoded form of each listed tag removed
pub fn base_name<S: AsRef<str>>(name: &str, tags: &[S]) -> String {
    tags.iter()
        .fold(name.to_string(), |acc, tag| strip_tag(&acc, tag.as_ref()))
}

/// Check that a tag name can round-trip through a filename
pub fn validate_tag_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("tag name is empty")
    } else if name.chars().any(char::is_whitespace) {
        Some("tag name contains whitespace")
    } else if name.contains(['/', '\\']) {
        Some("tag name contains a path separator")
    } else if name.starts_with(TAG_PREFIX) {
        Some("tag name starts with the tag marker")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RenamerError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_decode_preserves_order() {
        let name = format!("{}{}pic.jpg", encode_tag("Cat"), encode_tag("Dog"));
        assert_eq!(name, "@Cat @Dog pic.jpg");
        assert_eq!(decode_name(&name), vec!["Cat", "Dog"]);
    }

    #[test]
    fn test_decode_ignores_plain_tokens() {
        assert!(decode_name("holiday 2019.jpg").is_empty());
        assert_eq!(decode_name("@Beach summer @Sun.jpg"), vec!["Beach", "Sun.jpg"]);
        // A lone marker is not a tag
        assert!(decode_name("@ pic.jpg").is_empty());
    }

    #[test]
    fn test_leading_tags_stop_at_base_name() {
        assert_eq!(leading_tags("@Cat @Dog pic.jpg"), vec!["Cat", "Dog"]);
        assert_eq!(leading_tags("pic @home.jpg"), Vec::<String>::new());
        assert_eq!(leading_tags("@Cat @Cat pic.jpg"), vec!["Cat"]);
        assert_eq!(leading_tags("@Cat @@x pic.jpg"), vec!["Cat"]);
        assert_eq!(leading_tags("@Cat.jpg"), Vec::<String>::new());
    }

    #[test]
    fn test_strip_tag_only_removes_exact_token() {
        assert_eq!(strip_tag("@Cat @Catalog pic.jpg", "Cat"), "@Catalog pic.jpg");
        assert_eq!(strip_tag("@Dog pic.jpg", "Cat"), "@Dog pic.jpg");
    }

    #[test]
    fn test_base_name() {
        let tags = vec!["Cat".to_string(), "Dog".to_string()];
        assert_eq!(base_name("@Cat @Dog pic.jpg", &tags), "pic.jpg");
        assert_eq!(format!("{}{}", encode_tags(&tags), "pic.jpg"), "@Cat @Dog pic.jpg");
    }

    #[test]
    fn test_validate_tag_name() {
        assert!(validate_tag_name("Cat").is_ok());
        for bad in ["", "   ", "two words", "a/b", "@Cat"] {
            let err = validate_tag_name(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidName, "{bad:?}");
        }
    }
}

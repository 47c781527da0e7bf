//! Property path tokenizer for `a.b[0].c` expressions.

/// The first segment of a property path and the remainder after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyPath<'a> {
    name: &'a str,
    indexed_name: &'a str,
    index: Option<&'a str>,
    children: Option<&'a str>,
}

impl<'a> PropertyPath<'a> {
    pub fn parse(full: &'a str) -> Self {
        let (indexed_name, children) = match full.find('.') {
            Some(delim) => (&full[..delim], Some(&full[delim + 1..])),
            None => (full, None),
        };
        let (name, index) = match indexed_name.find('[') {
            Some(delim) => {
                let inner = &indexed_name[delim + 1..];
                (
                    &indexed_name[..delim],
                    Some(inner.strip_suffix(']').unwrap_or(inner)),
                )
            }
            None => (indexed_name, None),
        };
        Self {
            name,
            indexed_name,
            index,
            children,
        }
    }

    /// Segment name without its index.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Segment name including `[index]`, if any.
    pub fn indexed_name(&self) -> &'a str {
        self.indexed_name
    }

    pub fn index(&self) -> Option<&'a str> {
        self.index
    }

    /// Remainder of the path after the first `.`.
    pub fn children(&self) -> Option<&'a str> {
        self.children
    }

    pub fn has_next(&self) -> bool {
        self.children.is_some()
    }

    /// The path of the next segment.
    pub fn tail(&self) -> Option<PropertyPath<'a>> {
        self.children.map(PropertyPath::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        let path = PropertyPath::parse("name");
        assert_eq!(path.name(), "name");
        assert_eq!(path.index(), None);
        assert!(!path.has_next());
    }

    #[test]
    fn test_indexed_nested_path() {
        let path = PropertyPath::parse("posts[2].author.name");
        assert_eq!(path.name(), "posts");
        assert_eq!(path.indexed_name(), "posts[2]");
        assert_eq!(path.index(), Some("2"));
        assert_eq!(path.children(), Some("author.name"));

        let tail = path.tail().unwrap();
        assert_eq!(tail.name(), "author");
        assert_eq!(tail.children(), Some("name"));
    }

    #[test]
    fn test_bare_index() {
        let path = PropertyPath::parse("[key]");
        assert_eq!(path.name(), "");
        assert_eq!(path.index(), Some("key"));
    }
}

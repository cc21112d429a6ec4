use crate::resources::TreeError;

/// A validated URL/title pair from the add-link form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub url: String,
    pub name: String,
}

impl LinkRequest {
    pub fn new(url: &str, name: &str) -> Result<Self, TreeError> {
        let (url, name) = (url.trim(), name.trim());
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        if url.is_empty() {
            return Err(TreeError::EmptyUrl);
        }
        Ok(Self {
            url: url.to_string(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn test_link_request_trims_fields() {
        let request = LinkRequest::new("  https://example.org/guide ", " Guide ").unwrap();
        assert_eq!(request.url, "https://example.org/guide");
        assert_eq!(request.name, "Guide");
    }

    #[rstest]
    #[case("https://example.org", "   ", TreeError::EmptyName)]
    #[case("", "Guide", TreeError::EmptyUrl)]
    #[case(" ", "", TreeError::EmptyName)]
    fn test_link_request_rejects_blank(
        #[case] url: &str,
        #[case] name: &str,
        #[case] expected: TreeError,
    ) {
        assert_eq!(LinkRequest::new(url, name).unwrap_err(), expected);
    }
}

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Identifies a GitLab project either by numeric ID or by its full path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectRef {
    Id(u64),
    /// Namespaced path such as `group/subgroup/project`.
    Path(String),
}

impl ProjectRef {
    /// Renders the project as a single URL path segment.
    ///
    /// Paths are percent-encoded with nothing treated as safe, so `group/project`
    /// becomes `group%2Fproject`. IDs are used as plain decimal.
    pub fn to_path_segment(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Path(path) => urlencoding::encode(path).into_owned(),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

impl From<u64> for ProjectRef {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ProjectRef {
    fn from(value: &str) -> Self {
        let value = value.trim();
        match value.parse::<u64>() {
            Ok(id) if value.bytes().all(|b| b.is_ascii_digit()) => Self::Id(id),
            _ => Self::Path(value.to_string()),
        }
    }
}

impl From<String> for ProjectRef {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl FromStr for ProjectRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_slashes_are_encoded() {
        let project = ProjectRef::from("group/project");
        assert_eq!(project, ProjectRef::Path("group/project".to_string()));
        assert_eq!(project.to_path_segment(), "group%2Fproject");
    }

    #[test]
    fn test_nested_path_and_reserved_characters() {
        let project = ProjectRef::Path("my group/sub.group/my-project_1".to_string());
        assert_eq!(
            project.to_path_segment(),
            "my%20group%2Fsub.group%2Fmy-project_1"
        );
    }

    #[test]
    fn test_numeric_id_is_plain_decimal() {
        assert_eq!(ProjectRef::Id(42).to_path_segment(), "42");
        assert_eq!(ProjectRef::from(1234567_u64).to_path_segment(), "1234567");
    }

    #[test]
    fn test_digit_strings_become_ids() {
        assert_eq!(ProjectRef::from(" 12345 "), ProjectRef::Id(12345));
        assert_eq!("77".parse::<ProjectRef>().unwrap(), ProjectRef::Id(77));
    }

    #[test]
    fn test_signed_or_mixed_strings_stay_paths() {
        assert_eq!(ProjectRef::from("+12"), ProjectRef::Path("+12".to_string()));
        assert_eq!(ProjectRef::from("12a"), ProjectRef::Path("12a".to_string()));
    }

    #[test]
    fn test_display() {
        assert_eq!(ProjectRef::Id(9).to_string(), "9");
        assert_eq!(ProjectRef::from("a/b").to_string(), "a/b");
    }
}

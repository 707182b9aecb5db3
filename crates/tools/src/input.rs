use serde::{Deserialize, Serialize};

/// A scalar or a list, as accepted by the batch tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    /// First element, if any.
    pub fn first(&self) -> Option<&T> {
        match self {
            Self::One(item) => Some(item),
            Self::Many(items) => items.first(),
        }
    }
}

impl From<String> for OneOrMany<String> {
    fn from(item: String) -> Self {
        Self::One(item)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(item: &str) -> Self {
        Self::One(item.to_string())
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn scalar_and_list_both_decode() {
        let one: OneOrMany<String> = serde_json::from_value(json!("a")).unwrap();
        let many: OneOrMany<String> = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(one.into_vec(), vec!["a"]);
        assert_eq!(many.first().map(String::as_str), Some("a"));
        assert_eq!(many.into_vec().len(), 2);
    }

    #[test]
    fn empty_list_has_no_first() {
        let empty: OneOrMany<String> = Vec::<String>::new().into();
        assert!(empty.first().is_none());
    }
}

use serde_json::Value;

/// Arguments of a field, in the order they were written.
pub type Arguments = serde_json::Map<String, Value>;

/// The characters separating items of a list given as a single string, e.g. `"1,2|3"`.
pub const DEFAULT_LIST_DELIMITERS: [char; 2] = [',', '|'];

/// Splits a delimited list into its trimmed, non-empty items.
pub fn split_list<'a>(value: &'a str, delimiters: &[char]) -> Vec<&'a str> {
    value
        .split(delimiters)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Expands string arguments into lists for the arguments a resolver accepts as arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentNormalizer {
    delimiters: Vec<char>,
}

impl Default for ArgumentNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_DELIMITERS)
    }
}

impl ArgumentNormalizer {
    pub fn new(delimiters: impl IntoIterator<Item = char>) -> Self {
        ArgumentNormalizer {
            delimiters: delimiters.into_iter().collect(),
        }
    }

    /// Replaces each arrayable string argument holding more than one delimited item with
    /// the list of items. Single items stay scalars, and every other argument is
    /// returned as is.
    pub fn normalize(&self, mut arguments: Arguments, arrayable: &[&str]) -> Arguments {
        for (name, value) in arguments.iter_mut() {
            if !arrayable.contains(&name.as_str()) {
                continue;
            }

            let Value::String(raw) = value else {
                continue;
            };

            let items = split_list(raw, &self.delimiters)
                .into_iter()
                .map(|item| Value::String(item.to_owned()))
                .collect::<Vec<_>>();

            if items.len() > 1 {
                *value = Value::Array(items);
            }
        }

        arguments
    }
}

/// [`ArgumentNormalizer::normalize`] with the default delimiters.
pub fn normalize(arguments: Arguments, arrayable: &[&str]) -> Arguments {
    ArgumentNormalizer::default().normalize(arguments, arrayable)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn arguments(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test arguments are objects"),
        }
    }

    #[test]
    fn splits_delimited_strings() {
        let output = normalize(arguments(json!({ "relatedTo": "a,b,c" })), &["relatedTo"]);

        assert_eq!(Value::Object(output), json!({ "relatedTo": ["a", "b", "c"] }));
    }

    #[test]
    fn splits_on_pipes_and_trims_items() {
        let output = normalize(arguments(json!({ "section": " news | blog,, events " })), &["section"]);

        assert_eq!(Value::Object(output), json!({ "section": ["news", "blog", "events"] }));
    }

    #[test]
    fn single_items_stay_scalar() {
        let output = normalize(arguments(json!({ "relatedTo": "a", "id": "12," })), &["relatedTo", "id"]);

        assert_eq!(Value::Object(output), json!({ "relatedTo": "a", "id": "12," }));
    }

    #[test]
    fn leaves_other_arguments_alone() {
        let input = json!({
            "search": "a,b",
            "relatedTo": ["a", "b"],
            "id": 12,
            "slug": "",
            "site": null,
        });

        let output = normalize(arguments(input.clone()), &["relatedTo", "id", "slug", "site"]);

        assert_eq!(Value::Object(output), input);
    }

    #[test]
    fn keeps_argument_order() {
        let output = normalize(arguments(json!({ "b": "1,2", "a": "x" })), &["b"]);

        assert_eq!(output.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn custom_delimiters() {
        let normalizer = ArgumentNormalizer::new([';']);

        let output = normalizer.normalize(arguments(json!({ "ids": "1;2", "tags": "a,b" })), &["ids", "tags"]);

        assert_eq!(Value::Object(output), json!({ "ids": ["1", "2"], "tags": "a,b" }));
    }

    #[test]
    fn split_list_drops_empty_items() {
        assert_eq!(split_list("a,,b|", &DEFAULT_LIST_DELIMITERS), vec!["a", "b"]);
        assert!(split_list("", &DEFAULT_LIST_DELIMITERS).is_empty());
    }
}
